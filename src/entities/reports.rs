use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    /// UUID v4, assigned at creation.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub school_name: String,

    /// Assigned after insert from the school name; unique once set.
    #[sea_orm(unique)]
    pub slug: Option<String>,

    /// Comma-joined image URLs.
    pub images: Option<String>,

    pub video: Option<String>,

    /// One of "pending", "approved", "disapproved".
    pub status: String,

    pub school_location: String,

    /// Comma-joined issue categories.
    pub issue_type: String,

    pub description: String,

    /// Moderator note set on approve/disapprove.
    pub comment: Option<String>,

    pub user_id: String,

    /// "public" or "anonymous".
    pub privacy_preference: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
