use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// UUID v4, assigned at creation.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub first_name: String,

    pub last_name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub image: Option<String>,

    /// One of "user", "admin", "teacher", "student".
    pub role: String,

    pub is_admin: bool,

    pub is_blocked: bool,

    pub is_account_verified: bool,

    /// Assigned after insert from the account name; unique once set.
    #[sea_orm(unique)]
    pub slug: Option<String>,

    /// Sha256 hex of the reset token. The plaintext is never stored.
    pub reset_password_token: Option<String>,

    pub reset_password_expires: Option<String>,

    /// 6-digit verification code
    pub account_verification_otp: Option<String>,

    pub account_verification_otp_expires: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reports::Entity")]
    Reports,
}

impl Related<super::reports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
