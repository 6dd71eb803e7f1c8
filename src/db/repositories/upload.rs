use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::entities::uploads;

pub struct UploadRepository {
    conn: DatabaseConnection,
}

impl UploadRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Record a relayed file and its durable URL on the media host.
    pub async fn record(&self, file_url: &str, file_type: &str) -> Result<uploads::Model> {
        let active = uploads::ActiveModel {
            file_url: Set(file_url.to_string()),
            file_type: Set(file_type.to_string()),
            upload_date: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to record upload")
    }

    pub async fn list(&self) -> Result<Vec<uploads::Model>> {
        uploads::Entity::find()
            .order_by_desc(uploads::Column::UploadDate)
            .all(&self.conn)
            .await
            .context("Failed to list uploads")
    }
}
