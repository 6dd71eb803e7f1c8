use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::reports;
use crate::slug;

#[derive(Debug, Clone)]
pub struct NewReport {
    pub school_name: String,
    pub images: Option<String>,
    pub video: Option<String>,
    pub school_location: String,
    pub issue_type: String,
    pub description: String,
    pub user_id: String,
    pub privacy_preference: String,
}

/// Optional fields for report edits; None leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct ReportUpdate {
    pub school_name: Option<String>,
    pub images: Option<String>,
    pub video: Option<String>,
    pub school_location: Option<String>,
    pub issue_type: Option<String>,
    pub description: Option<String>,
    pub privacy_preference: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Substring match on school name, location, or description.
    pub search: Option<String>,
    pub status: Option<String>,
    pub issue_type: Option<String>,
    pub privacy_preference: Option<String>,
    pub page: u64,
    pub per_page: u64,
}

pub struct ReportRepository {
    conn: DatabaseConnection,
}

impl ReportRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new report in `pending` status and assign its unique slug
    /// from the school name.
    pub async fn create(&self, new: NewReport) -> Result<reports::Model> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let active = reports::ActiveModel {
            id: Set(id),
            school_name: Set(new.school_name.clone()),
            slug: Set(None),
            images: Set(new.images),
            video: Set(new.video),
            status: Set("pending".to_string()),
            school_location: Set(new.school_location),
            issue_type: Set(new.issue_type),
            description: Set(new.description),
            comment: Set(None),
            user_id: Set(new.user_id),
            privacy_preference: Set(new.privacy_preference),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert report")?;

        self.assign_slug(model, &new.school_name).await
    }

    /// Same probing scheme as user slugs: `base`, `base-1`, `base-2`, ...
    /// with the unique index as the concurrency backstop.
    async fn assign_slug(&self, model: reports::Model, base_text: &str) -> Result<reports::Model> {
        let normalized = slug::slugify(base_text);
        let base = if normalized.is_empty() {
            model.id.clone()
        } else {
            normalized
        };

        let mut attempt = 0;
        let chosen = loop {
            let candidate = slug::candidate(&base, attempt);
            let taken = reports::Entity::find()
                .filter(reports::Column::Slug.eq(candidate.as_str()))
                .count(&self.conn)
                .await
                .context("Failed to probe report slug")?;
            if taken == 0 {
                break candidate;
            }
            attempt += 1;
        };

        let mut active: reports::ActiveModel = model.into();
        active.slug = Set(Some(chosen));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to store report slug")?;

        Ok(updated)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<reports::Model>> {
        reports::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query report by ID")
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<reports::Model>> {
        reports::Entity::find()
            .filter(reports::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query report by slug")
    }

    /// Most recent reports, newest first.
    pub async fn latest(&self, limit: u64) -> Result<Vec<reports::Model>> {
        reports::Entity::find()
            .order_by_desc(reports::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query latest reports")
    }

    /// Filtered page of reports plus the total number of pages.
    pub async fn filtered(&self, filter: ReportFilter) -> Result<(Vec<reports::Model>, u64)> {
        let mut query = reports::Entity::find();

        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            query = query.filter(
                Condition::any()
                    .add(reports::Column::SchoolName.like(pattern.clone()))
                    .add(reports::Column::SchoolLocation.like(pattern.clone()))
                    .add(reports::Column::Description.like(pattern)),
            );
        }
        if let Some(status) = &filter.status {
            query = query.filter(reports::Column::Status.eq(status));
        }
        if let Some(issue_type) = &filter.issue_type {
            query = query.filter(reports::Column::IssueType.like(format!("%{issue_type}%")));
        }
        if let Some(privacy) = &filter.privacy_preference {
            query = query.filter(reports::Column::PrivacyPreference.eq(privacy));
        }

        let per_page = filter.per_page.max(1);
        let paginator = query
            .order_by_desc(reports::Column::CreatedAt)
            .paginate(&self.conn, per_page);

        let total_pages = paginator
            .num_pages()
            .await
            .context("Failed to count report pages")?;
        let rows = paginator
            .fetch_page(filter.page)
            .await
            .context("Failed to fetch report page")?;

        Ok((rows, total_pages))
    }

    /// Every report, oldest first, for CSV-style export.
    pub async fn list_all(&self) -> Result<Vec<reports::Model>> {
        reports::Entity::find()
            .order_by_asc(reports::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list reports")
    }

    pub async fn update_fields(
        &self,
        report: reports::Model,
        update: ReportUpdate,
    ) -> Result<reports::Model> {
        let mut active: reports::ActiveModel = report.into();

        if let Some(school_name) = update.school_name {
            active.school_name = Set(school_name);
        }
        if let Some(images) = update.images {
            active.images = Set(Some(images));
        }
        if let Some(video) = update.video {
            active.video = Set(Some(video));
        }
        if let Some(school_location) = update.school_location {
            active.school_location = Set(school_location);
        }
        if let Some(issue_type) = update.issue_type {
            active.issue_type = Set(issue_type);
        }
        if let Some(description) = update.description {
            active.description = Set(description);
        }
        if let Some(privacy) = update.privacy_preference {
            active.privacy_preference = Set(privacy);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        active.update(&self.conn).await.context("Failed to update report")
    }

    pub async fn set_status(
        &self,
        report: reports::Model,
        status: &str,
        comment: Option<&str>,
    ) -> Result<reports::Model> {
        let mut active: reports::ActiveModel = report.into();
        active.status = Set(status.to_string());
        if let Some(comment) = comment {
            active.comment = Set(Some(comment.to_string()));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to update report status")
    }

    /// Apply one status uniformly to a set of reports. Returns the number of
    /// rows touched.
    pub async fn set_status_bulk(&self, ids: &[String], status: &str) -> Result<u64> {
        use sea_orm::sea_query::Expr;

        let now = chrono::Utc::now().to_rfc3339();
        let result = reports::Entity::update_many()
            .col_expr(reports::Column::Status, Expr::value(status))
            .col_expr(reports::Column::UpdatedAt, Expr::value(now))
            .filter(reports::Column::Id.is_in(ids.iter().map(String::as_str)))
            .exec(&self.conn)
            .await
            .context("Failed to bulk-update report status")?;

        Ok(result.rows_affected)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = reports::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete report")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        reports::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count reports")
    }

    pub async fn count_by_status(&self, status: &str) -> Result<u64> {
        reports::Entity::find()
            .filter(reports::Column::Status.eq(status))
            .count(&self.conn)
            .await
            .context("Failed to count reports by status")
    }

    /// Reports created at or after the given RFC3339 instant.
    pub async fn created_since(&self, since: &str) -> Result<Vec<reports::Model>> {
        reports::Entity::find()
            .filter(reports::Column::CreatedAt.gte(since))
            .all(&self.conn)
            .await
            .context("Failed to query recent reports")
    }
}
