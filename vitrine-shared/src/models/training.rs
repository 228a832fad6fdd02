//! Training (course) model: trainings own modules, modules own lessons
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE training_status AS ENUM ('draft', 'published');
//!
//! CREATE TABLE trainings (
//!     id BIGSERIAL PRIMARY KEY,
//!     title VARCHAR(255) NOT NULL,
//!     description TEXT,
//!     thumbnail VARCHAR(512),
//!     status training_status NOT NULL DEFAULT 'draft',
//!     deleted_at TIMESTAMPTZ,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Trainings are soft-deleted: every lookup here ignores rows with a
//! `deleted_at`, so a deleted training behaves as missing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Publication status of a training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "training_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    /// Visible to admins only
    Draft,

    /// Visible to users
    Published,
}

impl TrainingStatus {
    /// Parses a status string; `None` for anything outside the allowed set
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(TrainingStatus::Draft),
            "published" => Some(TrainingStatus::Published),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingStatus::Draft => "draft",
            TrainingStatus::Published => "published",
        }
    }
}

/// Training row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Training {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub status: TrainingStatus,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Module row, ordered by `position` within a training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrainingModule {
    pub id: i64,
    pub training_id: i64,
    pub title: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Lesson row, ordered by `position` within a module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lesson {
    pub id: i64,
    pub module_id: i64,
    pub title: String,
    pub video_url: Option<String>,
    pub content: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// A module with its lessons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleWithLessons {
    #[serde(flatten)]
    pub module: TrainingModule,
    pub lessons: Vec<Lesson>,
}

/// A training with its full module/lesson tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingTree {
    #[serde(flatten)]
    pub training: Training,
    pub modules: Vec<ModuleWithLessons>,
}

impl TrainingTree {
    /// Groups `lessons` under `modules`, preserving both orderings
    pub fn assemble(training: Training, modules: Vec<TrainingModule>, lessons: Vec<Lesson>) -> Self {
        let modules = modules
            .into_iter()
            .map(|module| {
                let lessons = lessons
                    .iter()
                    .filter(|lesson| lesson.module_id == module.id)
                    .cloned()
                    .collect();
                ModuleWithLessons { module, lessons }
            })
            .collect();

        Self { training, modules }
    }
}

/// Completed/total lesson counts for one training and one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrainingProgress {
    pub training_id: i64,
    pub completed_lessons: i64,
    pub total_lessons: i64,
}

impl TrainingProgress {
    /// Completion percentage, 0 when the training has no lessons
    pub fn percent(&self) -> u8 {
        if self.total_lessons <= 0 {
            return 0;
        }
        ((self.completed_lessons.min(self.total_lessons) * 100) / self.total_lessons) as u8
    }
}

/// How a published training presents itself to one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrainingCategory {
    /// User has access and has completed at least one lesson
    InProgress,

    /// User has access but has not started
    Available,

    /// User holds no training grant
    Locked,
}

impl TrainingCategory {
    /// Parses the path segment used by `/user/trainings/{category}`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in-progress" => Some(TrainingCategory::InProgress),
            "available" => Some(TrainingCategory::Available),
            "locked" => Some(TrainingCategory::Locked),
            _ => None,
        }
    }

    /// Classifies a training given the user's access and progress
    pub fn classify(has_access: bool, progress: Option<&TrainingProgress>) -> Self {
        if !has_access {
            return TrainingCategory::Locked;
        }
        match progress {
            Some(p) if p.completed_lessons > 0 => TrainingCategory::InProgress,
            _ => TrainingCategory::Available,
        }
    }
}

/// Training as listed to a user, with progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    #[serde(flatten)]
    pub training: Training,
    pub progress_percent: u8,
}

/// Input for creating a training
#[derive(Debug, Clone)]
pub struct CreateTraining {
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

/// Partial training update
#[derive(Debug, Clone, Default)]
pub struct UpdateTraining {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub thumbnail: Option<Option<String>>,
}

const TRAINING_COLUMNS: &str =
    "id, title, description, thumbnail, status, deleted_at, created_at, updated_at";

impl Training {
    /// Creates a draft training
    pub async fn create(pool: &PgPool, data: CreateTraining) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Training>(&format!(
            "INSERT INTO trainings (title, description, thumbnail)
             VALUES ($1, $2, $3)
             RETURNING {TRAINING_COLUMNS}"
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.thumbnail)
        .fetch_one(pool)
        .await
    }

    /// Finds a training that has not been soft-deleted
    pub async fn find_active(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Training>(&format!(
            "SELECT {TRAINING_COLUMNS} FROM trainings WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists non-deleted trainings, optionally restricted to one status
    pub async fn list(
        pool: &PgPool,
        status: Option<TrainingStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Training>(&format!(
            "SELECT {TRAINING_COLUMNS} FROM trainings
             WHERE deleted_at IS NULL AND ($1::training_status IS NULL OR status = $1)
             ORDER BY created_at DESC"
        ))
        .bind(status)
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update to a non-deleted training
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTraining,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE trainings SET updated_at = NOW()");

        if let Some(title) = data.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(description) = data.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(thumbnail) = data.thumbnail {
            query.push(", thumbnail = ").push_bind(thumbnail);
        }

        query
            .push(" WHERE deleted_at IS NULL AND id = ")
            .push_bind(id)
            .push(format!(" RETURNING {TRAINING_COLUMNS}"));

        query.build_query_as::<Training>().fetch_optional(pool).await
    }

    /// Sets the status of a non-deleted training
    ///
    /// Returns `None` when the training is missing or soft-deleted.
    pub async fn update_status(
        pool: &PgPool,
        id: i64,
        status: TrainingStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Training>(&format!(
            "UPDATE trainings SET status = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {TRAINING_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    /// Soft-deletes a training; false if it was already gone
    pub async fn soft_delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE trainings SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Loads the module/lesson tree of a non-deleted training
    pub async fn load_tree(pool: &PgPool, id: i64) -> Result<Option<TrainingTree>, sqlx::Error> {
        let Some(training) = Self::find_active(pool, id).await? else {
            return Ok(None);
        };

        let modules = TrainingModule::list_by_training(pool, id).await?;
        let lessons = Lesson::list_by_training(pool, id).await?;

        Ok(Some(TrainingTree::assemble(training, modules, lessons)))
    }

    /// Lesson progress of `user_id` across all published trainings
    pub async fn progress_for_user(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Vec<TrainingProgress>, sqlx::Error> {
        sqlx::query_as::<_, TrainingProgress>(
            r#"
            SELECT t.id AS training_id,
                   COUNT(lp.lesson_id) AS completed_lessons,
                   COUNT(l.id) AS total_lessons
            FROM trainings t
            JOIN training_modules m ON m.training_id = t.id
            JOIN lessons l ON l.module_id = m.id
            LEFT JOIN lesson_progress lp ON lp.lesson_id = l.id AND lp.user_id = $1
            WHERE t.deleted_at IS NULL AND t.status = 'published'
            GROUP BY t.id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}

impl TrainingModule {
    /// Appends a module to a training
    pub async fn create(
        pool: &PgPool,
        training_id: i64,
        title: &str,
        position: i32,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, TrainingModule>(
            "INSERT INTO training_modules (training_id, title, position)
             VALUES ($1, $2, $3)
             RETURNING id, training_id, title, position, created_at",
        )
        .bind(training_id)
        .bind(title)
        .bind(position)
        .fetch_one(pool)
        .await
    }

    /// Finds a module whose training has not been soft-deleted
    pub async fn find_active(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TrainingModule>(
            "SELECT m.id, m.training_id, m.title, m.position, m.created_at
             FROM training_modules m
             JOIN trainings t ON t.id = m.training_id
             WHERE m.id = $1 AND t.deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_training(pool: &PgPool, training_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TrainingModule>(
            "SELECT id, training_id, title, position, created_at
             FROM training_modules WHERE training_id = $1
             ORDER BY position, id",
        )
        .bind(training_id)
        .fetch_all(pool)
        .await
    }
}

/// Input for creating a lesson
#[derive(Debug, Clone)]
pub struct CreateLesson {
    pub module_id: i64,
    pub title: String,
    pub video_url: Option<String>,
    pub content: Option<String>,
    pub position: i32,
}

impl Lesson {
    pub async fn create(pool: &PgPool, data: CreateLesson) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Lesson>(
            "INSERT INTO lessons (module_id, title, video_url, content, position)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, module_id, title, video_url, content, position, created_at",
        )
        .bind(data.module_id)
        .bind(data.title)
        .bind(data.video_url)
        .bind(data.content)
        .bind(data.position)
        .fetch_one(pool)
        .await
    }

    /// Returns the lesson's training id if the training is published and not deleted
    pub async fn published_training_id(pool: &PgPool, lesson_id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT t.id FROM lessons l
             JOIN training_modules m ON m.id = l.module_id
             JOIN trainings t ON t.id = m.training_id
             WHERE l.id = $1 AND t.deleted_at IS NULL AND t.status = 'published'",
        )
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_training(pool: &PgPool, training_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lesson>(
            "SELECT l.id, l.module_id, l.title, l.video_url, l.content, l.position, l.created_at
             FROM lessons l
             JOIN training_modules m ON m.id = l.module_id
             WHERE m.training_id = $1
             ORDER BY m.position, m.id, l.position, l.id",
        )
        .bind(training_id)
        .fetch_all(pool)
        .await
    }

    /// Records a completed lesson; idempotent
    pub async fn mark_complete(pool: &PgPool, user_id: i64, lesson_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO lesson_progress (user_id, lesson_id) VALUES ($1, $2)
             ON CONFLICT (user_id, lesson_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(lesson_id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
