use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ContentProgress {
    id: Uuid,
    enrollment_id: Uuid,
    content_id: Uuid,
    completed: bool,
    progress_percentage: i32,
    time_spent_seconds: i64,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for ContentProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::ContentProgress
    }
}

/// Progress report for one content item. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ProgressUpdate {
    pub progress_percentage: Option<i32>,
    /// Added to the time already spent.
    pub time_spent_seconds: Option<i64>,
    pub completed: Option<bool>,
}

/// The mutable part of a progress row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub completed: bool,
    pub progress_percentage: i32,
    pub time_spent_seconds: i64,
}

impl ProgressUpdate {
    /// Applies the report: percentage clamped to 0..=100, reaching 100 completes the item,
    /// `completed = true` forces 100. Completion is never revoked.
    pub fn apply(&self, current: ProgressState) -> ProgressState {
        let mut next = current;

        if let Some(pct) = self.progress_percentage {
            next.progress_percentage = pct.clamp(0, 100);
        }

        if let Some(seconds) = self.time_spent_seconds {
            next.time_spent_seconds = next.time_spent_seconds.saturating_add(seconds.max(0));
        }

        if self.completed == Some(true) || next.progress_percentage >= 100 {
            next.completed = true;
        }

        if next.completed {
            next.progress_percentage = 100;
        }

        next
    }
}

impl ContentProgress {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn progress_percentage(&self) -> i32 {
        self.progress_percentage
    }

    pub fn time_spent_seconds(&self) -> i64 {
        self.time_spent_seconds
    }

    pub fn state(&self) -> ProgressState {
        ProgressState {
            completed: self.completed,
            progress_percentage: self.progress_percentage,
            time_spent_seconds: self.time_spent_seconds,
        }
    }

    /// Returns the existing row or opens a new one at 0%.
    pub async fn start(
        mm: &ModelManager,
        enrollment_id: Uuid,
        content_id: Uuid,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            r#"
            INSERT INTO content_progress (id, enrollment_id, content_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (enrollment_id, content_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(enrollment_id)
        .bind(content_id)
        .execute(mm.executor())
        .await?;

        let progress = sqlx::query_as(
            "SELECT * FROM content_progress WHERE enrollment_id = $1 AND content_id = $2",
        )
        .bind(enrollment_id)
        .bind(content_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(progress)
    }

    pub async fn save(self, mm: &ModelManager, state: ProgressState) -> DatabaseResult<Self> {
        let progress = sqlx::query_as(
            r#"
            UPDATE content_progress
            SET completed = $1,
                progress_percentage = $2,
                time_spent_seconds = $3,
                completed_at = CASE WHEN $1 THEN COALESCE(completed_at, now()) ELSE NULL END,
                updated_at = now()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(state.completed)
        .bind(state.progress_percentage)
        .bind(state.time_spent_seconds)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;
        Ok(progress)
    }

    pub async fn list_by_enrollment(
        mm: &ModelManager,
        enrollment_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM content_progress WHERE enrollment_id = $1 ORDER BY started_at",
        )
        .bind(enrollment_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Completed rows of the enrollment whose content is still published.
    pub async fn count_completed_published(
        mm: &ModelManager,
        enrollment_id: Uuid,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM content_progress p
            JOIN module_contents mc ON mc.id = p.content_id
            WHERE p.enrollment_id = $1 AND p.completed AND mc.is_published
            "#,
        )
        .bind(enrollment_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}

/// Rounds to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Average percentage over the rows, 0 when there are none.
pub fn average_progress(rows: &[ContentProgress]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let sum: i64 = rows.iter().map(|r| r.progress_percentage as i64).sum();
    round2(sum as f64 / rows.len() as f64)
}

#[cfg(test)]
mod test {
    use super::*;

    const FRESH: ProgressState = ProgressState {
        completed: false,
        progress_percentage: 0,
        time_spent_seconds: 0,
    };

    #[test]
    fn percentage_is_clamped() {
        let update = ProgressUpdate {
            progress_percentage: Some(-20),
            ..Default::default()
        };
        assert_eq!(update.apply(FRESH).progress_percentage, 0);

        let update = ProgressUpdate {
            progress_percentage: Some(150),
            ..Default::default()
        };
        let next = update.apply(FRESH);
        assert_eq!(next.progress_percentage, 100);
        assert!(next.completed);
    }

    #[test]
    fn time_accumulates() {
        let update = ProgressUpdate {
            time_spent_seconds: Some(90),
            ..Default::default()
        };
        let once = update.apply(FRESH);
        let twice = update.apply(once);
        assert_eq!(twice.time_spent_seconds, 180);
        assert!(!twice.completed);
    }

    #[test]
    fn explicit_completion_forces_full_percentage() {
        let update = ProgressUpdate {
            progress_percentage: Some(40),
            completed: Some(true),
            ..Default::default()
        };
        let next = update.apply(FRESH);
        assert!(next.completed);
        assert_eq!(next.progress_percentage, 100);
    }

    #[test]
    fn completion_is_sticky() {
        let done = ProgressState {
            completed: true,
            progress_percentage: 100,
            time_spent_seconds: 10,
        };
        let update = ProgressUpdate {
            progress_percentage: Some(10),
            completed: Some(false),
            ..Default::default()
        };
        let next = update.apply(done);
        assert!(next.completed);
        assert_eq!(next.progress_percentage, 100);
    }

    #[test]
    fn rounding_to_two_decimals() {
        assert_eq!(round2(33.3333), 33.33);
        assert_eq!(round2(66.666), 66.67);
    }
}
