use crate::entities::magic_link_attempt_entity as attempts;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

/// Sliding window limit on magic-link requests per normalized email.
///
/// Attempts live in `magic_link_attempts`, so every instance sharing the
/// database sees the same window and a restart does not reset it.
#[derive(Clone)]
pub struct MagicLinkRateLimiter {
    pool: DatabaseConnection,
    max_requests: u64,
    window: Duration,
}

impl MagicLinkRateLimiter {
    pub fn new(pool: DatabaseConnection, max_requests: u64, window_seconds: i64) -> Self {
        Self {
            pool,
            max_requests,
            window: Duration::seconds(window_seconds),
        }
    }

    /// Rejects with `RateLimited` when the window is full, otherwise records the attempt.
    pub async fn check_and_record(&self, email: &str) -> AppResult<()> {
        self.check_and_record_at(email, Utc::now()).await
    }

    pub async fn check_and_record_at(&self, email: &str, now: DateTime<Utc>) -> AppResult<()> {
        let since = now - self.window;
        let recent = attempts::Entity::find()
            .filter(attempts::Column::Email.eq(email))
            .filter(attempts::Column::AttemptedAt.gt(since))
            .count(&self.pool)
            .await?;

        if recent >= self.max_requests {
            log::warn!("Magic link rate limit hit for {email} ({recent} in window)");
            return Err(AppError::RateLimited(
                "Too many sign-in link requests, try again later".to_string(),
            ));
        }

        attempts::ActiveModel {
            email: Set(email.to_string()),
            attempted_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(())
    }

    /// Drops attempts that can no longer affect any window.
    pub async fn purge(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let res = attempts::Entity::delete_many()
            .filter(attempts::Column::AttemptedAt.lte(now - self.window))
            .exec(&self.pool)
            .await?;
        Ok(res.rows_affected)
    }
}
