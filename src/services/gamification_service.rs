use crate::entities::{
    achievement_entity as achievements, level_entity as levels,
    point_transaction_entity as point_transactions, user_achievement_entity as user_achievements,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AchievementStatusResponse, AwardedAchievement, LevelResponse, PaginatedResponse,
    PaginationParams, PointTransactionResponse, UserStatsResponse,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

/// Where a point total sits on the level ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelStanding {
    pub current: Option<levels::Model>,
    pub next: Option<levels::Model>,
    pub progress_percent: i32,
}

/// Totals are clamped at read time; the ledger itself may sum negative.
pub fn clamp_points(total: i64) -> i64 {
    total.max(0)
}

/// Highest level reached and lowest level not yet reached, plus linear progress between them.
pub fn resolve_level_standing(points: i64, all_levels: &[levels::Model]) -> LevelStanding {
    let current = all_levels
        .iter()
        .filter(|l| i64::from(l.points_required) <= points)
        .max_by_key(|l| (l.points_required, l.level_number))
        .cloned();
    let next = all_levels
        .iter()
        .filter(|l| i64::from(l.points_required) > points)
        .min_by_key(|l| (l.points_required, l.level_number))
        .cloned();
    let progress_percent = progress_percent(points, current.as_ref(), next.as_ref());

    LevelStanding {
        current,
        next,
        progress_percent,
    }
}

/// Percentage of the way from the current threshold (0 without a current level)
/// to the next one, rounded and clamped to 0..=100. 100 when there is no next level.
pub fn progress_percent(
    points: i64,
    current: Option<&levels::Model>,
    next: Option<&levels::Model>,
) -> i32 {
    let Some(next) = next else {
        return 100;
    };
    let base = current.map(|l| i64::from(l.points_required)).unwrap_or(0);
    let span = i64::from(next.points_required) - base;
    if span <= 0 {
        return 100;
    }
    let pct = ((points - base) as f64 * 100.0 / span as f64).round();
    pct.clamp(0.0, 100.0) as i32
}

#[derive(Clone)]
pub struct GamificationService {
    pool: DatabaseConnection,
}

impl GamificationService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Sum of the user's ledger, never negative
    pub async fn get_user_points(&self, user_id: i64) -> AppResult<i64> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct SumRow {
            total: Option<i64>,
        }
        let total = point_transactions::Entity::find()
            .filter(point_transactions::Column::UserId.eq(user_id))
            .select_only()
            .column_as(Expr::col(point_transactions::Column::Points).sum(), "total")
            .into_model::<SumRow>()
            .one(&self.pool)
            .await?
            .and_then(|r| r.total)
            .unwrap_or(0);

        Ok(clamp_points(total))
    }

    /// All levels, ascending by level number
    pub async fn list_levels(&self) -> AppResult<Vec<levels::Model>> {
        let list = levels::Entity::find()
            .order_by_asc(levels::Column::LevelNumber)
            .all(&self.pool)
            .await?;
        Ok(list)
    }

    async fn level_standing(&self, user_id: i64) -> AppResult<(i64, LevelStanding)> {
        let points = self.get_user_points(user_id).await?;
        let all_levels = self.list_levels().await?;
        Ok((points, resolve_level_standing(points, &all_levels)))
    }

    pub async fn get_user_level(&self, user_id: i64) -> AppResult<Option<levels::Model>> {
        let (_, standing) = self.level_standing(user_id).await?;
        Ok(standing.current)
    }

    pub async fn get_next_level(&self, user_id: i64) -> AppResult<Option<levels::Model>> {
        let (_, standing) = self.level_standing(user_id).await?;
        Ok(standing.next)
    }

    pub async fn has_achievement(&self, user_id: i64, key: &str) -> AppResult<bool> {
        let Some(achievement) = achievements::Entity::find()
            .filter(achievements::Column::Key.eq(key))
            .one(&self.pool)
            .await?
        else {
            return Ok(false);
        };

        let count = user_achievements::Entity::find()
            .filter(user_achievements::Column::UserId.eq(user_id))
            .filter(user_achievements::Column::AchievementId.eq(achievement.id))
            .count(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Award an achievement once.
    ///
    /// Returns `None` when the key is unknown, inactive, or already earned.
    /// Otherwise the completion row and its ledger entry are written in one
    /// transaction. The completion insert is `ON CONFLICT DO NOTHING` and is
    /// the only duplicate guard: a repeat or concurrent award lands as zero
    /// affected rows and writes no ledger entry.
    pub async fn award_achievement(
        &self,
        user_id: i64,
        key: &str,
    ) -> AppResult<Option<AwardedAchievement>> {
        let Some(achievement) = achievements::Entity::find()
            .filter(achievements::Column::Key.eq(key))
            .filter(achievements::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let now = Utc::now();
        let txn = self.pool.begin().await?;

        let inserted = user_achievements::Entity::insert(user_achievements::ActiveModel {
            user_id: Set(user_id),
            achievement_id: Set(achievement.id),
            earned_at: Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([
                user_achievements::Column::UserId,
                user_achievements::Column::AchievementId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        if inserted == 0 {
            // already earned, possibly by a concurrent call
            txn.commit().await?;
            return Ok(None);
        }

        point_transactions::ActiveModel {
            user_id: Set(user_id),
            achievement_id: Set(Some(achievement.id)),
            points: Set(achievement.points),
            reason: Set(format!("Achievement: {}", achievement.name)),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        log::info!(
            "Achievement awarded: user={} key={} points={}",
            user_id,
            achievement.key,
            achievement.points
        );

        Ok(Some(AwardedAchievement {
            key: achievement.key,
            name: achievement.name,
            points: achievement.points,
        }))
    }

    /// Try each key in order; returns only the keys awarded by this call
    pub async fn check_and_award_multiple(
        &self,
        user_id: i64,
        keys: &[String],
    ) -> AppResult<Vec<String>> {
        let mut awarded = Vec::new();
        for key in keys {
            if let Some(a) = self.award_achievement(user_id, key).await? {
                awarded.push(a.key);
            }
        }
        Ok(awarded)
    }

    pub async fn get_user_stats(&self, user_id: i64) -> AppResult<UserStatsResponse> {
        let (points, standing) = self.level_standing(user_id).await?;

        let achievements_earned = user_achievements::Entity::find()
            .filter(user_achievements::Column::UserId.eq(user_id))
            .count(&self.pool)
            .await? as i64;
        let achievements_total = achievements::Entity::find()
            .filter(achievements::Column::IsActive.eq(true))
            .count(&self.pool)
            .await? as i64;

        let points_to_next_level = standing
            .next
            .as_ref()
            .map(|l| i64::from(l.points_required) - points);

        Ok(UserStatsResponse {
            total_points: points,
            current_level: standing.current.map(LevelResponse::from),
            next_level: standing.next.map(LevelResponse::from),
            progress_percent: standing.progress_percent,
            points_to_next_level,
            achievements_earned,
            achievements_total,
        })
    }

    /// Active achievements (plus retired ones the user already holds) with completion info
    pub async fn list_achievements_for_user(
        &self,
        user_id: i64,
    ) -> AppResult<Vec<AchievementStatusResponse>> {
        let earned: HashMap<i64, chrono::DateTime<Utc>> = user_achievements::Entity::find()
            .filter(user_achievements::Column::UserId.eq(user_id))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|ua| (ua.achievement_id, ua.earned_at))
            .collect();

        let list = achievements::Entity::find()
            .order_by_asc(achievements::Column::SortOrder)
            .order_by_asc(achievements::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(list
            .into_iter()
            .filter(|a| a.is_active || earned.contains_key(&a.id))
            .map(|a| {
                let completed_at = earned.get(&a.id).copied();
                AchievementStatusResponse::new(a, completed_at)
            })
            .collect())
    }

    /// Ledger entries, newest first
    pub async fn list_point_transactions(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<PointTransactionResponse>> {
        let base_query = point_transactions::Entity::find()
            .filter(point_transactions::Column::UserId.eq(user_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by_desc(point_transactions::Column::CreatedAt)
            .order_by_desc(point_transactions::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(PointTransactionResponse::from)
            .collect();

        Ok(PaginatedResponse::from_params(items, params, total))
    }

    /// Manual ledger entry not tied to an achievement. May be negative.
    pub async fn adjust_points(
        &self,
        user_id: i64,
        points: i32,
        reason: &str,
    ) -> AppResult<PointTransactionResponse> {
        if points == 0 {
            return Err(AppError::ValidationError(
                "Point adjustment must not be zero".to_string(),
            ));
        }
        let reason = reason.trim();
        if reason.is_empty() || reason.len() > 255 {
            return Err(AppError::ValidationError(
                "Reason must be between 1 and 255 characters".to_string(),
            ));
        }

        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let entry = point_transactions::ActiveModel {
            user_id: Set(user_id),
            achievement_id: Set(None),
            points: Set(points),
            reason: Set(reason.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Points adjusted: user={user_id} delta={points} reason={reason}");
        Ok(entry.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(number: i32, name: &str, points_required: i32) -> levels::Model {
        levels::Model {
            id: number as i64,
            level_number: number,
            name: name.to_string(),
            description: None,
            points_required,
        }
    }

    fn ladder() -> Vec<levels::Model> {
        vec![level(1, "Newcomer", 0), level(2, "Explorer", 50)]
    }

    #[test]
    fn test_clamp_points() {
        assert_eq!(clamp_points(-15), 0);
        assert_eq!(clamp_points(0), 0);
        assert_eq!(clamp_points(42), 42);
    }

    #[test]
    fn test_zero_points_is_newcomer_with_no_progress() {
        let standing = resolve_level_standing(0, &ladder());
        assert_eq!(standing.current.unwrap().name, "Newcomer");
        assert_eq!(standing.next.unwrap().name, "Explorer");
        assert_eq!(standing.progress_percent, 0);
    }

    #[test]
    fn test_exact_threshold_moves_to_that_level() {
        let standing = resolve_level_standing(50, &ladder());
        assert_eq!(standing.current.unwrap().name, "Explorer");
        assert!(standing.next.is_none());
        assert_eq!(standing.progress_percent, 100);

        let mut longer = ladder();
        longer.push(level(3, "Contributor", 150));
        let standing = resolve_level_standing(50, &longer);
        assert_eq!(standing.current.unwrap().name, "Explorer");
        assert_eq!(standing.next.unwrap().name, "Contributor");
        assert_eq!(standing.progress_percent, 0);
    }

    #[test]
    fn test_progress_is_linear_between_thresholds() {
        let standing = resolve_level_standing(25, &ladder());
        assert_eq!(standing.progress_percent, 50);
        let standing = resolve_level_standing(49, &ladder());
        assert_eq!(standing.progress_percent, 98);
    }

    #[test]
    fn test_no_zero_level_means_no_current_level() {
        let levels = vec![level(1, "Bronze", 10), level(2, "Silver", 20)];
        let standing = resolve_level_standing(5, &levels);
        assert!(standing.current.is_none());
        assert_eq!(standing.next.unwrap().name, "Bronze");
        assert_eq!(standing.progress_percent, 50);
    }

    #[test]
    fn test_no_levels_at_all() {
        let standing = resolve_level_standing(10, &[]);
        assert!(standing.current.is_none());
        assert!(standing.next.is_none());
        assert_eq!(standing.progress_percent, 100);
    }

    #[test]
    fn test_progress_always_within_bounds() {
        let mut levels = ladder();
        levels.push(level(3, "Contributor", 150));
        levels.push(level(4, "Connector", 300));
        for points in 0..400 {
            let pct = resolve_level_standing(points, &levels).progress_percent;
            assert!((0..=100).contains(&pct), "points={points} pct={pct}");
        }
    }

    #[test]
    fn test_unordered_levels_are_handled() {
        let levels = vec![level(2, "Explorer", 50), level(1, "Newcomer", 0)];
        let standing = resolve_level_standing(10, &levels);
        assert_eq!(standing.current.unwrap().level_number, 1);
        assert_eq!(standing.next.unwrap().level_number, 2);
        assert_eq!(standing.progress_percent, 20);
    }
}
