use crate::entities::{
    AchievementCategory, achievement_entity as achievements, level_entity as levels,
    point_transaction_entity as point_transactions,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AchievementResponse {
    pub key: String,
    pub name: String,
    pub description: String,
    pub points: i32,
    pub category: AchievementCategory,
    pub sort_order: i32,
    pub is_active: bool,
}

impl From<achievements::Model> for AchievementResponse {
    fn from(m: achievements::Model) -> Self {
        Self {
            key: m.key,
            name: m.name,
            description: m.description,
            points: m.points,
            category: m.category,
            sort_order: m.sort_order,
            is_active: m.is_active,
        }
    }
}

/// Achievement annotated with the caller's completion.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AchievementStatusResponse {
    pub key: String,
    pub name: String,
    pub description: String,
    pub points: i32,
    pub category: AchievementCategory,
    pub sort_order: i32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AchievementStatusResponse {
    pub fn new(m: achievements::Model, completed_at: Option<DateTime<Utc>>) -> Self {
        Self {
            key: m.key,
            name: m.name,
            description: m.description,
            points: m.points,
            category: m.category,
            sort_order: m.sort_order,
            completed: completed_at.is_some(),
            completed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LevelResponse {
    pub level_number: i32,
    pub name: String,
    pub description: Option<String>,
    pub points_required: i32,
}

impl From<levels::Model> for LevelResponse {
    fn from(m: levels::Model) -> Self {
        Self {
            level_number: m.level_number,
            name: m.name,
            description: m.description,
            points_required: m.points_required,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserStatsResponse {
    pub total_points: i64,
    pub current_level: Option<LevelResponse>,
    pub next_level: Option<LevelResponse>,
    /// 0..=100, 100 at the highest level
    pub progress_percent: i32,
    pub points_to_next_level: Option<i64>,
    pub achievements_earned: i64,
    pub achievements_total: i64,
}

/// Returned by an award that actually wrote to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AwardedAchievement {
    pub key: String,
    pub name: String,
    pub points: i32,
}

/// Documentation shape only; the handler validates the raw JSON itself.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckAchievementsRequest {
    #[serde(rename = "achievementKeys")]
    pub achievement_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckAchievementsResponse {
    pub awarded: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PointTransactionResponse {
    pub id: i64,
    pub achievement_id: Option<i64>,
    pub points: i32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl From<point_transactions::Model> for PointTransactionResponse {
    fn from(m: point_transactions::Model) -> Self {
        Self {
            id: m.id,
            achievement_id: m.achievement_id,
            points: m.points,
            reason: m.reason,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateAchievementRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateLevelRequest {
    pub level_number: i32,
    pub name: String,
    pub description: Option<String>,
    pub points_required: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateLevelRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub points_required: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdjustPointsRequest {
    /// Signed delta; must not be zero
    pub points: i32,
    pub reason: String,
}
