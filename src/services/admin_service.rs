use crate::entities::{
    achievement_entity as achievements, level_entity as levels, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Thresholds must rise strictly with the level number.
///
/// `ladder` is `(level_number, points_required)` in any order.
pub fn validate_level_ladder(ladder: &[(i32, i32)]) -> AppResult<()> {
    let mut sorted = ladder.to_vec();
    sorted.sort_by_key(|(number, _)| *number);
    for pair in sorted.windows(2) {
        let ((low_num, low_pts), (high_num, high_pts)) = (pair[0], pair[1]);
        if low_num == high_num {
            return Err(AppError::ValidationError(format!(
                "Level {low_num} already exists"
            )));
        }
        if high_pts <= low_pts {
            return Err(AppError::ValidationError(format!(
                "Level {high_num} must require more points than level {low_num} ({low_pts})"
            )));
        }
    }
    if sorted.iter().any(|(n, p)| *n < 1 || *p < 0) {
        return Err(AppError::ValidationError(
            "Level numbers start at 1 and thresholds cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn non_empty(field: &str, value: &str, max: usize) -> AppResult<String> {
    let v = value.trim();
    if v.is_empty() || v.chars().count() > max {
        return Err(AppError::ValidationError(format!(
            "{field} must be between 1 and {max} characters"
        )));
    }
    Ok(v.to_string())
}

#[derive(Clone)]
pub struct AdminService {
    pool: DatabaseConnection,
}

impl AdminService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn ensure_admin(&self, user_id: i64) -> AppResult<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::PermissionDenied)?;
        if !user.is_admin {
            return Err(AppError::PermissionDenied);
        }
        Ok(())
    }

    /// Includes inactive achievements.
    pub async fn list_all_achievements(&self) -> AppResult<Vec<AchievementResponse>> {
        Ok(achievements::Entity::find()
            .order_by_asc(achievements::Column::SortOrder)
            .order_by_asc(achievements::Column::Id)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(AchievementResponse::from)
            .collect())
    }

    /// Keys and point values are fixed once seeded; only descriptive fields change.
    pub async fn update_achievement(
        &self,
        key: &str,
        request: UpdateAchievementRequest,
    ) -> AppResult<AchievementResponse> {
        let achievement = achievements::Entity::find()
            .filter(achievements::Column::Key.eq(key))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Achievement {key} not found")))?;

        let mut active: achievements::ActiveModel = achievement.into();
        if let Some(name) = request.name {
            active.name = Set(non_empty("Name", &name, 100)?);
        }
        if let Some(description) = request.description {
            active.description = Set(non_empty("Description", &description, 500)?);
        }
        if let Some(sort_order) = request.sort_order {
            active.sort_order = Set(sort_order);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        let updated = active.update(&self.pool).await?;
        log::info!("Achievement {key} updated");
        Ok(updated.into())
    }

    async fn ladder(&self) -> AppResult<Vec<levels::Model>> {
        Ok(levels::Entity::find()
            .order_by_asc(levels::Column::LevelNumber)
            .all(&self.pool)
            .await?)
    }

    pub async fn create_level(&self, request: CreateLevelRequest) -> AppResult<LevelResponse> {
        let name = non_empty("Name", &request.name, 100)?;

        let mut ladder: Vec<(i32, i32)> = self
            .ladder()
            .await?
            .iter()
            .map(|l| (l.level_number, l.points_required))
            .collect();
        ladder.push((request.level_number, request.points_required));
        validate_level_ladder(&ladder)?;

        let level = levels::ActiveModel {
            level_number: Set(request.level_number),
            name: Set(name),
            description: Set(request.description.map(|d| d.trim().to_string())),
            points_required: Set(request.points_required),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Level {} created at {} points",
            level.level_number,
            level.points_required
        );
        Ok(level.into())
    }

    pub async fn update_level(
        &self,
        level_number: i32,
        request: UpdateLevelRequest,
    ) -> AppResult<LevelResponse> {
        let ladder = self.ladder().await?;
        let level = ladder
            .iter()
            .find(|l| l.level_number == level_number)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Level {level_number} not found")))?;

        let mut active: levels::ActiveModel = level.into();
        if let Some(name) = request.name {
            active.name = Set(non_empty("Name", &name, 100)?);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description.trim().to_string()).filter(|d| !d.is_empty()));
        }
        if let Some(points_required) = request.points_required {
            let proposed: Vec<(i32, i32)> = ladder
                .iter()
                .map(|l| {
                    if l.level_number == level_number {
                        (l.level_number, points_required)
                    } else {
                        (l.level_number, l.points_required)
                    }
                })
                .collect();
            validate_level_ladder(&proposed)?;
            active.points_required = Set(points_required);
        }

        Ok(active.update(&self.pool).await?.into())
    }
}
