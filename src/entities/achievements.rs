use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    #[sea_orm(string_value = "profile")]
    Profile,
    #[sea_orm(string_value = "social")]
    Social,
    #[sea_orm(string_value = "privacy")]
    Privacy,
    #[sea_orm(string_value = "discovery")]
    Discovery,
    #[sea_orm(string_value = "engagement")]
    Engagement,
}

/// Achievement catalogue entry.
/// - key: stable identifier referenced by the triggers
/// - points: reward written to the ledger when earned
/// - is_active: inactive achievements can no longer be awarded
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "achievements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub key: String,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub points: i32,
    pub category: AchievementCategory,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
