use crate::helpers::{pk_id, timestamp_now};
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

/// Achievement catalogue. Rows are seeded and later edited by admins only.
#[derive(DeriveIden)]
enum Achievements {
    Table,
    Id,
    Key,
    Name,
    Description,
    Points,
    Category,
    SortOrder,
    IsActive,
    CreatedAt,
}

/// Level thresholds, ordered by level_number.
#[derive(DeriveIden)]
enum Levels {
    Table,
    Id,
    LevelNumber,
    Name,
    Description,
    PointsRequired,
}

#[derive(DeriveIden)]
enum UserAchievements {
    Table,
    Id,
    UserId,
    AchievementId,
    EarnedAt,
}

/// Append-only ledger; a user's total is always SUM(points).
#[derive(DeriveIden)]
enum PointTransactions {
    Table,
    Id,
    UserId,
    AchievementId,
    Points,
    Reason,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Achievements::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, Achievements::Id))
                    .col(ColumnDef::new(Achievements::Key).string_len(64).not_null())
                    .col(ColumnDef::new(Achievements::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Achievements::Description).text().not_null())
                    .col(ColumnDef::new(Achievements::Points).integer().not_null())
                    .col(
                        ColumnDef::new(Achievements::Category)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Achievements::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Achievements::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(&mut timestamp_now(Achievements::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_achievements_key")
                    .table(Achievements::Table)
                    .col(Achievements::Key)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Levels::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, Levels::Id))
                    .col(ColumnDef::new(Levels::LevelNumber).integer().not_null())
                    .col(ColumnDef::new(Levels::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Levels::Description).text().null())
                    .col(ColumnDef::new(Levels::PointsRequired).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_levels_level_number")
                    .table(Levels::Table)
                    .col(Levels::LevelNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserAchievements::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, UserAchievements::Id))
                    .col(
                        ColumnDef::new(UserAchievements::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAchievements::AchievementId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(&mut timestamp_now(UserAchievements::EarnedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_achievements_user")
                            .from(UserAchievements::Table, UserAchievements::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_achievements_achievement")
                            .from(UserAchievements::Table, UserAchievements::AchievementId)
                            .to(Achievements::Table, Achievements::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // an achievement can be earned at most once; awards rely on this for ON CONFLICT
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_user_achievements_user_achievement")
                    .table(UserAchievements::Table)
                    .col(UserAchievements::UserId)
                    .col(UserAchievements::AchievementId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointTransactions::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, PointTransactions::Id))
                    .col(
                        ColumnDef::new(PointTransactions::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::AchievementId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(PointTransactions::Points).integer().not_null())
                    .col(
                        ColumnDef::new(PointTransactions::Reason)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(&mut timestamp_now(PointTransactions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_point_transactions_user")
                            .from(PointTransactions::Table, PointTransactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_point_transactions_achievement")
                            .from(PointTransactions::Table, PointTransactions::AchievementId)
                            .to(Achievements::Table, Achievements::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_point_transactions_user")
                    .table(PointTransactions::Table)
                    .col(PointTransactions::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(PointTransactions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(UserAchievements::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Levels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Achievements::Table).to_owned())
            .await?;
        Ok(())
    }
}
