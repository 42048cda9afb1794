use crate::helpers::{pk_id, timestamp_now};
use sea_orm_migration::prelude::*;

/// Only the SHA-256 of a login token is stored.
#[derive(DeriveIden)]
enum MagicLinkTokens {
    Table,
    Id,
    Email,
    TokenHash,
    ExpiresAt,
    UsedAt,
    CreatedAt,
}

/// One row per link request; the rate limiter counts rows inside its window.
#[derive(DeriveIden)]
enum MagicLinkAttempts {
    Table,
    Id,
    Email,
    AttemptedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MagicLinkTokens::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, MagicLinkTokens::Id))
                    .col(
                        ColumnDef::new(MagicLinkTokens::Email)
                            .string_len(320)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MagicLinkTokens::TokenHash)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MagicLinkTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MagicLinkTokens::UsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(&mut timestamp_now(MagicLinkTokens::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_magic_link_tokens_hash")
                    .table(MagicLinkTokens::Table)
                    .col(MagicLinkTokens::TokenHash)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MagicLinkAttempts::Table)
                    .if_not_exists()
                    .col(&mut pk_id(manager, MagicLinkAttempts::Id))
                    .col(
                        ColumnDef::new(MagicLinkAttempts::Email)
                            .string_len(320)
                            .not_null(),
                    )
                    .col(&mut timestamp_now(MagicLinkAttempts::AttemptedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_magic_link_attempts_email_time")
                    .table(MagicLinkAttempts::Table)
                    .col(MagicLinkAttempts::Email)
                    .col(MagicLinkAttempts::AttemptedAt)
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
                    .table(MagicLinkAttempts::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(MagicLinkTokens::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
