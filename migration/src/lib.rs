pub use sea_orm_migration::prelude::*;

mod helpers;
mod m20251001_000001_create_directory_tables;
mod m20251001_000002_create_gamification_tables;
mod m20251001_000003_seed_gamification;
mod m20251001_000004_create_magic_link_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_directory_tables::Migration),
            Box::new(m20251001_000002_create_gamification_tables::Migration),
            Box::new(m20251001_000003_seed_gamification::Migration),
            Box::new(m20251001_000004_create_magic_link_tables::Migration),
        ]
    }
}
