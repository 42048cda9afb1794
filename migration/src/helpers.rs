use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

/// Auto-increment primary key column.
///
/// SQLite only accepts AUTOINCREMENT on an `integer` primary key (which is
/// 64-bit there anyway); other backends get `bigint`.
pub fn pk_id<T: IntoIden>(manager: &SchemaManager, name: T) -> ColumnDef {
    let mut col = ColumnDef::new(name);
    match manager.get_database_backend() {
        DbBackend::Sqlite => col.integer(),
        _ => col.big_integer(),
    };
    col.not_null().auto_increment().primary_key();
    col
}

/// `created_at` / `updated_at` style column defaulting to the current time.
pub fn timestamp_now<T: IntoIden>(name: T) -> ColumnDef {
    let mut col = ColumnDef::new(name);
    col.timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp());
    col
}
