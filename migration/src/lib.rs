pub use sea_orm_migration::prelude::*;

mod m20240815_000001_initial;
mod m20240820_000001_add_user_points;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240815_000001_initial::Migration),
            Box::new(m20240820_000001_add_user_points::Migration),
        ]
    }
}
