pub use sea_orm_migration::prelude::*;

mod m20260615_102433_baseline_schema;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260615_102433_baseline_schema::Migration)]
    }
}
