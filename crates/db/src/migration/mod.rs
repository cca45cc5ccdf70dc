//! Database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260801_000001_initial;
mod m20260801_000002_documents;
mod m20260801_000003_email_branding;

/// The migration runner for all Faktura migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_initial::Migration),
            Box::new(m20260801_000002_documents::Migration),
            Box::new(m20260801_000003_email_branding::Migration),
        ]
    }
}
