pub use sea_orm_migration::prelude::*;

mod m20250612_101500_biometrics;
mod m20250618_092250_sessions;
mod m20250704_180035_kv_store;
mod m20250812_153644_outbox;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250612_101500_biometrics::Migration),
            Box::new(m20250618_092250_sessions::Migration),
            Box::new(m20250704_180035_kv_store::Migration),
            Box::new(m20250812_153644_outbox::Migration),
        ]
    }
}
