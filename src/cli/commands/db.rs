//! Schema command handlers

use super::open_store;
use crate::config::Config;
use crate::services::{AuthService, SeaOrmAuthService};

pub async fn cmd_init_db(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    println!("✓ Database tables created");

    let auth = SeaOrmAuthService::new(store, config.security.clone());
    if let Some(admin) = auth.ensure_default_admin().await? {
        println!("✓ Created default admin user: {}", admin.username);
        println!("  Change its password right after the first login.");
    }

    Ok(())
}

pub async fn cmd_create_indexes(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let created = store.create_indexes().await?;
    println!("✓ {created} indexes created or already present");
    Ok(())
}
