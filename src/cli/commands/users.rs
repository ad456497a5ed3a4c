//! User administration command handlers

use super::open_store;
use crate::config::Config;
use crate::services::{AuthError, AuthService, SeaOrmAuthService};

fn auth_service(config: &Config, store: crate::db::Store) -> SeaOrmAuthService {
    SeaOrmAuthService::new(store, config.security.clone())
}

pub async fn cmd_create_admin(
    config: &Config,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let auth = auth_service(config, open_store(config).await?);

    match auth.create_admin(username, email, password).await {
        Ok(user) => {
            println!("✓ Admin user '{}' created (ID: {})", user.username, user.id);
            Ok(())
        }
        Err(AuthError::UserExists(name)) => {
            println!("User '{name}' already exists");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn cmd_list_users(config: &Config) -> anyhow::Result<()> {
    let auth = auth_service(config, open_store(config).await?);
    let users = auth.list_users().await?;

    if users.is_empty() {
        println!("No users yet.");
        println!();
        println!("Create one with: laptopdash create-admin <username> <email> <password>");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");
    println!("{:<5} {:<20} {:<30} {}", "ID", "USERNAME", "EMAIL", "ROLE");

    for user in users {
        let role = if user.is_admin { "admin" } else { "user" };
        println!(
            "{:<5} {:<20} {:<30} {}",
            user.id, user.username, user.email, role
        );
    }

    Ok(())
}

pub async fn cmd_reset_password(
    config: &Config,
    username: &str,
    new_password: &str,
) -> anyhow::Result<()> {
    let auth = auth_service(config, open_store(config).await?);

    match auth.reset_password(username, new_password).await {
        Ok(()) => {
            println!("✓ Password for '{username}' has been reset");
            Ok(())
        }
        Err(AuthError::UserNotFound(name)) => {
            println!("User '{name}' does not exist");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
