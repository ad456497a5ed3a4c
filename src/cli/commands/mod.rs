mod db;
mod import;
mod users;

pub use db::{cmd_create_indexes, cmd_init_db};
pub use import::{cmd_backfill_ram_gb, cmd_import_csv};
pub use users::{cmd_create_admin, cmd_list_users, cmd_reset_password};

use crate::config::Config;
use crate::db::Store;

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await
}
