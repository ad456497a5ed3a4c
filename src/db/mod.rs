use anyhow::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::entities::{comments, laptops};
use crate::models::{LaptopFilter, LaptopRecord};

pub mod migrator;
pub mod repositories;

pub use repositories::laptop::{
    BrandRamRow, GroupColumn, GroupStatsRow, PriceBandRow, RamGbStatsRow, UpsertOutcome,
};
pub use repositories::user::User;

/// Single-column indexes created on demand by `create-indexes`.
const SECONDARY_INDEXES: &[(&str, &str, &str)] = &[
    ("idx_jd_brand", "jd", "brand"),
    ("idx_jd_ram", "jd", "ram"),
    ("idx_jd_cpu", "jd", "cpu"),
    ("idx_jd_price", "jd", "price"),
    ("idx_jd_sales", "jd", "sales"),
    ("idx_comments_laptop_id", "comments", "laptop_id"),
];

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
        if !path_str.starts_with(":memory:") {
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Create the single-column lookup indexes. Existing indexes are left alone.
    /// Returns how many statements succeeded.
    pub async fn create_indexes(&self) -> Result<usize> {
        let backend = self.conn.get_database_backend();
        let mut created = 0;

        for (name, table, column) in SECONDARY_INDEXES {
            let stmt = Index::create()
                .name(*name)
                .table(sea_orm::sea_query::Alias::new(*table))
                .col(sea_orm::sea_query::Alias::new(*column))
                .if_not_exists()
                .to_owned();

            match self.conn.execute(backend.build(&stmt)).await {
                Ok(_) => {
                    info!(index = name, "Index ensured");
                    created += 1;
                }
                Err(e) => warn!(index = name, error = %e, "Failed to create index"),
            }
        }

        Ok(created)
    }

    fn laptop_repo(&self) -> repositories::laptop::LaptopRepository {
        repositories::laptop::LaptopRepository::new(self.conn.clone())
    }

    fn comment_repo(&self) -> repositories::comment::CommentRepository {
        repositories::comment::CommentRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn get_laptop(&self, id: i32) -> Result<Option<laptops::Model>> {
        self.laptop_repo().get(id).await
    }

    pub async fn find_laptops(
        &self,
        filter: &LaptopFilter,
        window: Option<(u64, u64)>,
    ) -> Result<(Vec<laptops::Model>, u64)> {
        self.laptop_repo().find(filter, window).await
    }

    pub async fn list_all_laptops(&self) -> Result<Vec<laptops::Model>> {
        self.laptop_repo().list_all().await
    }

    pub async fn count_laptops(&self, filter: &LaptopFilter) -> Result<u64> {
        self.laptop_repo().count(filter).await
    }

    pub async fn avg_price(&self, filter: &LaptopFilter) -> Result<Option<f64>> {
        self.laptop_repo().avg_price(filter).await
    }

    pub async fn total_sales(&self) -> Result<i64> {
        self.laptop_repo().total_sales().await
    }

    pub async fn distinct_brand_count(&self) -> Result<u64> {
        self.laptop_repo().distinct_brand_count().await
    }

    pub async fn competitor_listings(
        &self,
        brand: &str,
        min: f64,
        max: f64,
    ) -> Result<Vec<laptops::Model>> {
        self.laptop_repo().competitors(brand, min, max).await
    }

    pub async fn group_stats(&self, group: GroupColumn) -> Result<Vec<GroupStatsRow>> {
        self.laptop_repo().group_stats(group).await
    }

    pub async fn ram_gb_stats(&self) -> Result<Vec<RamGbStatsRow>> {
        self.laptop_repo().ram_gb_stats().await
    }

    pub async fn price_band(&self, min: f64, max: Option<f64>) -> Result<PriceBandRow> {
        self.laptop_repo().price_band(min, max).await
    }

    pub async fn top_laptops_by_sales(&self, limit: u64) -> Result<Vec<laptops::Model>> {
        self.laptop_repo().top_by_sales(limit).await
    }

    pub async fn brand_ram_options(&self) -> Result<Vec<BrandRamRow>> {
        self.laptop_repo().brand_ram_options().await
    }

    pub async fn upsert_laptop<C: ConnectionTrait>(
        conn: &C,
        record: &LaptopRecord,
    ) -> Result<UpsertOutcome> {
        repositories::laptop::LaptopRepository::upsert(conn, record).await
    }

    pub async fn laptops_missing_ram_gb(
        &self,
        after_id: i32,
        limit: u64,
    ) -> Result<Vec<(i32, Option<String>)>> {
        self.laptop_repo().missing_ram_gb(after_id, limit).await
    }

    pub async fn set_ram_gb<C: ConnectionTrait>(conn: &C, id: i32, ram_gb: Option<i32>) -> Result<()> {
        repositories::laptop::LaptopRepository::set_ram_gb(conn, id, ram_gb).await
    }

    pub async fn list_comments(
        &self,
        laptop_id: Option<i32>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<comments::Model>, u64)> {
        self.comment_repo().list(laptop_id, limit, offset).await
    }

    pub async fn comment_contents_for_brand(&self, brand: Option<&str>) -> Result<Vec<String>> {
        self.comment_repo().contents_for_brand(brand).await
    }

    pub async fn count_comments(&self) -> Result<u64> {
        self.comment_repo().count().await
    }

    pub async fn upsert_comment<C: ConnectionTrait>(
        conn: &C,
        laptop_id: i32,
        content: &str,
    ) -> Result<bool> {
        repositories::comment::CommentRepository::upsert_for_laptop(conn, laptop_id, content).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_admin: bool,
        config: &crate::config::SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(username, email, password, is_admin, config)
            .await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_password(
        &self,
        username: &str,
        new_password: &str,
        config: &crate::config::SecurityConfig,
    ) -> Result<bool> {
        self.user_repo()
            .update_password(username, new_password, config)
            .await
    }
}
