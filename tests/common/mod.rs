#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use laptopdash::api::{self, AppState};
use laptopdash::config::Config;
use laptopdash::db::Store;
use laptopdash::models::LaptopRecord;
use laptopdash::services::AuthService;
use laptopdash::state::SharedState;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "wonderland";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    _dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.general.database_path = format!(
        "sqlite:{}?mode=rwc",
        dir.path().join(format!("{}.db", uuid::Uuid::new_v4())).display()
    );
    config.analytics.forecast_seed = Some(7);
    config.import.batch_size = 2;
    config
}

pub async fn spawn_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let store = Store::new(&config.general.database_path)
        .await
        .expect("Failed to open test database");
    let shared = Arc::new(SharedState::with_store(config, store));
    shared
        .auth_service
        .create_admin(USERNAME, "alice@example.com", PASSWORD)
        .await
        .expect("Failed to create test user");

    let state = api::create_app_state(shared, None).await;
    let router = api::router(state.clone()).await;

    TestApp {
        router,
        state,
        _dir: dir,
    }
}

pub fn record(original_id: &str, brand: &str, price: f64, ram: &str, sales: i64) -> LaptopRecord {
    LaptopRecord {
        original_id: original_id.to_string(),
        name: format!("{brand} {original_id}"),
        price: Some(price),
        shop: Some(format!("{brand} flagship store")),
        brand: Some(brand.to_string()),
        ram: Some(ram.to_string()),
        cpu: Some("i5-12500H".to_string()),
        sales: Some(sales),
        rating: Some(4.5),
        ram_gb: laptopdash::parser::parse_ram_gb(ram),
    }
}

impl TestApp {
    pub async fn seed(&self, records: &[LaptopRecord]) {
        for record in records {
            Store::upsert_laptop(&self.state.shared.store.conn, record)
                .await
                .expect("Failed to seed laptop");
        }
    }

    /// Log in through the form and return the session cookie.
    pub async fn login(&self, username: &str, password: &str) -> Option<String> {
        let body = format!("username={username}&password={password}");
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers().get(header::LOCATION)?.to_str().ok()?;
        if location.starts_with("/login") {
            return None;
        }

        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    pub async fn get_bytes(&self, uri: &str, cookie: &str) -> Vec<u8> {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }
}
