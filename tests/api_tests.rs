mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{PASSWORD, USERNAME, record, spawn_app};
use laptopdash::db::Store;
use laptopdash::services::AuthService;
use http_body_util::BodyExt;
use tower::ServiceExt;

fn market() -> Vec<laptopdash::models::LaptopRecord> {
    vec![
        record("1001", "Lenovo", 4999.0, "16GB", 1200),
        record("1002", "Lenovo", 6999.0, "32GB", 800),
        record("1003", "HP", 4599.0, "16GB", 900),
        record("1004", "HP", 3299.0, "8GB", 1500),
        record("1005", "Dell", 5299.0, "16GB", 700),
        record("1006", "ASUS", 12999.0, "64GB", 50),
    ]
}

#[tokio::test]
async fn test_api_requires_login() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/overview_stats", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login?next=%2F");
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let app = spawn_app().await;
    assert!(app.login(USERNAME, "not-the-password").await.is_none());
    assert!(app.login("nobody", PASSWORD).await.is_none());
}

#[tokio::test]
async fn test_list_data_with_filters() {
    let app = spawn_app().await;
    app.seed(&market()).await;
    let cookie = app.login(USERNAME, PASSWORD).await.expect("login failed");

    let (status, body) = app.get("/api/data", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 6);
    assert_eq!(body["data"].as_array().unwrap().len(), 6);

    let (_, body) = app
        .get("/api/data?brand=HP&page=1&page_size=1", Some(&cookie))
        .await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 1);

    let (_, body) = app
        .get("/api/data?ram_gb_min=32&price_min=&page=abc", Some(&cookie))
        .await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_list_data_rejects_unreachable_pages() {
    let app = spawn_app().await;
    app.seed(&market()).await;
    let cookie = app.login(USERNAME, PASSWORD).await.expect("login failed");

    let (status, body) = app
        .get("/api/data?page=18446744073709551615&page_size=2", Some(&cookie))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("out of range"));

    let (status, body) = app.get("/api/data?page=1&page_size=5000", Some(&cookie)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, body) = app.get("/api/data?page=4&page_size=2", Some(&cookie)).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 6);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_overview_stats_are_cached() {
    let app = spawn_app().await;
    app.seed(&market()).await;
    let cookie = app.login(USERNAME, PASSWORD).await.expect("login failed");

    let first = app.get_bytes("/api/overview_stats", &cookie).await;
    let json: serde_json::Value = serde_json::from_slice(&first).unwrap();
    assert_eq!(json["data"]["total_products"], 6);
    assert_eq!(json["data"]["total_brands"], 4);
    assert_eq!(json["data"]["total_sales"], 5150);

    app.seed(&[record("2001", "Acer", 3999.0, "8GB", 10)]).await;

    let second = app.get_bytes("/api/overview_stats", &cookie).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_stats_endpoints() {
    let app = spawn_app().await;
    app.seed(&market()).await;
    let cookie = app.login(USERNAME, PASSWORD).await.expect("login failed");

    let (_, body) = app.get("/api/price_range_analysis", Some(&cookie)).await;
    let ranges = body["data"].as_array().unwrap();
    let total: i64 = ranges.iter().map(|r| r["count"].as_i64().unwrap()).sum();
    assert_eq!(total, 6);

    let (_, body) = app.get("/api/sales_analysis", Some(&cookie)).await;
    assert_eq!(body["data"]["top_products"][0]["original_id"], "1004");
    assert_eq!(body["data"]["brand_sales"][0]["brand"], "HP");

    let (_, body) = app.get("/api/price_sales_correlation", Some(&cookie)).await;
    assert_eq!(body["data"]["price_sales_data"].as_array().unwrap().len(), 6);
    assert!(body["data"]["correlation"].as_f64().unwrap() < 0.0);

    let (_, body) = app.get("/api/ram_analysis", Some(&cookie)).await;
    assert_eq!(body["success"], true);
    assert!(!body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_competitive_analysis() {
    let app = spawn_app().await;
    let cookie = app.login(USERNAME, PASSWORD).await.expect("login failed");

    let (_, body) = app.get("/api/competitive_analysis", Some(&cookie)).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], serde_json::json!([]));

    app.seed(&market()).await;
    let (_, body) = app
        .get("/api/competitive_analysis?brand=HP", Some(&cookie))
        .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["target_brand"], "HP");
    assert_eq!(body["data"]["target_count"], 2);
    let competitors = body["data"]["competitors"].as_array().unwrap();
    assert!(competitors.iter().all(|c| c["brand"] != "HP"));
}

#[tokio::test]
async fn test_price_trend_prediction() {
    let app = spawn_app().await;
    app.seed(&market()).await;
    let cookie = app.login(USERNAME, PASSWORD).await.expect("login failed");

    let (_, body) = app
        .get("/api/price_trend_prediction?brand=Lenovo&days=14", Some(&cookie))
        .await;
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["current_avg_price"], 5999.0);
    assert_eq!(data["filter"]["brand"], "Lenovo");
    assert_eq!(data["price_data"]["historical"].as_array().unwrap().len(), 30);

    let prediction = data["price_data"]["prediction"].as_array().unwrap();
    assert_eq!(prediction.len(), 14);
    for point in prediction {
        let price = point["price"].as_f64().unwrap();
        assert!(price >= 0.0);
        assert!(point["lower"].as_f64().unwrap() <= price);
        assert!(point["upper"].as_f64().unwrap() >= price);
    }

    let (_, again) = app
        .get("/api/price_trend_prediction?brand=Lenovo&days=14", Some(&cookie))
        .await;
    assert_eq!(body, again);

    let (status, body) = app
        .get("/api/price_trend_prediction?days=0", Some(&cookie))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_sentiment_and_clustering_on_empty_catalog() {
    let app = spawn_app().await;
    let cookie = app.login(USERNAME, PASSWORD).await.expect("login failed");

    let (_, body) = app
        .get("/api/sentiment_analysis?brand=Nobody", Some(&cookie))
        .await;
    assert_eq!(body["success"], false);

    let (status, body) = app.get("/api/laptop_clustering", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Not enough"));
}

#[tokio::test]
async fn test_comments_for_laptop() {
    let app = spawn_app().await;
    app.seed(&market()).await;
    let cookie = app.login(USERNAME, PASSWORD).await.expect("login failed");

    let (_, body) = app.get("/api/data?brand=Dell", Some(&cookie)).await;
    let laptop_id = body["data"][0]["id"].as_i64().unwrap();
    let laptop_id = i32::try_from(laptop_id).unwrap();

    Store::upsert_comment(&app.state.shared.store.conn, laptop_id, "很好用，速度快")
        .await
        .unwrap();

    let (_, body) = app
        .get(&format!("/api/comments?laptop_id={laptop_id}"), Some(&cookie))
        .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["laptop"]["brand"], "Dell");
    assert_eq!(body["data"]["comments"][0]["content"], "很好用，速度快");

    let (status, _) = app.get("/api/comments?limit=5000", Some(&cookie)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_duplicate_username() {
    let app = spawn_app().await;

    let register = |username: &str| {
        Request::builder()
            .method("POST")
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "username={username}&email={username}%40example.com&password=secret1&password2=secret1"
            )))
            .unwrap()
    };

    let response = app.router.clone().oneshot(register("bob")).await.unwrap();
    assert_eq!(response.headers()[header::LOCATION], "/login");
    assert!(app.login("bob", "secret1").await.is_some());

    let response = app.router.clone().oneshot(register("bob")).await.unwrap();
    assert_eq!(response.headers()[header::LOCATION], "/register");

    let users = app.state.shared.auth_service.list_users().await.unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = spawn_app().await;
    let cookie = app.login(USERNAME, PASSWORD).await.expect("login failed");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (status, _) = app.get("/api/brand_ram_options", Some(&cookie)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_static_assets_and_fallback() {
    let app = spawn_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/static/dashboard.js")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let script = response.into_body().collect().await.unwrap().to_bytes();
    let script = String::from_utf8_lossy(&script);
    for endpoint in [
        "/api/competitive_analysis",
        "/api/price_trend_prediction",
        "/api/sentiment_analysis",
        "/api/brand_ram_options",
    ] {
        assert!(script.contains(endpoint), "dashboard never calls {endpoint}");
    }

    let (status, _) = app.get("/no/such/page", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
