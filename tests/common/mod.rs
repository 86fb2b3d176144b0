// tests/common/mod.rs

#![allow(dead_code)]

use quiz_backend::{config::Config, routes, state::AppState, utils::hash::hash_password};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Quiz length used by the test configuration. Small so tests can seed
/// a full bank quickly.
pub const TEST_QUIZ_LENGTH: i64 = 5;

/// Spawns the app on a random port backed by a fresh in-memory SQLite
/// database. Returns the base URL and a handle to the same database so
/// tests can seed fixtures directly.
pub async fn spawn_app() -> (String, SqlitePool) {
    // One connection keeps the in-memory database alive and shared
    // between the server and the test.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        questions_file: "questions.json".to_string(),
        questions_per_quiz: TEST_QUIZ_LENGTH,
        quiz_time_minutes: 45,
        files_dir: "files".to_string(),
        admin_username: None,
        admin_password: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

/// Seeds `count` bank questions whose correct answer is always 'a'.
pub async fn seed_questions(pool: &SqlitePool, count: i64) {
    for i in 0..count {
        sqlx::query(
            r#"
            INSERT INTO questions
            (question_text, option_a, option_b, option_c, option_d, correct_answer, created_at)
            VALUES (?, 'first', 'second', 'third', '', 'a', ?)
            "#,
        )
        .bind(format!("Seed question {}", i))
        .bind(chrono::Utc::now())
        .execute(pool)
        .await
        .expect("Failed to seed question");
    }
}

/// Registers a fresh user through the API and logs in.
/// Returns the bearer token.
pub async fn register_and_login(address: &str, client: &reqwest::Client) -> String {
    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let email = format!("{}@example.com", username);
    let password = "password123";

    let resp = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(resp.status().as_u16(), 201);

    login(address, client, &username, password).await
}

/// Logs in and returns the bearer token.
pub async fn login(address: &str, client: &reqwest::Client, username: &str, password: &str) -> String {
    let resp = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Login failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login json");

    resp["token"].as_str().expect("Token not found").to_string()
}

/// Inserts an admin account directly and logs in through the API.
/// Returns the token and the user id.
pub async fn create_admin(address: &str, client: &reqwest::Client, pool: &SqlitePool) -> (String, i64) {
    let username = format!("adm_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let password = "admin-password";
    let password_hash = hash_password(password).expect("Failed to hash password");

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO users (username, email, password_hash, is_admin, created_at)
        VALUES (?, ?, ?, 1, ?)
        RETURNING id
        "#,
    )
    .bind(&username)
    .bind(format!("{}@example.com", username))
    .bind(&password_hash)
    .bind(chrono::Utc::now())
    .fetch_one(pool)
    .await
    .expect("Failed to seed admin");

    let token = login(address, client, &username, password).await;
    (token, id)
}
