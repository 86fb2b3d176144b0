// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,

    /// Path of the JSON question source imported at startup.
    pub questions_file: String,
    /// Number of questions sampled into every quiz.
    pub questions_per_quiz: i64,
    /// Advisory time limit reported to the client. Not enforced server-side.
    pub quiz_time_minutes: u64,
    /// Directory enumerated and served for authenticated download.
    pub files_dir: String,

    /// Optional admin account seeded at startup.
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:quiz_app.db".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let questions_file =
            env::var("QUESTIONS_FILE").unwrap_or_else(|_| "questions.json".to_string());

        let questions_per_quiz = env::var("QUESTIONS_PER_QUIZ")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        let quiz_time_minutes = env::var("QUIZ_TIME_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(45);

        let files_dir = env::var("FILES_DIR").unwrap_or_else(|_| "files".to_string());

        let admin_username = env::var("ADMIN_USERNAME").ok();
        let admin_password = env::var("ADMIN_PASSWORD").ok();

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            questions_file,
            questions_per_quiz,
            quiz_time_minutes,
            files_dir,
            admin_username,
            admin_password,
        }
    }
}
