// tests/admin_tests.rs

mod common;

use common::{create_admin, register_and_login, spawn_app};

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    // Arrange
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&address, &client).await;

    // Act
    let response = client
        .get(format!("{}/api/admin/users", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn admin_cannot_delete_or_demote_self() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, admin_id) = create_admin(&address, &client, &pool).await;

    // Act: self-deletion
    let delete_self = client
        .delete(format!("{}/api/admin/users/{}", address, admin_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_self.status().as_u16(), 400);

    // Act: self-demotion
    let demote_self = client
        .post(format!("{}/api/admin/users/{}/toggle-admin", address, admin_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(demote_self.status().as_u16(), 400);

    // Assert: the account and its flag are unchanged.
    let is_admin: bool = sqlx::query_scalar("SELECT is_admin FROM users WHERE id = ?")
        .bind(admin_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(is_admin);
}

#[tokio::test]
async fn admin_can_invite_and_toggle_other_users() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _admin_id) = create_admin(&address, &client, &pool).await;
    let name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    // Act: invite a fresh admin directly
    let created = client
        .post(format!("{}/api/admin/users", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "username": name,
            "email": format!("{}@example.com", name),
            "password": "password123",
            "is_admin": true
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let body: serde_json::Value = created.json().await.unwrap();
    let new_id = body["id"].as_i64().unwrap();

    // Act: demote them again
    let toggled: serde_json::Value = client
        .post(format!("{}/api/admin/users/{}/toggle-admin", address, new_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(toggled["is_admin"], false);
}

#[tokio::test]
async fn deleting_a_user_cascades_their_attempts() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    common::seed_questions(&pool, common::TEST_QUIZ_LENGTH).await;
    let (admin_token, _admin_id) = create_admin(&address, &client, &pool).await;

    let user_token = register_and_login(&address, &client).await;
    let start: serde_json::Value = client
        .post(format!("{}/api/quiz/start", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let attempt_id = start["attempt_id"].as_i64().unwrap();

    let user_id: i64 = sqlx::query_scalar("SELECT user_id FROM quiz_attempts WHERE id = ?")
        .bind(attempt_id)
        .fetch_one(&pool)
        .await
        .unwrap();

    // Act
    let response = client
        .delete(format!("{}/api/admin/users/{}", address, user_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    // Assert: the attempt went with the user.
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts WHERE id = ?")
        .bind(attempt_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn question_crud_round_trip() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _admin_id) = create_admin(&address, &client, &pool).await;

    // Create
    let created = client
        .post(format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "question_text": "Which option is correct?",
            "option_a": "this one",
            "option_b": "not this",
            "option_c": "nor this",
            "correct_answer": "a",
            "category": "demo"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let body: serde_json::Value = created.json().await.unwrap();
    let id = body["id"].as_i64().unwrap();

    // Create rejects an invalid letter
    let invalid = client
        .post(format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "question_text": "Broken?",
            "option_a": "x",
            "option_b": "y",
            "option_c": "z",
            "correct_answer": "d"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status().as_u16(), 400);

    // Update
    let updated = client
        .put(format!("{}/api/admin/questions/{}", address, id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "correct_answer": "b" }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 200);

    let letter: String = sqlx::query_scalar("SELECT correct_answer FROM questions WHERE id = ?")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(letter, "b");

    // Delete
    let deleted = client
        .delete(format!("{}/api/admin/questions/{}", address, id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    // A second delete is a 404.
    let gone = client
        .delete(format!("{}/api/admin/questions/{}", address, id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}

#[tokio::test]
async fn question_text_is_sanitized_on_create() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _admin_id) = create_admin(&address, &client, &pool).await;

    // Act
    let created = client
        .post(format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "question_text": "Safe? <script>alert(1)</script>",
            "option_a": "yes",
            "option_b": "no",
            "option_c": "maybe",
            "correct_answer": "a"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let body: serde_json::Value = created.json().await.unwrap();

    // Assert
    let stored: String = sqlx::query_scalar("SELECT question_text FROM questions WHERE id = ?")
        .bind(body["id"].as_i64().unwrap())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!stored.contains("script"));
}
