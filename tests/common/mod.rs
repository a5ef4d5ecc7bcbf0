#![allow(dead_code)]

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;
use std::sync::OnceLock;
use uuid::Uuid;

static INIT: OnceLock<()> = OnceLock::new();

/// Connects and migrates, or returns `None` when no database is configured
/// so the suite can run without one.
pub async fn setup() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return None;
    }

    INIT.get_or_init(|| {
        if std::env::var("SERVER_ADDRESS").is_err() {
            std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
        }
        if std::env::var("JWT_SECRET").is_err() {
            std::env::set_var("JWT_SECRET", "test_secret_key");
        }
        if std::env::var("API_RPS").is_err() {
            std::env::set_var("API_RPS", "1000");
        }
        referee_backend::config::init_config().expect("init config");
    });

    let pool = referee_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    Some(pool)
}

pub fn bearer_token(user_id: Uuid, role: &str) -> String {
    let claims = referee_backend::middleware::auth::Claims {
        sub: user_id.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        role: Some(role.to_string()),
    };
    let secret = referee_backend::config::get_config().jwt_secret.clone();
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode token")
}

pub async fn seed_user(pool: &PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO users (id, external_id, name, email, role)
        VALUES ($1, $2, $3, $4, 'REFEREE')
        "#,
    )
    .bind(id)
    .bind(format!("ext-{}", id))
    .bind("Test Referee")
    .bind(format!("referee_{}@example.com", id))
    .execute(pool)
    .await
    .expect("seed user");
    id
}

pub async fn seed_category(pool: &PgPool, category_type: &str) -> (Uuid, String) {
    let id = Uuid::new_v4();
    let slug = format!("cat-{}", id);
    sqlx::query(
        r#"
        INSERT INTO categories (id, slug, name, category_type)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(&slug)
    .bind("Test Category")
    .bind(category_type)
    .execute(pool)
    .await
    .expect("seed category");
    (id, slug)
}

pub async fn seed_tag(pool: &PgPool, axis: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO tags (id, axis, slug, name)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(axis)
    .bind(format!("tag-{}", id))
    .bind("Test Tag")
    .execute(pool)
    .await
    .expect("seed tag");
    id
}

pub struct SeededQuestion {
    pub id: Uuid,
    pub correct_option: Uuid,
    pub wrong_option: Uuid,
}

pub async fn seed_question(
    pool: &PgPool,
    category_id: Uuid,
    question_type: &str,
) -> SeededQuestion {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO questions (id, category_id, question_type, body, explanation)
        VALUES ($1, $2, $3, 'What is the restart?', 'Indirect free kick.')
        "#,
    )
    .bind(id)
    .bind(category_id)
    .bind(question_type)
    .execute(pool)
    .await
    .expect("seed question");

    let correct_option = seed_option(pool, "answer_options", "question_id", id, "DECISION", true).await;
    let wrong_option = seed_option(pool, "answer_options", "question_id", id, "DECISION", false).await;
    SeededQuestion {
        id,
        correct_option,
        wrong_option,
    }
}

pub async fn tag_question(pool: &PgPool, question_id: Uuid, tag_id: Uuid) {
    sqlx::query(r#"INSERT INTO question_tags (question_id, tag_id) VALUES ($1, $2)"#)
        .bind(question_id)
        .bind(tag_id)
        .execute(pool)
        .await
        .expect("tag question");
}

pub struct SeededClip {
    pub id: Uuid,
    pub correct_option: Uuid,
    pub wrong_option: Uuid,
}

pub async fn seed_clip(pool: &PgPool) -> SeededClip {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO video_clips (id, title, file_url)
        VALUES ($1, 'Challenge in the box', 'https://clips.example/challenge.mp4')
        "#,
    )
    .bind(id)
    .execute(pool)
    .await
    .expect("seed clip");

    let correct_option =
        seed_option(pool, "clip_decision_options", "clip_id", id, "DECISION", true).await;
    let wrong_option =
        seed_option(pool, "clip_decision_options", "clip_id", id, "DECISION", false).await;
    SeededClip {
        id,
        correct_option,
        wrong_option,
    }
}

/// Adds a correct/incorrect recommendation pair, turning the clip into a
/// dual-answer VAR item.
pub async fn add_recommendation_options(pool: &PgPool, clip_id: Uuid) -> (Uuid, Uuid) {
    let correct =
        seed_option(pool, "clip_decision_options", "clip_id", clip_id, "RECOMMENDATION", true)
            .await;
    let wrong =
        seed_option(pool, "clip_decision_options", "clip_id", clip_id, "RECOMMENDATION", false)
            .await;
    (correct, wrong)
}

pub async fn tag_clip(pool: &PgPool, clip_id: Uuid, tag_id: Uuid) {
    sqlx::query(r#"INSERT INTO clip_tags (clip_id, tag_id) VALUES ($1, $2)"#)
        .bind(clip_id)
        .bind(tag_id)
        .execute(pool)
        .await
        .expect("tag clip");
}

pub async fn seed_test_definition(
    pool: &PgPool,
    kind: &str,
    category_id: Option<Uuid>,
    is_mandatory: bool,
    is_user_generated: bool,
    created_by: Option<Uuid>,
    total_items: i32,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO test_definitions
            (id, title, kind, category_id, total_items, is_mandatory, is_user_generated, created_by)
        VALUES ($1, 'Seeded test', $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(kind)
    .bind(category_id)
    .bind(total_items)
    .bind(is_mandatory)
    .bind(is_user_generated)
    .bind(created_by)
    .execute(pool)
    .await
    .expect("seed test definition");
    id
}

async fn seed_option(
    pool: &PgPool,
    table: &str,
    fk_column: &str,
    owner_id: Uuid,
    role: &str,
    is_correct: bool,
) -> Uuid {
    let id = Uuid::new_v4();
    let sql = format!(
        "INSERT INTO {} (id, {}, option_role, text, is_correct) VALUES ($1, $2, $3, $4, $5)",
        table, fk_column
    );
    sqlx::query(&sql)
        .bind(id)
        .bind(owner_id)
        .bind(role)
        .bind(if is_correct { "Correct call" } else { "Wrong call" })
        .bind(is_correct)
        .execute(pool)
        .await
        .expect("seed option");
    id
}
