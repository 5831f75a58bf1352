use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::rngs::OsRng;

use crate::error::ApiError;
use crate::state::{AppState, JwtKeys};

const MIN_PASSWORD_LEN: usize = 6;
const MAX_NAME_LEN: usize = 50;
const TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, sqlx::FromRow)]
struct User {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

pub fn hash_password(plaintext: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(format!("password hash error: {e}")))
}

pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("stored hash is malformed: {e}")))?;
    Ok(Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}

/// Signed, time-limited credential carrying the user's id and email.
pub fn issue_token(user_id: Uuid, email: &str, keys: &JwtKeys) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_owned(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };
    encode_with(&claims, &keys.encoding)
}

fn encode_with(claims: &Claims, key: &EncodingKey) -> Result<String, ApiError> {
    encode(&Header::default(), claims, key)
        .map_err(|e| ApiError::Internal(format!("jwt encode error: {e}")))
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password, name) = match (payload.email, payload.password, payload.name) {
        (Some(e), Some(p), Some(n)) if !e.trim().is_empty() && !n.trim().is_empty() => (e, p, n),
        _ => return Err(ApiError::InvalidInput("All fields are required".into())),
    };

    if !email.contains('@') {
        return Err(ApiError::InvalidInput("Invalid email address".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidInput(
            "Password must be at least 6 characters".into(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::InvalidInput(
            "Name cannot exceed 50 characters".into(),
        ));
    }

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Email already in use"));
    }

    let password_hash = hash_password(&password)?;
    let user_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, name, password_hash)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(&email)
    .bind(&name)
    .bind(&password_hash)
    .execute(&state.db)
    .await?;

    let token = issue_token(user_id, &email, &state.jwt)?;
    tracing::debug!("registered user {user_id}");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserResponse {
                id: user_id,
                email,
                name,
            },
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => (e, p),
        _ => {
            return Err(ApiError::InvalidInput(
                "Email and password are required".into(),
            ))
        }
    };

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, password_hash FROM users WHERE email = $1
        "#,
    )
    .bind(&email)
    .fetch_optional(&state.db)
    .await?;

    // Unknown email and wrong password collapse into one error on purpose.
    let user = user.ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(user.id, &user.email, &state.jwt)?;

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            user: UserResponse {
                id: user.id,
                email: user.email,
                name: user.name,
            },
            token,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Validation};

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2!").unwrap();
        assert_ne!(hash, "hunter2!");
        assert!(verify_password("hunter2!", &hash).unwrap());
        assert!(!verify_password("hunter3!", &hash).unwrap());
    }

    #[test]
    fn token_round_trip() {
        let keys = JwtKeys::from_secret(b"test-secret");
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "a@x.com", &keys).unwrap();

        let data = decode::<Claims>(&token, &keys.decoding, &Validation::default()).unwrap();
        assert_eq!(data.claims.sub, user_id.to_string());
        assert_eq!(data.claims.email, "a@x.com");
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JwtKeys::from_secret(b"test-secret");
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "a@x.com".into(),
            iat: past.timestamp() as usize,
            exp: (past + Duration::hours(1)).timestamp() as usize,
        };
        let token = encode_with(&claims, &keys.encoding).unwrap();

        assert!(decode::<Claims>(&token, &keys.decoding, &Validation::default()).is_err());
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let ours = JwtKeys::from_secret(b"ours");
        let theirs = JwtKeys::from_secret(b"theirs");
        let token = issue_token(Uuid::new_v4(), "a@x.com", &theirs).unwrap();

        assert!(decode::<Claims>(&token, &ours.decoding, &Validation::default()).is_err());
    }
}
