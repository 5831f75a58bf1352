use jsonwebtoken::{DecodingKey, EncodingKey};
use sqlx::PgPool;

use crate::config::Config;
use crate::routes::tasks::queries::PgTaskRepository;

/// Signing material for bearer tokens, built once at startup.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tasks: PgTaskRepository,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            tasks: PgTaskRepository::new(db.clone()),
            db,
            jwt: JwtKeys::from_secret(config.jwt_secret.as_bytes()),
        }
    }
}
