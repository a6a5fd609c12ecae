use crate::models::Role;
use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static JWT_CONFIG: OnceLock<crate::config::jwt::JwtConfig> = OnceLock::new();

/// Initialize JWT config from environment. Must be called once at startup.
pub fn init_jwt_config(config: crate::config::jwt::JwtConfig) -> Result<()> {
    JWT_CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("JWT config already initialized"))?;
    Ok(())
}

fn get_config() -> &'static crate::config::jwt::JwtConfig {
    JWT_CONFIG
        .get()
        .expect("JWT config not initialized — call init_jwt_config() at startup")
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // user id
    pub role: String, // "student" | "admin"
    pub exp: usize,
    pub iat: usize,
}

pub fn encode_token(user_id: i32, role: Role) -> Result<String> {
    let config = get_config();
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: now + config.token_expiry as usize,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to encode token: {}", e))
}

pub fn decode_jwt(token: &str) -> Result<Claims> {
    let config = get_config();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| anyhow::anyhow!("Failed to decode JWT: {}", e))
}
