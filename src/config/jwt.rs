use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds. The issued token is the only credential;
    /// there is no refresh flow and no server-side session state.
    pub token_expiry: u64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable must be set"))?;

        if secret.len() < 32 {
            return Err(anyhow::anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        let token_expiry = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600); // 1 hour

        Ok(Self {
            secret,
            token_expiry,
        })
    }
}
