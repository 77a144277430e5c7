use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// Third-party recipe search provider.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeApiConfig {
    pub base_url: String,
    pub api_key: String,
    /// Number of candidates requested by the listing endpoints.
    pub list_count: u32,
}

/// Image-to-text model used to read food photos.
#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// `None` falls back to a mailer that only logs outgoing messages.
    pub smtp: Option<SmtpConfig>,
    pub from: String,
    pub app_base_url: String,
    pub reset_token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub recipes: RecipeApiConfig,
    pub vision: VisionConfig,
    pub mail: MailConfig,
    pub http_timeout_secs: u64,
    pub planner_max_days: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "pantry".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "pantry-users".into()),
            ttl_minutes: parse_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: parse_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let storage = StorageConfig {
            endpoint: std::env::var("MINIO_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".into()),
            bucket: std::env::var("MINIO_BUCKET").unwrap_or_else(|_| "pantry".into()),
            access_key: std::env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".into()),
            secret_key: std::env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".into()),
            region: std::env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".into()),
        };
        let recipes = RecipeApiConfig {
            base_url: std::env::var("RECIPE_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.spoonacular.com".into()),
            api_key: std::env::var("RECIPE_API_KEY").context("RECIPE_API_KEY")?,
            list_count: parse_or("RECIPE_LIST_COUNT", 10),
        };
        let vision = VisionConfig {
            base_url: std::env::var("VISION_API_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".into()),
            api_key: std::env::var("VISION_API_KEY").context("VISION_API_KEY")?,
            model: std::env::var("VISION_MODEL").unwrap_or_else(|_| "gemini-1.5-pro".into()),
        };
        let smtp = match (
            std::env::var("SMTP_HOST"),
            std::env::var("SMTP_USERNAME"),
            std::env::var("SMTP_PASSWORD"),
        ) {
            (Ok(host), Ok(username), Ok(password)) => Some(SmtpConfig {
                host,
                username,
                password,
            }),
            _ => None,
        };
        let mail = MailConfig {
            smtp,
            from: std::env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@pantry.local".into()),
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            reset_token_ttl_minutes: parse_or("RESET_TOKEN_TTL_MINUTES", 60),
        };
        Ok(Self {
            database_url,
            jwt,
            storage,
            recipes,
            vision,
            mail,
            http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", 20),
            planner_max_days: parse_or("PLANNER_MAX_DAYS", 7),
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
