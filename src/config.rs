use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Dialling code applied to local numbers, without the leading `+`.
    pub default_country_code: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "carhire.db".to_string()),
            default_country_code: env::var("DEFAULT_COUNTRY_CODE")
                .ok()
                .map(|v| v.trim().trim_start_matches('+').to_string())
                .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
                .unwrap_or_else(|| "256".to_string()),
        }
    }
}
