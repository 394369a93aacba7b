use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub data_dir: String,
    pub coingecko_base_url: String,
    pub alert_poll_secs: u64,

    pub jwt_secret: String,
    pub jwt_cookie_name: String,
    pub cookie_secure: bool,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());

    let coingecko_base_url = env::var("COINGECKO_BASE_URL")
        .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string());

    let alert_poll_secs = env::var("ALERT_POLL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(60);

    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-dev-secret".to_string());
    let jwt_cookie_name = env::var("JWT_COOKIE_NAME").unwrap_or_else(|_| "auth".to_string());
    let cookie_secure = env::var("COOKIE_SECURE")
        .ok()
        .and_then(|s| s.parse::<bool>().ok())
        .unwrap_or(false);

    Settings {
        host,
        port,
        data_dir,
        coingecko_base_url,
        alert_poll_secs,
        jwt_secret,
        jwt_cookie_name,
        cookie_secure,
    }
}
