use url::Url;

/// Environment-driven configuration, validated at startup. Missing required
/// variables abort the process before anything listens.
pub struct AppConfig {
    pub database_url: String,
    pub bot_token: String,
    pub api_token: String,
    pub port: u16,
    pub webhook_url: Option<Url>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL should be set.");
        let bot_token = std::env::var("TELOXIDE_TOKEN").expect("TELOXIDE_TOKEN should be set.");
        let api_token = std::env::var("API_TOKEN").unwrap_or_default();
        let port = std::env::var("PORT")
            .map(|p| p.parse().expect("PORT can't be parsed."))
            .unwrap_or(8080);
        let webhook_url = std::env::var("WEBHOOK_URL")
            .map(|u| u.parse::<Url>().expect("WEBHOOK_URL can't be parsed."))
            .ok();

        Self {
            database_url,
            bot_token,
            api_token,
            port,
            webhook_url,
        }
    }
}
