#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Store domain, e.g. `"atelier-demo.myshopify.com"`.
    pub shop_domain: String,
    pub admin_token: String,
    pub api_version: String,
    /// Metaobject type that holds catalog records.
    pub metaobject_type: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub media_poll_attempts: u32,
    pub media_poll_interval_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("shop_domain", &self.shop_domain)
            .field("admin_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .field("metaobject_type", &self.metaobject_type)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("media_poll_attempts", &self.media_poll_attempts)
            .field("media_poll_interval_ms", &self.media_poll_interval_ms)
            .finish()
    }
}
