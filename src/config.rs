use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL; filter snapshots are not persisted when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Lifetime of a persisted filter snapshot, in seconds
    #[serde(default = "default_filter_state_ttl")]
    pub filter_state_ttl: u64,

    /// Largest catalog page accepted in one push
    #[serde(default = "default_max_page_items")]
    pub max_page_items: usize,

    /// Items kept per session context before further pages are dropped
    #[serde(default = "default_max_feed_items")]
    pub max_feed_items: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_filter_state_ttl() -> u64 {
    86_400
}

fn default_max_page_items() -> usize {
    100
}

fn default_max_feed_items() -> usize {
    5_000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
