pub const DEFAULT_RELAYER_URL: &str = "http://127.0.0.1:8080";

/// Header carrying the relayer's operator API key
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub verify_tls: bool,
    /// Sent on every request when set; needed for operator routes
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RELAYER_URL.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            verify_tls: true,
            api_key: None,
        }
    }
}

impl Config {
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn without_tls_verification(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
