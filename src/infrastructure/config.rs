/// Placeholder authority every in-process request is addressed to
pub const DEFAULT_BASE_URL: &str = "http://testserver";

/// Same limit common HTTP clients apply before giving up on a redirect chain
pub const DEFAULT_MAX_REDIRECTS: usize = 20;

/// Settings for the in-process transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub base_url: String,
    pub follow_redirects: bool,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl TransportConfig {
    pub fn without_redirects(self) -> Self {
        Self {
            follow_redirects: false,
            ..self
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: format!("appcall/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
