//! User agents presented to the review site.

use std::time::{SystemTime, UNIX_EPOCH};

/// Desktop user agent sent with static page requests.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; U; Linux i686; en-US) AppleWebKit/534.3 (KHTML, like Gecko)";

/// User agent the headless browser presents while searching.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Accept header sent with static page requests.
pub const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Pool rotated through when the configured agent is `impersonate`.
const ROTATION: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Which agent a client presents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgent {
    Desktop,
    /// A browser agent picked from the rotation pool when the client is built.
    Impersonate,
    Custom(String),
}

impl UserAgent {
    /// Interpret a configured value; blank means the desktop default.
    pub fn from_config(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => UserAgent::Desktop,
            Some(v) if v.eq_ignore_ascii_case("impersonate") => UserAgent::Impersonate,
            Some(v) => UserAgent::Custom(v.to_string()),
        }
    }

    pub fn header_value(&self) -> String {
        match self {
            UserAgent::Desktop => USER_AGENT.to_string(),
            UserAgent::Impersonate => {
                let seed = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.subsec_nanos() as usize)
                    .unwrap_or(0);
                ROTATION[seed % ROTATION.len()].to_string()
            }
            UserAgent::Custom(agent) => agent.clone(),
        }
    }
}
