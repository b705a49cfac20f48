//! User-Agent string sent with link resolution requests.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/linkmeta";

/// Default User-Agent for resolver requests.
#[must_use]
pub(crate) fn default_resolver_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("linkmeta/{version} (link-resolver; +{PROJECT_UA_URL})")
}
