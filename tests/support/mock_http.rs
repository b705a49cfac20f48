//! Mock HTTP server for resolver tests.
//!
//! Sandboxed runners may forbid binding localhost. There the server is not
//! started and the calling test returns early, unless
//! `LINKMETA_REQUIRE_SOCKET_TESTS` is truthy, in which case it panics.

use std::net::TcpListener;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "LINKMETA_REQUIRE_SOCKET_TESTS";

fn localhost_bindable() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Starts a wiremock server, or returns `None` when no local port can be bound.
pub async fn mock_server() -> Option<MockServer> {
    if localhost_bindable() {
        return Some(MockServer::start().await);
    }

    let required = std::env::var(REQUIRE_ENV)
        .is_ok_and(|value| matches!(value.trim(), "1" | "true" | "yes"));
    assert!(
        !required,
        "no localhost socket for the mock link server and {REQUIRE_ENV} is set"
    );
    eprintln!("skipping redirect test: no localhost socket for the mock link server");
    None
}
