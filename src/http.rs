use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::{redirect, Client};

const APP_USER_AGENT: &str = concat!("craftkit/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout. Downloads that stall longer than this fail with
/// `SdkError::Timeout`.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the shared HTTP client.
///
/// Redirects are disabled here: the download engine follows them manually
/// so SHA-1 verification and progress survive across hops.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .timeout(REQUEST_TIMEOUT)
        .redirect(redirect::Policy::none())
        .build()
}
