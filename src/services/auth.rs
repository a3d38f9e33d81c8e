//! HTTP transport construction and the credentialed login exchange.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect, StatusCode};
use tracing::{info, warn};

use crate::domain::models::Credentials;
use crate::error::LookupError;
use crate::services::endpoint;
use crate::services::session::{SessionJar, SessionStore};

const LOGIN_PATH: &str = "/Account/Login";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECT_HOPS: usize = 5;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

// The portal serves real browsers; a bare client User-Agent gets bounced.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,\
         image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Cache-Control", "no-cache"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "same-origin"),
    ("Sec-Fetch-User", "?1"),
    ("Upgrade-Insecure-Requests", "1"),
];

/// Outcome of the login exchange. A rejection is protocol data, not a
/// transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    Rejected { status: u16 },
}

/// Builds the shared blocking client: cookies through the session jar,
/// redirects followed up to five https-only hops, Referer preserved.
pub(crate) fn build_transport(jar: Arc<SessionJar>) -> reqwest::Result<Client> {
    let policy = redirect::Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECT_HOPS {
            attempt.error("stopped after 5 redirect hops")
        } else if attempt.url().scheme() != "https" {
            attempt.stop()
        } else {
            attempt.follow()
        }
    });
    Client::builder()
        .cookie_provider(jar)
        .redirect(policy)
        .referer(true)
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
}

fn browser_headers() -> HeaderMap {
    BROWSER_HEADERS
        .iter()
        .filter_map(|(name, value)| {
            let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
            let value = HeaderValue::from_static(value);
            Some((name, value))
        })
        .collect()
}

pub struct AuthClient {
    client: Client,
    login_url: String,
    credentials: Credentials,
    jar: Arc<SessionJar>,
    store: SessionStore,
}

impl AuthClient {
    pub fn new(
        client: Client,
        base_url: &str,
        credentials: Credentials,
        jar: Arc<SessionJar>,
        store: SessionStore,
    ) -> Self {
        Self {
            client,
            login_url: endpoint(base_url, LOGIN_PATH),
            credentials,
            jar,
            store,
        }
    }

    /// POSTs the credentials. HTTP 200 and 302 are both success; any other
    /// status is a rejection. The blob is written before this returns success.
    pub fn login(&self) -> Result<LoginOutcome, LookupError> {
        let response = self
            .client
            .post(&self.login_url)
            .headers(browser_headers())
            .form(&[
                ("UserName", self.credentials.username.as_str()),
                ("Password", self.credentials.password.as_str()),
                ("RememberUsername", "false"),
            ])
            .send()?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::FOUND {
            self.store.save(&self.jar)?;
            info!("login succeeded, session persisted");
            Ok(LoginOutcome::Success)
        } else {
            warn!(status = status.as_u16(), "login rejected by portal");
            Ok(LoginOutcome::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
