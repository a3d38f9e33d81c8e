//! Cookie session shared between the HTTP transport and the on-disk store.
//!
//! [`SessionJar`] implements [`reqwest::cookie::CookieStore`]; the validity
//! check iterates its records by expiry.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::header::HeaderValue;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    /// Unix seconds; `None` for session cookies, which never count as live.
    pub expires: Option<i64>,
    #[serde(default)]
    pub secure: bool,
    /// No Domain attribute on the Set-Cookie: exact host only, no subdomains.
    #[serde(default)]
    pub host_only: bool,
}

impl CookieRecord {
    fn matches(&self, url: &Url, now: i64) -> bool {
        if self.secure && url.scheme() != "https" {
            return false;
        }
        if let Some(expires) = self.expires {
            if expires <= now {
                return false;
            }
        }
        let host = url.host_str().unwrap_or_default();
        let domain = self.domain.trim_start_matches('.');
        let domain_ok = if self.host_only {
            host == domain
        } else {
            host == domain || host.ends_with(&format!(".{domain}"))
        };
        domain_ok && path_matches(url.path(), &self.path)
    }
}

// RFC 6265 §5.1.4 path-match: equal, or a prefix ending at a `/` boundary
// (`/Veh` must not match `/Vehicle`).
fn path_matches(request: &str, cookie_path: &str) -> bool {
    if request == cookie_path {
        return true;
    }
    request.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request.as_bytes().get(cookie_path.len()) == Some(&b'/'))
}

pub(crate) fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// In-memory cookie collection, shared between the transport and the store.
#[derive(Debug, Default)]
pub struct SessionJar {
    cookies: Mutex<Vec<CookieRecord>>,
}

impl SessionJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<CookieRecord>) -> Self {
        Self {
            cookies: Mutex::new(records),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CookieRecord>> {
        self.cookies.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> Vec<CookieRecord> {
        self.lock().clone()
    }

    pub fn replace(&self, records: Vec<CookieRecord>) {
        *self.lock() = records;
    }

    /// True iff at least one cookie carries an expiry strictly in the future.
    pub fn has_live_cookie(&self, now: i64) -> bool {
        self.lock()
            .iter()
            .any(|c| c.expires.is_some_and(|expires| expires > now))
    }

    fn upsert(&self, record: CookieRecord) {
        let mut cookies = self.lock();
        if let Some(existing) = cookies.iter_mut().find(|c| {
            c.name == record.name && c.domain == record.domain && c.path == record.path
        }) {
            *existing = record;
        } else {
            cookies.push(record);
        }
    }
}

impl reqwest::cookie::CookieStore for SessionJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let now = now_unix();
        for header in cookie_headers {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            let parsed = match cookie::Cookie::parse(raw.to_string()) {
                Ok(c) => c,
                Err(e) => {
                    debug!(error = %e, "skipping unparseable Set-Cookie header");
                    continue;
                }
            };
            // Max-Age wins over Expires when both are present.
            let expires = match (parsed.max_age(), parsed.expires().and_then(|e| e.datetime())) {
                (Some(age), _) => Some(now + age.whole_seconds()),
                (None, Some(dt)) => Some(dt.unix_timestamp()),
                (None, None) => None,
            };
            self.upsert(CookieRecord {
                name: parsed.name().to_string(),
                value: parsed.value().to_string(),
                domain: parsed
                    .domain()
                    .unwrap_or_else(|| url.host_str().unwrap_or_default())
                    .to_ascii_lowercase(),
                path: parsed.path().unwrap_or("/").to_string(),
                expires,
                secure: parsed.secure().unwrap_or(false),
                host_only: parsed.domain().is_none(),
            });
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let now = now_unix();
        let header = self
            .lock()
            .iter()
            .filter(|c| c.matches(url, now))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}

/// Durable storage for the serialized cookie set.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the persisted cookie set. Missing, empty, and undeserializable
    /// blobs all mean no session.
    pub fn load(&self) -> Option<Vec<CookieRecord>> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        if raw.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(&raw) {
            Ok(records) => Some(records),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "discarding undeserializable session blob");
                None
            }
        }
    }

    pub fn save(&self, jar: &SessionJar) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let blob = serde_json::to_string_pretty(&jar.snapshot())?;
        std::fs::write(&self.path, blob)
    }

    pub fn invalidate(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "session blob deleted"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to delete session blob"),
        }
    }

    /// True iff the jar holds an unexpired cookie. A `false` result deletes
    /// the blob so the stale session is never reloaded.
    pub fn is_valid(&self, jar: &SessionJar) -> bool {
        if jar.has_live_cookie(now_unix()) {
            return true;
        }
        self.invalidate();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore as _;

    fn future() -> i64 {
        now_unix() + 3600
    }

    fn record(name: &str, expires: Option<i64>) -> CookieRecord {
        CookieRecord {
            name: name.to_string(),
            value: "v".to_string(),
            domain: "shop.example.com".to_string(),
            path: "/".to_string(),
            expires,
            secure: false,
            host_only: false,
        }
    }

    #[test]
    fn set_cookies_records_expiry_from_max_age() {
        let jar = SessionJar::new();
        let url = Url::parse("https://shop.example.com/Account/Login").expect("url");
        let header =
            HeaderValue::from_static(".AspNet.Session=abc123; Path=/; Max-Age=7200; Secure");
        jar.set_cookies(&mut [&header].into_iter(), &url);

        let records = jar.snapshot();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, ".AspNet.Session");
        assert_eq!(records[0].domain, "shop.example.com");
        assert!(records[0].secure);
        let expires = records[0].expires.expect("expiry recorded");
        assert!(expires > now_unix());
        assert!(jar.has_live_cookie(now_unix()));
    }

    #[test]
    fn cookie_header_skips_expired_and_foreign_cookies() {
        let jar = SessionJar::from_records(vec![
            record("live", Some(future())),
            record("expired", Some(now_unix() - 10)),
            CookieRecord {
                domain: "other.example.net".to_string(),
                ..record("foreign", Some(future()))
            },
        ]);
        let url = Url::parse("https://shop.example.com/Vehicle/VehicleSelection").expect("url");
        let header = jar.cookies(&url).expect("header");
        assert_eq!(header.to_str().expect("ascii"), "live=v");
    }

    #[test]
    fn secure_cookies_never_go_over_plain_http() {
        let jar = SessionJar::from_records(vec![CookieRecord {
            secure: true,
            ..record("s", Some(future()))
        }]);
        let https = Url::parse("https://shop.example.com/").expect("url");
        let http = Url::parse("http://shop.example.com/").expect("url");
        assert!(jar.cookies(&https).is_some());
        assert!(jar.cookies(&http).is_none());
    }

    #[test]
    fn cookie_path_must_match_at_a_segment_boundary() {
        let jar = SessionJar::from_records(vec![CookieRecord {
            path: "/Veh".to_string(),
            ..record("scoped", Some(future()))
        }]);
        let vehicle = Url::parse("https://shop.example.com/Vehicle/VehicleSelection").expect("url");
        assert!(jar.cookies(&vehicle).is_none(), "/Veh must not match /Vehicle");
        let exact = Url::parse("https://shop.example.com/Veh").expect("url");
        let below = Url::parse("https://shop.example.com/Veh/page").expect("url");
        assert!(jar.cookies(&exact).is_some());
        assert!(jar.cookies(&below).is_some());
    }

    #[test]
    fn host_only_cookies_stay_off_subdomains() {
        let jar = SessionJar::from_records(vec![
            CookieRecord {
                host_only: true,
                ..record("host-only", Some(future()))
            },
            record("domain-wide", Some(future())),
        ]);
        let subdomain = Url::parse("https://parts.shop.example.com/").expect("url");
        let header = jar.cookies(&subdomain).expect("header");
        assert_eq!(header.to_str().expect("ascii"), "domain-wide=v");
        let exact = Url::parse("https://shop.example.com/").expect("url");
        let header = jar.cookies(&exact).expect("header");
        assert!(header.to_str().expect("ascii").contains("host-only=v"));
    }

    #[test]
    fn set_cookie_without_domain_attribute_is_host_only() {
        let jar = SessionJar::new();
        let url = Url::parse("https://shop.example.com/").expect("url");
        let bare = HeaderValue::from_static("a=1; Path=/; Max-Age=60");
        let scoped = HeaderValue::from_static("b=2; Path=/; Max-Age=60; Domain=shop.example.com");
        jar.set_cookies(&mut [&bare, &scoped].into_iter(), &url);

        let records = jar.snapshot();
        assert!(records.iter().find(|c| c.name == "a").expect("a").host_only);
        assert!(!records.iter().find(|c| c.name == "b").expect("b").host_only);
    }

    #[test]
    fn session_cookies_are_sent_but_never_count_as_live() {
        let jar = SessionJar::from_records(vec![record("sess", None)]);
        let url = Url::parse("https://shop.example.com/").expect("url");
        assert!(jar.cookies(&url).is_some());
        assert!(!jar.has_live_cookie(now_unix()));
    }

    #[test]
    fn blob_roundtrip_preserves_expiry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("session.json"));
        let expires = future();
        let jar = SessionJar::from_records(vec![record("auth", Some(expires))]);

        store.save(&jar).expect("save");
        let loaded = store.load().expect("session present");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].expires, Some(expires));
    }

    #[test]
    fn failed_validity_check_deletes_the_blob() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("session.json"));
        let jar = SessionJar::from_records(vec![record("stale", Some(now_unix() - 1))]);
        store.save(&jar).expect("save");

        assert!(!store.is_valid(&jar));
        assert!(store.load().is_none(), "invalidation must be durable");
    }

    #[test]
    fn corrupt_blob_reads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json at all").expect("write");
        let store = SessionStore::new(&path);
        assert!(store.load().is_none());
    }

    #[test]
    fn invalidate_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("missing.json"));
        store.invalidate();
        store.invalidate();
    }
}
