//! Service layer containing the lookup pipeline and side-effect helpers.
//!
//! ## Service map
//! - `session.rs` — cookie jar shared with the transport + blob persistence.
//! - `auth.rs` — HTTP transport construction + credentialed login exchange.
//! - `resolver.rs` — VIN → catalog identifier resolution (two-step scrape).
//! - `attributes.rs` — attribute fetch + positional HTML parsing.
//! - `lookup.rs` — orchestrator: login-state decision, uniform error reporting.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible; the HTML parsing functions take a
//!   document and return data, independent of any HTTP state.
//! - Side effects (session blob writes, deletes) should be explicit and
//!   localized to `session.rs`.
//! - Keep `main.rs` thin; delegate to services.

pub mod attributes;
pub mod auth;
pub mod lookup;
pub mod output;
pub mod resolver;
pub mod session;

/// Joins the configured base URL with a fixed endpoint path.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::endpoint;

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        assert_eq!(
            endpoint("https://shop.example.com/", "/Account/Login"),
            "https://shop.example.com/Account/Login"
        );
        assert_eq!(
            endpoint("https://shop.example.com", "/Account/Login"),
            "https://shop.example.com/Account/Login"
        );
    }
}
