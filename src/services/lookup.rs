//! The lookup orchestrator: login-state decision and uniform error reporting.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::config::Config;
use crate::domain::models::{AttributeSet, LookupResult};
use crate::error::LookupError;
use crate::services::attributes::AttributeExtractor;
use crate::services::auth::{build_transport, AuthClient, LoginOutcome};
use crate::services::resolver::VehicleResolver;
use crate::services::session::{SessionJar, SessionStore};

/// Description used when the portal rejects the credentials.
pub const LOGIN_FAILED: &str = "Failed to login";
/// Description used when a login issues no usable cookies.
pub const LOGIN_NO_SESSION: &str = "login did not produce a valid session";

pub trait LoginService {
    fn login(&self) -> Result<LoginOutcome, LookupError>;
}

pub trait CatalogResolver {
    fn resolve_catalog_id(&self, vin: &str) -> Result<String, LookupError>;
}

pub trait AttributeSource {
    fn fetch_attributes(&self, vin: &str, catalog_id: &str)
        -> Result<AttributeSet, LookupError>;
}

impl LoginService for AuthClient {
    fn login(&self) -> Result<LoginOutcome, LookupError> {
        AuthClient::login(self)
    }
}

impl CatalogResolver for VehicleResolver {
    fn resolve_catalog_id(&self, vin: &str) -> Result<String, LookupError> {
        VehicleResolver::resolve_catalog_id(self, vin)
    }
}

impl AttributeSource for AttributeExtractor {
    fn fetch_attributes(
        &self,
        vin: &str,
        catalog_id: &str,
    ) -> Result<AttributeSet, LookupError> {
        AttributeExtractor::fetch_attributes(self, vin, catalog_id)
    }
}

pub struct VinLookup<L, R, A> {
    store: SessionStore,
    jar: Arc<SessionJar>,
    auth: L,
    resolver: R,
    attributes: A,
    // Serializes check-validity, login, persist across concurrent lookups.
    login_gate: Mutex<()>,
}

impl VinLookup<AuthClient, VehicleResolver, AttributeExtractor> {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = SessionStore::new(config.session_path()?);
        let jar = Arc::new(SessionJar::from_records(store.load().unwrap_or_default()));
        let client = build_transport(jar.clone())?;
        let auth = AuthClient::new(
            client.clone(),
            &config.base_url,
            config.credentials(),
            jar.clone(),
            store.clone(),
        );
        let resolver = VehicleResolver::new(client.clone(), &config.base_url);
        let attributes = AttributeExtractor::new(client, &config.base_url);
        Ok(Self::new(store, jar, auth, resolver, attributes))
    }
}

impl<L, R, A> VinLookup<L, R, A>
where
    L: LoginService,
    R: CatalogResolver,
    A: AttributeSource,
{
    pub fn new(store: SessionStore, jar: Arc<SessionJar>, auth: L, resolver: R, attributes: A) -> Self {
        Self {
            store,
            jar,
            auth,
            resolver,
            attributes,
            login_gate: Mutex::new(()),
        }
    }

    /// Looks up the attribute set for `vin`. Never propagates a fault; any
    /// failure becomes a non-success `LookupResult` with empty attributes.
    pub fn get_vin_info(&self, vin: &str) -> LookupResult {
        match self.run(vin) {
            Ok(result) => result,
            Err(e) => {
                warn!(vin, error = %e, "lookup failed");
                LookupResult::failure(vin, e.to_string())
            }
        }
    }

    fn run(&self, vin: &str) -> Result<LookupResult, LookupError> {
        if let Some(result) = self.ensure_session(vin)? {
            return Ok(result);
        }
        let catalog_id = self.resolver.resolve_catalog_id(vin)?;
        debug!(vin, catalog_id = %catalog_id, "vehicle resolved");
        let attributes = self.attributes.fetch_attributes(vin, &catalog_id)?;
        Ok(LookupResult::success(vin, attributes))
    }

    // Logs in when the current session is stale; returns a terminal result
    // when the lookup must stop here.
    fn ensure_session(&self, vin: &str) -> Result<Option<LookupResult>, LookupError> {
        let _gate = self.login_gate.lock().unwrap_or_else(|e| e.into_inner());
        if self.store.is_valid(&self.jar) {
            return Ok(None);
        }
        match self.auth.login()? {
            LoginOutcome::Rejected { status } => {
                warn!(vin, status, "stopping lookup: portal rejected login");
                return Ok(Some(LookupResult::failure(vin, LOGIN_FAILED)));
            }
            LoginOutcome::Success => {}
        }
        // A login that issues no unexpired cookies would be discarded on the
        // next run anyway; treat it as a failed login now.
        if !self.store.is_valid(&self.jar) {
            warn!(vin, "login succeeded but issued no unexpired cookies");
            return Ok(Some(LookupResult::failure(vin, LOGIN_NO_SESSION)));
        }
        Ok(None)
    }
}
