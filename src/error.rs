use thiserror::Error;

/// Failure kinds for a single lookup. Login rejection is not an error; it is
/// carried as [`crate::services::auth::LoginOutcome::Rejected`] data.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("vehicle selection rejected (HTTP {status})")]
    VehicleSelection { status: u16 },
    /// The VIN was not recognized, or the site markup changed.
    #[error("catalog page has no catalog identifier element")]
    CatalogIdMissing,
    #[error("session persistence failed: {0}")]
    Session(#[from] std::io::Error),
}
