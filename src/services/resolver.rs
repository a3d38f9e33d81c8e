//! VIN → catalog identifier resolution: the VIN is POSTed to the
//! vehicle-selection endpoint so the server binds the session to a resolved
//! vehicle, then the catalog page is scanned for the OEM catalog identifier.

use reqwest::blocking::Client;
use scraper::{Html, Selector};

use crate::error::LookupError;
use crate::services::endpoint;

const VEHICLE_SELECTION_PATH: &str = "/Vehicle/VehicleSelection";
const CATALOG_PATH: &str = "/AutomotiveCatalog/Catalog";

pub struct VehicleResolver {
    client: Client,
    selection_url: String,
    catalog_url: String,
}

impl VehicleResolver {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            selection_url: endpoint(base_url, VEHICLE_SELECTION_PATH),
            catalog_url: endpoint(base_url, CATALOG_PATH),
        }
    }

    pub fn resolve_catalog_id(&self, vin: &str) -> Result<String, LookupError> {
        self.send_vehicle_selection(vin)?;
        let page = self.fetch_catalog_page()?;
        extract_catalog_id(&page).ok_or(LookupError::CatalogIdMissing)
    }

    fn send_vehicle_selection(&self, vin: &str) -> Result<(), LookupError> {
        let response = self
            .client
            .post(&self.selection_url)
            // Empty secondary VIN list, kept for protocol compatibility with
            // the portal's form handler.
            .form(&[("VinNumber", vin), ("VinNumberList", "")])
            .send()?;
        let status = response.status();
        if status.as_u16() != 200 {
            return Err(LookupError::VehicleSelection {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    fn fetch_catalog_page(&self) -> Result<String, LookupError> {
        let body = self
            .client
            .get(&self.catalog_url)
            .send()?
            .error_for_status()?
            .text()?;
        Ok(body)
    }
}

/// Scans the catalog page for the hidden input carrying the identifier.
pub fn extract_catalog_id(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("input#catalogOemId").ok()?;
    document
        .select(&selector)
        .next()?
        .value()
        .attr("value")
        .map(str::to_owned)
}
