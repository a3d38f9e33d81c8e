//! Attribute fetch and the positional HTML parse.

use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::warn;

use crate::domain::models::AttributeSet;
use crate::error::LookupError;
use crate::services::endpoint;

const VIN_ATTRIBUTES_PATH: &str = "/Vehicle/GetVinAttribute";

#[derive(Serialize)]
struct CurrentVehicle<'a> {
    #[serde(rename = "CatalogOemId")]
    catalog_oem_id: &'a str,
    #[serde(rename = "VIN")]
    vin: &'a str,
}

#[derive(Serialize)]
struct AttributeRequest<'a> {
    #[serde(rename = "currentVehicle")]
    current_vehicle: CurrentVehicle<'a>,
}

pub struct AttributeExtractor {
    client: Client,
    attributes_url: String,
}

impl AttributeExtractor {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            attributes_url: endpoint(base_url, VIN_ATTRIBUTES_PATH),
        }
    }

    pub fn fetch_attributes(
        &self,
        vin: &str,
        catalog_id: &str,
    ) -> Result<AttributeSet, LookupError> {
        let body = self
            .client
            .post(&self.attributes_url)
            .json(&AttributeRequest {
                current_vehicle: CurrentVehicle {
                    catalog_oem_id: catalog_id,
                    vin,
                },
            })
            .send()?
            .error_for_status()?
            .text()?;
        Ok(parse_attribute_document(&body))
    }
}

/// Labels and values render as two parallel flat lists, so the i-th label
/// pairs with the i-th value by position, not DOM adjacency. A length
/// divergence pairs to the shorter list and is logged.
pub fn parse_attribute_document(html: &str) -> AttributeSet {
    let document = Html::parse_document(html);
    let labels = select_texts(&document, ".vinAttributes .Attributes dt label");
    let values = select_texts(&document, ".vinAttributes .Attributes dd");

    if labels.len() != values.len() {
        warn!(
            labels = labels.len(),
            values = values.len(),
            "attribute label/value count mismatch; pairing stops at the shorter list"
        );
    }

    let mut attributes = AttributeSet::new();
    for (label, value) in labels.into_iter().zip(values) {
        attributes.insert(label.trim_end_matches(':').trim_end(), value);
    }
    attributes
}

fn select_texts(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect()
}
