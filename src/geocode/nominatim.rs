//! OpenStreetMap Nominatim, used when PDOK has nothing.
//!
//! Nominatim returns boundary geometry directly; it is used verbatim.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::Resolver;
use crate::error::ResolveError;
use crate::models::{Feature, PostalCode};

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    geojson: Option<geojson::Geometry>,
}

pub struct NominatimResolver {
    client: Client,
    base_url: Url,
    country: String,
}

impl NominatimResolver {
    /// `client` must carry an identifying User-Agent, Nominatim rejects
    /// anonymous clients.
    pub fn new(client: Client, base_url: &str, country: &str) -> Result<Self, ResolveError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            country: country.to_string(),
        })
    }

    fn request_url(&self, code: &PostalCode) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("postalcode", code.as_str())
            .append_pair("country", &self.country)
            .append_pair("polygon_geojson", "1")
            .append_pair("format", "json");
        url
    }
}

#[async_trait]
impl Resolver for NominatimResolver {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn lookup(&self, code: &PostalCode) -> Result<Option<Feature>, ResolveError> {
        let response = self.client.get(self.request_url(code)).send().await?;

        if !response.status().is_success() {
            return Err(ResolveError::Status {
                service: self.name(),
                status: response.status(),
            });
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        let geometry = places.into_iter().next().and_then(|place| place.geojson);

        if geometry.is_none() {
            debug!("Nominatim returned no geometry for {}", code);
        }

        Ok(geometry.map(|geometry| Feature::new(code.clone(), geometry)))
    }
}
