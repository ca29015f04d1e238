//! PDOK Locatieserver, the Dutch government geodata service.
//!
//! Only returns a centroid for postcodes, so the area is approximated.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::Resolver;
use crate::error::ResolveError;
use crate::geometry::approximate;
use crate::models::{Coordinate, Feature, PostalCode};

static CENTROID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*POINT\s*\(\s*(\S+)\s+(\S+)\s*\)\s*$").expect("centroid pattern is valid")
});

#[derive(Debug, Deserialize)]
struct PdokResponse {
    response: PdokResults,
}

#[derive(Debug, Deserialize)]
struct PdokResults {
    #[serde(default)]
    docs: Vec<PdokDoc>,
}

#[derive(Debug, Deserialize)]
struct PdokDoc {
    /// WKT point in WGS84: "POINT(<lon> <lat>)"
    centroide_ll: Option<String>,
}

pub struct PdokResolver {
    client: Client,
    base_url: Url,
}

impl PdokResolver {
    pub fn new(client: Client, base_url: &str) -> Result<Self, ResolveError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    fn request_url(&self, code: &PostalCode) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", code.as_str())
            .append_pair("fq", "type:postcode")
            .append_pair("rows", "1");
        url
    }
}

#[async_trait]
impl Resolver for PdokResolver {
    fn name(&self) -> &'static str {
        "pdok"
    }

    async fn lookup(&self, code: &PostalCode) -> Result<Option<Feature>, ResolveError> {
        let response = self.client.get(self.request_url(code)).send().await?;

        if !response.status().is_success() {
            return Err(ResolveError::Status {
                service: self.name(),
                status: response.status(),
            });
        }

        let body: PdokResponse = response.json().await?;
        let Some(centroid) = body
            .response
            .docs
            .into_iter()
            .next()
            .and_then(|doc| doc.centroide_ll)
        else {
            debug!("PDOK returned no centroid for {}", code);
            return Ok(None);
        };

        let center = parse_centroid(&centroid)?;
        Ok(Some(approximate(center, code)))
    }
}

/// Parse a WKT `POINT(<lon> <lat>)` into a coordinate.
///
/// Both values must be finite numbers.
pub fn parse_centroid(wkt: &str) -> Result<Coordinate, ResolveError> {
    let malformed = || ResolveError::Centroid(wkt.to_string());

    let caps = CENTROID_RE.captures(wkt).ok_or_else(malformed)?;
    let lon: f64 = caps[1].parse().map_err(|_| malformed())?;
    let lat: f64 = caps[2].parse().map_err(|_| malformed())?;

    if !lon.is_finite() || !lat.is_finite() {
        return Err(malformed());
    }

    Ok(Coordinate::new(lat, lon))
}
