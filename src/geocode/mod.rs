//! Postcode geocoding.
//!
//! Each upstream service is a [`Resolver`] strategy. [`FallbackResolver`]
//! tries them in order and returns the first hit.

mod nominatim;
mod pdok;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::error::ResolveError;
use crate::models::{Feature, PostalCode};

pub use nominatim::NominatimResolver;
pub use pdok::{parse_centroid, PdokResolver};

/// One geocoding strategy.
///
/// `Ok(None)` means the service has no usable answer for the code.
#[async_trait]
pub trait Resolver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, code: &PostalCode) -> Result<Option<Feature>, ResolveError>;
}

#[async_trait]
impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn lookup(&self, code: &PostalCode) -> Result<Option<Feature>, ResolveError> {
        (**self).lookup(code).await
    }
}

/// Short-circuiting chain of resolvers.
pub struct FallbackResolver {
    tiers: Vec<Box<dyn Resolver>>,
}

impl FallbackResolver {
    pub fn new(tiers: Vec<Box<dyn Resolver>>) -> Self {
        Self { tiers }
    }

    /// PDOK first, Nominatim second.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ResolveError> {
        let client = http_client(config)?;
        Ok(Self::new(vec![
            Box::new(PdokResolver::new(client.clone(), &config.pdok_url)?),
            Box::new(NominatimResolver::new(
                client,
                &config.nominatim_url,
                &config.country,
            )?),
        ]))
    }

    /// Resolve `code` to a feature. Errors from individual tiers are logged
    /// and treated as a miss; each tier is asked at most once.
    pub async fn resolve(&self, code: &PostalCode) -> Option<Feature> {
        for tier in &self.tiers {
            match tier.lookup(code).await {
                Ok(Some(feature)) => {
                    debug!("{} resolved {}", tier.name(), code);
                    return Some(feature);
                }
                Ok(None) => {
                    debug!("{} has no result for {}", tier.name(), code);
                }
                Err(e) => {
                    warn!("{} lookup failed for {}: {}", tier.name(), code, e);
                }
            }
        }

        info!("No geocoding result for {}", code);
        None
    }
}

/// Shared HTTP client. The User-Agent identifies us to Nominatim; the
/// timeout keeps a dead upstream from stalling a batch run forever.
pub fn http_client(config: &ServiceConfig) -> Result<Client, ResolveError> {
    Ok(Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}
