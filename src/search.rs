//! Single-postcode search and highlight.

use std::sync::Arc;

use hashbrown::HashSet;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::geocode::FallbackResolver;
use crate::map::{Layer, MapHost, Style, StyledFeature, FIT_PADDING};
use crate::models::PostalCode;
use crate::status::{StatusSink, Surface};

pub const INVALID_INPUT_MESSAGE: &str = "Please enter a valid 4-digit postcode";

/// Terminal state of one search interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Input did not contain exactly 4 digits; nothing was looked up
    Invalid { input: String },
    /// Neither geocoding service knows the code
    NotFound { code: PostalCode },
    /// Drawn on the search layer; `matched` tells whether it is on the list
    Rendered { code: PostalCode, matched: bool },
}

pub struct SearchController {
    resolver: Arc<FallbackResolver>,
    watchlist: HashSet<PostalCode>,
    flagged: Style,
    clear: Style,
    /// Held for a whole search so overlapping requests cannot both draw
    in_flight: Mutex<()>,
}

impl SearchController {
    pub fn new(
        resolver: Arc<FallbackResolver>,
        watchlist: impl IntoIterator<Item = PostalCode>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            resolver,
            watchlist: watchlist.into_iter().collect(),
            flagged: Style::flagged(config),
            clear: Style::clear(config),
            in_flight: Mutex::new(()),
        }
    }

    /// Whether `code` is one of the configured postcodes
    pub fn is_listed(&self, code: &PostalCode) -> bool {
        self.watchlist.contains(code)
    }

    pub async fn search(
        &self,
        raw_input: &str,
        map: &dyn MapHost,
        status: &dyn StatusSink,
    ) -> SearchOutcome {
        let _in_flight = self.in_flight.lock().await;
        self.clear(map, status);

        debug!(input = raw_input, "Validating search input");
        let code = match PostalCode::parse(raw_input) {
            Ok(code) => code,
            Err(e) => {
                debug!("{}", e);
                status.report(Surface::Search, INVALID_INPUT_MESSAGE);
                return SearchOutcome::Invalid {
                    input: raw_input.to_string(),
                };
            }
        };

        debug!("Resolving {}", code);
        let Some(feature) = self.resolver.resolve(&code).await else {
            status.report(
                Surface::Search,
                &format!("Postcode {} could not be found", code),
            );
            return SearchOutcome::NotFound { code };
        };

        let matched = self.is_listed(&code);
        let (style, message) = if matched {
            (self.flagged.clone(), format!("Postcode {} is on the list", code))
        } else {
            (self.clear.clone(), format!("Postcode {} is not on the list", code))
        };

        let bounds = feature.bounds();
        map.add_feature(
            Layer::Search,
            StyledFeature {
                feature,
                style,
                popup: message.clone(),
            },
        );
        if let Some(bounds) = bounds {
            map.fit_bounds(bounds, FIT_PADDING);
        }

        info!("{}", message);
        status.report(Surface::Search, &message);

        SearchOutcome::Rendered { code, matched }
    }

    /// Reset the search layer and the search status. Idempotent.
    pub fn clear(&self, map: &dyn MapHost, status: &dyn StatusSink) {
        map.clear_layer(Layer::Search);
        status.clear(Surface::Search);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::map::MapView;
    use crate::models::Coordinate;
    use crate::test_support::{sample_map_config, StubResolver};

    fn controller(primary: Arc<StubResolver>) -> SearchController {
        let resolver = FallbackResolver::new(vec![Box::new(primary)]);
        SearchController::new(
            Arc::new(resolver),
            ["1951", "2011"].iter().map(|c| PostalCode::parse(c).unwrap()),
            &SearchConfig::default(),
        )
    }

    fn code(s: &str) -> PostalCode {
        PostalCode::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_listed_code_is_flagged() {
        let stub = Arc::new(StubResolver::new("pdok").with_hit("1951"));
        let search = controller(stub);
        let map = MapView::new(&sample_map_config());

        let outcome = search.search("1951", &map, &map).await;

        assert_eq!(
            outcome,
            SearchOutcome::Rendered {
                code: code("1951"),
                matched: true
            }
        );
        let features = map.features(Layer::Search);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].style, Style::flagged(&SearchConfig::default()));
        assert_eq!(
            map.status(Surface::Search).as_deref(),
            Some("Postcode 1951 is on the list")
        );
    }

    #[tokio::test]
    async fn test_unlisted_code_is_clear() {
        let stub = Arc::new(StubResolver::new("pdok").with_hit("3572"));
        let search = controller(stub);
        let map = MapView::new(&sample_map_config());

        let outcome = search.search("3572RB", &map, &map).await;

        assert_eq!(
            outcome,
            SearchOutcome::Rendered {
                code: code("3572"),
                matched: false
            }
        );
        let features = map.features(Layer::Search);
        assert_eq!(features[0].style, Style::clear(&SearchConfig::default()));
        assert_eq!(
            map.status(Surface::Search).as_deref(),
            Some("Postcode 3572 is not on the list")
        );
    }

    #[tokio::test]
    async fn test_invalid_input_skips_lookup() {
        let stub = Arc::new(StubResolver::new("pdok").with_hit("1951"));
        let search = controller(stub.clone());
        let map = MapView::new(&sample_map_config());

        for input in ["12", "AB12", "", "12345"] {
            let outcome = search.search(input, &map, &map).await;
            assert_eq!(
                outcome,
                SearchOutcome::Invalid {
                    input: input.to_string()
                }
            );
        }

        assert_eq!(stub.call_count(), 0);
        assert_eq!(
            map.status(Surface::Search).as_deref(),
            Some(INVALID_INPUT_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_unresolved_code() {
        let stub = Arc::new(StubResolver::new("pdok").with_error("9999"));
        let search = controller(stub);
        let map = MapView::new(&sample_map_config());

        let outcome = search.search("9999", &map, &map).await;

        assert_eq!(outcome, SearchOutcome::NotFound { code: code("9999") });
        assert!(map.features(Layer::Search).is_empty());
        assert_eq!(
            map.status(Surface::Search).as_deref(),
            Some("Postcode 9999 could not be found")
        );
    }

    #[tokio::test]
    async fn test_resolves_once_and_fits_viewport() {
        let stub = Arc::new(StubResolver::new("pdok").with_hit("2011"));
        let search = controller(stub.clone());
        let map = MapView::new(&sample_map_config());

        search.search("2011", &map, &map).await;

        assert_eq!(stub.call_count(), 1);
        let viewport = map.viewport();
        let feature_bounds = map.features(Layer::Search)[0].feature.bounds();
        assert_eq!(viewport.bounds, feature_bounds);
        assert_eq!(viewport.padding, Some(FIT_PADDING));
    }

    #[tokio::test]
    async fn test_new_search_replaces_previous() {
        let stub = Arc::new(StubResolver::new("pdok").with_hit("1951").with_hit("3572"));
        let search = controller(stub);
        let map = MapView::new(&sample_map_config());

        search.search("1951", &map, &map).await;
        search.search("3572", &map, &map).await;

        let features = map.features(Layer::Search);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].feature.postcode(), &code("3572"));
    }

    #[tokio::test]
    async fn test_search_leaves_bulk_layer_alone() {
        let stub = Arc::new(StubResolver::new("pdok").with_hit("1951"));
        let search = controller(stub);
        let config = sample_map_config();
        let map = MapView::new(&config);
        map.add_feature(
            Layer::Bulk,
            StyledFeature {
                feature: crate::geometry::approximate(Coordinate::new(52.0, 5.0), &code("2011")),
                style: Style::from_map_config(&config),
                popup: "Postcode 2011".to_string(),
            },
        );

        search.search("1951", &map, &map).await;
        search.clear(&map, &map);

        assert_eq!(map.features(Layer::Bulk).len(), 1);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let stub = Arc::new(StubResolver::new("pdok").with_hit("1951"));
        let search = controller(stub);
        let map = MapView::new(&sample_map_config());

        search.search("1951", &map, &map).await;
        assert_eq!(map.features(Layer::Search).len(), 1);

        search.clear(&map, &map);
        assert!(map.features(Layer::Search).is_empty());
        assert!(map.status(Surface::Search).is_none());
        let after_first = map.snapshot().updated_at;

        search.clear(&map, &map);
        assert!(map.features(Layer::Search).is_empty());
        assert!(map.status(Surface::Search).is_none());
        assert_eq!(map.snapshot().updated_at, after_first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_searches_keep_one_highlight() {
        let stub = Arc::new(
            StubResolver::new("pdok")
                .with_hit("1951")
                .with_hit("3572")
                .with_delay(Duration::from_millis(200)),
        );
        let search = controller(stub);
        let map = MapView::new(&sample_map_config());

        tokio::join!(
            search.search("1951", &map, &map),
            search.search("3572", &map, &map),
        );

        let features = map.features(Layer::Search);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].feature.postcode(), &code("3572"));
    }
}
