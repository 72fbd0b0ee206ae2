//! Map markers

use std::sync::Arc;
use tracing::error;

use super::read_through;
use crate::cache::{key, ResponseCache};
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::MapMarker;

/// Map endpoints
#[derive(Debug, Clone)]
pub struct MapApi {
    http: HttpClient,
    cache: Arc<ResponseCache>,
}

impl MapApi {
    pub(crate) fn new(http: HttpClient, cache: Arc<ResponseCache>) -> Self {
        Self { http, cache }
    }

    /// Markers for `city`, or for every city when `city` is empty
    pub async fn get_markers(&self, city: &str) -> Result<Vec<MapMarker>, ApiError> {
        read_through(&self.cache, key::markers(city), || async {
            let query = if city.is_empty() {
                Vec::new()
            } else {
                vec![("city", city.to_string())]
            };
            self.http.get(&["markers"], &query).await?.json()
        })
        .await
        .inspect_err(|e| error!(city, error = %e, "error fetching map markers"))
    }
}
