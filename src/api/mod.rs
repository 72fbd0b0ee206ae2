//! Typed facades over the marketplace API
//!
//! [`TaskHub`] owns the HTTP client, the response cache and the local store,
//! and hands out one facade per domain. Reads go through the cache first;
//! mutations always hit the server and invalidate the entries they affect.

mod auth;
mod map;
mod tasks;
mod users;

pub use auth::{
    AuthApi, GOOGLE_AUTH_FAILED_MESSAGE, LOGIN_FAILED_MESSAGE, SIGNUP_FAILED_MESSAGE,
};
pub use map::MapApi;
pub use tasks::TaskApi;
pub use users::UserApi;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::storage::LocalStore;

/// Serves `key` from the cache, or runs `fetch` and caches its result
///
/// Failed fetches are not cached.
pub(crate) async fn read_through<T, F, Fut>(
    cache: &ResponseCache,
    key: String,
    fetch: F,
) -> Result<T, ApiError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    if let Some(hit) = cache.get_as::<T>(&key) {
        debug!(%key, "cache hit");
        return Ok(hit);
    }

    debug!(%key, "cache miss");
    let fresh = fetch().await?;
    cache.set(key, serde_json::to_value(&fresh)?);
    Ok(fresh)
}

/// Entry point to the marketplace API
#[derive(Debug, Clone)]
pub struct TaskHub {
    cache: Arc<ResponseCache>,
    tasks: TaskApi,
    users: UserApi,
    auth: AuthApi,
    map: MapApi,
}

impl TaskHub {
    /// Creates a client for `config`, with a fresh cache using `config.cache_ttl`
    pub fn new(config: &Config, store: Arc<dyn LocalStore>) -> Result<Self, ApiError> {
        let cache = Arc::new(ResponseCache::new(config.cache_ttl));
        Self::with_cache(config, store, cache)
    }

    /// Creates a client that shares an existing cache
    pub fn with_cache(
        config: &Config,
        store: Arc<dyn LocalStore>,
        cache: Arc<ResponseCache>,
    ) -> Result<Self, ApiError> {
        let http = HttpClient::new(config, store.clone())?;
        let users = UserApi::new(http.clone(), cache.clone());

        Ok(Self {
            tasks: TaskApi::new(http.clone(), cache.clone()),
            auth: AuthApi::new(http.clone(), cache.clone(), store, users.clone()),
            map: MapApi::new(http, cache.clone()),
            users,
            cache,
        })
    }

    pub fn tasks(&self) -> &TaskApi {
        &self.tasks
    }

    pub fn users(&self) -> &UserApi {
        &self.users
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub fn map(&self) -> &MapApi {
        &self.map
    }

    /// The shared response cache
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Drops every cached response
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
