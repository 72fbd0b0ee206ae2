//! Account lookups, profiles and per-user listings

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

use super::read_through;
use crate::cache::{key, ResponseCache};
use crate::error::ApiError;
use crate::http::{HttpClient, TOTAL_COUNT_HEADER};
use crate::models::{
    Application, EmailCheck, Page, Role, Task, UserProfile, DEFAULT_LIMIT, DEFAULT_PAGE,
};
use crate::wizard::ProfileSubmission;

/// User and talent endpoints
#[derive(Debug, Clone)]
pub struct UserApi {
    http: HttpClient,
    cache: Arc<ResponseCache>,
}

impl UserApi {
    pub(crate) fn new(http: HttpClient, cache: Arc<ResponseCache>) -> Self {
        Self { http, cache }
    }

    /// Asks whether an account with `email` already exists for `role`
    ///
    /// Never cached.
    pub async fn check_user_exists(&self, email: &str, role: Role) -> Result<EmailCheck, ApiError> {
        if email.is_empty() {
            return Err(ApiError::MissingArgument("Email"));
        }

        self.http
            .get(&[role.collection(), "check-email", email], &[])
            .await
            .and_then(|r| r.json())
            .inspect_err(|e| error!(error = %e, "error checking user existence"))
    }

    /// Profile of the account the stored token belongs to
    pub async fn get_current_user(&self) -> Result<UserProfile, ApiError> {
        read_through(&self.cache, key::CURRENT_USER.to_string(), || async {
            self.http.get(&["auth", "me"], &[]).await?.json()
        })
        .await
        .inspect_err(|e| error!(error = %e, "error fetching current user"))
    }

    /// Uploads the completed talent profile
    ///
    /// On success the cached current user is dropped so the next read sees
    /// the updated completion flag.
    pub async fn complete_profile(
        &self,
        user_id: &str,
        submission: ProfileSubmission,
    ) -> Result<Value, ApiError> {
        if user_id.is_empty() {
            return Err(ApiError::MissingArgument("User ID"));
        }

        let form = submission.into_form()?;
        let response = self
            .http
            .put_multipart(&["talents", user_id, "complete-profile"], form)
            .await
            .inspect_err(|e| error!(user_id, error = %e, "error completing profile"))?;

        self.cache.delete(key::CURRENT_USER);
        Ok(response.body)
    }

    /// Tasks posted by `user_id`
    pub async fn get_user_tasks(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<Task>, ApiError> {
        let (page, limit) = page_and_limit(page, limit);
        let segments = ["users", user_id, "tasks"];
        read_through(
            &self.cache,
            key::user_tasks(user_id, page, limit),
            || self.fetch_page(&segments, page, limit),
        )
        .await
        .inspect_err(|e| error!(user_id, error = %e, "error fetching user tasks"))
    }

    /// Applications submitted by `talent_id`
    pub async fn get_talent_applications(
        &self,
        talent_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<Application>, ApiError> {
        let (page, limit) = page_and_limit(page, limit);
        let segments = ["talents", talent_id, "applications"];
        read_through(
            &self.cache,
            key::talent_applications(talent_id, page, limit),
            || self.fetch_page(&segments, page, limit),
        )
        .await
        .inspect_err(|e| error!(talent_id, error = %e, "error fetching talent applications"))
    }

    /// Fetches one page of a per-account collection
    ///
    /// The total comes from `x-total-count`; without the header the page is
    /// assumed to hold the whole collection.
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        page: u32,
        limit: u32,
    ) -> Result<Page<T>, ApiError> {
        let query = [("page", page.to_string()), ("limit", limit.to_string())];
        let response = self.http.get(segments, &query).await?;
        let has_total = response.header(TOTAL_COUNT_HEADER).is_some();
        let total_count = response.total_count();
        let data: Vec<T> = response.json()?;
        let total_count = if has_total {
            total_count
        } else {
            data.len() as u64
        };
        Ok(Page::new(data, total_count, page, limit))
    }
}

fn page_and_limit(page: u32, limit: u32) -> (u32, u32) {
    let page = if page == 0 { DEFAULT_PAGE } else { page };
    let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
    (page, limit)
}
