//! Task browsing, posting and applications

use serde_json::Value;
use std::sync::Arc;
use tracing::error;

use super::read_through;
use crate::cache::{key, ResponseCache};
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::{
    ApplicationRequest, ApplicationResponse, NewTask, Page, Task, TaskQuery, FEATURED_LIMIT,
};

/// Task endpoints
#[derive(Debug, Clone)]
pub struct TaskApi {
    http: HttpClient,
    cache: Arc<ResponseCache>,
}

impl TaskApi {
    pub(crate) fn new(http: HttpClient, cache: Arc<ResponseCache>) -> Self {
        Self { http, cache }
    }

    /// Fetches one page of tasks matching `query`
    ///
    /// # Arguments
    /// * `query` - Page, page size and optional filters
    ///
    /// # Returns
    /// * `Ok(Page<Task>)` - The tasks plus pagination derived from `x-total-count`
    /// * `Err(ApiError)` - If the request or decoding fails
    pub async fn get_tasks(&self, query: &TaskQuery) -> Result<Page<Task>, ApiError> {
        let effective = query.effective();
        let cache_key = key::tasks(&effective);

        read_through(&self.cache, cache_key, || async {
            let response = self
                .http
                .get(&["tasks"], &effective.to_query_pairs())
                .await?;
            let total_count = response.total_count();
            let data: Vec<Task> = response.json()?;
            Ok::<_, ApiError>(Page::new(data, total_count, effective.page, effective.limit))
        })
        .await
        .inspect_err(|e| error!(error = %e, "error fetching tasks"))
    }

    /// Fetches the featured strip (the first three tasks)
    pub async fn get_featured_tasks(&self) -> Result<Vec<Task>, ApiError> {
        read_through(&self.cache, key::FEATURED_TASKS.to_string(), || async {
            self.http
                .get(&["tasks"], &[("_limit", FEATURED_LIMIT.to_string())])
                .await?
                .json()
        })
        .await
        .inspect_err(|e| error!(error = %e, "error fetching featured tasks"))
    }

    /// Fetches a single task
    ///
    /// An empty `id` fails with `MissingArgument` without sending a request.
    pub async fn get_task_by_id(&self, id: &str) -> Result<Task, ApiError> {
        if id.is_empty() {
            return Err(ApiError::MissingArgument("Task ID"));
        }

        read_through(&self.cache, key::task(id), || async {
            self.http.get(&["tasks", id], &[]).await?.json()
        })
        .await
        .inspect_err(|e| error!(task_id = id, error = %e, "error fetching task"))
    }

    /// Posts a new task and returns the server's representation of it
    pub async fn create_task(&self, task: &NewTask) -> Result<Value, ApiError> {
        let response = self
            .http
            .post_json(&["tasks"], task)
            .await
            .inspect_err(|e| error!(error = %e, "error creating task"))?;

        self.invalidate_lists();
        Ok(response.body)
    }

    /// Submits an application for `task_id`
    pub async fn apply_for_task(
        &self,
        task_id: &str,
        application: &ApplicationRequest,
    ) -> Result<ApplicationResponse, ApiError> {
        if task_id.is_empty() {
            return Err(ApiError::MissingArgument("Task ID"));
        }

        let response = self
            .http
            .post_json(&["tasks", task_id, "apply"], application)
            .await
            .and_then(|r| match r.body {
                Value::Null => Ok(ApplicationResponse::default()),
                _ => r.json::<ApplicationResponse>(),
            })
            .inspect_err(|e| error!(task_id, error = %e, "error applying for task"))?;

        self.cache.delete(&key::task(task_id));
        self.cache
            .invalidate_prefix(&key::talent_applications_prefix(&application.talent_id));
        Ok(response)
    }

    /// Deletes a task
    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        if id.is_empty() {
            return Err(ApiError::MissingArgument("Task ID"));
        }

        self.http
            .delete(&["tasks", id])
            .await
            .inspect_err(|e| error!(task_id = id, error = %e, "error deleting task"))?;

        self.cache.delete(&key::task(id));
        self.invalidate_lists();
        Ok(())
    }

    /// Drops every cached list a new or removed task could appear in
    fn invalidate_lists(&self) {
        self.cache.invalidate_prefix(key::TASKS_PREFIX);
        self.cache.delete(key::FEATURED_TASKS);
        self.cache.invalidate_prefix(key::USER_TASKS_PREFIX);
    }
}
