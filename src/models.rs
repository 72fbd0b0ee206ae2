//! Core data models for the marketplace API
//!
//! Request and response shapes shared by the API facades. Server documents are
//! decoded leniently: ids may arrive as strings or numbers, prices as numbers
//! or numeric strings, and fields this crate does not model are kept in an
//! `extra` map rather than dropped.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Default page for paginated endpoints
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size for paginated endpoints
pub const DEFAULT_LIMIT: u32 = 10;

/// Number of tasks shown in the featured strip
pub const FEATURED_LIMIT: u32 = 3;

/// Account role
///
/// `User` posts tasks, `Talent` does them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Task poster
    User,
    /// Task doer
    Talent,
}

impl Role {
    /// Wire name used in paths and payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Talent => "talent",
        }
    }

    /// Collection segment for role-scoped endpoints (`users`, `talents`)
    pub fn collection(&self) -> &'static str {
        match self {
            Role::User => "users",
            Role::Talent => "talents",
        }
    }

    /// Parses a role name, case-insensitively
    ///
    /// Accepts the wire names plus "poster" and "doer". Returns `None` otherwise.
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "user" | "poster" => Some(Role::User),
            "talent" | "doer" => Some(Role::Talent),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts a string, number or null id and yields it as a string
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!("invalid id: {}", other))),
    }
}

/// Decodes an explicit `null` as the type's default, like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a number, numeric string or null
fn deserialize_amount<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid amount: {}", s))),
        Value::Null => Ok(None),
        other => Err(D::Error::custom(format!("invalid amount: {}", other))),
    }
}

/// Unknown role strings (including "") decode as `None`
fn deserialize_role<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Role>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Role::parse))
}

/// Geographic position of a task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A task as returned by the list and detail endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub price: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for `POST /tasks`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Additional fields sent as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filters for the task list endpoint
///
/// `page` and `limit` fall back to 1 and 10 when unset or zero. Empty filter
/// strings are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
}

/// The parameters that actually shape a task list response
///
/// This is what the cache key is built from, so two queries that differ only
/// in defaulted or empty fields share a cache slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveTaskQuery<'a> {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<&'a str>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl TaskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Resolves defaults and drops empty filters
    pub fn effective(&self) -> EffectiveTaskQuery<'_> {
        EffectiveTaskQuery {
            page: self.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            limit: self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
            category: non_empty(&self.category),
            location: non_empty(&self.location),
            search: non_empty(&self.search),
        }
    }
}

impl EffectiveTaskQuery<'_> {
    /// Query string pairs in the server's vocabulary (`_page`, `_limit`, `q`)
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("_page", self.page.to_string()),
            ("_limit", self.limit.to_string()),
        ];
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(location) = self.location {
            pairs.push(("location", location.to_string()));
        }
        if let Some(search) = self.search {
            pairs.push(("q", search.to_string()));
        }
        pairs
    }
}

/// One page of a paginated collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total_count: u64,
    pub current_page: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Builds a page, deriving `total_pages = ceil(total_count / limit)`
    pub fn new(data: Vec<T>, total_count: u64, current_page: u32, limit: u32) -> Self {
        Self {
            data,
            total_count,
            current_page,
            total_pages: total_pages(total_count, limit),
        }
    }
}

/// `ceil(total_count / limit)`; a zero limit is treated as the default page size
pub fn total_pages(total_count: u64, limit: u32) -> u64 {
    let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
    total_count.div_ceil(u64::from(limit))
}

/// Profile of the authenticated account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_role")]
    pub role: Option<Role>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(rename = "profileCompleted", default, deserialize_with = "null_as_default")]
    pub profile_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

/// Response of the register, login and Google endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// Profile fields sent alongside the token
    #[serde(flatten)]
    pub user: UserProfile,
}

/// Credentials for `POST /auth/login/:role`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Payload for `POST /auth/register/:role`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub given_name: String,
    pub family_name: String,
    pub picture: String,
    pub role: Role,
    #[serde(rename = "profileCompleted")]
    pub profile_completed: bool,
}

/// Result of `GET /:roles/check-email/:email`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailCheck {
    #[serde(default, deserialize_with = "null_as_default")]
    pub exists: bool,
}

/// Payload for `POST /tasks/:id/apply`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub task_id: String,
    pub talent_id: String,
    pub proposal: String,
    pub price: f64,
    pub status: String,
}

impl ApplicationRequest {
    /// A new pending application
    pub fn new(
        task_id: impl Into<String>,
        talent_id: impl Into<String>,
        proposal: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            talent_id: talent_id.into(),
            proposal: proposal.into(),
            price,
            status: "pending".to_string(),
        }
    }
}

/// Response of `POST /tasks/:id/apply`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A talent's application as listed on their dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    /// The task applied for, embedded or by reference
    #[serde(default)]
    pub task: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub proposal: Option<String>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub price: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A map pin for a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub price: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parse_and_names() {
        assert_eq!(Role::parse("talent"), Some(Role::Talent));
        assert_eq!(Role::parse(" USER "), Some(Role::User));
        assert_eq!(Role::parse("doer"), Some(Role::Talent));
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::Talent.collection(), "talents");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_task_accepts_numeric_id_and_string_price() {
        let task: Task = serde_json::from_value(json!({
            "id": 42,
            "title": "Fix sink",
            "price": "75.50",
            "dueDate": "2024-07-15",
            "coordinates": {"lat": 30.27, "lng": -97.74},
            "applications": 3
        }))
        .expect("task should decode");

        assert_eq!(task.id, "42");
        assert_eq!(task.price, Some(75.5));
        assert_eq!(task.due_date.as_deref(), Some("2024-07-15"));
        assert_eq!(task.extra.get("applications"), Some(&json!(3)));
    }

    #[test]
    fn test_task_rejects_non_numeric_price() {
        let result: Result<Task, _> =
            serde_json::from_value(json!({"id": "1", "price": "cheap"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_query_defaults_and_empty_filters() {
        let query = TaskQuery::new().page(0).category("");
        let effective = query.effective();

        assert_eq!(effective.page, 1);
        assert_eq!(effective.limit, 10);
        assert_eq!(effective.category, None);
        assert_eq!(
            effective.to_query_pairs(),
            vec![("_page", "1".to_string()), ("_limit", "10".to_string())]
        );
    }

    #[test]
    fn test_query_pairs_use_server_names() {
        let query = TaskQuery::new()
            .page(2)
            .limit(20)
            .category("Plumbing")
            .location("Austin")
            .search("sink");

        assert_eq!(
            query.effective().to_query_pairs(),
            vec![
                ("_page", "2".to_string()),
                ("_limit", "20".to_string()),
                ("category", "Plumbing".to_string()),
                ("location", "Austin".to_string()),
                ("q", "sink".to_string()),
            ]
        );
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(95, 10), 10);
        assert_eq!(total_pages(100, 10), 10);
        assert_eq!(total_pages(101, 10), 11);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(5, 0), 1);
    }

    #[test]
    fn test_page_new() {
        let page = Page::new(vec![1, 2, 3], 95, 4, 10);
        assert_eq!(page.total_pages, 10);
        assert_eq!(page.current_page, 4);
    }

    #[test]
    fn test_auth_response_flattens_profile() {
        let response: AuthResponse = serde_json::from_value(json!({
            "success": true,
            "token": "abc",
            "id": 7,
            "email": "sam@example.com",
            "name": "Sam Doe",
            "role": "talent",
            "profileCompleted": false
        }))
        .unwrap();

        assert!(response.success);
        assert_eq!(response.token.as_deref(), Some("abc"));
        assert_eq!(response.user.id, "7");
        assert_eq!(response.user.role, Some(Role::Talent));
        assert!(!response.user.profile_completed);
    }

    #[test]
    fn test_profile_with_blank_role() {
        let profile: UserProfile =
            serde_json::from_value(json!({"id": "u1", "role": ""})).unwrap();
        assert_eq!(profile.role, None);
        assert_eq!(profile.picture, None);
    }

    #[test]
    fn test_application_request_wire_format() {
        let request = ApplicationRequest::new("42", "t1", "I can do it", 80.0);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "taskId": "42",
                "talentId": "t1",
                "proposal": "I can do it",
                "price": 80.0,
                "status": "pending"
            })
        );
    }

    #[test]
    fn test_null_fields_decode_as_defaults() {
        let task: Task = serde_json::from_value(json!({
            "id": "5",
            "title": null,
            "images": null,
            "description": null
        }))
        .unwrap();
        assert_eq!(task.title, "");
        assert!(task.images.is_empty());
        assert_eq!(task.description, None);

        let response: AuthResponse = serde_json::from_value(json!({
            "success": null,
            "token": "abc",
            "id": "7",
            "email": null,
            "name": null,
            "picture": null,
            "profileCompleted": null
        }))
        .unwrap();
        assert!(!response.success);
        assert_eq!(response.user.name, "");
        assert_eq!(response.user.email, "");
        assert!(!response.user.profile_completed);

        let marker: MapMarker = serde_json::from_value(json!({
            "id": 3,
            "latitude": null,
            "longitude": 2.5,
            "title": null
        }))
        .unwrap();
        assert_eq!(marker.latitude, 0.0);
        assert_eq!(marker.title, "");
    }
}
