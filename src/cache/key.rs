//! Cache key construction
//!
//! Every cacheable endpoint has a fixed key format. List keys embed the
//! request parameters as canonical JSON (object keys sorted at every level)
//! so that equal parameter sets always land in the same slot no matter how
//! they were assembled.

use serde::Serialize;
use serde_json::{Map, Value};

/// Key for the authenticated user's profile
pub const CURRENT_USER: &str = "current-user";

/// Key for the featured task strip
pub const FEATURED_TASKS: &str = "featured-tasks";

/// Prefix shared by all task list keys
pub const TASKS_PREFIX: &str = "tasks-";

/// Prefix shared by all posted-task keys
pub const USER_TASKS_PREFIX: &str = "user-tasks-";

/// Serializes `params` to JSON with object keys sorted recursively
///
/// Values that cannot be represented as JSON serialize as `null`.
pub fn canonical_json<T: Serialize + ?Sized>(params: &T) -> String {
    let value = serde_json::to_value(params).unwrap_or(Value::Null);
    canonicalize(value).to_string()
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// `tasks-<canonical params>`
pub fn tasks<T: Serialize + ?Sized>(params: &T) -> String {
    format!("{}{}", TASKS_PREFIX, canonical_json(params))
}

/// `task-<id>`
pub fn task(id: &str) -> String {
    format!("task-{}", id)
}

/// `user-tasks-<user>-<page>-<limit>`
pub fn user_tasks(user_id: &str, page: u32, limit: u32) -> String {
    format!("{}{}-{}-{}", USER_TASKS_PREFIX, user_id, page, limit)
}

/// Prefix covering every cached application page for one talent
///
/// Ids are not escaped, so the prefix for `1` also covers talent `1-2`.
/// Invalidation can drop a neighbour's pages but never keeps stale ones.
pub fn talent_applications_prefix(talent_id: &str) -> String {
    format!("talent-applications-{}-", talent_id)
}

/// `talent-applications-<talent>-<page>-<limit>`
pub fn talent_applications(talent_id: &str, page: u32, limit: u32) -> String {
    format!("{}{}-{}", talent_applications_prefix(talent_id), page, limit)
}

/// `markers-<city>`; an empty city yields `markers-`
pub fn markers(city: &str) -> String {
    format!("markers-{}", city)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn test_canonical_json_sorts_keys() {
        let value = json!({"page": 1, "category": "Plumbing", "limit": 10});
        assert_eq!(
            canonical_json(&value),
            r#"{"category":"Plumbing","limit":10,"page":1}"#
        );
    }

    #[test]
    fn test_canonical_json_sorts_nested_objects() {
        let value = json!({"b": {"z": 1, "a": 2}, "a": [{"y": 1, "x": 2}]});
        assert_eq!(
            canonical_json(&value),
            r#"{"a":[{"x":2,"y":1}],"b":{"a":2,"z":1}}"#
        );
    }

    #[test]
    fn test_key_ignores_insertion_order() {
        let mut first = HashMap::new();
        first.insert("page", json!(1));
        first.insert("category", json!("Plumbing"));
        first.insert("location", json!("Austin"));

        let mut second = HashMap::new();
        second.insert("location", json!("Austin"));
        second.insert("category", json!("Plumbing"));
        second.insert("page", json!(1));

        assert_eq!(tasks(&first), tasks(&second));
    }

    #[test]
    fn test_key_differs_for_different_values() {
        let mut first = BTreeMap::new();
        first.insert("page", json!(1));
        first.insert("category", json!("Plumbing"));

        let mut second = first.clone();
        second.insert("category", json!("Cleaning"));

        let mut third = first.clone();
        third.insert("location", json!("Austin"));

        assert_ne!(tasks(&first), tasks(&second));
        assert_ne!(tasks(&first), tasks(&third));
    }

    #[test]
    fn test_number_and_string_values_do_not_collide() {
        assert_ne!(tasks(&json!({"page": 1})), tasks(&json!({"page": "1"})));
    }

    #[test]
    fn test_fixed_key_formats() {
        assert_eq!(task("42"), "task-42");
        assert_eq!(user_tasks("u1", 2, 10), "user-tasks-u1-2-10");
        assert_eq!(talent_applications("t9", 1, 5), "talent-applications-t9-1-5");
        assert_eq!(markers("Austin"), "markers-Austin");
        assert_eq!(markers(""), "markers-");
        assert_eq!(CURRENT_USER, "current-user");
    }

    #[test]
    fn test_talent_prefix_does_not_cover_other_talents() {
        let key = talent_applications("12", 1, 10);
        assert!(key.starts_with(&talent_applications_prefix("12")));
        assert!(!key.starts_with(&talent_applications_prefix("1")));
    }

    #[test]
    fn test_talent_prefix_over_covers_dashed_ids() {
        let neighbour = talent_applications("1-2", 1, 10);
        assert!(neighbour.starts_with(&talent_applications_prefix("1")));
    }
}
