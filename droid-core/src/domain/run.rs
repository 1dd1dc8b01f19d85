//! Run domain type
//!
//! A run is a full execution of a product's test suite. The agent only needs
//! the parts of it that drive notifications.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::names;

/// A test run as returned by the result store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub settings: HashMap<String, JsonValue>,
    #[serde(default)]
    pub details: HashMap<String, String>,
    #[serde(default)]
    pub status: String,
}

impl Run {
    /// Official runs notify the whole team and refresh dashboards
    pub fn is_official(&self) -> bool {
        self.settings
            .get(names::KEY_REMARK)
            .and_then(JsonValue::as_str)
            .is_some_and(|remark| remark.eq_ignore_ascii_case(names::REMARK_OFFICIAL))
    }

    /// Email address of the user who started the run, if any
    pub fn user_email(&self) -> Option<&str> {
        self.settings
            .get(names::KEY_USER_EMAIL)
            .and_then(JsonValue::as_str)
            .filter(|email| !email.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run_with(settings: JsonValue) -> Run {
        serde_json::from_value(json!({ "id": 12, "settings": settings })).unwrap()
    }

    #[test]
    fn test_official_remark() {
        assert!(run_with(json!({ "a01.reserved.remark": "official" })).is_official());
        assert!(run_with(json!({ "a01.reserved.remark": "Official" })).is_official());
        assert!(!run_with(json!({ "a01.reserved.remark": "nightly" })).is_official());
        assert!(!run_with(json!({})).is_official());
    }

    #[test]
    fn test_user_email() {
        let run = run_with(json!({ "a01.reserved.useremail": "dev@example.com" }));
        assert_eq!(run.user_email(), Some("dev@example.com"));
        assert_eq!(run_with(json!({})).user_email(), None);
        assert_eq!(run_with(json!({ "a01.reserved.useremail": 5 })).user_email(), None);
    }
}
