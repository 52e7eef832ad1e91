//! Cursor pagination and ordering for search intents.
//!
//! Cursors are opaque: `after` is forwarded verbatim and `pageInfo.endCursor`
//! is handed back to the caller untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::args::{optional_str, optional_u32, Args};
use crate::error::{LinearError, LinearResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub first: u32,
    pub after: Option<String>,
}

impl PageRequest {
    pub fn from_args(args: &Args, default_page_size: u32) -> LinearResult<Self> {
        Ok(Self {
            first: optional_u32(args, "first")?.unwrap_or(default_page_size),
            after: optional_str(args, "after")?,
        })
    }
}

/// Timestamp fields the backend can order by (most recent first).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderBy {
    CreatedAt,
    #[default]
    UpdatedAt,
}

impl OrderBy {
    pub const VALUES: [&'static str; 2] = ["createdAt", "updatedAt"];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderBy::CreatedAt => "createdAt",
            OrderBy::UpdatedAt => "updatedAt",
        }
    }

    pub fn from_args(args: &Args) -> LinearResult<Option<Self>> {
        match optional_str(args, "orderBy")?.as_deref() {
            None => Ok(None),
            Some("createdAt") => Ok(Some(OrderBy::CreatedAt)),
            Some("updatedAt") => Ok(Some(OrderBy::UpdatedAt)),
            Some("priority") => Err(LinearError::validation(
                "'priority' is not an orderBy field; use the priority filter instead",
            )),
            Some(other) => Err(LinearError::validation(format!(
                "'orderBy' must be one of {:?}, got '{}'",
                Self::VALUES,
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// A page of entities as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub nodes: Vec<Value>,
    pub page_info: PageInfo,
}

impl Page {
    pub fn from_value(value: &Value) -> Option<Self> {
        Page::deserialize(value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Args {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn page_defaults_to_configured_size() {
        let page = PageRequest::from_args(&args(json!({})), 50).unwrap();
        assert_eq!(page, PageRequest { first: 50, after: None });
    }

    #[test]
    fn cursor_is_kept_verbatim() {
        let page =
            PageRequest::from_args(&args(json!({ "first": 5, "after": "cursor123" })), 50).unwrap();
        assert_eq!(page.after.as_deref(), Some("cursor123"));
        assert_eq!(page.first, 5);
    }

    #[test]
    fn priority_is_not_an_order_field() {
        let err = OrderBy::from_args(&args(json!({ "orderBy": "priority" }))).unwrap_err();
        assert!(err.is_validation());
        assert!(OrderBy::from_args(&args(json!({ "orderBy": "title" }))).is_err());
        assert_eq!(
            OrderBy::from_args(&args(json!({ "orderBy": "createdAt" }))).unwrap(),
            Some(OrderBy::CreatedAt)
        );
    }

    #[test]
    fn page_parses_backend_shape() {
        let page = Page::from_value(&json!({
            "nodes": [{ "id": "i1" }],
            "pageInfo": { "hasNextPage": true, "endCursor": "abc" }
        }))
        .unwrap();
        assert_eq!(page.nodes.len(), 1);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("abc"));
    }
}
