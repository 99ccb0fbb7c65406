//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub slug: String,
    pub raw_markdown: String,
    #[serde(default)]
    pub publish: bool,
}

/// Request to update a post. Content is only replaced when `title`, `slug`
/// and `raw_markdown` are all given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub raw_markdown: Option<String>,
    #[serde(default)]
    pub publish: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

/// Raw listing query string. Values are kept as text so that malformed
/// input falls back to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub order: Option<String>,
}

/// Listing parameters after defaults and bounds are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub page: u64,
    pub per_page: u64,
    pub ascending: bool,
}

impl ListQuery {
    /// `page` defaults to 1, `per_page` to 20 (anything outside 1..=100 too),
    /// and `order` to newest first unless it reads `asc`.
    pub fn normalise(&self) -> ListParams {
        let positive = |v: &Option<String>| {
            v.as_deref()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|n| *n > 0)
        };

        ListParams {
            page: positive(&self.page).unwrap_or(1),
            per_page: positive(&self.per_page)
                .filter(|n| *n <= MAX_PER_PAGE)
                .unwrap_or(DEFAULT_PER_PAGE),
            ascending: self
                .order
                .as_deref()
                .is_some_and(|o| o.trim().eq_ignore_ascii_case("asc")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: &str, per_page: &str, order: &str) -> ListQuery {
        ListQuery {
            page: Some(page.to_string()),
            per_page: Some(per_page.to_string()),
            order: Some(order.to_string()),
        }
    }

    #[test]
    fn test_defaults() {
        let params = ListQuery::default().normalise();
        assert_eq!(
            params,
            ListParams {
                page: 1,
                per_page: 20,
                ascending: false
            }
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let params = query("0", "500", "sideways").normalise();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 20);
        assert!(!params.ascending);

        let params = query("abc", "-3", "").normalise();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 20);
    }

    #[test]
    fn test_valid_values_are_kept() {
        let params = query("3", "100", "ASC").normalise();
        assert_eq!(params.page, 3);
        assert_eq!(params.per_page, 100);
        assert!(params.ascending);
    }

    #[test]
    fn test_update_request_fields_are_optional() {
        let req: UpdatePostRequest = serde_json::from_str(r#"{"publish": true}"#).unwrap();
        assert_eq!(req.publish, Some(true));
        assert!(req.title.is_none());
    }
}
