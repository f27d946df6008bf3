//! Response envelope and shared query types

use serde::{Deserialize, Serialize};

use crate::domain::entities::Page;

/// Success body: `{success, data?, message?, pagination?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn paged(page: Page<T>) -> Self {
        let pagination = Pagination {
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages(),
        };
        Self {
            success: true,
            data: Some(page.items),
            message: None,
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    /// Body without data, e.g. after a delete
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PageRequest;
    use serde_json::json;

    #[test]
    fn paged_response_carries_pagination() {
        let page = Page::new(vec![1, 2], 21, PageRequest::new(Some(2), Some(10), 10));

        let body = serde_json::to_value(ApiResponse::paged(page)).unwrap();

        assert_eq!(
            body,
            json!({
                "success": true,
                "data": [1, 2],
                "pagination": { "page": 2, "limit": 10, "total": 21, "totalPages": 3 }
            })
        );
    }

    #[test]
    fn message_only_body_omits_data() {
        let body = serde_json::to_value(ApiResponse::message("Deleted")).unwrap();

        assert_eq!(body, json!({ "success": true, "message": "Deleted" }));
    }
}
