use serde::Serialize;
use utoipa::ToSchema;

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 2)]
    pub current: u64,
    /// Total number of pages: `ceil(total / limit)`.
    #[schema(example = 5)]
    pub pages: u64,
    /// Total number of matching records.
    #[schema(example = 47)]
    pub total: u64,
}

impl Pagination {
    pub fn new(current: u64, limit: u64, total: u64) -> Self {
        Self {
            current,
            pages: total.div_ceil(limit.max(1)),
            total,
        }
    }
}

/// Envelope wrapping every successful response.
#[derive(Serialize, ToSchema)]
pub struct Envelope<T> {
    /// Always `true` on this path.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            pagination: None,
        }
    }

    pub fn page(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: Some(pagination),
        }
    }
}
