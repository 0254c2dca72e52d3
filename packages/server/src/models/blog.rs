use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entity::blog::{BlogDocument, ImageRef, Visibility};

/// Query parameters for the list endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct BlogListQuery {
    /// 1-based page number (default 1).
    pub page: Option<u64>,
    /// Page size (default 10).
    pub limit: Option<u64>,
    pub visibility: Option<Visibility>,
    /// Comma-separated tag list; matches records whose tags intersect it.
    pub tags: Option<String>,
    /// Full-text search across title/subtitle/body.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TagListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// JSON body accepted by create (multipart is parsed separately; both funnel
/// into the same payload). Banner and images arrive as URL strings here.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BlogJsonBody {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub banner: Option<String>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub date: Option<DateTime<Utc>>,
}

/// A blog post as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogResponse {
    /// Hex object id.
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub body: String,
    pub banner: ImageRef,
    pub images: Vec<ImageRef>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub slug: String,
    pub author: String,
    pub read_time: i32,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BlogDocument> for BlogResponse {
    fn from(doc: BlogDocument) -> Self {
        Self {
            id: doc.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            title: doc.title,
            subtitle: doc.subtitle,
            body: doc.body,
            banner: doc.banner,
            images: doc.images,
            tags: doc.tags,
            visibility: doc.visibility,
            slug: doc.slug,
            author: doc.author,
            read_time: doc.read_time,
            date: doc.date,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}
