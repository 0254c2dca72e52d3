pub mod mongo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entity::blog::{
    BlogDocument, DEFAULT_AUTHOR, ImageRef, Visibility, normalize_tags, read_time_minutes, slugify,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The derived slug already exists on another record.
    #[error("a blog with slug '{0}' already exists")]
    DuplicateSlug(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Input for a fresh record. Derived fields (slug, read time, timestamps)
/// are computed at save time, never accepted from callers.
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
    pub banner: ImageRef,
    pub images: Vec<ImageRef>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub date: Option<DateTime<Utc>>,
}

/// Field-wise patch; `None` means "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct BlogPatch {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub banner: Option<ImageRef>,
    pub images: Option<Vec<ImageRef>>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    pub visibility: Option<Visibility>,
    /// Set-membership: a record matches when its tag set intersects these.
    pub tags: Option<Vec<String>>,
    /// Full-text search across title/subtitle/body.
    pub search: Option<String>,
}

/// Schema-enforced CRUD over blog documents.
///
/// Behind a trait so handlers can run against an in-memory double in tests,
/// the same way the blob store is injected elsewhere in the workspace.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Filtered page of records ordered by `date` descending, plus the total
    /// match count. `page` is 1-based; skip is `(page - 1) * limit`.
    async fn find(
        &self,
        filter: BlogFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<BlogDocument>, u64), StoreError>;

    /// Lookup by object id first, falling back to slug.
    async fn find_one(&self, id_or_slug: &str) -> Result<Option<BlogDocument>, StoreError>;

    /// Strict slug lookup.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogDocument>, StoreError>;

    /// Persist a new record after running the derivation hooks.
    async fn insert(&self, draft: NewBlog) -> Result<BlogDocument, StoreError>;

    /// Merge `patch` into the record, re-running derivations for any changed
    /// source fields. Returns `None` when the id is unknown.
    async fn update(&self, id: &str, patch: BlogPatch)
    -> Result<Option<BlogDocument>, StoreError>;

    /// Remove and return the record, or `None` when the id is unknown.
    async fn delete(&self, id: &str) -> Result<Option<BlogDocument>, StoreError>;
}

/// Save-time derivation hook: builds the full document from a draft.
pub fn build_document(draft: NewBlog, now: DateTime<Utc>) -> BlogDocument {
    let title = draft.title.trim().to_string();
    BlogDocument {
        id: None,
        slug: slugify(&title),
        read_time: read_time_minutes(&draft.body),
        tags: normalize_tags(&draft.tags),
        title,
        subtitle: draft.subtitle.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        body: draft.body,
        banner: draft.banner,
        images: draft.images,
        visibility: draft.visibility,
        author: DEFAULT_AUTHOR.to_string(),
        date: draft.date.unwrap_or(now),
        created_at: now,
        updated_at: now,
    }
}
