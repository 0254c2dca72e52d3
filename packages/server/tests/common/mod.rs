//! Shared test harness: in-memory doubles for the blog store and the media
//! store, plus request helpers that drive the real router.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use bson::oid::ObjectId;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ::common::{BulkDeleteOutcome, DeleteOutcome, MediaError, MediaStore, UploadedImage};
use server::config::{AppConfig, CorsConfig, DatabaseConfig, MediaConfig, ServerConfig};
use server::entity::blog::{BlogDocument, normalize_tags, read_time_minutes, slugify};
use server::state::AppState;
use server::store::{BlogFilter, BlogPatch, BlogStore, NewBlog, StoreError, build_document};

/// In-memory [`BlogStore`] mirroring the MongoDB implementation's semantics.
#[derive(Default)]
pub struct MemoryBlogStore {
    docs: Mutex<Vec<BlogDocument>>,
}

impl MemoryBlogStore {
    fn matches(doc: &BlogDocument, filter: &BlogFilter) -> bool {
        if let Some(visibility) = filter.visibility
            && doc.visibility != visibility
        {
            return false;
        }
        if let Some(ref tags) = filter.tags
            && !doc.tags.iter().any(|t| tags.contains(t))
        {
            return false;
        }
        if let Some(ref search) = filter.search {
            let needle = search.to_lowercase();
            let haystack = format!(
                "{} {} {}",
                doc.title,
                doc.subtitle.as_deref().unwrap_or_default(),
                doc.body
            )
            .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl BlogStore for MemoryBlogStore {
    async fn find(
        &self,
        filter: BlogFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<BlogDocument>, u64), StoreError> {
        let docs = self.docs.lock().unwrap();
        let mut matched: Vec<BlogDocument> = docs
            .iter()
            .filter(|doc| Self::matches(doc, &filter))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.date.cmp(&a.date));

        let total = matched.len() as u64;
        let skip = (page.saturating_sub(1) * limit) as usize;
        let items = matched.into_iter().skip(skip).take(limit as usize).collect();
        Ok((items, total))
    }

    async fn find_one(&self, id_or_slug: &str) -> Result<Option<BlogDocument>, StoreError> {
        let docs = self.docs.lock().unwrap();
        if let Ok(oid) = ObjectId::parse_str(id_or_slug)
            && let Some(found) = docs.iter().find(|d| d.id == Some(oid))
        {
            return Ok(Some(found.clone()));
        }
        Ok(docs.iter().find(|d| d.slug == id_or_slug).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogDocument>, StoreError> {
        let docs = self.docs.lock().unwrap();
        Ok(docs.iter().find(|d| d.slug == slug).cloned())
    }

    async fn insert(&self, draft: NewBlog) -> Result<BlogDocument, StoreError> {
        let mut document = build_document(draft, Utc::now());
        let mut docs = self.docs.lock().unwrap();
        if docs.iter().any(|d| d.slug == document.slug) {
            return Err(StoreError::DuplicateSlug(document.slug));
        }
        document.id = Some(ObjectId::new());
        docs.push(document.clone());
        Ok(document)
    }

    async fn update(
        &self,
        id: &str,
        patch: BlogPatch,
    ) -> Result<Option<BlogDocument>, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let mut docs = self.docs.lock().unwrap();

        if let Some(ref title) = patch.title {
            let slug = slugify(title);
            if docs.iter().any(|d| d.slug == slug && d.id != Some(oid)) {
                return Err(StoreError::DuplicateSlug(slug));
            }
        }

        let Some(doc) = docs.iter_mut().find(|d| d.id == Some(oid)) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            doc.slug = slugify(&title);
            doc.title = title;
        }
        if let Some(body) = patch.body {
            doc.read_time = read_time_minutes(&body);
            doc.body = body;
        }
        if let Some(subtitle) = patch.subtitle {
            doc.subtitle = Some(subtitle.trim().to_string()).filter(|s| !s.is_empty());
        }
        if let Some(banner) = patch.banner {
            doc.banner = banner;
        }
        if let Some(images) = patch.images {
            doc.images = images;
        }
        if let Some(tags) = patch.tags {
            doc.tags = normalize_tags(&tags);
        }
        if let Some(visibility) = patch.visibility {
            doc.visibility = visibility;
        }
        if let Some(date) = patch.date {
            doc.date = date;
        }
        doc.updated_at = Utc::now();

        Ok(Some(doc.clone()))
    }

    async fn delete(&self, id: &str) -> Result<Option<BlogDocument>, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let mut docs = self.docs.lock().unwrap();
        let position = docs.iter().position(|d| d.id == Some(oid));
        Ok(position.map(|i| docs.remove(i)))
    }
}

/// Records every media store call. Uploads whose filename contains `fail`
/// are rejected, for partial-failure scenarios.
#[derive(Default)]
pub struct RecordingMediaStore {
    pub uploads: Mutex<Vec<String>>,
    pub url_uploads: Mutex<Vec<String>>,
    pub single_deletes: Mutex<Vec<String>>,
    pub bulk_deletes: Mutex<Vec<Vec<String>>>,
    counter: AtomicUsize,
}

impl RecordingMediaStore {
    fn stored(&self, stem: &str) -> UploadedImage {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let public_id = format!("blog-images/up{n}_{stem}");
        UploadedImage {
            url: format!("https://res.cloudinary.com/demo/image/upload/{public_id}.jpg"),
            public_id,
            width: 1200,
            height: 800,
            format: "jpg".into(),
            bytes: 2048,
        }
    }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn upload_bytes(
        &self,
        _bytes: Vec<u8>,
        _content_type: &str,
        filename: &str,
    ) -> Result<UploadedImage, MediaError> {
        if filename.contains("fail") {
            return Err(MediaError::UploadFailed(format!("rejected {filename}")));
        }
        self.uploads.lock().unwrap().push(filename.to_string());
        Ok(self.stored(filename.split('.').next().unwrap_or("image")))
    }

    async fn upload_from_url(
        &self,
        url: &str,
        _public_id: Option<String>,
    ) -> Result<UploadedImage, MediaError> {
        self.url_uploads.lock().unwrap().push(url.to_string());
        Ok(self.stored("url_upload"))
    }

    async fn delete_one(&self, public_id: &str) -> Result<DeleteOutcome, MediaError> {
        self.single_deletes.lock().unwrap().push(public_id.to_string());
        Ok(DeleteOutcome {
            success: true,
            result: "ok".into(),
        })
    }

    async fn delete_many(&self, public_ids: &[String]) -> Result<BulkDeleteOutcome, MediaError> {
        self.bulk_deletes.lock().unwrap().push(public_ids.to_vec());
        Ok(BulkDeleteOutcome::default())
    }

    fn owns_url(&self, url: &str) -> bool {
        url.contains("res.cloudinary.com")
    }

    fn transform_url(&self, public_id: &str, width: u32, height: u32) -> String {
        format!("https://res.cloudinary.com/demo/image/upload/w_{width},h_{height}/{public_id}")
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors: CorsConfig {
                allow_origins: vec!["http://localhost:3000".into()],
            },
        },
        database: DatabaseConfig {
            url: "mongodb://unused".into(),
            name: "test".into(),
        },
        media: MediaConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
        },
    }
}

pub fn test_app() -> (Router, Arc<MemoryBlogStore>, Arc<RecordingMediaStore>) {
    let store = Arc::new(MemoryBlogStore::default());
    let media = Arc::new(RecordingMediaStore::default());
    let state = AppState {
        store: store.clone(),
        media: media.clone(),
        config: Arc::new(test_config()),
    };
    (server::build_router(state), store, media)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub const BOUNDARY: &str = "test-boundary";

pub enum Part<'a> {
    Text {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

/// Hand-rolled multipart/form-data body.
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn send_multipart(
    app: &Router,
    method: Method,
    uri: &str,
    parts: &[Part<'_>],
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
