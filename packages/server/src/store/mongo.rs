use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document, doc};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::entity::blog::{BlogDocument, read_time_minutes, slugify};

use super::{BlogFilter, BlogPatch, BlogStore, NewBlog, StoreError, build_document};

pub const COLLECTION: &str = "blogs";

/// MongoDB-backed [`BlogStore`].
#[derive(Clone)]
pub struct MongoBlogStore {
    collection: Collection<BlogDocument>,
}

impl MongoBlogStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION),
        }
    }

    fn filter_doc(filter: &BlogFilter) -> Document {
        let mut doc = Document::new();
        if let Some(visibility) = filter.visibility {
            doc.insert("visibility", visibility.as_str());
        }
        if let Some(ref tags) = filter.tags {
            doc.insert("tags", doc! { "$in": tags });
        }
        if let Some(ref search) = filter.search {
            doc.insert("$text", doc! { "$search": search });
        }
        doc
    }

    fn set_doc(patch: BlogPatch, now: chrono::DateTime<Utc>) -> Result<Document, StoreError> {
        let mut set = doc! { "updatedAt": bson::DateTime::from_chrono(now) };

        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            // Slug tracks the title.
            set.insert("slug", slugify(&title));
            set.insert("title", title);
        }
        if let Some(body) = patch.body {
            set.insert("readTime", read_time_minutes(&body));
            set.insert("body", body);
        }
        if let Some(subtitle) = patch.subtitle {
            // An emptied subtitle clears the field, matching create.
            match subtitle.trim() {
                "" => set.insert("subtitle", Bson::Null),
                trimmed => set.insert("subtitle", trimmed),
            };
        }
        if let Some(banner) = patch.banner {
            set.insert("banner", to_bson(&banner)?);
        }
        if let Some(images) = patch.images {
            set.insert("images", to_bson(&images)?);
        }
        if let Some(tags) = patch.tags {
            set.insert("tags", crate::entity::blog::normalize_tags(&tags));
        }
        if let Some(visibility) = patch.visibility {
            set.insert("visibility", visibility.as_str());
        }
        if let Some(date) = patch.date {
            set.insert("date", bson::DateTime::from_chrono(date));
        }

        Ok(set)
    }
}

fn to_bson<T: serde::Serialize>(value: &T) -> Result<Bson, StoreError> {
    bson::to_bson(value).map_err(|e| StoreError::Database(e.to_string()))
}

/// E11000: unique index violation. The only unique index on the collection
/// is `slug`.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == 11000,
        ErrorKind::Command(ce) => ce.code == 11000,
        _ => false,
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

#[async_trait]
impl BlogStore for MongoBlogStore {
    async fn find(
        &self,
        filter: BlogFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<BlogDocument>, u64), StoreError> {
        let filter = Self::filter_doc(&filter);

        let total = self.collection.count_documents(filter.clone()).await?;

        let items = self
            .collection
            .find(filter)
            .sort(doc! { "date": -1 })
            .skip((page.saturating_sub(1)) * limit)
            .limit(limit as i64)
            .await?
            .try_collect()
            .await?;

        Ok((items, total))
    }

    async fn find_one(&self, id_or_slug: &str) -> Result<Option<BlogDocument>, StoreError> {
        if let Ok(oid) = ObjectId::parse_str(id_or_slug) {
            if let Some(found) = self.collection.find_one(doc! { "_id": oid }).await? {
                return Ok(Some(found));
            }
        }
        self.find_by_slug(id_or_slug).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogDocument>, StoreError> {
        Ok(self.collection.find_one(doc! { "slug": slug }).await?)
    }

    async fn insert(&self, draft: NewBlog) -> Result<BlogDocument, StoreError> {
        let mut document = build_document(draft, Utc::now());

        let result = self.collection.insert_one(&document).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StoreError::DuplicateSlug(document.slug.clone())
            } else {
                StoreError::from(e)
            }
        })?;

        document.id = result.inserted_id.as_object_id();
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

        let slug_hint = patch.title.as_deref().map(slugify);
        let set = Self::set_doc(patch, Utc::now())?;

        self.collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    StoreError::DuplicateSlug(slug_hint.unwrap_or_default())
                } else {
                    StoreError::from(e)
                }
            })
    }

    async fn delete(&self, id: &str) -> Result<Option<BlogDocument>, StoreError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        Ok(self
            .collection
            .find_one_and_delete(doc! { "_id": oid })
            .await?)
    }
}
