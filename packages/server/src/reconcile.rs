//! Image-asset reconciliation between blog records and the remote media
//! store.
//!
//! Create/update/delete each run an ordered sequence of fallible remote
//! steps with no rollback: a crash mid-sequence can leave orphaned remote
//! assets, never a half-written database record.

use common::{MediaError, MediaStore, extract_public_id};

use crate::entity::blog::ImageRef;
use crate::handlers::payload::ImageInput;

/// Resolve one banner/gallery input against the media store.
///
/// Three paths:
/// * an uploaded file is pushed through `upload_bytes`;
/// * an external URL is re-hosted via `upload_from_url`;
/// * a URL already on the media store's domain is kept as-is, with its
///   public id recovered from the URL and **no network call**.
pub async fn resolve_image(
    media: &dyn MediaStore,
    input: ImageInput,
) -> Result<ImageRef, MediaError> {
    match input {
        ImageInput::File(file) => {
            let uploaded = media
                .upload_bytes(file.bytes, &file.content_type, &file.filename)
                .await?;
            Ok(ImageRef::Hosted {
                public_id: uploaded.public_id,
                url: uploaded.url,
            })
        }
        ImageInput::Url(url) if media.owns_url(&url) => Ok(match extract_public_id(&url) {
            Some(public_id) => ImageRef::Hosted { public_id, url },
            None => ImageRef::RemoteUrlOnly(url),
        }),
        ImageInput::Url(url) => {
            let uploaded = media.upload_from_url(&url, None).await?;
            Ok(ImageRef::Hosted {
                public_id: uploaded.public_id,
                url: uploaded.url,
            })
        }
    }
}

/// Best-effort resolution of a gallery: failures are collected instead of
/// aborting, and the successful refs keep their input order.
pub async fn resolve_images(
    media: &dyn MediaStore,
    inputs: Vec<ImageInput>,
) -> (Vec<ImageRef>, Vec<String>) {
    let mut resolved = Vec::with_capacity(inputs.len());
    let mut failures = Vec::new();

    for input in inputs {
        match resolve_image(media, input).await {
            Ok(image) => resolved.push(image),
            Err(err) => failures.push(err.to_string()),
        }
    }

    (resolved, failures)
}

/// Every known public id referenced by a record's banner and gallery.
pub fn collect_public_ids(banner: &ImageRef, images: &[ImageRef]) -> Vec<String> {
    banner
        .public_id()
        .into_iter()
        .chain(images.iter().filter_map(ImageRef::public_id))
        .map(str::to_string)
        .collect()
}

/// Delete superseded remote assets before their replacements land.
///
/// Best-effort: a failure is logged and the caller proceeds; nothing here
/// gates the database write.
pub async fn delete_superseded(media: &dyn MediaStore, public_ids: Vec<String>) {
    if public_ids.is_empty() {
        return;
    }
    match media.delete_many(&public_ids).await {
        Ok(outcome) if outcome.partial => {
            tracing::warn!(?public_ids, "partial remote delete of superseded images");
        }
        Ok(_) => {}
        Err(err) => {
            tracing::warn!(?public_ids, error = %err, "failed to delete superseded images");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use common::{BulkDeleteOutcome, DeleteOutcome, UploadedImage};

    use super::*;
    use crate::handlers::payload::UploadFile;

    /// Records every adapter call; uploads fail when the filename or URL
    /// contains "fail".
    #[derive(Default)]
    struct RecordingMedia {
        uploads: Mutex<Vec<String>>,
        url_uploads: Mutex<Vec<String>>,
        bulk_deletes: Mutex<Vec<Vec<String>>>,
    }

    fn image(public_id: &str) -> UploadedImage {
        UploadedImage {
            public_id: public_id.to_string(),
            url: format!("https://res.cloudinary.com/demo/image/upload/{public_id}.jpg"),
            width: 1200,
            height: 800,
            format: "jpg".into(),
            bytes: 1024,
        }
    }

    #[async_trait]
    impl MediaStore for RecordingMedia {
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
            Ok(image(&format!("blog-images/{filename}")))
        }

        async fn upload_from_url(
            &self,
            url: &str,
            _public_id: Option<String>,
        ) -> Result<UploadedImage, MediaError> {
            self.url_uploads.lock().unwrap().push(url.to_string());
            Ok(image("blog-images/rehosted"))
        }

        async fn delete_one(&self, _public_id: &str) -> Result<DeleteOutcome, MediaError> {
            Ok(DeleteOutcome {
                success: true,
                result: "ok".into(),
            })
        }

        async fn delete_many(
            &self,
            public_ids: &[String],
        ) -> Result<BulkDeleteOutcome, MediaError> {
            self.bulk_deletes.lock().unwrap().push(public_ids.to_vec());
            Ok(BulkDeleteOutcome::default())
        }

        fn owns_url(&self, url: &str) -> bool {
            url.contains("res.cloudinary.com")
        }

        fn transform_url(&self, public_id: &str, _w: u32, _h: u32) -> String {
            format!("https://res.cloudinary.com/demo/{public_id}")
        }
    }

    fn file(name: &str) -> ImageInput {
        ImageInput::File(UploadFile {
            bytes: vec![0u8; 16],
            filename: name.to_string(),
            content_type: "image/png".into(),
        })
    }

    #[tokio::test]
    async fn file_inputs_are_uploaded() {
        let media = RecordingMedia::default();
        let resolved = resolve_image(&media, file("cat.png")).await.unwrap();

        assert_eq!(resolved.public_id(), Some("blog-images/cat.png"));
        assert_eq!(media.uploads.lock().unwrap().as_slice(), ["cat.png"]);
    }

    #[tokio::test]
    async fn owned_urls_skip_the_network() {
        let media = RecordingMedia::default();
        let url = "https://res.cloudinary.com/demo/image/upload/blog-images/blog_1_cat.webp";
        let resolved = resolve_image(&media, ImageInput::Url(url.into())).await.unwrap();

        assert_eq!(resolved.public_id(), Some("blog_1_cat"));
        assert_eq!(resolved.url(), url);
        assert!(media.uploads.lock().unwrap().is_empty());
        assert!(media.url_uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn owned_url_without_extension_stays_url_only() {
        let media = RecordingMedia::default();
        let url = "https://res.cloudinary.com/demo/image/upload/raw-asset";
        let resolved = resolve_image(&media, ImageInput::Url(url.into())).await.unwrap();
        assert_eq!(resolved, ImageRef::RemoteUrlOnly(url.into()));
    }

    #[tokio::test]
    async fn external_urls_are_rehosted() {
        let media = RecordingMedia::default();
        let resolved = resolve_image(
            &media,
            ImageInput::Url("https://images.example.com/pic.png".into()),
        )
        .await
        .unwrap();

        assert_eq!(resolved.public_id(), Some("blog-images/rehosted"));
        assert_eq!(
            media.url_uploads.lock().unwrap().as_slice(),
            ["https://images.example.com/pic.png"]
        );
    }

    #[tokio::test]
    async fn gallery_resolution_is_best_effort() {
        let media = RecordingMedia::default();
        let (resolved, failures) = resolve_images(
            &media,
            vec![file("a.png"), file("fail.png"), file("b.png")],
        )
        .await;

        assert_eq!(resolved.len(), 2);
        assert_eq!(failures.len(), 1);
        assert_eq!(media.uploads.lock().unwrap().as_slice(), ["a.png", "b.png"]);
    }

    #[test]
    fn collect_public_ids_skips_url_only_refs() {
        let banner = ImageRef::Hosted {
            public_id: "x".into(),
            url: "https://r/x.png".into(),
        };
        let images = vec![
            ImageRef::RemoteUrlOnly("https://elsewhere/a.png".into()),
            ImageRef::Hosted {
                public_id: "y".into(),
                url: "https://r/y.png".into(),
            },
        ];
        assert_eq!(collect_public_ids(&banner, &images), vec!["x", "y"]);
    }

    #[tokio::test]
    async fn delete_superseded_skips_empty_sets() {
        let media = RecordingMedia::default();
        delete_superseded(&media, vec![]).await;
        assert!(media.bulk_deletes.lock().unwrap().is_empty());

        delete_superseded(&media, vec!["x".into(), "y".into()]).await;
        assert_eq!(
            media.bulk_deletes.lock().unwrap().as_slice(),
            [vec!["x".to_string(), "y".to_string()]]
        );
    }
}
