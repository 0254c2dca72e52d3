use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::error::MediaError;
use super::traits::{BulkDeleteOutcome, DeleteOutcome, MediaStore, UploadedImage};
use super::url::filename_stem;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const DELIVERY_DOMAIN: &str = "res.cloudinary.com";

/// Folder all blog assets are stored under.
pub const UPLOAD_FOLDER: &str = "blog-images";

/// Fixed incoming transformation: bounded to 1200x800, quality and delivery
/// format left to the store.
pub const UPLOAD_TRANSFORMATION: &str = "w_1200,h_800,c_limit,q_auto:good,f_auto";

/// Cloudinary-backed [`MediaStore`].
pub struct CloudinaryStore {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base: String,
}

#[derive(Deserialize)]
struct UploadApiResponse {
    public_id: String,
    secure_url: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    format: String,
    #[serde(default)]
    bytes: u64,
}

#[derive(Deserialize)]
struct DestroyApiResponse {
    result: String,
}

#[derive(Deserialize)]
struct BulkDeleteApiResponse {
    #[serde(default)]
    deleted: HashMap<String, String>,
    #[serde(default)]
    partial: bool,
}

impl CloudinaryStore {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name,
            api_key,
            api_secret,
            api_base: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{action}", self.api_base, self.cloud_name)
    }

    fn resources_endpoint(&self) -> String {
        format!("{}/{}/resources/image/upload", self.api_base, self.cloud_name)
    }

    /// Request signature: sorted `key=value` pairs joined with `&`, with the
    /// API secret appended, hashed with SHA-256.
    fn sign(&self, params: &BTreeMap<&'static str, String>) -> String {
        let joined = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        hex::encode(Sha256::digest(format!("{joined}{}", self.api_secret)))
    }

    /// Stamp, sign and flatten params into a multipart form, adding the
    /// non-signed auth fields.
    fn signed_form(&self, mut params: BTreeMap<&'static str, String>) -> Form {
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = self.sign(&params);

        let mut form = Form::new();
        for (key, value) in params {
            form = form.text(key, value);
        }
        form.text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
    }

    fn upload_params(&self, public_id: String) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("folder", UPLOAD_FOLDER.to_string()),
            ("public_id", public_id),
            ("transformation", UPLOAD_TRANSFORMATION.to_string()),
        ])
    }

    async fn send_upload(&self, form: Form) -> Result<UploadedImage, MediaError> {
        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(MediaError::UploadFailed(format!("status {status}: {detail}")));
        }

        let raw: UploadApiResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        Ok(UploadedImage {
            public_id: raw.public_id,
            url: raw.secure_url,
            width: raw.width,
            height: raw.height,
            format: raw.format,
            bytes: raw.bytes,
        })
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> Result<UploadedImage, MediaError> {
        let public_id = format!(
            "blog_{}_{}",
            Utc::now().timestamp_millis(),
            filename_stem(filename)
        );

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| MediaError::UploadFailed(format!("invalid content type: {e}")))?;

        let form = self.signed_form(self.upload_params(public_id)).part("file", part);
        self.send_upload(form).await
    }

    async fn upload_from_url(
        &self,
        url: &str,
        public_id: Option<String>,
    ) -> Result<UploadedImage, MediaError> {
        let public_id = public_id
            .unwrap_or_else(|| format!("blog_{}_url_upload", Utc::now().timestamp_millis()));

        let form = self
            .signed_form(self.upload_params(public_id))
            .text("file", url.to_string());
        self.send_upload(form).await
    }

    async fn delete_one(&self, public_id: &str) -> Result<DeleteOutcome, MediaError> {
        let params = BTreeMap::from([("public_id", public_id.to_string())]);
        let response = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(self.signed_form(params))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(MediaError::DeleteFailed(format!("status {status}: {detail}")));
        }

        let raw: DestroyApiResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        // "not found" counts as success per the store's own semantics.
        let success = raw.result == "ok" || raw.result == "not found";
        Ok(DeleteOutcome {
            success,
            result: raw.result,
        })
    }

    async fn delete_many(&self, public_ids: &[String]) -> Result<BulkDeleteOutcome, MediaError> {
        let query: Vec<(&str, &str)> = public_ids
            .iter()
            .map(|id| ("public_ids[]", id.as_str()))
            .collect();

        let response = self
            .client
            .delete(self.resources_endpoint())
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(MediaError::DeleteFailed(format!("status {status}: {detail}")));
        }

        let raw: BulkDeleteApiResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        Ok(BulkDeleteOutcome {
            deleted: raw.deleted,
            partial: raw.partial,
        })
    }

    fn owns_url(&self, url: &str) -> bool {
        url.contains(DELIVERY_DOMAIN)
    }

    fn transform_url(&self, public_id: &str, width: u32, height: u32) -> String {
        format!(
            "https://{DELIVERY_DOMAIN}/{}/image/upload/w_{width},h_{height},c_limit,q_auto:good/{public_id}",
            self.cloud_name
        )
    }
}
