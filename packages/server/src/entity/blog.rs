use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default author stamped on every post.
pub const DEFAULT_AUTHOR: &str = "Muheet Bharti";

/// Average reading speed used for the derived read time.
const WORDS_PER_MINUTE: usize = 200;

/// Reference to an image attached to a post.
///
/// Legacy records store a bare URL string; records that went through the
/// media store carry the `{publicId, url}` pair. Serialized untagged so both
/// shapes round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ImageRef {
    Hosted {
        #[serde(rename = "publicId")]
        public_id: String,
        url: String,
    },
    RemoteUrlOnly(String),
}

impl ImageRef {
    /// The stable media store id, when known.
    pub fn public_id(&self) -> Option<&str> {
        match self {
            ImageRef::Hosted { public_id, .. } => Some(public_id),
            ImageRef::RemoteUrlOnly(_) => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ImageRef::Hosted { url, .. } => url,
            ImageRef::RemoteUrlOnly(url) => url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    #[default]
    Draft,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Draft => "draft",
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "draft" => Ok(Visibility::Draft),
            other => Err(format!(
                "visibility must be one of public, private, draft (got '{other}')"
            )),
        }
    }
}

/// A blog post as persisted in the `blogs` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub body: String,
    pub banner: ImageRef,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    /// Derived from `title`; unique across the collection.
    pub slug: String,
    pub author: String,
    /// Derived from `body`: `ceil(words / 200)` minutes.
    pub read_time: i32,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Lowercase-hyphenated slug: strip everything but ASCII alphanumerics and
/// spaces, then collapse whitespace runs into single hyphens.
pub fn slugify(title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Estimated minutes to read `body`, rounded up.
pub fn read_time_minutes(body: &str) -> i32 {
    let words = body.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE) as i32
}

/// Tags are stored trimmed and lowercase, with duplicates and empties dropped.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_strips_and_hyphenates() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust   &  Mongo 101 "), "rust-mongo-101");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn read_time_rounds_up() {
        let body = vec!["word"; 450].join(" ");
        assert_eq!(read_time_minutes(&body), 3);
        assert_eq!(read_time_minutes("one two three"), 1);
        assert_eq!(read_time_minutes(""), 0);
        assert_eq!(read_time_minutes(&vec!["w"; 200].join(" ")), 1);
        assert_eq!(read_time_minutes(&vec!["w"; 201].join(" ")), 2);
    }

    #[test]
    fn tags_are_lowercased_trimmed_and_deduplicated() {
        let tags = vec![
            " Rust ".to_string(),
            "rust".to_string(),
            "WEB".to_string(),
            "  ".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["rust", "web"]);
    }

    #[test]
    fn image_ref_roundtrips_both_shapes() {
        let plain: ImageRef = serde_json::from_str("\"https://x/y.png\"").unwrap();
        assert_eq!(plain, ImageRef::RemoteUrlOnly("https://x/y.png".into()));

        let hosted: ImageRef =
            serde_json::from_str(r#"{"publicId":"blog-images/a","url":"https://x/a.png"}"#)
                .unwrap();
        assert_eq!(hosted.public_id(), Some("blog-images/a"));

        let json = serde_json::to_string(&hosted).unwrap();
        assert!(json.contains("\"publicId\""));
        assert_eq!(serde_json::to_string(&plain).unwrap(), "\"https://x/y.png\"");
    }

    #[test]
    fn visibility_defaults_to_draft() {
        assert_eq!(Visibility::default(), Visibility::Draft);
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
        assert!("hidden".parse::<Visibility>().is_err());
    }
}
