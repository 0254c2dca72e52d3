/// Recover the stable public id from a media store delivery URL.
///
/// The store's URL convention puts the public id in the last path segment,
/// before the format extension:
/// `https://res.cloudinary.com/<cloud>/image/upload/v1/blog-images/blog_17_cat.webp`
/// yields `blog_17_cat`. Returns `None` when the URL does not follow that
/// shape.
pub fn extract_public_id(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    if !path.contains('/') {
        return None;
    }
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(stem.to_string())
}

/// First dot-separated component of an uploaded filename, used when deriving
/// public ids for fresh uploads.
pub fn filename_stem(filename: &str) -> &str {
    let stem = filename.split('.').next().unwrap_or_default();
    if stem.is_empty() { "image" } else { stem }
}
