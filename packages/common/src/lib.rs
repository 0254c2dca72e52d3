pub mod media;

pub use media::cloudinary::CloudinaryStore;
pub use media::error::MediaError;
pub use media::traits::{BulkDeleteOutcome, DeleteOutcome, MediaStore, UploadedImage};
pub use media::url::extract_public_id;
