pub mod cloudinary;
pub mod error;
pub mod traits;
pub mod url;
