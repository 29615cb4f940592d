//! Remote media storage for uploaded images, thumbnails, and datasets.
//!
//! Handlers depend only on the [`MediaStore`] trait. Production uses
//! [`CloudinaryStore`]; tests use [`MemoryMediaStore`]. When no credentials
//! are configured the server runs with [`UnconfiguredMediaStore`], which
//! fails every call.

pub mod cloudinary;
pub mod memory;
pub mod store;

pub use cloudinary::{CloudinaryConfig, CloudinaryStore};
pub use memory::MemoryMediaStore;
pub use store::{MediaError, MediaKind, MediaStore, MediaUpload, StoredMedia, UnconfiguredMediaStore};
