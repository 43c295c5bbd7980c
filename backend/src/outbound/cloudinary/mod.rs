//! Cloudinary outbound adapter.
//!
//! This module provides a thin HTTP implementation of the `MediaUploader`
//! port using unsigned uploads.

mod dto;
mod http_uploader;

pub use http_uploader::{CloudinaryConfig, CloudinaryUploader, DEFAULT_CLOUDINARY_API};
