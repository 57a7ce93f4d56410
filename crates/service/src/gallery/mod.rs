//! Gallery business logic: the admin upload flow and the public listing.

pub mod domain;
pub mod service;

pub use domain::{GallerySlide, UploadRequest};
pub use service::{GalleryService, GallerySettings};
