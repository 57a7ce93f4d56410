//! Service layer for the panorama gallery.
//! - Upstream clients: identity provider keys, image host, identifier store.
//! - Gallery flows (admin upload, public listing) independent of the web framework.
//! - Clear error types and in-memory test doubles.

pub mod errors;
pub mod identity;
pub mod image_host;
pub mod post_registry;
pub mod gallery;
pub mod observability;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
