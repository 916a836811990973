//! Viewer request handler module
//!
//! Serves the patched interactive BOM and resolves clicked components to
//! storage locations.

pub mod lightup;
pub mod router;

// Re-export main entry point
pub use router::{check_body_size, handle_request};
