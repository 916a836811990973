//! HTTP protocol layer module
//!
//! Response builders, cache validators and query parsing shared by the viewer
//! and manager listeners, decoupled from the component logic.

pub mod cache;
pub mod query;
pub mod response;

// Re-export commonly used types
pub use query::QueryParams;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_health_response, build_html_response, build_options_response, build_text_response,
    json_response,
};
