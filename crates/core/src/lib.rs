//! Angular/RxJS TypeScript client generator for OpenAPI documents.
//!
//! The pipeline is `parse_document` (or [`Document::builder`]) → [`emit`]:
//!
//! ```no_run
//! use ngapi_core::{GenerationPolicy, generate};
//!
//! let text = std::fs::read_to_string("openapi.json")?;
//! let generated = generate(&text, &GenerationPolicy::default())?;
//! for warning in &generated.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! print!("{}", generated.source);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

pub mod document;
pub mod emitter;
pub mod error;
pub mod openapi;
pub mod policy;
pub mod resolve;
pub mod ts;
mod utils;

pub use document::Document;
pub use emitter::{Generated, emit};
pub use error::{Error, Result, Warning};
pub use openapi::parse_document;
pub use policy::{ClientGrouping, GenerationPolicy, Template};

/// Parse an API description and generate the client module in one step.
pub fn generate(text: &str, policy: &GenerationPolicy) -> Result<Generated> {
    let document = parse_document(text)?;
    emit(&document, policy)
}
