//! Shared vocabulary for the bundlecheck harness.
//!
//! The bundler under test is an opaque capability. This crate defines the
//! narrow boundary the harness drives it through:
//!
//! ```text
//! BuildRequest ──► Bundler::build() ──► Bundle
//!                                         │
//!                     ┌───────────────────┴──────────────┐
//!                     ▼                                  ▼
//!             Bundle::generate(options)          Bundle::write(options)
//!                     │                                  │
//!                     ▼                                  ▼
//!              Output { code, map }        <dest> (+ <dest>.map on disk)
//! ```
//!
//! Everything else (module resolution, code generation, source-map
//! computation) happens on the other side of these traits.

mod bundle;
mod format;
mod options;

pub use bundle::{map_path_for, Bundle, BundleError, Bundler, Output};
pub use format::{OutputFormat, UnknownFormat};
pub use options::{keys, BuildRequest, Options};
