//! Job Specification Compiler
//!
//! Renders trees of typed stanzas into Nomad job files.
//!
//! # Guarantees
//! 1. Stanzas only render inside their allowed parents
//! 2. Output is byte-deterministic for a given tree
//! 3. Blocks are balanced and indented two spaces per level
//! 4. A failed render produces no text at all
//!
//! ```ignore
//! use jobspec_core::{render, GroupOptions, TaskOptions};
//!
//! let job = render("web", |b| {
//!     b.datacenters(&["dc1"])?;
//!     b.group("api", &GroupOptions { count: Some(2) }, |b| {
//!         b.task("server", &TaskOptions::default(), |_| Ok(()))
//!     })
//! })?;
//! ```

pub mod artifacts;
pub mod context;
pub mod description;
pub mod emitter;
pub mod error;
pub mod hashing;
pub mod render;
pub mod secrets;
pub mod stanzas;
pub mod value;

pub use artifacts::{ArtifactDefinition, ArtifactRegistry, RegistryError};
pub use context::ContextStack;
pub use description::{JobDescription, StanzaNode};
pub use emitter::Emitter;
pub use error::{RenderError, RenderResult};
pub use hashing::document_hash;
pub use render::{render, Builder, RenderOptions, Renderer};
pub use stanzas::*;
pub use value::Value;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
