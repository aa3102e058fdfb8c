//! Stackform composition core
//!
//! Building blocks for one-shot declarative infrastructure composition:
//! resource descriptors, deferred attribute references, the stack that
//! collects them, and the manifest handed to the reconciliation engine.
//!
//! This crate never talks to a provider. A program builds descriptors
//! bottom-up, threads deferred values between them, validates the graph,
//! and renders it once; everything after that (diffing, ordering, provider
//! calls) happens in the external engine.

pub mod error;
pub mod manifest;
pub mod resource;
pub mod stack;
pub mod value;

// Re-exports
pub use error::{CoreError, Result};
pub use manifest::{MANIFEST_VERSION, Manifest, ManifestSummary, ResourceManifest};
pub use resource::{Resource, ResourceIdentity, ResourceRef};
pub use stack::Stack;
pub use value::{AttributeSource, ResourceId, Value};
