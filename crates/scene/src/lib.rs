//! Transform Store: model, view and projection matrices for the maze scene.
//!
//! # Invariants
//! - Every mutator marks its matrix dirty.
//! - Reading a matrix for upload (`matrix()`, `combined()`) clears the flag
//!   exactly once; `updated()` and `peek*()` never do.
//! - Mutations compose as `new = mutation * old`.

pub mod dirty;
pub mod model;
pub mod projection;
pub mod store;
pub mod view;

pub use dirty::DirtyState;
pub use model::ModelTransform;
pub use projection::ProjectionTransform;
pub use store::TransformStore;
pub use view::ViewTransform;
