//! Serialization core: JSON documents and binary snapshots.
//!
//! - [`sparsity`]: dense-vs-sparse encoding selection.
//! - [`triangle_json`]: triangle documents (`Triangle::to_json` /
//!   `Triangle::from_json`).
//! - [`estimator`]: estimator parameter-tree documents.
//! - [`snapshot`]: whole-object binary persistence facade.

pub mod estimator;
pub mod snapshot;
pub mod sparsity;
pub mod triangle_json;

pub use estimator::{ParamSet, ParamValue};
pub use snapshot::{load_snapshot, save_snapshot};
pub use sparsity::{choose_encoding, Encoding, SPARSE_THRESHOLD};
