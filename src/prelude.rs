//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use cadena::prelude::*;
//! ```

pub use crate::backend::{ArrayStorage, DeviceArray, HostArray, Materialize};
pub use crate::data::Table;
pub use crate::error::{CadenaError, Result};
pub use crate::io::{load_snapshot, save_snapshot, ParamSet, ParamValue};
pub use crate::traits::ParamEstimator;
pub use crate::triangle::{DimVec, Grain, Triangle};
