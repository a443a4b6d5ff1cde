//! Cadena: actuarial loss-development triangles with portable persistence.
//!
//! Cadena models the multi-dimensional "triangle" used in loss-development
//! analysis and gives it two persistence surfaces: a portable JSON
//! document with automatic sparse-vs-dense value encoding, and an opaque
//! binary snapshot for whole-object round trips. Estimator objects get a
//! parallel JSON contract for their parameter trees.
//!
//! # Quick Start
//!
//! ```
//! use cadena::prelude::*;
//! use chrono::NaiveDate;
//!
//! // A 3x3 cumulative paid triangle, origins 2018-2020.
//! let values = HostArray::from_vec(
//!     [1, 1, 3, 3],
//!     vec![10.0, 30.0, 50.0, 0.0, 15.0, 28.0, 0.0, 0.0, 12.0],
//! ).unwrap();
//! let tri = Triangle::new(
//!     DimVec::Str(vec!["total".to_string()]),
//!     DimVec::Str(vec!["paid".to_string()]),
//!     DimVec::Int(vec![2018, 2019, 2020]),
//!     DimVec::Int(vec![12, 24, 36]),
//!     values,
//!     NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
//! ).unwrap();
//!
//! let doc = tri.to_json().unwrap();
//! let back = Triangle::from_json(&doc).unwrap();
//! assert_eq!(back, tri);
//! ```
//!
//! # Modules
//!
//! - [`triangle`]: the `Triangle` entity, dimension vectors, grains
//! - [`backend`]: host/device value storage and materialization
//! - [`data`]: `Table` side data attached to triangles
//! - [`io`]: JSON documents, sparsity policy, binary snapshots
//! - [`traits`]: the `ParamEstimator` persistence contract
//! - [`error`]: error types and `Result` alias

pub mod backend;
pub mod data;
pub mod error;
pub mod io;
pub mod prelude;
pub mod traits;
pub mod triangle;
