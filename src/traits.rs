//! Core traits for serializable estimators.
//!
//! These traits define the persistence contract estimators opt into.

use std::path::Path;

use crate::error::Result;
use crate::io::estimator::{ParamSet, ParamValue};

/// An estimator whose behavior-defining state is a named parameter set.
///
/// Implementors expose their shallow constructor parameters through
/// [`ParamEstimator::params`] in a fixed order; the provided methods give
/// JSON and binary persistence on top.
///
/// # Examples
///
/// ```
/// use cadena::io::estimator::ParamSet;
/// use cadena::traits::ParamEstimator;
///
/// struct Development { window: i64 }
///
/// impl ParamEstimator for Development {
///     fn class_name(&self) -> &str { "Development" }
///     fn params(&self) -> ParamSet {
///         ParamSet::new().with("window", self.window)
///     }
/// }
///
/// let est = Development { window: 5 };
/// let doc = est.to_json().unwrap();
/// assert!(doc.contains(r#""__class__":"Development""#));
/// assert!(est.contains("window"));
/// ```
pub trait ParamEstimator {
    /// Class identifier used for reconstruction dispatch.
    fn class_name(&self) -> &str;

    /// The shallow parameter set, in declaration order.
    fn params(&self) -> ParamSet;

    /// Encodes the parameter tree as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding fails.
    fn to_json(&self) -> Result<String>
    where
        Self: Sized,
    {
        crate::io::estimator::to_json(self)
    }

    /// Reports whether the named parameter carries a value.
    ///
    /// Returns false both when the parameter is absent and when it holds
    /// the empty sentinel ([`ParamValue::Null`]); the two are
    /// intentionally indistinguishable. `0` and `""` report true.
    fn contains(&self, name: &str) -> bool {
        !matches!(self.params().get(name), None | Some(ParamValue::Null))
    }

    /// Persists the whole estimator as a binary snapshot.
    ///
    /// # Errors
    ///
    /// Passes through I/O and codec failures from the snapshot writer.
    fn to_snapshot(&self, path: &Path, protocol: Option<u32>) -> Result<()>
    where
        Self: serde::Serialize + Sized,
    {
        crate::io::snapshot::save_snapshot(self, path, protocol)
    }
}
