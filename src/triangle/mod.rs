//! The loss-development triangle entity.
//!
//! A [`Triangle`] is a 4-dimensional array indexed by
//! `(key, value, origin, development)`, evaluated as of a single valuation
//! date, optionally owning named sub-triangles and attached side tables.
//! Children live in explicit registries (`BTreeMap`s keyed by attribute
//! name), so traversal order is always lexicographic.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backend::ArrayStorage;
use crate::data::Table;
use crate::error::{CadenaError, Result};

/// Time granularity of an origin or development dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grain {
    /// Annual periods.
    Annual,
    /// Quarterly periods.
    Quarterly,
    /// Monthly periods.
    Monthly,
}

impl Grain {
    /// The single-letter grain code used in documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Grain::Annual => "Y",
            Grain::Quarterly => "Q",
            Grain::Monthly => "M",
        }
    }

    /// Parses a grain code.
    ///
    /// # Errors
    ///
    /// Returns a schema error for anything other than `Y`, `Q`, or `M`.
    pub fn parse(code: &str) -> Result<Self> {
        match code {
            "Y" => Ok(Grain::Annual),
            "Q" => Ok(Grain::Quarterly),
            "M" => Ok(Grain::Monthly),
            other => Err(CadenaError::schema(
                "grain",
                format!("expected Y, Q, or M, got '{other}'"),
            )),
        }
    }
}

/// A typed dimension label vector.
///
/// Carries enough type information (`dtype`) for a decoded document to
/// reconstruct the exact element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DimVec {
    /// Integer labels (e.g., accident years).
    Int(Vec<i64>),
    /// Floating-point labels (e.g., development lags in fractional months).
    Float(Vec<f64>),
    /// String labels (e.g., line-of-business codes).
    Str(Vec<String>),
    /// Calendar-date labels (e.g., valuation dates).
    Date(Vec<NaiveDate>),
}

impl DimVec {
    /// The dtype string recorded in documents.
    #[must_use]
    pub fn dtype(&self) -> &'static str {
        match self {
            DimVec::Int(_) => "int64",
            DimVec::Float(_) => "float64",
            DimVec::Str(_) => "object",
            DimVec::Date(_) => "datetime64[ns]",
        }
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            DimVec::Int(v) => v.len(),
            DimVec::Float(v) => v.len(),
            DimVec::Str(v) => v.len(),
            DimVec::Date(v) => v.len(),
        }
    }

    /// Returns true if the dimension has no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A loss-development triangle.
///
/// # Examples
///
/// ```
/// use cadena::backend::HostArray;
/// use cadena::triangle::{DimVec, Triangle};
/// use chrono::NaiveDate;
///
/// let values = HostArray::from_vec(
///     [1, 1, 3, 3],
///     vec![10.0, 30.0, 50.0, 0.0, 15.0, 28.0, 0.0, 0.0, 12.0],
/// ).unwrap();
/// let tri = Triangle::new(
///     DimVec::Str(vec!["total".to_string()]),
///     DimVec::Str(vec!["paid".to_string()]),
///     DimVec::Int(vec![2018, 2019, 2020]),
///     DimVec::Int(vec![12, 24, 36]),
///     values,
///     NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
/// ).unwrap();
/// assert_eq!(tri.shape(), [1, 1, 3, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    kdims: DimVec,
    vdims: DimVec,
    odims: DimVec,
    ddims: DimVec,
    values: ArrayStorage,
    is_cumulative: bool,
    is_val_tri: bool,
    origin_grain: Grain,
    development_grain: Grain,
    valuation_date: NaiveDate,
    key_labels: Vec<String>,
    sub_tris: BTreeMap<String, Triangle>,
    dfs: BTreeMap<String, Table>,
}

impl Triangle {
    /// Creates a triangle, validating the shape invariant
    /// `values.len() == k * v * o * d`.
    ///
    /// Defaults: cumulative, development-lag indexed, annual grains, no
    /// key labels, no children.
    ///
    /// # Errors
    ///
    /// Returns [`CadenaError::ShapeMismatch`] if the value array's shape
    /// does not match the dimension lengths.
    pub fn new(
        kdims: DimVec,
        vdims: DimVec,
        odims: DimVec,
        ddims: DimVec,
        values: impl Into<ArrayStorage>,
        valuation_date: NaiveDate,
    ) -> Result<Self> {
        let values = values.into();
        let expected = [kdims.len(), vdims.len(), odims.len(), ddims.len()];
        if values.shape() != expected {
            return Err(CadenaError::ShapeMismatch {
                expected: format!(
                    "{}x{}x{}x{} from dimension labels",
                    expected[0], expected[1], expected[2], expected[3]
                ),
                actual: format!(
                    "{}x{}x{}x{} value array",
                    values.shape()[0],
                    values.shape()[1],
                    values.shape()[2],
                    values.shape()[3]
                ),
            });
        }
        Ok(Self {
            kdims,
            vdims,
            odims,
            ddims,
            values,
            is_cumulative: true,
            is_val_tri: false,
            origin_grain: Grain::Annual,
            development_grain: Grain::Annual,
            valuation_date,
            key_labels: Vec::new(),
            sub_tris: BTreeMap::new(),
            dfs: BTreeMap::new(),
        })
    }

    /// Sets whether values accumulate over development.
    #[must_use]
    pub fn with_cumulative(mut self, is_cumulative: bool) -> Self {
        self.is_cumulative = is_cumulative;
        self
    }

    /// Marks the development axis as holding calendar valuation dates.
    #[must_use]
    pub fn with_val_tri(mut self, is_val_tri: bool) -> Self {
        self.is_val_tri = is_val_tri;
        self
    }

    /// Sets the origin and development grains.
    #[must_use]
    pub fn with_grains(mut self, origin: Grain, development: Grain) -> Self {
        self.origin_grain = origin;
        self.development_grain = development;
        self
    }

    /// Names the semantic fields of the key dimension.
    #[must_use]
    pub fn with_key_labels(mut self, key_labels: Vec<String>) -> Self {
        self.key_labels = key_labels;
        self
    }

    /// Attaches an owned sub-triangle under the given attribute name.
    #[must_use]
    pub fn with_sub_tri(mut self, name: &str, triangle: Triangle) -> Self {
        self.sub_tris.insert(name.to_string(), triangle);
        self
    }

    /// Attaches an owned side table under the given attribute name.
    #[must_use]
    pub fn with_table(mut self, name: &str, table: Table) -> Self {
        self.dfs.insert(name.to_string(), table);
        self
    }

    /// Returns the shape as `[k, v, o, d]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 4] {
        self.values.shape()
    }

    /// Key dimension labels.
    #[must_use]
    pub fn kdims(&self) -> &DimVec {
        &self.kdims
    }

    /// Value dimension labels.
    #[must_use]
    pub fn vdims(&self) -> &DimVec {
        &self.vdims
    }

    /// Origin period labels.
    #[must_use]
    pub fn odims(&self) -> &DimVec {
        &self.odims
    }

    /// Development labels (or valuation dates when `is_val_tri`).
    #[must_use]
    pub fn ddims(&self) -> &DimVec {
        &self.ddims
    }

    /// The value array, host- or device-resident.
    #[must_use]
    pub fn values(&self) -> &ArrayStorage {
        &self.values
    }

    /// Whether values accumulate over development.
    #[must_use]
    pub fn is_cumulative(&self) -> bool {
        self.is_cumulative
    }

    /// Whether the development axis holds calendar valuation dates.
    #[must_use]
    pub fn is_val_tri(&self) -> bool {
        self.is_val_tri
    }

    /// Origin period grain.
    #[must_use]
    pub fn origin_grain(&self) -> Grain {
        self.origin_grain
    }

    /// Development period grain.
    #[must_use]
    pub fn development_grain(&self) -> Grain {
        self.development_grain
    }

    /// The evaluation cutoff date.
    #[must_use]
    pub fn valuation_date(&self) -> NaiveDate {
        self.valuation_date
    }

    /// Names of the key dimension's semantic fields.
    #[must_use]
    pub fn key_labels(&self) -> &[String] {
        &self.key_labels
    }

    /// Owned sub-triangles, keyed by attribute name.
    #[must_use]
    pub fn sub_tris(&self) -> &BTreeMap<String, Triangle> {
        &self.sub_tris
    }

    /// Owned side tables, keyed by attribute name.
    #[must_use]
    pub fn dfs(&self) -> &BTreeMap<String, Table> {
        &self.dfs
    }
}
