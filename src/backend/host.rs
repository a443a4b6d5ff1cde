//! Host-resident dense array with the cumulative/incremental transforms.

use crate::error::{CadenaError, Result};
use serde::{Deserialize, Serialize};

use super::Materialize;

/// A dense, row-major `f64` array of shape `(k, v, o, d)`.
///
/// The development axis is the innermost (fastest-varying) axis. Missing
/// observations are encoded as NaN.
///
/// # Examples
///
/// ```
/// use cadena::backend::HostArray;
///
/// let a = HostArray::from_vec([1, 1, 2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// assert_eq!(a.get(0, 0, 1, 2), 6.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostArray {
    shape: [usize; 4],
    data: Vec<f64>,
}

impl HostArray {
    /// Creates an array from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CadenaError::ShapeMismatch`] if `data.len()` does not
    /// equal `k * v * o * d`.
    pub fn from_vec(shape: [usize; 4], data: Vec<f64>) -> Result<Self> {
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(CadenaError::ShapeMismatch {
                expected: format!(
                    "{}x{}x{}x{} = {} values",
                    shape[0], shape[1], shape[2], shape[3], expected
                ),
                actual: format!("{} values", data.len()),
            });
        }
        Ok(Self { shape, data })
    }

    /// Creates a zero-filled array of the given shape.
    #[must_use]
    pub fn zeros(shape: [usize; 4]) -> Self {
        Self {
            shape,
            data: vec![0.0; shape.iter().product()],
        }
    }

    /// Returns the shape as `[k, v, o, d]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    /// Returns the total element count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the flat row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn offset(&self, k: usize, v: usize, o: usize, d: usize) -> usize {
        let [_, nv, no, nd] = self.shape;
        ((k * nv + v) * no + o) * nd + d
    }

    /// Returns the element at `(k, v, o, d)`.
    #[must_use]
    pub fn get(&self, k: usize, v: usize, o: usize, d: usize) -> f64 {
        self.data[self.offset(k, v, o, d)]
    }

    /// Sets the element at `(k, v, o, d)`.
    pub fn set(&mut self, k: usize, v: usize, o: usize, d: usize, value: f64) {
        let idx = self.offset(k, v, o, d);
        self.data[idx] = value;
    }

    /// First differences along the development axis.
    ///
    /// The first development column is unchanged; column `j` becomes
    /// `v[j] - v[j-1]`. Inverse of [`HostArray::incr_to_cum`].
    #[must_use]
    pub fn cum_to_incr(&self) -> Self {
        let [nk, nv, no, nd] = self.shape;
        let mut out = self.clone();
        for k in 0..nk {
            for v in 0..nv {
                for o in 0..no {
                    for d in (1..nd).rev() {
                        let diff = self.get(k, v, o, d) - self.get(k, v, o, d - 1);
                        out.set(k, v, o, d, diff);
                    }
                }
            }
        }
        out
    }

    /// Running sum along the development axis.
    ///
    /// Inverse of [`HostArray::cum_to_incr`].
    #[must_use]
    pub fn incr_to_cum(&self) -> Self {
        let [nk, nv, no, nd] = self.shape;
        let mut out = self.clone();
        for k in 0..nk {
            for v in 0..nv {
                for o in 0..no {
                    let mut acc = self.get(k, v, o, 0);
                    for d in 1..nd {
                        acc += self.get(k, v, o, d);
                        out.set(k, v, o, d, acc);
                    }
                }
            }
        }
        out
    }
}

impl Materialize for HostArray {
    fn materialize(&self) -> Result<HostArray> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let err = HostArray::from_vec([1, 1, 2, 3], vec![0.0; 5]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("6 values"));
        assert!(msg.contains("5 values"));
    }

    #[test]
    fn test_row_major_indexing() {
        let a = HostArray::from_vec(
            [2, 1, 2, 2],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
        )
        .unwrap();
        assert_eq!(a.get(0, 0, 0, 0), 1.0);
        assert_eq!(a.get(0, 0, 1, 1), 4.0);
        assert_eq!(a.get(1, 0, 0, 1), 6.0);
        assert_eq!(a.get(1, 0, 1, 1), 8.0);
    }

    #[test]
    fn test_cum_to_incr_first_column_unchanged() {
        // Cumulative [10, 30, 50] -> incremental [10, 20, 20]
        let a = HostArray::from_vec([1, 1, 1, 3], vec![10.0, 30.0, 50.0]).unwrap();
        let inc = a.cum_to_incr();
        assert_eq!(inc.as_slice(), &[10.0, 20.0, 20.0]);
    }

    #[test]
    fn test_incr_to_cum_inverts_cum_to_incr() {
        let a = HostArray::from_vec(
            [1, 1, 3, 3],
            vec![10.0, 30.0, 50.0, 0.0, 15.0, 28.0, 0.0, 0.0, 12.0],
        )
        .unwrap();
        let round = a.cum_to_incr().incr_to_cum();
        assert_eq!(round, a);
    }

    #[test]
    fn test_cum_to_incr_propagates_nan() {
        // A NaN observation keeps the difference NaN on both sides of it.
        let a = HostArray::from_vec([1, 1, 1, 3], vec![10.0, f64::NAN, 50.0]).unwrap();
        let inc = a.cum_to_incr();
        assert_eq!(inc.as_slice()[0], 10.0);
        assert!(inc.as_slice()[1].is_nan());
        assert!(inc.as_slice()[2].is_nan());
    }

    #[test]
    fn test_zeros_and_empty() {
        let z = HostArray::zeros([1, 1, 2, 2]);
        assert_eq!(z.as_slice(), &[0.0; 4]);
        let e = HostArray::zeros([0, 1, 1, 1]);
        assert!(e.is_empty());
    }
}
