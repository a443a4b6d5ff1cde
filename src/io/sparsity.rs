//! Dense-vs-sparse encoding selection.

use crate::backend::HostArray;

/// Threshold on the zero fraction above which sparse encoding is chosen.
/// The boundary is exclusive: exactly this fraction stays dense.
pub const SPARSE_THRESHOLD: f64 = 0.40;

/// How a value array is represented in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Full nested array, NaNs preserved.
    Dense,
    /// Coordinate map of nonzero entries; zeros and NaNs are dropped.
    Sparse,
}

/// Chooses the encoding for an incremental value array.
///
/// Counts elements that are zero after treating NaN as zero, divides by
/// the total element count, and selects [`Encoding::Sparse`] when the
/// fraction strictly exceeds [`SPARSE_THRESHOLD`]. An empty array is
/// dense.
#[must_use]
pub fn choose_encoding(incremental: &HostArray) -> Encoding {
    if incremental.is_empty() {
        return Encoding::Dense;
    }
    let zeros = incremental
        .as_slice()
        .iter()
        .filter(|v| v.is_nan() || **v == 0.0)
        .count();
    if zeros as f64 / incremental.len() as f64 > SPARSE_THRESHOLD {
        Encoding::Sparse
    } else {
        Encoding::Dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(values: Vec<f64>) -> HostArray {
        let n = values.len();
        HostArray::from_vec([1, 1, 1, n], values).unwrap()
    }

    #[test]
    fn test_all_nonzero_is_dense() {
        let a = array(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(choose_encoding(&a), Encoding::Dense);
    }

    #[test]
    fn test_mostly_zero_is_sparse() {
        let a = array(vec![1.0, 0.0, 0.0, 0.0, 5.0]);
        assert_eq!(choose_encoding(&a), Encoding::Sparse);
    }

    #[test]
    fn test_nan_counts_as_zero() {
        let a = array(vec![1.0, f64::NAN, f64::NAN, f64::NAN, 5.0]);
        assert_eq!(choose_encoding(&a), Encoding::Sparse);
    }

    #[test]
    fn test_boundary_is_exclusive() {
        // 4 zeros of 10 is exactly 0.40: stays dense.
        let a = array(vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(choose_encoding(&a), Encoding::Dense);
        // 5 of 10 crosses it.
        let b = array(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(choose_encoding(&b), Encoding::Sparse);
    }

    #[test]
    fn test_empty_array_is_dense() {
        let a = HostArray::zeros([0, 1, 1, 1]);
        assert_eq!(choose_encoding(&a), Encoding::Dense);
    }
}
