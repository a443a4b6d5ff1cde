//! Compute backends for triangle value arrays.
//!
//! Triangle values may live on the host or on a device-resident buffer.
//! Serialization only ever sees host data: every backend exposes
//! [`Materialize`], which produces a backend-independent [`HostArray`]
//! copy with identical shape and element values (NaNs preserved).

mod device;
mod host;

pub use device::DeviceArray;
pub use host::HostArray;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Capability to produce a host-resident copy of an array.
///
/// Implemented once per backend and selected at the call site. The copy
/// must have identical shape and element values, and the source must not
/// be mutated. Device backends may block on a device-to-host transfer.
pub trait Materialize {
    /// Returns a host-resident copy of the array.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CadenaError::BackendTransfer`] if the
    /// device-to-host transfer fails.
    fn materialize(&self) -> Result<HostArray>;
}

/// Value storage for a triangle, tagged by backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrayStorage {
    /// Host-resident dense array.
    Host(HostArray),
    /// Device-resident buffer, materialized on demand.
    Device(DeviceArray),
}

impl ArrayStorage {
    /// Returns the array shape as `[k, v, o, d]` without materializing.
    #[must_use]
    pub fn shape(&self) -> [usize; 4] {
        match self {
            ArrayStorage::Host(a) => a.shape(),
            ArrayStorage::Device(a) => a.shape(),
        }
    }
}

impl Materialize for ArrayStorage {
    fn materialize(&self) -> Result<HostArray> {
        match self {
            ArrayStorage::Host(a) => a.materialize(),
            ArrayStorage::Device(a) => a.materialize(),
        }
    }
}

impl From<HostArray> for ArrayStorage {
    fn from(array: HostArray) -> Self {
        ArrayStorage::Host(array)
    }
}

impl From<DeviceArray> for ArrayStorage {
    fn from(array: DeviceArray) -> Self {
        ArrayStorage::Device(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_shape_matches_both_backends() {
        let host = HostArray::from_vec([1, 1, 2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let device = DeviceArray::from_host(&host);

        let a = ArrayStorage::from(host);
        let b = ArrayStorage::from(device);
        assert_eq!(a.shape(), [1, 1, 2, 2]);
        assert_eq!(a.shape(), b.shape());
    }

    #[test]
    fn test_materialize_is_backend_transparent() {
        let host = HostArray::from_vec([1, 1, 2, 2], vec![1.5, 0.0, -3.0, 42.0]).unwrap();
        let device = DeviceArray::from_host(&host);

        let from_host = ArrayStorage::Host(host.clone()).materialize().unwrap();
        let from_device = ArrayStorage::Device(device).materialize().unwrap();
        assert_eq!(from_host, host);
        assert_eq!(from_host, from_device);
    }

    #[test]
    fn test_materialize_preserves_nan() {
        let host = HostArray::from_vec([1, 1, 1, 3], vec![1.0, f64::NAN, 3.0]).unwrap();
        let device = DeviceArray::from_host(&host);
        let out = device.materialize().unwrap();
        assert!(out.as_slice()[1].is_nan());
        assert_eq!(out.as_slice()[0], 1.0);
        assert_eq!(out.as_slice()[2], 3.0);
    }
}
