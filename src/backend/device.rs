//! Device-resident array backend.
//!
//! Models an array held in an opaque device buffer (little-endian `f64`
//! bytes). Materialization performs the device-to-host transfer; it is the
//! only potentially blocking operation in the crate.

use crate::error::{CadenaError, Result};
use serde::{Deserialize, Serialize};

use super::{HostArray, Materialize};

/// An array resident in a device buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceArray {
    shape: [usize; 4],
    buffer: Vec<u8>,
}

impl DeviceArray {
    /// Uploads a host array to the device.
    #[must_use]
    pub fn from_host(host: &HostArray) -> Self {
        let mut buffer = Vec::with_capacity(host.len() * 8);
        for value in host.as_slice() {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
        Self {
            shape: host.shape(),
            buffer,
        }
    }

    /// Returns the shape as `[k, v, o, d]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }
}

impl Materialize for DeviceArray {
    fn materialize(&self) -> Result<HostArray> {
        let expected = self.shape.iter().product::<usize>() * 8;
        if self.buffer.len() != expected {
            return Err(CadenaError::BackendTransfer {
                backend: "device".to_string(),
                detail: format!(
                    "buffer holds {} bytes, shape requires {expected}",
                    self.buffer.len()
                ),
            });
        }
        let data = self
            .buffer
            .chunks_exact(8)
            .map(|chunk| {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(chunk);
                f64::from_le_bytes(bytes)
            })
            .collect();
        HostArray::from_vec(self.shape, data)
    }
}
