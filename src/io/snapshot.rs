//! Whole-object binary snapshots.
//!
//! Thin facade over bincode. Snapshots capture complete entity state,
//! nested children and side tables included; the payload layout is owned
//! by bincode and is opaque to this crate. Writes are not transactional:
//! a failure mid-write can leave a partial file behind.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CadenaError, Result};
use crate::triangle::Triangle;

/// Magic bytes heading every snapshot file.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"CSN1";

/// The snapshot protocol written when the caller does not pick one.
pub const DEFAULT_PROTOCOL: u32 = 1;

/// Writes a binary snapshot of `entity` to `path`.
///
/// `protocol` selects the payload protocol version and is recorded in the
/// header so [`load_snapshot`] can dispatch; `None` means
/// [`DEFAULT_PROTOCOL`].
///
/// # Errors
///
/// Returns an error for an unknown protocol, and passes through bincode
/// and I/O failures unchanged.
pub fn save_snapshot<T: Serialize>(
    entity: &T,
    path: impl AsRef<Path>,
    protocol: Option<u32>,
) -> Result<()> {
    let protocol = protocol.unwrap_or(DEFAULT_PROTOCOL);
    if protocol != DEFAULT_PROTOCOL {
        return Err(CadenaError::Serialization(format!(
            "unsupported snapshot protocol {protocol}"
        )));
    }
    let payload = bincode::serialize(entity)?;
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend_from_slice(&SNAPSHOT_MAGIC);
    out.extend_from_slice(&protocol.to_le_bytes());
    out.extend_from_slice(&payload);
    fs::write(path, out)?;
    Ok(())
}

/// Reads a binary snapshot written by [`save_snapshot`].
///
/// # Errors
///
/// Returns an error if the file is not a snapshot, carries an unknown
/// protocol, or fails to decode.
pub fn load_snapshot<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let data = fs::read(path)?;
    if data.len() < 8 || data[..4] != SNAPSHOT_MAGIC {
        return Err(CadenaError::Serialization(
            "not a cadena snapshot file".to_string(),
        ));
    }
    let mut protocol = [0u8; 4];
    protocol.copy_from_slice(&data[4..8]);
    let protocol = u32::from_le_bytes(protocol);
    if protocol != DEFAULT_PROTOCOL {
        return Err(CadenaError::Serialization(format!(
            "unsupported snapshot protocol {protocol}"
        )));
    }
    Ok(bincode::deserialize(&data[8..])?)
}

impl Triangle {
    /// Persists the triangle, children and tables included, as a binary
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Passes through I/O and codec failures from the snapshot writer.
    pub fn to_snapshot(&self, path: impl AsRef<Path>, protocol: Option<u32>) -> Result<()> {
        save_snapshot(self, path, protocol)
    }

    /// Restores a triangle from a binary snapshot.
    ///
    /// # Errors
    ///
    /// Passes through I/O and codec failures from the snapshot reader.
    pub fn from_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        load_snapshot(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HostArray;
    use crate::data::Table;
    use crate::triangle::DimVec;
    use chrono::NaiveDate;

    fn triangle() -> Triangle {
        let values = HostArray::from_vec([1, 1, 2, 2], vec![10.0, 15.0, 8.0, 12.0]).unwrap();
        Triangle::new(
            DimVec::Str(vec!["total".to_string()]),
            DimVec::Str(vec!["paid".to_string()]),
            DimVec::Int(vec![2019, 2020]),
            DimVec::Int(vec![12, 24]),
            values,
            NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        )
        .unwrap()
        .with_table("ldf_", Table::single_column("ldf", vec![1.5]).unwrap())
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.csn");
        let tri = triangle();
        tri.to_snapshot(&path, None).unwrap();
        let back = Triangle::from_snapshot(&path).unwrap();
        assert_eq!(back, tri);
    }

    #[test]
    fn test_snapshot_default_protocol_in_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.csn");
        triangle().to_snapshot(&path, Some(1)).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"CSN1");
        assert_eq!(&bytes[4..8], 1u32.to_le_bytes().as_slice());
    }

    #[test]
    fn test_unknown_protocol_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.csn");
        let err = triangle().to_snapshot(&path, Some(9)).unwrap_err();
        assert!(err.to_string().contains("protocol 9"));
    }

    #[test]
    fn test_load_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.bin");
        fs::write(&path, b"definitely not a snapshot").unwrap();
        let err = Triangle::from_snapshot(&path).unwrap_err();
        assert!(err.to_string().contains("not a cadena snapshot"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Triangle::from_snapshot("/no/such/path.csn").unwrap_err();
        assert!(matches!(err, CadenaError::Io(_)));
    }
}
