//! Portable JSON documents for triangles.
//!
//! The document layout:
//!
//! ```text
//! {
//!   "ddims":  {dtype, array},        // first, only when is_val_tri
//!   "kdims":  {dtype, array},
//!   "vdims":  {dtype, array},
//!   "odims":  {dtype, array},
//!   "ddims":  {dtype, array},        // here when NOT is_val_tri
//!   "values": {dtype, array, sparse},
//!   "key_labels": [..],
//!   "origin_grain": "Y", "development_grain": "Y",
//!   "is_cumulative": bool, "is_val_tri": bool,
//!   "valuation_date": "YYYY-MM-DD",
//!   "sub_tris": {name: <nested document>},
//!   "dfs": {name: "<table record string>"}
//! }
//! ```
//!
//! Values are stored incrementally (first differences along development);
//! the sparse representation drops zeros *and* NaNs, so a sparse document
//! cannot distinguish a missing cell from a true zero. Absent coordinates
//! decode to zero.

use chrono::NaiveDate;
use serde_json::{Map, Number, Value};

use crate::backend::{HostArray, Materialize};
use crate::data::Table;
use crate::error::{CadenaError, Result};
use crate::triangle::{DimVec, Grain, Triangle};

use super::sparsity::{choose_encoding, Encoding};

const DATE_FORMAT: &str = "%Y-%m-%d";

impl Triangle {
    /// Encodes the triangle as a JSON document.
    ///
    /// Output is deterministic: repeated encodes of an unchanged triangle
    /// are byte-identical, regardless of which backend holds the values.
    ///
    /// # Errors
    ///
    /// Returns an error if host materialization or JSON encoding fails.
    pub fn to_json(&self) -> Result<String> {
        let doc = encode_triangle(self)?;
        Ok(serde_json::to_string(&Value::Object(doc))?)
    }

    /// Decodes a triangle from a JSON document.
    ///
    /// Fails atomically: a malformed document never yields a partially
    /// populated triangle. Sparse coordinates absent from the map decode
    /// to zero, never NaN (the wire format carries no missingness mask).
    ///
    /// # Errors
    ///
    /// Returns [`CadenaError::Schema`], [`CadenaError::DtypeMismatch`],
    /// or [`CadenaError::ShapeMismatch`] with field-level context.
    pub fn from_json(document: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(document)?;
        decode_triangle(&root)
    }
}

fn encode_triangle(tri: &Triangle) -> Result<Map<String, Value>> {
    let mut doc = Map::new();

    // Valuation-indexed triangles carry their dates ahead of the rest.
    if tri.is_val_tri() {
        doc.insert("ddims".to_string(), dim_record(tri.ddims()));
    }
    doc.insert("kdims".to_string(), dim_record(tri.kdims()));
    doc.insert("vdims".to_string(), dim_record(tri.vdims()));
    doc.insert("odims".to_string(), dim_record(tri.odims()));
    if !tri.is_val_tri() {
        doc.insert("ddims".to_string(), dim_record(tri.ddims()));
    }

    let host = tri.values().materialize()?;
    let incremental = if tri.is_cumulative() {
        host.cum_to_incr()
    } else {
        host
    };

    let mut values = Map::new();
    values.insert("dtype".to_string(), Value::String("float64".to_string()));
    match choose_encoding(&incremental) {
        Encoding::Dense => {
            values.insert("array".to_string(), dense_array(&incremental));
            values.insert("sparse".to_string(), Value::Bool(false));
        }
        Encoding::Sparse => {
            values.insert("array".to_string(), Value::String(sparse_out(&incremental)?));
            values.insert("sparse".to_string(), Value::Bool(true));
        }
    }
    doc.insert("values".to_string(), Value::Object(values));

    doc.insert(
        "key_labels".to_string(),
        Value::Array(
            tri.key_labels()
                .iter()
                .map(|l| Value::String(l.clone()))
                .collect(),
        ),
    );
    doc.insert(
        "origin_grain".to_string(),
        Value::String(tri.origin_grain().as_str().to_string()),
    );
    doc.insert(
        "development_grain".to_string(),
        Value::String(tri.development_grain().as_str().to_string()),
    );
    doc.insert("is_cumulative".to_string(), Value::Bool(tri.is_cumulative()));
    doc.insert("is_val_tri".to_string(), Value::Bool(tri.is_val_tri()));
    doc.insert(
        "valuation_date".to_string(),
        Value::String(tri.valuation_date().format(DATE_FORMAT).to_string()),
    );

    let mut sub_tris = Map::new();
    for (name, sub) in tri.sub_tris() {
        sub_tris.insert(name.clone(), Value::Object(encode_triangle(sub)?));
    }
    doc.insert("sub_tris".to_string(), Value::Object(sub_tris));

    let mut dfs = Map::new();
    for (name, table) in tri.dfs() {
        dfs.insert(name.clone(), Value::String(table.to_record_json()?));
    }
    doc.insert("dfs".to_string(), Value::Object(dfs));

    Ok(doc)
}

fn dim_record(dim: &DimVec) -> Value {
    let array: Vec<Value> = match dim {
        DimVec::Int(v) => v.iter().map(|i| Value::from(*i)).collect(),
        DimVec::Float(v) => v.iter().map(|f| number_or_null(*f)).collect(),
        DimVec::Str(v) => v.iter().map(|s| Value::String(s.clone())).collect(),
        DimVec::Date(v) => v
            .iter()
            .map(|d| Value::String(d.format(DATE_FORMAT).to_string()))
            .collect(),
    };
    let mut record = Map::new();
    record.insert("dtype".to_string(), Value::String(dim.dtype().to_string()));
    record.insert("array".to_string(), Value::Array(array));
    Value::Object(record)
}

fn number_or_null(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn dense_array(array: &HostArray) -> Value {
    let [nk, nv, no, nd] = array.shape();
    let mut level_k = Vec::with_capacity(nk);
    for k in 0..nk {
        let mut level_v = Vec::with_capacity(nv);
        for v in 0..nv {
            let mut level_o = Vec::with_capacity(no);
            for o in 0..no {
                let row: Vec<Value> = (0..nd)
                    .map(|d| number_or_null(array.get(k, v, o, d)))
                    .collect();
                level_o.push(Value::Array(row));
            }
            level_v.push(Value::Array(level_o));
        }
        level_k.push(Value::Array(level_v));
    }
    Value::Array(level_k)
}

/// Serializes the nonzero coordinates of the 2-D reshape `(k*v*o, d)` as a
/// `"(row, col)" -> value` object, in row-major scan order. Zeros and NaNs
/// are both dropped.
fn sparse_out(array: &HostArray) -> Result<String> {
    let [_, _, _, nd] = array.shape();
    let mut coo = Map::new();
    for (i, value) in array.as_slice().iter().enumerate() {
        let cell = if value.is_nan() { 0.0 } else { *value };
        if cell != 0.0 {
            coo.insert(format!("({}, {})", i / nd, i % nd), number_or_null(cell));
        }
    }
    Ok(serde_json::to_string(&Value::Object(coo))?)
}

fn decode_triangle(root: &Value) -> Result<Triangle> {
    let obj = root
        .as_object()
        .ok_or_else(|| CadenaError::schema("triangle", "expected an object"))?;

    let kdims = decode_dim(obj, "kdims")?;
    let vdims = decode_dim(obj, "vdims")?;
    let odims = decode_dim(obj, "odims")?;
    let ddims = decode_dim(obj, "ddims")?;
    let shape = [kdims.len(), vdims.len(), odims.len(), ddims.len()];

    let is_cumulative = get_bool(obj, "is_cumulative")?;
    let is_val_tri = get_bool(obj, "is_val_tri")?;

    let incremental = decode_values(obj, shape)?;
    let values = if is_cumulative {
        incremental.incr_to_cum()
    } else {
        incremental
    };

    let valuation_date = NaiveDate::parse_from_str(get_str(obj, "valuation_date")?, DATE_FORMAT)
        .map_err(|e| CadenaError::schema("valuation_date", format!("not an ISO date: {e}")))?;

    let key_labels = get_field(obj, "key_labels")?
        .as_array()
        .ok_or_else(|| CadenaError::schema("key_labels", "expected an array of strings"))?
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                CadenaError::schema("key_labels", format!("expected string, got {v}"))
            })
        })
        .collect::<Result<Vec<String>>>()?;

    let mut tri = Triangle::new(kdims, vdims, odims, ddims, values, valuation_date)?
        .with_cumulative(is_cumulative)
        .with_val_tri(is_val_tri)
        .with_grains(
            Grain::parse(get_str(obj, "origin_grain")?)?,
            Grain::parse(get_str(obj, "development_grain")?)?,
        )
        .with_key_labels(key_labels);

    for (name, sub) in get_object(obj, "sub_tris")? {
        tri = tri.with_sub_tri(name, decode_triangle(sub)?);
    }
    for (name, record) in get_object(obj, "dfs")? {
        let record = record.as_str().ok_or_else(|| {
            CadenaError::schema(&format!("dfs.{name}"), "expected a table record string")
        })?;
        tri = tri.with_table(name, Table::from_record_json(record)?);
    }

    Ok(tri)
}

fn decode_values(obj: &Map<String, Value>, shape: [usize; 4]) -> Result<HostArray> {
    let record = get_object(obj, "values")?;
    let dtype = record
        .get("dtype")
        .and_then(Value::as_str)
        .ok_or_else(|| CadenaError::schema("values.dtype", "expected a string"))?;
    if dtype != "float64" {
        return Err(CadenaError::DtypeMismatch {
            field: "values".to_string(),
            dtype: dtype.to_string(),
            detail: "value arrays must be float64".to_string(),
        });
    }
    let sparse = record.get("sparse").ok_or_else(|| {
        CadenaError::schema("values.sparse", "missing required field")
    })?;
    let sparse = sparse.as_bool().ok_or_else(|| {
        CadenaError::schema(
            "values.sparse",
            format!("unknown sparse/dense tag: expected boolean, got {sparse}"),
        )
    })?;
    let array = record
        .get("array")
        .ok_or_else(|| CadenaError::schema("values.array", "missing required field"))?;

    if sparse {
        decode_sparse(array, shape)
    } else {
        decode_dense(array, shape)
    }
}

fn decode_dense(value: &Value, shape: [usize; 4]) -> Result<HostArray> {
    let [nk, nv, no, nd] = shape;
    let mut data = Vec::with_capacity(nk * nv * no * nd);
    for a in as_level(value, nk, "values.array")? {
        for b in as_level(a, nv, "values.array[k]")? {
            for c in as_level(b, no, "values.array[k][v]")? {
                for cell in as_level(c, nd, "values.array[k][v][o]")? {
                    data.push(as_cell(cell)?);
                }
            }
        }
    }
    HostArray::from_vec(shape, data)
}

fn as_level<'a>(value: &'a Value, expected: usize, field: &str) -> Result<&'a Vec<Value>> {
    let arr = value
        .as_array()
        .ok_or_else(|| CadenaError::schema(field, "expected a nested array"))?;
    if arr.len() != expected {
        return Err(CadenaError::ShapeMismatch {
            expected: format!("{expected} entries in {field}"),
            actual: format!("{} entries", arr.len()),
        });
    }
    Ok(arr)
}

fn as_cell(value: &Value) -> Result<f64> {
    match value {
        Value::Null => Ok(f64::NAN),
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            CadenaError::schema("values.array", format!("cell {n} is not an f64"))
        }),
        other => Err(CadenaError::schema(
            "values.array",
            format!("expected number or null, got {other}"),
        )),
    }
}

fn decode_sparse(value: &Value, shape: [usize; 4]) -> Result<HostArray> {
    let encoded = value.as_str().ok_or_else(|| {
        CadenaError::schema("values.array", "sparse values must be a coordinate-map string")
    })?;
    let inner: Value = serde_json::from_str(encoded)
        .map_err(|e| CadenaError::schema("values.array", format!("invalid coordinate map: {e}")))?;
    let coo = inner
        .as_object()
        .ok_or_else(|| CadenaError::schema("values.array", "coordinate map must be an object"))?;

    let [nk, nv, no, nd] = shape;
    let rows = nk * nv * no;
    let mut data = vec![0.0; rows * nd];
    for (key, cell) in coo {
        let (row, col) = parse_coord(key)?;
        if row >= rows || col >= nd {
            return Err(CadenaError::schema(
                "values.array",
                format!("coordinate ({row}, {col}) out of bounds for ({rows}, {nd})"),
            ));
        }
        data[row * nd + col] = cell.as_f64().ok_or_else(|| {
            CadenaError::schema("values.array", format!("value at '{key}' is not a number"))
        })?;
    }
    HostArray::from_vec(shape, data)
}

fn parse_coord(key: &str) -> Result<(usize, usize)> {
    let bad = || CadenaError::schema("values.array", format!("bad coordinate key '{key}'"));
    let inner = key
        .strip_prefix('(')
        .and_then(|k| k.strip_suffix(')'))
        .ok_or_else(bad)?;
    let (row, col) = inner.split_once(',').ok_or_else(bad)?;
    Ok((
        row.trim().parse().map_err(|_| bad())?,
        col.trim().parse().map_err(|_| bad())?,
    ))
}

fn get_field<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value> {
    obj.get(field)
        .ok_or_else(|| CadenaError::schema(field, "missing required field"))
}

fn get_bool(obj: &Map<String, Value>, field: &str) -> Result<bool> {
    get_field(obj, field)?
        .as_bool()
        .ok_or_else(|| CadenaError::schema(field, "expected a boolean"))
}

fn get_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a str> {
    get_field(obj, field)?
        .as_str()
        .ok_or_else(|| CadenaError::schema(field, "expected a string"))
}

fn get_object<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Map<String, Value>> {
    get_field(obj, field)?
        .as_object()
        .ok_or_else(|| CadenaError::schema(field, "expected an object"))
}

fn decode_dim(obj: &Map<String, Value>, field: &str) -> Result<DimVec> {
    let record = get_object(obj, field)?;
    let dtype = record
        .get("dtype")
        .and_then(Value::as_str)
        .ok_or_else(|| CadenaError::schema(field, "dimension record needs a dtype string"))?;
    let array = record
        .get("array")
        .and_then(Value::as_array)
        .ok_or_else(|| CadenaError::schema(field, "dimension record needs an array"))?;

    let mismatch = |idx: usize, got: &Value| CadenaError::DtypeMismatch {
        field: field.to_string(),
        dtype: dtype.to_string(),
        detail: format!("element {idx} is {got}"),
    };

    match dtype {
        "int64" => {
            let labels = array
                .iter()
                .enumerate()
                .map(|(i, v)| v.as_i64().ok_or_else(|| mismatch(i, v)))
                .collect::<Result<Vec<i64>>>()?;
            Ok(DimVec::Int(labels))
        }
        "float64" => {
            let labels = array
                .iter()
                .enumerate()
                .map(|(i, v)| v.as_f64().ok_or_else(|| mismatch(i, v)))
                .collect::<Result<Vec<f64>>>()?;
            Ok(DimVec::Float(labels))
        }
        "object" => {
            let labels = array
                .iter()
                .enumerate()
                .map(|(i, v)| v.as_str().map(str::to_string).ok_or_else(|| mismatch(i, v)))
                .collect::<Result<Vec<String>>>()?;
            Ok(DimVec::Str(labels))
        }
        "datetime64[ns]" => {
            let labels = array
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let text = v.as_str().ok_or_else(|| mismatch(i, v))?;
                    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| mismatch(i, v))
                })
                .collect::<Result<Vec<NaiveDate>>>()?;
            Ok(DimVec::Date(labels))
        }
        other => Err(CadenaError::DtypeMismatch {
            field: field.to_string(),
            dtype: other.to_string(),
            detail: "unsupported dtype".to_string(),
        }),
    }
}
