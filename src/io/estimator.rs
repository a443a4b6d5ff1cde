//! JSON documents for estimator parameter trees.
//!
//! An estimator's behavior-defining state is its shallow parameter set,
//! encoded as `{"params": {...}, "__class__": "Name"}`. A parameter that
//! is itself an estimator is stored as a *string* containing the child's
//! encoded document, not as a structured sub-object. Consumers dispatch
//! reconstruction on `__class__`; keep the string nesting as-is, it is
//! part of the wire format.

use serde_json::{Map, Number, Value};

use crate::error::Result;
use crate::traits::ParamEstimator;

/// A single parameter value.
///
/// [`ParamValue::Null`] is the designated "empty" sentinel: a parameter
/// holding it is treated as absent by [`ParamEstimator::contains`].
pub enum ParamValue {
    /// The empty sentinel.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating-point literal.
    Float(f64),
    /// String literal.
    Str(String),
    /// Homogeneous or mixed list of literals.
    List(Vec<ParamValue>),
    /// A nested estimator, encoded recursively at serialization time.
    Estimator(Box<dyn ParamEstimator>),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// An ordered, shallow parameter set.
///
/// Order is fixed by the estimator's `params()` implementation, so
/// documents are deterministic.
#[derive(Default)]
pub struct ParamSet {
    params: Vec<(String, ParamValue)>,
}

impl ParamSet {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter (builder style).
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }

    /// Appends a nested estimator parameter (builder style).
    #[must_use]
    pub fn with_estimator(mut self, name: &str, estimator: Box<dyn ParamEstimator>) -> Self {
        self.params
            .push((name.to_string(), ParamValue::Estimator(estimator)));
        self
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterates parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Encodes an estimator's parameter tree as a JSON document.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn to_json(estimator: &dyn ParamEstimator) -> Result<String> {
    let mut params = Map::new();
    for (name, value) in estimator.params().iter() {
        params.insert(name.to_string(), encode_value(value)?);
    }
    let mut doc = Map::new();
    doc.insert("params".to_string(), Value::Object(params));
    doc.insert(
        "__class__".to_string(),
        Value::String(estimator.class_name().to_string()),
    );
    Ok(serde_json::to_string(&Value::Object(doc))?)
}

fn encode_value(value: &ParamValue) -> Result<Value> {
    Ok(match value {
        ParamValue::Null => Value::Null,
        ParamValue::Bool(b) => Value::Bool(*b),
        ParamValue::Int(i) => Value::from(*i),
        ParamValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        ParamValue::Str(s) => Value::String(s.clone()),
        ParamValue::List(items) => Value::Array(
            items
                .iter()
                .map(encode_value)
                .collect::<Result<Vec<Value>>>()?,
        ),
        // Nested documents stay string-encoded for wire compatibility.
        ParamValue::Estimator(child) => Value::String(to_json(child.as_ref())?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TailCurve {
        alpha: f64,
    }

    impl ParamEstimator for TailCurve {
        fn class_name(&self) -> &str {
            "TailCurve"
        }

        fn params(&self) -> ParamSet {
            ParamSet::new().with("alpha", self.alpha)
        }
    }

    struct Development {
        window: i64,
        average: Option<String>,
        inner: Option<TailCurve>,
    }

    impl ParamEstimator for Development {
        fn class_name(&self) -> &str {
            "Development"
        }

        fn params(&self) -> ParamSet {
            let set = ParamSet::new().with("window", self.window).with(
                "average",
                self.average
                    .clone()
                    .map_or(ParamValue::Null, ParamValue::Str),
            );
            match &self.inner {
                Some(tail) => set.with_estimator("inner", Box::new(TailCurve { alpha: tail.alpha })),
                None => set.with("inner", ParamValue::Null),
            }
        }
    }

    #[test]
    fn test_flat_document_shape() {
        let est = Development {
            window: 5,
            average: Some("volume".to_string()),
            inner: None,
        };
        let doc = est.to_json().unwrap();
        assert_eq!(
            doc,
            r#"{"params":{"window":5,"average":"volume","inner":null},"__class__":"Development"}"#
        );
    }

    #[test]
    fn test_nested_estimator_is_string_encoded() {
        let est = Development {
            window: 5,
            average: None,
            inner: Some(TailCurve { alpha: 0.1 }),
        };
        let doc = est.to_json().unwrap();

        let root: Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(root["__class__"], "Development");
        assert_eq!(root["params"]["window"], 5);

        // The child is a string holding a valid document of its own.
        let inner = root["params"]["inner"]
            .as_str()
            .expect("nested estimator must be string-encoded");
        let inner_doc: Value = serde_json::from_str(inner).unwrap();
        assert_eq!(inner_doc["__class__"], "TailCurve");
        assert_eq!(inner_doc["params"]["alpha"], 0.1);
    }

    #[test]
    fn test_contains_conflates_absent_and_sentinel() {
        let est = Development {
            window: 0,
            average: None,
            inner: None,
        };
        // Absent parameter and Null sentinel both report false.
        assert!(!est.contains("missing"));
        assert!(!est.contains("average"));
        assert!(!est.contains("inner"));
        // Any other value reports true, zero included.
        assert!(est.contains("window"));
    }

    #[test]
    fn test_contains_true_for_empty_string() {
        let est = Development {
            window: 1,
            average: Some(String::new()),
            inner: None,
        };
        assert!(est.contains("average"));
    }

    #[test]
    fn test_list_parameters_encode_inline() {
        struct WithList;
        impl ParamEstimator for WithList {
            fn class_name(&self) -> &str {
                "WithList"
            }
            fn params(&self) -> ParamSet {
                ParamSet::new().with(
                    "drop",
                    ParamValue::List(vec![ParamValue::Int(1), ParamValue::Str("hi".into())]),
                )
            }
        }
        let doc = WithList.to_json().unwrap();
        assert_eq!(
            doc,
            r#"{"params":{"drop":[1,"hi"]},"__class__":"WithList"}"#
        );
    }

    #[test]
    fn test_encode_is_deterministic() {
        let est = Development {
            window: 5,
            average: Some("volume".to_string()),
            inner: Some(TailCurve { alpha: 0.1 }),
        };
        assert_eq!(est.to_json().unwrap(), est.to_json().unwrap());
    }
}
