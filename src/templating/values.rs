//! Caller value mappings and the Fortran-boolean type adapter.
//!
//! A [`ValueMapping`] is an ordered, string-keyed map of dynamically typed
//! values (string, number, boolean, or nested mapping). Nested mappings are
//! permitted as values but are never flattened into dotted-path variable
//! names; only top-level keys are variable names. The engine never mutates
//! the caller's mapping: [`resolve`] produces a transient copy owned by
//! one render call.
//!
//! The boolean adapter serves downstream Fortran-90 namelist consumers,
//! which have no native `true`/`false` spelling: enabled, `true` becomes
//! the literal `"T"` and `false` becomes `"F"`. Adaptation changes only
//! the substituted text, never which names count as resolved.
//!
//! Value mappings loaded from YAML reject non-string keys at the boundary.
//! A legacy schema allowed composite (tuple) keys carrying auxiliary
//! metadata and silently compared only the first element; tmplkit does not
//! support that shape.

use serde_json::Value;

use crate::core::TmplkitError;

/// Ordered mapping from variable name to value.
pub type ValueMapping = serde_json::Map<String, Value>;

/// Produce the mapping handed to the substitution back end.
///
/// With `adapt_booleans` set, top-level boolean values are rewritten to
/// the Fortran tokens `"T"` / `"F"`; everything else passes through
/// unchanged. The caller's mapping is left untouched.
pub fn resolve(values: &ValueMapping, adapt_booleans: bool) -> ValueMapping {
    if !adapt_booleans {
        return values.clone();
    }
    values
        .iter()
        .map(|(key, value)| (key.clone(), f90_bool(value)))
        .collect()
}

/// Transform a boolean value to its Fortran-90 spelling; any other type is
/// returned unaltered.
pub fn f90_bool(value: &Value) -> Value {
    match value {
        Value::Bool(true) => Value::String("T".to_string()),
        Value::Bool(false) => Value::String("F".to_string()),
        other => other.clone(),
    }
}

/// Parse a YAML document into a [`ValueMapping`].
///
/// The document root must be a mapping and every key must be a plain
/// string; anything else is a configuration error raised before any
/// rendering side effect.
pub fn mapping_from_yaml(text: &str) -> Result<ValueMapping, TmplkitError> {
    let doc: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| TmplkitError::Config {
            message: format!("invalid YAML in values input: {e}"),
        })?;

    match doc {
        serde_yaml::Value::Mapping(mapping) => yaml_mapping_to_values(&mapping),
        serde_yaml::Value::Null => Ok(ValueMapping::new()),
        other => Err(TmplkitError::Config {
            message: format!(
                "values input must be a mapping of NAME: value pairs, got {}",
                yaml_kind(&other)
            ),
        }),
    }
}

/// Parse a single YAML value (scalar or nested), as used by `--set`
/// overrides. Types survive: `7` is a number, `true` a boolean.
pub fn value_from_yaml(text: &str) -> Result<Value, TmplkitError> {
    let doc: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| TmplkitError::Config {
            message: format!("invalid YAML value {text:?}: {e}"),
        })?;
    yaml_to_json(&doc)
}

fn yaml_mapping_to_values(
    mapping: &serde_yaml::Mapping,
) -> Result<ValueMapping, TmplkitError> {
    let mut values = ValueMapping::new();
    for (key, value) in mapping {
        let name = match key {
            serde_yaml::Value::String(s) => s.clone(),
            other => {
                return Err(TmplkitError::InvalidValueKey {
                    key: format!("{other:?}"),
                    reason: format!("expected a string key, got {}", yaml_kind(other)),
                });
            }
        };
        values.insert(name, yaml_to_json(value)?);
    }
    Ok(values)
}

fn yaml_to_json(value: &serde_yaml::Value) -> Result<Value, TmplkitError> {
    let converted = match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                let f = n.as_f64().ok_or_else(|| TmplkitError::Config {
                    message: format!("unrepresentable number in values input: {n}"),
                })?;
                serde_json::Number::from_f64(f).map(Value::Number).ok_or_else(|| {
                    TmplkitError::Config {
                        message: format!("non-finite number in values input: {n}"),
                    }
                })?
            }
        }
        serde_yaml::Value::String(s) => Value::String(s.clone()),
        serde_yaml::Value::Sequence(seq) => Value::Array(
            seq.iter().map(yaml_to_json).collect::<Result<Vec<_>, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            Value::Object(yaml_mapping_to_values(mapping)?)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value)?,
    };
    Ok(converted)
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(pairs: &[(&str, Value)]) -> ValueMapping {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn resolve_without_adaptation_is_a_clone() {
        let values = mapping(&[("A", json!(true)), ("B", json!("x"))]);
        let resolved = resolve(&values, false);
        assert_eq!(resolved, values);
    }

    #[test]
    fn resolve_adapts_booleans_to_fortran_tokens() {
        let values = mapping(&[("ON", json!(true)), ("OFF", json!(false))]);
        let resolved = resolve(&values, true);
        assert_eq!(resolved["ON"], json!("T"));
        assert_eq!(resolved["OFF"], json!("F"));
    }

    #[test]
    fn resolve_leaves_non_booleans_alone() {
        let values = mapping(&[
            ("S", json!("text")),
            ("N", json!(42)),
            ("M", json!({"nested": true})),
        ]);
        let resolved = resolve(&values, true);
        assert_eq!(resolved["S"], json!("text"));
        assert_eq!(resolved["N"], json!(42));
        // Adaptation is top-level only; nested mappings pass through.
        assert_eq!(resolved["M"], json!({"nested": true}));
    }

    #[test]
    fn resolve_never_mutates_the_caller_mapping() {
        let values = mapping(&[("ON", json!(true))]);
        let _ = resolve(&values, true);
        assert_eq!(values["ON"], json!(true));
    }

    #[test]
    fn yaml_mapping_preserves_key_order() {
        let values = mapping_from_yaml("Z: 1\nA: 2\nM: 3\n").unwrap();
        let keys: Vec<_> = values.keys().cloned().collect();
        assert_eq!(keys, vec!["Z", "A", "M"]);
    }

    #[test]
    fn yaml_scalars_keep_their_types() {
        let values = mapping_from_yaml("S: ham\nN: 7\nF: 1.5\nB: true\n").unwrap();
        assert_eq!(values["S"], json!("ham"));
        assert_eq!(values["N"], json!(7));
        assert_eq!(values["F"], json!(1.5));
        assert_eq!(values["B"], json!(true));
    }

    #[test]
    fn yaml_nested_mappings_are_values_not_dotted_names() {
        let values = mapping_from_yaml("model:\n  res: 25\n").unwrap();
        assert_eq!(values["model"], json!({"res": 25}));
        assert!(!values.contains_key("model.res"));
    }

    #[test]
    fn yaml_composite_keys_are_rejected() {
        let err = mapping_from_yaml("[a, b]: 1\n").unwrap_err();
        assert!(matches!(err, TmplkitError::InvalidValueKey { .. }));
    }

    #[test]
    fn yaml_non_mapping_root_is_a_config_error() {
        let err = mapping_from_yaml("- just\n- a\n- list\n").unwrap_err();
        assert!(matches!(err, TmplkitError::Config { .. }));
    }

    #[test]
    fn empty_yaml_document_is_an_empty_mapping() {
        assert!(mapping_from_yaml("").unwrap().is_empty());
    }
}
