//! Structural comparison of decoded documents.
//!
//! Bodies are compared as value trees, never as strings: object key order is
//! irrelevant, array order is significant. On mismatch the failure names the
//! first differing path so a broken fixture can be located quickly.

use serde_json::Value;

use crate::error::AssertionFailure;

/// First place where two value trees disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    /// `$` for the root, otherwise e.g. `foo`, `items[2].name`.
    pub path: String,
    pub expected: Option<Value>,
    pub actual: Option<Value>,
}

/// Walk both trees depth-first and return the first difference, if any.
pub fn first_difference(expected: &Value, actual: &Value) -> Option<Difference> {
    walk(expected, actual, String::new())
}

fn walk(expected: &Value, actual: &Value, path: String) -> Option<Difference> {
    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => {
            let mut keys: Vec<&String> = exp.keys().chain(act.keys()).collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                let child = join_key(&path, key);
                match (exp.get(key), act.get(key)) {
                    (Some(e), Some(a)) => {
                        if let Some(diff) = walk(e, a, child) {
                            return Some(diff);
                        }
                    }
                    (e, a) => {
                        return Some(Difference {
                            path: child,
                            expected: e.cloned(),
                            actual: a.cloned(),
                        })
                    }
                }
            }
            None
        }
        (Value::Array(exp), Value::Array(act)) => {
            for index in 0..exp.len().max(act.len()) {
                let child = format!("{path}[{index}]");
                match (exp.get(index), act.get(index)) {
                    (Some(e), Some(a)) => {
                        if let Some(diff) = walk(e, a, child) {
                            return Some(diff);
                        }
                    }
                    (e, a) => {
                        return Some(Difference {
                            path: child,
                            expected: e.cloned(),
                            actual: a.cloned(),
                        })
                    }
                }
            }
            None
        }
        (e, a) if e == a => None,
        (e, a) => Some(Difference {
            path: if path.is_empty() { "$".to_string() } else { path },
            expected: Some(e.clone()),
            actual: Some(a.clone()),
        }),
    }
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// Fail with a structural diff unless both documents are equal.
pub fn assert_json_eq(expected: &Value, actual: &Value) -> Result<(), AssertionFailure> {
    let Some(diff) = first_difference(expected, actual) else {
        return Ok(());
    };
    let message = format!(
        "Failed asserting that two documents are equal: first difference at `{}` (expected {}, actual {})",
        diff.path,
        describe(diff.expected.as_ref()),
        describe(diff.actual.as_ref()),
    );
    Err(AssertionFailure::mismatch(message, pretty(expected), pretty(actual)).at_path(diff.path))
}

fn describe(value: Option<&Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "<missing>".to_string(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_is_ignored() {
        let expected: Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        let actual: Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        assert!(first_difference(&expected, &actual).is_none());
    }

    #[test]
    fn array_order_is_significant() {
        let diff = first_difference(&json!([1, 2]), &json!([2, 1])).unwrap();
        assert_eq!(diff.path, "[0]");
    }

    #[test]
    fn nested_path_is_reported() {
        let expected = json!({"items": [{"name": "a"}, {"name": "b"}]});
        let actual = json!({"items": [{"name": "a"}, {"name": "c"}]});
        let diff = first_difference(&expected, &actual).unwrap();
        assert_eq!(diff.path, "items[1].name");
        assert_eq!(diff.expected, Some(json!("b")));
        assert_eq!(diff.actual, Some(json!("c")));
    }

    #[test]
    fn missing_and_extra_fields_are_differences() {
        let diff = first_difference(&json!({"a": 1}), &json!({"a": 1, "b": 2})).unwrap();
        assert_eq!(diff.path, "b");
        assert_eq!(diff.expected, None);

        let diff = first_difference(&json!([1, 2]), &json!([1])).unwrap();
        assert_eq!(diff.path, "[1]");
        assert_eq!(diff.actual, None);
    }

    #[test]
    fn root_scalar_mismatch_uses_dollar() {
        let diff = first_difference(&json!("x"), &json!(3)).unwrap();
        assert_eq!(diff.path, "$");
    }

    #[test]
    fn failure_names_the_differing_field() {
        let failure = assert_json_eq(&json!({"foo": "tok"}), &json!({"foo": "bar"})).unwrap_err();
        assert_eq!(failure.path.as_deref(), Some("foo"));
        assert!(failure.message.contains("`foo`"));
        assert!(failure.message.contains(r#"expected "tok", actual "bar""#));
        assert!(failure.to_string().contains("--- Expected"));
    }
}
