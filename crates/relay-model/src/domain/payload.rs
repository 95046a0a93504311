use serde_json::{Map, Value};

use crate::PayloadError;

const DEPENDENCIES: &str = "dependencies";

/// Initial input handed to the worker.
///
/// Built from the task details object plus the output of every upstream dependency.
/// Each dependency arrives as a JSON array; only its first element is forwarded.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskPayload {
    object: Map<String, Value>,
}

impl TaskPayload {
    /// Merges the details object with the first element of each dependency array.
    ///
    /// An empty dependency array contributes `null`.
    /// An existing `dependencies` field in the details is overwritten.
    pub fn merge<S: AsRef<str>>(details: &str, dependencies: &[S]) -> Result<Self, PayloadError> {
        let details: Value = serde_json::from_str(details).map_err(PayloadError::Details)?;
        let Value::Object(mut object) = details else {
            return Err(PayloadError::DetailsNotObject);
        };

        let deps = dependencies
            .iter()
            .enumerate()
            .map(|(index, raw)| first_element(index, raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        object.insert(DEPENDENCIES.to_string(), Value::Array(deps));
        Ok(Self { object })
    }

    pub fn dependencies(&self) -> &[Value] {
        match self.object.get(DEPENDENCIES) {
            Some(Value::Array(deps)) => deps,
            _ => &[],
        }
    }

    /// Compact JSON text, the exact form written to the worker.
    pub fn to_line(&self) -> Result<String, PayloadError> {
        serde_json::to_string(&self.object).map_err(PayloadError::Encode)
    }
}

fn first_element(index: usize, raw: &str) -> Result<Value, PayloadError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|source| PayloadError::Dependency { index, source })?;
    match value {
        Value::Array(items) => Ok(items.into_iter().next().unwrap_or(Value::Null)),
        _ => Err(PayloadError::DependencyNotArray { index }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_takes_first_element_of_each_dependency() {
        let payload = TaskPayload::merge(
            r#"{"task": "reduce", "n": 4}"#,
            &[r#"[{"file": "map-0"}, "ignored"]"#, r#"[{"file": "map-1"}]"#],
        )
        .unwrap();

        assert_eq!(
            payload.dependencies(),
            &[json!({"file": "map-0"}), json!({"file": "map-1"})]
        );
        assert!(payload.to_line().unwrap().contains(r#""task":"reduce""#));
    }

    #[test]
    fn merge_without_dependencies_yields_empty_list() {
        let payload = TaskPayload::merge::<&str>(r#"{"task": "map"}"#, &[]).unwrap();
        assert_eq!(payload.to_line().unwrap(), r#"{"dependencies":[],"task":"map"}"#);
    }

    #[test]
    fn empty_dependency_array_contributes_null() {
        let payload = TaskPayload::merge(r#"{}"#, &["[]"]).unwrap();
        assert_eq!(payload.dependencies(), &[Value::Null]);
    }

    #[test]
    fn existing_dependencies_field_is_replaced() {
        let payload = TaskPayload::merge(r#"{"dependencies": "stale"}"#, &["[1]"]).unwrap();
        assert_eq!(payload.dependencies(), &[json!(1)]);
    }

    #[test]
    fn details_must_be_an_object() {
        let err = TaskPayload::merge::<&str>("[1, 2]", &[]).unwrap_err();
        assert!(matches!(err, PayloadError::DetailsNotObject));
    }

    #[test]
    fn dependency_must_be_an_array() {
        let err = TaskPayload::merge(r#"{}"#, &["[1]", r#"{"a": 1}"#]).unwrap_err();
        assert!(matches!(err, PayloadError::DependencyNotArray { index: 1 }));
    }

    #[test]
    fn invalid_dependency_json_reports_index() {
        let err = TaskPayload::merge(r#"{}"#, &["nope"]).unwrap_err();
        assert!(matches!(err, PayloadError::Dependency { index: 0, .. }));
    }
}
