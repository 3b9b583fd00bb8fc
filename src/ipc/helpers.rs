use crate::calc::{number_from_value, GradeLevel, WeightProfile};
use crate::ipc::types::AppState;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Optional typed param; absent and `null` are both `None`.
pub fn opt_param<T: DeserializeOwned>(params: &Value, key: &str) -> Result<Option<T>, String> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| format!("{} is invalid: {}", key, e)),
    }
}

/// List param; absent means empty.
pub fn list_param<T: DeserializeOwned>(params: &Value, key: &str) -> Result<Vec<T>, String> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v @ Value::Array(_)) => serde_json::from_value(v.clone())
            .map_err(|e| format!("{} is invalid: {}", key, e)),
        Some(_) => Err(format!("{} must be an array", key)),
    }
}

pub fn number_param(params: &Value, key: &str) -> Option<f64> {
    params.get(key).and_then(number_from_value)
}

pub fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    match params.get(key).and_then(|v| v.as_str()) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim()),
        _ => Err(format!("missing {}", key)),
    }
}

/// Resolves `params.gradeLevel` against the state's weight table.
pub fn grade_level_param(
    state: &AppState,
    params: &Value,
) -> Result<(GradeLevel, WeightProfile), String> {
    let raw = match params.get("gradeLevel") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err("missing gradeLevel".to_string()),
    };
    let level = GradeLevel::parse(&raw).ok_or_else(|| format!("unknown gradeLevel: {}", raw))?;
    let weights = state
        .weights
        .profile(level)
        .ok_or_else(|| format!("no weights configured for gradeLevel {}", level.key()))?;
    Ok((level, weights))
}
