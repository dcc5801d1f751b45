//! Dotted-path overrides such as `metrics.risk_free_rate=0.05`.
//!
//! The configuration is round-tripped through a JSON value so any field
//! reachable by path can be replaced without per-field code. Paths must name
//! an existing field; the result is re-validated.

use serde_json::Value;

use crate::app::AppConfig;
use crate::error::{ConfigError, ConfigResult, Validate};

/// Applies one override. `raw` is read as JSON first and as a plain
/// string if that fails, so `0.05`, `true`, `[1, 2]` and `overwrite` all
/// work.
///
/// # Errors
///
/// `ConfigError::InvalidOverride` for an unknown path, `ConfigError::Parse`
/// if the value does not fit the field, or the validation errors of the
/// overridden configuration.
pub fn apply_override(config: &mut AppConfig, path: &str, raw: &str) -> ConfigResult<()> {
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    let mut json = serde_json::to_value(&*config)?;
    set_path(&mut json, path, value)?;

    let updated: AppConfig = serde_json::from_value(json)?;
    updated.validate_or_error()?;
    log::debug!("override {path} = {raw}");
    *config = updated;
    Ok(())
}

/// Applies `key=value` assignments in order.
///
/// # Errors
///
/// `ConfigError::InvalidOverride` for an assignment without `=`, otherwise
/// as [`apply_override`]. Earlier assignments stay applied.
pub fn apply_assignments<'a, I>(config: &mut AppConfig, assignments: I) -> ConfigResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    for assignment in assignments {
        let (path, raw) = assignment
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidOverride {
                field: assignment.to_string(),
            })?;
        apply_override(config, path.trim(), raw.trim())?;
    }
    Ok(())
}

fn set_path(target: &mut Value, path: &str, value: Value) -> ConfigResult<()> {
    let invalid = || ConfigError::InvalidOverride {
        field: path.to_string(),
    };
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut current = target;
    for part in parents.into_iter().flat_map(|p| p.split('.')) {
        current = current.get_mut(part).ok_or_else(invalid)?;
    }

    let obj = current.as_object_mut().ok_or_else(invalid)?;
    if !obj.contains_key(leaf) {
        return Err(invalid());
    }
    obj.insert(leaf.to_string(), value);
    Ok(())
}
