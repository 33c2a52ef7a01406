//! Validation of persisted parameter trees before the host wrapper applies them.

use crate::audio::constants::{
    GAIN_MAX_DB, GAIN_MIN_DB, MAX_FREQUENCY, MIN_FREQUENCY, QUALITY_MAX, QUALITY_MIN,
};
use crate::params::Slope;
use nih_plug::prelude::*;
use nih_plug::wrapper::state::{ParamValue, PluginState};
use thiserror::Error;

const FLOAT_PARAMS: &[(&str, f32, f32)] = &[
    ("lowcut_freq", MIN_FREQUENCY, MAX_FREQUENCY),
    ("highcut_freq", MIN_FREQUENCY, MAX_FREQUENCY),
    ("peak_freq", MIN_FREQUENCY, MAX_FREQUENCY),
    ("peak_gain", GAIN_MIN_DB, GAIN_MAX_DB),
    ("peak_quality", QUALITY_MIN, QUALITY_MAX),
];
const SLOPE_PARAMS: &[&str] = &["lowcut_slope", "highcut_slope"];
const BOOL_PARAMS: &[&str] = &[
    "lowcut_bypassed",
    "peak_bypassed",
    "highcut_bypassed",
    "analyzer_enabled",
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    #[error("parameter `{id}` is {value}, outside {min}..={max}")]
    OutOfRange {
        id: String,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("parameter `{id}` is not a finite number")]
    NotFinite { id: String },
    #[error("`{value}` is not a known slope for parameter `{id}`")]
    UnknownSlope { id: String, value: String },
    #[error("parameter `{id}` has the wrong type")]
    WrongType { id: String },
}

/// Checks every known parameter in `state`. Unknown ids are left alone, the wrapper ignores them.
pub fn validate_state(state: &PluginState) -> Result<(), StateError> {
    for (id, value) in &state.params {
        let id = id.as_str();

        if let Some(&(_, min, max)) = FLOAT_PARAMS.iter().find(|(name, ..)| *name == id) {
            validate_float(id, value, min, max)?;
        } else if SLOPE_PARAMS.contains(&id) {
            validate_slope(id, value)?;
        } else if BOOL_PARAMS.contains(&id) && !matches!(value, ParamValue::Bool(_)) {
            return Err(StateError::WrongType { id: id.to_owned() });
        }
    }

    Ok(())
}

fn validate_float(id: &str, value: &ParamValue, min: f32, max: f32) -> Result<(), StateError> {
    let ParamValue::F32(value) = *value else {
        return Err(StateError::WrongType { id: id.to_owned() });
    };
    if !value.is_finite() {
        return Err(StateError::NotFinite { id: id.to_owned() });
    }
    if !(min..=max).contains(&value) {
        return Err(StateError::OutOfRange {
            id: id.to_owned(),
            value,
            min,
            max,
        });
    }

    Ok(())
}

/// Enum parameters are stored by their stable id, older trees may carry the variant index
fn validate_slope(id: &str, value: &ParamValue) -> Result<(), StateError> {
    let known = match value {
        ParamValue::String(name) => Slope::ids().is_some_and(|ids| ids.contains(&name.as_str())),
        ParamValue::I32(index) => {
            usize::try_from(*index).is_ok_and(|index| index < Slope::variants().len())
        }
        _ => return Err(StateError::WrongType { id: id.to_owned() }),
    };

    if known {
        Ok(())
    } else {
        let value = match value {
            ParamValue::String(name) => name.clone(),
            ParamValue::I32(index) => index.to_string(),
            _ => String::new(),
        };
        Err(StateError::UnknownSlope {
            id: id.to_owned(),
            value,
        })
    }
}

/// Empties a tree that fails validation so the wrapper applies nothing and the current values
/// and coefficients stay in place. [`validate_state`] is the fallible check behind it.
pub fn filter_state(state: &mut PluginState) {
    if let Err(err) = validate_state(state) {
        nih_warn!("Stored state not applied: {err}");
        state.params.clear();
        state.fields.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn stored_state() -> PluginState {
        let mut params = BTreeMap::new();
        params.insert(String::from("lowcut_freq"), ParamValue::F32(80.0));
        params.insert(String::from("highcut_freq"), ParamValue::F32(18000.0));
        params.insert(String::from("peak_freq"), ParamValue::F32(750.0));
        params.insert(String::from("peak_gain"), ParamValue::F32(6.0));
        params.insert(String::from("peak_quality"), ParamValue::F32(1.0));
        params.insert(
            String::from("lowcut_slope"),
            ParamValue::String(String::from("slope-24")),
        );
        params.insert(String::from("highcut_slope"), ParamValue::I32(3));
        params.insert(String::from("lowcut_bypassed"), ParamValue::Bool(false));
        params.insert(String::from("peak_bypassed"), ParamValue::Bool(false));
        params.insert(String::from("highcut_bypassed"), ParamValue::Bool(true));
        params.insert(String::from("analyzer_enabled"), ParamValue::Bool(true));

        PluginState {
            version: String::from("0.1.0"),
            params,
            fields: BTreeMap::new(),
        }
    }

    #[test]
    fn stored_tree_passes() {
        let mut state = stored_state();
        assert_eq!(validate_state(&state), Ok(()));
        filter_state(&mut state);
        assert_eq!(state.params.len(), 11);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut state = stored_state();
        state
            .params
            .insert(String::from("legacy_param"), ParamValue::String(String::from("x")));
        assert_eq!(validate_state(&state), Ok(()));
    }

    #[test]
    fn out_of_range_frequency_discards_the_tree() {
        let mut state = stored_state();
        state
            .params
            .insert(String::from("peak_freq"), ParamValue::F32(25000.0));
        state
            .fields
            .insert(String::from("editor"), String::from("{}"));

        let err = validate_state(&state).unwrap_err();
        filter_state(&mut state);
        assert_eq!(
            err,
            StateError::OutOfRange {
                id: String::from("peak_freq"),
                value: 25000.0,
                min: MIN_FREQUENCY,
                max: MAX_FREQUENCY,
            }
        );
        assert!(state.params.is_empty());
        assert!(state.fields.is_empty());
        assert_eq!(state.version, "0.1.0");
    }

    #[test]
    fn non_finite_gain_is_rejected() {
        let mut state = stored_state();
        state
            .params
            .insert(String::from("peak_gain"), ParamValue::F32(f32::NAN));
        assert_eq!(
            validate_state(&state),
            Err(StateError::NotFinite {
                id: String::from("peak_gain")
            })
        );
    }

    #[test]
    fn unknown_slopes_are_rejected() {
        let mut state = stored_state();
        state.params.insert(
            String::from("lowcut_slope"),
            ParamValue::String(String::from("slope-96")),
        );
        assert!(matches!(
            validate_state(&state),
            Err(StateError::UnknownSlope { .. })
        ));

        let mut state = stored_state();
        state
            .params
            .insert(String::from("highcut_slope"), ParamValue::I32(4));
        assert_eq!(
            validate_state(&state),
            Err(StateError::UnknownSlope {
                id: String::from("highcut_slope"),
                value: String::from("4"),
            })
        );
    }

    #[test]
    fn mistyped_values_are_rejected() {
        let mut state = stored_state();
        state
            .params
            .insert(String::from("peak_bypassed"), ParamValue::F32(1.0));
        assert_eq!(
            validate_state(&state),
            Err(StateError::WrongType {
                id: String::from("peak_bypassed")
            })
        );

        let mut state = stored_state();
        state
            .params
            .insert(String::from("peak_quality"), ParamValue::Bool(true));
        assert!(matches!(
            validate_state(&state),
            Err(StateError::WrongType { .. })
        ));
    }
}
