//! Marker settings record and its JSON document.
//!
//! The document is a flat object with five keys:
//!
//! ```json
//! {
//!   "marker_size": 10.0,
//!   "marker_scale": 0.8,
//!   "model_scale": 1.0,
//!   "model_position": [0.0, 0.0, 0.0],
//!   "model_rotation": [0.0, 0.0, 0.0]
//! }
//! ```
//!
//! Import is tolerant per field: anything missing or unusable falls back to
//! its default and is reported in [`ImportedSettings::defaulted`]. Only text
//! that is not a JSON object at all is rejected.

use crate::error::{SettingsError, SettingsResult};
use approx::AbsDiffEq;
use nalgebra as na;
use serde_json::{json, Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// File name used when no explicit settings path is configured.
pub const DEFAULT_SETTINGS_FILE: &str = "mindar_settings.json";

pub const DEFAULT_MARKER_SIZE_CM: f64 = 10.0;
pub const DEFAULT_FIT_FRACTION: f64 = 0.8;
pub const DEFAULT_MODEL_SCALE: f64 = 1.0;

/// Largest fraction of the marker a model may be fitted to.
pub const MAX_FIT_FRACTION: f64 = 2.0;

/// Placement of a model relative to its marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSettings {
    /// Printed marker side in centimetres.
    pub marker_size_cm: f64,
    /// Share of the marker side the model's largest dimension should cover.
    pub fit_fraction: f64,
    pub model_scale: f64,
    /// Offset in metres.
    pub model_position: na::Vector3<f64>,
    /// XYZ Euler angles in degrees.
    pub model_rotation_deg: na::Vector3<f64>,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            marker_size_cm: DEFAULT_MARKER_SIZE_CM,
            fit_fraction: DEFAULT_FIT_FRACTION,
            model_scale: DEFAULT_MODEL_SCALE,
            model_position: na::Vector3::zeros(),
            model_rotation_deg: na::Vector3::zeros(),
        }
    }
}

impl MarkerSettings {
    pub fn rotation(&self) -> na::UnitQuaternion<f64> {
        let r = self.model_rotation_deg.map(f64::to_radians);
        na::UnitQuaternion::from_euler_angles(r.x, r.y, r.z)
    }

    /// Transform handed to the scene host: uniform scale, then rotation, then
    /// translation. `None` if `model_scale` is not a usable scale.
    pub fn model_transform(&self) -> Option<na::Similarity3<f64>> {
        if !SettingsField::ModelScale.accepts(self.model_scale) {
            return None;
        }
        Some(na::Similarity3::from_parts(
            na::Translation3::from(self.model_position),
            self.rotation(),
            self.model_scale,
        ))
    }

    pub fn is_valid(&self) -> bool {
        SettingsField::MarkerSize.accepts(self.marker_size_cm)
            && SettingsField::MarkerScale.accepts(self.fit_fraction)
            && SettingsField::ModelScale.accepts(self.model_scale)
            && self.model_position.iter().all(|c| c.is_finite())
            && self.model_rotation_deg.iter().all(|c| c.is_finite())
    }
}

impl AbsDiffEq for MarkerSettings {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.marker_size_cm.abs_diff_eq(&other.marker_size_cm, epsilon)
            && self.fit_fraction.abs_diff_eq(&other.fit_fraction, epsilon)
            && self.model_scale.abs_diff_eq(&other.model_scale, epsilon)
            && self.model_position.abs_diff_eq(&other.model_position, epsilon)
            && self
                .model_rotation_deg
                .abs_diff_eq(&other.model_rotation_deg, epsilon)
    }
}

/// Keys of the settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsField {
    MarkerSize,
    MarkerScale,
    ModelScale,
    ModelPosition,
    ModelRotation,
}

impl SettingsField {
    pub const ALL: [SettingsField; 5] = [
        SettingsField::MarkerSize,
        SettingsField::MarkerScale,
        SettingsField::ModelScale,
        SettingsField::ModelPosition,
        SettingsField::ModelRotation,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SettingsField::MarkerSize => "marker_size",
            SettingsField::MarkerScale => "marker_scale",
            SettingsField::ModelScale => "model_scale",
            SettingsField::ModelPosition => "model_position",
            SettingsField::ModelRotation => "model_rotation",
        }
    }

    fn accepts(self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self {
            SettingsField::MarkerSize | SettingsField::ModelScale => value > 0.0,
            SettingsField::MarkerScale => value > 0.0 && value <= MAX_FIT_FRACTION,
            SettingsField::ModelPosition | SettingsField::ModelRotation => true,
        }
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Settings read from a document, with the fields that fell back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSettings {
    pub settings: MarkerSettings,
    pub defaulted: Vec<SettingsField>,
}

impl ImportedSettings {
    pub fn is_complete(&self) -> bool {
        self.defaulted.is_empty()
    }
}

/// Render `settings` as a pretty-printed JSON document.
pub fn serialize(settings: &MarkerSettings) -> String {
    let vector = |v: &na::Vector3<f64>| json!([v.x, v.y, v.z]);
    let document = json!({
        SettingsField::MarkerSize.key(): settings.marker_size_cm,
        SettingsField::MarkerScale.key(): settings.fit_fraction,
        SettingsField::ModelScale.key(): settings.model_scale,
        SettingsField::ModelPosition.key(): vector(&settings.model_position),
        SettingsField::ModelRotation.key(): vector(&settings.model_rotation_deg),
    });
    format!("{document:#}")
}

/// Parse a settings document, substituting defaults field by field.
pub fn deserialize(text: &str) -> SettingsResult<ImportedSettings> {
    let document: Value =
        serde_json::from_str(text).map_err(|err| SettingsError::malformed(err.to_string()))?;
    let map = match document {
        Value::Object(map) => map,
        other => {
            return Err(SettingsError::malformed(format!(
                "expected an object at top level, found {}",
                value_kind(&other)
            )))
        }
    };

    for key in map.keys() {
        if !SettingsField::ALL.iter().any(|field| field.key() == key.as_str()) {
            log::debug!("Ignoring unknown settings key '{key}'");
        }
    }

    let defaults = MarkerSettings::default();
    let mut reader = FieldReader {
        map: &map,
        defaulted: Vec::new(),
    };
    let settings = MarkerSettings {
        marker_size_cm: reader.scalar(SettingsField::MarkerSize, defaults.marker_size_cm),
        fit_fraction: reader.scalar(SettingsField::MarkerScale, defaults.fit_fraction),
        model_scale: reader.scalar(SettingsField::ModelScale, defaults.model_scale),
        model_position: reader.vector(SettingsField::ModelPosition, defaults.model_position),
        model_rotation_deg: reader.vector(SettingsField::ModelRotation, defaults.model_rotation_deg),
    };

    Ok(ImportedSettings {
        settings,
        defaulted: reader.defaulted,
    })
}

struct FieldReader<'a> {
    map: &'a Map<String, Value>,
    defaulted: Vec<SettingsField>,
}

impl<'a> FieldReader<'a> {
    fn scalar(&mut self, field: SettingsField, default: f64) -> f64 {
        let parsed = self.lookup(field).map(|value| {
            value
                .as_f64()
                .filter(|v| field.accepts(*v))
                .ok_or(value)
        });
        self.resolve(field, parsed, default)
    }

    fn vector(&mut self, field: SettingsField, default: na::Vector3<f64>) -> na::Vector3<f64> {
        let parsed = self.lookup(field).map(|value| {
            value
                .as_array()
                .filter(|items| items.len() == 3)
                .and_then(|items| {
                    items
                        .iter()
                        .map(|item| item.as_f64().filter(|v| field.accepts(*v)))
                        .collect::<Option<Vec<f64>>>()
                })
                .map(|xyz| na::Vector3::new(xyz[0], xyz[1], xyz[2]))
                .ok_or(value)
        });
        self.resolve(field, parsed, default)
    }

    fn lookup(&self, field: SettingsField) -> Option<&'a Value> {
        self.map.get(field.key())
    }

    fn resolve<T>(
        &mut self,
        field: SettingsField,
        parsed: Option<Result<T, &Value>>,
        default: T,
    ) -> T {
        match parsed {
            Some(Ok(value)) => value,
            Some(Err(raw)) => {
                log::warn!("Settings field '{field}' has unusable value {raw}, using default");
                self.defaulted.push(field);
                default
            }
            None => {
                log::debug!("Settings field '{field}' is missing, using default");
                self.defaulted.push(field);
                default
            }
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Path to use for import/export: the explicit one if set, otherwise
/// [`DEFAULT_SETTINGS_FILE`] inside `project_dir`.
pub fn resolve_settings_path(explicit: Option<&Path>, project_dir: &Path) -> PathBuf {
    match explicit {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => project_dir.join(DEFAULT_SETTINGS_FILE),
    }
}

/// Write `settings` to `path`, creating missing parent directories.
pub fn export_settings(settings: &MarkerSettings, path: impl AsRef<Path>) -> SettingsResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| SettingsError::io(parent, err))?;
    }
    fs::write(path, serialize(settings)).map_err(|err| SettingsError::io(path, err))?;
    log::info!("Settings exported to {}", path.display());
    Ok(())
}

/// Read and parse the settings document at `path`.
pub fn import_settings(path: impl AsRef<Path>) -> SettingsResult<ImportedSettings> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|err| SettingsError::io(path, err))?;
    let imported = deserialize(&text)?;
    log::info!("Settings imported from {}", path.display());
    Ok(imported)
}
