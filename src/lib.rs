//! Size a 3D model to a printed AR marker and persist its placement.
//!
//! The scene host supplies the world-space corners of each object; this crate
//! turns them into a [`BoundingBox`], computes the uniform scale that makes the
//! largest dimension cover a fraction of the marker, and reads/writes the
//! resulting [`MarkerSettings`] as JSON.

mod error;
mod fit;
mod marker;
mod settings;
mod types;

pub use crate::error::{FitError, FitResult, SettingsError, SettingsResult};
pub use crate::fit::{compute_fit_scale, fit_objects, target_size_m, FitOutcome, CM_PER_METER};
pub use crate::marker::MarkerReference;
pub use crate::settings::{
    deserialize, export_settings, import_settings, resolve_settings_path, serialize,
    ImportedSettings, MarkerSettings, SettingsField, DEFAULT_FIT_FRACTION, DEFAULT_MARKER_SIZE_CM,
    DEFAULT_MODEL_SCALE, DEFAULT_SETTINGS_FILE, MAX_FIT_FRACTION,
};
pub use crate::types::BoundingBox;
pub use nalgebra;
