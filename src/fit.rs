//! Uniform scale that makes a model's largest dimension occupy a fraction of
//! the printed marker.

use crate::error::{FitError, FitResult};
use crate::settings::{MarkerSettings, MAX_FIT_FRACTION};
use crate::types::BoundingBox;
use nalgebra as na;
use std::borrow::Borrow;
use std::fmt::Display;

/// Marker sizes are entered in centimetres, scene units are metres.
pub const CM_PER_METER: f64 = 100.0;

pub(crate) fn check_positive(name: &'static str, value: f64) -> FitResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FitError::InvalidParameter { name, value })
    }
}

/// Length in metres the model's largest dimension should have after fitting.
///
/// `fit_fraction` must lie in `(0, MAX_FIT_FRACTION]`.
pub fn target_size_m(marker_size_cm: f64, fit_fraction: f64) -> FitResult<f64> {
    let marker_size_cm = check_positive("marker_size_cm", marker_size_cm)?;
    let fit_fraction = check_positive("fit_fraction", fit_fraction)?;
    if fit_fraction > MAX_FIT_FRACTION {
        return Err(FitError::InvalidParameter {
            name: "fit_fraction",
            value: fit_fraction,
        });
    }
    Ok(marker_size_cm / CM_PER_METER * fit_fraction)
}

/// Isotropic scale factor so that the largest extent of `bbox` equals
/// `fit_fraction` of the marker side.
///
/// Fails with [`FitError::DegenerateGeometry`] when the box has no measurable
/// extent, and with [`FitError::ScaleOutOfRange`] when the extent is so small
/// or so large that the factor is not a finite positive number. Either way the
/// caller should skip the object instead of applying the factor.
pub fn compute_fit_scale(
    bbox: &BoundingBox,
    marker_size_cm: f64,
    fit_fraction: f64,
) -> FitResult<f64> {
    let target_size = target_size_m(marker_size_cm, fit_fraction)?;
    let max_dimension = bbox.max_dimension();
    if !(max_dimension.is_finite() && max_dimension > 0.0) {
        return Err(FitError::DegenerateGeometry { max_dimension });
    }
    let scale = target_size / max_dimension;
    if !(scale.is_finite() && scale > 0.0) {
        return Err(FitError::ScaleOutOfRange {
            max_dimension,
            scale,
        });
    }
    Ok(scale)
}

/// Result of fitting one object of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome<K> {
    pub object: K,
    pub result: FitResult<f64>,
}

impl<K> FitOutcome<K> {
    pub fn scale(&self) -> Option<f64> {
        self.result.as_ref().ok().copied()
    }
}

/// Fit every object against the marker described by `settings`.
///
/// Objects are independent: a failure is logged and recorded, and the batch
/// moves on. `settings.model_scale` ends up holding the scale of the last
/// object that fitted; no other field is touched.
pub fn fit_objects<K, P>(
    objects: impl IntoIterator<Item = (K, P)>,
    settings: &mut MarkerSettings,
) -> Vec<FitOutcome<K>>
where
    K: Display,
    P: IntoIterator,
    P::Item: Borrow<na::Point3<f64>>,
{
    let outcomes: Vec<FitOutcome<K>> = objects
        .into_iter()
        .map(|(object, points)| {
            let result = BoundingBox::from_points(points).and_then(|bbox| {
                compute_fit_scale(&bbox, settings.marker_size_cm, settings.fit_fraction)
            });
            match &result {
                Ok(scale) => log::info!("Scaled {object} by factor {scale:.3}"),
                Err(err) => log::warn!("Skipped {object}: {err}"),
            }
            FitOutcome { object, result }
        })
        .collect();

    if let Some(scale) = outcomes.iter().rev().find_map(FitOutcome::scale) {
        settings.model_scale = scale;
    }
    outcomes
}

impl MarkerSettings {
    /// Fit one box using this record's marker size and fraction, storing the
    /// resulting scale in `model_scale`.
    pub fn fit_to(&mut self, bbox: &BoundingBox) -> FitResult<f64> {
        let scale = compute_fit_scale(bbox, self.marker_size_cm, self.fit_fraction)?;
        self.model_scale = scale;
        Ok(scale)
    }
}
