//! End-to-end checks: measure, fit, export and re-import.

use approx::assert_relative_eq;
use marker_fit::nalgebra as na;
use marker_fit::{
    compute_fit_scale, deserialize, export_settings, fit_objects, import_settings, serialize,
    BoundingBox, FitError, MarkerSettings, SettingsError, SettingsField,
};
use std::fs;

/// The eight corners of a box, in the order a scene host reports them.
fn corners(min: [f64; 3], max: [f64; 3]) -> Vec<na::Point3<f64>> {
    let mut points = Vec::with_capacity(8);
    for x in [min[0], max[0]] {
        for y in [min[1], max[1]] {
            for z in [min[2], max[2]] {
                points.push(na::Point3::new(x, y, z));
            }
        }
    }
    points
}

#[test]
fn test_scale_two_by_one_by_one_model() {
    let bbox = BoundingBox::from_points(corners([0.0, 0.0, 0.0], [2.0, 1.0, 1.0])).unwrap();
    assert_relative_eq!(bbox.max_dimension(), 2.0, max_relative = 1e-12);

    let scale = compute_fit_scale(&bbox, 10.0, 0.8).unwrap();
    assert_relative_eq!(scale, 0.04, max_relative = 1e-12);
}

#[test]
fn test_world_space_offset_does_not_matter() {
    let origin = BoundingBox::from_points(corners([0.0, 0.0, 0.0], [0.3, 0.2, 0.1])).unwrap();
    let moved =
        BoundingBox::from_points(corners([-5.0, 12.0, 3.0], [-4.7, 12.2, 3.1])).unwrap();
    assert_relative_eq!(
        compute_fit_scale(&origin, 12.0, 0.5).unwrap(),
        compute_fit_scale(&moved, 12.0, 0.5).unwrap(),
        max_relative = 1e-9
    );
}

#[test]
fn test_collapsed_mesh_is_rejected() {
    let bbox = BoundingBox::from_points(corners([1.0, 1.0, 1.0], [1.0, 1.0, 1.0])).unwrap();
    let result = compute_fit_scale(&bbox, 10.0, 0.8);
    assert!(matches!(result, Err(FitError::DegenerateGeometry { .. })));
}

#[test]
fn test_export_then_import_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mindar_settings.json");
    let settings = MarkerSettings {
        marker_size_cm: 15.0,
        fit_fraction: 1.0,
        model_scale: 2.0,
        model_position: na::Vector3::new(1.0, 2.0, 3.0),
        model_rotation_deg: na::Vector3::new(0.0, 90.0, 0.0),
    };

    export_settings(&settings, &path).unwrap();
    let imported = import_settings(&path).unwrap();
    assert_eq!(imported.settings, settings);
    assert!(imported.defaulted.is_empty());
}

#[test]
fn test_export_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenes").join("ring").join("placement.json");

    export_settings(&MarkerSettings::default(), &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, serialize(&MarkerSettings::default()));
}

#[test]
fn test_import_hand_edited_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    fs::write(&path, r#"{ "marker_size": 20.0 }"#).unwrap();

    let imported = import_settings(&path).unwrap();
    assert_eq!(imported.settings.marker_size_cm, 20.0);
    assert_eq!(imported.settings.fit_fraction, 0.8);
    assert_eq!(imported.settings.model_scale, 1.0);
    assert_eq!(imported.defaulted.len(), 4);
    assert!(!imported.defaulted.contains(&SettingsField::MarkerSize));
}

#[test]
fn test_import_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    match import_settings(&path) {
        Err(SettingsError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected I/O error, got {other:?}"),
    }
}

#[test]
fn test_import_garbage_keeps_caller_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "not json").unwrap();

    let current = MarkerSettings {
        model_scale: 0.25,
        ..MarkerSettings::default()
    };
    let settings = match import_settings(&path) {
        Ok(imported) => imported.settings,
        Err(SettingsError::MalformedDocument { .. }) => current,
        Err(err) => panic!("unexpected error: {err}"),
    };
    assert_eq!(settings, current);
}

#[test]
fn test_fit_batch_then_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mindar_settings.json");

    let mut settings = MarkerSettings {
        marker_size_cm: 20.0,
        fit_fraction: 0.5,
        ..MarkerSettings::default()
    };
    let outcomes = fit_objects(
        [
            ("statue", corners([0.0, 0.0, 0.0], [0.5, 0.5, 2.0])),
            ("decal", corners([0.0, 0.0, 0.0], [0.0, 0.0, 0.0])),
        ],
        &mut settings,
    );
    assert_relative_eq!(outcomes[0].scale().unwrap(), 0.05, max_relative = 1e-12);
    assert!(outcomes[1].scale().is_none());
    assert_relative_eq!(settings.model_scale, 0.05, max_relative = 1e-12);

    export_settings(&settings, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let reread = deserialize(&text).unwrap();
    assert_eq!(reread.settings, settings);
}
