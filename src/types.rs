use crate::error::{FitError, FitResult};
use itertools::Itertools;
use nalgebra as na;
use noisy_float::prelude::*;
use std::borrow::Borrow;

const AXES: [char; 3] = ['x', 'y', 'z'];

/// Axis-aligned box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: na::Point3<f64>,
    pub max: na::Point3<f64>,
}

impl BoundingBox {
    /// Build the box from explicit corners. Zero extent on any axis is allowed.
    pub fn from_corners(min: na::Point3<f64>, max: na::Point3<f64>) -> FitResult<Self> {
        for (index, corner) in [min, max].iter().enumerate() {
            if !corner.iter().all(|c| c.is_finite()) {
                return Err(FitError::NonFiniteCoordinate { index });
            }
        }
        for (axis, name) in AXES.iter().enumerate() {
            if min[axis] > max[axis] {
                return Err(FitError::InvertedBounds { axis: *name });
            }
        }
        Ok(Self { min, max })
    }

    /// Smallest box containing every world-space point.
    pub fn from_points(
        points: impl IntoIterator<Item = impl Borrow<na::Point3<f64>>>,
    ) -> FitResult<Self> {
        let points: Vec<[R64; 3]> = points
            .into_iter()
            .enumerate()
            .map(|(index, point)| {
                let point = *point.borrow();
                match [point.x, point.y, point.z].map(R64::try_new) {
                    [Some(x), Some(y), Some(z)] => Ok([x, y, z]),
                    _ => Err(FitError::NonFiniteCoordinate { index }),
                }
            })
            .collect::<FitResult<_>>()?;

        let mut min = na::Point3::origin();
        let mut max = na::Point3::origin();
        for axis in 0..3 {
            let (lo, hi) = points
                .iter()
                .map(|p| p[axis])
                .minmax()
                .into_option()
                .ok_or(FitError::EmptyPointSet)?;
            min[axis] = lo.raw();
            max[axis] = hi.raw();
        }

        Ok(Self { min, max })
    }

    /// Size along x, y and z.
    pub fn extents(&self) -> na::Vector3<f64> {
        self.max - self.min
    }

    pub fn max_dimension(&self) -> f64 {
        self.extents().max()
    }

    pub fn center(&self) -> na::Point3<f64> {
        na::center(&self.min, &self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cuboid(x: f64, y: f64, z: f64) -> Vec<na::Point3<f64>> {
        [0.0, x]
            .into_iter()
            .cartesian_product([0.0, y])
            .cartesian_product([0.0, z])
            .map(|((x, y), z)| na::Point3::new(x, y, z))
            .collect()
    }

    #[test]
    fn test_from_points_cuboid() {
        let bbox = BoundingBox::from_points(cuboid(2.0, 1.0, 0.5)).unwrap();
        assert_eq!(bbox.min, na::Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bbox.max, na::Point3::new(2.0, 1.0, 0.5));
        assert_relative_eq!(bbox.max_dimension(), 2.0);
        assert_relative_eq!(bbox.center(), na::Point3::new(1.0, 0.5, 0.25));
    }

    #[test]
    fn test_from_points_accepts_references() {
        let points = cuboid(1.0, 3.0, 1.0);
        let bbox = BoundingBox::from_points(&points).unwrap();
        assert_relative_eq!(bbox.extents(), na::Vector3::new(1.0, 3.0, 1.0));
    }

    #[test]
    fn test_from_points_unordered_negative_coordinates() {
        let points = [
            na::Point3::new(1.0, -4.0, 2.0),
            na::Point3::new(-3.0, 2.0, 0.0),
            na::Point3::new(0.5, 0.0, -1.0),
        ];
        let bbox = BoundingBox::from_points(points).unwrap();
        assert_eq!(bbox.min, na::Point3::new(-3.0, -4.0, -1.0));
        assert_eq!(bbox.max, na::Point3::new(1.0, 2.0, 2.0));
        assert_relative_eq!(bbox.max_dimension(), 6.0);
    }

    #[test]
    fn test_single_point_is_zero_extent() {
        let bbox = BoundingBox::from_points([na::Point3::new(1.0, 2.0, 3.0)]).unwrap();
        assert_eq!(bbox.extents(), na::Vector3::zeros());
        assert_eq!(bbox.max_dimension(), 0.0);
    }

    #[test]
    fn test_empty_point_set() {
        let points: Vec<na::Point3<f64>> = vec![];
        assert_eq!(
            BoundingBox::from_points(points),
            Err(FitError::EmptyPointSet)
        );
    }

    #[test]
    fn test_non_finite_point() {
        let points = [
            na::Point3::new(0.0, 0.0, 0.0),
            na::Point3::new(1.0, f64::NAN, 0.0),
        ];
        assert_eq!(
            BoundingBox::from_points(points),
            Err(FitError::NonFiniteCoordinate { index: 1 })
        );

        let points = [na::Point3::new(f64::INFINITY, 0.0, 0.0)];
        assert_eq!(
            BoundingBox::from_points(points),
            Err(FitError::NonFiniteCoordinate { index: 0 })
        );
    }

    #[test]
    fn test_from_corners_rejects_inverted_axis() {
        let result = BoundingBox::from_corners(
            na::Point3::new(0.0, 2.0, 0.0),
            na::Point3::new(1.0, 1.0, 1.0),
        );
        assert_eq!(result, Err(FitError::InvertedBounds { axis: 'y' }));
    }

    #[test]
    fn test_from_corners_allows_flat_box() {
        let bbox = BoundingBox::from_corners(
            na::Point3::new(0.0, 0.0, 0.0),
            na::Point3::new(1.0, 1.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(bbox.max_dimension(), 1.0);
    }
}
