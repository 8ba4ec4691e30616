use crate::error::FitResult;
use crate::fit::{check_positive, CM_PER_METER};
use crate::types::BoundingBox;
use approx::relative_eq;
use geo::{Area, Rect};
use nalgebra as na;

/// Square the size of the printed marker, lying on the ground plane and
/// centred at the world origin.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerReference {
    plane: Rect<f64>,
}

impl MarkerReference {
    pub fn new(marker_size_cm: f64) -> FitResult<Self> {
        let half = check_positive("marker_size_cm", marker_size_cm)? / CM_PER_METER / 2.0;
        Ok(Self {
            plane: Rect::new((-half, -half), (half, half)),
        })
    }

    /// Side length in metres.
    pub fn side_m(&self) -> f64 {
        self.plane.width()
    }

    pub fn area_m2(&self) -> f64 {
        self.plane.unsigned_area()
    }

    /// Plane corners at z = 0, counter-clockwise from the (-x, -y) corner.
    pub fn corners(&self) -> [na::Point3<f64>; 4] {
        let (min, max) = (self.plane.min(), self.plane.max());
        [
            na::Point3::new(min.x, min.y, 0.0),
            na::Point3::new(max.x, min.y, 0.0),
            na::Point3::new(max.x, max.y, 0.0),
            na::Point3::new(min.x, max.y, 0.0),
        ]
    }

    /// Whether `bbox`, scaled by `scale`, fits on the marker in x and y.
    pub fn covers(&self, bbox: &BoundingBox, scale: f64) -> bool {
        let footprint = bbox.extents() * scale;
        let fits = |extent: f64, side: f64| {
            extent <= side || relative_eq!(extent, side, max_relative = 1e-9)
        };
        fits(footprint.x, self.plane.width()) && fits(footprint.y, self.plane.height())
    }
}
