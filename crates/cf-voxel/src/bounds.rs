//! Axis-aligned bounding box supplying the spatial extent of a voxel grid.

use std::fmt;

use nalgebra::{Point3, Vector3};

/// An axis-aligned bounding box in world coordinates.
///
/// # Example
///
/// ```
/// use cf_voxel::Aabb;
/// use nalgebra::Point3;
///
/// let aabb = Aabb::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(10.0, 20.0, 30.0),
/// );
///
/// assert!(aabb.contains(&Point3::new(5.0, 5.0, 5.0)));
/// assert!(!aabb.contains(&Point3::new(15.0, 5.0, 40.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3<f64>,
    /// Maximum corner of the bounding box.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Creates a new AABB from two opposite corners.
    ///
    /// The corners are reordered per axis so that `min <= max`.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let aabb = Aabb::new(
    ///     Point3::new(10.0, 0.0, 10.0),
    ///     Point3::new(0.0, 10.0, 0.0),
    /// );
    /// assert_eq!(aabb.min, Point3::new(0.0, 0.0, 0.0));
    /// assert_eq!(aabb.max, Point3::new(10.0, 10.0, 10.0));
    /// ```
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Replaces both corners, reordering them like [`Aabb::new`].
    pub fn update(&mut self, a: Point3<f64>, b: Point3<f64>) {
        *self = Self::new(a, b);
    }

    /// Returns the full size (extent per axis) of the box.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Checks if a point is inside the box. Points on the boundary are inside.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Returns `true` if every extent is finite and strictly positive.
    #[must_use]
    pub fn has_volume(&self) -> bool {
        let size = self.size();
        size.iter().all(|s| s.is_finite() && *s > 0.0)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::origin())
    }
}

impl fmt::Display for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}) => ({}, {}, {})",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_new_auto_order() {
        let aabb = Aabb::new(Point3::new(5.0, -1.0, 2.0), Point3::new(-5.0, 1.0, 0.0));
        assert_eq!(aabb.min, Point3::new(-5.0, -1.0, 0.0));
        assert_eq!(aabb.max, Point3::new(5.0, 1.0, 2.0));
    }

    #[test]
    fn test_aabb_update() {
        let mut aabb = Aabb::default();
        aabb.update(Point3::new(1.0, 2.0, 3.0), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.min, Point3::origin());
        assert_eq!(aabb.max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_aabb_size() {
        let aabb = Aabb::new(Point3::new(-1.0, 0.0, 0.5), Point3::new(1.0, 4.0, 1.0));
        let size = aabb.size();
        assert_relative_eq!(size.x, 2.0);
        assert_relative_eq!(size.y, 4.0);
        assert_relative_eq!(size.z, 0.5);
    }

    #[test]
    fn test_aabb_contains_boundary() {
        let aabb = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert!(aabb.contains(&Point3::origin()));
        assert!(aabb.contains(&Point3::new(1.0, 1.0, 1.0)));
        assert!(!aabb.contains(&Point3::new(1.0, 1.0, 1.1)));
    }

    #[test]
    fn test_aabb_has_volume() {
        assert!(!Aabb::default().has_volume());
        assert!(Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).has_volume());
        assert!(!Aabb::new(Point3::origin(), Point3::new(1.0, 0.0, 1.0)).has_volume());
        assert!(!Aabb::new(Point3::origin(), Point3::new(f64::INFINITY, 1.0, 1.0)).has_volume());
    }

    #[test]
    fn test_aabb_display() {
        let aabb = Aabb::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(format!("{aabb}"), "(0, 0, 0) => (1, 2, 3)");
    }
}
