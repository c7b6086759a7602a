//! Regular grid over a bounding box: coordinate to voxel id conversion.

use std::fmt;

use nalgebra::{Point3, Vector3};
use tracing::warn;

use crate::bounds::Aabb;
use crate::constants::{INVALID_DOUBLE, INVALID_SIZE, INVALID_VOXEL_ID, VoxelId};
use crate::error::{VoxelError, VoxelResult};

const AXES: [char; 3] = ['x', 'y', 'z'];

/// Describes a regular voxel grid spanning a bounding box.
///
/// Voxel ids flatten `(ix, iy, iz)` row-major with x varying fastest:
/// `id = ix + iy * nx + iz * nx * ny`.
///
/// A grid is valid once it has a non-zero count on every axis and a finite,
/// strictly positive extent on every axis. Queries on an invalid grid, or
/// for points and ids off the grid, return the sentinels in
/// [`constants`](crate::constants).
///
/// # Example
///
/// ```
/// use cf_voxel::{Aabb, VoxelMeta};
/// use nalgebra::Point3;
///
/// let bounds = Aabb::new(Point3::origin(), Point3::new(10.0, 10.0, 10.0));
/// let meta = VoxelMeta::try_new(bounds, 10, 10, 10)?;
///
/// let id = meta.id(5.5, 5.5, 5.5);
/// assert_eq!(meta.id_to_xyz_index(id), (5, 5, 5));
/// assert_eq!(meta.shift(id, 1, 0, 0), meta.id(6.5, 5.5, 5.5));
/// assert_eq!(meta.id(10.0, 5.0, 5.0), meta.invalid_voxel_id());
/// # Ok::<(), cf_voxel::VoxelError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "VoxelMetaRepr", into = "VoxelMetaRepr")
)]
pub struct VoxelMeta {
    bounds: Aabb,
    num_voxels: [usize; 3],
    voxel_size: Vector3<f64>,
    num_elements: VoxelId,
    valid: bool,
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct VoxelMetaRepr {
    bounds: Aabb,
    num_voxels: [usize; 3],
}

#[cfg(feature = "serde")]
impl From<VoxelMetaRepr> for VoxelMeta {
    fn from(repr: VoxelMetaRepr) -> Self {
        let [x, y, z] = repr.num_voxels;
        let mut meta = Self::new();
        meta.bounds = repr.bounds;
        meta.update(x, y, z);
        meta
    }
}

#[cfg(feature = "serde")]
impl From<VoxelMeta> for VoxelMetaRepr {
    fn from(meta: VoxelMeta) -> Self {
        Self {
            bounds: meta.bounds,
            num_voxels: meta.num_voxels,
        }
    }
}

impl VoxelMeta {
    /// Creates a cleared, invalid grid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bounds: Aabb::default(),
            num_voxels: [0; 3],
            voxel_size: Vector3::zeros(),
            num_elements: 0,
            valid: false,
        }
    }

    /// Creates a grid over `bounds` with the given voxel counts.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::InvalidDimensions`] if any count is zero, or
    /// [`VoxelError::InvalidExtent`] if any axis has a non-finite or
    /// non-positive extent.
    pub fn try_new(bounds: Aabb, xnum: usize, ynum: usize, znum: usize) -> VoxelResult<Self> {
        if xnum == 0 || ynum == 0 || znum == 0 {
            return Err(VoxelError::InvalidDimensions {
                x: xnum,
                y: ynum,
                z: znum,
            });
        }
        let size = bounds.size();
        for axis in 0..3 {
            if !(size[axis].is_finite() && size[axis] > 0.0) {
                return Err(VoxelError::InvalidExtent {
                    axis: AXES[axis],
                    min: bounds.min[axis],
                    max: bounds.max[axis],
                });
            }
        }

        let mut meta = Self::new();
        meta.bounds = bounds;
        meta.update(xnum, ynum, znum);
        if !meta.valid {
            // Counts whose product overflows the id space.
            return Err(VoxelError::InvalidDimensions {
                x: xnum,
                y: ynum,
                z: znum,
            });
        }
        Ok(meta)
    }

    /// Sets the extent, then recomputes the grid for the given counts.
    pub fn set(&mut self, min: Point3<f64>, max: Point3<f64>, xnum: usize, ynum: usize, znum: usize) {
        self.bounds.update(min, max);
        self.update(xnum, ynum, znum);
    }

    /// Recomputes voxel sizes and the total voxel count for new counts.
    ///
    /// Leaves the grid invalid, with zero voxel sizes, if the counts or the
    /// current extent cannot describe a grid.
    #[allow(clippy::cast_precision_loss)]
    pub fn update(&mut self, xnum: usize, ynum: usize, znum: usize) {
        self.num_voxels = [xnum, ynum, znum];
        let num_elements = (xnum as VoxelId)
            .checked_mul(ynum as VoxelId)
            .and_then(|n| n.checked_mul(znum as VoxelId))
            .filter(|&n| n > 0 && n < INVALID_VOXEL_ID);

        match num_elements {
            Some(n) if self.bounds.has_volume() => {
                let counts = Vector3::new(xnum as f64, ynum as f64, znum as f64);
                self.voxel_size = self.bounds.size().component_div(&counts);
                self.num_elements = n;
                self.valid = true;
            }
            _ => {
                warn!(
                    xnum,
                    ynum,
                    znum,
                    bounds = %self.bounds,
                    "Voxel grid parameters do not describe a valid grid"
                );
                self.voxel_size = Vector3::zeros();
                self.num_elements = 0;
                self.valid = false;
            }
        }
    }

    /// Resets to the cleared, invalid state.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Returns `true` once consistent parameters are set.
    #[must_use]
    pub const fn valid(&self) -> bool {
        self.valid
    }

    /// Returns the bounding box.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Lower x edge.
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.bounds.min.x
    }

    /// Lower y edge.
    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.bounds.min.y
    }

    /// Lower z edge.
    #[must_use]
    pub fn min_z(&self) -> f64 {
        self.bounds.min.z
    }

    /// Upper x edge.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.bounds.max.x
    }

    /// Upper y edge.
    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.bounds.max.y
    }

    /// Upper z edge.
    #[must_use]
    pub fn max_z(&self) -> f64 {
        self.bounds.max.z
    }

    /// Voxel count along x.
    #[must_use]
    pub const fn num_voxel_x(&self) -> usize {
        self.num_voxels[0]
    }

    /// Voxel count along y.
    #[must_use]
    pub const fn num_voxel_y(&self) -> usize {
        self.num_voxels[1]
    }

    /// Voxel count along z.
    #[must_use]
    pub const fn num_voxel_z(&self) -> usize {
        self.num_voxels[2]
    }

    /// Voxel edge length along x.
    #[must_use]
    pub fn size_voxel_x(&self) -> f64 {
        self.voxel_size.x
    }

    /// Voxel edge length along y.
    #[must_use]
    pub fn size_voxel_y(&self) -> f64 {
        self.voxel_size.y
    }

    /// Voxel edge length along z.
    #[must_use]
    pub fn size_voxel_z(&self) -> f64 {
        self.voxel_size.z
    }

    /// Total number of voxels in the grid. Zero when invalid.
    #[must_use]
    pub const fn size(&self) -> VoxelId {
        self.num_elements
    }

    /// Returns [`INVALID_VOXEL_ID`].
    #[must_use]
    pub const fn invalid_voxel_id(&self) -> VoxelId {
        INVALID_VOXEL_ID
    }

    /// Returns the id of the voxel containing `(x, y, z)`.
    ///
    /// The lower edge of each axis is inside the grid and the upper edge is
    /// not. Returns [`INVALID_VOXEL_ID`] for points off the grid, NaN
    /// coordinates, or an invalid grid.
    #[must_use]
    pub fn id(&self, x: f64, y: f64, z: f64) -> VoxelId {
        if !self.valid {
            return INVALID_VOXEL_ID;
        }
        match (self.axis_index(0, x), self.axis_index(1, y), self.axis_index(2, z)) {
            (Some(ix), Some(iy), Some(iz)) => self.index(ix, iy, iz),
            _ => INVALID_VOXEL_ID,
        }
    }

    /// Returns the id of the voxel containing `point`.
    #[must_use]
    pub fn id_at(&self, point: &Point3<f64>) -> VoxelId {
        self.id(point.x, point.y, point.z)
    }

    /// Flattens per-axis indices into a voxel id.
    ///
    /// Returns [`INVALID_VOXEL_ID`] if any index is out of range.
    #[must_use]
    pub fn index(&self, ix: usize, iy: usize, iz: usize) -> VoxelId {
        let [nx, ny, nz] = self.num_voxels;
        if !self.valid || ix >= nx || iy >= ny || iz >= nz {
            return INVALID_VOXEL_ID;
        }
        let (nx, ny) = (nx as VoxelId, ny as VoxelId);
        ix as VoxelId + iy as VoxelId * nx + iz as VoxelId * nx * ny
    }

    /// X index of voxel `id`, or [`INVALID_SIZE`] if `id` is off the grid.
    #[must_use]
    pub fn id_to_x_index(&self, id: VoxelId) -> usize {
        self.id_to_xyz_index(id).0
    }

    /// Y index of voxel `id`, or [`INVALID_SIZE`] if `id` is off the grid.
    #[must_use]
    pub fn id_to_y_index(&self, id: VoxelId) -> usize {
        self.id_to_xyz_index(id).1
    }

    /// Z index of voxel `id`, or [`INVALID_SIZE`] if `id` is off the grid.
    #[must_use]
    pub fn id_to_z_index(&self, id: VoxelId) -> usize {
        self.id_to_xyz_index(id).2
    }

    /// Per-axis indices of voxel `id`.
    ///
    /// All three are [`INVALID_SIZE`] if `id` is off the grid.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel::{Aabb, VoxelMeta, INVALID_SIZE};
    /// use nalgebra::Point3;
    ///
    /// let bounds = Aabb::new(Point3::origin(), Point3::new(4.0, 3.0, 2.0));
    /// let meta = VoxelMeta::try_new(bounds, 4, 3, 2)?;
    ///
    /// assert_eq!(meta.id_to_xyz_index(meta.index(3, 1, 1)), (3, 1, 1));
    /// assert_eq!(meta.id_to_xyz_index(24), (INVALID_SIZE, INVALID_SIZE, INVALID_SIZE));
    /// # Ok::<(), cf_voxel::VoxelError>(())
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn id_to_xyz_index(&self, id: VoxelId) -> (usize, usize, usize) {
        if id >= self.num_elements {
            return (INVALID_SIZE, INVALID_SIZE, INVALID_SIZE);
        }
        let nx = self.num_voxels[0] as VoxelId;
        let ny = self.num_voxels[1] as VoxelId;
        // Each quotient is below its axis count, which is a usize.
        (
            (id % nx) as usize,
            ((id / nx) % ny) as usize,
            (id / (nx * ny)) as usize,
        )
    }

    /// Center of voxel `id` in world coordinates.
    ///
    /// Every component is [`INVALID_DOUBLE`] if `id` is off the grid.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn position(&self, id: VoxelId) -> Point3<f64> {
        let (ix, iy, iz) = self.id_to_xyz_index(id);
        if ix == INVALID_SIZE {
            return Point3::new(INVALID_DOUBLE, INVALID_DOUBLE, INVALID_DOUBLE);
        }
        let index = Vector3::new(ix as f64, iy as f64, iz as f64).add_scalar(0.5);
        self.bounds.min + index.component_mul(&self.voxel_size)
    }

    /// X coordinate of the center of voxel `id`, or [`INVALID_DOUBLE`].
    #[must_use]
    pub fn pos_x(&self, id: VoxelId) -> f64 {
        self.position(id).x
    }

    /// Y coordinate of the center of voxel `id`, or [`INVALID_DOUBLE`].
    #[must_use]
    pub fn pos_y(&self, id: VoxelId) -> f64 {
        self.position(id).y
    }

    /// Z coordinate of the center of voxel `id`, or [`INVALID_DOUBLE`].
    #[must_use]
    pub fn pos_z(&self, id: VoxelId) -> f64 {
        self.position(id).z
    }

    /// Id of the voxel offset from `id` by whole voxels along each axis.
    ///
    /// Returns [`INVALID_VOXEL_ID`] if `id` is off the grid or the offset
    /// leaves it.
    #[must_use]
    pub fn shift(&self, id: VoxelId, dx: i64, dy: i64, dz: i64) -> VoxelId {
        let (ix, iy, iz) = self.id_to_xyz_index(id);
        if ix == INVALID_SIZE {
            return INVALID_VOXEL_ID;
        }
        match (
            self.offset(0, ix, dx),
            self.offset(1, iy, dy),
            self.offset(2, iz, dz),
        ) {
            (Some(ix), Some(iy), Some(iz)) => self.index(ix, iy, iz),
            _ => INVALID_VOXEL_ID,
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn axis_index(&self, axis: usize, coord: f64) -> Option<usize> {
        let index = ((coord - self.bounds.min[axis]) / self.voxel_size[axis]).floor();
        if index.is_nan() || index < 0.0 || index >= self.num_voxels[axis] as f64 {
            return None;
        }
        Some(index as usize)
    }

    fn offset(&self, axis: usize, index: usize, delta: i64) -> Option<usize> {
        let moved = i64::try_from(index).ok()?.checked_add(delta)?;
        usize::try_from(moved)
            .ok()
            .filter(|&moved| moved < self.num_voxels[axis])
    }
}

impl Default for VoxelMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VoxelMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "VoxelMeta ({})", if self.valid { "valid" } else { "invalid" })?;
        for axis in 0..3 {
            writeln!(
                f,
                "  {}: {} => {} | {} voxels of {}",
                AXES[axis],
                self.bounds.min[axis],
                self.bounds.max[axis],
                self.num_voxels[axis],
                self.voxel_size[axis]
            )?;
        }
        write!(f, "  total: {} voxels", self.num_elements)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube_meta() -> VoxelMeta {
        let bounds = Aabb::new(Point3::origin(), Point3::new(10.0, 10.0, 10.0));
        VoxelMeta::try_new(bounds, 10, 10, 10).unwrap()
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_new_is_invalid() {
        let meta = VoxelMeta::new();
        assert!(!meta.valid());
        assert_eq!(meta.size(), 0);
        assert_eq!(meta.id(0.0, 0.0, 0.0), INVALID_VOXEL_ID);
        assert_eq!(meta.index(0, 0, 0), INVALID_VOXEL_ID);
    }

    #[test]
    fn test_try_new_rejects_zero_count() {
        let bounds = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let err = VoxelMeta::try_new(bounds, 1, 0, 1).unwrap_err();
        assert_eq!(err, VoxelError::InvalidDimensions { x: 1, y: 0, z: 1 });
    }

    #[test]
    fn test_try_new_rejects_flat_extent() {
        let bounds = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 0.0));
        let err = VoxelMeta::try_new(bounds, 1, 1, 1).unwrap_err();
        assert!(matches!(err, VoxelError::InvalidExtent { axis: 'z', .. }));
    }

    #[test]
    fn test_set_and_update() {
        let mut meta = VoxelMeta::new();
        meta.set(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 4.0, 8.0), 4, 2, 8);
        assert!(meta.valid());
        assert_eq!(meta.size(), 64);
        assert_relative_eq!(meta.size_voxel_x(), 0.5);
        assert_relative_eq!(meta.size_voxel_y(), 2.0);
        assert_relative_eq!(meta.size_voxel_z(), 1.0);

        meta.update(2, 2, 2);
        assert_eq!(meta.size(), 8);
        assert_relative_eq!(meta.size_voxel_x(), 1.0);
        assert_eq!(meta.num_voxel_z(), 2);
    }

    #[test]
    fn test_update_invalid_counts() {
        let mut meta = cube_meta();
        meta.update(10, 0, 10);
        assert!(!meta.valid());
        assert_eq!(meta.size(), 0);
        assert_eq!(meta.size_voxel_x(), 0.0);
        assert_eq!(meta.id(1.0, 1.0, 1.0), INVALID_VOXEL_ID);
    }

    #[test]
    fn test_clear() {
        let mut meta = cube_meta();
        meta.clear();
        assert!(!meta.valid());
        assert_eq!(meta, VoxelMeta::default());
    }

    #[test]
    fn test_accessors() {
        let meta = cube_meta();
        assert_eq!(meta.min_x(), 0.0);
        assert_eq!(meta.max_y(), 10.0);
        assert_eq!(meta.max_z(), 10.0);
        assert_eq!(meta.num_voxel_x(), 10);
        assert_eq!(meta.size(), 1000);
        assert_eq!(meta.invalid_voxel_id(), INVALID_VOXEL_ID);
        assert_eq!(meta.bounds().max, Point3::new(10.0, 10.0, 10.0));
    }

    // ==================== Conversion Tests ====================

    #[test]
    fn test_id_round_trip_center() {
        let meta = cube_meta();
        assert_eq!(meta.id_to_xyz_index(meta.id(5.5, 5.5, 5.5)), (5, 5, 5));
        assert_eq!(meta.id(5.5, 5.5, 5.5), 555);
        assert_eq!(meta.id_at(&Point3::new(5.5, 5.5, 5.5)), 555);
    }

    #[test]
    fn test_id_edges() {
        let meta = cube_meta();
        assert_eq!(meta.id(0.0, 0.0, 0.0), 0);
        assert_eq!(meta.id(9.999, 9.999, 9.999), 999);
        assert_eq!(meta.id(10.0, 5.0, 5.0), INVALID_VOXEL_ID);
        assert_eq!(meta.id(-0.001, 5.0, 5.0), INVALID_VOXEL_ID);
        assert_eq!(meta.id(f64::NAN, 5.0, 5.0), INVALID_VOXEL_ID);
    }

    #[test]
    fn test_index_row_major() {
        let meta = cube_meta();
        assert_eq!(meta.index(1, 0, 0), 1);
        assert_eq!(meta.index(0, 1, 0), 10);
        assert_eq!(meta.index(0, 0, 1), 100);
        assert_eq!(meta.index(10, 0, 0), INVALID_VOXEL_ID);
    }

    #[test]
    fn test_id_to_axis_indices() {
        let meta = cube_meta();
        let id = meta.index(3, 7, 2);
        assert_eq!(meta.id_to_x_index(id), 3);
        assert_eq!(meta.id_to_y_index(id), 7);
        assert_eq!(meta.id_to_z_index(id), 2);
        assert_eq!(meta.id_to_x_index(1000), INVALID_SIZE);
        assert_eq!(meta.id_to_z_index(INVALID_VOXEL_ID), INVALID_SIZE);
    }

    #[test]
    fn test_position_is_voxel_center() {
        let meta = cube_meta();
        let center = meta.position(meta.index(0, 1, 9));
        assert_relative_eq!(center.x, 0.5);
        assert_relative_eq!(center.y, 1.5);
        assert_relative_eq!(center.z, 9.5);
        assert_relative_eq!(meta.pos_y(meta.index(0, 1, 9)), 1.5);
    }

    #[test]
    fn test_position_invalid_id() {
        let meta = cube_meta();
        assert_eq!(meta.pos_x(1000), INVALID_DOUBLE);
        assert_eq!(meta.position(INVALID_VOXEL_ID).z, INVALID_DOUBLE);
    }

    #[test]
    fn test_shift() {
        let meta = cube_meta();
        assert_eq!(meta.shift(meta.id(5.0, 5.0, 5.0), 1, 0, 0), meta.id(6.0, 5.0, 5.0));
        assert_eq!(meta.shift(meta.id(9.0, 5.0, 5.0), 1, 0, 0), INVALID_VOXEL_ID);
        assert_eq!(meta.shift(meta.id(0.0, 5.0, 5.0), -1, 0, 0), INVALID_VOXEL_ID);
        assert_eq!(meta.shift(555, -5, 4, -5), meta.index(0, 9, 0));
        assert_eq!(meta.shift(INVALID_VOXEL_ID, 0, 0, 0), INVALID_VOXEL_ID);
    }

    // ==================== Equality & Display Tests ====================

    #[test]
    fn test_equality() {
        let a = cube_meta();
        let mut b = cube_meta();
        assert_eq!(a, b);
        b.update(5, 10, 10);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let text = format!("{}", cube_meta());
        assert!(text.starts_with("VoxelMeta (valid)"));
        assert!(text.contains("x: 0 => 10 | 10 voxels of 1"));
        assert!(text.ends_with("total: 1000 voxels"));
    }
}
