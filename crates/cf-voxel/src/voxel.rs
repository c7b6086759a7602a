//! Single voxel: an id paired with a scalar value.

use std::ops::AddAssign;

use crate::constants::{INVALID_FLOAT, INVALID_VOXEL_ID, VoxelId};

/// The voxel returned by lookups that find nothing.
pub const INVALID_VOXEL: Voxel = Voxel::new(INVALID_VOXEL_ID, INVALID_FLOAT);

/// A voxel id with an attached `f32` value.
///
/// The id never changes except through [`Voxel::set`], which replaces both
/// fields. Adding a value with `+=` merges into the value only.
///
/// # Example
///
/// ```
/// use cf_voxel::Voxel;
///
/// let mut voxel = Voxel::new(12, 1.5);
/// voxel += 2.0;
/// assert_eq!(voxel.id(), 12);
/// assert_eq!(voxel.value(), 3.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Voxel {
    id: VoxelId,
    value: f32,
}

impl Voxel {
    /// Creates a voxel.
    #[must_use]
    pub const fn new(id: VoxelId, value: f32) -> Self {
        Self { id, value }
    }

    /// Returns the voxel id.
    #[must_use]
    pub const fn id(&self) -> VoxelId {
        self.id
    }

    /// Returns the voxel value.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Replaces both the id and the value.
    pub fn set(&mut self, id: VoxelId, value: f32) {
        self.id = id;
        self.value = value;
    }

    /// Returns `false` for a voxel carrying [`INVALID_VOXEL_ID`].
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel::{Voxel, INVALID_VOXEL};
    ///
    /// assert!(Voxel::new(0, 0.0).is_valid());
    /// assert!(!INVALID_VOXEL.is_valid());
    /// ```
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.id != INVALID_VOXEL_ID
    }

    pub(crate) fn value_mut(&mut self) -> &mut f32 {
        &mut self.value
    }

    pub(crate) const fn precedes(&self, other: &Self) -> bool {
        self.id < other.id
    }

    pub(crate) const fn follows(&self, other: &Self) -> bool {
        self.id > other.id
    }
}

impl Default for Voxel {
    fn default() -> Self {
        INVALID_VOXEL
    }
}

impl AddAssign<f32> for Voxel {
    fn add_assign(&mut self, value: f32) {
        self.value += value;
    }
}

impl From<(VoxelId, f32)> for Voxel {
    fn from((id, value): (VoxelId, f32)) -> Self {
        Self::new(id, value)
    }
}

impl From<Voxel> for (VoxelId, f32) {
    fn from(voxel: Voxel) -> Self {
        (voxel.id, voxel.value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let voxel = Voxel::new(3, 0.25);
        assert_eq!(voxel.id(), 3);
        assert_eq!(voxel.value(), 0.25);
    }

    #[test]
    fn test_set_replaces_both_fields() {
        let mut voxel = Voxel::new(3, 0.25);
        voxel.set(9, -1.0);
        assert_eq!(voxel.id(), 9);
        assert_eq!(voxel.value(), -1.0);
    }

    #[test]
    fn test_add_assign_keeps_id() {
        let mut voxel = Voxel::new(5, 2.0);
        voxel += 2.0;
        assert_eq!(voxel.id(), 5);
        assert_eq!(voxel.value(), 4.0);
    }

    #[test]
    fn test_equality_uses_id_and_value() {
        assert_eq!(Voxel::new(1, 1.0), Voxel::new(1, 1.0));
        assert_ne!(Voxel::new(1, 1.0), Voxel::new(1, 2.0));
        assert_ne!(Voxel::new(1, 1.0), Voxel::new(2, 1.0));
    }

    #[test]
    fn test_ordering_helpers_compare_ids_only() {
        let a = Voxel::new(1, 100.0);
        let b = Voxel::new(2, -100.0);
        assert!(a.precedes(&b));
        assert!(b.follows(&a));
        assert!(!a.precedes(&Voxel::new(1, 0.0)));
    }

    #[test]
    fn test_default_is_invalid() {
        let voxel = Voxel::default();
        assert_eq!(voxel, INVALID_VOXEL);
        assert!(!voxel.is_valid());
        assert_eq!(voxel.value(), INVALID_FLOAT);
    }

    #[test]
    fn test_tuple_conversions() {
        let voxel: Voxel = (4, 0.5).into();
        assert_eq!(voxel, Voxel::new(4, 0.5));
        let (id, value): (VoxelId, f32) = voxel.into();
        assert_eq!(id, 4);
        assert_eq!(value, 0.5);
    }
}
