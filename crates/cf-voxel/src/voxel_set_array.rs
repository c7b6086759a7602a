//! Voxel sets addressed by instance id.
//!
//! The set at position `i` always carries instance id `i`. The array grows
//! on demand when a set with an unseen id arrives and never shrinks or
//! reorders outside of [`VoxelSetArray::replace_all`] and
//! [`VoxelSetArray::clear_data`].

use std::ops::{Deref, DerefMut, Index};

use tracing::debug;

use crate::constants::{INVALID_FLOAT, INVALID_INSTANCE_ID, InstanceId};
use crate::error::{VoxelError, VoxelResult};
use crate::voxel_set::VoxelSet;

/// A positional collection of [`VoxelSet`]s keyed by instance id.
///
/// # Example
///
/// ```
/// use cf_voxel::{Voxel, VoxelSet, VoxelSetArray};
///
/// let mut array = VoxelSetArray::new();
///
/// let mut set = VoxelSet::with_id(3);
/// set.add(Voxel::new(10, 1.0))?;
/// array.insert(set)?;
///
/// assert_eq!(array.len(), 4);
/// assert!(array.voxel_set(1)?.is_empty());
/// assert_eq!(array.voxel_set(3)?.find(10).value(), 1.0);
/// assert!(array.voxel_set(4).is_err());
/// # Ok::<(), cf_voxel::VoxelError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "VoxelSetArrayRepr")
)]
pub struct VoxelSetArray {
    sets: Vec<VoxelSet>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct VoxelSetArrayRepr {
    sets: Vec<VoxelSet>,
}

#[cfg(feature = "serde")]
impl From<VoxelSetArrayRepr> for VoxelSetArray {
    fn from(repr: VoxelSetArrayRepr) -> Self {
        Self::from_sets(repr.sets)
    }
}

impl VoxelSetArray {
    /// Creates an empty array.
    #[must_use]
    pub const fn new() -> Self {
        Self { sets: Vec::new() }
    }

    /// Builds an array from `sets`, tagging each with its position.
    #[must_use]
    pub fn from_sets(sets: Vec<VoxelSet>) -> Self {
        let mut array = Self::new();
        array.replace_all(sets);
        array
    }

    /// Returns the number of sets, including empty ones created by growth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` if the array holds no sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Removes every set.
    pub fn clear_data(&mut self) {
        self.sets.clear();
    }

    /// Returns the sets in instance id order.
    #[must_use]
    pub fn as_slice(&self) -> &[VoxelSet] {
        &self.sets
    }

    /// Returns an iterator over the sets in instance id order.
    pub fn iter(&self) -> std::slice::Iter<'_, VoxelSet> {
        self.sets.iter()
    }

    /// Consumes the array and returns its sets.
    #[must_use]
    pub fn into_inner(self) -> Vec<VoxelSet> {
        self.sets
    }

    /// Adopts `sets` wholesale, re-tagging each with its new position.
    ///
    /// Ids carried by the incoming sets are discarded.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel::{VoxelSet, VoxelSetArray};
    ///
    /// let mut array = VoxelSetArray::new();
    /// array.replace_all(vec![VoxelSet::with_id(9), VoxelSet::with_id(4)]);
    ///
    /// let ids: Vec<_> = array.iter().map(VoxelSet::id).collect();
    /// assert_eq!(ids, vec![0, 1]);
    /// ```
    pub fn replace_all(&mut self, sets: Vec<VoxelSet>) {
        self.sets = sets;
        for (position, set) in (0..).zip(self.sets.iter_mut()) {
            set.set_id(position);
        }
        debug!(count = self.sets.len(), "Re-indexed voxel set array");
    }

    /// Stores `set` at the position named by its instance id.
    ///
    /// A set without an id is appended and tagged with its new position.
    /// A set whose id is past the end grows the array; the gap is filled
    /// with empty sets tagged with their own positions. An existing set at
    /// that position is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::OutOfRange`] if the id cannot be addressed on
    /// this platform or the array cannot grow to hold it.
    pub fn insert(&mut self, mut set: VoxelSet) -> VoxelResult<()> {
        let id = set.id();
        if id == INVALID_INSTANCE_ID {
            set.set_id(self.next_id());
            self.sets.push(set);
            return Ok(());
        }

        let slot = self.slot(id)?;
        if slot >= self.sets.len() {
            self.grow_to(id, slot + 1)?;
        }
        self.sets[slot] = set;
        Ok(())
    }

    /// Returns the set with instance id `id`.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::OutOfRange`] if `id` is past the end.
    pub fn voxel_set(&self, id: InstanceId) -> VoxelResult<&VoxelSet> {
        let slot = self.slot(id)?;
        self.sets.get(slot).ok_or(VoxelError::OutOfRange {
            id,
            len: self.sets.len(),
        })
    }

    /// Returns a mutable handle to the set with instance id `id`.
    ///
    /// The handle restores the set's instance id when dropped.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::OutOfRange`] if `id` is past the end.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel::{Voxel, VoxelSet, VoxelSetArray};
    ///
    /// let mut array = VoxelSetArray::from_sets(vec![VoxelSet::new(), VoxelSet::new()]);
    /// {
    ///     let mut set = array.voxel_set_mut(1)?;
    ///     set.add(Voxel::new(2, 5.0))?;
    ///     set.set_id(42);
    /// }
    /// assert_eq!(array[1].id(), 1);
    /// assert_eq!(array[1].len(), 1);
    /// # Ok::<(), cf_voxel::VoxelError>(())
    /// ```
    pub fn voxel_set_mut(&mut self, id: InstanceId) -> VoxelResult<VoxelSetMut<'_>> {
        let slot = self.slot(id)?;
        let len = self.sets.len();
        let set = self
            .sets
            .get_mut(slot)
            .ok_or(VoxelError::OutOfRange { id, len })?;
        Ok(VoxelSetMut { set, id })
    }

    /// Total number of voxels across all sets.
    #[must_use]
    pub fn voxel_count(&self) -> usize {
        self.sets.iter().map(VoxelSet::len).sum()
    }

    /// Sum of every voxel value.
    #[must_use]
    pub fn sum(&self) -> f32 {
        self.sets.iter().map(VoxelSet::sum).sum()
    }

    /// Mean over every voxel. Zero when the array holds no voxels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f32 {
        let count = self.voxel_count();
        if count == 0 {
            return 0.0;
        }
        self.sum() / count as f32
    }

    /// Largest voxel value, or [`INVALID_FLOAT`] when there are no voxels.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.non_empty()
            .map(VoxelSet::max)
            .reduce(f32::max)
            .unwrap_or(INVALID_FLOAT)
    }

    /// Smallest voxel value, or [`INVALID_FLOAT`] when there are no voxels.
    #[must_use]
    pub fn min(&self) -> f32 {
        self.non_empty()
            .map(VoxelSet::min)
            .reduce(f32::min)
            .unwrap_or(INVALID_FLOAT)
    }

    fn non_empty(&self) -> impl Iterator<Item = &VoxelSet> {
        self.sets.iter().filter(|set| !set.is_empty())
    }

    fn next_id(&self) -> InstanceId {
        InstanceId::try_from(self.sets.len()).unwrap_or(INVALID_INSTANCE_ID)
    }

    fn slot(&self, id: InstanceId) -> VoxelResult<usize> {
        usize::try_from(id).map_err(|_| VoxelError::OutOfRange {
            id,
            len: self.sets.len(),
        })
    }

    fn grow_to(&mut self, id: InstanceId, new_len: usize) -> VoxelResult<()> {
        let from = self.sets.len();
        self.sets
            .try_reserve(new_len - from)
            .map_err(|_| VoxelError::OutOfRange { id, len: from })?;
        while self.sets.len() < new_len {
            let set = VoxelSet::with_id(self.next_id());
            self.sets.push(set);
        }
        debug!(from, to = new_len, "Grew voxel set array");
        Ok(())
    }
}

impl Index<usize> for VoxelSetArray {
    type Output = VoxelSet;

    fn index(&self, index: usize) -> &Self::Output {
        &self.sets[index]
    }
}

impl FromIterator<VoxelSet> for VoxelSetArray {
    fn from_iter<I: IntoIterator<Item = VoxelSet>>(iter: I) -> Self {
        Self::from_sets(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a VoxelSetArray {
    type Item = &'a VoxelSet;
    type IntoIter = std::slice::Iter<'a, VoxelSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

/// Mutable access to one set of a [`VoxelSetArray`].
///
/// Dereferences to [`VoxelSet`]. On drop the set's instance id is reset to
/// its position in the array.
#[derive(Debug)]
pub struct VoxelSetMut<'a> {
    set: &'a mut VoxelSet,
    id: InstanceId,
}

impl Deref for VoxelSetMut<'_> {
    type Target = VoxelSet;

    fn deref(&self) -> &Self::Target {
        self.set
    }
}

impl DerefMut for VoxelSetMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.set
    }
}

impl Drop for VoxelSetMut<'_> {
    fn drop(&mut self) {
        self.set.set_id(self.id);
    }
}
