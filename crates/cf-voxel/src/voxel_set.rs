//! Sorted, duplicate-free voxel collection tagged with an instance id.

use tracing::{debug, error};

use crate::constants::{INVALID_FLOAT, INVALID_INSTANCE_ID, INVALID_SIZE, InstanceId, VoxelId};
use crate::error::{VoxelError, VoxelResult};
use crate::params::{ClearInvalidParams, ValueRange};
use crate::voxel::{INVALID_VOXEL, Voxel};

/// What happens when a placed voxel's id is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmplaceMode {
    /// Add the new value to the stored one.
    Add,
    /// Replace the stored value.
    Overwrite,
}

/// An ordered collection of voxels belonging to one instance.
///
/// Voxels are kept strictly ascending by id with no duplicates. Every
/// mutating method restores that order before returning, so the stored
/// sequence is canonical for its content.
///
/// # Example
///
/// ```
/// use cf_voxel::{Voxel, VoxelSet};
///
/// let mut set = VoxelSet::new();
/// for (id, value) in [(3, 1.0), (1, 1.0), (4, 1.0), (1, 2.0), (5, 1.0)] {
///     set.add(Voxel::new(id, value))?;
/// }
///
/// let ids: Vec<_> = set.iter().map(Voxel::id).collect();
/// assert_eq!(ids, vec![1, 3, 4, 5]);
/// assert_eq!(set.find(1).value(), 3.0);
/// assert!(!set.find(999).is_valid());
/// # Ok::<(), cf_voxel::VoxelError>(())
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "VoxelSetRepr")
)]
pub struct VoxelSet {
    id: InstanceId,
    voxels: Vec<Voxel>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct VoxelSetRepr {
    id: InstanceId,
    voxels: Vec<Voxel>,
}

#[cfg(feature = "serde")]
impl From<VoxelSetRepr> for VoxelSet {
    fn from(repr: VoxelSetRepr) -> Self {
        let mut set = Self::from_voxels(repr.voxels);
        set.id = repr.id;
        set
    }
}

impl VoxelSet {
    /// Creates an empty set with an unassigned instance id.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            id: INVALID_INSTANCE_ID,
            voxels: Vec::new(),
        }
    }

    /// Creates an empty set tagged with `id`.
    #[must_use]
    pub const fn with_id(id: InstanceId) -> Self {
        Self {
            id,
            voxels: Vec::new(),
        }
    }

    /// Creates an empty set with room for `capacity` voxels.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: INVALID_INSTANCE_ID,
            voxels: Vec::with_capacity(capacity),
        }
    }

    /// Builds a set from voxels in any order.
    ///
    /// Voxels sharing an id are merged by adding their values.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel::{Voxel, VoxelSet};
    ///
    /// let set = VoxelSet::from_voxels(vec![
    ///     Voxel::new(8, 1.0),
    ///     Voxel::new(2, 1.0),
    ///     Voxel::new(8, 0.5),
    /// ]);
    /// assert_eq!(set.voxels(), &[Voxel::new(2, 1.0), Voxel::new(8, 1.5)]);
    /// ```
    #[must_use]
    pub fn from_voxels(voxels: Vec<Voxel>) -> Self {
        let mut set = Self {
            id: INVALID_INSTANCE_ID,
            voxels,
        };
        set.normalize();
        set
    }

    /// Returns the instance id tag.
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// Sets the instance id tag.
    pub fn set_id(&mut self, id: InstanceId) {
        self.id = id;
    }

    /// Returns the voxels in ascending id order.
    #[must_use]
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Consumes the set and returns its sorted voxels.
    #[must_use]
    pub fn into_voxels(self) -> Vec<Voxel> {
        self.voxels
    }

    /// Returns an iterator over the voxels in ascending id order.
    pub fn iter(&self) -> std::slice::Iter<'_, Voxel> {
        self.voxels.iter()
    }

    /// Returns the number of voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Returns `true` if the set holds no voxels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Reserves room for at least `additional` more voxels.
    pub fn reserve(&mut self, additional: usize) {
        self.voxels.reserve(additional);
    }

    /// Removes every voxel. The instance id is kept.
    pub fn clear_data(&mut self) {
        self.voxels.clear();
    }

    /// Places a voxel, adding its value to an existing voxel with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::InvariantViolation`] if the stored order is found
    /// corrupt during placement. This indicates a defect and should not be
    /// recovered from.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel::{Voxel, VoxelSet};
    ///
    /// let mut set = VoxelSet::new();
    /// set.add(Voxel::new(5, 2.0))?;
    /// set.add(Voxel::new(5, 2.0))?;
    /// assert_eq!(set.voxels(), &[Voxel::new(5, 4.0)]);
    /// # Ok::<(), cf_voxel::VoxelError>(())
    /// ```
    pub fn add(&mut self, voxel: Voxel) -> VoxelResult<()> {
        self.emplace(voxel, EmplaceMode::Add)
    }

    /// Places a voxel, overwriting the value of an existing voxel with the same id.
    ///
    /// # Errors
    ///
    /// Same as [`VoxelSet::add`].
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel::{Voxel, VoxelSet};
    ///
    /// let mut set = VoxelSet::new();
    /// set.insert(Voxel::new(5, 2.0))?;
    /// set.insert(Voxel::new(5, 2.0))?;
    /// assert_eq!(set.voxels(), &[Voxel::new(5, 2.0)]);
    /// # Ok::<(), cf_voxel::VoxelError>(())
    /// ```
    pub fn insert(&mut self, voxel: Voxel) -> VoxelResult<()> {
        self.emplace(voxel, EmplaceMode::Overwrite)
    }

    /// Places a voxel at its ordered position, resolving id collisions per `mode`.
    ///
    /// Appending past the current maximum and prepending before the current
    /// minimum take fast paths. Anything else is located by binary search and
    /// rotated into the gap.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::InvariantViolation`] if the search lands past the
    /// tail, which the ordering invariant rules out.
    pub fn emplace(&mut self, voxel: Voxel, mode: EmplaceMode) -> VoxelResult<()> {
        match self.voxels.last() {
            Some(last) if !voxel.follows(last) => {}
            _ => {
                self.voxels.push(voxel);
                return Ok(());
            }
        }

        if self.voxels.first().is_some_and(|first| voxel.precedes(first)) {
            self.voxels.push(voxel);
            self.voxels.rotate_right(1);
            return Ok(());
        }

        let pos = self.voxels.partition_point(|v| v.precedes(&voxel));
        let Some(existing) = self.voxels.get_mut(pos) else {
            error!(
                id = voxel.id(),
                len = self.voxels.len(),
                "Voxel set ordering invariant violated"
            );
            return Err(VoxelError::InvariantViolation { id: voxel.id() });
        };

        if existing.id() == voxel.id() {
            match mode {
                EmplaceMode::Add => *existing += voxel.value(),
                EmplaceMode::Overwrite => existing.set(voxel.id(), voxel.value()),
            }
            return Ok(());
        }

        self.voxels.push(voxel);
        self.voxels[pos..].rotate_right(1);
        Ok(())
    }

    /// Looks up a voxel by id.
    ///
    /// Returns [`INVALID_VOXEL`] when the id is not present.
    #[must_use]
    pub fn find(&self, id: VoxelId) -> Voxel {
        self.position(id)
            .and_then(|pos| self.voxels.get(pos).copied())
            .unwrap_or(INVALID_VOXEL)
    }

    /// Returns the storage position of the voxel with `id`.
    ///
    /// Returns [`INVALID_SIZE`] when the id is not present.
    #[must_use]
    pub fn index(&self, id: VoxelId) -> usize {
        self.position(id).unwrap_or(INVALID_SIZE)
    }

    /// Returns a mutable reference to the value of the voxel with `id`.
    pub fn value_mut(&mut self, id: VoxelId) -> Option<&mut f32> {
        let pos = self.position(id)?;
        self.voxels.get_mut(pos).map(Voxel::value_mut)
    }

    /// Replaces the value stored at position `index`, keeping its id.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::PositionOutOfRange`] if `index` is past the end.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel::{Voxel, VoxelSet};
    ///
    /// let mut set = VoxelSet::from_voxels(vec![Voxel::new(4, 1.0), Voxel::new(9, 1.0)]);
    /// let pos = set.index(9);
    /// set.set_value_at(pos, 7.0)?;
    /// assert_eq!(set.find(9).value(), 7.0);
    /// # Ok::<(), cf_voxel::VoxelError>(())
    /// ```
    pub fn set_value_at(&mut self, index: usize, value: f32) -> VoxelResult<()> {
        let len = self.voxels.len();
        let voxel = self
            .voxels
            .get_mut(index)
            .ok_or(VoxelError::PositionOutOfRange { index, len })?;
        *voxel.value_mut() = value;
        Ok(())
    }

    /// Sum of all values. Zero for an empty set.
    #[must_use]
    pub fn sum(&self) -> f32 {
        self.voxels.iter().map(Voxel::value).sum()
    }

    /// Mean of all values. Zero for an empty set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f32 {
        if self.voxels.is_empty() {
            return 0.0;
        }
        self.sum() / self.voxels.len() as f32
    }

    /// Largest value, or [`INVALID_FLOAT`] for an empty set.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.voxels
            .iter()
            .map(Voxel::value)
            .reduce(f32::max)
            .unwrap_or(INVALID_FLOAT)
    }

    /// Smallest value, or [`INVALID_FLOAT`] for an empty set.
    #[must_use]
    pub fn min(&self) -> f32 {
        self.voxels
            .iter()
            .map(Voxel::value)
            .reduce(f32::min)
            .unwrap_or(INVALID_FLOAT)
    }

    /// Drops voxels whose value lies outside `[min, max]`.
    pub fn threshold(&mut self, min: f32, max: f32) {
        self.threshold_range(ValueRange::new(min, max));
    }

    /// Drops voxels whose value is below `min`.
    pub fn threshold_min(&mut self, min: f32) {
        self.threshold_range(ValueRange::at_least(min));
    }

    /// Drops voxels whose value is above `max`.
    pub fn threshold_max(&mut self, max: f32) {
        self.threshold_range(ValueRange::at_most(max));
    }

    /// Drops voxels whose value lies outside `range`.
    pub fn threshold_range(&mut self, range: ValueRange) {
        self.retain_values(|value| range.contains(value));
    }

    /// Drops voxels whose value falls in a category selected by `params`.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel::{ClearInvalidParams, Voxel, VoxelSet};
    ///
    /// let mut set = VoxelSet::from_voxels(vec![
    ///     Voxel::new(0, 1.0),
    ///     Voxel::new(1, f32::NAN),
    ///     Voxel::new(2, f32::INFINITY),
    /// ]);
    /// set.clear_invalid(ClearInvalidParams::default().with_nan(true));
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn clear_invalid(&mut self, params: ClearInvalidParams) {
        if params.is_noop() {
            return;
        }
        self.retain_values(|value| !params.rejects(value));
    }

    fn retain_values(&mut self, mut keep: impl FnMut(f32) -> bool) {
        let before = self.voxels.len();
        self.voxels.retain(|v| keep(v.value()));
        let removed = before - self.voxels.len();
        if removed > 0 {
            debug!(
                instance = self.id,
                removed,
                remaining = self.voxels.len(),
                "Filtered voxel set"
            );
        }
    }

    fn position(&self, id: VoxelId) -> Option<usize> {
        let first = self.voxels.first()?;
        let last = self.voxels.last()?;
        if id < first.id() || id > last.id() {
            return None;
        }
        self.voxels.binary_search_by_key(&id, Voxel::id).ok()
    }

    fn normalize(&mut self) {
        self.voxels.sort_by_key(Voxel::id);
        self.voxels.dedup_by(|next, kept| {
            if next.id() == kept.id() {
                *kept += next.value();
                true
            } else {
                false
            }
        });
    }
}

impl Default for VoxelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Equal when both hold the same voxels in the same stored order.
///
/// The instance id tag is not compared.
impl PartialEq for VoxelSet {
    fn eq(&self, other: &Self) -> bool {
        self.voxels == other.voxels
    }
}

impl FromIterator<Voxel> for VoxelSet {
    fn from_iter<I: IntoIterator<Item = Voxel>>(iter: I) -> Self {
        Self::from_voxels(iter.into_iter().collect())
    }
}

/// Extends with merge-add semantics, like repeated [`VoxelSet::add`].
impl Extend<Voxel> for VoxelSet {
    fn extend<I: IntoIterator<Item = Voxel>>(&mut self, iter: I) {
        self.voxels.extend(iter);
        self.normalize();
    }
}

impl<'a> IntoIterator for &'a VoxelSet {
    type Item = &'a Voxel;
    type IntoIter = std::slice::Iter<'a, Voxel>;

    fn into_iter(self) -> Self::IntoIter {
        self.voxels.iter()
    }
}
