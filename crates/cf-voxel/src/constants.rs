//! Type aliases and reserved sentinel values shared by every voxel type.
//!
//! Lookups that find nothing and geometry queries that fall off the grid
//! report it through these sentinels instead of an error. Compare results
//! against the matching constant before using them.

/// Identifier of one voxel, unique within a single [`VoxelMeta`](crate::VoxelMeta).
pub type VoxelId = u64;

/// Identifier of a logical group (one particle, one cluster, ...) owning a
/// [`VoxelSet`](crate::VoxelSet).
pub type InstanceId = u64;

/// Invalid voxel value. Also the baseline of empty `max`/`min` aggregates.
pub const INVALID_FLOAT: f32 = f32::MAX;

/// Invalid world coordinate, returned by position queries on invalid ids.
pub const INVALID_DOUBLE: f64 = f64::MAX;

/// Invalid voxel id.
pub const INVALID_VOXEL_ID: VoxelId = VoxelId::MAX;

/// Unassigned instance id.
pub const INVALID_INSTANCE_ID: InstanceId = InstanceId::MAX;

/// Invalid storage position or axis index.
pub const INVALID_SIZE: usize = usize::MAX;

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_type_maxima() {
        assert_eq!(INVALID_FLOAT, f32::MAX);
        assert_eq!(INVALID_DOUBLE, f64::MAX);
        assert_eq!(INVALID_VOXEL_ID, u64::MAX);
        assert_eq!(INVALID_INSTANCE_ID, u64::MAX);
        assert_eq!(INVALID_SIZE, usize::MAX);
    }
}
