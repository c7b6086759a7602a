//! Error types for voxel store operations.
//!
//! Only defects and construction failures are errors. A lookup that finds
//! nothing, or a coordinate outside the grid, is reported through the
//! sentinels in [`constants`](crate::constants).

use crate::constants::{InstanceId, VoxelId};

/// Errors that can occur in voxel store operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum VoxelError {
    /// An instance id past the end of a [`VoxelSetArray`](crate::VoxelSetArray).
    #[error("no voxel set with instance id {id} (array length {len})")]
    OutOfRange {
        /// The requested instance id.
        id: InstanceId,
        /// The array length at the time of the request.
        len: usize,
    },

    /// A storage position past the end of a [`VoxelSet`](crate::VoxelSet).
    #[error("voxel position {index} is out of range (set length {len})")]
    PositionOutOfRange {
        /// The requested position.
        index: usize,
        /// The set length at the time of the request.
        len: usize,
    },

    /// Sorted insertion reached a state the ordering invariant rules out.
    #[error("voxel set ordering invariant violated while placing voxel id {id}")]
    InvariantViolation {
        /// Id of the voxel being placed.
        id: VoxelId,
    },

    /// A voxel count of zero on some axis.
    #[error("invalid voxel counts: {x}x{y}x{z}")]
    InvalidDimensions {
        /// Voxel count along x.
        x: usize,
        /// Voxel count along y.
        y: usize,
        /// Voxel count along z.
        z: usize,
    },

    /// A non-finite or non-positive extent on some axis.
    #[error("invalid {axis} extent: [{min}, {max}]")]
    InvalidExtent {
        /// Axis name.
        axis: char,
        /// Lower edge.
        min: f64,
        /// Upper edge.
        max: f64,
    },
}

/// Result type for voxel store operations.
pub type VoxelResult<T> = std::result::Result<T, VoxelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VoxelError::OutOfRange { id: 7, len: 3 };
        assert_eq!(
            format!("{err}"),
            "no voxel set with instance id 7 (array length 3)"
        );

        let err = VoxelError::InvalidDimensions { x: 10, y: 0, z: 10 };
        assert_eq!(format!("{err}"), "invalid voxel counts: 10x0x10");

        let err = VoxelError::InvalidExtent {
            axis: 'y',
            min: 1.0,
            max: 1.0,
        };
        assert!(format!("{err}").contains("y extent"));

        let err = VoxelError::InvariantViolation { id: 42 };
        assert!(format!("{err}").contains("42"));
    }

    #[test]
    fn test_error_equality() {
        let a = VoxelError::PositionOutOfRange { index: 3, len: 2 };
        let b = VoxelError::PositionOutOfRange { index: 3, len: 2 };
        let c = VoxelError::PositionOutOfRange { index: 4, len: 2 };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
