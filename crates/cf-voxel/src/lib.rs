//! Sparse voxel storage for CortenForge.
//!
//! This crate stores scalar values attached to a subset of the voxels of a
//! regular 3D grid:
//!
//! - [`VoxelMeta`] - Grid over an [`Aabb`], converting coordinates to voxel ids
//! - [`Voxel`] - A voxel id paired with an `f32` value
//! - [`VoxelSet`] - Voxels of one instance, sorted by id with no duplicates
//! - [`VoxelSetArray`] - Voxel sets addressed by instance id, growing on demand
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. Everything is
//! single-threaded and synchronous. Containers own their elements outright,
//! so cloning one deep-copies it; share a finished container behind your own
//! synchronization if several threads need it.
//!
//! # Sentinels
//!
//! Lookups that find nothing and coordinates that fall off the grid are not
//! errors. They return the reserved values in [`constants`]:
//! [`INVALID_VOXEL_ID`], [`INVALID_SIZE`], [`INVALID_FLOAT`],
//! [`INVALID_DOUBLE`], and the [`INVALID_VOXEL`] voxel. [`VoxelError`] is
//! reserved for construction failures, out-of-range instance access, and
//! defects.
//!
//! # Example
//!
//! ```
//! use cf_voxel::{Aabb, Voxel, VoxelMeta, VoxelSet, VoxelSetArray};
//! use nalgebra::Point3;
//!
//! let bounds = Aabb::new(Point3::origin(), Point3::new(10.0, 10.0, 10.0));
//! let meta = VoxelMeta::try_new(bounds, 10, 10, 10)?;
//!
//! // Deposit two samples into the same voxel of instance 2
//! let mut set = VoxelSet::with_id(2);
//! for point in [Point3::new(1.2, 3.4, 5.6), Point3::new(1.8, 3.1, 5.9)] {
//!     set.add(Voxel::new(meta.id_at(&point), 0.5))?;
//! }
//! assert_eq!(set.len(), 1);
//!
//! let mut array = VoxelSetArray::new();
//! array.insert(set)?;
//! assert_eq!(array.len(), 3);
//!
//! let voxel = array.voxel_set(2)?.voxels()[0];
//! assert_eq!(voxel.value(), 1.0);
//! assert_eq!(meta.id_to_xyz_index(voxel.id()), (1, 3, 5));
//! # Ok::<(), cf_voxel::VoxelError>(())
//! ```
//!
//! # Filtering
//!
//! ```
//! use cf_voxel::{ClearInvalidParams, Voxel, VoxelSet};
//!
//! let mut set: VoxelSet = [
//!     Voxel::new(1, -3.0),
//!     Voxel::new(2, 4.0),
//!     Voxel::new(3, f32::NAN),
//!     Voxel::new(4, 12.0),
//! ]
//! .into_iter()
//! .collect();
//!
//! set.clear_invalid(ClearInvalidParams::non_finite());
//! set.threshold(0.0, 10.0);
//! assert_eq!(set.voxels(), &[Voxel::new(2, 4.0)]);
//! ```
//!
//! # Features
//!
//! - `serde` - `Serialize`/`Deserialize` for every public data type.
//!   Deserialized sets are re-sorted and arrays re-indexed, so invariants
//!   hold for any input.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod constants;

mod bounds;
mod error;
mod meta;
mod params;
mod voxel;
mod voxel_set;
mod voxel_set_array;

// Re-export core types
pub use bounds::Aabb;
pub use constants::{
    INVALID_DOUBLE, INVALID_FLOAT, INVALID_INSTANCE_ID, INVALID_SIZE, INVALID_VOXEL_ID, InstanceId,
    VoxelId,
};
pub use error::{VoxelError, VoxelResult};
pub use meta::VoxelMeta;
pub use params::{ClearInvalidParams, ValueRange};
pub use voxel::{INVALID_VOXEL, Voxel};
pub use voxel_set::{EmplaceMode, VoxelSet};
pub use voxel_set_array::{VoxelSetArray, VoxelSetMut};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
