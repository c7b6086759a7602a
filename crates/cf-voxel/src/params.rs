//! Parameters for voxel value filtering.

use crate::constants::INVALID_FLOAT;

/// Which value categories [`VoxelSet::clear_invalid`](crate::VoxelSet::clear_invalid) removes.
///
/// The default removes nothing.
///
/// # Example
///
/// ```
/// use cf_voxel::ClearInvalidParams;
///
/// let params = ClearInvalidParams::default().with_nan(true);
/// assert!(params.nan);
/// assert!(!params.inf);
/// assert!(!params.is_noop());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct ClearInvalidParams {
    /// Remove voxels holding [`INVALID_FLOAT`].
    pub invalid_float: bool,
    /// Remove voxels holding NaN.
    pub nan: bool,
    /// Remove voxels holding positive or negative infinity.
    pub inf: bool,
}

impl ClearInvalidParams {
    /// Remove every invalid category.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            invalid_float: true,
            nan: true,
            inf: true,
        }
    }

    /// Remove NaN and infinities, keep [`INVALID_FLOAT`].
    #[must_use]
    pub const fn non_finite() -> Self {
        Self {
            invalid_float: false,
            nan: true,
            inf: true,
        }
    }

    /// Set the invalid-float option.
    #[must_use]
    pub const fn with_invalid_float(mut self, clear: bool) -> Self {
        self.invalid_float = clear;
        self
    }

    /// Set the NaN option.
    #[must_use]
    pub const fn with_nan(mut self, clear: bool) -> Self {
        self.nan = clear;
        self
    }

    /// Set the infinity option.
    #[must_use]
    pub const fn with_inf(mut self, clear: bool) -> Self {
        self.inf = clear;
        self
    }

    /// Returns `true` when no category is selected.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        !self.invalid_float && !self.nan && !self.inf
    }

    /// Returns `true` if `value` falls in a selected category.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn rejects(&self, value: f32) -> bool {
        (self.inf && value.is_infinite())
            || (self.nan && value.is_nan())
            || (self.invalid_float && value == INVALID_FLOAT)
    }
}

/// Inclusive window of accepted voxel values.
///
/// # Example
///
/// ```
/// use cf_voxel::ValueRange;
///
/// let range = ValueRange::new(0.0, 10.0);
/// assert!(range.contains(0.0));
/// assert!(range.contains(10.0));
/// assert!(!range.contains(10.5));
///
/// let floor = ValueRange::at_least(1.0);
/// assert!(floor.contains(1e30));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueRange {
    /// Smallest accepted value.
    pub min: f32,
    /// Largest accepted value.
    pub max: f32,
}

impl ValueRange {
    /// Window `[min, max]`.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Window `[min, +inf]`.
    #[must_use]
    pub const fn at_least(min: f32) -> Self {
        Self::new(min, f32::INFINITY)
    }

    /// Window `[-inf, max]`.
    #[must_use]
    pub const fn at_most(max: f32) -> Self {
        Self::new(f32::NEG_INFINITY, max)
    }

    /// Returns `true` if `value` is inside the window.
    ///
    /// NaN is never outside a bound, so it is always accepted.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        !(value < self.min || value > self.max)
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::new(f32::NEG_INFINITY, f32::INFINITY)
    }
}
