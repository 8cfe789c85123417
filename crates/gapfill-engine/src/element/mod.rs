//! Element property tests: prime, perfect square, perfect cube.
//!
//! Each property has a predicate and an inverse (prime ordinal, square
//! root, cube root). Normalization uses the inverse to rewrite a strided
//! subsequence so that shape tests run later in the same layer can see
//! arithmetic structure, e.g. consecutive primes become consecutive integers.

pub mod normalize;
pub mod properties;
pub mod source;

use gapfill_types::{Cell, ElementProperty};

pub use normalize::normalize;
pub use source::{ComputedProperties, PropertySource, ReferenceLists, ReferenceListsSpec};

/// Predicate applied element-wise; unknown cells never satisfy.
pub fn test_cells(source: &dyn PropertySource, property: ElementProperty, cells: &[Cell]) -> Vec<bool> {
    cells
        .iter()
        .map(|c| c.value().is_some_and(|v| source.satisfies(property, v)))
        .collect()
}

/// Inverse applied element-wise; unknown and non-qualifying cells come back unknown.
pub fn invert_cells(source: &dyn PropertySource, property: ElementProperty, cells: &[Cell]) -> Vec<Cell> {
    cells
        .iter()
        .map(|c| Cell::from(c.value().and_then(|v| source.inverse(property, v))))
        .collect()
}
