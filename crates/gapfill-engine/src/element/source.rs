//! Where membership and inverse answers for element properties come from.
//!
//! The engine only sees the [`PropertySource`] trait. [`ComputedProperties`]
//! answers from arithmetic; [`ReferenceLists`] answers from caller-supplied
//! lists of primes, squares and cubes.

use gapfill_types::ElementProperty;
use serde::{Deserialize, Serialize};

use crate::error::{GapfillError, GapfillResult};
use crate::numeric::near_integer;

use super::properties::{
    cube_root, is_cube, is_prime, is_prime_integer, is_square, nth_prime, prime_ordinal, sieve,
    square_root, SIEVE_LIMIT,
};

/// Membership, inverse and forward maps for element properties.
pub trait PropertySource: Send + Sync {
    /// Whether `value` has the property.
    fn satisfies(&self, property: ElementProperty, value: f64) -> bool;

    /// Ordinal or root of a qualifying value.
    fn inverse(&self, property: ElementProperty, value: f64) -> Option<f64>;

    /// The qualifying value whose inverse is `inverse`.
    fn forward(&self, property: ElementProperty, inverse: f64) -> Option<f64>;

    /// Source name, for logs.
    fn name(&self) -> &str;
}

// ── Computed ────────────────────────────────────────────────────────────

/// Answers every query by direct computation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComputedProperties;

impl PropertySource for ComputedProperties {
    fn satisfies(&self, property: ElementProperty, value: f64) -> bool {
        match property {
            ElementProperty::Prime => is_prime(value),
            ElementProperty::Square => is_square(value),
            ElementProperty::Cube => is_cube(value),
        }
    }

    fn inverse(&self, property: ElementProperty, value: f64) -> Option<f64> {
        match property {
            ElementProperty::Prime => prime_ordinal(value),
            ElementProperty::Square => square_root(value),
            ElementProperty::Cube => cube_root(value),
        }
    }

    fn forward(&self, property: ElementProperty, inverse: f64) -> Option<f64> {
        match property {
            ElementProperty::Prime => nth_prime(inverse),
            ElementProperty::Square => {
                let root = near_integer(inverse)?;
                if root < 0 {
                    return None;
                }
                Some(root.checked_mul(root)? as f64)
            }
            ElementProperty::Cube => {
                let root = near_integer(inverse)?;
                Some(root.checked_pow(3)? as f64)
            }
        }
    }

    fn name(&self) -> &str {
        "computed"
    }
}

// ── Reference Lists ─────────────────────────────────────────────────────

/// Raw reference lists as supplied by a caller (e.g. a JSON file).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceListsSpec {
    pub primes: Option<Vec<f64>>,
    pub squares: Option<Vec<f64>>,
    pub cubes: Option<Vec<f64>>,
}

/// Property answers served from validated lists.
///
/// A property whose list was not supplied falls back to computation.
/// Values beyond a supplied list do not have the property.
#[derive(Clone, Debug)]
pub struct ReferenceLists {
    primes: Option<Vec<i64>>,
    squares: Option<Vec<i64>>,
    cubes: Option<Vec<i64>>,
}

impl ReferenceLists {
    /// Validate raw lists.
    ///
    /// Every entry must be an integer with the property. The prime list must
    /// be exactly the first N primes so that rank equals ordinal.
    pub fn new(spec: ReferenceListsSpec) -> GapfillResult<Self> {
        let primes = spec
            .primes
            .map(|list| validate(list, ElementProperty::Prime))
            .transpose()?;
        if let Some(list) = &primes {
            check_prime_prefix(list)?;
        }
        let squares = spec
            .squares
            .map(|list| validate(list, ElementProperty::Square))
            .transpose()?;
        let cubes = spec
            .cubes
            .map(|list| validate(list, ElementProperty::Cube))
            .transpose()?;
        Ok(Self {
            primes,
            squares,
            cubes,
        })
    }

    /// Decode and validate lists from JSON.
    pub fn from_json(json: &str) -> GapfillResult<Self> {
        let spec: ReferenceListsSpec = serde_json::from_str(json)?;
        Self::new(spec)
    }

    fn list(&self, property: ElementProperty) -> Option<&[i64]> {
        match property {
            ElementProperty::Prime => self.primes.as_deref(),
            ElementProperty::Square => self.squares.as_deref(),
            ElementProperty::Cube => self.cubes.as_deref(),
        }
    }
}

fn validate(list: Vec<f64>, property: ElementProperty) -> GapfillResult<Vec<i64>> {
    let mut out = Vec::with_capacity(list.len());
    for v in list {
        let n = near_integer(v).filter(|n| *n as f64 == v).ok_or_else(|| {
            GapfillError::InvalidReferenceList(format!("{} entry {} is not an integer", property, v))
        })?;
        let ok = match property {
            ElementProperty::Prime => is_prime_integer(n),
            ElementProperty::Square => square_root(v).is_some(),
            ElementProperty::Cube => is_cube(v),
        };
        if !ok {
            return Err(GapfillError::InvalidReferenceList(format!(
                "{} is not a {}",
                n, property
            )));
        }
        out.push(n);
    }
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

fn check_prime_prefix(primes: &[i64]) -> GapfillResult<()> {
    let Some(&max) = primes.last() else {
        return Ok(());
    };
    if max as usize > SIEVE_LIMIT {
        return Err(GapfillError::InvalidReferenceList(format!(
            "prime {} exceeds the supported range",
            max
        )));
    }
    let expected: Vec<i64> = sieve(max as usize)
        .into_iter()
        .enumerate()
        .filter(|(_, p)| *p)
        .map(|(n, _)| n as i64)
        .collect();
    if expected != primes {
        return Err(GapfillError::InvalidReferenceList(
            "prime list must contain every prime up to its largest entry".into(),
        ));
    }
    Ok(())
}

impl PropertySource for ReferenceLists {
    fn satisfies(&self, property: ElementProperty, value: f64) -> bool {
        match self.list(property) {
            Some(list) => near_integer(value)
                .filter(|n| *n as f64 == value)
                .is_some_and(|n| list.binary_search(&n).is_ok()),
            None => ComputedProperties.satisfies(property, value),
        }
    }

    fn inverse(&self, property: ElementProperty, value: f64) -> Option<f64> {
        let Some(list) = self.list(property) else {
            return ComputedProperties.inverse(property, value);
        };
        let n = near_integer(value).filter(|n| *n as f64 == value)?;
        let rank = list.binary_search(&n).ok()?;
        match property {
            ElementProperty::Prime => Some((rank + 1) as f64),
            ElementProperty::Square => square_root(list[rank] as f64),
            ElementProperty::Cube => cube_root(list[rank] as f64),
        }
    }

    fn forward(&self, property: ElementProperty, inverse: f64) -> Option<f64> {
        match (property, self.list(property)) {
            (ElementProperty::Prime, Some(list)) => {
                let k = near_integer(inverse)?;
                if k < 1 {
                    return None;
                }
                list.get(k as usize - 1)
                    .map(|p| *p as f64)
                    .or_else(|| ComputedProperties.forward(property, inverse))
            }
            _ => ComputedProperties.forward(property, inverse),
        }
    }

    fn name(&self) -> &str {
        "reference"
    }
}
