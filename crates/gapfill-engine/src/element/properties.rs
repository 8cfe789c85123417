//! Number-theoretic predicates and their inverses, computed on the fly.

use std::sync::{Mutex, OnceLock, PoisonError};

use crate::numeric::near_integer;

/// Largest value the prime sieve will cover when ranking or generating primes.
pub const SIEVE_LIMIT: usize = 20_000_000;

/// Exact integer value of `v`, if it has one.
fn exact_integer(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() <= 9.0e15).then_some(v as i64)
}

/// Sieve of Eratosthenes over `0..=limit`.
pub(crate) fn sieve(limit: usize) -> Vec<bool> {
    let mut is_prime = vec![true; limit + 1];
    is_prime[0] = false;
    if limit >= 1 {
        is_prime[1] = false;
    }
    let mut i = 2;
    while i * i <= limit {
        if is_prime[i] {
            let mut j = i * i;
            while j <= limit {
                is_prime[j] = false;
                j += i;
            }
        }
        i += 1;
    }
    is_prime
}

// ── Primes ──────────────────────────────────────────────────────────────

/// Trial division over 6k ± 1.
pub fn is_prime_integer(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i: i64 = 5;
    let mut w: i64 = 2;
    while i.saturating_mul(i) <= n {
        if n % i == 0 {
            return false;
        }
        i += w;
        w = 6 - w;
    }
    true
}

pub fn is_prime(v: f64) -> bool {
    exact_integer(v).is_some_and(is_prime_integer)
}

// ── Prime Table ─────────────────────────────────────────────────────────

/// Primes up to `limit`, ascending. Grown on demand and shared process-wide.
struct PrimeTable {
    limit: usize,
    primes: Vec<u32>,
}

impl PrimeTable {
    const fn new() -> Self {
        Self {
            limit: 0,
            primes: Vec::new(),
        }
    }

    /// Make sure every prime up to `limit` is listed.
    ///
    /// Grows at least geometrically so repeated small extensions stay cheap.
    fn cover(&mut self, limit: usize) {
        if limit <= self.limit {
            return;
        }
        let target = limit.max(self.limit.saturating_mul(2)).min(SIEVE_LIMIT);
        self.primes = sieve(target)
            .into_iter()
            .enumerate()
            .filter(|(_, p)| *p)
            .map(|(n, _)| n as u32)
            .collect();
        self.limit = target;
    }
}

static PRIME_TABLE: OnceLock<Mutex<PrimeTable>> = OnceLock::new();

/// Run `f` over a table holding every prime up to `limit` (at most [`SIEVE_LIMIT`]).
fn with_primes<R>(limit: usize, f: impl FnOnce(&[u32]) -> R) -> R {
    let table = PRIME_TABLE.get_or_init(|| Mutex::new(PrimeTable::new()));
    let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
    table.cover(limit.min(SIEVE_LIMIT));
    f(&table.primes)
}

/// 1-based position of a prime among all primes (2 → 1, 3 → 2, 5 → 3, ...).
pub fn prime_ordinal(v: f64) -> Option<f64> {
    let n = exact_integer(v)?;
    if !is_prime_integer(n) || n as u64 > SIEVE_LIMIT as u64 {
        return None;
    }
    with_primes(n as usize, |primes| {
        primes
            .binary_search(&(n as u32))
            .ok()
            .map(|rank| (rank + 1) as f64)
    })
}

/// The `ordinal`-th prime (1-based).
pub fn nth_prime(ordinal: f64) -> Option<f64> {
    let k = near_integer(ordinal)?;
    if k < 1 {
        return None;
    }
    let k = k as usize;
    // Rosser's bound p_k < k (ln k + ln ln k) holds for k >= 6.
    let limit = if k < 6 {
        13
    } else {
        let kf = k as f64;
        (kf * (kf.ln() + kf.ln().ln())).ceil() as usize
    };
    if limit > SIEVE_LIMIT {
        return None;
    }
    with_primes(limit, |primes| primes.get(k - 1).map(|p| f64::from(*p)))
}

// ── Squares ─────────────────────────────────────────────────────────────

/// Integer square of a non-negative integer (0 included).
pub fn is_square(v: f64) -> bool {
    square_root(v).is_some()
}

/// Non-negative root of a perfect square.
pub fn square_root(v: f64) -> Option<f64> {
    let n = exact_integer(v)?;
    if n < 0 {
        return None;
    }
    let r = (n as f64).sqrt().round() as i128;
    (r * r == n as i128).then_some(r as f64)
}

// ── Cubes ───────────────────────────────────────────────────────────────

/// Integer cube of an integer, negatives included.
pub fn is_cube(v: f64) -> bool {
    cube_root(v).is_some()
}

/// Signed real root of a perfect cube.
pub fn cube_root(v: f64) -> Option<f64> {
    let n = exact_integer(v)?;
    let r = (n as f64).cbrt().round() as i128;
    (r * r * r == n as i128).then_some(r as f64)
}
