//! Outcome of a single pattern test.

/// Result of running one test over one subsequence or block partition.
///
/// `Inconclusive` is not a failure: it means there was not enough evidence
/// (too few known values, nothing left to explain, or a degenerate numeric
/// case such as a zero anchor) and the engine moves on.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict<P> {
    Confirmed(P),
    Rejected,
    Inconclusive,
}

impl<P> Verdict<P> {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// The confirmed parameter, if any.
    pub fn confirmed(self) -> Option<P> {
        match self {
            Self::Confirmed(p) => Some(p),
            _ => None,
        }
    }

    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> Verdict<Q> {
        match self {
            Self::Confirmed(p) => Verdict::Confirmed(f(p)),
            Self::Rejected => Verdict::Rejected,
            Self::Inconclusive => Verdict::Inconclusive,
        }
    }
}
