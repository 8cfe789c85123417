//! Test kinds and the rule records a confirmed test leaves in a hypothesis log.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

// ── Test Kinds ──────────────────────────────────────────────────────────

/// Structural tests applied to a single strided subsequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// All known values equal.
    Constant,
    /// Constant difference between neighbours.
    Arithmetic,
    /// Constant ratio between neighbours.
    Geometric,
    /// Each value is the sum of the two before it.
    Fibonacci,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        Self::Constant,
        Self::Arithmetic,
        Self::Geometric,
        Self::Fibonacci,
    ];

    /// Short configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant => "const",
            Self::Arithmetic => "sum",
            Self::Geometric => "fac",
            Self::Fibonacci => "fib",
        }
    }
}

/// Tests applied independently to every block of a consecutive-block partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Constant,
    Arithmetic,
    Geometric,
}

impl BlockKind {
    pub const ALL: [BlockKind; 3] = [Self::Constant, Self::Arithmetic, Self::Geometric];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant => "const",
            Self::Arithmetic => "sum",
            Self::Geometric => "fac",
        }
    }

    /// Name used in rule logs, distinguishing block rules from shape rules.
    pub fn log_name(&self) -> &'static str {
        match self {
            Self::Constant => "cons_const",
            Self::Arithmetic => "cons_sum",
            Self::Geometric => "cons_fac",
        }
    }
}

/// Number-theoretic element properties used for normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementProperty {
    Prime,
    Square,
    Cube,
}

impl ElementProperty {
    pub const ALL: [ElementProperty; 3] = [Self::Prime, Self::Square, Self::Cube];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Prime => "prime",
            Self::Square => "square",
            Self::Cube => "cube",
        }
    }
}

macro_rules! impl_kind_text {
    ($kind:ty) => {
        impl FromStr for $kind {
            type Err = TypesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                <$kind>::ALL
                    .iter()
                    .copied()
                    .find(|k| k.name().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| TypesError::UnknownTestKind(wanted.to_string()))
            }
        }

        impl std::fmt::Display for $kind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

impl_kind_text!(ShapeKind);
impl_kind_text!(BlockKind);
impl_kind_text!(ElementProperty);

// ── Sign ────────────────────────────────────────────────────────────────

/// Orientation under which an element property was tested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    #[serde(rename = "+")]
    Positive,
    #[serde(rename = "-")]
    Negative,
}

impl Sign {
    pub const BOTH: [Sign; 2] = [Self::Negative, Self::Positive];

    pub fn factor(&self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

impl ElementProperty {
    /// Orientations worth testing.
    ///
    /// The cube root is odd, so the negative orientation of a cube repeats
    /// the positive one.
    pub fn orientations(&self) -> &'static [Sign] {
        match self {
            Self::Cube => &[Sign::Positive],
            Self::Prime | Self::Square => &Sign::BOTH,
        }
    }
}

impl std::fmt::Display for Sign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => f.write_str("+"),
            Self::Negative => f.write_str("-"),
        }
    }
}

// ── Rule Records ────────────────────────────────────────────────────────

/// The characterizing parameter of a confirmed shape or block test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleParameter {
    /// Common value, difference or ratio.
    Scalar(f64),
    /// Per-block constants, in block order.
    PerBlock(Vec<f64>),
    /// Window start indices (within the subsequence) that supported a recurrence.
    Positions(Vec<usize>),
}

impl std::fmt::Display for RuleParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{}", v),
            Self::PerBlock(vs) => {
                let parts: Vec<String> = vs.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Positions(ps) => {
                let parts: Vec<String> = ps.iter().map(|p| p.to_string()).collect();
                write!(f, "@[{}]", parts.join(", "))
            }
        }
    }
}

/// One entry of a hypothesis rule log, in application order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleRecord {
    /// Known values of a strided subsequence were rewritten by a property inverse.
    Normalize {
        property: ElementProperty,
        offset: usize,
        stride: usize,
        sign: Sign,
    },
    /// A shape test confirmed and filled a strided subsequence.
    Shape {
        kind: ShapeKind,
        offset: usize,
        stride: usize,
        parameter: RuleParameter,
    },
    /// A block test confirmed and filled a consecutive-block partition.
    Block {
        kind: BlockKind,
        offset: usize,
        block_length: usize,
        stride: usize,
        parameter: RuleParameter,
    },
}

impl std::fmt::Display for RuleRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normalize {
                property,
                offset,
                stride,
                sign,
            } => write!(f, "({}, {}, {}, {})", property, offset, stride, sign),
            Self::Shape {
                kind,
                offset,
                stride,
                parameter,
            } => write!(f, "({}, {}, {}, {})", kind, offset, stride, parameter),
            Self::Block {
                kind,
                offset,
                block_length,
                stride,
                parameter,
            } => write!(
                f,
                "({}, {}, {}, {}, {})",
                kind.log_name(),
                offset,
                block_length,
                stride,
                parameter
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubes_are_tested_in_one_orientation() {
        assert_eq!(ElementProperty::Cube.orientations(), &[Sign::Positive]);
        assert_eq!(ElementProperty::Prime.orientations(), &Sign::BOTH);
        assert_eq!(ElementProperty::Square.orientations().len(), 2);
    }

    #[test]
    fn kinds_parse_from_short_names() {
        assert_eq!("const".parse::<ShapeKind>().unwrap(), ShapeKind::Constant);
        assert_eq!("fib".parse::<ShapeKind>().unwrap(), ShapeKind::Fibonacci);
        assert_eq!(" FAC ".parse::<BlockKind>().unwrap(), BlockKind::Geometric);
        assert_eq!(
            "cube".parse::<ElementProperty>().unwrap(),
            ElementProperty::Cube
        );
    }

    #[test]
    fn unknown_name_is_reported() {
        let err = "fib".parse::<BlockKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown test kind: fib");
        assert!("lucas".parse::<ShapeKind>().is_err());
    }

    #[test]
    fn names_round_trip_through_display() {
        for kind in ShapeKind::ALL {
            assert_eq!(kind.to_string().parse::<ShapeKind>().unwrap(), kind);
        }
        for prop in ElementProperty::ALL {
            assert_eq!(prop.to_string().parse::<ElementProperty>().unwrap(), prop);
        }
    }

    #[test]
    fn record_display_matches_log_layout() {
        let rec = RuleRecord::Shape {
            kind: ShapeKind::Arithmetic,
            offset: 0,
            stride: 1,
            parameter: RuleParameter::Scalar(2.0),
        };
        assert_eq!(rec.to_string(), "(sum, 0, 1, 2)");

        let rec = RuleRecord::Block {
            kind: BlockKind::Constant,
            offset: 1,
            block_length: 2,
            stride: 3,
            parameter: RuleParameter::PerBlock(vec![4.0, 5.0]),
        };
        assert_eq!(rec.to_string(), "(cons_const, 1, 2, 3, [4, 5])");

        let rec = RuleRecord::Normalize {
            property: ElementProperty::Prime,
            offset: 0,
            stride: 2,
            sign: Sign::Negative,
        };
        assert_eq!(rec.to_string(), "(prime, 0, 2, -)");
    }

    #[test]
    fn record_serializes_with_rule_tag() {
        let rec = RuleRecord::Shape {
            kind: ShapeKind::Fibonacci,
            offset: 0,
            stride: 1,
            parameter: RuleParameter::Positions(vec![0, 1]),
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["rule"], "shape");
        assert_eq!(json["kind"], "fibonacci");
        assert_eq!(json["parameter"]["positions"][1], 1);
    }
}
