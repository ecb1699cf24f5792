//! Dense integer handles into the global tables owned by [`crate::tables::PreprocessingContext`].
//!
//! Each handle type is generated with [`aries_collections::create_ref_type`], the same
//! `NonZeroU32`-backed newtype idiom used throughout the `aries` workspace for symbol, type and
//! variable identifiers. The `NonZeroU32` encoding is an implementation detail: handles are still
//! dense and 0-based from the outside (`from_u32`/`to_u32`), and implement `Ref` so they drop
//! straight into `RefStore`/`RefPool`.

use aries_collections::create_ref_type;

create_ref_type!(PredicateId);
create_ref_type!(TypeId);
create_ref_type!(ConstantId);
create_ref_type!(VarId);

impl std::fmt::Display for PredicateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.to_u32())
    }
}
impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.to_u32())
    }
}
impl std::fmt::Display for ConstantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.to_u32())
    }
}
impl std::fmt::Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "?v{}", self.to_u32())
    }
}

/// A reference appearing in an [`crate::expr::ExprNode`] argument vector: either a bound
/// constant or a (negatively-encoded) reference to one of the enclosing action/method's
/// parameters.
///
/// The wire encoding matches the source IR: the variable with 0-based index `i` is stored as
/// `-(i+1)`, while constants are stored as their non-negative [`ConstantId`]. This type is the
/// decoded, matchable counterpart used internally once an argument has been read out of the
/// raw `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgRef {
    Constant(ConstantId),
    Param(usize),
}

impl ArgRef {
    pub fn decode(raw: i32) -> ArgRef {
        if raw < 0 {
            ArgRef::Param((-raw - 1) as usize)
        } else {
            ArgRef::Constant(ConstantId::from_u32(raw as u32))
        }
    }

    pub fn encode(self) -> i32 {
        match self {
            ArgRef::Param(i) => -(i as i32) - 1,
            ArgRef::Constant(c) => c.to_u32() as i32,
        }
    }

    pub fn as_param(self) -> Option<usize> {
        match self {
            ArgRef::Param(i) => Some(i),
            ArgRef::Constant(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_ref_round_trips() {
        for i in 0..8usize {
            assert_eq!(ArgRef::decode(ArgRef::Param(i).encode()), ArgRef::Param(i));
        }
        for c in 0..8u32 {
            let a = ArgRef::Constant(ConstantId::from_u32(c));
            assert_eq!(ArgRef::decode(a.encode()), a);
        }
    }

    #[test]
    fn param_zero_is_minus_one() {
        assert_eq!(ArgRef::Param(0).encode(), -1);
        assert_eq!(ArgRef::Param(1).encode(), -2);
    }
}
