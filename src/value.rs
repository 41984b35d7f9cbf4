//! Literal constants and their arithmetic.
//!
//! The folding functions here are shared by constant folding in the smart
//! constructors and by the interpreter, so that an expression folded at
//! construction time evaluates to the same value it would have produced
//! at run time.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::node::{ArithOp, BitwiseOp, CompareOp};
use crate::types::{IntType, Type};

/// A fixed-width integer, stored as its two's-complement bit pattern.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FixedInt {
    ty: IntType,
    bits: u64,
}

impl FixedInt {
    /// Wraps `value` into the range of `ty`.
    pub fn new(ty: IntType, value: i128) -> Self {
        Self::from_bits(ty, value as u64)
    }

    /// Creates a value from a raw bit pattern, truncated to the width of `ty`.
    pub fn from_bits(ty: IntType, bits: u64) -> Self {
        Self {
            ty,
            bits: bits & ty.mask(),
        }
    }

    /// Wraps an arbitrary-precision integer into the range of `ty`.
    pub fn from_bigint(ty: IntType, value: &BigInt) -> Self {
        let modulus = BigInt::one() << 64;
        let mut residue: BigInt = value % &modulus;
        if residue.is_negative() {
            residue += &modulus;
        }
        let bits = residue.magnitude().iter_u64_digits().next().unwrap_or(0);
        Self::from_bits(ty, bits)
    }

    pub fn ty(self) -> IntType {
        self.ty
    }

    pub fn bits(self) -> u64 {
        self.bits
    }

    /// The mathematical value, honoring signedness.
    pub fn to_i128(self) -> i128 {
        if self.ty.is_signed() {
            let shift = 64 - self.ty.bits();
            (((self.bits << shift) as i64) >> shift) as i128
        } else {
            self.bits as i128
        }
    }

    pub fn to_bigint(self) -> BigInt {
        BigInt::from(self.to_i128())
    }

    pub fn is_zero(self) -> bool {
        self.bits == 0
    }

    pub fn is_one(self) -> bool {
        self.bits == 1
    }

    /// All bits set (`-1` for signed types, the maximum for unsigned ones).
    pub fn is_all_ones(self) -> bool {
        self.bits == self.ty.mask()
    }

    pub fn wrapping_add(self, other: Self) -> Self {
        Self::from_bits(self.ty, self.bits.wrapping_add(other.bits))
    }

    pub fn wrapping_sub(self, other: Self) -> Self {
        Self::from_bits(self.ty, self.bits.wrapping_sub(other.bits))
    }

    pub fn bitwise(self, op: BitwiseOp, other: Self) -> Self {
        let bits = match op {
            BitwiseOp::And => self.bits & other.bits,
            BitwiseOp::Or => self.bits | other.bits,
            BitwiseOp::Xor => self.bits ^ other.bits,
        };
        Self::from_bits(self.ty, bits)
    }

    pub fn bit_not(self) -> Self {
        Self::from_bits(self.ty, !self.bits)
    }

    pub fn compare(self, other: Self) -> Ordering {
        self.to_i128().cmp(&other.to_i128())
    }

    pub fn cast(self, ty: IntType) -> Self {
        Self::new(ty, self.to_i128())
    }
}

impl fmt::Display for FixedInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_i128())
    }
}

/// A literal constant.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Value {
    Bool(bool),
    Int(FixedInt),
    BigInt(BigInt),
    Real(BigRational),
    Char(char),
}

impl Value {
    pub fn int(ty: IntType, value: i128) -> Self {
        Value::Int(FixedInt::new(ty, value))
    }

    pub fn ty(&self) -> Type {
        match self {
            Value::Bool(_) => Type::Bool,
            Value::Int(i) => Type::Int(i.ty()),
            Value::BigInt(_) => Type::BigInt,
            Value::Real(_) => Type::Real,
            Value::Char(_) => Type::Char,
        }
    }

    /// The default (zero) literal of a primitive type.
    pub fn default_for(ty: &Type) -> Option<Value> {
        match ty {
            Type::Bool => Some(Value::Bool(false)),
            Type::Int(t) => Some(Value::int(*t, 0)),
            Type::BigInt => Some(Value::BigInt(BigInt::zero())),
            Type::Real => Some(Value::Real(BigRational::zero())),
            Type::Char => Some(Value::Char('\0')),
            _ => None,
        }
    }

    /// The literal `0` of a numeric type.
    pub fn zero(ty: &Type) -> Option<Value> {
        if ty.is_numeric() {
            Value::default_for(ty)
        } else {
            None
        }
    }

    /// The literal `1` of a numeric type.
    pub fn one(ty: &Type) -> Option<Value> {
        match ty {
            Type::Int(t) => Some(Value::int(*t, 1)),
            Type::BigInt => Some(Value::BigInt(BigInt::one())),
            Type::Real => Some(Value::Real(BigRational::one())),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Value::Int(i) => i.is_zero(),
            Value::BigInt(b) => b.is_zero(),
            Value::Real(r) => r.is_zero(),
            _ => false,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Value::Int(i) => i.is_one(),
            Value::BigInt(b) => b.is_one(),
            Value::Real(r) => r.is_one(),
            _ => false,
        }
    }

    /// Length as a non-negative machine integer, for sequence operations.
    pub fn to_index(&self) -> Option<usize> {
        self.as_bigint().and_then(|b| b.to_usize())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<BigInt> for Value {
    fn from(b: BigInt) -> Self {
        Value::BigInt(b)
    }
}

impl From<BigRational> for Value {
    fn from(r: BigRational) -> Self {
        Value::Real(r)
    }
}

macro_rules! impl_from_int {
    ($($t:ty => $it:expr),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::int($it, v as i128)
                }
            }
        )*
    };
}

impl_from_int! {
    i8 => IntType::I8,
    i16 => IntType::I16,
    i32 => IntType::I32,
    i64 => IntType::I64,
    u8 => IntType::U8,
    u16 => IntType::U16,
    u32 => IntType::U32,
    u64 => IntType::U64,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::BigInt(b) => write!(f, "{}", b),
            Value::Real(r) => write!(f, "{}", r),
            Value::Char(c) => write!(f, "{:?}", c),
        }
    }
}

/// Folds an arithmetic operator over two literals of the same numeric type.
///
/// # Panics
///
/// Panics on operands of different or non-numeric types, or on
/// multiplication of fixed-width integers; the smart constructors reject
/// both before folding.
pub fn fold_arith(op: ArithOp, a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => match op {
            ArithOp::Add => Value::Int(x.wrapping_add(*y)),
            ArithOp::Sub => Value::Int(x.wrapping_sub(*y)),
            ArithOp::Mul => unreachable!("multiplication of fixed-width integers"),
        },
        (Value::BigInt(x), Value::BigInt(y)) => Value::BigInt(match op {
            ArithOp::Add => x + y,
            ArithOp::Sub => x - y,
            ArithOp::Mul => x * y,
        }),
        (Value::Real(x), Value::Real(y)) => Value::Real(match op {
            ArithOp::Add => x + y,
            ArithOp::Sub => x - y,
            ArithOp::Mul => x * y,
        }),
        _ => unreachable!("arithmetic on {} and {}", a.ty(), b.ty()),
    }
}

/// Folds a bitwise operator over two fixed-width integer literals.
pub fn fold_bitwise(op: BitwiseOp, a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x.bitwise(op, *y)),
        _ => unreachable!("bitwise operation on {} and {}", a.ty(), b.ty()),
    }
}

pub fn fold_bit_not(a: &Value) -> Value {
    match a {
        Value::Int(x) => Value::Int(x.bit_not()),
        _ => unreachable!("bitwise negation of {}", a.ty()),
    }
}

/// Orders two literals of the same ordered type.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.compare(*y),
        (Value::BigInt(x), Value::BigInt(y)) => x.cmp(y),
        (Value::Real(x), Value::Real(y)) => x.cmp(y),
        (Value::Char(x), Value::Char(y)) => x.cmp(y),
        _ => unreachable!("comparison of {} and {}", a.ty(), b.ty()),
    }
}

pub fn fold_compare(op: CompareOp, a: &Value, b: &Value) -> Value {
    Value::Bool(op.holds(compare_values(a, b)))
}

/// Whether a value of type `from` may be cast to type `to`.
pub fn can_cast(from: &Type, to: &Type) -> bool {
    match (from, to) {
        (a, b) if a == b => true,
        (Type::Int(_) | Type::BigInt, Type::Int(_) | Type::BigInt | Type::Real) => true,
        (Type::Char, Type::Int(_)) | (Type::Int(_), Type::Char) => true,
        _ => false,
    }
}

/// Casts a literal between compatible representations.
///
/// Narrowing integer casts wrap. Casting an integer to `char` yields the
/// replacement character when the value is not a Unicode scalar.
pub fn fold_cast(value: &Value, to: &Type) -> Value {
    match (value, to) {
        (v, t) if &v.ty() == t => v.clone(),
        (Value::Int(x), Type::Int(t)) => Value::Int(x.cast(*t)),
        (Value::Int(x), Type::BigInt) => Value::BigInt(x.to_bigint()),
        (Value::Int(x), Type::Real) => Value::Real(BigRational::from_integer(x.to_bigint())),
        (Value::BigInt(x), Type::Int(t)) => Value::Int(FixedInt::from_bigint(*t, x)),
        (Value::BigInt(x), Type::Real) => Value::Real(BigRational::from_integer(x.clone())),
        (Value::Char(c), Type::Int(t)) => Value::int(*t, *c as i128),
        (Value::Int(x), Type::Char) => Value::Char(
            u32::try_from(x.to_i128())
                .ok()
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER),
        ),
        _ => unreachable!("cast from {} to {}", value.ty(), to),
    }
}

/// First position at or after `from` where `sub` occurs in `seq`.
pub fn seq_find<T: PartialEq>(seq: &[T], sub: &[T], from: usize) -> Option<usize> {
    if from > seq.len() {
        return None;
    }
    if sub.is_empty() {
        return Some(from);
    }
    seq[from..].windows(sub.len()).position(|w| w == sub).map(|i| i + from)
}

/// The element at `index` as a sequence of length one, or the empty
/// sequence when `index` is out of bounds.
pub fn seq_at<T: Clone>(seq: &[T], index: &BigInt) -> Vec<T> {
    match index.to_usize() {
        Some(i) if i < seq.len() => vec![seq[i].clone()],
        _ => vec![],
    }
}

pub fn seq_contains<T: PartialEq>(seq: &[T], sub: &[T]) -> bool {
    seq_find(seq, sub, 0).is_some()
}

/// Position of the first occurrence of `sub` at or after `offset`, or `-1`.
pub fn seq_index_of<T: PartialEq>(seq: &[T], sub: &[T], offset: &BigInt) -> BigInt {
    match offset.to_usize().and_then(|o| seq_find(seq, sub, o)) {
        Some(i) => BigInt::from(i),
        None => BigInt::from(-1),
    }
}

/// At most `length` elements starting at `offset`; empty when `offset` is
/// out of bounds or `length` is not positive.
pub fn seq_slice<T: Clone>(seq: &[T], offset: &BigInt, length: &BigInt) -> Vec<T> {
    if length.is_negative() {
        return vec![];
    }
    let n = length.to_usize().unwrap_or(usize::MAX);
    match offset.to_usize() {
        Some(o) if o < seq.len() => seq[o..o.saturating_add(n).min(seq.len())].to_vec(),
        _ => vec![],
    }
}

/// Replaces the first occurrence of `pattern`. An empty pattern occurs at
/// the front of every sequence.
pub fn seq_replace_first<T: Clone + PartialEq>(seq: &[T], pattern: &[T], replacement: &[T]) -> Vec<T> {
    match seq_find(seq, pattern, 0) {
        Some(i) => [&seq[..i], replacement, &seq[i + pattern.len()..]].concat(),
        None => seq.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_wrapping() {
        let a = FixedInt::new(IntType::U8, 250);
        let b = FixedInt::new(IntType::U8, 10);
        assert_eq!(a.wrapping_add(b).to_i128(), 4);
        assert_eq!(b.wrapping_sub(a).to_i128(), 16);

        let m = FixedInt::new(IntType::I8, 127);
        let one = FixedInt::new(IntType::I8, 1);
        assert_eq!(m.wrapping_add(one).to_i128(), -128);
    }

    #[test]
    fn test_fixed_signed_compare() {
        let neg = FixedInt::new(IntType::I32, -1);
        let pos = FixedInt::new(IntType::I32, 1);
        assert_eq!(neg.compare(pos), Ordering::Less);

        let big = FixedInt::new(IntType::U32, -1);
        assert_eq!(big.to_i128(), u32::MAX as i128);
        assert_eq!(big.compare(FixedInt::new(IntType::U32, 1)), Ordering::Greater);
    }

    #[test]
    fn test_fixed_bitwise() {
        let a = FixedInt::new(IntType::U8, 0b1100);
        let b = FixedInt::new(IntType::U8, 0b1010);
        assert_eq!(a.bitwise(BitwiseOp::And, b).bits(), 0b1000);
        assert_eq!(a.bitwise(BitwiseOp::Or, b).bits(), 0b1110);
        assert_eq!(a.bitwise(BitwiseOp::Xor, b).bits(), 0b0110);
        assert_eq!(a.bit_not().bits(), 0b1111_0011);
        assert!(FixedInt::new(IntType::I16, -1).is_all_ones());
    }

    #[test]
    fn test_from_bigint_wraps() {
        let x = BigInt::from(-1);
        assert_eq!(FixedInt::from_bigint(IntType::U16, &x).to_i128(), 0xFFFF);
        let y = BigInt::from(300);
        assert_eq!(FixedInt::from_bigint(IntType::I8, &y).to_i128(), 44);
    }

    #[test]
    fn test_fold_arith() {
        let a = Value::BigInt(BigInt::from(6));
        let b = Value::BigInt(BigInt::from(7));
        assert_eq!(fold_arith(ArithOp::Mul, &a, &b), Value::BigInt(BigInt::from(42)));

        let half = Value::Real(BigRational::new(BigInt::from(1), BigInt::from(2)));
        let third = Value::Real(BigRational::new(BigInt::from(1), BigInt::from(3)));
        assert_eq!(
            fold_arith(ArithOp::Add, &half, &third),
            Value::Real(BigRational::new(BigInt::from(5), BigInt::from(6)))
        );
        assert_eq!(fold_arith(ArithOp::Sub, &Value::from(2i32), &Value::from(5i32)), Value::from(-3i32));
    }

    #[test]
    fn test_fold_cast() {
        assert_eq!(fold_cast(&Value::from(-1i32), &Type::uint8()), Value::from(255u8));
        assert_eq!(fold_cast(&Value::from(200u8), &Type::BigInt), Value::BigInt(BigInt::from(200)));
        assert_eq!(fold_cast(&Value::Char('a'), &Type::int32()), Value::from(97i32));
        assert_eq!(fold_cast(&Value::from(98i32), &Type::Char), Value::Char('b'));
        assert!(can_cast(&Type::BigInt, &Type::Real));
        assert!(!can_cast(&Type::Real, &Type::BigInt));
        assert!(!can_cast(&Type::Bool, &Type::int32()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(-3i64).to_string(), "-3");
        assert_eq!(Value::Char('x').to_string(), "'x'");
        assert_eq!(
            Value::Real(BigRational::new(BigInt::from(2), BigInt::from(4))).to_string(),
            "1/2"
        );
    }

    #[test]
    fn test_seq_semantics() {
        let s: Vec<char> = "hello".chars().collect();
        let ll: Vec<char> = "ll".chars().collect();
        let big = |i: i64| BigInt::from(i);

        assert_eq!(seq_at(&s, &big(1)), vec!['e']);
        assert_eq!(seq_at(&s, &big(5)), Vec::<char>::new());
        assert_eq!(seq_at(&s, &big(-1)), Vec::<char>::new());

        assert!(seq_contains(&s, &ll));
        assert!(seq_contains(&s, &[]));
        assert!(!seq_contains(&ll, &s));

        assert_eq!(seq_index_of(&s, &ll, &big(0)), big(2));
        assert_eq!(seq_index_of(&s, &ll, &big(3)), big(-1));
        assert_eq!(seq_index_of(&s, &[], &big(5)), big(5));
        assert_eq!(seq_index_of(&s, &[], &big(6)), big(-1));

        assert_eq!(seq_slice(&s, &big(1), &big(3)), vec!['e', 'l', 'l']);
        assert_eq!(seq_slice(&s, &big(3), &big(100)), vec!['l', 'o']);
        assert_eq!(seq_slice(&s, &big(5), &big(1)), Vec::<char>::new());
        assert_eq!(seq_slice(&s, &big(0), &big(-2)), Vec::<char>::new());

        let r: Vec<char> = seq_replace_first(&s, &['l'], &['L', 'L']);
        assert_eq!(r.iter().collect::<String>(), "heLLlo");
        assert_eq!(seq_replace_first(&s, &['z'], &['y']), s);
        assert_eq!(seq_replace_first(&ll, &[], &['x']), vec!['x', 'l', 'l']);
    }
}
