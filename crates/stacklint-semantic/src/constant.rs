// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Compile-time constant values and folding.

use stacklint_ast::expr::{BinOp, UnaryOp};
use std::fmt;
use thiserror::Error;

use crate::types::SpecialType;

/// A folded compile-time constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    /// Any integral value; wide enough for every C# integral type.
    Int(i128),
    Real(f64),
    Bool(bool),
    Char(char),
    String(String),
    Null,
}

impl ConstValue {
    /// Integral view; chars promote to their code point.
    pub fn as_int(&self) -> Option<i128> {
        match self {
            ConstValue::Int(v) => Some(*v),
            ConstValue::Char(c) => Some(*c as i128),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn as_real(&self) -> Option<f64> {
        match self {
            ConstValue::Real(v) => Some(*v),
            other => other.as_int().map(|v| v as f64),
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{}", v),
            ConstValue::Real(v) => write!(f, "{}", v),
            ConstValue::Bool(b) => write!(f, "{}", b),
            ConstValue::Char(c) => write!(f, "'{}'", c),
            ConstValue::String(s) => write!(f, "\"{}\"", s),
            ConstValue::Null => f.write_str("null"),
        }
    }
}

/// Why an expression has no constant value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstError {
    #[error("expression is not a compile-time constant")]
    NotConstant,
    #[error("constant '{name}' depends on itself")]
    Cycle { name: String },
    #[error("constant arithmetic overflows")]
    Overflow,
    #[error("division by zero in a constant expression")]
    DivideByZero,
    #[error("constant value {value} does not fit in {target}")]
    OutOfRange { value: i128, target: &'static str },
}

/// Fold a unary operator over a constant operand.
pub fn fold_unary(op: UnaryOp, operand: ConstValue) -> Result<ConstValue, ConstError> {
    match (op, &operand) {
        (UnaryOp::Plus, ConstValue::Real(v)) => Ok(ConstValue::Real(*v)),
        (UnaryOp::Neg, ConstValue::Real(v)) => Ok(ConstValue::Real(-v)),
        (UnaryOp::Not, ConstValue::Bool(b)) => Ok(ConstValue::Bool(!b)),
        (UnaryOp::Plus | UnaryOp::Neg | UnaryOp::BitNot, _) => {
            let v = operand.as_int().ok_or(ConstError::NotConstant)?;
            match op {
                UnaryOp::Plus => Ok(ConstValue::Int(v)),
                UnaryOp::Neg => v.checked_neg().map(ConstValue::Int).ok_or(ConstError::Overflow),
                _ => Ok(ConstValue::Int(!v)),
            }
        }
        _ => Err(ConstError::NotConstant),
    }
}

/// Fold a binary operator over constant operands.
pub fn fold_binary(op: BinOp, left: ConstValue, right: ConstValue) -> Result<ConstValue, ConstError> {
    if let (ConstValue::String(l), ConstValue::String(r)) = (&left, &right) {
        return match op {
            BinOp::Add => Ok(ConstValue::String(format!("{}{}", l, r))),
            BinOp::Eq => Ok(ConstValue::Bool(l == r)),
            BinOp::Ne => Ok(ConstValue::Bool(l != r)),
            _ => Err(ConstError::NotConstant),
        };
    }

    if let (Some(l), Some(r)) = (left.as_bool(), right.as_bool()) {
        return match op {
            BinOp::And | BinOp::BitAnd => Ok(ConstValue::Bool(l && r)),
            BinOp::Or | BinOp::BitOr => Ok(ConstValue::Bool(l || r)),
            BinOp::BitXor | BinOp::Ne => Ok(ConstValue::Bool(l != r)),
            BinOp::Eq => Ok(ConstValue::Bool(l == r)),
            _ => Err(ConstError::NotConstant),
        };
    }

    if let (Some(l), Some(r)) = (left.as_int(), right.as_int()) {
        return fold_integral(op, l, r);
    }

    match (left.as_real(), right.as_real()) {
        (Some(l), Some(r)) => fold_real(op, l, r),
        _ => Err(ConstError::NotConstant),
    }
}

fn fold_integral(op: BinOp, l: i128, r: i128) -> Result<ConstValue, ConstError> {
    let int = |v: Option<i128>| v.map(ConstValue::Int).ok_or(ConstError::Overflow);
    match op {
        BinOp::Add => int(l.checked_add(r)),
        BinOp::Sub => int(l.checked_sub(r)),
        BinOp::Mul => int(l.checked_mul(r)),
        BinOp::Div if r == 0 => Err(ConstError::DivideByZero),
        BinOp::Div => int(l.checked_div(r)),
        BinOp::Mod if r == 0 => Err(ConstError::DivideByZero),
        BinOp::Mod => int(l.checked_rem(r)),
        // shift counts are masked to the operand width
        BinOp::Shl => int(l.checked_shl((r & 63) as u32)),
        BinOp::Shr => int(l.checked_shr((r & 63) as u32)),
        BinOp::BitAnd => Ok(ConstValue::Int(l & r)),
        BinOp::BitOr => Ok(ConstValue::Int(l | r)),
        BinOp::BitXor => Ok(ConstValue::Int(l ^ r)),
        BinOp::Eq => Ok(ConstValue::Bool(l == r)),
        BinOp::Ne => Ok(ConstValue::Bool(l != r)),
        BinOp::Lt => Ok(ConstValue::Bool(l < r)),
        BinOp::Gt => Ok(ConstValue::Bool(l > r)),
        BinOp::Le => Ok(ConstValue::Bool(l <= r)),
        BinOp::Ge => Ok(ConstValue::Bool(l >= r)),
        BinOp::And | BinOp::Or | BinOp::Coalesce => Err(ConstError::NotConstant),
    }
}

fn fold_real(op: BinOp, l: f64, r: f64) -> Result<ConstValue, ConstError> {
    match op {
        BinOp::Add => Ok(ConstValue::Real(l + r)),
        BinOp::Sub => Ok(ConstValue::Real(l - r)),
        BinOp::Mul => Ok(ConstValue::Real(l * r)),
        BinOp::Div => Ok(ConstValue::Real(l / r)),
        BinOp::Mod => Ok(ConstValue::Real(l % r)),
        BinOp::Eq => Ok(ConstValue::Bool(l == r)),
        BinOp::Ne => Ok(ConstValue::Bool(l != r)),
        BinOp::Lt => Ok(ConstValue::Bool(l < r)),
        BinOp::Gt => Ok(ConstValue::Bool(l > r)),
        BinOp::Le => Ok(ConstValue::Bool(l <= r)),
        BinOp::Ge => Ok(ConstValue::Bool(l >= r)),
        _ => Err(ConstError::NotConstant),
    }
}

/// Convert a constant to `target`. Constant conversions are checked:
/// integral values outside the target range are an error.
pub fn fold_cast(target: SpecialType, value: ConstValue) -> Result<ConstValue, ConstError> {
    if let Some((min, max)) = target.integral_range() {
        let v = match &value {
            ConstValue::Real(r) if r.fract() == 0.0 => *r as i128,
            other => other.as_int().ok_or(ConstError::NotConstant)?,
        };
        if v < min || v > max {
            return Err(ConstError::OutOfRange { value: v, target: target.metadata_name() });
        }
        return Ok(match target {
            SpecialType::Char => char::from_u32(v as u32).map(ConstValue::Char).ok_or(ConstError::OutOfRange {
                value: v,
                target: target.metadata_name(),
            })?,
            _ => ConstValue::Int(v),
        });
    }

    match target {
        SpecialType::Single | SpecialType::Double | SpecialType::Decimal | SpecialType::Half => {
            value.as_real().map(ConstValue::Real).ok_or(ConstError::NotConstant)
        }
        SpecialType::Boolean if value.as_bool().is_some() => Ok(value),
        SpecialType::String if matches!(value, ConstValue::String(_) | ConstValue::Null) => Ok(value),
        SpecialType::Object if matches!(value, ConstValue::Null) => Ok(value),
        _ => Err(ConstError::NotConstant),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn integral_arithmetic() {
        assert_eq!(fold_binary(BinOp::Mul, ConstValue::Int(16), ConstValue::Int(64)), Ok(ConstValue::Int(1024)));
        assert_eq!(fold_binary(BinOp::Shl, ConstValue::Int(1), ConstValue::Int(10)), Ok(ConstValue::Int(1024)));
        assert_eq!(fold_binary(BinOp::Div, ConstValue::Int(1), ConstValue::Int(0)), Err(ConstError::DivideByZero));
        assert_eq!(fold_binary(BinOp::Lt, ConstValue::Int(1), ConstValue::Int(2)), Ok(ConstValue::Bool(true)));
    }

    #[test]
    fn chars_promote() {
        assert_eq!(fold_binary(BinOp::Sub, ConstValue::Char('b'), ConstValue::Char('a')), Ok(ConstValue::Int(1)));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(fold_unary(UnaryOp::Neg, ConstValue::Int(i128::MIN)), Err(ConstError::Overflow));
        assert_eq!(
            fold_binary(BinOp::Mul, ConstValue::Int(i128::MAX), ConstValue::Int(2)),
            Err(ConstError::Overflow)
        );
    }

    #[test]
    fn checked_casts() {
        assert_eq!(fold_cast(SpecialType::Byte, ConstValue::Int(200)), Ok(ConstValue::Int(200)));
        assert_eq!(
            fold_cast(SpecialType::Byte, ConstValue::Int(300)),
            Err(ConstError::OutOfRange { value: 300, target: "Byte" })
        );
        assert_eq!(fold_cast(SpecialType::Int32, ConstValue::Char('A')), Ok(ConstValue::Int(65)));
    }

    #[test]
    fn strings_concatenate() {
        assert_eq!(
            fold_binary(BinOp::Add, ConstValue::String("a".into()), ConstValue::String("b".into())),
            Ok(ConstValue::String("ab".into()))
        );
    }
}
