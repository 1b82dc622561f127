//! Literal evaluation for constant folding
//!
//! Mirrors the source language's operator semantics over literal values.
//! Anything that would raise at runtime, overflow a machine integer, produce
//! a non-finite float, or mix incompatible types yields `None`: the caller
//! then leaves the expression alone.

use pyopt_core::ast::{Constant, Operator};

/// Longest string a fold may produce
pub const MAX_FOLDED_STR_LEN: usize = 4096;

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

fn as_number(value: &Constant) -> Option<Number> {
    match value {
        Constant::Int(i) => Some(Number::Int(*i)),
        Constant::Bool(b) => Some(Number::Int(i64::from(*b))),
        Constant::Float(f) => Some(Number::Float(*f)),
        Constant::Str(_) | Constant::None => None,
    }
}

fn as_int(value: &Constant) -> Option<i64> {
    match as_number(value)? {
        Number::Int(i) => Some(i),
        Number::Float(_) => None,
    }
}

/// Evaluate `left op right`
pub fn evaluate(op: Operator, left: &Constant, right: &Constant) -> Option<Constant> {
    match (left, right) {
        (Constant::Str(a), Constant::Str(b)) if op == Operator::Add => {
            if a.len() + b.len() > MAX_FOLDED_STR_LEN {
                return None;
            }
            Some(Constant::Str(format!("{a}{b}")))
        }
        (Constant::Str(s), count) | (count, Constant::Str(s)) if op == Operator::Mult => {
            repeat(s, as_int(count)?)
        }
        (Constant::Str(_), _) | (_, Constant::Str(_)) => None,
        (Constant::Bool(a), Constant::Bool(b)) if is_bitwise(op) => Some(Constant::Bool(match op {
            Operator::BitAnd => a & b,
            Operator::BitOr => a | b,
            _ => a ^ b,
        })),
        _ => match (as_number(left)?, as_number(right)?) {
            (Number::Int(a), Number::Int(b)) => int_op(op, a, b),
            (a, b) => float_op(op, to_float(a), to_float(b)),
        },
    }
}

fn is_bitwise(op: Operator) -> bool {
    matches!(op, Operator::BitAnd | Operator::BitOr | Operator::BitXor)
}

fn to_float(n: Number) -> f64 {
    match n {
        Number::Int(i) => i as f64,
        Number::Float(f) => f,
    }
}

fn repeat(s: &str, count: i64) -> Option<Constant> {
    let count = usize::try_from(count).unwrap_or(0);
    let len = s.len().checked_mul(count)?;
    if len > MAX_FOLDED_STR_LEN {
        return None;
    }
    Some(Constant::Str(s.repeat(count)))
}

fn int_op(op: Operator, a: i64, b: i64) -> Option<Constant> {
    let value = match op {
        Operator::Add => a.checked_add(b)?,
        Operator::Sub => a.checked_sub(b)?,
        Operator::Mult => a.checked_mul(b)?,
        Operator::Div => {
            if b == 0 {
                return None;
            }
            return finite(a as f64 / b as f64);
        }
        Operator::FloorDiv => floor_div(a, b)?,
        Operator::Mod => floor_mod(a, b)?,
        Operator::Pow => {
            if b < 0 {
                if a == 0 {
                    return None;
                }
                return finite((a as f64).powf(b as f64));
            }
            a.checked_pow(u32::try_from(b).ok()?)?
        }
        Operator::LShift => {
            if b < 0 {
                return None;
            }
            if a == 0 {
                0
            } else if b >= 63 {
                return None;
            } else {
                let shifted = a << b;
                if shifted >> b != a {
                    return None;
                }
                shifted
            }
        }
        Operator::RShift => {
            if b < 0 {
                return None;
            }
            // Arithmetic shift already floors toward negative infinity
            a >> b.min(63)
        }
        Operator::BitAnd => a & b,
        Operator::BitOr => a | b,
        Operator::BitXor => a ^ b,
        Operator::MatMult => return None,
    };
    Some(Constant::Int(value))
}

/// Quotient rounded toward negative infinity
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    let remainder = a.checked_rem(b)?;
    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

/// Remainder taking the sign of the divisor
fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let remainder = a.checked_rem(b)?;
    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        Some(remainder + b)
    } else {
        Some(remainder)
    }
}

fn float_op(op: Operator, a: f64, b: f64) -> Option<Constant> {
    match op {
        Operator::Add => finite(a + b),
        Operator::Sub => finite(a - b),
        Operator::Mult => finite(a * b),
        Operator::Div if b != 0.0 => finite(a / b),
        Operator::FloorDiv if b != 0.0 => finite(float_divmod(a, b).0),
        Operator::Mod if b != 0.0 => finite(float_divmod(a, b).1),
        // Negative base with a fractional exponent is complex-valued
        Operator::Pow if a == 0.0 && b < 0.0 => None,
        Operator::Pow if a < 0.0 && b.fract() != 0.0 => None,
        Operator::Pow => finite(a.powf(b)),
        _ => None,
    }
}

/// Floored quotient and remainder of `a / b`, derived from the exact
/// remainder so the quotient never rounds across an integer
fn float_divmod(a: f64, b: f64) -> (f64, f64) {
    let mut remainder = a % b;
    let mut quotient = (a - remainder) / b;
    if remainder != 0.0 {
        if (b < 0.0) != (remainder < 0.0) {
            remainder += b;
            quotient -= 1.0;
        }
    } else {
        remainder = 0.0_f64.copysign(b);
    }

    let floored = if quotient != 0.0 {
        let floored = quotient.floor();
        if quotient - floored > 0.5 {
            floored + 1.0
        } else {
            floored
        }
    } else {
        0.0_f64.copysign(a / b)
    };
    (floored, remainder)
}

fn finite(value: f64) -> Option<Constant> {
    value.is_finite().then_some(Constant::Float(value))
}
