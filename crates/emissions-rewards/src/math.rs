//! Fixed-precision decimal helpers for reward math.
//!
//! Every product and quotient is rounded to [`DECIMAL_PLACES`] with banker's
//! rounding so that all nodes reach bit-identical results. Conversion to
//! token amounts always truncates.

use crate::error::MathError;
use emissions_types::TokenAmount;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

pub const DECIMAL_PLACES: u32 = 18;

/// Below this exponent `exp` is indistinguishable from zero at our precision.
const EXP_FLOOR: i64 = -42;

const EXP_MAX_TERMS: u32 = 40;

/// Inputs past this magnitude saturate the logistic and softplus curves.
const SATURATION: i64 = 40;

type MathResult<T> = Result<T, MathError>;

pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
}

pub fn add(a: Decimal, b: Decimal) -> MathResult<Decimal> {
    a.checked_add(b).ok_or(MathError::Overflow("add"))
}

pub fn sub(a: Decimal, b: Decimal) -> MathResult<Decimal> {
    a.checked_sub(b).ok_or(MathError::Overflow("sub"))
}

pub fn mul(a: Decimal, b: Decimal) -> MathResult<Decimal> {
    a.checked_mul(b)
        .map(round)
        .ok_or(MathError::Overflow("mul"))
}

pub fn div(a: Decimal, b: Decimal) -> MathResult<Decimal> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero("div"));
    }
    a.checked_div(b)
        .map(round)
        .ok_or(MathError::Overflow("div"))
}

/// Quotient at the full working precision of [`Decimal`], left unrounded so
/// that scaling it back up by a large amount loses nothing.
pub fn ratio(a: Decimal, b: Decimal) -> MathResult<Decimal> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero("ratio"));
    }
    a.checked_div(b).ok_or(MathError::Overflow("ratio"))
}

pub fn sum<I: IntoIterator<Item = Decimal>>(values: I) -> MathResult<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, add)
}

pub fn clamp(value: Decimal, lo: Decimal, hi: Decimal) -> Decimal {
    value.max(lo).min(hi)
}

pub fn ln(x: Decimal) -> MathResult<Decimal> {
    if x <= Decimal::ZERO {
        return Err(MathError::NonPositiveLogarithm("ln"));
    }
    if x == Decimal::ONE {
        return Ok(Decimal::ZERO);
    }
    x.checked_ln().map(round).ok_or(MathError::Overflow("ln"))
}

/// `e^x` by halving the argument into `(0, 1]`, summing the Taylor series
/// to full precision, then squaring back up.
pub fn exp(x: Decimal) -> MathResult<Decimal> {
    if x < Decimal::from(EXP_FLOOR) {
        return Ok(Decimal::ZERO);
    }
    if x.is_sign_negative() {
        return div(Decimal::ONE, exp(-x)?);
    }

    let two = Decimal::TWO;
    let mut reduced = x;
    let mut halvings = 0u32;
    while reduced > Decimal::ONE {
        reduced = div(reduced, two)?;
        halvings += 1;
    }

    let mut term = Decimal::ONE;
    let mut result = Decimal::ONE;
    for n in 1..=EXP_MAX_TERMS {
        term = div(mul(term, reduced)?, Decimal::from(n))?;
        if term.is_zero() {
            break;
        }
        result = add(result, term)?;
    }

    for _ in 0..halvings {
        result = mul(result, result)?;
    }
    Ok(result)
}

pub fn sqrt(x: Decimal) -> MathResult<Decimal> {
    if x.is_sign_negative() && !x.is_zero() {
        return Err(MathError::NegativeBase("sqrt"));
    }
    x.sqrt().map(round).ok_or(MathError::Overflow("sqrt"))
}

/// `base^exponent` for a non-negative base, computed as `exp(exponent * ln(base))`.
pub fn pow(base: Decimal, exponent: Decimal) -> MathResult<Decimal> {
    if base.is_sign_negative() && !base.is_zero() {
        return Err(MathError::NegativeBase("pow"));
    }
    if exponent.is_zero() {
        return Ok(Decimal::ONE);
    }
    if base.is_zero() {
        return if exponent.is_sign_positive() {
            Ok(Decimal::ZERO)
        } else {
            Err(MathError::DivisionByZero("pow"))
        };
    }
    if exponent == Decimal::ONE {
        return Ok(round(base));
    }
    exp(mul(exponent, ln(base)?)?)
}

/// Logistic function `1 / (1 + e^-z)`.
pub fn sigmoid(z: Decimal) -> MathResult<Decimal> {
    let z = clamp(z, Decimal::from(-SATURATION), Decimal::from(SATURATION));
    div(Decimal::ONE, add(Decimal::ONE, exp(-z)?)?)
}

/// `ln(1 + e^x)`, a smooth positive ramp.
pub fn softplus(x: Decimal) -> MathResult<Decimal> {
    if x > Decimal::from(SATURATION) {
        return Ok(x);
    }
    ln(add(Decimal::ONE, exp(x)?)?)
}

/// Truncate a non-negative decimal amount to whole base units. Negative
/// values map to zero.
pub fn to_token_amount(value: Decimal) -> MathResult<TokenAmount> {
    if value <= Decimal::ZERO {
        return Ok(TokenAmount::ZERO);
    }
    value
        .trunc()
        .to_u64()
        .map(TokenAmount::from_base_units)
        .ok_or(MathError::Overflow("token conversion"))
}
