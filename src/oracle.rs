//! Decision procedure for "this comparison holds on every value of the path".
//!
//! The comparison `l op r` is reduced to `(l - r) op 0` over canonical affine
//! forms. A difference without terms is decided numerically; a difference with
//! one term `c·x + d` is decided from the extreme value of `c·x` over the
//! domain of `x`, which picks the lower or upper bound by the sign of `c`.
//! Anything else is reported as not provable, which never means "provably false".

use log::debug;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::ast::{CmpOp, Comparison, Value};
use crate::domain::InputValue;
use crate::error::EngineError;
use crate::state::State;
use crate::types::Int;
use crate::value::AffineForm;

/// Reduces a comparison operand to its canonical form.
fn operand(value: &Value, state: &State) -> Option<AffineForm> {
    match value {
        Value::Constant(c) => Some(AffineForm::constant(c.clone())),
        Value::Var(name) => Some(state.eval(&state.resolve(name))),
        Value::Input => None,
    }
}

/// Canonical forms of both sides of `cond`, enforcing the supported shape:
/// the left side is a variable, and neither side has more than one input term.
pub(crate) fn operands(cond: &Comparison, state: &State) -> Result<(AffineForm, AffineForm), EngineError> {
    let unsupported = || EngineError::UnsupportedComparison(cond.to_string());
    if cond.lhs.as_var().is_none() {
        return Err(unsupported());
    }
    let left = operand(&cond.lhs, state).ok_or_else(unsupported)?;
    let right = operand(&cond.rhs, state).ok_or_else(unsupported)?;
    if left.num_terms() > 1 || right.num_terms() > 1 {
        return Err(unsupported());
    }
    Ok((left, right))
}

/// Returns `Ok(true)` if `cond` holds for every value allowed by the current domains.
pub fn is_always_true(cond: &Comparison, state: &State) -> Result<bool, EngineError> {
    let (left, right) = operands(cond, state)?;
    let difference = left.sub(&right);
    let result = holds_for_all(&difference, cond.op, state);
    debug!(
        "is_always_true({}) with {} {} 0 => {}",
        cond,
        difference.display(state),
        cond.op,
        result
    );
    Ok(result)
}

/// Decides `form op 0` for every value of its inputs.
fn holds_for_all(form: &AffineForm, op: CmpOp, state: &State) -> bool {
    let zero = Int::zero();
    if form.is_constant() {
        return op.test(&form.constant, &zero);
    }
    let Some((input, coeff)) = form.single_term() else {
        return false;
    };

    // c·x + d op 0  <=>  c·x op k
    let k = -&form.constant;
    let domain = state.input(input);
    match op {
        // A non-constant input takes at least two values, so `c·x` does too.
        CmpOp::Eq => false,
        CmpOp::Ne => {
            let (quotient, remainder) = k.div_rem(coeff);
            !remainder.is_zero() || !domain.contains(&quotient)
        }
        CmpOp::Gt | CmpOp::Ge => match lowest(domain, coeff) {
            Some(low) => op.test(&low, &k),
            None => false,
        },
        CmpOp::Lt | CmpOp::Le => match highest(domain, coeff) {
            Some(high) => op.test(&high, &k),
            None => false,
        },
    }
}

/// Smallest value of `coeff · x` over the domain, if bounded.
fn lowest(domain: &InputValue, coeff: &Int) -> Option<Int> {
    let bound = if coeff.is_positive() { domain.min() } else { domain.max() };
    bound.map(|b| b * coeff)
}

/// Largest value of `coeff · x` over the domain, if bounded.
fn highest(domain: &InputValue, coeff: &Int) -> Option<Int> {
    let bound = if coeff.is_positive() { domain.max() } else { domain.min() };
    bound.map(|b| b * coeff)
}
