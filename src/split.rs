//! Refining a path by a branch condition.
//!
//! When the oracle cannot decide a condition `c·x + d op r`, the condition is
//! turned into a [`Constraint`] on `x` using exact floor/ceiling division, and
//! the two paths are restricted by the constraint and its negation. Because the
//! negation is exact, the two refined domains partition the original one.

use log::debug;
use num_integer::Integer;
use num_traits::{One, Signed};

use crate::ast::{CmpOp, Comparison};
use crate::domain::Constraint;
use crate::error::EngineError;
use crate::oracle::operands;
use crate::state::State;
use crate::types::{InputId, Int};

/// Outcome of [`split_by_condition`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Split {
    /// Some value of the path satisfies the condition.
    pub then_feasible: bool,
    /// Some value of the path violates the condition.
    pub else_feasible: bool,
}

/// Restricts `then_state` to the values satisfying `cond` and `else_state` to the rest.
///
/// `then_state` must be a fork of `else_state`, so both address the split input
/// by the same handle. A branch that turns out infeasible is reported in the
/// returned [`Split`] and should be dropped by the caller; its state is left in
/// an unspecified, invalid form.
pub fn split_by_condition(
    cond: &Comparison,
    then_state: &mut State,
    else_state: &mut State,
) -> Result<Split, EngineError> {
    let (left, right) = operands(cond, then_state)?;
    if !right.is_constant() || left.num_terms() > 1 {
        return Err(EngineError::UnsupportedPattern(cond.to_string()));
    }

    let Some((input, coeff)) = left.single_term() else {
        // Decided by constants alone: the failing branch is emptied.
        let holds = cond.op.test(&left.constant, &right.constant);
        debug!("split({}) by constants => {}", cond, holds);
        let collapsed = collapsed_inputs(cond, else_state);
        let dropped = if holds { else_state } else { then_state };
        dropped.mark_infeasible(collapsed);
        return Ok(Split {
            then_feasible: holds,
            else_feasible: !holds,
        });
    };

    let k = &right.constant - &left.constant;
    let constraint = constraint_for(coeff, cond.op, &k);
    let split = restrict_both(input, &constraint, then_state, else_state);
    debug!(
        "split({}) on {}: then {} ({}), else {} ({})",
        cond,
        then_state.input_label(input),
        constraint,
        split.then_feasible,
        constraint.negate(),
        split.else_feasible
    );
    Ok(split)
}

/// Inputs stored in the operands of `cond` whose domains have collapsed to a constant.
fn collapsed_inputs(cond: &Comparison, state: &State) -> Vec<InputId> {
    [&cond.lhs, &cond.rhs]
        .into_iter()
        .filter_map(|value| value.as_var())
        .flat_map(|name| state.resolve(name).into_form().terms.into_keys())
        .collect()
}

fn restrict_both(input: InputId, constraint: &Constraint, then_state: &mut State, else_state: &mut State) -> Split {
    let then_feasible = then_state.input_mut(input).restrict(constraint);
    let else_feasible = else_state.input_mut(input).restrict(&constraint.negate());
    Split {
        then_feasible,
        else_feasible,
    }
}

/// The exact constraint on `x` equivalent to `coeff · x op k`, for nonzero `coeff`.
pub fn constraint_for(coeff: &Int, op: CmpOp, k: &Int) -> Constraint {
    // Dividing by a negative coefficient flips the comparison.
    let (coeff, k, op) = if coeff.is_negative() {
        (-coeff, -k, op.flip())
    } else {
        (coeff.clone(), k.clone(), op)
    };

    let floor = k.div_floor(&coeff);
    let exact = (&floor * &coeff) == k;
    let ceil = if exact { floor.clone() } else { &floor + Int::one() };

    match op {
        CmpOp::Eq if exact => Constraint::Equal(floor),
        CmpOp::Eq => Constraint::Never,
        CmpOp::Ne if exact => Constraint::NotEqual(floor),
        CmpOp::Ne => Constraint::Always,
        CmpOp::Gt => Constraint::AtLeast(floor + Int::one()),
        CmpOp::Ge => Constraint::AtLeast(ceil),
        CmpOp::Lt => Constraint::AtMost(ceil - Int::one()),
        CmpOp::Le => Constraint::AtMost(floor),
    }
}
