use log::trace;

use crate::ast::{Assignment, BinOp, Rhs, Value};
use crate::error::EngineError;
use crate::state::State;
use crate::value::{AffineForm, Variable};

/// Evaluates an operand. `input()` allocates a fresh input named after `target`.
pub fn eval_value(value: &Value, state: &mut State, target: &str) -> Variable {
    match value {
        Value::Constant(c) => Variable::new(target, AffineForm::constant(c.clone())),
        Value::Input => {
            let id = state.alloc_input(target);
            Variable::new(target, AffineForm::term(id, 1))
        }
        Value::Var(name) => state.resolve(name).renamed(target),
    }
}

/// Evaluates the right-hand side of an assignment to `target`.
pub fn eval_rhs(rhs: &Rhs, state: &mut State, target: &str) -> Result<Variable, EngineError> {
    let (op, l, r) = match rhs {
        Rhs::Value(value) => return Ok(eval_value(value, state, target)),
        Rhs::Binary(op, l, r) => (op, l, r),
    };

    let left = eval_value(l, state, target);
    let right = eval_value(r, state, target);

    let form = match op {
        BinOp::Add => left.form().add(right.form()),
        BinOp::Sub => left.form().sub(right.form()),
        BinOp::Mul => {
            // Stored form, not the folded one: the outcome must not depend on the path.
            if !left.form().is_constant() {
                return Err(EngineError::UnsupportedOperation(rhs.to_string()));
            }
            right.form().scale(&left.form().constant)
        }
    };
    Ok(Variable::new(target, form))
}

/// Binds the value of the right-hand side to the target, replacing any prior binding.
pub fn eval_assignment(assignment: &Assignment, state: &mut State) -> Result<(), EngineError> {
    let variable = eval_rhs(&assignment.rhs, state, &assignment.target)?;
    trace!(
        "{} => {}",
        assignment,
        state.eval(&variable).display(state)
    );
    state.bind(variable);
    Ok(())
}
