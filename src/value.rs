//! Symbolic values as affine forms over inputs.
//!
//! A [`Variable`] is `constant + Σ coeff_i · input_i`, where each input is a
//! handle into the owning [`State`]'s arena. Several variables may share an
//! input; narrowing that input's domain in the state is visible to all of
//! them through [`Variable::eval`].

use std::collections::BTreeMap;
use std::fmt;

use num_traits::{One, Signed, Zero};

use crate::state::State;
use crate::types::{InputId, Int};

/// Canonical affine form: a constant plus nonzero-coefficient input terms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AffineForm {
    pub constant: Int,
    pub terms: BTreeMap<InputId, Int>,
}

impl AffineForm {
    pub fn constant(value: impl Into<Int>) -> Self {
        Self {
            constant: value.into(),
            terms: BTreeMap::new(),
        }
    }

    /// The form `coeff · input`.
    pub fn term(input: InputId, coeff: impl Into<Int>) -> Self {
        let mut form = Self::default();
        form.add_term(input, coeff.into());
        form
    }

    /// Returns `true` if the form has no input terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// The only term, if there is exactly one.
    pub fn single_term(&self) -> Option<(InputId, &Int)> {
        let mut iter = self.terms.iter();
        match (iter.next(), iter.next()) {
            (Some((&id, coeff)), None) => Some((id, coeff)),
            _ => None,
        }
    }

    fn add_term(&mut self, input: InputId, coeff: Int) {
        let entry = self.terms.entry(input).or_insert_with(Int::zero);
        *entry += coeff;
        if entry.is_zero() {
            self.terms.remove(&input);
        }
    }

    /// Termwise `self + factor · other`, dropping terms that cancel.
    pub fn add_scaled(&self, other: &AffineForm, factor: &Int) -> AffineForm {
        let mut result = self.clone();
        result.constant += &other.constant * factor;
        for (&input, coeff) in &other.terms {
            result.add_term(input, coeff * factor);
        }
        result
    }

    pub fn add(&self, other: &AffineForm) -> AffineForm {
        self.add_scaled(other, &Int::one())
    }

    pub fn sub(&self, other: &AffineForm) -> AffineForm {
        self.add_scaled(other, &-Int::one())
    }

    /// Multiplies every coefficient and the constant by `factor`.
    pub fn scale(&self, factor: &Int) -> AffineForm {
        AffineForm::default().add_scaled(self, factor)
    }

    /// Renders the form with input names taken from `state`.
    pub fn display<'a>(&'a self, state: &'a State) -> DisplayForm<'a> {
        DisplayForm { form: self, state }
    }
}

pub struct DisplayForm<'a> {
    form: &'a AffineForm,
    state: &'a State,
}

impl fmt::Display for DisplayForm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (&input, coeff) in &self.form.terms {
            let name = self.state.input_label(input);
            let sign = if coeff.is_negative() { "-" } else { "+" };
            if first {
                if coeff.is_negative() {
                    write!(f, "-")?;
                }
            } else {
                write!(f, " {} ", sign)?;
            }
            let abs = coeff.abs();
            if abs.is_one() {
                write!(f, "{}", name)?;
            } else {
                write!(f, "{}*{}", abs, name)?;
            }
            first = false;
        }
        let constant = &self.form.constant;
        if first {
            write!(f, "{}", constant)
        } else if constant.is_negative() {
            write!(f, " - {}", constant.abs())
        } else if !constant.is_zero() {
            write!(f, " + {}", constant)
        } else {
            Ok(())
        }
    }
}

/// A program variable's symbolic value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    form: AffineForm,
}

impl Variable {
    pub fn new(name: impl Into<String>, form: AffineForm) -> Self {
        Self {
            name: name.into(),
            form,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stored form, before folding inputs that became constant.
    pub fn form(&self) -> &AffineForm {
        &self.form
    }

    pub fn into_form(self) -> AffineForm {
        self.form
    }

    /// Rebinds the value under another name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of nonzero input coefficients in the stored form.
    pub fn number_of_inputs(&self) -> usize {
        self.form.num_terms()
    }

    /// Canonical form under `state`: inputs whose domain collapsed to a single
    /// value are folded into the constant.
    pub fn eval(&self, state: &State) -> AffineForm {
        let mut result = AffineForm::constant(self.form.constant.clone());
        for (&input, coeff) in &self.form.terms {
            match state.input(input).constant() {
                Some(value) => result.constant += coeff * value,
                None => result.add_term(input, coeff.clone()),
            }
        }
        result
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::domain::Constraint;

    #[test]
    fn test_add_cancels_terms() {
        let x = InputId::new(0);
        let y = InputId::new(1);
        let a = AffineForm::term(x, 2).add(&AffineForm::term(y, 1)).add(&AffineForm::constant(3));
        let b = AffineForm::term(x, 2).add(&AffineForm::constant(1));
        let d = a.sub(&b);
        assert_eq!(d.constant, Int::from(2));
        assert_eq!(d.single_term(), Some((y, &Int::from(1))));
    }

    #[test]
    fn test_scale() {
        let x = InputId::new(0);
        let a = AffineForm::term(x, 3).add(&AffineForm::constant(-1));
        let b = a.scale(&Int::from(-2));
        assert_eq!(b.constant, Int::from(2));
        assert_eq!(b.terms[&x], Int::from(-6));
        assert!(a.scale(&Int::zero()).is_constant());
    }

    #[test]
    fn test_eval_folds_constant_inputs() {
        let mut state = State::new();
        let x = state.alloc_input("x");
        let y = state.alloc_input("y");
        let var = Variable::new(
            "v",
            AffineForm::term(x, 2).add(&AffineForm::term(y, -1)).add(&AffineForm::constant(4)),
        );
        assert_eq!(var.eval(&state).num_terms(), 2);

        state.input_mut(x).restrict(&Constraint::Equal(Int::from(5)));
        let form = var.eval(&state);
        assert_eq!(form.constant, Int::from(14));
        assert_eq!(form.single_term(), Some((y, &Int::from(-1))));
        assert_eq!(var.number_of_inputs(), 2);
    }

    #[test]
    fn test_eval_idempotent() {
        let mut state = State::new();
        let x = state.alloc_input("x");
        let var = Variable::new("v", AffineForm::term(x, 7));
        assert_eq!(var.eval(&state), var.eval(&state));
    }

    #[test]
    fn test_display_shadowed_names() {
        let mut state = State::new();
        let old = state.alloc_input("x");
        let new = state.alloc_input("x");
        let form = AffineForm::term(old, 1).add(&AffineForm::term(new, 1));
        assert_eq!(form.display(&state).to_string(), "x#0 + x#1");
    }

    #[test]
    fn test_display_form() {
        let mut state = State::new();
        let x = state.alloc_input("x");
        let y = state.alloc_input("y");
        let form = AffineForm::term(x, -1)
            .add(&AffineForm::term(y, 3))
            .add(&AffineForm::constant(-2));
        assert_eq!(form.display(&state).to_string(), "-x + 3*y - 2");
        assert_eq!(AffineForm::constant(0).display(&state).to_string(), "0");
    }
}
