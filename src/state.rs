//! One execution path: input domains plus variable bindings.
//!
//! A [`State`] owns an arena of [`InputValue`]s; [`Variable`]s refer to them by
//! [`InputId`]. Forking clones the arena, so handles stay valid in the fork and
//! the two states never share mutable structure.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::debug;

use crate::config::UnboundRead;
use crate::domain::{Constraint, InputValue};
use crate::types::{InputId, Int};
use crate::value::{AffineForm, Variable};

#[derive(Debug, Clone, Default)]
pub struct State {
    inputs: Vec<InputValue>,
    /// Most recently allocated input for each name.
    by_name: HashMap<String, InputId>,
    bindings: BTreeMap<String, Variable>,
    unbound: UnboundRead,
    /// Set when a branch condition was decided false on this path.
    infeasible: bool,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state with one unbounded seed input per declared variable.
    pub fn seeded<I, S>(variables: I, unbound: UnboundRead) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = Self {
            unbound,
            ..Self::default()
        };
        for name in variables {
            state.alloc_input(name);
        }
        state
    }

    /// Allocates a fresh unconstrained input and makes it the current one for `name`.
    pub fn alloc_input(&mut self, name: impl Into<String>) -> InputId {
        let name = name.into();
        let id = InputId::new(self.inputs.len());
        self.inputs.push(InputValue::new(name.clone()));
        self.by_name.insert(name, id);
        id
    }

    pub fn input(&self, id: InputId) -> &InputValue {
        &self.inputs[id.index()]
    }

    pub fn input_mut(&mut self, id: InputId) -> &mut InputValue {
        &mut self.inputs[id.index()]
    }

    /// The most recently allocated input named `name`.
    pub fn input_by_name(&self, name: &str) -> Option<&InputValue> {
        self.by_name.get(name).map(|&id| self.input(id))
    }

    pub fn inputs(&self) -> impl Iterator<Item = (InputId, &InputValue)> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(i, value)| (InputId::new(i), value))
    }

    /// Name of an input, suffixed with its handle when another input shares the name.
    pub fn input_label(&self, id: InputId) -> String {
        let name = self.input(id).name();
        let shared = self.inputs.iter().filter(|input| input.name() == name).count() > 1;
        if shared {
            format!("{}#{}", name, id.index())
        } else {
            name.to_string()
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Binds `variable` under its own name, replacing any earlier binding.
    pub fn bind(&mut self, variable: Variable) {
        self.bindings.insert(variable.name().to_string(), variable);
    }

    pub fn binding(&self, name: &str) -> Option<&Variable> {
        self.bindings.get(name)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Variable> {
        self.bindings.values()
    }

    /// The value of `name` on this path, applying the unbound-read policy.
    pub fn resolve(&self, name: &str) -> Variable {
        if let Some(variable) = self.binding(name) {
            return variable.clone();
        }
        let form = match (self.unbound, self.by_name.get(name)) {
            (UnboundRead::Unconstrained, Some(&seed)) => AffineForm::term(seed, 1),
            _ => AffineForm::constant(Int::default()),
        };
        Variable::new(name, form)
    }

    /// Canonical form of `variable` under this state's current domains.
    pub fn eval(&self, variable: &Variable) -> AffineForm {
        variable.eval(self)
    }

    /// Returns an independent copy of this path.
    pub fn fork(&self) -> State {
        debug!(
            "fork(inputs = {}, bindings = {})",
            self.inputs.len(),
            self.bindings.len()
        );
        self.clone()
    }

    /// Returns `true` if every input still has at least one value.
    pub fn is_valid(&self) -> bool {
        !self.infeasible && self.inputs.iter().all(InputValue::is_valid)
    }

    /// Marks this path as unreachable, emptying the domains of `inputs`.
    pub fn mark_infeasible<I>(&mut self, inputs: I)
    where
        I: IntoIterator<Item = InputId>,
    {
        for id in inputs {
            self.input_mut(id).restrict(&Constraint::Never);
        }
        self.infeasible = true;
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for variable in self.bindings() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", variable.name(), self.eval(variable).display(self))?;
            first = false;
        }
        // Only inputs that some binding still depends on.
        for (id, input) in self.inputs() {
            let used = self
                .bindings
                .values()
                .any(|v| v.form().terms.contains_key(&id));
            if used && !input.is_constant() {
                write!(f, "; {} in {}", self.input_label(id), input.domain_string())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_fork_is_independent() {
        let mut state = State::new();
        let x = state.alloc_input("x");
        state.bind(Variable::new("a", AffineForm::term(x, 1)));
        state.bind(Variable::new("b", AffineForm::term(x, 2)));

        let mut fork = state.fork();
        fork.input_mut(x).restrict(&Constraint::AtLeast(Int::from(10)));
        fork.input_mut(x).exclude(Int::from(12));

        assert_eq!(state.input(x).min(), None);
        assert!(state.input(x).excluded().is_empty());
        assert_eq!(fork.input(x).min(), Some(&Int::from(10)));

        // Bindings in the fork see the fork's domain.
        fork.input_mut(x).restrict(&Constraint::Equal(Int::from(11)));
        let b = fork.binding("b").unwrap();
        assert_eq!(fork.eval(b), AffineForm::constant(22));
        let b = state.binding("b").unwrap();
        assert_eq!(state.eval(b).num_terms(), 1);
    }

    #[test]
    fn test_shared_input_visible_to_all_bindings() {
        let mut state = State::new();
        let x = state.alloc_input("x");
        state.bind(Variable::new("a", AffineForm::term(x, 1)));
        state.bind(Variable::new("b", AffineForm::term(x, 3).add(&AffineForm::constant(1))));
        state.input_mut(x).restrict(&Constraint::Equal(Int::from(2)));
        assert_eq!(state.eval(state.binding("a").unwrap()), AffineForm::constant(2));
        assert_eq!(state.eval(state.binding("b").unwrap()), AffineForm::constant(7));
    }

    #[test]
    fn test_is_valid() {
        let mut state = State::new();
        let x = state.alloc_input("x");
        state.alloc_input("y");
        assert!(state.is_valid());
        state.input_mut(x).restrict(&Constraint::AtLeast(Int::from(3)));
        state.input_mut(x).restrict(&Constraint::AtMost(Int::from(2)));
        assert!(!state.is_valid());
    }

    #[test]
    fn test_mark_infeasible() {
        let mut state = State::new();
        let x = state.alloc_input("x");
        state.input_mut(x).restrict(&Constraint::Equal(Int::from(1)));
        let mut fork = state.fork();
        fork.mark_infeasible([x]);
        assert!(!fork.is_valid());
        assert!(!fork.input(x).contains(&Int::from(1)));
        assert!(state.is_valid());

        // A path without inputs is still marked.
        let mut empty = State::new();
        empty.mark_infeasible([]);
        assert!(!empty.is_valid());
    }

    #[test]
    fn test_resolve_unbound() {
        let state = State::seeded(["y"], UnboundRead::Unconstrained);
        let y = state.resolve("y");
        assert_eq!(y.number_of_inputs(), 1);
        assert_eq!(state.resolve("z").into_form(), AffineForm::constant(0));

        let state = State::seeded(["y"], UnboundRead::Zero);
        assert_eq!(state.resolve("y").into_form(), AffineForm::constant(0));
    }

    #[test]
    fn test_alloc_shadows_name() {
        let mut state = State::new();
        let first = state.alloc_input("x");
        let second = state.alloc_input("x");
        assert_ne!(first, second);
        assert_eq!(state.num_inputs(), 2);
        state.input_mut(second).restrict(&Constraint::Equal(Int::from(1)));
        assert!(state.input_by_name("x").unwrap().is_constant());
        assert!(!state.input(first).is_constant());
    }

    #[test]
    fn test_display() {
        let mut state = State::new();
        let x = state.alloc_input("x");
        state.bind(Variable::new("y", AffineForm::term(x, 2).add(&AffineForm::constant(1))));
        state.input_mut(x).restrict(&Constraint::AtLeast(Int::from(0)));
        assert_eq!(state.to_string(), "y = 2*x + 1; x in [0, +inf)");
    }
}
