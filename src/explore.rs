//! Path exploration and the final verdict.
//!
//! The explorer keeps one generation of live [`State`]s. Each command maps the
//! whole generation to the next one:
//!
//! - an assignment updates every state in place;
//! - an `if` whose condition is provable runs the body on the state as is;
//! - otherwise the state is forked, the fork is refined to satisfy the
//!   condition and runs the body, and the original is refined to violate it.
//!   Infeasible branches are dropped, so each `if` at most doubles the generation.
//!
//! After the last command, the assertion is checked on every terminal state.

use std::fmt;

use log::debug;

use crate::ast::{Command, Comparison, If, Program};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::evaluate::eval_assignment;
use crate::oracle::is_always_true;
use crate::split::split_by_condition;
use crate::state::State;

/// Result of checking a program's assertion.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Verdict {
    /// The assertion is proven on every feasible path.
    Holds,
    /// Some feasible path could not be proven to satisfy the assertion.
    CanFail,
}

impl Verdict {
    pub fn can_fail(self) -> bool {
        self == Verdict::CanFail
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Holds => write!(f, "Assert is true"),
            Verdict::CanFail => write!(f, "Assert can be false"),
        }
    }
}

/// The verdict together with the path that produced it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub verdict: Verdict,
    /// Number of feasible terminal paths.
    pub paths: usize,
    /// A terminal path on which the assertion could not be proven.
    pub witness: Option<State>,
}

/// All feasible terminal states of a program.
#[derive(Debug, Clone)]
pub struct Exploration {
    states: Vec<State>,
}

impl Exploration {
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Checks `post_condition` on every valid terminal state.
    pub fn check(self, post_condition: &Comparison) -> Result<Analysis, EngineError> {
        let paths = self.states.iter().filter(|s| s.is_valid()).count();
        for state in self.states.into_iter().filter(State::is_valid) {
            if !is_always_true(post_condition, &state)? {
                debug!("assertion `{}` not proven on path: {}", post_condition, state);
                return Ok(Analysis {
                    verdict: Verdict::CanFail,
                    paths,
                    witness: Some(state),
                });
            }
        }
        debug!("assertion `{}` proven on all {} paths", post_condition, paths);
        Ok(Analysis {
            verdict: Verdict::Holds,
            paths,
            witness: None,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Explorer {
    config: EngineConfig,
}

impl Explorer {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Runs every command of `program` and returns the feasible terminal states.
    pub fn explore(&self, program: &Program) -> Result<Exploration, EngineError> {
        check_nesting(&program.commands)?;

        let initial = State::seeded(program.variables.iter().cloned(), self.config.unbound);
        let mut generation = vec![initial];
        self.check_limit(&generation)?;
        for command in &program.commands {
            generation = self.step(command, generation)?;
            self.check_limit(&generation)?;
        }
        debug!("explore: {} terminal paths", generation.len());
        Ok(Exploration { states: generation })
    }

    /// Explores `program` and checks its assertion.
    pub fn analyze(&self, program: &Program) -> Result<Analysis, EngineError> {
        self.explore(program)?.check(&program.post_condition)
    }

    fn check_limit(&self, generation: &[State]) -> Result<(), EngineError> {
        match self.config.max_paths {
            Some(limit) if generation.len() > limit => Err(EngineError::PathLimitExceeded { limit }),
            _ => Ok(()),
        }
    }

    /// Computes the next generation from the current one.
    fn step(&self, command: &Command, generation: Vec<State>) -> Result<Vec<State>, EngineError> {
        match command {
            Command::Assignment(assignment) => {
                let mut next = generation;
                for state in next.iter_mut() {
                    eval_assignment(assignment, state)?;
                }
                Ok(next)
            }
            Command::If(block) => {
                let mut kept = Vec::with_capacity(generation.len());
                let mut forked = Vec::new();
                for state in generation {
                    self.branch(block, state, &mut kept, &mut forked)?;
                }
                debug!(
                    "if {}: {} paths kept, {} forked",
                    block.condition,
                    kept.len(),
                    forked.len()
                );
                kept.extend(forked);
                Ok(kept)
            }
        }
    }

    fn branch(&self, block: &If, mut state: State, kept: &mut Vec<State>, forked: &mut Vec<State>) -> Result<(), EngineError> {
        if is_always_true(&block.condition, &state)? {
            run_body(block, &mut state)?;
            kept.push(state);
            return Ok(());
        }

        let mut then_state = state.fork();
        let split = split_by_condition(&block.condition, &mut then_state, &mut state)?;

        if split.then_feasible && then_state.is_valid() {
            run_body(block, &mut then_state)?;
            forked.push(then_state);
        } else {
            debug!("if {}: then-branch infeasible, dropped", block.condition);
        }

        if split.else_feasible && state.is_valid() {
            kept.push(state);
        } else {
            debug!("if {}: else-branch infeasible, dropped", block.condition);
        }
        Ok(())
    }
}

fn run_body(block: &If, state: &mut State) -> Result<(), EngineError> {
    for command in &block.body {
        match command {
            Command::Assignment(assignment) => eval_assignment(assignment, state)?,
            Command::If(_) => return Err(EngineError::UnsupportedNesting(block.condition.to_string())),
        }
    }
    Ok(())
}

/// Rejects an `if` nested inside another `if`'s body.
fn check_nesting(commands: &[Command]) -> Result<(), EngineError> {
    for command in commands {
        if let Command::If(block) = command {
            if block.body.iter().any(|c| matches!(c, Command::If(_))) {
                return Err(EngineError::UnsupportedNesting(block.condition.to_string()));
            }
        }
    }
    Ok(())
}

/// Explores `program` with the default configuration and returns its verdict.
pub fn analyze(program: &Program) -> Result<Verdict, EngineError> {
    Ok(Explorer::default().analyze(program)?.verdict)
}
