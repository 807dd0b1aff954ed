//! # symex-rs: bounded symbolic execution over affine forms
//!
//! **`symex-rs`** decides whether the assertion at the end of a small loop-free program
//! can ever be violated, whatever values its `input()` calls return.
//!
//! ## The language
//!
//! ```text
//! x = input()
//! y = 2 * x
//! if y > 10 then
//!     y = y - 10
//! end
//! assert y >= 0
//! ```
//!
//! Assignments take a value or a single binary `+`, `-`, `*` operation; `if` blocks do
//! not nest; exactly one `assert` closes the program.
//!
//! ## How it works
//!
//! - Every program variable is an **affine form** `c + Σ aᵢ·inputᵢ` with exact integers.
//! - Every input carries an **integer domain**: optional bounds minus excluded points.
//! - A **state** is one execution path: input domains plus variable bindings.
//! - At an `if`, the **oracle** tries to prove the condition from the current domains.
//!   If it cannot, the **splitter** forks the state and refines the input in each copy so
//!   that one satisfies the condition and the other violates it.
//! - At the end, the oracle is applied to the assertion on every feasible path. If it
//!   fails to prove it anywhere, the assertion *can be false*.
//!
//! The analysis is sound for what it proves: "holds" means no input can violate the
//! assertion. "Can be false" means some path could not be proven, which may be a false alarm.
//!
//! ## Basic Usage
//!
//! ```rust
//! use symex_rs::check_source;
//! use symex_rs::explore::Verdict;
//!
//! let source = "x = input()\nif x > 5 then\ny = 1\nend\nassert y == 1\n";
//! assert_eq!(check_source(source).unwrap(), Verdict::CanFail);
//!
//! let source = "x = input()\ny = x + 1\nassert y > x\n";
//! assert_eq!(check_source(source).unwrap(), Verdict::Holds);
//! ```
//!
//! ## Core Components
//!
//! - **[`domain`]**: input domains and branch constraints.
//! - **[`value`]**: affine forms and variables.
//! - **[`state`]**: execution paths and forking.
//! - **[`oracle`]** and **[`split`]**: deciding and refining by conditions.
//! - **[`explore`]**: the path explorer and the final [`Verdict`][crate::explore::Verdict].

pub mod ast;
pub mod config;
pub mod domain;
pub mod error;
pub mod evaluate;
pub mod explore;
pub mod oracle;
pub mod parser;
pub mod split;
pub mod state;
pub mod types;
pub mod value;

use crate::config::EngineConfig;
use crate::error::Error;
use crate::explore::{Explorer, Verdict};

/// Parses `source` and checks its assertion with the default configuration.
pub fn check_source(source: &str) -> Result<Verdict, Error> {
    check_source_with(source, EngineConfig::default())
}

/// Parses `source` and checks its assertion with `config`.
pub fn check_source_with(source: &str, config: EngineConfig) -> Result<Verdict, Error> {
    let program = parser::parse_program(source)?;
    let analysis = Explorer::new(config).analyze(&program)?;
    Ok(analysis.verdict)
}
