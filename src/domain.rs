//! Integer domains of nondeterministic inputs.
//!
//! An [`InputValue`] is an interval `[min, max]` with optional open ends,
//! minus a finite set of excluded points. Exclusions sitting on a finite
//! endpoint are folded into the bound, so a finite domain is empty exactly
//! when `min > max`.

use std::collections::BTreeSet;
use std::fmt;

use num_traits::One;

use crate::types::Int;

/// A restriction on one input, produced by splitting a branch condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// No restriction.
    Always,
    /// No value satisfies the condition.
    Never,
    AtLeast(Int),
    AtMost(Int),
    Equal(Int),
    NotEqual(Int),
}

impl Constraint {
    /// The constraint satisfied by exactly the values that do not satisfy `self`.
    pub fn negate(&self) -> Self {
        match self {
            Constraint::Always => Constraint::Never,
            Constraint::Never => Constraint::Always,
            Constraint::AtLeast(b) => Constraint::AtMost(b - Int::one()),
            Constraint::AtMost(b) => Constraint::AtLeast(b + Int::one()),
            Constraint::Equal(b) => Constraint::NotEqual(b.clone()),
            Constraint::NotEqual(b) => Constraint::Equal(b.clone()),
        }
    }

    pub fn holds(&self, value: &Int) -> bool {
        match self {
            Constraint::Always => true,
            Constraint::Never => false,
            Constraint::AtLeast(b) => value >= b,
            Constraint::AtMost(b) => value <= b,
            Constraint::Equal(b) => value == b,
            Constraint::NotEqual(b) => value != b,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Always => write!(f, "true"),
            Constraint::Never => write!(f, "false"),
            Constraint::AtLeast(b) => write!(f, ">= {}", b),
            Constraint::AtMost(b) => write!(f, "<= {}", b),
            Constraint::Equal(b) => write!(f, "== {}", b),
            Constraint::NotEqual(b) => write!(f, "!= {}", b),
        }
    }
}

/// The values one input may still take along a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValue {
    name: String,
    /// Lower bound, `None` when unbounded below.
    min: Option<Int>,
    /// Upper bound, `None` when unbounded above.
    max: Option<Int>,
    /// Points removed from `[min, max]`, always strictly inside the bounds.
    excluded: BTreeSet<Int>,
    /// Set once a [`Constraint::Never`] is applied.
    empty: bool,
}

impl InputValue {
    /// Creates an unconstrained input.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min: None,
            max: None,
            excluded: BTreeSet::new(),
            empty: false,
        }
    }

    /// Creates an input with the given bounds.
    pub fn bounded(name: impl Into<String>, min: Option<Int>, max: Option<Int>) -> Self {
        let mut value = Self::new(name);
        value.min = min;
        value.max = max;
        value.normalize();
        value
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn min(&self) -> Option<&Int> {
        self.min.as_ref()
    }
    pub fn max(&self) -> Option<&Int> {
        self.max.as_ref()
    }
    pub fn excluded(&self) -> &BTreeSet<Int> {
        &self.excluded
    }

    /// Returns `true` if at least one value remains.
    pub fn is_valid(&self) -> bool {
        if self.empty {
            return false;
        }
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }

    /// Returns `true` if exactly one value remains.
    pub fn is_constant(&self) -> bool {
        !self.empty && matches!((&self.min, &self.max), (Some(min), Some(max)) if min == max)
    }

    /// The single remaining value, if the input is constant.
    pub fn constant(&self) -> Option<&Int> {
        if self.is_constant() {
            self.min.as_ref()
        } else {
            None
        }
    }

    pub fn contains(&self, value: &Int) -> bool {
        !self.empty
            && self.min.as_ref().is_none_or(|min| value >= min)
            && self.max.as_ref().is_none_or(|max| value <= max)
            && !self.excluded.contains(value)
    }

    pub fn set_min(&mut self, min: Int) {
        self.min = Some(min);
        self.normalize();
    }

    pub fn set_max(&mut self, max: Int) {
        self.max = Some(max);
        self.normalize();
    }

    pub fn exclude(&mut self, value: Int) {
        if self.contains(&value) {
            self.excluded.insert(value);
            self.normalize();
        }
    }

    /// Intersects the domain with the values satisfying `constraint`.
    ///
    /// Bounds only ever tighten. Returns [`is_valid`][Self::is_valid] of the result.
    pub fn restrict(&mut self, constraint: &Constraint) -> bool {
        match constraint {
            Constraint::Always => {}
            Constraint::Never => self.empty = true,
            Constraint::AtLeast(b) => {
                if self.min.as_ref().is_none_or(|min| b > min) {
                    self.set_min(b.clone());
                }
            }
            Constraint::AtMost(b) => {
                if self.max.as_ref().is_none_or(|max| b < max) {
                    self.set_max(b.clone());
                }
            }
            Constraint::Equal(b) => {
                if self.contains(b) {
                    self.min = Some(b.clone());
                    self.max = Some(b.clone());
                    self.normalize();
                } else {
                    self.empty = true;
                }
            }
            Constraint::NotEqual(b) => self.exclude(b.clone()),
        }
        self.is_valid()
    }

    /// Moves finite bounds past excluded endpoints and drops exclusions outside the bounds.
    fn normalize(&mut self) {
        if let Some(min) = &mut self.min {
            while self.excluded.contains(min) {
                *min += Int::one();
            }
        }
        if let Some(max) = &mut self.max {
            while self.excluded.contains(max) {
                *max -= Int::one();
            }
        }
        let (min, max) = (self.min.as_ref(), self.max.as_ref());
        self.excluded
            .retain(|x| min.is_none_or(|min| x > min) && max.is_none_or(|max| x < max));
    }
}

impl InputValue {
    /// Renders the remaining values, e.g. `[-2, +inf) \ 0`.
    pub fn domain_string(&self) -> String {
        if self.empty {
            return "{}".to_string();
        }
        let mut out = match &self.min {
            Some(min) => format!("[{}", min),
            None => "(-inf".to_string(),
        };
        match &self.max {
            Some(max) => out += &format!(", {}]", max),
            None => out += ", +inf)",
        }
        for x in &self.excluded {
            out += &format!(" \\ {}", x);
        }
        out
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.name, self.domain_string())
    }
}
