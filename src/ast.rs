//! Syntax tree of the analysed language.
//!
//! Programs are flat: a sequence of assignments and single-level `if` blocks,
//! followed by exactly one assertion. Every expression and comparison is
//! strictly binary or a single value.

use std::collections::BTreeSet;
use std::fmt;

use crate::types::Int;

/// An atomic operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Integer literal.
    Constant(Int),
    /// Reference to a program variable.
    Var(String),
    /// Nondeterministic `input()`.
    Input,
}

impl Value {
    pub fn constant(value: impl Into<Int>) -> Self {
        Value::Constant(value.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Value::Var(name.into())
    }

    pub fn as_var(&self) -> Option<&str> {
        match self {
            Value::Var(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Constant(c) => write!(f, "{}", c),
            Value::Var(name) => write!(f, "{}", name),
            Value::Input => write!(f, "input()"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinOp::Add),
            "-" => Some(BinOp::Sub),
            "*" => Some(BinOp::Mul),
            _ => None,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "==" => Some(CmpOp::Eq),
            "!=" => Some(CmpOp::Ne),
            "<" => Some(CmpOp::Lt),
            "<=" => Some(CmpOp::Le),
            ">" => Some(CmpOp::Gt),
            ">=" => Some(CmpOp::Ge),
            _ => None,
        }
    }

    /// The comparison that holds exactly when `self` does not.
    pub fn negate(self) -> Self {
        match self {
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Le => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Ge => CmpOp::Lt,
        }
    }

    /// The comparison obtained by swapping operands (or multiplying both sides by `-1`).
    pub fn flip(self) -> Self {
        match self {
            CmpOp::Eq => CmpOp::Eq,
            CmpOp::Ne => CmpOp::Ne,
            CmpOp::Lt => CmpOp::Gt,
            CmpOp::Le => CmpOp::Ge,
            CmpOp::Gt => CmpOp::Lt,
            CmpOp::Ge => CmpOp::Le,
        }
    }

    pub fn test(self, lhs: &Int, rhs: &Int) -> bool {
        match self {
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rhs {
    Value(Value),
    Binary(BinOp, Value, Value),
}

impl Rhs {
    pub fn binary(op: BinOp, lhs: Value, rhs: Value) -> Self {
        Rhs::Binary(op, lhs, rhs)
    }
}

impl From<Value> for Rhs {
    fn from(value: Value) -> Self {
        Rhs::Value(value)
    }
}

impl fmt::Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rhs::Value(v) => write!(f, "{}", v),
            Rhs::Binary(op, l, r) => write!(f, "{} {} {}", l, op, r),
        }
    }
}

/// A comparison `lhs op rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub op: CmpOp,
    pub lhs: Value,
    pub rhs: Value,
}

impl Comparison {
    pub fn new(op: CmpOp, lhs: Value, rhs: Value) -> Self {
        Self { op, lhs, rhs }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub target: String,
    pub rhs: Rhs,
}

impl Assignment {
    pub fn new(target: impl Into<String>, rhs: impl Into<Rhs>) -> Self {
        Self {
            target: target.into(),
            rhs: rhs.into(),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.target, self.rhs)
    }
}

/// A conditional block. The body runs only when the condition holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct If {
    pub condition: Comparison,
    pub body: Vec<Command>,
}

impl If {
    pub fn new(condition: Comparison, body: Vec<Command>) -> Self {
        Self { condition, body }
    }
}

impl fmt::Display for If {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "if {} then", self.condition)?;
        for command in &self.body {
            writeln!(f, "    {}", command)?;
        }
        write!(f, "end")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Assignment(Assignment),
    If(If),
}

impl From<Assignment> for Command {
    fn from(assignment: Assignment) -> Self {
        Command::Assignment(assignment)
    }
}

impl From<If> for Command {
    fn from(block: If) -> Self {
        Command::If(block)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Assignment(a) => write!(f, "{}", a),
            Command::If(i) => write!(f, "{}", i),
        }
    }
}

/// A whole program: commands, the terminal assertion, and every assigned variable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub commands: Vec<Command>,
    pub post_condition: Comparison,
    pub variables: BTreeSet<String>,
}

impl Program {
    /// Builds a program, collecting declared variables from every assignment target.
    pub fn new(commands: Vec<Command>, post_condition: Comparison) -> Self {
        let mut variables = BTreeSet::new();
        collect_targets(&commands, &mut variables);
        Self {
            commands,
            post_condition,
            variables,
        }
    }
}

fn collect_targets(commands: &[Command], out: &mut BTreeSet<String>) {
    for command in commands {
        match command {
            Command::Assignment(a) => {
                out.insert(a.target.clone());
            }
            Command::If(i) => collect_targets(&i.body, out),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variables: Vec<&str> = self.variables.iter().map(String::as_str).collect();
        writeln!(f, "Variables: {}", variables.join(", "))?;
        writeln!(f)?;
        writeln!(f, "Program:")?;
        for command in &self.commands {
            writeln!(f, "{}", command)?;
        }
        writeln!(f)?;
        writeln!(f, "Postcondition:")?;
        write!(f, "{}", self.post_condition)
    }
}
