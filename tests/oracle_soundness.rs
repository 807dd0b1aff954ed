//! Property tests for the oracle and the splitter, checked by exhaustive
//! enumeration over a small window of input values.

use proptest::prelude::*;

use symex_rs::ast::{CmpOp, Comparison, Value};
use symex_rs::domain::Constraint;
use symex_rs::oracle::is_always_true;
use symex_rs::split::split_by_condition;
use symex_rs::state::State;
use symex_rs::types::{InputId, Int};
use symex_rs::value::{AffineForm, Variable};

const WINDOW: i64 = 30;

fn cmp_op() -> impl Strategy<Value = CmpOp> {
    prop_oneof![
        Just(CmpOp::Eq),
        Just(CmpOp::Ne),
        Just(CmpOp::Lt),
        Just(CmpOp::Le),
        Just(CmpOp::Gt),
        Just(CmpOp::Ge),
    ]
}

fn coefficient() -> impl Strategy<Value = i64> {
    prop_oneof![-4i64..=-1, 1i64..=4]
}

/// A state binding `v = coeff·x + offset`, with `x` restricted as given.
fn build(
    coeff: i64,
    offset: i64,
    min: Option<i64>,
    max: Option<i64>,
    excluded: &[i64],
) -> (State, InputId) {
    let mut state = State::new();
    let x = state.alloc_input("x");
    if let Some(min) = min {
        state.input_mut(x).restrict(&Constraint::AtLeast(Int::from(min)));
    }
    if let Some(max) = max {
        state.input_mut(x).restrict(&Constraint::AtMost(Int::from(max)));
    }
    for &e in excluded {
        state.input_mut(x).exclude(Int::from(e));
    }
    let form = AffineForm::term(x, coeff).add(&AffineForm::constant(offset));
    state.bind(Variable::new("v", form));
    (state, x)
}

fn condition(op: CmpOp, rhs: i64) -> Comparison {
    Comparison::new(op, Value::var("v"), Value::constant(rhs))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        .. ProptestConfig::default()
    })]

    #[test]
    fn oracle_never_proves_a_falsifiable_comparison(
        coeff in coefficient(),
        offset in -6i64..=6,
        min in proptest::option::of(-8i64..=8),
        max in proptest::option::of(-8i64..=8),
        excluded in proptest::collection::vec(-8i64..=8, 0..4),
        op in cmp_op(),
        rhs in -12i64..=12,
    ) {
        let (state, x) = build(coeff, offset, min, max, &excluded);
        prop_assume!(state.is_valid());

        if is_always_true(&condition(op, rhs), &state).unwrap() {
            for value in -WINDOW..=WINDOW {
                if state.input(x).contains(&Int::from(value)) {
                    let lhs = Int::from(coeff * value + offset);
                    prop_assert!(
                        op.test(&lhs, &Int::from(rhs)),
                        "proved v {} {} but x = {} gives v = {}",
                        op, rhs, value, lhs
                    );
                }
            }
        }
    }

    #[test]
    fn oracle_never_proves_a_falsifiable_difference(
        coeff in coefficient(),
        offset in -6i64..=6,
        rhs_coeff in -4i64..=4,
        rhs_offset in -6i64..=6,
        min in proptest::option::of(-8i64..=8),
        max in proptest::option::of(-8i64..=8),
        excluded in proptest::collection::vec(-8i64..=8, 0..4),
        op in cmp_op(),
    ) {
        let (mut state, x) = build(coeff, offset, min, max, &excluded);
        prop_assume!(state.is_valid());
        let w = AffineForm::term(x, rhs_coeff).add(&AffineForm::constant(rhs_offset));
        state.bind(Variable::new("w", w));
        let cond = Comparison::new(op, Value::var("v"), Value::var("w"));

        if is_always_true(&cond, &state).unwrap() {
            for value in -WINDOW..=WINDOW {
                if state.input(x).contains(&Int::from(value)) {
                    let lhs = Int::from(coeff * value + offset);
                    let rhs = Int::from(rhs_coeff * value + rhs_offset);
                    prop_assert!(
                        op.test(&lhs, &rhs),
                        "proved v {} w but x = {} gives {} vs {}",
                        op, value, lhs, rhs
                    );
                }
            }
        }
    }

    #[test]
    fn split_partitions_the_domain(
        coeff in coefficient(),
        offset in -6i64..=6,
        min in proptest::option::of(-8i64..=8),
        max in proptest::option::of(-8i64..=8),
        excluded in proptest::collection::vec(-8i64..=8, 0..4),
        op in cmp_op(),
        rhs in -12i64..=12,
    ) {
        let (mut else_state, x) = build(coeff, offset, min, max, &excluded);
        prop_assume!(else_state.is_valid());
        let before = else_state.input(x).clone();

        let mut then_state = else_state.fork();
        let split = split_by_condition(&condition(op, rhs), &mut then_state, &mut else_state).unwrap();

        let mut then_seen = false;
        let mut else_seen = false;
        for value in -WINDOW..=WINDOW {
            let v = Int::from(value);
            let in_then = then_state.input(x).contains(&v);
            let in_else = else_state.input(x).contains(&v);
            prop_assert!(!(in_then && in_else), "{} in both branches", value);
            prop_assert_eq!(in_then || in_else, before.contains(&v));
            if before.contains(&v) {
                let satisfies = op.test(&Int::from(coeff * value + offset), &Int::from(rhs));
                prop_assert_eq!(in_then, satisfies, "x = {}", value);
            }
            then_seen |= in_then;
            else_seen |= in_else;
        }
        // A branch with a value in the window must have been reported feasible.
        prop_assert!(!then_seen || split.then_feasible);
        prop_assert!(!else_seen || split.else_feasible);
        prop_assert_eq!(split.then_feasible, then_state.is_valid());
        prop_assert_eq!(split.else_feasible, else_state.is_valid());
    }

    #[test]
    fn fork_is_independent(
        coeff in coefficient(),
        min in proptest::option::of(-8i64..=8),
        bound in -8i64..=8,
        point in -8i64..=8,
    ) {
        let (state, x) = build(coeff, 0, min, None, &[]);
        let before = state.input(x).clone();

        let mut fork = state.fork();
        fork.input_mut(x).restrict(&Constraint::AtMost(Int::from(bound)));
        fork.input_mut(x).exclude(Int::from(point));
        fork.input_mut(x).restrict(&Constraint::Equal(Int::from(point)));

        prop_assert_eq!(state.input(x), &before);
        prop_assert!(!fork.input(x).contains(&Int::from(point)));
    }

    #[test]
    fn eval_is_idempotent(
        coeff in coefficient(),
        offset in -6i64..=6,
        min in proptest::option::of(-8i64..=8),
        max in proptest::option::of(-8i64..=8),
    ) {
        let (state, _) = build(coeff, offset, min, max, &[]);
        let v = state.binding("v").unwrap();
        prop_assert_eq!(state.eval(v), state.eval(v));
    }
}
