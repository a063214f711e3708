//! Sample automata for demonstration and tests.

use indexmap::IndexSet;

use crate::automaton::{PushdownAutomaton, Transition};
use crate::symbol::{parse_optional, State, Symbol};

fn states(names: &[&str]) -> IndexSet<State> {
    names.iter().map(|n| State::from(*n)).collect()
}

fn symbols(names: &[&str]) -> IndexSet<Symbol> {
    names.iter().map(|n| Symbol::from(*n)).collect()
}

fn step(source: &str, target: &str, input: &str, pop: &str, push: &[&str]) -> Transition {
    Transition::new(
        source,
        target,
        parse_optional(input),
        parse_optional(pop),
        push.iter().map(|s| Symbol::from(*s)).collect(),
    )
}

/// `{ aⁿbⁿ : n ≥ 1 }`, counting `a`s with `0` on the stack.
pub fn anbn() -> PushdownAutomaton {
    PushdownAutomaton::from_validated(
        states(&["q0", "q1", "q2"]),
        symbols(&["a", "b"]),
        symbols(&["z", "0"]),
        Symbol::from("z"),
        State::from("q0"),
        states(&["q2"]),
        vec![
            step("q0", "q0", "a", "z", &["0", "z"]),
            step("q0", "q0", "a", "0", &["0", "0"]),
            step("q0", "q1", "b", "0", &[]),
            step("q1", "q1", "b", "0", &[]),
            step("q1", "q2", "", "z", &["z"]),
        ],
    )
}

/// Balanced parentheses, accepting in its only state.
pub fn dyck() -> PushdownAutomaton {
    PushdownAutomaton::from_validated(
        states(&["q"]),
        symbols(&["(", ")"]),
        symbols(&["z", "X"]),
        Symbol::from("z"),
        State::from("q"),
        states(&["q"]),
        vec![step("q", "q", "(", "", &["X"]), step("q", "q", ")", "X", &[])],
    )
}

/// `a*` ending in `qa` or `b*` ending in `qb`: two final states.
pub fn two_finals() -> PushdownAutomaton {
    PushdownAutomaton::from_validated(
        states(&["p", "qa", "qb"]),
        symbols(&["a", "b"]),
        symbols(&["z"]),
        Symbol::from("z"),
        State::from("p"),
        states(&["qa", "qb"]),
        vec![
            step("p", "qa", "", "", &[]),
            step("p", "qb", "", "", &[]),
            step("qa", "qa", "a", "", &[]),
            step("qb", "qb", "b", "", &[]),
        ],
    )
}

/// Look up a sample by name.
pub fn by_name(name: &str) -> Option<PushdownAutomaton> {
    match name {
        "anbn" => Some(anbn()),
        "dyck" => Some(dyck()),
        "two-finals" => Some(two_finals()),
        _ => None,
    }
}

/// Names accepted by [`by_name`].
pub const SAMPLE_NAMES: &[&str] = &["anbn", "dyck", "two-finals"];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::AutomatonDefinition;

    #[test]
    fn test_samples_pass_validation() {
        for name in SAMPLE_NAMES {
            let pda = by_name(name).unwrap();
            let rebuilt = AutomatonDefinition::from_automaton(&pda, None)
                .into_automaton()
                .unwrap();
            assert_eq!(rebuilt, pda, "sample {name}");
        }
        assert!(by_name("missing").is_none());
    }
}
