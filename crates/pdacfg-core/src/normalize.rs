//! Transition normalization.
//!
//! Rewrites every move into a chain of single-effect steps: pure push, pure
//! pop, or neutral. Chains run through fresh intermediate states that no
//! other step touches, so the net input/stack effect of each original move is
//! preserved exactly.
//!
//! ```text
//! q0 --a, z/0z--> q0    becomes    q0 --a, pop z--> #1 --push z--> #2 --push 0--> q0
//! ```

use std::fmt;

use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::automaton::{PushdownAutomaton, Transition};
use crate::symbol::{display_optional, State, Symbol, EPSILON};

/// A single-effect move.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormalizedTransition {
    /// Pop nothing, push exactly `symbol`.
    Push {
        source: State,
        target: State,
        input: Option<Symbol>,
        symbol: Symbol,
    },
    /// Pop exactly `symbol`, push nothing.
    Pop {
        source: State,
        target: State,
        input: Option<Symbol>,
        symbol: Symbol,
    },
    /// Leave the stack untouched.
    Neutral {
        source: State,
        target: State,
        input: Option<Symbol>,
    },
}

impl NormalizedTransition {
    /// State the step starts in.
    pub fn source(&self) -> &State {
        match self {
            Self::Push { source, .. } | Self::Pop { source, .. } | Self::Neutral { source, .. } => {
                source
            }
        }
    }

    /// State the step ends in.
    pub fn target(&self) -> &State {
        match self {
            Self::Push { target, .. } | Self::Pop { target, .. } | Self::Neutral { target, .. } => {
                target
            }
        }
    }

    /// Input read by the step, `None` for epsilon.
    pub fn input(&self) -> Option<&Symbol> {
        match self {
            Self::Push { input, .. } | Self::Pop { input, .. } | Self::Neutral { input, .. } => {
                input.as_ref()
            }
        }
    }

    /// The equivalent one-symbol [`Transition`].
    pub fn to_transition(&self) -> Transition {
        match self {
            Self::Push {
                source,
                target,
                input,
                symbol,
            } => Transition::new(
                source.clone(),
                target.clone(),
                input.clone(),
                None,
                vec![symbol.clone()],
            ),
            Self::Pop {
                source,
                target,
                input,
                symbol,
            } => Transition::new(
                source.clone(),
                target.clone(),
                input.clone(),
                Some(symbol.clone()),
                Vec::new(),
            ),
            Self::Neutral {
                source,
                target,
                input,
            } => Transition::new(source.clone(), target.clone(), input.clone(), None, Vec::new()),
        }
    }

    /// Diagram label `input,pop,push`.
    pub fn label(&self) -> String {
        self.to_transition().label()
    }
}

impl fmt::Display for NormalizedTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input = display_optional(self.input());
        match self {
            Self::Push { symbol, .. } => write!(
                f,
                "{} -> {}: {}, push {}",
                self.source(),
                self.target(),
                input,
                symbol
            ),
            Self::Pop { symbol, .. } => write!(
                f,
                "{} -> {}: {}, pop {}",
                self.source(),
                self.target(),
                input,
                symbol
            ),
            Self::Neutral { .. } => write!(
                f,
                "{} -> {}: {}, {}",
                self.source(),
                self.target(),
                input,
                EPSILON
            ),
        }
    }
}

/// Deterministic source of fresh state names.
///
/// Names come from a counter scoped to one run (`#1`, `#2`, ...) and skip any
/// name already taken, so two runs over the same input agree.
#[derive(Debug, Clone)]
pub struct FreshStates {
    next: usize,
}

impl Default for FreshStates {
    fn default() -> Self {
        Self::new()
    }
}

impl FreshStates {
    /// Prefix shared by every generated name.
    pub const PREFIX: &'static str = "#";

    /// Start a new counter.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Produce the next numbered state and record it in `taken`.
    pub fn next_state(&mut self, taken: &mut IndexSet<State>) -> State {
        loop {
            let candidate = State::new(format!("{}{}", Self::PREFIX, self.next));
            self.next += 1;
            if taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Produce a state named after `hint` (`#hint`, then `#hint'`, ...) and record it.
    pub fn named_state(&mut self, hint: &str, taken: &mut IndexSet<State>) -> State {
        let mut name = format!("{}{}", Self::PREFIX, hint);
        loop {
            let candidate = State::new(name.clone());
            if taken.insert(candidate.clone()) {
                return candidate;
            }
            name.push('\'');
        }
    }
}

/// Output of normalization: the extended state set and single-effect steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAutomaton {
    states: IndexSet<State>,
    fresh_states: IndexSet<State>,
    input_alphabet: IndexSet<Symbol>,
    stack_alphabet: IndexSet<Symbol>,
    stack_bottom: Symbol,
    initial: State,
    finals: IndexSet<State>,
    transitions: Vec<NormalizedTransition>,
    origins: Vec<usize>,
}

impl NormalizedAutomaton {
    /// Original states followed by fresh states in creation order.
    pub fn states(&self) -> &IndexSet<State> {
        &self.states
    }

    /// Only the states introduced by normalization.
    pub fn fresh_states(&self) -> &IndexSet<State> {
        &self.fresh_states
    }

    /// The input alphabet.
    pub fn input_alphabet(&self) -> &IndexSet<Symbol> {
        &self.input_alphabet
    }

    /// The stack alphabet.
    pub fn stack_alphabet(&self) -> &IndexSet<Symbol> {
        &self.stack_alphabet
    }

    /// The stack bottom symbol.
    pub fn stack_bottom(&self) -> &Symbol {
        &self.stack_bottom
    }

    /// The initial state (unchanged by normalization).
    pub fn initial(&self) -> &State {
        &self.initial
    }

    /// The final states (unchanged by normalization).
    pub fn finals(&self) -> &IndexSet<State> {
        &self.finals
    }

    /// All steps, grouped by originating transition in definition order.
    pub fn transitions(&self) -> &[NormalizedTransition] {
        &self.transitions
    }

    /// Index of the original transition each step came from.
    pub fn origins(&self) -> &[usize] {
        &self.origins
    }

    /// Steps produced for original transition `index`.
    pub fn steps_for(&self, index: usize) -> impl Iterator<Item = &NormalizedTransition> + '_ {
        self.transitions
            .iter()
            .zip(self.origins.iter())
            .filter(move |(_, origin)| **origin == index)
            .map(|(step, _)| step)
    }

    /// Whether there are no steps at all.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// View the normalized relation as a plain automaton.
    ///
    /// Every step is already canonical, so normalizing the result again adds
    /// no states.
    pub fn to_automaton(&self) -> PushdownAutomaton {
        PushdownAutomaton::from_validated(
            self.states.clone(),
            self.input_alphabet.clone(),
            self.stack_alphabet.clone(),
            self.stack_bottom.clone(),
            self.initial.clone(),
            self.finals.clone(),
            self.transitions
                .iter()
                .map(NormalizedTransition::to_transition)
                .collect(),
        )
    }
}

/// Rewrite every transition of `automaton` into single-effect steps.
pub fn normalize(automaton: &PushdownAutomaton) -> NormalizedAutomaton {
    let mut states = automaton.states().clone();
    let mut fresh_states = IndexSet::new();
    let mut fresh = FreshStates::new();
    let mut transitions = Vec::with_capacity(automaton.transitions().len());
    let mut origins = Vec::with_capacity(automaton.transitions().len());

    for (index, transition) in automaton.transitions().iter().enumerate() {
        let before = transitions.len();
        decompose(
            transition,
            &mut fresh,
            &mut states,
            &mut fresh_states,
            &mut transitions,
        );
        origins.resize(transitions.len(), index);
        trace!(
            index,
            steps = transitions.len() - before,
            "transition_normalized"
        );
    }

    debug!(
        original = automaton.transitions().len(),
        steps = transitions.len(),
        fresh = fresh_states.len(),
        "normalization_complete"
    );

    NormalizedAutomaton {
        states,
        fresh_states,
        input_alphabet: automaton.input_alphabet().clone(),
        stack_alphabet: automaton.stack_alphabet().clone(),
        stack_bottom: automaton.stack_bottom().clone(),
        initial: automaton.initial().clone(),
        finals: automaton.finals().clone(),
        transitions,
        origins,
    }
}

fn decompose(
    transition: &Transition,
    fresh: &mut FreshStates,
    states: &mut IndexSet<State>,
    fresh_states: &mut IndexSet<State>,
    out: &mut Vec<NormalizedTransition>,
) {
    let Transition {
        source,
        target,
        input,
        pop,
        push,
    } = transition;

    match (pop, push.len()) {
        (None, 0) => out.push(NormalizedTransition::Neutral {
            source: source.clone(),
            target: target.clone(),
            input: input.clone(),
        }),
        (None, 1) => out.push(NormalizedTransition::Push {
            source: source.clone(),
            target: target.clone(),
            input: input.clone(),
            symbol: push[0].clone(),
        }),
        (Some(symbol), 0) => out.push(NormalizedTransition::Pop {
            source: source.clone(),
            target: target.clone(),
            input: input.clone(),
            symbol: symbol.clone(),
        }),
        (pop, _) => {
            let mut current = source.clone();
            let mut input = input.clone();

            if let Some(symbol) = pop {
                let next = fresh.next_state(states);
                fresh_states.insert(next.clone());
                out.push(NormalizedTransition::Pop {
                    source: current,
                    target: next.clone(),
                    input: input.take(),
                    symbol: symbol.clone(),
                });
                current = next;
            }

            // Deepest symbol first, so push[0] ends on top.
            let last = push.len() - 1;
            for (i, symbol) in push.iter().rev().enumerate() {
                let next = if i == last {
                    target.clone()
                } else {
                    let state = fresh.next_state(states);
                    fresh_states.insert(state.clone());
                    state
                };
                out.push(NormalizedTransition::Push {
                    source: current,
                    target: next.clone(),
                    input: input.take(),
                    symbol: symbol.clone(),
                });
                current = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Symbol {
        Symbol::from(name)
    }

    fn st(name: &str) -> State {
        State::from(name)
    }

    fn single(push_text: &str, pop: &str) -> PushdownAutomaton {
        PushdownAutomaton::builder()
            .states(["p", "q"])
            .input_alphabet(["a"])
            .stack_alphabet(["z", "A", "B"])
            .stack_bottom("z")
            .initial("p")
            .final_state("q")
            .transition("p", "q", "a", pop, push_text)
            .build()
            .unwrap()
    }

    #[test]
    fn test_canonical_shapes_are_kept() {
        let n = normalize(&single("", ""));
        assert_eq!(
            n.transitions(),
            &[NormalizedTransition::Neutral {
                source: st("p"),
                target: st("q"),
                input: Some(sym("a")),
            }]
        );

        let n = normalize(&single("A", ""));
        assert_eq!(
            n.transitions(),
            &[NormalizedTransition::Push {
                source: st("p"),
                target: st("q"),
                input: Some(sym("a")),
                symbol: sym("A"),
            }]
        );

        let n = normalize(&single("", "A"));
        assert_eq!(
            n.transitions(),
            &[NormalizedTransition::Pop {
                source: st("p"),
                target: st("q"),
                input: Some(sym("a")),
                symbol: sym("A"),
            }]
        );
        assert!(n.fresh_states().is_empty());
    }

    #[test]
    fn test_pop_then_push_chain() {
        let n = normalize(&single("AB", "z"));

        assert_eq!(n.fresh_states().len(), 2);
        assert_eq!(
            n.transitions(),
            &[
                NormalizedTransition::Pop {
                    source: st("p"),
                    target: st("#1"),
                    input: Some(sym("a")),
                    symbol: sym("z"),
                },
                NormalizedTransition::Push {
                    source: st("#1"),
                    target: st("#2"),
                    input: None,
                    symbol: sym("B"),
                },
                NormalizedTransition::Push {
                    source: st("#2"),
                    target: st("q"),
                    input: None,
                    symbol: sym("A"),
                },
            ]
        );
        assert_eq!(n.origins(), &[0, 0, 0]);
    }

    #[test]
    fn test_push_only_chain_carries_input_first() {
        let n = normalize(&single("ABz", ""));

        assert_eq!(n.fresh_states().len(), 2);
        let steps = n.transitions();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].input(), Some(&sym("a")));
        assert_eq!(steps[1].input(), None);
        assert_eq!(steps[2].input(), None);
        assert_eq!(steps[0].source(), &st("p"));
        assert_eq!(steps[2].target(), &st("q"));
        let pushed: Vec<_> = steps
            .iter()
            .map(|s| match s {
                NormalizedTransition::Push { symbol, .. } => symbol.name().to_string(),
                other => panic!("unexpected step {other}"),
            })
            .collect();
        assert_eq!(pushed, vec!["z", "B", "A"]);
    }

    #[test]
    fn test_fresh_names_skip_taken_states() {
        let pda = PushdownAutomaton::builder()
            .states(["p", "#1"])
            .input_alphabet(["a"])
            .stack_alphabet(["z", "A"])
            .stack_bottom("z")
            .initial("p")
            .final_state("#1")
            .transition("p", "#1", "a", "z", "Az")
            .build()
            .unwrap();

        let n = normalize(&pda);
        let fresh: Vec<_> = n.fresh_states().iter().map(State::name).collect();
        assert_eq!(fresh, vec!["#2", "#3"]);
        assert_eq!(n.states().len(), 4);
    }

    #[test]
    fn test_named_states_avoid_collisions() {
        let mut taken: IndexSet<State> = [st("#start")].into_iter().collect();
        let mut fresh = FreshStates::new();
        assert_eq!(fresh.named_state("start", &mut taken), st("#start'"));
        assert_eq!(fresh.named_state("start", &mut taken), st("#start''"));
        assert_eq!(fresh.named_state("accept", &mut taken), st("#accept"));
    }

    #[test]
    fn test_renormalizing_adds_nothing() {
        let n = normalize(&single("AB", "z"));
        let again = normalize(&n.to_automaton());

        assert!(again.fresh_states().is_empty());
        assert_eq!(again.states(), n.states());
        assert_eq!(again.transitions(), n.transitions());
    }

    #[test]
    fn test_display() {
        let n = normalize(&single("A", "z"));
        let lines: Vec<String> = n.transitions().iter().map(|t| t.to_string()).collect();
        assert_eq!(lines, vec!["p -> #1: a, pop z", "#1 -> q: λ, push A"]);
    }
}
