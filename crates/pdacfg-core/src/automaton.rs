//! The pushdown automaton model.
//!
//! A [`PushdownAutomaton`] is built once through [`AutomatonBuilder`], which
//! checks every referential and alphabet invariant, and is read-only
//! afterwards.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AlphabetKind, StructuralError};
use crate::symbol::{
    display_optional, display_word, is_reserved, parse_optional, tokenize, State, Symbol,
};

/// A single move: read `input`, pop `pop`, push `push`, go from `source` to `target`.
///
/// `push` is written top-first: after the move `push[0]` is on top of the
/// stack and the last symbol is deepest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    /// State the move starts in.
    pub source: State,
    /// State the move ends in.
    pub target: State,
    /// Input symbol consumed, or `None` for an epsilon move.
    pub input: Option<Symbol>,
    /// Stack symbol that must be on top and is removed, or `None`.
    pub pop: Option<Symbol>,
    /// Stack symbols written, top-first.
    pub push: Vec<Symbol>,
}

impl Transition {
    /// Create a new transition.
    pub fn new(
        source: impl Into<State>,
        target: impl Into<State>,
        input: Option<Symbol>,
        pop: Option<Symbol>,
        push: Vec<Symbol>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            input,
            pop,
            push,
        }
    }

    /// Diagram label `input,pop,push` with `λ` for epsilon parts.
    pub fn label(&self) -> String {
        format!(
            "{},{},{}",
            display_optional(self.input.as_ref()),
            display_optional(self.pop.as_ref()),
            display_word(&self.push)
        )
    }

    /// Whether the move already has one of the canonical single-effect shapes.
    pub fn is_canonical(&self) -> bool {
        match self.pop {
            Some(_) => self.push.is_empty(),
            None => self.push.len() <= 1,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {},{} → {}",
            self.source,
            self.target,
            display_optional(self.input.as_ref()),
            display_optional(self.pop.as_ref()),
            display_word(&self.push)
        )
    }
}

/// A push string as written in user input.
///
/// `Text` is split into declared stack symbols, longer symbols first, when
/// the automaton is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StackWord {
    /// Explicit symbol list, top-first.
    Symbols(Vec<Symbol>),
    /// Concatenated text such as `"0z"`.
    Text(String),
}

impl Default for StackWord {
    fn default() -> Self {
        StackWord::Symbols(Vec::new())
    }
}

impl StackWord {
    fn resolve<'a>(
        &self,
        alphabet: impl IntoIterator<Item = &'a Symbol>,
    ) -> Result<Vec<Symbol>, StructuralError> {
        match self {
            StackWord::Symbols(symbols) => Ok(symbols.clone()),
            StackWord::Text(text) => tokenize(text, alphabet),
        }
    }
}

/// A transition whose push string has not been resolved yet.
#[derive(Debug, Clone)]
struct PendingTransition {
    source: State,
    target: State,
    input: Option<Symbol>,
    pop: Option<Symbol>,
    push: StackWord,
}

/// Immutable pushdown automaton with validated structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushdownAutomaton {
    states: IndexSet<State>,
    input_alphabet: IndexSet<Symbol>,
    stack_alphabet: IndexSet<Symbol>,
    stack_bottom: Symbol,
    initial: State,
    finals: IndexSet<State>,
    transitions: Vec<Transition>,
}

impl PushdownAutomaton {
    /// Start building an automaton.
    pub fn builder() -> AutomatonBuilder {
        AutomatonBuilder::new()
    }

    /// Assemble an automaton whose invariants already hold.
    pub(crate) fn from_validated(
        states: IndexSet<State>,
        input_alphabet: IndexSet<Symbol>,
        stack_alphabet: IndexSet<Symbol>,
        stack_bottom: Symbol,
        initial: State,
        finals: IndexSet<State>,
        transitions: Vec<Transition>,
    ) -> Self {
        Self {
            states,
            input_alphabet,
            stack_alphabet,
            stack_bottom,
            initial,
            finals,
            transitions,
        }
    }

    /// All states, in declaration order.
    pub fn states(&self) -> &IndexSet<State> {
        &self.states
    }

    /// The input alphabet.
    pub fn input_alphabet(&self) -> &IndexSet<Symbol> {
        &self.input_alphabet
    }

    /// The stack alphabet (includes the stack bottom).
    pub fn stack_alphabet(&self) -> &IndexSet<Symbol> {
        &self.stack_alphabet
    }

    /// The symbol sitting at the bottom of the stack when a run starts.
    pub fn stack_bottom(&self) -> &Symbol {
        &self.stack_bottom
    }

    /// The initial state.
    pub fn initial(&self) -> &State {
        &self.initial
    }

    /// The final (accepting) states.
    pub fn finals(&self) -> &IndexSet<State> {
        &self.finals
    }

    /// Whether `state` is accepting.
    pub fn is_final(&self, state: &State) -> bool {
        self.finals.contains(state)
    }

    /// The transition relation, in definition order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Transitions leaving `state`.
    pub fn transitions_from<'a>(
        &'a self,
        state: &'a State,
    ) -> impl Iterator<Item = &'a Transition> + 'a {
        self.transitions.iter().filter(move |t| &t.source == state)
    }

    /// Number of transitions that are not yet single-effect moves.
    pub fn non_canonical_count(&self) -> usize {
        self.transitions.iter().filter(|t| !t.is_canonical()).count()
    }
}

impl fmt::Display for PushdownAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |items: Vec<&str>| items.join(", ");
        writeln!(
            f,
            "States: {}",
            join(self.states.iter().map(State::name).collect())
        )?;
        writeln!(f, "Initial: {}", self.initial)?;
        writeln!(
            f,
            "Final: {}",
            join(self.finals.iter().map(State::name).collect())
        )?;
        writeln!(
            f,
            "Input Alphabet: {}",
            join(self.input_alphabet.iter().map(Symbol::name).collect())
        )?;
        writeln!(
            f,
            "Stack Alphabet: {}",
            join(self.stack_alphabet.iter().map(Symbol::name).collect())
        )?;
        writeln!(f, "Stack Bottom: {}", self.stack_bottom)?;
        writeln!(f, "Transitions:")?;
        for transition in &self.transitions {
            writeln!(f, "  - {}", transition)?;
        }
        Ok(())
    }
}

/// Collects raw field values and validates them into a [`PushdownAutomaton`].
#[derive(Debug, Clone, Default)]
pub struct AutomatonBuilder {
    states: Vec<State>,
    input_alphabet: Vec<Symbol>,
    stack_alphabet: Vec<Symbol>,
    stack_bottom: Option<Symbol>,
    initial: Option<State>,
    finals: Vec<State>,
    transitions: Vec<PendingTransition>,
}

impl AutomatonBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a state.
    pub fn state(mut self, state: impl Into<State>) -> Self {
        self.states.push(state.into());
        self
    }

    /// Declare several states.
    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Declare input symbols.
    pub fn input_alphabet<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        self.input_alphabet
            .extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Declare stack symbols.
    pub fn stack_alphabet<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        self.stack_alphabet
            .extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Select the stack bottom symbol.
    pub fn stack_bottom(mut self, symbol: impl Into<Symbol>) -> Self {
        self.stack_bottom = Some(symbol.into());
        self
    }

    /// Select the initial state.
    pub fn initial(mut self, state: impl Into<State>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Mark a state as final.
    pub fn final_state(mut self, state: impl Into<State>) -> Self {
        self.finals.push(state.into());
        self
    }

    /// Mark several states as final.
    pub fn finals<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        self.finals.extend(states.into_iter().map(Into::into));
        self
    }

    /// Add a transition written in text form.
    ///
    /// `input` and `pop` use `""` or `λ` for epsilon; `push` is split into
    /// stack symbols when the automaton is built.
    pub fn transition(
        self,
        source: impl Into<State>,
        target: impl Into<State>,
        input: &str,
        pop: &str,
        push: &str,
    ) -> Self {
        self.transition_word(
            source,
            target,
            parse_optional(input),
            parse_optional(pop),
            StackWord::Text(push.to_string()),
        )
    }

    /// Add a fully-formed transition.
    pub fn push_transition(self, transition: Transition) -> Self {
        self.transition_word(
            transition.source,
            transition.target,
            transition.input,
            transition.pop,
            StackWord::Symbols(transition.push),
        )
    }

    /// Add a transition whose push string is given as a [`StackWord`].
    pub fn transition_word(
        mut self,
        source: impl Into<State>,
        target: impl Into<State>,
        input: Option<Symbol>,
        pop: Option<Symbol>,
        push: StackWord,
    ) -> Self {
        self.transitions.push(PendingTransition {
            source: source.into(),
            target: target.into(),
            input,
            pop,
            push,
        });
        self
    }

    /// Validate every invariant and produce the automaton.
    pub fn build(self) -> Result<PushdownAutomaton, StructuralError> {
        if self.states.is_empty() {
            return Err(StructuralError::NoStates);
        }

        let mut states = IndexSet::with_capacity(self.states.len());
        for state in self.states {
            if is_reserved(state.name()) {
                return Err(StructuralError::ReservedName {
                    what: "state",
                    name: state.name().to_string(),
                });
            }
            if states.contains(&state) {
                return Err(StructuralError::DuplicateState { state });
            }
            states.insert(state);
        }

        let input_alphabet = collect_alphabet(self.input_alphabet, AlphabetKind::Input)?;
        let stack_alphabet = collect_alphabet(self.stack_alphabet, AlphabetKind::Stack)?;

        let initial = self.initial.ok_or(StructuralError::MissingInitialState)?;
        if !states.contains(&initial) {
            return Err(StructuralError::UnknownInitialState { state: initial });
        }

        if self.finals.is_empty() {
            return Err(StructuralError::NoFinalStates);
        }
        let mut finals = IndexSet::with_capacity(self.finals.len());
        for state in self.finals {
            if !states.contains(&state) {
                return Err(StructuralError::UnknownFinalState { state });
            }
            finals.insert(state);
        }

        let stack_bottom = self.stack_bottom.ok_or(StructuralError::MissingStackBottom)?;
        if !stack_alphabet.contains(&stack_bottom) {
            return Err(StructuralError::UnknownStackBottom {
                symbol: stack_bottom,
            });
        }

        let mut transitions = Vec::with_capacity(self.transitions.len());
        for (index, pending) in self.transitions.into_iter().enumerate() {
            for state in [&pending.source, &pending.target] {
                if !states.contains(state) {
                    return Err(StructuralError::UnknownTransitionState {
                        index,
                        state: state.clone(),
                    });
                }
            }
            if let Some(symbol) = &pending.input {
                if !input_alphabet.contains(symbol) {
                    return Err(StructuralError::UnknownInputSymbol {
                        index,
                        symbol: symbol.clone(),
                    });
                }
            }
            let push = pending.push.resolve(&stack_alphabet)?;
            for symbol in pending.pop.iter().chain(push.iter()) {
                if !stack_alphabet.contains(symbol) {
                    return Err(StructuralError::UnknownStackSymbol {
                        index,
                        symbol: symbol.clone(),
                    });
                }
            }
            transitions.push(Transition {
                source: pending.source,
                target: pending.target,
                input: pending.input,
                pop: pending.pop,
                push,
            });
        }

        debug!(
            states = states.len(),
            transitions = transitions.len(),
            "automaton_built"
        );

        Ok(PushdownAutomaton {
            states,
            input_alphabet,
            stack_alphabet,
            stack_bottom,
            initial,
            finals,
            transitions,
        })
    }
}

fn collect_alphabet(
    symbols: Vec<Symbol>,
    alphabet: AlphabetKind,
) -> Result<IndexSet<Symbol>, StructuralError> {
    let mut set = IndexSet::with_capacity(symbols.len());
    for symbol in symbols {
        if is_reserved(symbol.name()) {
            return Err(StructuralError::ReservedName {
                what: match alphabet {
                    AlphabetKind::Input => "input symbol",
                    AlphabetKind::Stack => "stack symbol",
                },
                name: symbol.name().to_string(),
            });
        }
        if set.contains(&symbol) {
            return Err(StructuralError::DuplicateSymbol { alphabet, symbol });
        }
        set.insert(symbol);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AutomatonBuilder {
        PushdownAutomaton::builder()
            .states(["q0", "q1"])
            .input_alphabet(["a"])
            .stack_alphabet(["z", "X"])
            .stack_bottom("z")
            .initial("q0")
            .final_state("q1")
    }

    #[test]
    fn test_build_resolves_push_text() {
        let pda = base()
            .transition("q0", "q1", "a", "z", "Xz")
            .build()
            .unwrap();

        let t = &pda.transitions()[0];
        assert_eq!(t.input, Some(Symbol::from("a")));
        assert_eq!(t.pop, Some(Symbol::from("z")));
        assert_eq!(t.push, vec![Symbol::from("X"), Symbol::from("z")]);
        assert_eq!(t.label(), "a,z,Xz");
        assert_eq!(t.to_string(), "q0 -> q1: a,z → Xz");
    }

    #[test]
    fn test_epsilon_parts() {
        let pda = base().transition("q0", "q1", "λ", "", "λ").build().unwrap();
        let t = &pda.transitions()[0];
        assert!(t.input.is_none());
        assert!(t.pop.is_none());
        assert!(t.push.is_empty());
        assert_eq!(t.label(), "λ,λ,λ");
        assert!(t.is_canonical());
    }

    #[test]
    fn test_unknown_transition_state() {
        let err = base()
            .transition("q9", "q1", "a", "", "")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            StructuralError::UnknownTransitionState {
                index: 0,
                state: State::from("q9"),
            }
        );
    }

    #[test]
    fn test_symbol_outside_alphabets() {
        let err = base().transition("q0", "q1", "b", "", "").build().unwrap_err();
        assert!(matches!(err, StructuralError::UnknownInputSymbol { .. }));

        let err = base()
            .push_transition(Transition::new(
                "q0",
                "q1",
                None,
                Some(Symbol::from("Y")),
                vec![],
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, StructuralError::UnknownStackSymbol { .. }));

        let err = base().transition("q0", "q1", "", "", "Q").build().unwrap_err();
        assert!(matches!(err, StructuralError::UntokenizableWord { .. }));
    }

    #[test]
    fn test_empty_and_duplicate_states() {
        let err = PushdownAutomaton::builder().build().unwrap_err();
        assert_eq!(err, StructuralError::NoStates);

        let err = base().state("q0").build().unwrap_err();
        assert_eq!(
            err,
            StructuralError::DuplicateState {
                state: State::from("q0")
            }
        );
    }

    #[test]
    fn test_missing_selections() {
        let err = PushdownAutomaton::builder()
            .states(["q0"])
            .stack_alphabet(["z"])
            .stack_bottom("z")
            .initial("q0")
            .build()
            .unwrap_err();
        assert_eq!(err, StructuralError::NoFinalStates);

        let err = PushdownAutomaton::builder()
            .states(["q0"])
            .stack_alphabet(["z"])
            .initial("q0")
            .final_state("q0")
            .build()
            .unwrap_err();
        assert_eq!(err, StructuralError::MissingStackBottom);

        let err = PushdownAutomaton::builder()
            .states(["q0"])
            .stack_alphabet(["z"])
            .stack_bottom("y")
            .initial("q0")
            .final_state("q0")
            .build()
            .unwrap_err();
        assert!(matches!(err, StructuralError::UnknownStackBottom { .. }));
    }

    #[test]
    fn test_reserved_names_rejected() {
        let err = base().input_alphabet(["λ"]).build().unwrap_err();
        assert!(matches!(err, StructuralError::ReservedName { .. }));

        let err = base().state("").build().unwrap_err();
        assert!(matches!(err, StructuralError::ReservedName { .. }));
    }

    #[test]
    fn test_duplicate_finals_are_merged() {
        let pda = base().final_state("q1").build().unwrap();
        assert_eq!(pda.finals().len(), 1);
        assert!(pda.is_final(&State::from("q1")));
        assert!(!pda.is_final(&State::from("q0")));
    }
}
