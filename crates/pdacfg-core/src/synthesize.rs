//! Grammar synthesis by the triple construction.
//!
//! Variable `(p,q)` derives exactly the input that takes the automaton from
//! `p` to `q` with the stack height restored and never dipping below where it
//! started. Productions come from four sources: reflexivity, neutral steps,
//! matched push/pop pairs and transitivity over every triple of states.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::automaton::PushdownAutomaton;
use crate::error::ConversionError;
use crate::grammar::{Grammar, GrammarVariable, Nonterminal, Production, Rhs};
use crate::normalize::{normalize, FreshStates, NormalizedAutomaton, NormalizedTransition};
use crate::symbol::State;

/// Which runs the start symbol describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Acceptance {
    /// Runs from the initial configuration (stack = bottom) that end in a
    /// final state, whatever is left on the stack.
    #[default]
    FinalState,
    /// Runs from the initial state to a final state that restore the stack
    /// height and never pop the bottom symbol.
    Direct,
}

impl Acceptance {
    /// Kebab-case name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Acceptance::FinalState => "final-state",
            Acceptance::Direct => "direct",
        }
    }
}

impl fmt::Display for Acceptance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Acceptance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "final-state" | "final" => Ok(Acceptance::FinalState),
            "direct" => Ok(Acceptance::Direct),
            other => Err(format!(
                "unknown acceptance mode '{}', expected 'final-state' or 'direct'",
                other
            )),
        }
    }
}

/// Options for [`synthesize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub acceptance: Acceptance,
}

impl SynthesisConfig {
    /// Config with the given acceptance mode.
    pub fn with_acceptance(acceptance: Acceptance) -> Self {
        Self { acceptance }
    }
}

/// Both artifacts of a conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub normalized: NormalizedAutomaton,
    pub grammar: Grammar,
}

/// Normalize `automaton` and synthesize its grammar.
pub fn convert(
    automaton: &PushdownAutomaton,
    config: &SynthesisConfig,
) -> Result<Conversion, ConversionError> {
    let normalized = normalize(automaton);
    let grammar = synthesize(&normalized, config)?;
    Ok(Conversion {
        normalized,
        grammar,
    })
}

/// Relation the triple construction runs over, framed per acceptance mode.
struct Frame {
    states: IndexSet<State>,
    steps: Vec<NormalizedTransition>,
    start: State,
    accepting: Vec<State>,
}

impl Frame {
    fn direct(normalized: &NormalizedAutomaton) -> Self {
        Self {
            states: normalized.states().clone(),
            steps: normalized.transitions().to_vec(),
            start: normalized.initial().clone(),
            accepting: normalized.finals().iter().cloned().collect(),
        }
    }

    /// Add an entry state pushing the bottom symbol and a draining state per
    /// final state, so pair variables start and end on an empty stack.
    fn final_state(normalized: &NormalizedAutomaton) -> Self {
        let mut states = normalized.states().clone();
        let mut steps = normalized.transitions().to_vec();
        let mut names = FreshStates::new();

        let start = names.named_state("start", &mut states);
        steps.push(NormalizedTransition::Push {
            source: start.clone(),
            target: normalized.initial().clone(),
            input: None,
            symbol: normalized.stack_bottom().clone(),
        });

        let mut accepting = Vec::with_capacity(normalized.finals().len());
        for accept in normalized.finals() {
            let drain = names.named_state("accept", &mut states);
            steps.push(NormalizedTransition::Neutral {
                source: accept.clone(),
                target: drain.clone(),
                input: None,
            });
            for symbol in normalized.stack_alphabet() {
                steps.push(NormalizedTransition::Pop {
                    source: drain.clone(),
                    target: drain.clone(),
                    input: None,
                    symbol: symbol.clone(),
                });
            }
            accepting.push(drain);
        }

        Self {
            states,
            steps,
            start,
            accepting,
        }
    }
}

/// Build the grammar for a normalized automaton.
///
/// Fails only when the normalized relation is empty.
pub fn synthesize(
    normalized: &NormalizedAutomaton,
    config: &SynthesisConfig,
) -> Result<Grammar, ConversionError> {
    if normalized.is_empty() {
        return Err(ConversionError::EmptyTransitionRelation);
    }

    let frame = match config.acceptance {
        Acceptance::FinalState => Frame::final_state(normalized),
        Acceptance::Direct => Frame::direct(normalized),
    };
    debug!(
        acceptance = %config.acceptance,
        states = frame.states.len(),
        steps = frame.steps.len(),
        "synthesis_started"
    );

    let mut productions = Vec::new();

    let start = match frame.accepting.as_slice() {
        [single] => Nonterminal::Pair(GrammarVariable::new(frame.start.clone(), single.clone())),
        several => {
            for accept in several {
                productions.push(Production {
                    head: Nonterminal::Start,
                    rhs: Rhs::Unit(GrammarVariable::new(frame.start.clone(), accept.clone())),
                });
            }
            Nonterminal::Start
        }
    };

    for state in &frame.states {
        productions.push(Production::new(
            GrammarVariable::new(state.clone(), state.clone()),
            Rhs::Empty,
        ));
    }

    let mut pushes = Vec::new();
    let mut pops = Vec::new();
    for step in &frame.steps {
        match step {
            NormalizedTransition::Neutral {
                source,
                target,
                input,
            } => productions.push(Production::new(
                GrammarVariable::new(source.clone(), target.clone()),
                match input {
                    Some(symbol) => Rhs::Terminal(symbol.clone()),
                    None => Rhs::Empty,
                },
            )),
            NormalizedTransition::Push { symbol, .. } => pushes.push((step, symbol)),
            NormalizedTransition::Pop { symbol, .. } => pops.push((step, symbol)),
        }
    }

    let before = productions.len();
    for (push, pushed) in &pushes {
        for (pop, _) in pops.iter().filter(|(_, popped)| popped == pushed) {
            productions.push(matched(push, pop));
        }
    }
    debug!(
        pushes = pushes.len(),
        pops = pops.len(),
        matched = productions.len() - before,
        "matched_pairs"
    );

    for p in &frame.states {
        for q in &frame.states {
            for r in &frame.states {
                productions.push(Production::new(
                    GrammarVariable::new(p.clone(), q.clone()),
                    Rhs::Concat(
                        GrammarVariable::new(p.clone(), r.clone()),
                        GrammarVariable::new(r.clone(), q.clone()),
                    ),
                ));
            }
        }
    }

    info!(
        start = %start,
        variables = frame.states.len() * frame.states.len(),
        productions = productions.len(),
        "grammar_synthesized"
    );

    Ok(Grammar::new(start, frame.states, productions))
}

/// `(p,q) -> a (r,s) b` for a push `p -> r` and a pop `s -> q` of the same symbol.
fn matched(push: &NormalizedTransition, pop: &NormalizedTransition) -> Production {
    Production::new(
        GrammarVariable::new(push.source().clone(), pop.target().clone()),
        Rhs::Wrapped {
            open: push.input().cloned(),
            inner: GrammarVariable::new(push.target().clone(), pop.source().clone()),
            close: pop.input().cloned(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;

    fn var(p: &str, q: &str) -> GrammarVariable {
        GrammarVariable::new(p, q)
    }

    fn push_pop() -> PushdownAutomaton {
        PushdownAutomaton::builder()
            .states(["p", "q"])
            .input_alphabet(["a", "b"])
            .stack_alphabet(["z", "A"])
            .stack_bottom("z")
            .initial("p")
            .final_state("q")
            .transition("p", "p", "a", "", "A")
            .transition("p", "q", "b", "A", "")
            .build()
            .unwrap()
    }

    #[test]
    fn test_direct_uses_initial_and_final() {
        let config = SynthesisConfig::with_acceptance(Acceptance::Direct);
        let grammar = convert(&push_pop(), &config).unwrap().grammar;

        assert_eq!(grammar.start(), &Nonterminal::Pair(var("p", "q")));
        assert_eq!(grammar.states().len(), 2);
        assert!(grammar.contains(&Production::new(
            var("p", "q"),
            Rhs::Wrapped {
                open: Some(Symbol::from("a")),
                inner: var("p", "p"),
                close: Some(Symbol::from("b")),
            }
        )));
        // 2 reflexive + 1 matched + 8 transitive
        assert_eq!(grammar.len(), 11);
    }

    #[test]
    fn test_production_order() {
        let config = SynthesisConfig::with_acceptance(Acceptance::Direct);
        let grammar = convert(&push_pop(), &config).unwrap().grammar;
        let lines = grammar.render_lines();

        assert_eq!(lines[0], "(p,p) -> λ");
        assert_eq!(lines[1], "(q,q) -> λ");
        assert_eq!(lines[2], "(p,q) -> a (p,p) b");
        assert_eq!(lines[3], "(p,p) -> (p,p) (p,p)");
        assert_eq!(lines[4], "(p,p) -> (p,q) (q,p)");
    }

    #[test]
    fn test_final_state_framing() {
        let conversion = convert(&push_pop(), &SynthesisConfig::default()).unwrap();
        let grammar = &conversion.grammar;

        assert_eq!(grammar.start(), &Nonterminal::Pair(var("#start", "#accept")));
        assert!(grammar.states().contains(&State::from("#start")));
        assert!(grammar.states().contains(&State::from("#accept")));
        // entry push of the bottom symbol matched with the drain popping it
        assert!(grammar.contains(&Production::new(
            var("#start", "#accept"),
            Rhs::Wrapped {
                open: None,
                inner: var("p", "#accept"),
                close: None,
            }
        )));
        assert!(grammar.contains(&Production::new(var("q", "#accept"), Rhs::Empty)));
    }

    #[test]
    fn test_several_finals_use_start_symbol() {
        let pda = PushdownAutomaton::builder()
            .states(["p", "q", "r"])
            .input_alphabet(["a"])
            .stack_alphabet(["z"])
            .stack_bottom("z")
            .initial("p")
            .finals(["q", "r"])
            .transition("p", "q", "a", "", "")
            .transition("p", "r", "", "", "")
            .build()
            .unwrap();

        let grammar = convert(&pda, &SynthesisConfig::default()).unwrap().grammar;
        assert_eq!(grammar.start(), &Nonterminal::Start);
        let lines = grammar.render_lines();
        assert_eq!(lines[0], "S -> (#start,#accept)");
        assert_eq!(lines[1], "S -> (#start,#accept')");
        assert_eq!(grammar.productions_for(&Nonterminal::Start).count(), 2);
        assert!(!grammar
            .productions()
            .iter()
            .any(|p| p.rhs.mentions(&Nonterminal::Start)));
    }

    #[test]
    fn test_direct_several_finals_use_initial_pairs() {
        let pda = PushdownAutomaton::builder()
            .states(["p", "q", "r"])
            .input_alphabet(["a"])
            .stack_alphabet(["z"])
            .stack_bottom("z")
            .initial("p")
            .finals(["q", "r"])
            .transition("p", "q", "a", "", "")
            .transition("p", "r", "", "", "")
            .build()
            .unwrap();

        let config = SynthesisConfig::with_acceptance(Acceptance::Direct);
        let grammar = convert(&pda, &config).unwrap().grammar;
        assert_eq!(grammar.start(), &Nonterminal::Start);
        let lines = grammar.render_lines();
        assert_eq!(lines[0], "S -> (p,q)");
        assert_eq!(lines[1], "S -> (p,r)");
        assert_eq!(grammar.productions_for(&Nonterminal::Start).count(), 2);
        assert!(grammar.derives(&[Symbol::from("a")]));
        assert!(grammar.derives(&[]));
    }

    #[test]
    fn test_epsilon_neutral_becomes_empty_rhs() {
        let pda = PushdownAutomaton::builder()
            .states(["p", "q"])
            .input_alphabet(["a"])
            .stack_alphabet(["z"])
            .stack_bottom("z")
            .initial("p")
            .final_state("q")
            .transition("p", "q", "", "", "")
            .build()
            .unwrap();

        let config = SynthesisConfig::with_acceptance(Acceptance::Direct);
        let grammar = convert(&pda, &config).unwrap().grammar;
        assert!(grammar.contains(&Production::new(var("p", "q"), Rhs::Empty)));
    }

    #[test]
    fn test_empty_relation_fails() {
        let pda = PushdownAutomaton::builder()
            .states(["p"])
            .input_alphabet(["a"])
            .stack_alphabet(["z"])
            .stack_bottom("z")
            .initial("p")
            .final_state("p")
            .build()
            .unwrap();

        let err = convert(&pda, &SynthesisConfig::default()).unwrap_err();
        assert_eq!(err, ConversionError::EmptyTransitionRelation);
    }

    #[test]
    fn test_acceptance_from_str() {
        assert_eq!("final-state".parse::<Acceptance>(), Ok(Acceptance::FinalState));
        assert_eq!("FINAL_STATE".parse::<Acceptance>(), Ok(Acceptance::FinalState));
        assert_eq!("direct".parse::<Acceptance>(), Ok(Acceptance::Direct));
        assert!("empty-stack".parse::<Acceptance>().is_err());
        assert_eq!(Acceptance::default().to_string(), "final-state");
    }
}
