//! Bounded breadth-first simulation of an automaton on a word.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::automaton::PushdownAutomaton;
use crate::error::StructuralError;
use crate::symbol::{tokenize, State, Symbol};

/// Search bounds for [`PushdownAutomaton::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationLimits {
    /// Configurations with a taller stack are pruned.
    pub max_stack_depth: usize,
    /// Distinct configurations explored before giving up.
    pub max_configurations: usize,
}

impl Default for SimulationLimits {
    fn default() -> Self {
        Self {
            max_stack_depth: 64,
            max_configurations: 100_000,
        }
    }
}

/// Outcome of a bounded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Accepted,
    Rejected,
    /// A bound was hit before an accepting configuration was found.
    Undecided,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "accepted"),
            Verdict::Rejected => write!(f, "rejected"),
            Verdict::Undecided => write!(f, "undecided"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Configuration {
    state: State,
    position: usize,
    /// Top of stack is the last element.
    stack: Vec<Symbol>,
}

impl PushdownAutomaton {
    /// Split `text` into input symbols, trying longer symbols first.
    pub fn parse_word(&self, text: &str) -> Result<Vec<Symbol>, StructuralError> {
        tokenize(text, self.input_alphabet())
    }

    /// Run the automaton on `word` from (initial, bottom).
    ///
    /// Accepts once the whole word is read in a final state, regardless of
    /// the remaining stack.
    pub fn run(&self, word: &[Symbol], limits: &SimulationLimits) -> Verdict {
        let initial = Configuration {
            state: self.initial().clone(),
            position: 0,
            stack: vec![self.stack_bottom().clone()],
        };

        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(initial.clone());
        queue.push_back(initial);
        let mut pruned = false;

        while let Some(config) = queue.pop_front() {
            if config.position == word.len() && self.is_final(&config.state) {
                trace!(explored = seen.len(), "word_accepted");
                return Verdict::Accepted;
            }

            for transition in self.transitions_from(&config.state) {
                let position = match &transition.input {
                    Some(symbol) if word.get(config.position) == Some(symbol) => {
                        config.position + 1
                    }
                    Some(_) => continue,
                    None => config.position,
                };

                let mut stack = config.stack.clone();
                if let Some(symbol) = &transition.pop {
                    if stack.last() != Some(symbol) {
                        continue;
                    }
                    stack.pop();
                }
                stack.extend(transition.push.iter().rev().cloned());

                if stack.len() > limits.max_stack_depth {
                    pruned = true;
                    continue;
                }

                let next = Configuration {
                    state: transition.target.clone(),
                    position,
                    stack,
                };
                if seen.contains(&next) {
                    continue;
                }
                if seen.len() >= limits.max_configurations {
                    trace!(explored = seen.len(), "configuration_budget_exhausted");
                    return Verdict::Undecided;
                }
                seen.insert(next.clone());
                queue.push_back(next);
            }
        }

        trace!(explored = seen.len(), pruned, "search_exhausted");
        if pruned {
            Verdict::Undecided
        } else {
            Verdict::Rejected
        }
    }

    /// Whether [`run`](Self::run) with default limits accepts `word`.
    pub fn accepts(&self, word: &[Symbol]) -> bool {
        self.run(word, &SimulationLimits::default()) == Verdict::Accepted
    }
}
