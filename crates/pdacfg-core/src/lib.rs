//! Pushdown automaton to context-free grammar conversion.
//!
//! This crate turns a validated pushdown automaton into an equivalent
//! context-free grammar with the classic triple construction.
//!
//! ## Pipeline
//!
//! ```text
//! AutomatonDefinition ──▶ PushdownAutomaton ──normalize──▶ NormalizedAutomaton
//!                                                              │
//!                                                         synthesize
//!                                                              ▼
//!                                                           Grammar
//! ```
//!
//! - **Normalization** rewrites every move into single-effect steps (pure
//!   push, pure pop or neutral) through fresh `#n` states.
//! - **Synthesis** creates one variable `(p,q)` per pair of states and
//!   productions for reflexivity, neutral steps, matched push/pop pairs and
//!   transitivity.
//!
//! ## Example
//!
//! ```
//! use pdacfg_core::{convert, samples, SynthesisConfig};
//!
//! let pda = samples::anbn();
//! let conversion = convert(&pda, &SynthesisConfig::default()).unwrap();
//! let ab = pda.parse_word("ab").unwrap();
//! assert!(conversion.grammar.derives(&ab));
//! ```

mod automaton;
mod error;
mod grammar;
mod language;
mod normalize;
pub mod persistence;
pub mod samples;
mod simulate;
mod symbol;
mod synthesize;

pub use automaton::{AutomatonBuilder, PushdownAutomaton, StackWord, Transition};
pub use error::{AlphabetKind, ConversionError, PdaError, PdaResult, StructuralError};
pub use grammar::{
    Grammar, GrammarStats, GrammarSymbol, GrammarVariable, Nonterminal, Production, Rhs,
    START_SYMBOL,
};
pub use normalize::{normalize, FreshStates, NormalizedAutomaton, NormalizedTransition};
pub use simulate::{SimulationLimits, Verdict};
pub use symbol::{display_optional, display_word, parse_optional, tokenize, State, Symbol, EPSILON};
pub use synthesize::{convert, synthesize, Acceptance, Conversion, SynthesisConfig};

// Persistence
pub use persistence::{
    load_definition, save_definition, AutomatonDefinition, DefinitionFormat, TransitionDefinition,
};
