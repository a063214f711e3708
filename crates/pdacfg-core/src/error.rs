//! Error types for the conversion pipeline.

use thiserror::Error;

use crate::symbol::{State, Symbol};

/// Result type alias for pipeline operations.
pub type PdaResult<T> = Result<T, PdaError>;

/// Violations of the automaton's referential and alphabet invariants.
///
/// Raised while building an automaton (directly or from a definition file).
/// Always recoverable: reject the input and do not proceed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// No states were declared.
    #[error("automaton declares no states")]
    NoStates,

    /// No final states were declared.
    #[error("automaton declares no final states")]
    NoFinalStates,

    /// The initial state was never set.
    #[error("no initial state selected")]
    MissingInitialState,

    /// The stack bottom symbol was never set.
    #[error("no stack bottom symbol selected")]
    MissingStackBottom,

    /// A state name appears twice in the state list.
    #[error("duplicate state: {state}")]
    DuplicateState { state: State },

    /// A symbol appears twice in one alphabet.
    #[error("duplicate {alphabet} symbol: {symbol}")]
    DuplicateSymbol {
        alphabet: AlphabetKind,
        symbol: Symbol,
    },

    /// A name is empty or collides with the epsilon glyph.
    #[error("reserved name used as {what}: {name:?}")]
    ReservedName { what: &'static str, name: String },

    /// The initial state is not a declared state.
    #[error("initial state {state} is not declared")]
    UnknownInitialState { state: State },

    /// A final state is not a declared state.
    #[error("final state {state} is not declared")]
    UnknownFinalState { state: State },

    /// A transition references an undeclared state.
    #[error("transition #{index} references undeclared state {state}")]
    UnknownTransitionState { index: usize, state: State },

    /// A transition reads a symbol outside the input alphabet.
    #[error("transition #{index} reads {symbol}, which is not in the input alphabet")]
    UnknownInputSymbol { index: usize, symbol: Symbol },

    /// A transition pops or pushes a symbol outside the stack alphabet.
    #[error("transition #{index} uses stack symbol {symbol}, which is not in the stack alphabet")]
    UnknownStackSymbol { index: usize, symbol: Symbol },

    /// The stack bottom is not part of the stack alphabet.
    #[error("stack bottom {symbol} is not in the stack alphabet")]
    UnknownStackBottom { symbol: Symbol },

    /// A word could not be split into symbols of its alphabet.
    #[error("cannot split {text:?} into declared symbols")]
    UntokenizableWord { text: String },
}

/// Which alphabet a symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphabetKind {
    Input,
    Stack,
}

impl std::fmt::Display for AlphabetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlphabetKind::Input => write!(f, "input"),
            AlphabetKind::Stack => write!(f, "stack"),
        }
    }
}

/// Failures of grammar synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The normalized automaton has no transitions at all.
    #[error("automaton has no transitions; nothing to convert")]
    EmptyTransitionRelation,
}

/// Any error surfaced by the pipeline.
#[derive(Debug, Error)]
pub enum PdaError {
    /// The automaton is malformed.
    #[error("invalid automaton: {0}")]
    Structural(#[from] StructuralError),

    /// Grammar synthesis failed.
    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    /// Definition (de)serialization error.
    #[error("definition format error: {0}")]
    Definition(#[from] serde_json::Error),

    /// XML definition could not be read or written.
    #[error("xml definition error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML definition does not follow the `<Automata>` element layout.
    #[error("xml layout error: {0}")]
    XmlLayout(String),

    /// I/O error (file operations).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
