//! Identifiers for states and alphabet symbols.
//!
//! Both are opaque names. Epsilon is never a symbol: it is modelled as
//! `Option<Symbol>::None` wherever a move may read or pop nothing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StructuralError;

/// Glyph used to display epsilon (the absent symbol).
pub const EPSILON: &str = "λ";

/// Name of an automaton state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(String);

impl State {
    /// Create a state from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the state name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for State {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for State {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A member of the input or the stack alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the symbol name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Whether `name` may not be used for a state or symbol.
pub(crate) fn is_reserved(name: &str) -> bool {
    name.trim().is_empty() || name == EPSILON
}

/// Interpret user text as an optional symbol: empty text and `λ` mean epsilon.
pub fn parse_optional(text: &str) -> Option<Symbol> {
    let text = text.trim();
    if text.is_empty() || text == EPSILON {
        None
    } else {
        Some(Symbol::new(text))
    }
}

/// Display an optional symbol, using [`EPSILON`] for `None`.
pub fn display_optional(symbol: Option<&Symbol>) -> &str {
    symbol.map(Symbol::name).unwrap_or(EPSILON)
}

/// Display a symbol string by concatenation, using [`EPSILON`] when empty.
pub fn display_word(word: &[Symbol]) -> String {
    if word.is_empty() {
        EPSILON.to_string()
    } else {
        word.iter().map(Symbol::name).collect()
    }
}

/// Split `text` into symbols of `alphabet`, trying longer symbols first.
///
/// When the longest match leads to a dead end the next shorter candidate is
/// tried, so the split fails only when no split exists. Whitespace separates
/// tokens but is otherwise ignored; `λ` alone (or empty text) yields the
/// empty word.
pub fn tokenize<'a>(
    text: &str,
    alphabet: impl IntoIterator<Item = &'a Symbol>,
) -> Result<Vec<Symbol>, StructuralError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == EPSILON {
        return Ok(Vec::new());
    }

    let mut candidates: Vec<&Symbol> = alphabet
        .into_iter()
        .filter(|s| !s.name().is_empty())
        .collect();
    candidates.sort_by_key(|s| std::cmp::Reverse(s.name().len()));

    let mut word = Vec::new();
    for chunk in trimmed.split_whitespace() {
        let mut dead = vec![false; chunk.len()];
        if !split_chunk(chunk, 0, &candidates, &mut dead, &mut word) {
            return Err(StructuralError::UntokenizableWord {
                text: text.to_string(),
            });
        }
    }
    Ok(word)
}

/// Depth-first split of `chunk[at..]`; `dead` remembers offsets with no split.
fn split_chunk(
    chunk: &str,
    at: usize,
    candidates: &[&Symbol],
    dead: &mut [bool],
    word: &mut Vec<Symbol>,
) -> bool {
    if at == chunk.len() {
        return true;
    }
    if dead[at] {
        return false;
    }
    let rest = &chunk[at..];
    for symbol in candidates.iter().filter(|s| rest.starts_with(s.name())) {
        word.push((*symbol).clone());
        if split_chunk(chunk, at + symbol.name().len(), candidates, dead, word) {
            return true;
        }
        word.pop();
    }
    dead[at] = true;
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alphabet(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|n| Symbol::from(*n)).collect()
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(parse_optional(""), None);
        assert_eq!(parse_optional("  "), None);
        assert_eq!(parse_optional(EPSILON), None);
        assert_eq!(parse_optional(" a "), Some(Symbol::from("a")));
    }

    #[test]
    fn test_tokenize_single_characters() {
        let stack = alphabet(&["z", "0"]);
        let word = tokenize("0z", &stack).unwrap();
        assert_eq!(word, alphabet(&["0", "z"]));
    }

    #[test]
    fn test_tokenize_prefers_longest_symbol() {
        let stack = alphabet(&["A", "AB", "B"]);
        let word = tokenize("ABB", &stack).unwrap();
        assert_eq!(word, alphabet(&["AB", "B"]));

        let spaced = tokenize("A B B", &stack).unwrap();
        assert_eq!(spaced, alphabet(&["A", "B", "B"]));
    }

    #[test]
    fn test_tokenize_backtracks_when_longest_fails() {
        let input = alphabet(&["a", "ab", "bc"]);
        let word = tokenize("abc", &input).unwrap();
        assert_eq!(word, alphabet(&["a", "bc"]));

        let word = tokenize("abbc", &input).unwrap();
        assert_eq!(word, alphabet(&["ab", "bc"]));

        assert!(matches!(
            tokenize("abcc", &input),
            Err(StructuralError::UntokenizableWord { .. })
        ));
    }

    #[test]
    fn test_tokenize_epsilon_and_unknown() {
        let stack = alphabet(&["z"]);
        assert!(tokenize(EPSILON, &stack).unwrap().is_empty());
        assert!(tokenize("", &stack).unwrap().is_empty());
        assert!(matches!(
            tokenize("zq", &stack),
            Err(StructuralError::UntokenizableWord { .. })
        ));
    }

    #[test]
    fn test_display_helpers() {
        assert_eq!(display_optional(None), EPSILON);
        assert_eq!(display_word(&[]), EPSILON);
        assert_eq!(display_word(&alphabet(&["0", "z"])), "0z");
    }
}
