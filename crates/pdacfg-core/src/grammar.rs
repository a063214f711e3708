//! Grammar types and their textual presentation.
//!
//! Nonterminals are pairs of states `(p,q)` plus an optional synthetic start
//! symbol `S`. Every production renders on one line as `head -> rhs`, with
//! `λ` standing for the empty string.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::symbol::{State, Symbol, EPSILON};

/// Name used to render the synthetic start symbol.
pub const START_SYMBOL: &str = "S";

/// Nonterminal for an ordered pair of states.
///
/// Derives the input read while moving from `from` to `to` with no net
/// change in stack height, never popping below the height held at `from`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GrammarVariable {
    pub from: State,
    pub to: State,
}

impl GrammarVariable {
    /// Create the variable for `(from, to)`.
    pub fn new(from: impl Into<State>, to: impl Into<State>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for GrammarVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.from, self.to)
    }
}

/// Left-hand side of a production.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Nonterminal {
    /// Synthetic start symbol, distinct from every pair variable.
    Start,
    /// A pair variable.
    Pair(GrammarVariable),
}

impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nonterminal::Start => write!(f, "{}", START_SYMBOL),
            Nonterminal::Pair(variable) => write!(f, "{}", variable),
        }
    }
}

impl From<GrammarVariable> for Nonterminal {
    fn from(variable: GrammarVariable) -> Self {
        Nonterminal::Pair(variable)
    }
}

/// One item of a flattened right-hand side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GrammarSymbol {
    Terminal(Symbol),
    Nonterminal(Nonterminal),
}

/// Right-hand side of a production.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Rhs {
    /// The empty string.
    Empty,
    /// A single input symbol.
    Terminal(Symbol),
    /// `open inner close`, where either terminal may be absent.
    Wrapped {
        open: Option<Symbol>,
        inner: GrammarVariable,
        close: Option<Symbol>,
    },
    /// Two variables in sequence.
    Concat(GrammarVariable, GrammarVariable),
    /// A single variable (start rules only).
    Unit(GrammarVariable),
}

impl Rhs {
    /// The right-hand side as a sequence of grammar symbols.
    pub fn symbols(&self) -> Vec<GrammarSymbol> {
        let pair = |v: &GrammarVariable| GrammarSymbol::Nonterminal(Nonterminal::Pair(v.clone()));
        match self {
            Rhs::Empty => Vec::new(),
            Rhs::Terminal(symbol) => vec![GrammarSymbol::Terminal(symbol.clone())],
            Rhs::Wrapped { open, inner, close } => open
                .iter()
                .map(|s| GrammarSymbol::Terminal(s.clone()))
                .chain(std::iter::once(pair(inner)))
                .chain(close.iter().map(|s| GrammarSymbol::Terminal(s.clone())))
                .collect(),
            Rhs::Concat(left, right) => vec![pair(left), pair(right)],
            Rhs::Unit(inner) => vec![pair(inner)],
        }
    }

    /// Whether the right-hand side refers to `nonterminal`.
    pub fn mentions(&self, nonterminal: &Nonterminal) -> bool {
        self.symbols()
            .iter()
            .any(|s| matches!(s, GrammarSymbol::Nonterminal(n) if n == nonterminal))
    }
}

impl fmt::Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self
            .symbols()
            .iter()
            .map(|s| match s {
                GrammarSymbol::Terminal(t) => t.to_string(),
                GrammarSymbol::Nonterminal(n) => n.to_string(),
            })
            .collect();
        if tokens.is_empty() {
            write!(f, "{}", EPSILON)
        } else {
            write!(f, "{}", tokens.join(" "))
        }
    }
}

/// A rewrite rule `head -> rhs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Production {
    pub head: Nonterminal,
    pub rhs: Rhs,
}

impl Production {
    /// Create a production for a pair variable.
    pub fn new(head: GrammarVariable, rhs: Rhs) -> Self {
        Self {
            head: Nonterminal::Pair(head),
            rhs,
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.head, self.rhs)
    }
}

/// Counts of productions by shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GrammarStats {
    pub start: usize,
    pub empty: usize,
    pub terminal: usize,
    pub wrapped: usize,
    pub concat: usize,
}

impl GrammarStats {
    /// Total number of productions.
    pub fn total(&self) -> usize {
        self.start + self.empty + self.terminal + self.wrapped + self.concat
    }
}

/// Start symbol plus an ordered, append-only list of productions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grammar {
    start: Nonterminal,
    states: IndexSet<State>,
    variables: IndexSet<GrammarVariable>,
    productions: Vec<Production>,
}

impl Grammar {
    pub(crate) fn new(
        start: Nonterminal,
        states: IndexSet<State>,
        productions: Vec<Production>,
    ) -> Self {
        let variables = states
            .iter()
            .flat_map(|p| states.iter().map(move |q| GrammarVariable::new(p.clone(), q.clone())))
            .collect();
        Self {
            start,
            states,
            variables,
            productions,
        }
    }

    /// The start symbol.
    pub fn start(&self) -> &Nonterminal {
        &self.start
    }

    /// The state set the variables range over.
    pub fn states(&self) -> &IndexSet<State> {
        &self.states
    }

    /// Every pair variable, one per ordered pair of states.
    pub fn variables(&self) -> &IndexSet<GrammarVariable> {
        &self.variables
    }

    /// All productions, in synthesis order.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Productions whose head is `head`.
    pub fn productions_for<'a>(
        &'a self,
        head: &'a Nonterminal,
    ) -> impl Iterator<Item = &'a Production> + 'a {
        self.productions.iter().filter(move |p| &p.head == head)
    }

    /// Whether the grammar contains `production`.
    pub fn contains(&self, production: &Production) -> bool {
        self.productions.contains(production)
    }

    /// Number of productions.
    pub fn len(&self) -> usize {
        self.productions.len()
    }

    /// Whether there are no productions.
    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    /// Production counts by shape.
    pub fn stats(&self) -> GrammarStats {
        let mut stats = GrammarStats::default();
        for production in &self.productions {
            match production.rhs {
                Rhs::Unit(_) => stats.start += 1,
                Rhs::Empty => stats.empty += 1,
                Rhs::Terminal(_) => stats.terminal += 1,
                Rhs::Wrapped { .. } => stats.wrapped += 1,
                Rhs::Concat(..) => stats.concat += 1,
            }
        }
        stats
    }

    /// One line per production, start rules first.
    pub fn render_lines(&self) -> Vec<String> {
        self.productions.iter().map(ToString::to_string).collect()
    }

    /// One line per head with alternatives joined by ` | `.
    pub fn render_grouped(&self) -> Vec<String> {
        let mut groups: IndexMap<&Nonterminal, Vec<String>> = IndexMap::new();
        for production in &self.productions {
            groups
                .entry(&production.head)
                .or_default()
                .push(production.rhs.to_string());
        }
        groups
            .into_iter()
            .map(|(head, alternatives)| format!("{} -> {}", head, alternatives.join(" | ")))
            .collect()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.render_lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
