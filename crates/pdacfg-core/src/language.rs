//! Bounded enumeration of the language a grammar generates.
//!
//! Computes, for every nonterminal, the set of terminal strings of length at
//! most `n` it derives, as a least fixpoint. Strings only grow along a
//! derivation, so capping at `n` never loses a short word.

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexSet;
use tracing::debug;

use crate::grammar::{Grammar, GrammarSymbol, Nonterminal};
use crate::symbol::Symbol;

enum Item {
    Terminal(Symbol),
    Nonterminal(usize),
}

impl Grammar {
    /// Every terminal string of length `<= max_len` derivable from the start symbol.
    pub fn words_up_to(&self, max_len: usize) -> BTreeSet<Vec<Symbol>> {
        let mut index: IndexSet<Nonterminal> = IndexSet::new();
        index.insert(self.start().clone());

        let mut rules: Vec<(usize, Vec<Item>)> = Vec::with_capacity(self.len());
        for production in self.productions() {
            let (head, _) = index.insert_full(production.head.clone());
            let mut body = Vec::new();
            for symbol in production.rhs.symbols() {
                body.push(match symbol {
                    GrammarSymbol::Terminal(t) => Item::Terminal(t),
                    GrammarSymbol::Nonterminal(n) => Item::Nonterminal(index.insert_full(n).0),
                });
            }
            rules.push((head, body));
        }

        let mut languages: Vec<HashSet<Vec<Symbol>>> = vec![HashSet::new(); index.len()];
        let mut rounds = 0;
        loop {
            rounds += 1;
            let mut changed = false;
            for (head, body) in &rules {
                for word in expand(body, &languages, max_len) {
                    changed |= languages[*head].insert(word);
                }
            }
            if !changed {
                break;
            }
        }

        debug!(
            max_len,
            rounds,
            nonterminals = index.len(),
            "language_enumerated"
        );
        languages[0].iter().cloned().collect()
    }

    /// Whether the start symbol derives `word`.
    pub fn derives(&self, word: &[Symbol]) -> bool {
        self.words_up_to(word.len()).contains(word)
    }
}

/// Words of length `<= max_len` a body yields under the current languages.
fn expand(body: &[Item], languages: &[HashSet<Vec<Symbol>>], max_len: usize) -> Vec<Vec<Symbol>> {
    let mut partial: Vec<Vec<Symbol>> = vec![Vec::new()];
    for item in body {
        let mut next = Vec::new();
        match item {
            Item::Terminal(symbol) => {
                for mut word in partial {
                    if word.len() < max_len {
                        word.push(symbol.clone());
                        next.push(word);
                    }
                }
            }
            Item::Nonterminal(n) => {
                for prefix in &partial {
                    for suffix in &languages[*n] {
                        if prefix.len() + suffix.len() <= max_len {
                            let mut word = prefix.clone();
                            word.extend(suffix.iter().cloned());
                            next.push(word);
                        }
                    }
                }
            }
        }
        if next.is_empty() {
            return next;
        }
        partial = next;
    }
    partial
}

#[cfg(test)]
mod tests {
    use crate::automaton::PushdownAutomaton;
    use crate::symbol::Symbol;
    use crate::synthesize::{convert, Acceptance, SynthesisConfig};

    fn words(set: &std::collections::BTreeSet<Vec<Symbol>>) -> Vec<String> {
        let mut out: Vec<String> = set
            .iter()
            .map(|w| w.iter().map(Symbol::name).collect())
            .collect();
        out.sort_by(|a, b| a.len().cmp(&b.len()).then(a.cmp(b)));
        out
    }

    fn dyck() -> PushdownAutomaton {
        PushdownAutomaton::builder()
            .states(["q"])
            .input_alphabet(["(", ")"])
            .stack_alphabet(["z", "X"])
            .stack_bottom("z")
            .initial("q")
            .final_state("q")
            .transition("q", "q", "(", "", "X")
            .transition("q", "q", ")", "X", "")
            .build()
            .unwrap()
    }

    #[test]
    fn test_direct_dyck_words() {
        let config = SynthesisConfig::with_acceptance(Acceptance::Direct);
        let grammar = convert(&dyck(), &config).unwrap().grammar;

        assert_eq!(
            words(&grammar.words_up_to(4)),
            vec!["", "()", "(())", "()()"]
        );
    }

    #[test]
    fn test_final_state_accepts_unbalanced_prefixes() {
        let grammar = convert(&dyck(), &SynthesisConfig::default())
            .unwrap()
            .grammar;
        let found = words(&grammar.words_up_to(2));

        assert_eq!(found, vec!["", "(", "((", "()"]);
    }

    #[test]
    fn test_derives() {
        let config = SynthesisConfig::with_acceptance(Acceptance::Direct);
        let grammar = convert(&dyck(), &config).unwrap().grammar;
        let pda = dyck();

        assert!(grammar.derives(&pda.parse_word("(()())").unwrap()));
        assert!(!grammar.derives(&pda.parse_word("(()").unwrap()));
        assert!(grammar.derives(&[]));
    }
}
