//! Automaton definition files.
//!
//! A definition is a JSON document describing one automaton:
//!
//! ```text
//! {
//!   "name": "anbn",
//!   "states": ["q0", "q1", "q2"],
//!   "initial": "q0",
//!   "finals": ["q2"],
//!   "input_alphabet": ["a", "b"],
//!   "stack_alphabet": ["z", "0"],
//!   "stack_bottom": "z",
//!   "transitions": [
//!     { "source": "q0", "destination": "q0", "input": "a", "stackRead": "z", "stackWrite": "0z" }
//!   ]
//! }
//! ```
//!
//! Epsilon may be written as a missing field, `null`, `""` or `"λ"`.
//! `stackWrite` is either a list of symbols (top-first) or text split by
//! a longest-first split against the stack alphabet.
//!
//! Files ending in `.xml` use the `<Automata>` element layout of the desktop
//! editor instead (see [`DefinitionFormat`]).

mod xml;

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::automaton::{PushdownAutomaton, StackWord};
use crate::error::{PdaResult, StructuralError};
use crate::symbol::{parse_optional, State, Symbol};

/// Serialized form of one transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDefinition {
    pub source: State,

    #[serde(alias = "target")]
    pub destination: State,

    #[serde(
        default,
        deserialize_with = "optional_symbol",
        skip_serializing_if = "Option::is_none"
    )]
    pub input: Option<Symbol>,

    #[serde(
        rename = "stackRead",
        alias = "stack_read",
        alias = "pop",
        default,
        deserialize_with = "optional_symbol",
        skip_serializing_if = "Option::is_none"
    )]
    pub stack_read: Option<Symbol>,

    #[serde(
        rename = "stackWrite",
        alias = "stack_write",
        alias = "push",
        default,
        deserialize_with = "stack_word"
    )]
    pub stack_write: StackWord,
}

/// Serialized form of a whole automaton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub states: Vec<State>,

    pub initial: Option<State>,

    #[serde(default)]
    pub finals: Vec<State>,

    #[serde(default)]
    pub input_alphabet: Vec<Symbol>,

    #[serde(default)]
    pub stack_alphabet: Vec<Symbol>,

    #[serde(alias = "tail")]
    pub stack_bottom: Option<Symbol>,

    #[serde(default)]
    pub transitions: Vec<TransitionDefinition>,
}

fn optional_symbol<'de, D>(deserializer: D) -> Result<Option<Symbol>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_optional))
}

fn stack_word<'de, D>(deserializer: D) -> Result<StackWord, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<StackWord> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}

/// On-disk encoding of a definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DefinitionFormat {
    #[default]
    Json,
    Xml,
}

impl DefinitionFormat {
    /// Pick the format from the file extension: `.xml` is XML, anything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xml") => DefinitionFormat::Xml,
            _ => DefinitionFormat::Json,
        }
    }
}

impl AutomatonDefinition {
    /// Parse a definition in the given format.
    pub fn parse(text: &str, format: DefinitionFormat) -> PdaResult<Self> {
        match format {
            DefinitionFormat::Json => Self::from_json(text),
            DefinitionFormat::Xml => Self::from_xml(text),
        }
    }

    /// Render the definition in the given format.
    pub fn render(&self, format: DefinitionFormat) -> PdaResult<String> {
        match format {
            DefinitionFormat::Json => self.to_json(),
            DefinitionFormat::Xml => self.to_xml(),
        }
    }

    /// Parse a definition from the `<Automata>` XML layout.
    pub fn from_xml(text: &str) -> PdaResult<Self> {
        xml::parse(text)
    }

    /// Render the definition in the `<Automata>` XML layout.
    pub fn to_xml(&self) -> PdaResult<String> {
        xml::render(self)
    }

    /// Parse a definition from JSON text.
    pub fn from_json(text: &str) -> PdaResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render the definition as pretty-printed JSON.
    pub fn to_json(&self) -> PdaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the definition into an automaton.
    pub fn into_automaton(self) -> Result<PushdownAutomaton, StructuralError> {
        let mut builder = PushdownAutomaton::builder()
            .states(self.states)
            .input_alphabet(self.input_alphabet)
            .stack_alphabet(self.stack_alphabet)
            .finals(self.finals);
        if let Some(initial) = self.initial {
            builder = builder.initial(initial);
        }
        if let Some(bottom) = self.stack_bottom {
            builder = builder.stack_bottom(bottom);
        }
        for t in self.transitions {
            builder =
                builder.transition_word(t.source, t.destination, t.input, t.stack_read, t.stack_write);
        }
        builder.build()
    }

    /// Canonical definition of `automaton` (push strings as symbol lists).
    pub fn from_automaton(automaton: &PushdownAutomaton, name: Option<String>) -> Self {
        Self {
            name,
            states: automaton.states().iter().cloned().collect(),
            initial: Some(automaton.initial().clone()),
            finals: automaton.finals().iter().cloned().collect(),
            input_alphabet: automaton.input_alphabet().iter().cloned().collect(),
            stack_alphabet: automaton.stack_alphabet().iter().cloned().collect(),
            stack_bottom: Some(automaton.stack_bottom().clone()),
            transitions: automaton
                .transitions()
                .iter()
                .map(|t| TransitionDefinition {
                    source: t.source.clone(),
                    destination: t.target.clone(),
                    input: t.input.clone(),
                    stack_read: t.pop.clone(),
                    stack_write: StackWord::Symbols(t.push.clone()),
                })
                .collect(),
        }
    }
}

/// Load and validate the automaton stored at `path`.
///
/// The format follows the file extension (see [`DefinitionFormat::from_path`]).
pub fn load_definition(path: impl AsRef<Path>) -> PdaResult<PushdownAutomaton> {
    let path = path.as_ref();
    let format = DefinitionFormat::from_path(path);
    let text = std::fs::read_to_string(path)?;
    let definition = AutomatonDefinition::parse(&text, format)?;
    debug!(
        path = %path.display(),
        ?format,
        states = definition.states.len(),
        transitions = definition.transitions.len(),
        "definition_parsed"
    );
    Ok(definition.into_automaton()?)
}

/// Write `automaton` to `path` in canonical form.
pub fn save_definition(
    path: impl AsRef<Path>,
    automaton: &PushdownAutomaton,
    name: Option<String>,
) -> PdaResult<()> {
    let path = path.as_ref();
    let format = DefinitionFormat::from_path(path);
    let text = AutomatonDefinition::from_automaton(automaton, name).render(format)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, text)?;
    info!(path = %path.display(), ?format, "definition_saved");
    Ok(())
}
