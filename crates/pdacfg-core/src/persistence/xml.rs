//! XML layout of definition files.
//!
//! ```text
//! <Automata type="PDA">
//!   <Alphabets>
//!     <Input_alphabets numberOfInputAlphabets="2">
//!       <alphabet letter="a"/>
//!       <alphabet letter="b"/>
//!     </Input_alphabets>
//!     <Stack_alphabets numberOfStackAlphabets="2">
//!       <alphabet letter="z"/>
//!       <alphabet letter="0"/>
//!       <tail letter="z"/>
//!     </Stack_alphabets>
//!   </Alphabets>
//!   <States numberOfStates="2">
//!     <state name="q0" positionX="0" positionY="0"/>
//!     <state name="q1" positionX="0" positionY="0"/>
//!     <initialState name="q0"/>
//!     <FinalStates numberOfFinalStates="1">
//!       <finalState name="q1"/>
//!     </FinalStates>
//!   </States>
//!   <Transitions numberOfTrans="1">
//!     <transition name="tr1" source="q0" destination="q1" input="a" stackRead="z" stackWrite="0z"/>
//!   </Transitions>
//! </Automata>
//! ```
//!
//! Counts and positions are written for compatibility and ignored on read.
//! An empty `input` or `stackRead` means epsilon; an empty push is written
//! as `λ`.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use super::{AutomatonDefinition, TransitionDefinition};
use crate::automaton::StackWord;
use crate::error::{AlphabetKind, PdaError, PdaResult};
use crate::symbol::{parse_optional, State, Symbol, EPSILON};

const ROOT: &str = "Automata";

/// Parse a definition from the `<Automata>` layout.
pub(super) fn parse(text: &str) -> PdaResult<AutomatonDefinition> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut layout = LayoutReader::default();
    loop {
        match reader.read_event()? {
            Event::Start(element) => layout.element(&element, true)?,
            Event::Empty(element) => layout.element(&element, false)?,
            Event::End(element) => {
                if matches!(
                    element.name().as_ref(),
                    b"Input_alphabets" | b"Stack_alphabets"
                ) {
                    layout.section = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    layout.finish()
}

#[derive(Default)]
struct LayoutReader {
    definition: AutomatonDefinition,
    section: Option<AlphabetKind>,
    seen_root: bool,
}

impl LayoutReader {
    fn element(&mut self, element: &BytesStart<'_>, has_children: bool) -> PdaResult<()> {
        let tag = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        if !self.seen_root {
            if tag != ROOT {
                return Err(PdaError::XmlLayout(format!(
                    "expected <{ROOT}> root, found <{tag}>"
                )));
            }
            if let Some(kind) = attribute(element, "type")? {
                if kind != "PDA" {
                    return Err(PdaError::XmlLayout(format!(
                        "automaton type {kind:?} is not PDA"
                    )));
                }
            }
            self.definition.name = attribute(element, "name")?;
            self.seen_root = true;
            return Ok(());
        }

        let definition = &mut self.definition;
        match tag.as_str() {
            "Input_alphabets" if has_children => self.section = Some(AlphabetKind::Input),
            "Stack_alphabets" if has_children => self.section = Some(AlphabetKind::Stack),
            "alphabet" => {
                let letter = Symbol::new(required(element, &tag, "letter")?);
                match self.section {
                    Some(AlphabetKind::Input) => definition.input_alphabet.push(letter),
                    Some(AlphabetKind::Stack) => definition.stack_alphabet.push(letter),
                    None => {
                        return Err(PdaError::XmlLayout(
                            "<alphabet> outside an alphabet list".to_string(),
                        ))
                    }
                }
            }
            "tail" => definition.stack_bottom = Some(Symbol::new(required(element, &tag, "letter")?)),
            "state" => definition.states.push(State::new(required(element, &tag, "name")?)),
            "initialState" => definition.initial = Some(State::new(required(element, &tag, "name")?)),
            "finalState" => definition.finals.push(State::new(required(element, &tag, "name")?)),
            "transition" => {
                let input = attribute(element, "input")?;
                let stack_read = attribute(element, "stackRead")?;
                let stack_write = attribute(element, "stackWrite")?;
                definition.transitions.push(TransitionDefinition {
                    source: State::new(required(element, &tag, "source")?),
                    destination: State::new(required(element, &tag, "destination")?),
                    input: input.as_deref().and_then(parse_optional),
                    stack_read: stack_read.as_deref().and_then(parse_optional),
                    stack_write: stack_write.map(StackWord::Text).unwrap_or_default(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> PdaResult<AutomatonDefinition> {
        if !self.seen_root {
            return Err(PdaError::XmlLayout(format!("missing <{ROOT}> root")));
        }
        let mut definition = self.definition;
        // The tail is listed apart from the stack alphabet but belongs to it.
        if let Some(bottom) = &definition.stack_bottom {
            if !definition.stack_alphabet.contains(bottom) {
                definition.stack_alphabet.push(bottom.clone());
            }
        }
        Ok(definition)
    }
}

fn attribute(element: &BytesStart<'_>, key: &str) -> PdaResult<Option<String>> {
    match element
        .try_get_attribute(key)
        .map_err(quick_xml::Error::from)?
    {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn required(element: &BytesStart<'_>, tag: &str, key: &str) -> PdaResult<String> {
    attribute(element, key)?
        .ok_or_else(|| PdaError::XmlLayout(format!("<{tag}> is missing the {key} attribute")))
}

/// Render a definition in the `<Automata>` layout.
pub(super) fn render(definition: &AutomatonDefinition) -> PdaResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

    let mut root = BytesStart::new(ROOT);
    root.push_attribute(("type", "PDA"));
    if let Some(name) = &definition.name {
        root.push_attribute(("name", name.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    open(&mut writer, "Alphabets", &[])?;
    let count = definition.input_alphabet.len().to_string();
    open(&mut writer, "Input_alphabets", &[("numberOfInputAlphabets", count.as_str())])?;
    for symbol in &definition.input_alphabet {
        empty(&mut writer, "alphabet", &[("letter", symbol.name())])?;
    }
    close(&mut writer, "Input_alphabets")?;
    let count = definition.stack_alphabet.len().to_string();
    open(&mut writer, "Stack_alphabets", &[("numberOfStackAlphabets", count.as_str())])?;
    for symbol in &definition.stack_alphabet {
        empty(&mut writer, "alphabet", &[("letter", symbol.name())])?;
    }
    if let Some(bottom) = &definition.stack_bottom {
        empty(&mut writer, "tail", &[("letter", bottom.name())])?;
    }
    close(&mut writer, "Stack_alphabets")?;
    close(&mut writer, "Alphabets")?;

    let count = definition.states.len().to_string();
    open(&mut writer, "States", &[("numberOfStates", count.as_str())])?;
    for state in &definition.states {
        empty(
            &mut writer,
            "state",
            &[("name", state.name()), ("positionX", "0"), ("positionY", "0")],
        )?;
    }
    if let Some(initial) = &definition.initial {
        empty(&mut writer, "initialState", &[("name", initial.name())])?;
    }
    let count = definition.finals.len().to_string();
    open(&mut writer, "FinalStates", &[("numberOfFinalStates", count.as_str())])?;
    for state in &definition.finals {
        empty(&mut writer, "finalState", &[("name", state.name())])?;
    }
    close(&mut writer, "FinalStates")?;
    close(&mut writer, "States")?;

    let count = definition.transitions.len().to_string();
    open(&mut writer, "Transitions", &[("numberOfTrans", count.as_str())])?;
    for (index, t) in definition.transitions.iter().enumerate() {
        let name = format!("tr{}", index + 1);
        let push = push_text(&t.stack_write);
        empty(
            &mut writer,
            "transition",
            &[
                ("name", name.as_str()),
                ("source", t.source.name()),
                ("destination", t.destination.name()),
                ("input", t.input.as_ref().map(Symbol::name).unwrap_or("")),
                ("stackRead", t.stack_read.as_ref().map(Symbol::name).unwrap_or("")),
                ("stackWrite", push.as_str()),
            ],
        )?;
    }
    close(&mut writer, "Transitions")?;
    close(&mut writer, ROOT)?;

    let mut text = String::from_utf8(writer.into_inner())
        .map_err(|err| PdaError::XmlLayout(err.to_string()))?;
    text.push('\n');
    Ok(text)
}

/// Push string as attribute text; multi-character symbols are space-separated.
fn push_text(word: &StackWord) -> String {
    match word {
        StackWord::Text(text) if text.trim().is_empty() => EPSILON.to_string(),
        StackWord::Text(text) => text.clone(),
        StackWord::Symbols(symbols) if symbols.is_empty() => EPSILON.to_string(),
        StackWord::Symbols(symbols) => {
            let separator = if symbols.iter().all(|s| s.name().chars().count() == 1) {
                ""
            } else {
                " "
            };
            symbols
                .iter()
                .map(Symbol::name)
                .collect::<Vec<_>>()
                .join(separator)
        }
    }
}

fn open(writer: &mut Writer<Vec<u8>>, tag: &str, attributes: &[(&str, &str)]) -> PdaResult<()> {
    let element = BytesStart::new(tag).with_attributes(attributes.iter().copied());
    writer.write_event(Event::Start(element))?;
    Ok(())
}

fn empty(writer: &mut Writer<Vec<u8>>, tag: &str, attributes: &[(&str, &str)]) -> PdaResult<()> {
    let element = BytesStart::new(tag).with_attributes(attributes.iter().copied());
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

fn close(writer: &mut Writer<Vec<u8>>, tag: &str) -> PdaResult<()> {
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
