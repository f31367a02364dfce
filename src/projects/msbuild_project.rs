use crate::projects::{ProjectError, ProjectFormat, VersionField};
use anyhow::{Result, anyhow};
use log::debug;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use std::ops::Range;

const VERSION_TAGS: [&str; 3] = ["Version", "AssemblyVersion", "FileVersion"];
const PROPERTY_GROUP: &[u8] = b"PropertyGroup";

// Depth of a `<PropertyGroup>` directly under the root `<Project>`, and of its children.
const GROUP_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;

/// An MSBuild project (`.csproj`, `.fsproj`, `.vbproj`, `.props`) held as text.
///
/// The document is tokenized to find the version elements of top-level property
/// groups. Only their values are replaced on render, everything else is written
/// back byte for byte.
pub struct MsBuildProject {
    contents: String,
    slots: Vec<Slot>,
}

struct Slot {
    tag: String,
    range: Range<usize>,
    value: String,
}

/// A version element whose end tag has not been read yet.
struct OpenElement {
    tag: &'static str,
    text: Option<Range<usize>>,
    mixed: bool,
}

impl OpenElement {
    fn into_slot(self, contents: &str) -> Option<Slot> {
        if self.mixed {
            debug!("Skipping <{}> with mixed content", self.tag);
            return None;
        }
        let range = self.text?;
        let raw = &contents[range.clone()];
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let start = range.start + (raw.len() - raw.trim_start().len());
        Some(Slot {
            tag: self.tag.to_string(),
            range: start..start + trimmed.len(),
            value: trimmed.to_string(),
        })
    }
}

fn version_tag(name: &[u8]) -> Option<&'static str> {
    VERSION_TAGS.iter().copied().find(|tag| tag.as_bytes() == name)
}

fn position(reader: &Reader<&[u8]>) -> Result<usize> {
    Ok(usize::try_from(reader.buffer_position())?)
}

/// Byte range of a text node that starts at or after `from`.
fn text_range(contents: &str, from: usize, text: &[u8]) -> Result<Range<usize>> {
    let text = std::str::from_utf8(text)?;
    let offset = contents
        .get(from..)
        .and_then(|rest| rest.find(text))
        .ok_or_else(|| anyhow!("Text node not found at byte {}", from))?;
    Ok(from + offset..from + offset + text.len())
}

impl ProjectFormat for MsBuildProject {
    fn parse(contents: &str) -> Result<Self> {
        let mut reader = Reader::from_str(contents);
        let mut depth = 0usize;
        let mut in_group = false;
        let mut open: Option<OpenElement> = None;
        let mut slots = Vec::new();

        loop {
            let start = position(&reader)?;
            match reader.read_event()? {
                Event::Start(element) => {
                    depth += 1;
                    let name = element.name();
                    if let Some(current) = open.as_mut() {
                        current.mixed = true;
                    } else if depth == GROUP_DEPTH && name.as_ref() == PROPERTY_GROUP {
                        in_group = true;
                    } else if depth == FIELD_DEPTH && in_group {
                        open = version_tag(name.as_ref()).map(|tag| OpenElement {
                            tag,
                            text: None,
                            mixed: false,
                        });
                    }
                }
                Event::End(_) => {
                    if depth == FIELD_DEPTH {
                        if let Some(slot) = open.take().and_then(|current| current.into_slot(contents)) {
                            slots.push(slot);
                        }
                    } else if depth == GROUP_DEPTH {
                        in_group = false;
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Text(text) => {
                    if let Some(current) = open.as_mut() {
                        if current.text.is_some() {
                            current.mixed = true;
                        } else {
                            current.text = Some(text_range(contents, start, &text)?);
                        }
                    }
                }
                Event::Empty(_) | Event::CData(_) | Event::Comment(_) | Event::PI(_) => {
                    if let Some(current) = open.as_mut() {
                        current.mixed = true;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        debug!("Found {} version element(s)", slots.len());
        Ok(MsBuildProject {
            contents: contents.to_string(),
            slots,
        })
    }

    fn version_fields(&self) -> Vec<VersionField> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| VersionField {
                tag: slot.tag.clone(),
                text: self.contents[slot.range.clone()].to_string(),
                index,
            })
            .collect()
    }

    fn set_field(&mut self, field: &VersionField, value: &str) -> Result<()> {
        let slot = self
            .slots
            .get_mut(field.index)
            .ok_or(ProjectError::UnknownField(field.index))?;
        slot.value = value.to_string();
        Ok(())
    }

    fn render(&self) -> Result<String> {
        let mut rendered = String::with_capacity(self.contents.len());
        let mut cursor = 0;
        for slot in &self.slots {
            rendered.push_str(&self.contents[cursor..slot.range.start]);
            rendered.push_str(&slot.value);
            cursor = slot.range.end;
        }
        rendered.push_str(&self.contents[cursor..]);
        Ok(rendered)
    }

    fn filename_match_regex() -> Result<Regex> {
        Ok(Regex::new(r"(?i)\.(?:(?:cs|fs|vb)proj|props)$")?)
    }
}
