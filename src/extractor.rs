//! EventSource class discovery and event extraction
//!
//! The [`EventSourceExtractor`] trait is the seam between the documentor loop
//! and whatever understands the source language. [`CSharpExtractor`] is the
//! default: a convention scanner for C# classes deriving from `EventSource`.
//!
//! It is deliberately shallow. Comments are blanked, then regexes locate the
//! class header and each `[Event(...)]` attribute on a copy whose literal
//! contents are masked out, and a bracket matcher finds where each construct
//! ends. Values are read back from the unmasked text at the same offsets.

use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{DocumentorError, Result};
use crate::record::EventRecord;

/// `class Name : Base` (generic parameters allowed)
static CLASS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bclass\s+([A-Za-z_]\w*)(?:\s*<[^>{]*>)?\s*:\s*([\w.]+)").unwrap()
});

/// `[EventSource(` or `[System.Diagnostics.Tracing.EventSourceAttribute(`
static EVENT_SOURCE_ATTR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*(?:[\w.]+\.)?EventSource(?:Attribute)?\s*\(").unwrap());

/// `[` opening an attribute section inside a class body
static ATTR_SECTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[;{}\]])\s*\[").unwrap());

/// `Event(` or `method: EventAttribute(` as one attribute of a section
static EVENT_ATTR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[A-Za-z_]\w*\s*:\s*)?(?:[\w.]+\.)?Event(?:Attribute)?\s*\(").unwrap()
});

/// Attributes and modifiers allowed between an attribute and `class`
static CLASS_PREFIX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\s|\[[^\]]*\]|\b(?:public|internal|private|protected|sealed|static|partial|abstract|unsafe|new)\b)*$",
    )
    .unwrap()
});

/// Method header following an `[Event]` attribute, up to the opening paren
static METHOD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\s|\[[^\]]*\])*(?:(?:public|internal|private|protected|static|unsafe|new|virtual|override|sealed|extern|partial)\s+)*[\w.<>\[\],?]+\s+([A-Za-z_]\w*)\s*\(",
    )
    .unwrap()
});

/// `const int Name = value;`
static CONST_INT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bconst\s+(?:int|Int32|System\.Int32)\s+([A-Za-z_]\w*)\s*=\s*([^;]+);").unwrap()
});

/// `Key = value` (but not `Key == value`)
static NAMED_ARG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*([A-Za-z_]\w*)\s*=([^=].*)$").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A located event-logging class
#[derive(Debug, Clone, PartialEq)]
pub struct EventSourceClass {
    /// File the class was found in
    pub path: PathBuf,
    /// Class identifier (`MyEventSource`)
    pub identifier: String,
    /// `Name` from `[EventSource(Name = "...")]`, if present
    pub declared_name: Option<String>,
    /// Class body between the braces, comments blanked
    pub body: String,
    /// `const int` fields visible in the file, for symbolic event ids
    pub constants: HashMap<String, i32>,
}

/// Source-language collaborator used by the documentor
pub trait EventSourceExtractor {
    /// Locate the event-logging class declared in `path`, if any
    fn find_event_source_class(&self, path: &Path) -> Result<Option<EventSourceClass>>;

    /// Name used for the output file
    fn event_source_name(&self, class: &EventSourceClass) -> String;

    /// Every event declared by the class, in discovery order
    fn event_records(&self, class: &EventSourceClass) -> Result<Vec<EventRecord>>;
}

/// Convention scanner for C# `EventSource` classes
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharpExtractor;

impl CSharpExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Same as [`EventSourceExtractor::find_event_source_class`] on in-memory text
    pub fn find_in_source(&self, path: &Path, source: &str) -> Option<EventSourceClass> {
        let code = strip_comments(source);
        let masked = mask_literals(&code);
        let bytes = masked.as_bytes();

        for caps in CLASS_PATTERN.captures_iter(&masked) {
            let base = &caps[2];
            if last_segment(base) != "EventSource" {
                continue;
            }

            let header = caps.get(0)?;
            let Some(open) = masked[header.end()..].find('{').map(|p| header.end() + p) else {
                continue;
            };
            let Some(close) = matching_close(bytes, open) else {
                continue;
            };

            let identifier = caps[1].to_string();
            debug!(class = %identifier, path = %path.display(), "Found EventSource class");

            return Some(EventSourceClass {
                path: path.to_path_buf(),
                declared_name: declared_name(&code, &masked, header.start()),
                identifier,
                body: code[open + 1..close].to_string(),
                constants: const_ints(&code),
            });
        }

        None
    }

    /// Parse every `Event` attribute in a class body
    ///
    /// The attribute may share its section with others, as in
    /// `[Obsolete, Event(1)]`.
    pub fn records_in_body(&self, class: &EventSourceClass) -> Result<Vec<EventRecord>> {
        let masked = mask_literals(&class.body);
        let bytes = masked.as_bytes();
        let mut records = Vec::new();
        let mut scanned_to = 0;

        for section in ATTR_SECTION_PATTERN.find_iter(&masked) {
            let section_open = section.end() - 1;
            if section_open < scanned_to {
                continue;
            }
            let Some(section_close) = matching_close(bytes, section_open) else {
                continue;
            };
            scanned_to = section_close;

            let mut item_at = section_open + 1;
            for item in split_top_level(&masked[section_open + 1..section_close], b',', false) {
                let start = item_at;
                item_at += item.len() + 1;

                let Some(m) = EVENT_ATTR_PATTERN.find(item) else {
                    continue;
                };
                let args_open = start + m.end() - 1;
                let args_close = matching_close(bytes, args_open).ok_or_else(|| {
                    DocumentorError::extraction(&class.path, "unterminated [Event(...)] attribute")
                })?;

                let record =
                    self.event_at(class, &masked, args_open + 1..args_close, section_close)?;
                debug!(id = record.event_id, name = %record.event_name, "Extracted event");
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Record for the `Event` arguments at `args`, named by the method that
    /// follows the section closing at `section_close`
    fn event_at(
        &self,
        class: &EventSourceClass,
        masked: &str,
        args: Range<usize>,
        section_close: usize,
    ) -> Result<EventRecord> {
        let body = class.body.as_str();
        let mut record = event_attribute(class, &body[args])?;

        let rest = &body[section_close + 1..];
        let masked_rest = &masked[section_close + 1..];
        let caps = METHOD_PATTERN.captures(masked_rest).ok_or_else(|| {
            DocumentorError::extraction(
                &class.path,
                format!("no method follows [Event({})]", record.event_id),
            )
        })?;
        record.event_name = caps[1].to_string();

        let params_open = caps.get(0).map(|c| c.end() - 1).unwrap_or_default();
        let params_close = matching_close(masked_rest.as_bytes(), params_open).ok_or_else(|| {
            DocumentorError::extraction(
                &class.path,
                format!("unterminated parameter list on '{}'", record.event_name),
            )
        })?;
        record.parameters = parameters(&rest[params_open + 1..params_close]);

        Ok(record)
    }
}

impl EventSourceExtractor for CSharpExtractor {
    fn find_event_source_class(&self, path: &Path) -> Result<Option<EventSourceClass>> {
        let source = std::fs::read_to_string(path).map_err(|source| DocumentorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.find_in_source(path, &source))
    }

    fn event_source_name(&self, class: &EventSourceClass) -> String {
        class
            .declared_name
            .clone()
            .unwrap_or_else(|| class.identifier.clone())
    }

    fn event_records(&self, class: &EventSourceClass) -> Result<Vec<EventRecord>> {
        self.records_in_body(class)
    }
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// `Name` of an `[EventSource]` attribute attached to the class at `class_at`
fn declared_name(code: &str, masked: &str, class_at: usize) -> Option<String> {
    let bytes = masked.as_bytes();

    let m = EVENT_SOURCE_ATTR_PATTERN
        .find_iter(&masked[..class_at])
        .last()?;
    let attr_close = matching_close(bytes, m.start())?;
    if attr_close >= class_at || !CLASS_PREFIX_PATTERN.is_match(&masked[attr_close + 1..class_at]) {
        return None;
    }

    let args_open = m.end() - 1;
    let args_close = matching_close(bytes, args_open)?;
    split_top_level(&code[args_open + 1..args_close], b',', false)
        .into_iter()
        .filter_map(named_argument)
        .find(|(key, _)| *key == "Name")
        .map(|(_, value)| string_value(value))
}

/// Build a record from the argument list of `[Event(...)]`
fn event_attribute(class: &EventSourceClass, args: &str) -> Result<EventRecord> {
    let mut event_id = None;
    let mut record = EventRecord::new(0, "");

    for arg in split_top_level(args, b',', false) {
        if arg.trim().is_empty() {
            continue;
        }

        let Some((key, value)) = named_argument(arg) else {
            if event_id.is_none() {
                event_id = Some(resolve_event_id(class, arg.trim())?);
            }
            continue;
        };

        match key {
            "Level" => record.level = last_segment(value).to_string(),
            "Keywords" => record.keywords = enum_members(value),
            "Opcode" => record.opcode = last_segment(value).to_string(),
            "Task" => record.task = last_segment(value).to_string(),
            "Channel" => record.channel = last_segment(value).to_string(),
            "Version" => record.version = value.trim().to_string(),
            "Message" => record.message = string_value(value),
            _ => {}
        }
    }

    record.event_id = event_id.ok_or_else(|| {
        DocumentorError::extraction(&class.path, format!("[Event({})] has no event id", args.trim()))
    })?;
    Ok(record)
}

fn resolve_event_id(class: &EventSourceClass, arg: &str) -> Result<i32> {
    if let Some(id) = parse_int_literal(arg) {
        return Ok(id);
    }
    class
        .constants
        .get(last_segment(arg))
        .copied()
        .ok_or_else(|| {
            DocumentorError::extraction(&class.path, format!("unresolved event id '{}'", arg))
        })
}

fn named_argument(arg: &str) -> Option<(&str, &str)> {
    let caps = NAMED_ARG_PATTERN.captures(arg)?;
    let key = caps.get(1)?.as_str();
    let value = caps.get(2)?.as_str().trim();
    Some((key, value))
}

fn const_ints(code: &str) -> HashMap<String, i32> {
    CONST_INT_PATTERN
        .captures_iter(code)
        .filter_map(|caps| Some((caps[1].to_string(), parse_int_literal(&caps[2])?)))
        .collect()
}

/// Normalised `type name` declarations joined with `"; "`
fn parameters(list: &str) -> String {
    split_top_level(list, b',', true)
        .into_iter()
        .filter_map(|param| {
            let decl = split_top_level(param, b'=', true).into_iter().next()?;
            let decl = strip_leading_attributes(decl.trim());
            let decl = WHITESPACE.replace_all(decl, " ");
            (!decl.is_empty()).then(|| decl.into_owned())
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn strip_leading_attributes(mut decl: &str) -> &str {
    while decl.starts_with('[') {
        match matching_close(decl.as_bytes(), 0) {
            Some(close) => decl = decl[close + 1..].trim_start(),
            None => break,
        }
    }
    decl
}

// ============================================================================
// VALUES
// ============================================================================

fn last_segment(value: &str) -> &str {
    let value = value.trim();
    value.rsplit('.').next().unwrap_or(value).trim()
}

/// `Keywords.A | Keywords.B` -> `A | B`
fn enum_members(value: &str) -> String {
    value
        .split('|')
        .map(last_segment)
        .filter(|m| !m.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Unescaped text of a literal or a `+` chain of literals, raw text otherwise
fn string_value(value: &str) -> String {
    let pieces: Option<Vec<String>> = split_top_level(value, b'+', false)
        .into_iter()
        .map(unescape_literal)
        .collect();
    pieces
        .map(|p| p.concat())
        .unwrap_or_else(|| value.trim().to_string())
}

fn unescape_literal(literal: &str) -> Option<String> {
    let literal = literal.trim();

    if let Some(inner) = literal
        .strip_prefix("@\"")
        .or_else(|| literal.strip_prefix("$@\""))
        .or_else(|| literal.strip_prefix("@$\""))
    {
        return Some(inner.strip_suffix('"')?.replace("\"\"", "\""));
    }

    let inner = literal
        .strip_prefix('"')
        .or_else(|| literal.strip_prefix("$\""))?
        .strip_suffix('"')?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Some(out)
}

fn parse_int_literal(text: &str) -> Option<i32> {
    let text: String = text.trim().chars().filter(|c| *c != '_').collect();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i32::from_str_radix(hex, 16).ok();
    }
    text.parse().ok()
}

// ============================================================================
// LEXICAL HELPERS
// ============================================================================

/// Blank out `//` and `/* */` comments, keeping byte offsets and newlines
fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1).copied()) {
            (b'/', Some(b'/')) => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    out.push(b' ');
                    i += 1;
                }
            }
            (b'/', Some(b'*')) => {
                let end = bytes[i + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map(|p| i + 2 + p + 2)
                    .unwrap_or(bytes.len());
                out.extend(
                    bytes[i..end]
                        .iter()
                        .map(|&b| if b == b'\n' { b'\n' } else { b' ' }),
                );
                i = end;
            }
            (b'"' | b'\'', _) => {
                let end = skip_literal(bytes, i);
                out.extend_from_slice(&bytes[i..end]);
                i = end;
            }
            (b, _) => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Replace literal contents with spaces, keeping quotes and offsets
fn mask_literals(code: &str) -> String {
    let bytes = code.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;

    while i < bytes.len() {
        if !matches!(bytes[i], b'"' | b'\'') {
            i += 1;
            continue;
        }
        let quote = bytes[i];
        let end = skip_literal(bytes, i);
        for j in i + 1..end {
            let terminator = j + 1 == end && (bytes[j] == quote || bytes[j] == b'\n');
            if !terminator {
                out[j] = b' ';
            }
        }
        i = end;
    }

    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Index just past the string or char literal opening at `start`
fn skip_literal(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let before = &bytes[..start];
    let verbatim = quote == b'"' && (before.ends_with(b"@") || before.ends_with(b"@$"));

    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' if verbatim => {
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 2;
                    continue;
                }
                return i + 1;
            }
            b'\\' if !verbatim => {
                i += 2;
                continue;
            }
            b'\n' if !verbatim => return i + 1,
            b if b == quote => return i + 1,
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

/// Index of the bracket closing the one at `open_at`
fn matching_close(bytes: &[u8], open_at: usize) -> Option<usize> {
    let open = *bytes.get(open_at)?;
    let close = match open {
        b'(' => b')',
        b'[' => b']',
        b'{' => b'}',
        _ => return None,
    };

    let mut depth = 0usize;
    let mut i = open_at;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_literal(bytes, i);
                continue;
            }
            b if b == open => depth += 1,
            b if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split on `separator` outside brackets and literals
fn split_top_level(text: &str, separator: u8, angle_brackets: bool) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_literal(bytes, i);
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'<' if angle_brackets => depth += 1,
            b'>' if angle_brackets => depth -= 1,
            b if b == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&text[start..]);
    parts
}
