//! Line grammar for the bracketed-timestamp application log convention.
//!
//! Structured lines look like:
//!
//! ```text
//! [2021-05-01T10:00:00.123456+00:00] web.INFO: boot complete {"user":1} []
//!  ^timestamp                         ^facility ^message      ^context  ^extra
//! ```
//!
//! The pattern is anchored over the whole line and both trailing JSON tokens
//! are mandatory. Object tokens hold no whitespace, so a payload written with
//! spaces makes the whole line a mismatch instead of being cut apart. A line
//! that does not match yields no parts at all; there is no partial extraction.

use std::sync::LazyLock;

use regex::{Captures, Regex};

const TIME_EXPR: &str =
    r"[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]{6})?(\+|-)([0-9]{4}|[0-9]{2}:[0-9]{2})";
const FACILITY_EXPR: &str = r"[A-Za-z0-9_-]+";
const LEVEL_EXPR: &str = r"[A-Za-z0-9_]+";
const MESSAGE_EXPR: &str = r".*";
const JSON_EXPR: &str = r"\{\S*?\}|\[\]";

static LINE_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\[({TIME_EXPR})\] ({FACILITY_EXPR})\.({LEVEL_EXPR}): ({MESSAGE_EXPR}) ({JSON_EXPR}) ({JSON_EXPR})$"
    ))
    .expect("line grammar pattern is valid")
});

/// A named part of a structured line.
///
/// Each part sits at a fixed capture group of the grammar; groups 2–4 belong
/// to the timestamp's fraction and offset and are not parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Timestamp,
    Facility,
    Level,
    Message,
    Context,
    Extra,
}

impl Part {
    pub const ALL: [Self; 6] = [
        Self::Timestamp,
        Self::Facility,
        Self::Level,
        Self::Message,
        Self::Context,
        Self::Extra,
    ];

    /// Capture group index of this part.
    pub const fn group(self) -> usize {
        match self {
            Self::Timestamp => 1,
            Self::Facility => 5,
            Self::Level => 6,
            Self::Message => 7,
            Self::Context => 8,
            Self::Extra => 9,
        }
    }

    /// Inverse of [`group`](Self::group).
    pub const fn from_group(group: usize) -> Option<Self> {
        match group {
            1 => Some(Self::Timestamp),
            5 => Some(Self::Facility),
            6 => Some(Self::Level),
            7 => Some(Self::Message),
            8 => Some(Self::Context),
            9 => Some(Self::Extra),
            _ => None,
        }
    }
}

/// Parts recovered from one structured line, borrowed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLineParts<'a> {
    pub timestamp: &'a str,
    pub facility: &'a str,
    pub level: &'a str,
    pub message: &'a str,
    pub context: &'a str,
    pub extra: &'a str,
}

impl<'a> ParsedLineParts<'a> {
    fn from_captures(caps: &Captures<'a>) -> Self {
        let group = |part: Part| caps.get(part.group()).map_or("", |m| m.as_str());
        Self {
            timestamp: group(Part::Timestamp),
            facility: group(Part::Facility),
            level: group(Part::Level),
            message: group(Part::Message),
            context: group(Part::Context),
            extra: group(Part::Extra),
        }
    }

    pub const fn get(&self, part: Part) -> &'a str {
        match part {
            Part::Timestamp => self.timestamp,
            Part::Facility => self.facility,
            Part::Level => self.level,
            Part::Message => self.message,
            Part::Context => self.context,
            Part::Extra => self.extra,
        }
    }
}

/// Match `line` against the grammar.
///
/// Returns `None` when the line does not follow the convention; callers treat
/// that as "no structured fields", never as an error.
pub fn parse(line: &str) -> Option<ParsedLineParts<'_>> {
    LINE_GRAMMAR
        .captures(line)
        .map(|caps| ParsedLineParts::from_captures(&caps))
}

/// Look up a part of `line` by raw capture group index.
///
/// Returns `""` when the line does not match or when `group` is not one of
/// the part groups listed on [`Part`].
pub fn capture(line: &str, group: usize) -> &str {
    match (Part::from_group(group), parse(line)) {
        (Some(part), Some(parts)) => parts.get(part),
        _ => "",
    }
}
