//! npm's INI-like `.npmrc` dialect
//!
//! Two views of the same format, matching the two ways it is consumed:
//!
//! - [`parse_flat`] is the tolerant read used during feed discovery. Keys
//!   under `[section]` headers are nested in npm's dialect and therefore out
//!   of scope; anything unrecognizable is skipped.
//! - [`NpmrcDocument`] is the lossless line model used when merging
//!   credentials into an existing user config. Unrelated lines round-trip
//!   verbatim, and a line that fits no rule is a hard error because merging
//!   into a file we cannot model would risk destroying it.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::provider;

/// One classified npm registry declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NpmFeedEntry {
    /// The registry URL exactly as declared in the npmrc.
    pub registry_url: String,
    /// The NuGet v3 service index URL derived from it.
    pub index_url: String,
}

/// Best-effort parse into the top-level key/value pairs.
///
/// Garbage lines yield nothing; duplicate keys keep the last value, as npm
/// does.
pub fn parse_flat(content: &str) -> IndexMap<String, String> {
    let mut pairs = IndexMap::new();
    let mut in_section = false;
    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_section = true;
            continue;
        }
        if in_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            pairs.insert(key.trim().to_string(), unquote(value.trim()).to_string());
        }
    }
    pairs
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Extract the Azure DevOps feeds declared in npmrc text.
///
/// Keeps keys ending in `registry` whose value is an `http` URL on an ADO
/// host with the npm registry path segment, deduplicated by registry URL in
/// first-seen order. Malformed input never errors; it matches nothing.
pub fn ado_feeds_from_npmrc(content: &str) -> Vec<NpmFeedEntry> {
    let mut entries: Vec<NpmFeedEntry> = Vec::new();
    for (key, value) in parse_flat(content) {
        if !key.ends_with("registry") || !value.starts_with("http") {
            continue;
        }
        if !provider::is_ado_feed(&value) {
            continue;
        }
        let Some(index_url) = provider::npm_registry_to_index_url(&value) else {
            continue;
        };
        if entries.iter().any(|entry| entry.registry_url == value) {
            continue;
        }
        entries.push(NpmFeedEntry {
            registry_url: value,
            index_url,
        });
    }
    entries
}

/// A parsed npmrc that preserves every line for rewriting.
#[derive(Debug, Clone, Default)]
pub struct NpmrcDocument {
    lines: Vec<NpmrcLine>,
}

#[derive(Debug, Clone)]
enum NpmrcLine {
    /// Blank line or comment, kept byte-for-byte.
    Verbatim(String),
    /// `[section]` header; everything after it is section-scoped.
    Section(String),
    Pair { key: String, value: String },
}

impl NpmrcDocument {
    /// Strict parse for the merge path.
    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = Vec::new();
        for (number, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                lines.push(NpmrcLine::Verbatim(raw.to_string()));
            } else if line.starts_with('[') {
                if !line.ends_with(']') {
                    return Err(CoreError::MalformedLine {
                        line: number + 1,
                        content: raw.to_string(),
                    });
                }
                lines.push(NpmrcLine::Section(raw.to_string()));
            } else if let Some((key, value)) = line.split_once('=') {
                lines.push(NpmrcLine::Pair {
                    key: key.trim().to_string(),
                    value: value.trim().to_string(),
                });
            } else {
                return Err(CoreError::MalformedLine {
                    line: number + 1,
                    content: raw.to_string(),
                });
            }
        }
        Ok(NpmrcDocument { lines })
    }

    /// Whether a top-level key is already declared.
    pub fn contains_key(&self, key: &str) -> bool {
        self.top_level_range()
            .iter()
            .any(|line| matches!(line, NpmrcLine::Pair { key: k, .. } if k == key))
    }

    /// Append a top-level pair, before any `[section]` header.
    pub fn push_pair(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let position = self.first_section_index();
        self.lines.insert(
            position,
            NpmrcLine::Pair {
                key: key.into(),
                value: value.into(),
            },
        );
    }

    fn first_section_index(&self) -> usize {
        self.lines
            .iter()
            .position(|line| matches!(line, NpmrcLine::Section(_)))
            .unwrap_or(self.lines.len())
    }

    fn top_level_range(&self) -> &[NpmrcLine] {
        &self.lines[..self.first_section_index()]
    }

    /// Canonical `key=value` serialization, unrelated lines verbatim.
    pub fn to_ini_string(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                NpmrcLine::Verbatim(raw) | NpmrcLine::Section(raw) => out.push_str(raw),
                NpmrcLine::Pair { key, value } => {
                    out.push_str(key);
                    out.push('=');
                    out.push_str(value);
                }
            }
            out.push('\n');
        }
        out
    }
}
