//! URL path templates
//!
//! Templates use `{name}` placeholders, filled from a [`PathParams`] map:
//!
//! ```rust
//! use typedrest::path::{substitute, PathParams};
//!
//! let params = PathParams::new().with("id", 42);
//! assert_eq!(substitute("/pets/{id}", &params).unwrap(), "/pets/42");
//! ```
//!
//! `{{` and `}}` produce literal braces. Every placeholder must have a value; a missing
//! one is an error, never an unsubstituted token left in the URL. Parameters the template
//! does not mention are ignored. Values are inserted as-is, without percent-encoding.

use std::collections::BTreeMap;
use std::fmt::Display;
use thiserror::Error;

/// Why a template could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathTemplateError {
    /// A placeholder has no value in the parameter map.
    #[error("Missing path parameter `{name}` for template `{template}`")]
    MissingParameter {
        /// The template being rendered
        template: String,
        /// Placeholder without a value
        name: String,
    },

    /// The template itself is not well formed.
    #[error("Malformed path template `{template}` at byte {position}: {reason}")]
    Malformed {
        /// The offending template
        template: String,
        /// Byte offset of the problem
        position: usize,
        /// What is wrong
        reason: &'static str,
    },
}

/// Placeholder name to value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(BTreeMap<String, String>);

impl PathParams {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.0.insert(name.into(), value.to_string());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    /// Value for a placeholder, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl<K: Into<String>, V: Display, const N: usize> From<[(K, V); N]> for PathParams {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate<'a> {
    raw: &'a str,
    segments: Vec<Segment<'a>>,
}

impl<'a> PathTemplate<'a> {
    /// Parse a template, checking brace structure.
    pub fn parse(raw: &'a str) -> Result<Self, PathTemplateError> {
        let malformed = |position, reason| PathTemplateError::Malformed {
            template: raw.to_string(),
            position,
            reason,
        };

        let bytes = raw.as_bytes();
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut i = 0;

        // Braces are ASCII, so every index we slice at is a char boundary
        while i < bytes.len() {
            match bytes[i] {
                b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                    push_literal(&mut segments, &raw[literal_start..=i]);
                    i += 2;
                    literal_start = i;
                }
                b'{' => {
                    push_literal(&mut segments, &raw[literal_start..i]);

                    let rest = &raw[i + 1..];
                    let close = rest
                        .find(['{', '}'])
                        .ok_or_else(|| malformed(i, "unclosed placeholder"))?;
                    if rest.as_bytes()[close] == b'{' {
                        return Err(malformed(i + 1 + close, "'{' inside placeholder"));
                    }

                    let name = &rest[..close];
                    if name.is_empty() {
                        return Err(malformed(i, "empty placeholder name"));
                    }

                    segments.push(Segment::Placeholder(name));
                    i += close + 2;
                    literal_start = i;
                }
                b'}' => return Err(malformed(i, "single '}' outside a placeholder")),
                _ => i += 1,
            }
        }
        push_literal(&mut segments, &raw[literal_start..]);

        Ok(Self { raw, segments })
    }

    /// The template as written.
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Placeholder names in order of appearance (repeats included).
    pub fn placeholders(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(*name),
            Segment::Literal(_) => None,
        })
    }

    /// Fill every placeholder from `params`.
    pub fn render(&self, params: &PathParams) -> Result<String, PathTemplateError> {
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value =
                        params
                            .get(name)
                            .ok_or_else(|| PathTemplateError::MissingParameter {
                                template: self.raw.to_string(),
                                name: (*name).to_string(),
                            })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn push_literal<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Literal(text));
    }
}

/// Parse `template` and fill it from `params` in one step.
pub fn substitute(template: &str, params: &PathParams) -> Result<String, PathTemplateError> {
    PathTemplate::parse(template)?.render(params)
}

/// Prefix the rendered template with `host` (empty when absent).
pub fn resolve_url(
    host: Option<&str>,
    template: &str,
    params: &PathParams,
) -> Result<String, PathTemplateError> {
    let path = substitute(template, params)?;
    Ok(format!("{}{}", host.unwrap_or_default(), path))
}
