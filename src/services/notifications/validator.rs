//! Required-field checks run by every provider before a request is built.

use super::provider::NotificationRequest;
use crate::error::{AppError, AppResult};

/// Fails with `MissingField` naming the first of `fields` that is absent
/// or empty in `request`.
///
/// Recognised names are `token`, `title` and `content`; any other name is
/// always reported as missing.
pub fn require_fields(request: &NotificationRequest, fields: &[&str]) -> AppResult<()> {
    match fields.iter().find(|name| request.field(name).is_none()) {
        Some(missing) => Err(AppError::missing_field(*missing)),
        None => Ok(()),
    }
}

/// `true` when `token` is itself an absolute http(s) URL.
pub fn is_http_url(token: &str) -> bool {
    let lower = token.trim_start().get(..8).unwrap_or(token).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// One positional segment of a compound token
#[derive(Debug, Clone, Copy)]
pub struct TokenField {
    pub name: &'static str,
    pub required: bool,
}

impl TokenField {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

/// Layout of a `#`-separated compound token such as `corpid#secret#agentid`.
///
/// The last field receives everything after the preceding separators, so a
/// `#` inside the final segment survives.
#[derive(Debug, Clone, Copy)]
pub struct TokenSchema {
    fields: &'static [TokenField],
}

impl TokenSchema {
    pub const SEPARATOR: char = '#';

    pub const fn new(fields: &'static [TokenField]) -> Self {
        Self { fields }
    }

    /// Splits `token` and checks that every required segment is non-empty.
    ///
    /// # Errors
    /// `MissingField` naming the first required segment that is absent.
    pub fn parse<'a>(&self, token: &'a str) -> AppResult<TokenParts<'a>> {
        let mut segments = token.splitn(self.fields.len().max(1), Self::SEPARATOR);
        let mut values = Vec::with_capacity(self.fields.len());

        for field in self.fields {
            let value = segments.next().map(str::trim).filter(|v| !v.is_empty());
            if field.required && value.is_none() {
                return Err(AppError::missing_field(field.name));
            }
            values.push((field.name, value));
        }

        Ok(TokenParts { values })
    }

    /// Human-readable layout, e.g. `corpid#secret#agentid[#touser]`
    pub fn layout(&self) -> String {
        let mut out = String::new();
        for (idx, field) in self.fields.iter().enumerate() {
            let sep = if idx == 0 { "" } else { "#" };
            if field.required {
                out.push_str(sep);
                out.push_str(field.name);
            } else {
                out.push('[');
                out.push_str(sep);
                out.push_str(field.name);
                out.push(']');
            }
        }
        out
    }
}

/// Named segments of a parsed compound token
#[derive(Debug, Clone)]
pub struct TokenParts<'a> {
    values: Vec<(&'static str, Option<&'a str>)>,
}

impl<'a> TokenParts<'a> {
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .and_then(|(_, value)| *value)
    }

    /// Like [`get`](Self::get) but fails with `MissingField` when absent.
    pub fn require(&self, name: &str) -> AppResult<&'a str> {
        self.get(name).ok_or_else(|| AppError::missing_field(name))
    }
}
