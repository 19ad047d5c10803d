//! Brief request model and the form extractor.
//!
//! A [`RawForm`] is the untyped submission input: an ordered list of
//! `name -> value` pairs where a name may repeat (the `platforms`
//! checkboxes). [`extract`] turns it into a [`BriefRequest`], applying
//! defaults and dropping empty fields so that the serialized request
//! never carries an empty string or a `null`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// Duration (seconds) used when the form carries no usable value.
pub const DEFAULT_DURATION_SECS: i64 = 60;

/// Platform used when the form selects none.
pub const DEFAULT_PLATFORM: &str = "tiktok";

// ---------------------------------------------------------------------------
// Form field names
// ---------------------------------------------------------------------------

pub const FIELD_TOPIC: &str = "topic";
pub const FIELD_DURATION: &str = "duration";
pub const FIELD_TONALITY: &str = "tonality";
pub const FIELD_TARGET_AUDIENCE: &str = "target_audience";
pub const FIELD_ADDITIONAL_CONTEXT: &str = "additional_context";
pub const FIELD_PLATFORMS: &str = "platforms";

// ---------------------------------------------------------------------------
// RawForm
// ---------------------------------------------------------------------------

/// Untyped submission input, in the order the fields were provided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawForm {
    fields: Vec<(String, String)>,
}

impl RawForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Repeating a name adds another value for it.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Parse `name=value` pairs (the value may itself contain `=`).
    ///
    /// Arguments without a `=` are rejected.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut form = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                CoreError::Validation(format!("Expected field=value, got '{pair}'"))
            })?;
            form.push(name.trim(), value);
        }
        Ok(form)
    }

    /// First value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in input order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ---------------------------------------------------------------------------
// BriefRequest
// ---------------------------------------------------------------------------

/// Content-generation request sent to `POST /brief`.
///
/// Optional text fields are omitted from the JSON body when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BriefRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub topic: Option<String>,

    pub duration: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub tonality: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub target_audience: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub additional_context: Option<String>,

    #[validate(length(min = 1))]
    pub platforms: Vec<String>,
}

impl BriefRequest {
    /// Check the request invariants (non-empty platforms, no empty text).
    pub fn ensure_valid(&self) -> Result<(), CoreError> {
        self.validate()?;
        if self.platforms.iter().any(String::is_empty) {
            return Err(CoreError::Validation(
                "platforms must not contain empty values".to_string(),
            ));
        }
        Ok(())
    }
}

/// Build a [`BriefRequest`] from raw form input.
///
/// Never fails: `duration` takes the leading integer of the field
/// (`"90s"` is 90, `"12.5"` is 12, `"-5"` is -5); no digits or zero
/// becomes [`DEFAULT_DURATION_SECS`]. No selected platform becomes
/// `[DEFAULT_PLATFORM]`, and empty text fields are dropped.
pub fn extract(form: &RawForm) -> BriefRequest {
    let duration = form
        .get(FIELD_DURATION)
        .and_then(leading_integer)
        .filter(|secs| *secs != 0)
        .unwrap_or(DEFAULT_DURATION_SECS);

    let mut platforms: Vec<String> = form
        .get_all(FIELD_PLATFORMS)
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    if platforms.is_empty() {
        platforms.push(DEFAULT_PLATFORM.to_string());
    }

    BriefRequest {
        topic: non_empty(form.get(FIELD_TOPIC)),
        duration,
        tonality: non_empty(form.get(FIELD_TONALITY)),
        target_audience: non_empty(form.get(FIELD_TARGET_AUDIENCE)),
        additional_context: non_empty(form.get(FIELD_ADDITIONAL_CONTEXT)),
        platforms,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Optional sign followed by the longest run of digits at the start of
/// `raw` (leading whitespace skipped). `None` when there are no digits.
fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
