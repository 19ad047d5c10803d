//! Typed view of a completed job's result payload.
//!
//! The payload is a sparse JSON object. Each recognised key maps to one
//! [`SectionKind`]; every section is optional and parsed independently.
//! Nested fields are read leniently: a field with an unexpected type is
//! treated as absent instead of failing the whole section, so a
//! partially malformed section still renders whatever it does carry.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::job::is_present;

// ---------------------------------------------------------------------------
// SectionKind
// ---------------------------------------------------------------------------

/// The recognised result sections, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Brief,
    Copy,
    Editorial,
    Imagery,
    Production,
    LongForm,
    Ideas,
}

impl SectionKind {
    /// Every section in rendering order.
    pub const ALL: [SectionKind; 7] = [
        SectionKind::Brief,
        SectionKind::Copy,
        SectionKind::Editorial,
        SectionKind::Imagery,
        SectionKind::Production,
        SectionKind::LongForm,
        SectionKind::Ideas,
    ];

    /// JSON key of the section inside the result payload.
    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::Brief => "brief",
            SectionKind::Copy => "copywriter_result",
            SectionKind::Editorial => "editor_result",
            SectionKind::Imagery => "images_result",
            SectionKind::Production => "production_result",
            SectionKind::LongForm => "content_creator_result",
            SectionKind::Ideas => "content_ideas",
        }
    }

    /// Display title of the section's fragment.
    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Brief => "Processed Brief",
            SectionKind::Copy => "Copywriter",
            SectionKind::Editorial => "Editor",
            SectionKind::Imagery => "Image Specialist",
            SectionKind::Production => "Production Specialist",
            SectionKind::LongForm => "Full Content Creator",
            SectionKind::Ideas => "Content Ideas",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

// ---------------------------------------------------------------------------
// Section shapes
// ---------------------------------------------------------------------------

/// Echo of the brief as the service understood it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BriefEcho {
    #[serde(default, deserialize_with = "lenient::text")]
    pub topic: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub target_audience: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub tonality: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub platforms: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub additional_info: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub additional_context: Option<String>,
}

impl BriefEcho {
    /// `additional_info`, or `additional_context` when the former is
    /// missing or blank.
    pub fn additional(&self) -> Option<&str> {
        [&self.additional_info, &self.additional_context]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .find(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScriptItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub script: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hook: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub cta: Option<String>,
}

/// Copywriter output: scripts, hashtags and a posting schedule.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CopySection {
    #[serde(default, deserialize_with = "lenient::list")]
    pub scripts: Vec<Entry<ScriptItem>>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub hashtags: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub posting_schedule: Option<String>,
}

/// Editor output: the polished script and suggested improvements.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EditorialSection {
    #[serde(default, deserialize_with = "lenient::text")]
    pub final_script: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub improvements: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub engagement_score: Option<f64>,
}

/// Image specialist output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImagerySection {
    #[serde(default, deserialize_with = "lenient::list")]
    pub prompts: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub composition_tips: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub color_palette: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilmingPlan {
    #[serde(default, deserialize_with = "lenient::text")]
    pub shot_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub background: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub lighting: Option<String>,
}

/// Production assistant output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductionSection {
    #[serde(default, deserialize_with = "lenient::list")]
    pub filming_plans: Vec<Entry<FilmingPlan>>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub presenter_lines: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub editing_rhythm: Option<String>,
}

/// One ready-to-publish piece (full post or carousel).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContentPiece {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub estimated_reach: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub engagement_prediction: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub slides: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub design_notes: Option<String>,
}

/// Long-form content creator output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LongFormSection {
    #[serde(default, deserialize_with = "lenient::list")]
    pub full_content: Vec<Entry<ContentPiece>>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub content_pillars: Vec<Value>,
    /// Day -> planned content, in payload order.
    #[serde(default, deserialize_with = "lenient::entries")]
    pub content_calendar: Vec<(String, Value)>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub tone_guidelines: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Idea {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub concept: Option<String>,
    /// Fraction in `[0, 1]`.
    #[serde(default, deserialize_with = "lenient::number")]
    pub viral_potential: Option<f64>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub platform_fit: Vec<Value>,
}

/// Content ideas and trending topics.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IdeasSection {
    #[serde(default, deserialize_with = "lenient::list")]
    pub content_ideas: Vec<Entry<Idea>>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub trending_topics: Vec<Value>,
}

/// A list element: the expected record, or the raw value when the
/// element is not a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<T> {
    Item(T),
    Raw(Value),
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Entry<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if value.is_object() {
            if let Ok(item) = serde_json::from_value(value.clone()) {
                return Ok(Entry::Item(item));
            }
        }
        Ok(Entry::Raw(value))
    }
}

// ---------------------------------------------------------------------------
// ResultSection / JobResult
// ---------------------------------------------------------------------------

/// One section of a job result.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSection {
    Brief(BriefEcho),
    Copy(CopySection),
    Editorial(EditorialSection),
    Imagery(ImagerySection),
    Production(ProductionSection),
    LongForm(LongFormSection),
    Ideas(IdeasSection),
    /// A recognised key whose value is not a record.
    Malformed { kind: SectionKind, value: Value },
    /// Present in the payload but not a recognised section.
    Unknown { key: String, value: Value },
}

impl ResultSection {
    /// The recognised kind, or `None` for [`ResultSection::Unknown`].
    pub fn kind(&self) -> Option<SectionKind> {
        match self {
            ResultSection::Brief(_) => Some(SectionKind::Brief),
            ResultSection::Copy(_) => Some(SectionKind::Copy),
            ResultSection::Editorial(_) => Some(SectionKind::Editorial),
            ResultSection::Imagery(_) => Some(SectionKind::Imagery),
            ResultSection::Production(_) => Some(SectionKind::Production),
            ResultSection::LongForm(_) => Some(SectionKind::LongForm),
            ResultSection::Ideas(_) => Some(SectionKind::Ideas),
            ResultSection::Malformed { kind, .. } => Some(*kind),
            ResultSection::Unknown { .. } => None,
        }
    }

    fn parse(kind: SectionKind, value: Value) -> Self {
        if !value.is_object() {
            return ResultSection::Malformed { kind, value };
        }
        let parsed = match kind {
            SectionKind::Brief => serde_json::from_value(value.clone()).map(ResultSection::Brief),
            SectionKind::Copy => serde_json::from_value(value.clone()).map(ResultSection::Copy),
            SectionKind::Editorial => {
                serde_json::from_value(value.clone()).map(ResultSection::Editorial)
            }
            SectionKind::Imagery => {
                serde_json::from_value(value.clone()).map(ResultSection::Imagery)
            }
            SectionKind::Production => {
                serde_json::from_value(value.clone()).map(ResultSection::Production)
            }
            SectionKind::LongForm => {
                serde_json::from_value(value.clone()).map(ResultSection::LongForm)
            }
            SectionKind::Ideas => serde_json::from_value(value.clone()).map(ResultSection::Ideas),
        };
        parsed.unwrap_or(ResultSection::Malformed { kind, value })
    }
}

/// Parsed result payload: recognised sections in rendering order,
/// followed by unknown keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobResult {
    pub sections: Vec<ResultSection>,
}

impl JobResult {
    /// Split a result payload into sections. Absent (or empty) sections
    /// are simply not listed; a non-object payload yields no sections.
    pub fn from_value(payload: &Value) -> Self {
        let Some(map) = payload.as_object() else {
            return Self::default();
        };

        let mut sections: Vec<ResultSection> = SectionKind::ALL
            .into_iter()
            .filter_map(|kind| {
                map.get(kind.key())
                    .filter(|v| is_present(v))
                    .map(|v| ResultSection::parse(kind, v.clone()))
            })
            .collect();

        sections.extend(
            map.iter()
                .filter(|(key, _)| SectionKind::from_key(key).is_none())
                .map(|(key, value)| ResultSection::Unknown {
                    key: key.clone(),
                    value: value.clone(),
                }),
        );

        Self { sections }
    }

    /// Recognised sections present in this result, in order.
    pub fn present_kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().filter_map(ResultSection::kind).collect()
    }

    pub fn unknown_keys(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter_map(|s| match s {
                ResultSection::Unknown { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Strings as-is; numbers and booleans converted; anything else absent.
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// Numbers, or strings holding a number.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// Arrays element by element (unparseable elements dropped); a single
    /// non-null value is treated as a one-element list.
    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            Value::Null => Vec::new(),
            single => serde_json::from_value(single).ok().into_iter().collect(),
        })
    }

    /// Object entries in payload order; anything else is empty.
    pub fn entries<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<(String, Value)>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => map.into_iter().collect(),
            _ => Vec::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
