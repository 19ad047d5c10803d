//! Result renderer: one display fragment per present result section.
//!
//! Fragments are presentation-neutral trees of [`Block`]s. The terminal
//! surface prints them, and [`Fragment::text`] flattens them to the plain
//! text used by the copy action. Every section renderer is total over its
//! own shape: absent nested fields are skipped, never reported.

use serde::Serialize;
use serde_json::Value;

use crate::format::format_value;
use crate::sections::{
    BriefEcho, ContentPiece, CopySection, EditorialSection, Entry, FilmingPlan, Idea,
    IdeasSection, ImagerySection, JobResult, LongFormSection, ProductionSection, ResultSection,
    ScriptItem, SectionKind,
};

/// Fragments containing this marker are placeholders and are not copyable.
pub const PLACEHOLDER_MARKER: &str = "Awaiting";

// ---------------------------------------------------------------------------
// Fragment model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { text: String },
    Field { label: String, value: String },
    Paragraph { text: String },
    /// Ordered list, in source order.
    List { items: Vec<String> },
    /// Colour codes shown as swatches.
    Swatches { colors: Vec<String> },
    /// `(day, plan)` rows, in source order.
    Calendar { days: Vec<(String, String)> },
    Card { title: Option<String>, blocks: Vec<Block> },
}

impl Block {
    fn heading(text: impl Into<String>) -> Self {
        Block::Heading { text: text.into() }
    }

    fn field(label: impl Into<String>, value: impl Into<String>) -> Self {
        Block::Field {
            label: label.into(),
            value: value.into(),
        }
    }

    fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    fn write_text(&self, out: &mut Vec<String>) {
        match self {
            Block::Heading { text } | Block::Paragraph { text } => out.push(text.clone()),
            Block::Field { label, value } => out.push(format!("{label}: {value}")),
            Block::List { items } => out.extend(items.iter().map(|item| format!("- {item}"))),
            Block::Swatches { colors } => out.push(colors.join(" ")),
            Block::Calendar { days } => {
                out.extend(days.iter().map(|(day, plan)| format!("{day}: {plan}")))
            }
            Block::Card { title, blocks } => {
                out.extend(title.clone());
                for block in blocks {
                    block.write_text(out);
                }
            }
        }
    }
}

/// Rendered output for one result section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    pub kind: SectionKind,
    pub title: String,
    pub blocks: Vec<Block>,
    /// Set by [`attach_copy_affordances`].
    pub copyable: bool,
}

impl Fragment {
    fn new(kind: SectionKind, blocks: Vec<Block>) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            blocks,
            copyable: false,
        }
    }

    /// Plain text of the fragment body (title excluded), one line per
    /// field or list item.
    pub fn text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.blocks {
            block.write_text(&mut lines);
        }
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render every recognised section, in fixed section order.
///
/// Unknown keys produce nothing. The returned fragments carry no copy
/// affordance yet; see [`attach_copy_affordances`].
pub fn render(result: &JobResult) -> Vec<Fragment> {
    let mut fragments: Vec<Fragment> = result
        .sections
        .iter()
        .filter_map(|section| match section {
            ResultSection::Brief(s) => Some(Fragment::new(SectionKind::Brief, brief_blocks(s))),
            ResultSection::Copy(s) => Some(Fragment::new(SectionKind::Copy, copy_blocks(s))),
            ResultSection::Editorial(s) => {
                Some(Fragment::new(SectionKind::Editorial, editorial_blocks(s)))
            }
            ResultSection::Imagery(s) => {
                Some(Fragment::new(SectionKind::Imagery, imagery_blocks(s)))
            }
            ResultSection::Production(s) => {
                Some(Fragment::new(SectionKind::Production, production_blocks(s)))
            }
            ResultSection::LongForm(s) => {
                Some(Fragment::new(SectionKind::LongForm, long_form_blocks(s)))
            }
            ResultSection::Ideas(s) => Some(Fragment::new(SectionKind::Ideas, ideas_blocks(s))),
            ResultSection::Malformed { kind, value } => {
                tracing::debug!(section = kind.key(), "Rendering malformed section as raw value");
                Some(Fragment::new(*kind, vec![Block::paragraph(format_value(value))]))
            }
            ResultSection::Unknown { .. } => None,
        })
        .collect();

    fragments.sort_by_key(|f| f.kind);
    fragments
}

/// Mark fragments as copyable unless their text is empty or consists
/// solely of a placeholder line (one starting with
/// [`PLACEHOLDER_MARKER`]).
pub fn attach_copy_affordances(fragments: &mut [Fragment]) {
    for fragment in fragments.iter_mut() {
        let text = fragment.text();
        let text = text.trim();
        fragment.copyable = !text.is_empty() && !is_placeholder(text);
    }
}

fn is_placeholder(text: &str) -> bool {
    text.starts_with(PLACEHOLDER_MARKER) && text.lines().count() == 1
}

fn brief_blocks(brief: &BriefEcho) -> Vec<Block> {
    let mut blocks = Vec::new();
    push_field(&mut blocks, "Topic", brief.topic.as_deref());
    push_field(&mut blocks, "Target audience", brief.target_audience.as_deref());
    push_field(&mut blocks, "Tone", brief.tonality.as_deref());
    if !brief.platforms.is_empty() {
        blocks.push(Block::field("Platforms", joined(&brief.platforms)));
    }
    push_field(&mut blocks, "Additional info", brief.additional());
    blocks
}

fn copy_blocks(copy: &CopySection) -> Vec<Block> {
    let mut blocks: Vec<Block> = copy.scripts.iter().map(script_card).collect();
    push_list(&mut blocks, "Hashtags", copy.hashtags.iter().map(format_value));
    push_field(&mut blocks, "Posting schedule", copy.posting_schedule.as_deref());
    blocks
}

fn script_card(entry: &Entry<ScriptItem>) -> Block {
    match entry {
        Entry::Item(script) => {
            let mut blocks = Vec::new();
            if let Some(text) = &script.script {
                blocks.push(Block::paragraph(text));
            }
            push_field(&mut blocks, "Hook", script.hook.as_deref());
            push_field(&mut blocks, "CTA", script.cta.as_deref());
            Block::Card {
                title: script.platform.clone(),
                blocks,
            }
        }
        Entry::Raw(value) => Block::paragraph(format_value(value)),
    }
}

fn editorial_blocks(editor: &EditorialSection) -> Vec<Block> {
    let mut blocks = Vec::new();
    if let Some(script) = &editor.final_script {
        blocks.push(Block::heading("Final script"));
        blocks.push(Block::paragraph(script));
    }
    push_list(&mut blocks, "Improvements", editor.improvements.iter().map(format_value));
    if let Some(score) = editor.engagement_score {
        blocks.push(Block::field("Engagement score", format!("{score}/10")));
    }
    blocks
}

fn imagery_blocks(images: &ImagerySection) -> Vec<Block> {
    let mut blocks = Vec::new();
    push_list(&mut blocks, "Image prompts", images.prompts.iter().map(format_value));
    push_list(
        &mut blocks,
        "Composition tips",
        images.composition_tips.iter().map(format_value),
    );
    if !images.color_palette.is_empty() {
        blocks.push(Block::heading("Color palette"));
        blocks.push(Block::Swatches {
            colors: images.color_palette.clone(),
        });
    }
    blocks
}

fn production_blocks(production: &ProductionSection) -> Vec<Block> {
    let mut blocks = Vec::new();
    push_list(
        &mut blocks,
        "Filming plan",
        production.filming_plans.iter().map(|entry| match entry {
            Entry::Item(plan) => filming_line(plan),
            Entry::Raw(value) => format_value(value),
        }),
    );
    push_list(
        &mut blocks,
        "Presenter lines",
        production
            .presenter_lines
            .iter()
            .map(|line| format!("\"{}\"", format_value(line))),
    );
    push_field(&mut blocks, "Editing rhythm", production.editing_rhythm.as_deref());
    blocks
}

/// `shot: background - lighting`, skipping whatever is missing.
fn filming_line(plan: &FilmingPlan) -> String {
    let setting = [plan.background.as_deref(), plan.lighting.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" - ");
    match (plan.shot_type.as_deref(), setting.is_empty()) {
        (Some(shot), false) => format!("{shot}: {setting}"),
        (Some(shot), true) => shot.to_string(),
        (None, _) => setting,
    }
}

fn long_form_blocks(long_form: &LongFormSection) -> Vec<Block> {
    let mut blocks: Vec<Block> = long_form
        .full_content
        .iter()
        .map(|entry| match entry {
            Entry::Item(piece) => content_card(piece),
            Entry::Raw(value) => Block::paragraph(format_value(value)),
        })
        .collect();

    push_list(
        &mut blocks,
        "Content pillars",
        long_form.content_pillars.iter().map(format_value),
    );
    if !long_form.content_calendar.is_empty() {
        blocks.push(Block::heading("Content calendar"));
        blocks.push(Block::Calendar {
            days: long_form
                .content_calendar
                .iter()
                .map(|(day, plan)| (capitalize(day), format_value(plan)))
                .collect(),
        });
    }
    push_field(&mut blocks, "Tone guidelines", long_form.tone_guidelines.as_deref());
    blocks
}

fn content_card(piece: &ContentPiece) -> Block {
    let mut blocks = Vec::new();
    push_field(&mut blocks, "Type", piece.kind.as_deref());
    push_field(&mut blocks, "Platform", piece.platform.as_deref());
    push_field(&mut blocks, "Estimated reach", piece.estimated_reach.as_deref());
    push_field(
        &mut blocks,
        "Engagement prediction",
        piece.engagement_prediction.as_deref(),
    );
    if let Some(content) = &piece.content {
        blocks.push(Block::paragraph(content));
    }
    push_list(&mut blocks, "Slides", piece.slides.iter().map(format_value));
    push_field(&mut blocks, "Design notes", piece.design_notes.as_deref());
    Block::Card {
        title: piece.title.clone(),
        blocks,
    }
}

fn ideas_blocks(ideas: &IdeasSection) -> Vec<Block> {
    let mut blocks: Vec<Block> = ideas
        .content_ideas
        .iter()
        .map(|entry| match entry {
            Entry::Item(idea) => idea_card(idea),
            Entry::Raw(value) => Block::paragraph(format_value(value)),
        })
        .collect();

    push_list(
        &mut blocks,
        "Trending topics",
        ideas.trending_topics.iter().map(|topic| {
            let topic = format_value(topic);
            if topic.starts_with('#') {
                topic
            } else {
                format!("#{topic}")
            }
        }),
    );
    blocks
}

fn idea_card(idea: &Idea) -> Block {
    let mut blocks = Vec::new();
    if let Some(concept) = &idea.concept {
        blocks.push(Block::paragraph(concept));
    }
    if let Some(potential) = idea.viral_potential {
        blocks.push(Block::field("Viral potential", percent(potential)));
    }
    if !idea.platform_fit.is_empty() {
        blocks.push(Block::field("Platforms", joined(&idea.platform_fit)));
    }
    Block::Card {
        title: idea.title.clone(),
        blocks,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn push_field(blocks: &mut Vec<Block>, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        blocks.push(Block::field(label, value));
    }
}

/// Heading plus list, or nothing when there are no items.
fn push_list(blocks: &mut Vec<Block>, heading: &str, items: impl Iterator<Item = String>) {
    let items: Vec<String> = items.collect();
    if !items.is_empty() {
        blocks.push(Block::heading(heading));
        blocks.push(Block::List { items });
    }
}

fn joined(values: &[Value]) -> String {
    values.iter().map(format_value).collect::<Vec<_>>().join(", ")
}

/// Fraction in `[0, 1]` as a whole percentage.
pub fn percent(fraction: f64) -> String {
    format!("{}%", (fraction * 100.0).round() as i64)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
