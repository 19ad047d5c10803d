//! Plain-text presentation of tracker events and fragments.

use briefcast_core::{Block, Fragment};
use briefcast_tracker::{NoticeLevel, Phase, TrackerEvent};

/// Text to print for an event, if it is user-visible.
pub fn present_event(event: &TrackerEvent) -> Option<String> {
    match event {
        TrackerEvent::PhaseChanged { phase } => match phase {
            Phase::Submitting => Some("Submitting brief...".to_string()),
            _ => None,
        },
        TrackerEvent::StatusChanged {
            job_id,
            status,
            category,
            progress,
        } => {
            let mut line = format!("Job {job_id}: {status} [{}]", category.label());
            if let Some(progress) = progress {
                line.push_str(&format!(" {progress}%"));
            }
            Some(line)
        }
        TrackerEvent::ResultsCleared => None,
        TrackerEvent::ResultsRendered { fragments, .. } => Some(present_fragments(fragments)),
        TrackerEvent::Notice(notice) => Some(match notice.level {
            NoticeLevel::Error => format!("error: {}", notice.message),
            NoticeLevel::Info => notice.message.clone(),
        }),
        TrackerEvent::NoticeDismissed { .. } => None,
    }
}

/// All fragments, numbered from 1, separated by blank lines.
pub fn present_fragments(fragments: &[Fragment]) -> String {
    if fragments.is_empty() {
        return "No results.".to_string();
    }
    fragments
        .iter()
        .enumerate()
        .map(|(i, f)| present_fragment(i + 1, f))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn present_fragment(number: usize, fragment: &Fragment) -> String {
    let mut lines = Vec::new();
    let header = if fragment.copyable {
        format!("== [{number}] {} == (copy {number})", fragment.title)
    } else {
        format!("== [{number}] {} ==", fragment.title)
    };
    lines.push(header);
    for block in &fragment.blocks {
        write_block(block, 0, &mut lines);
    }
    lines.join("\n")
}

fn write_block(block: &Block, depth: usize, lines: &mut Vec<String>) {
    let pad = "  ".repeat(depth);
    match block {
        Block::Heading { text } => lines.push(format!("{pad}{text}:")),
        Block::Field { label, value } => lines.push(format!("{pad}{label}: {value}")),
        Block::Paragraph { text } => lines.extend(text.lines().map(|l| format!("{pad}{l}"))),
        Block::List { items } => {
            for (i, item) in items.iter().enumerate() {
                lines.push(format!("{pad}  {}. {item}", i + 1));
            }
        }
        Block::Swatches { colors } => {
            let swatches: Vec<String> = colors.iter().map(|c| format!("[{c}]")).collect();
            lines.push(format!("{pad}  {}", swatches.join(" ")));
        }
        Block::Calendar { days } => {
            for (day, plan) in days {
                lines.push(format!("{pad}  {day}: {plan}"));
            }
        }
        Block::Card { title, blocks } => {
            if let Some(title) = title {
                lines.push(format!("{pad}* {title}"));
            }
            for inner in blocks {
                write_block(inner, depth + 1, lines);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use briefcast_core::{attach_copy_affordances, render, JobResult, JobStatus};
    use serde_json::json;

    fn fragments(payload: serde_json::Value) -> Vec<Fragment> {
        let mut fragments = render(&JobResult::from_value(&payload));
        attach_copy_affordances(&mut fragments);
        fragments
    }

    #[test]
    fn status_line_includes_category_and_progress() {
        let status = JobStatus::new("processing");
        let event = TrackerEvent::StatusChanged {
            job_id: "abc123".to_string(),
            category: status.category(),
            status,
            progress: Some(40),
        };
        assert_eq!(
            present_event(&event).as_deref(),
            Some("Job abc123: processing [processing] 40%")
        );
    }

    #[test]
    fn quiet_events_print_nothing() {
        assert!(present_event(&TrackerEvent::ResultsCleared).is_none());
        assert!(present_event(&TrackerEvent::NoticeDismissed { id: 1 }).is_none());
        assert!(present_event(&TrackerEvent::PhaseChanged { phase: Phase::Idle }).is_none());
    }

    #[test]
    fn copyable_fragment_header_mentions_copy_command() {
        let fragments = fragments(json!({"copywriter_result": {"hashtags": ["#a", "#b"]}}));
        let text = present_fragments(&fragments);
        assert_eq!(
            text,
            "== [1] Copywriter == (copy 1)\nHashtags:\n  1. #a\n  2. #b"
        );
    }

    #[test]
    fn cards_are_indented() {
        let fragments = fragments(json!({
            "content_ideas": {"content_ideas": [{"title": "Unboxing", "viral_potential": 0.5}]}
        }));
        let text = present_fragment(1, &fragments[0]);
        assert!(text.contains("* Unboxing\n  Viral potential: 50%"), "{text}");
    }

    #[test]
    fn empty_results_say_so() {
        assert_eq!(present_fragments(&[]), "No results.");
    }
}
