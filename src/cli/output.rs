use chrono::Local;
use serde::Serialize;

use crate::model::section::ContentSection;
use crate::model::tag::Tag;
use crate::ops::prompts::FocusExercise;
use crate::ops::section_ops::{TagStats, preview};
use crate::ops::text_stats::TextStats;
use crate::util::unicode::truncate_to_width;

/// Width budget for one-line section previews
const PREVIEW_WIDTH: usize = 72;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TagJson {
    pub id: String,
    pub name: String,
    pub color: String,
    pub usage: usize,
}

#[derive(Serialize)]
pub struct SectionJson {
    pub id: String,
    pub content: String,
    pub tags: Vec<String>,
    /// RFC 3339
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct TagDetailJson {
    #[serde(flatten)]
    pub tag: TagJson,
    pub sections: Vec<SectionJson>,
}

#[derive(Serialize)]
pub struct TagStatsJson {
    pub total_sections: usize,
    pub tagged_sections: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_used: Option<String>,
}

#[derive(Serialize)]
pub struct TagListJson {
    pub tags: Vec<TagJson>,
    pub stats: TagStatsJson,
}

#[derive(Serialize)]
pub struct FilterJson {
    pub selected: Vec<TagJson>,
}

#[derive(Serialize)]
pub struct PageJson {
    pub content: String,
    pub filtered: bool,
}

#[derive(Serialize)]
pub struct ExerciseJson {
    pub id: &'static str,
    pub prompt: &'static str,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub text: TextStats,
    pub tags: TagStatsJson,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn tag_to_json(tag: &Tag, usage: usize) -> TagJson {
    TagJson {
        id: tag.id.clone(),
        name: tag.name.clone(),
        color: tag.color.hex().to_string(),
        usage,
    }
}

pub fn section_to_json(section: &ContentSection) -> SectionJson {
    SectionJson {
        id: section.id.clone(),
        content: section.content.clone(),
        tags: section.tags.clone(),
        timestamp: section.timestamp.to_rfc3339(),
    }
}

pub fn exercise_to_json(exercise: &FocusExercise) -> ExerciseJson {
    ExerciseJson {
        id: exercise.id,
        prompt: exercise.prompt,
        description: exercise.description,
    }
}

pub fn tag_stats_to_json(stats: &TagStats) -> TagStatsJson {
    TagStatsJson {
        total_sections: stats.total_sections,
        tagged_sections: stats.tagged_sections,
        most_used: stats.most_used.as_ref().map(|t| t.name.clone()),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// `Ideas (tag-17..-1) [blue]  used in 2 sections`
pub fn format_tag_line(tag: &Tag, usage: usize) -> String {
    format!(
        "{} ({}) [{}]  used in {} section{}",
        tag.name,
        tag.id,
        tag.color,
        usage,
        if usage == 1 { "" } else { "s" }
    )
}

/// Local time of a section plus a one-line preview
pub fn format_section_lines(section: &ContentSection) -> Vec<String> {
    let when = section
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");
    let one_line = preview(section).replace('\n', " ");
    vec![
        format!("  {}", when),
        format!("    {}", truncate_to_width(&one_line, PREVIEW_WIDTH)),
    ]
}

/// `today        Write one sentence ...  (Anchor yourself ...)`
pub fn format_exercise_line(exercise: &FocusExercise) -> String {
    format!("{:<12} {}  ({})", exercise.id, exercise.prompt, exercise.description)
}

pub fn format_tag_stats(stats: &TagStats) -> Vec<String> {
    vec![
        format!("Total content sections: {}", stats.total_sections),
        format!("Tagged sections: {}", stats.tagged_sections),
        format!(
            "Most used tag: {}",
            stats
                .most_used
                .as_ref()
                .map(|t| t.name.as_str())
                .unwrap_or("None")
        ),
    ]
}

pub fn format_text_stats(stats: &TextStats) -> Vec<String> {
    vec![
        format!("title: {}", stats.title),
        format!("words: {}", stats.words),
        format!("characters: {}", stats.characters),
        format!("characters (no spaces): {}", stats.characters_no_spaces),
        format!("paragraphs: {}", stats.paragraphs),
        format!("sentences: {}", stats.sentences),
        format!("reading time: {} min", stats.reading_minutes),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tag::TagColor;
    use chrono::{TimeZone, Utc};

    fn tag() -> Tag {
        Tag::new("tag-1".into(), "Ideas".into(), TagColor::Blue)
    }

    #[test]
    fn tag_line_pluralizes() {
        assert_eq!(format_tag_line(&tag(), 1), "Ideas (tag-1) [blue]  used in 1 section");
        assert_eq!(format_tag_line(&tag(), 0), "Ideas (tag-1) [blue]  used in 0 sections");
    }

    #[test]
    fn section_preview_is_one_line() {
        let ts = Utc.timestamp_millis_opt(0).unwrap();
        let s = ContentSection::new(0, "line one\nline two".into(), vec!["tag-1".into()], ts);
        let lines = format_section_lines(&s);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "    line one line two");
    }

    #[test]
    fn stats_without_tags_say_none() {
        let stats = TagStats {
            total_sections: 0,
            tagged_sections: 0,
            most_used: None,
        };
        assert_eq!(format_tag_stats(&stats)[2], "Most used tag: None");
        assert!(tag_stats_to_json(&stats).most_used.is_none());
    }

    #[test]
    fn exercise_line_leads_with_id() {
        let line = format_exercise_line(&crate::ops::prompts::EXERCISES[0]);
        assert_eq!(
            line,
            "grounding    Right now I notice...  (Ground yourself in the present moment)"
        );
    }

    #[test]
    fn tag_json_uses_hex_color() {
        let v = serde_json::to_value(tag_to_json(&tag(), 3)).unwrap();
        assert_eq!(v["color"], "#3b82f6");
        assert_eq!(v["usage"], 3);
    }
}
