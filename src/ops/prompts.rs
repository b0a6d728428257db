/// A short writing prompt that can be dropped onto the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusExercise {
    pub id: &'static str,
    pub prompt: &'static str,
    pub description: &'static str,
}

pub const EXERCISES: &[FocusExercise] = &[
    FocusExercise {
        id: "grounding",
        prompt: "Right now I notice...",
        description: "Ground yourself in the present moment",
    },
    FocusExercise {
        id: "today",
        prompt: "Write one sentence that could only happen today.",
        description: "Anchor yourself in time and memory",
    },
    FocusExercise {
        id: "perspective",
        prompt: "Choose an object near you. What has it seen today?",
        description: "Shift perspective and spark imagination",
    },
    FocusExercise {
        id: "metaphor",
        prompt: "Write a sentence where you swap a feeling with a color.",
        description: "Train metaphorical thinking",
    },
    FocusExercise {
        id: "constraint",
        prompt: "Tell me something true in exactly ten words.",
        description: "Use constraints to drive flow",
    },
];

/// Look up an exercise by id (case-insensitive)
pub fn find_exercise(id: &str) -> Option<&'static FocusExercise> {
    let id = id.trim();
    EXERCISES.iter().find(|e| e.id.eq_ignore_ascii_case(id))
}

/// Append `prompt` as a new paragraph, leaving a space to keep writing after it
pub fn append_prompt(text: &str, prompt: &str) -> String {
    if text.is_empty() {
        format!("{} ", prompt)
    } else {
        format!("{}\n\n{} ", text, prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = EXERCISES.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), EXERCISES.len());
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find_exercise("Today").unwrap().id, "today");
        assert_eq!(find_exercise(" metaphor ").unwrap().id, "metaphor");
        assert!(find_exercise("haiku").is_none());
    }

    #[test]
    fn prompt_on_empty_page_has_no_leading_break() {
        assert_eq!(append_prompt("", "Right now I notice..."), "Right now I notice... ");
    }

    #[test]
    fn prompt_starts_a_new_paragraph() {
        assert_eq!(
            append_prompt("morning pages", "Right now I notice..."),
            "morning pages\n\nRight now I notice... "
        );
    }
}
