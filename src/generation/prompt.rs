//! Story prompt construction

use crate::story::ReadingDuration;

/// Build the instruction sent to the model for a new story
///
/// Theme and character lines are only added when the hints are present
/// and not blank.
///
/// # Examples
///
/// ```
/// use bedtime_stories::generation::build_story_prompt;
/// use bedtime_stories::story::ReadingDuration;
///
/// let prompt = build_story_prompt(ReadingDuration::Ten, Some("a brave mouse"), None);
/// assert!(prompt.contains("approximately 10 minutes"));
/// assert!(prompt.contains("a brave mouse"));
/// assert!(!prompt.contains("Include these characters"));
/// ```
pub fn build_story_prompt(
    duration: ReadingDuration,
    description: Option<&str>,
    favorite_characters: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Generate a bedtime story that is approximately {} minutes long when read aloud.\n\
         \n\
         Requirements:\n\
         - The story should be calming and suitable for bedtime\n\
         - Include gentle, peaceful themes\n\
         - End with a soothing conclusion that helps children fall asleep\n\
         - Provide the story content formatted as Markdown",
        duration.minutes()
    );

    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        prompt.push_str("\n- Story theme/description: ");
        prompt.push_str(description);
    }

    if let Some(characters) = favorite_characters.filter(|c| !c.trim().is_empty()) {
        prompt.push_str("\n- Include these characters: ");
        prompt.push_str(characters);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_duration() {
        let prompt = build_story_prompt(ReadingDuration::Fifteen, None, None);
        assert!(prompt.starts_with(
            "Generate a bedtime story that is approximately 15 minutes long when read aloud."
        ));
        assert!(prompt.contains("formatted as Markdown"));
        assert!(!prompt.contains("Story theme"));
    }

    #[test]
    fn test_prompt_includes_hints() {
        let prompt = build_story_prompt(
            ReadingDuration::Five,
            Some("a lighthouse by the sea"),
            Some("Pip the puffin"),
        );
        assert!(prompt.contains("\n- Story theme/description: a lighthouse by the sea"));
        assert!(prompt.ends_with("\n- Include these characters: Pip the puffin"));
    }

    #[test]
    fn test_prompt_skips_blank_hints() {
        let prompt = build_story_prompt(ReadingDuration::Ten, Some(""), Some("   "));
        assert!(!prompt.contains("Story theme"));
        assert!(!prompt.contains("Include these characters"));
    }
}
