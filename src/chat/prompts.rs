//! Turning a directory prompt into the system prompt of a chat.

use crate::prompts::PromptItem;

/// Phrases that mark a prompt text as already written in the system voice
const PERSONA_MARKERS: &[&str] = &["You are", "Act as"];

/// System prompt for chatting with `prompt`.
///
/// Texts that already set up a persona are used verbatim; anything else is introduced with the
/// prompt title, e.g. `You are a Linux Terminal. <text>`.
pub fn system_prompt_for(prompt: &PromptItem) -> String {
    let text = prompt.prompt.as_str();
    if text.trim().is_empty() {
        return format!("You are a {}.", prompt.title);
    }

    if PERSONA_MARKERS.iter().any(|marker| text.contains(marker)) {
        text.to_string()
    } else {
        format!("You are a {}. {}", prompt.title, text)
    }
}
