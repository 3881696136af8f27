// src/prompts.rs
use crate::git::StagedChanges;

pub const COMMIT_SYSTEM_PROMPT: &str = "You are an expert at analyzing the git diff changes.";

pub const RESPONSE_FORMAT: &str = r#"Respond with ONLY a JSON array, no markdown, in this exact shape:
[{"message": "<commit message>"}, {"message": "<commit message>"}]"#;

/// User-side prompt parts, in the order they are sent.
pub fn commit_prompt_parts(
    changes: &StagedChanges,
    message_spec: &str,
    count: u32,
) -> Vec<String> {
    let mut parts = vec![format!("Message specification: {}", message_spec)];

    if let Some(subjects) = &changes.previous_subjects {
        parts.push(format!("Previous commit messages:\n{}", subjects));
    }

    parts.push(format!(
        "Git diff: \n{}. \nProvide at least {} alternative commit message options according to the above message specification.",
        changes.diff, count
    ));
    parts.push(RESPONSE_FORMAT.to_string());
    parts
}

/// Single-string form for chat-completion endpoints.
pub fn commit_user_prompt(changes: &StagedChanges, message_spec: &str, count: u32) -> String {
    commit_prompt_parts(changes, message_spec, count).join("\n\n")
}
