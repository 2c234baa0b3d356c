//! Prompt templates. Pure string assembly; inputs are embedded verbatim.

/// Prompt for a chat question, optionally anchored to the code currently in the editor.
/// Without code (or with empty code) the instruction is returned unchanged.
pub fn context_question(instruction: &str, code: Option<&str>) -> String {
    match code.filter(|c| !c.is_empty()) {
        Some(code) => format!(
            "The user is working with the following code:\n\n{}\n\nUser question: {}",
            code, instruction
        ),
        None => instruction.to_string(),
    }
}

/// Prompt asking for an explanation of, and fixes for, a bookmarked problem.
pub fn fix_explain(description: &str, code: &str) -> String {
    format!(
        "I need help with the following code problem:\n\n{}\n\nHere's the code:\n\n{}\n\n\
         Please provide a detailed explanation of how this code works, any potential issues, \
         and suggestions for improvement.",
        description, code
    )
}

/// Chat input pre-filled by the "share current code" action.
pub fn share_code(code: &str) -> String {
    format!("Can you help me understand and improve this code?\n\n{}", code)
}
