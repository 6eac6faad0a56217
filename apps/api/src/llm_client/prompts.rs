// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to prompts whose output is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY valid JSON. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Appended to prompts whose output is shown to the user verbatim.
pub const PLAIN_TEXT_INSTRUCTION: &str =
    "Return ONLY the improved text, no explanations or additional commentary.";
