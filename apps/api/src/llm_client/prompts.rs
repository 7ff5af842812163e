// Prompt text shared by every caller of the client. Feature prompts live next to the
// feature (editor/prompts.rs).

/// System turn for calls whose reply is decoded as JSON.
pub const JSON_ONLY_SYSTEM: &str = "You are an experienced resume editor. \
    Reply with exactly one JSON object and nothing else: \
    no prose before or after it, no markdown fences, no commentary.";
