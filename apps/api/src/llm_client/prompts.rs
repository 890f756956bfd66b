// Shared prompt fragments.
// Each service that needs model calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// Closing instruction that restricts the reply to a bare JSON array.
pub const JSON_ARRAY_ONLY_INSTRUCTION: &str = "Do not include any other text, explanation, \
    or formatting in your response - ONLY the JSON array. \
    Do NOT wrap the array in markdown code fences.";
