//! System instruction and user message framing
//!
//! Fixed contract sent with every enhancement request.

/// Prefix placed in front of the user's draft
pub const DRAFT_HEADER: &str = "Draft Prompt to Enhance:";

/// The fixed system instruction
///
/// Asks for a five-part rewrite (Persona, Context, Task, Constraints,
/// Output Format) and for the rewritten prompt only, without preamble.
pub fn system_instruction() -> &'static str {
    "You are a world-class Prompt Engineer.
Your task is to rewrite the provided \"draft prompt\" into a \"master-level prompt\".

Structure the enhanced prompt using these core components:
1. Persona: Define who the AI should be.
2. Context: Provide relevant background information.
3. Task: Clearly state the primary objective.
4. Constraints: List specific limitations or requirements.
5. Output Format: Define exactly how the response should look.

IMPORTANT:
- Return ONLY the improved prompt text.
- Do not include any introductory text, labels like \"Here is your prompt\", or conversational filler.
- Keep the tone professional and precise."
}

/// Build the user message carrying the draft
///
/// The draft is embedded verbatim (no trimming).
pub fn user_message(draft: &str) -> String {
    format!("{}\n\n{}", DRAFT_HEADER, draft)
}
