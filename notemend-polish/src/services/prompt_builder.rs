//! Prompt construction for note polishing

/// Recognized clinical section headings, in the exact order they must appear
/// in polished output. Headings without content are omitted, never reordered.
pub const SECTION_HEADINGS: [&str; 11] = [
    "CNS",
    "CVS",
    "RESP",
    "Endocrine",
    "Hydration/Nutrition",
    "GIT",
    "Renal",
    "Wounds",
    "Integument",
    "Mobility",
    "Plan/Other",
];

/// Build the instruction prompt embedding the raw note verbatim.
///
/// Pure function: the same note always produces the same prompt, and the
/// heading order baked into the template never varies between runs.
pub fn build_prompt(note_text: &str) -> String {
    let headings = SECTION_HEADINGS.join(", ");

    format!(
        r#"You are a professional clinical documentation assistant.
Rewrite the following nursing note into a clean, concise, professional format.

Rules:
- Keep nursing shorthand exactly as written (e.g., BO ×1, NBM, SpO₂, Pt, C/O).
- Maintain all vitals, times, meds, and interventions exactly as documented.
- Use headings: {headings}.
- Only include headings that have data (omit empty ones).
- Headings that do appear must follow the order listed above.
- Write in third person, past tense.
- Do not add information not present in the original note.
- Output must follow heading format exactly as shown above.

Original Note:
{note_text}
"#
    )
}
