//! Deterministic PICC-line normalization
//!
//! Rewrites PICC-line mentions into one canonical form as a safety net that
//! does not depend on the language model getting the detail right. Each
//! mention is parsed into a structured intermediate before re-rendering, so
//! the transform is idempotent: the canonical form parses back to itself.

/// Structured intermediate for one PICC mention
#[derive(Debug, Clone, PartialEq, Eq)]
struct PiccMention {
    /// Lumen count, when a "<N> lumens" phrase is present
    lumens: Option<u32>,
    /// Remaining free-text details, whitespace-normalized
    details: String,
}

/// Rewrite every PICC-line mention in `text` into the canonical form
/// `PICC line in situ[, X<N> lumens][ <details>] this shift.`
///
/// Matching is case-insensitive and word-bounded; each mention spans from
/// the word "PICC" to the end of its line and is rewritten independently.
/// Text before the mention on the same line, and lines without a mention,
/// pass through unchanged.
pub fn normalize_picc(text: &str) -> String {
    text.split('\n')
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_line(line: &str) -> String {
    match find_picc_start(line) {
        Some(start) => {
            let (prefix, mention) = line.split_at(start);
            format!("{}{}", prefix, render_mention(&parse_mention(mention)))
        }
        None => line.to_string(),
    }
}

/// Find the byte offset of the first word-bounded, case-insensitive "PICC".
fn find_picc_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    for i in 0..bytes.len().saturating_sub(3) {
        if !bytes[i..i + 4].eq_ignore_ascii_case(b"picc") {
            continue;
        }
        let bounded_left = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
        let bounded_right = i + 4 >= bytes.len() || !bytes[i + 4].is_ascii_alphanumeric();
        if bounded_left && bounded_right {
            return Some(i);
        }
    }
    None
}

/// Parse a mention segment (starting at the "PICC" token) into its
/// structured intermediate.
fn parse_mention(segment: &str) -> PiccMention {
    // One terminal period belongs to the sentence, not the details
    let trimmed = segment.trim_end();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);

    let mut tokens: Vec<String> = trimmed.split_whitespace().map(|t| t.to_string()).collect();

    strip_leading_fragment(&mut tokens);
    let lumens = extract_lumens(&mut tokens);
    strip_trailing_shift(&mut tokens);

    PiccMention {
        lumens,
        details: tokens.join(" "),
    }
}

fn render_mention(mention: &PiccMention) -> String {
    let mut out = String::from("PICC line in situ");
    if let Some(count) = mention.lumens {
        out.push_str(&format!(", X{} lumens", count));
    }
    if !mention.details.is_empty() {
        out.push(' ');
        out.push_str(&mention.details);
    }
    out.push_str(" this shift.");
    out
}

/// Lowercase a token with surrounding punctuation stripped, for keyword
/// comparison only; detail tokens keep their original spelling.
fn norm_token(token: &str) -> String {
    token
        .trim_matches(|c: char| c == ',' || c == ';' || c == ':' || c == '.')
        .to_ascii_lowercase()
}

/// Consume the leading "PICC [line(s)] [in situ]" fragment.
fn strip_leading_fragment(tokens: &mut Vec<String>) {
    let mut consumed = 0;

    if consumed < tokens.len() && norm_token(&tokens[consumed]) == "picc" {
        consumed += 1;
    }
    if consumed < tokens.len() && matches!(norm_token(&tokens[consumed]).as_str(), "line" | "lines") {
        consumed += 1;
    }
    if consumed < tokens.len() && norm_token(&tokens[consumed]) == "insitu" {
        consumed += 1;
    } else if consumed + 1 < tokens.len()
        && norm_token(&tokens[consumed]) == "in"
        && norm_token(&tokens[consumed + 1]) == "situ"
    {
        consumed += 2;
    }

    tokens.drain(..consumed);
}

/// Remove the first "<N> lumens" phrase and return the count.
fn extract_lumens(tokens: &mut Vec<String>) -> Option<u32> {
    for i in 1..tokens.len() {
        if matches!(norm_token(&tokens[i]).as_str(), "lumen" | "lumens") {
            if let Some(count) = parse_lumen_count(&norm_token(&tokens[i - 1])) {
                tokens.drain(i - 1..=i);
                return Some(count);
            }
        }
    }
    None
}

/// Parse a lumen count token: "<N>", "x<N>" or "×<N>" (the canonical
/// rendering's own spelling must round-trip).
fn parse_lumen_count(token: &str) -> Option<u32> {
    let digits = token
        .strip_prefix('x')
        .or_else(|| token.strip_prefix('×'))
        .unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Drop a trailing "this shift" fragment.
fn strip_trailing_shift(tokens: &mut Vec<String>) {
    let len = tokens.len();
    if len >= 2 && norm_token(&tokens[len - 2]) == "this" && norm_token(&tokens[len - 1]) == "shift" {
        tokens.truncate(len - 2);
    }
}
