//! Fixed instruction prompts
//!
//! The analysis prompt pins the response to the structured schema in
//! [`crate::schema`]; the rewrite and chat prompts are free-form. All
//! document text is truncated to [`MAX_ANALYSIS_CHARS`] before
//! submission.

/// Maximum number of characters of document text submitted per request.
pub const MAX_ANALYSIS_CHARS: usize = 30_000;

/// Returned when a rewrite call yields an empty response.
pub const REWRITE_FALLBACK: &str =
    "No rewrite could be generated for this clause. Please consult a lawyer for alternatives.";

/// Truncate on a char boundary without allocating when under the limit.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

pub fn analysis_system_prompt() -> &'static str {
    "You are a legal document analyst. You review contracts for laypeople, \
     flag risky clauses, and explain them in plain language. You answer \
     only with JSON matching the provided schema."
}

/// Build the analysis instruction around the (already truncated) text.
pub fn analysis_prompt(document_text: &str) -> String {
    format!(
        "Analyze the following contract. Produce:\n\
         1. A plain-language summary.\n\
         2. A domain classification: one of Property, Employment, Financial, \
            Commercial, Consumer, IT, Other.\n\
         3. A clause-by-clause breakdown. For each clause give a sequential \
            integer id, a short title, the verbatim clause text, a risk level \
            (Low, Medium, High), a plain-language explanation, and a \
            jurisdiction-specific legal citation.\n\
         4. An aggregate risk score from 0 to 100.\n\
         5. A list of red flags: critical issues or missing standard clauses.\n\
         6. Three to five actionable next steps, covering whether notarization \
            or registration is necessary and how disputes should be resolved.\n\
         \n\
         CONTRACT TEXT:\n{document_text}"
    )
}

/// Build the single-clause rewrite instruction.
pub fn rewrite_prompt(clause_text: &str, domain: &str) -> String {
    format!(
        "Rewrite the following {domain} contract clause so it is safer and \
         fairer for the signing party, while keeping its commercial intent. \
         Respond with the rewritten clause only, no preamble and no \
         commentary.\n\nORIGINAL CLAUSE:\n{clause_text}"
    )
}

/// System context injected once when a chat session starts.
pub fn chat_system_prompt(document_text: &str) -> String {
    format!(
        "You are a helpful legal assistant. The user has loaded the contract \
         below. Answer questions about it concisely and in plain language; \
         remind the user that you are not a substitute for a lawyer when the \
         stakes warrant it.\n\nCONTRACT TEXT:\n{document_text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_truncate_noop_under_limit() {
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        // The first three chars are multibyte
        let text = "日本語teil";
        assert_eq!(truncate_chars(text, 3), "日本語");
    }

    #[test]
    fn test_analysis_prompt_embeds_text() {
        let prompt = analysis_prompt("THE CONTRACT BODY");
        assert!(prompt.contains("THE CONTRACT BODY"));
        assert!(prompt.contains("0 to 100"));
    }

    proptest! {
        /// Truncation never exceeds the limit and never splits a char.
        #[test]
        fn truncation_respects_char_limit(text in ".{0,200}", max in 0usize..100) {
            let out = truncate_chars(&text, max);
            prop_assert!(out.chars().count() <= max);
            prop_assert!(text.starts_with(out));
        }
    }
}
