//! Response schema for the structured analysis call
//!
//! The model is asked for JSON constrained to this schema, but the
//! returned payload is still treated as untrusted input: it is
//! deserialized and shape-checked here, failing closed on any mismatch
//! instead of assuming well-formedness.

use review_types::AnalysisResult;
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::error::CounselError;

/// JSON schema submitted with every analysis request.
pub fn analysis_response_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["summary", "domain", "clauses", "risk_score", "red_flags", "next_steps"],
        "properties": {
            "summary": { "type": "string" },
            "domain": {
                "type": "string",
                "enum": ["Property", "Employment", "Financial", "Commercial", "Consumer", "IT", "Other"]
            },
            "clauses": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["id", "title", "text", "risk", "explanation", "legal_reference", "suggested_rewrite"],
                    "properties": {
                        "id": { "type": "integer" },
                        "title": { "type": "string" },
                        "text": { "type": "string" },
                        "risk": { "type": "string", "enum": ["Low", "Medium", "High"] },
                        "explanation": { "type": "string" },
                        "legal_reference": { "type": "string" },
                        "suggested_rewrite": { "type": ["string", "null"] }
                    }
                }
            },
            "risk_score": { "type": "integer", "minimum": 0, "maximum": 100 },
            "red_flags": { "type": "array", "items": { "type": "string" } },
            "next_steps": { "type": "array", "items": { "type": "string" }, "minItems": 3, "maxItems": 5 }
        }
    })
}

/// Parse and validate the model's JSON payload into an [`AnalysisResult`].
pub fn parse_analysis(payload: &str) -> Result<AnalysisResult, CounselError> {
    let result: AnalysisResult = serde_json::from_str(payload)
        .map_err(|e| CounselError::Analysis(format!("malformed analysis response: {e}")))?;

    // Clause ids key the rewrite mapping; duplicates would make it
    // ambiguous, so reject the whole payload.
    let mut seen = HashSet::new();
    for clause in &result.clauses {
        if !seen.insert(clause.id) {
            return Err(CounselError::Analysis(format!(
                "duplicate clause id {} in analysis response",
                clause.id
            )));
        }
    }

    Ok(result)
}
