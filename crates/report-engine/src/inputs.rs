//! Template input assembly
//!
//! The report template reads everything from one JSON object. Rewrites
//! accepted after analysis override any rewrite already attached to the
//! clause.

use std::collections::HashMap;

use review_types::AnalysisResult;
use serde_json::{json, Value};

/// Build the `report` input object for the template.
pub fn report_inputs(
    document_name: &str,
    generated: &str,
    analysis: &AnalysisResult,
    rewrites: &HashMap<u32, String>,
) -> Value {
    let clauses: Vec<Value> = analysis
        .clauses
        .iter()
        .map(|clause| {
            let rewrite = rewrites
                .get(&clause.id)
                .cloned()
                .or_else(|| clause.suggested_rewrite.clone());
            json!({
                "id": clause.id,
                "title": clause.title,
                "text": clause.text,
                "risk": clause.risk,
                "risk_color": clause.risk.hex_color(),
                "explanation": clause.explanation,
                "legal_reference": clause.legal_reference,
                "rewrite": rewrite,
            })
        })
        .collect();

    json!({
        "document": document_name,
        "generated": generated,
        "summary": analysis.summary,
        "domain": analysis.domain,
        "risk_score": analysis.risk_score,
        "red_flags": analysis.red_flags,
        "next_steps": analysis.next_steps,
        "clauses": clauses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use review_types::{Clause, ContractDomain, RiskLevel};

    fn sample_analysis() -> AnalysisResult {
        AnalysisResult {
            summary: "A simple services agreement.".to_string(),
            domain: ContractDomain::Commercial,
            clauses: vec![
                Clause {
                    id: 1,
                    title: "Payment".to_string(),
                    text: "Payment due within 90 days.".to_string(),
                    risk: RiskLevel::Medium,
                    explanation: "Long payment window.".to_string(),
                    legal_reference: "UCC § 2-310".to_string(),
                    suggested_rewrite: None,
                },
                Clause {
                    id: 2,
                    title: "Liability".to_string(),
                    text: "Provider disclaims all liability.".to_string(),
                    risk: RiskLevel::High,
                    explanation: "Blanket disclaimer.".to_string(),
                    legal_reference: "UCC § 2-719".to_string(),
                    suggested_rewrite: Some("Cap liability at fees paid.".to_string()),
                },
            ],
            risk_score: 55,
            red_flags: vec!["No indemnification".to_string()],
            next_steps: vec![
                "Negotiate payment terms".to_string(),
                "Add a liability cap".to_string(),
                "Review with counsel".to_string(),
            ],
        }
    }

    #[test]
    fn test_inputs_carry_core_fields() {
        let inputs = report_inputs("msa.pdf", "August 27, 2026", &sample_analysis(), &HashMap::new());

        assert_eq!(inputs["document"], "msa.pdf");
        assert_eq!(inputs["domain"], "Commercial");
        assert_eq!(inputs["risk_score"], 55);
        assert_eq!(inputs["clauses"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_risk_labels_and_colors() {
        let inputs = report_inputs("a.txt", "today", &sample_analysis(), &HashMap::new());
        let clauses = inputs["clauses"].as_array().unwrap();

        assert_eq!(clauses[0]["risk"], "Medium");
        assert_eq!(clauses[0]["risk_color"], RiskLevel::Medium.hex_color());
        assert_eq!(clauses[1]["risk"], "High");
    }

    #[test]
    fn test_accepted_rewrite_overrides_suggestion() {
        let mut rewrites = HashMap::new();
        rewrites.insert(2, "Mutual liability cap at 12 months of fees.".to_string());

        let inputs = report_inputs("a.txt", "today", &sample_analysis(), &rewrites);
        let clauses = inputs["clauses"].as_array().unwrap();

        // Clause 1 has no rewrite from either source
        assert_eq!(clauses[0]["rewrite"], Value::Null);
        // Clause 2's accepted rewrite wins over the analysis suggestion
        assert_eq!(
            clauses[1]["rewrite"],
            "Mutual liability cap at 12 months of fees."
        );
    }
}
