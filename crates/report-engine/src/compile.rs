//! Report compilation
//!
//! Compiles the embedded template against one analysis result. The
//! blocking Typst compile runs on a dedicated thread under a timeout.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use review_types::AnalysisResult;
use tracing::{debug, warn};

use crate::error::ReportError;
use crate::inputs::report_inputs;
use crate::world::ReportWorld;

/// The report template, embedded at build time.
const REPORT_TEMPLATE: &str = include_str!("../templates/report.typ");

/// Default compilation budget.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Compile the report synchronously.
pub fn render_report_sync(
    document_name: &str,
    analysis: &AnalysisResult,
    rewrites: &HashMap<u32, String>,
) -> Result<Vec<u8>, ReportError> {
    let generated = Utc::now().format("%B %-d, %Y").to_string();
    let report = report_inputs(document_name, &generated, analysis, rewrites);

    let world = ReportWorld::new(REPORT_TEMPLATE, report)?;
    let warned = typst::compile(&world);

    // Bound the memoization cache; each report is a fresh document.
    comemo::evict(10);

    for warning in &warned.warnings {
        warn!(message = %warning.message, "report template warning");
    }

    match warned.output {
        Ok(document) => {
            debug!(pages = document.pages.len(), "report compiled");
            typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default())
                .map_err(|e| ReportError::Export(format!("{e:?}")))
        }
        Err(diagnostics) => Err(ReportError::Compile(
            diagnostics.iter().map(|d| d.message.to_string()).collect(),
        )),
    }
}

/// Compile the report off the async runtime with a timeout.
pub async fn render_report(
    document_name: String,
    analysis: AnalysisResult,
    rewrites: HashMap<u32, String>,
    timeout_ms: u64,
) -> Result<Vec<u8>, ReportError> {
    let result = tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        tokio::task::spawn_blocking(move || {
            render_report_sync(&document_name, &analysis, &rewrites)
        }),
    )
    .await;

    match result {
        Ok(Ok(rendered)) => rendered,
        Ok(Err(join_error)) => Err(ReportError::Task(join_error.to_string())),
        Err(_elapsed) => Err(ReportError::Timeout(timeout_ms)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_types::{Clause, ContractDomain, RiskLevel};

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            summary: "A one-year residential lease with two flagged clauses.".to_string(),
            domain: ContractDomain::Property,
            clauses: vec![
                Clause {
                    id: 1,
                    title: "Deposit".to_string(),
                    text: "Tenant pays two months' rent as deposit.".to_string(),
                    risk: RiskLevel::Medium,
                    explanation: "Above the usual one-month norm.".to_string(),
                    legal_reference: "Fla. Stat. § 83.49".to_string(),
                    suggested_rewrite: None,
                },
                Clause {
                    id: 2,
                    title: "Termination".to_string(),
                    text: "Landlord may terminate on 7 days' notice.".to_string(),
                    risk: RiskLevel::High,
                    explanation: "Notice period is very short.".to_string(),
                    legal_reference: "Fla. Stat. § 83.57".to_string(),
                    suggested_rewrite: Some("Extend notice to 30 days.".to_string()),
                },
            ],
            risk_score: 58,
            red_flags: vec!["Notice period below statutory minimum".to_string()],
            next_steps: vec![
                "Negotiate the notice period".to_string(),
                "Confirm deposit handling".to_string(),
                "Keep a signed copy".to_string(),
            ],
        }
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let pdf = render_report_sync("lease.pdf", &analysis(), &HashMap::new()).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    fn rendered_text(pdf: &[u8]) -> String {
        pdf_extract::extract_text_from_mem(pdf).unwrap()
    }

    #[test]
    fn test_empty_sections_omit_their_headings() {
        let mut analysis = analysis();
        analysis.red_flags.clear();
        analysis.next_steps.clear();

        let pdf = render_report_sync("lease.pdf", &analysis, &HashMap::new()).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));

        // No empty headings: both sections disappear entirely
        let text = rendered_text(&pdf);
        assert!(!text.contains("Red flags"));
        assert!(!text.contains("Recommended next steps"));
        assert!(text.contains("Summary"));
    }

    #[test]
    fn test_next_steps_render_before_red_flags() {
        let pdf = render_report_sync("lease.pdf", &analysis(), &HashMap::new()).unwrap();
        let text = rendered_text(&pdf);

        let steps = text.find("Recommended next steps").unwrap();
        let flags = text.find("Red flags").unwrap();
        let clauses = text.find("Clause analysis").unwrap();
        assert!(steps < flags);
        assert!(flags < clauses);
    }

    #[tokio::test]
    async fn test_async_render_with_timeout() {
        let pdf = render_report(
            "lease.pdf".to_string(),
            analysis(),
            HashMap::new(),
            DEFAULT_TIMEOUT_MS,
        )
        .await
        .unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }
}
