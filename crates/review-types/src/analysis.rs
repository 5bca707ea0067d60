//! Structured analysis results returned by the AI service
//!
//! The wire labels here (`"Low"`, `"IT"`, ...) are fixed by the analysis
//! prompt's response schema and must round-trip unchanged.

use serde::{Deserialize, Serialize};

/// Closed set of contract domains the model classifies into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractDomain {
    Property,
    Employment,
    Financial,
    Commercial,
    Consumer,
    #[serde(rename = "IT")]
    It,
    Other,
}

impl std::fmt::Display for ContractDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ContractDomain::Property => "Property",
            ContractDomain::Employment => "Employment",
            ContractDomain::Financial => "Financial",
            ContractDomain::Commercial => "Commercial",
            ContractDomain::Consumer => "Consumer",
            ContractDomain::It => "IT",
            ContractDomain::Other => "Other",
        };
        write!(f, "{}", label)
    }
}

/// Per-clause risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Fixed CSS class used by the clause browser banding
    pub fn color_class(&self) -> &'static str {
        match self {
            RiskLevel::Low => "risk-low",
            RiskLevel::Medium => "risk-medium",
            RiskLevel::High => "risk-high",
        }
    }

    /// Fixed color used by the PDF report
    pub fn hex_color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "#16a34a",
            RiskLevel::Medium => "#d97706",
            RiskLevel::High => "#dc2626",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// One analyzed clause
///
/// `id` is assigned by the model, unique within a result, and must be
/// echoed back unchanged when attaching a rewrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clause {
    pub id: u32,
    pub title: String,
    /// Verbatim source text of the clause
    pub text: String,
    pub risk: RiskLevel,
    pub explanation: String,
    pub legal_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_rewrite: Option<String>,
}

/// Complete structured analysis for one document
///
/// Produced once per document; treated as immutable and replaced
/// wholesale on re-analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub domain: ContractDomain,
    pub clauses: Vec<Clause>,
    /// Aggregate risk score, 0-100
    pub risk_score: u8,
    pub red_flags: Vec<String>,
    pub next_steps: Vec<String>,
}

/// One segment of the proportional heat strip over all clauses
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatSegment {
    pub clause_id: u32,
    pub risk: RiskLevel,
    /// Fraction of the strip this segment occupies (segments sum to 1)
    pub fraction: f64,
}

impl AnalysisResult {
    /// Derive the heat strip: one equal-width segment per clause,
    /// colored by that clause's risk level. Empty for empty clause lists.
    pub fn heat_strip(&self) -> Vec<HeatSegment> {
        let n = self.clauses.len();
        if n == 0 {
            return Vec::new();
        }
        let fraction = 1.0 / n as f64;
        self.clauses
            .iter()
            .map(|c| HeatSegment {
                clause_id: c.id,
                risk: c.risk,
                fraction,
            })
            .collect()
    }

    /// Look up a clause by its model-assigned id
    pub fn clause(&self, id: u32) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.id == id)
    }
}
