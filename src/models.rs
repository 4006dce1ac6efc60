//! Request and response bodies for the analysis endpoints.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

use crate::errors::AnalysisError;

/// Placeholder used in prompts for context fields the caller didn't supply.
pub const MISSING_FIELD: &str = "N/A";

/// Body of `POST /analyze`.
///
/// `idea` is optional at the serde level so that a missing field is reported the same way as a
/// blank one, instead of as a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, alias = "description")]
    pub idea: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_market: Option<String>,
}

impl AnalyzeRequest {
    /// Returns the idea text, rejecting missing or whitespace-only input.
    pub fn validated_idea(&self) -> Result<&str, AnalysisError> {
        match self.idea.as_deref() {
            Some(idea) if !idea.trim().is_empty() => Ok(idea),
            _ => Err(AnalysisError::InvalidRequest(
                "Field 'idea' must be a non-empty description of the business idea".to_string(),
            )),
        }
    }

    /// The target market, if one was given and isn't blank.
    pub fn target_market(&self) -> Option<&str> {
        self.target_market
            .as_deref()
            .filter(|market| !market.trim().is_empty())
    }
}

/// Body returned by `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
}

/// The project description collected by the brief form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub mvp: String,
}

impl ProjectDetails {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let missing: Vec<&str> = [("domain", &self.domain), ("problem", &self.problem)]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AnalysisError::InvalidRequest(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Structured description of a project, as produced by `/prompt_to_json` or a product brief.
///
/// Kept as a free-form JSON object: the model decides the exact shape, and later prompts only
/// read the handful of fields they care about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectContext(pub Map<String, Value>);

impl ProjectContext {
    /// Renders a field for embedding in a prompt. Absent, null and empty fields become `N/A`.
    pub fn field(&self, key: &str) -> Cow<'_, str> {
        render_section(self.0.get(key)).unwrap_or(Cow::Borrowed(MISSING_FIELD))
    }

    /// One-line summary used as the `website_overview` of later prompts.
    pub fn overview(&self) -> String {
        format!(
            "A {} business developing {}. MVP: {}. Impact: {}.",
            self.field("industry"),
            self.field("product"),
            self.field("minimum_viable_product"),
            self.field("business_impact"),
        )
    }
}

/// Renders a JSON value as display text: strings as-is, other values as pretty JSON.
/// Returns `None` for absent, null and empty values.
pub fn render_section(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(Cow::Borrowed(s.as_str())),
        Some(other) => serde_json::to_string_pretty(other).ok().map(Cow::Owned),
    }
}

/// Body of the endpoints that work from an existing project context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductBriefRequest {
    pub context: ProjectContext,
    #[serde(default)]
    pub website_overview: String,
}

impl ProductBriefRequest {
    /// Rejects an empty context: every prompt built from it would be all placeholders.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.context.0.is_empty() {
            return Err(AnalysisError::InvalidRequest(
                "Missing required field: context".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of `/prompt_to_json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub json_analysis: ProjectContext,
    pub website_overview: String,
}

/// The one-page project brief.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductBrief {
    #[serde(default)]
    pub problem_statement: Option<Value>,
    #[serde(default)]
    pub target_audience: Option<Value>,
    #[serde(default)]
    pub why_it_matters: Option<Value>,
    #[serde(default)]
    pub proposed_solution: Option<Value>,
    #[serde(default)]
    pub success_criteria: Option<Value>,
    #[serde(default)]
    pub risks_and_considerations: Option<Value>,
    #[serde(default)]
    pub next_steps: Option<Value>,
    #[serde(default)]
    pub additional_notes: Option<Value>,
}

impl ProductBrief {
    pub fn sections(&self) -> [(&'static str, Option<&Value>); 8] {
        [
            ("Problem Statement", self.problem_statement.as_ref()),
            ("Target Audience", self.target_audience.as_ref()),
            ("Why It Matters", self.why_it_matters.as_ref()),
            ("Proposed Solution", self.proposed_solution.as_ref()),
            ("Success Criteria", self.success_criteria.as_ref()),
            (
                "Risks and Considerations",
                self.risks_and_considerations.as_ref(),
            ),
            ("Next Steps", self.next_steps.as_ref()),
            ("Additional Notes", self.additional_notes.as_ref()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    #[serde(default)]
    pub market_overview: Option<Value>,
    #[serde(default)]
    pub target_market: Option<Value>,
    #[serde(default)]
    pub competitive_landscape: Option<Value>,
    #[serde(default)]
    pub opportunities_and_threats: Option<Value>,
    #[serde(default)]
    pub differentiation: Option<Value>,
}

impl MarketAnalysis {
    pub fn sections(&self) -> [(&'static str, Option<&Value>); 5] {
        [
            ("Market Overview", self.market_overview.as_ref()),
            ("Target Market", self.target_market.as_ref()),
            ("Competitive Landscape", self.competitive_landscape.as_ref()),
            (
                "Opportunities and Threats",
                self.opportunities_and_threats.as_ref(),
            ),
            ("Differentiation", self.differentiation.as_ref()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub market_position: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveLandscape {
    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

/// Result of `/analyze_competition`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorAnalysis {
    #[serde(default)]
    pub competitive_analysis: CompetitiveLandscape,
    #[serde(default)]
    pub mermaid_diagram: String,
}

/// Result of `/generate_tech_stack`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechStack {
    pub technical_details: String,
    #[serde(default)]
    pub mermaid_diagram: String,
}

/// Result of `/complete_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteAnalysis {
    pub analysis: ProjectAnalysis,
    pub product_brief: ProductBrief,
}

/// Body of `POST /report`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
    pub product_brief: ProductBrief,
    #[serde(default)]
    pub market_analysis: Option<MarketAnalysis>,
    #[serde(default)]
    pub tech_stack: Option<TechStack>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_idea_is_invalid() {
        let request: AnalyzeRequest = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            request.validated_idea(),
            Err(AnalysisError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_blank_idea_is_invalid() {
        let request: AnalyzeRequest = serde_json::from_value(json!({"idea": " \n\t "})).unwrap();
        assert!(request.validated_idea().is_err());
    }

    #[test]
    fn test_description_alias() {
        let request: AnalyzeRequest =
            serde_json::from_value(json!({"description": "Dog walking app"})).unwrap();
        assert_eq!(request.validated_idea().unwrap(), "Dog walking app");
    }

    #[test]
    fn test_blank_target_market_is_ignored() {
        let request: AnalyzeRequest =
            serde_json::from_value(json!({"idea": "x", "target_market": "  "})).unwrap();
        assert_eq!(request.target_market(), None);
    }

    #[test]
    fn test_project_details_lists_missing_fields() {
        let details = ProjectDetails {
            website: "https://example.com".into(),
            ..Default::default()
        };
        let err = details.validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: domain, problem");

        let details = ProjectDetails {
            domain: "Retail".into(),
            problem: "Stock-outs".into(),
            ..Default::default()
        };
        assert!(details.validate().is_ok());
    }

    #[test]
    fn test_brief_request_requires_context() {
        assert!(serde_json::from_value::<ProductBriefRequest>(json!({})).is_err());

        let request: ProductBriefRequest = serde_json::from_value(json!({"context": {}})).unwrap();
        let err = request.validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: context");

        let request: ProductBriefRequest =
            serde_json::from_value(json!({"context": {"industry": "Retail"}})).unwrap();
        assert_eq!(request.website_overview, "");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_context_fields_and_overview() {
        let context: ProjectContext = serde_json::from_value(json!({
            "industry": "Logistics",
            "product": "route planner",
            "minimum_viable_product": "",
            "business_impact": null,
            "extra": ["a", "b"]
        }))
        .unwrap();

        assert_eq!(context.field("industry"), "Logistics");
        assert_eq!(context.field("minimum_viable_product"), MISSING_FIELD);
        assert_eq!(context.field("business_impact"), MISSING_FIELD);
        assert_eq!(context.field("missing"), MISSING_FIELD);
        assert!(context.field("extra").contains("\"a\""));
        assert_eq!(
            context.overview(),
            "A Logistics business developing route planner. MVP: N/A. Impact: N/A."
        );
    }

    #[test]
    fn test_product_brief_tolerates_partial_output() {
        let brief: ProductBrief = serde_json::from_value(json!({
            "problem_statement": "Late deliveries",
            "next_steps": ["hire", "build"]
        }))
        .unwrap();

        let sections = brief.sections();
        assert_eq!(sections[0].0, "Problem Statement");
        assert!(sections[0].1.is_some());
        assert!(sections[1].1.is_none());
        assert!(sections[6].1.unwrap().is_array());
    }
}
