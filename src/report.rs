//! Markdown export of a generated project report.
use serde_json::Value;
use std::fmt::Write as _;

use crate::models::{ReportRequest, render_section};

const NOT_AVAILABLE: &str = "Not available";

fn push_sections<'a>(
    out: &mut String,
    sections: impl IntoIterator<Item = (&'static str, Option<&'a Value>)>,
) {
    for (title, value) in sections {
        let content = render_section(value);
        let _ = write!(
            out,
            "### {title}\n{}\n\n",
            content.as_deref().unwrap_or(NOT_AVAILABLE)
        );
    }
}

/// Renders the brief, and the market analysis and tech stack when present, as markdown.
pub fn render(request: &ReportRequest) -> String {
    let mut out = String::from("# Complete Project Report\n\n## Project Brief\n");
    push_sections(&mut out, request.product_brief.sections());

    if let Some(market) = &request.market_analysis {
        out.push_str("## Market & Competitor Analysis\n");
        push_sections(&mut out, market.sections());
    }

    if let Some(stack) = &request.tech_stack {
        out.push_str("## Technical Implementation Details\n");
        let _ = write!(out, "{}\n\n", stack.technical_details.trim_end());
        if !stack.mermaid_diagram.trim().is_empty() {
            let _ = write!(
                out,
                "### System Diagram\n```mermaid\n{}\n```\n\n",
                stack.mermaid_diagram.trim_end()
            );
        }
    }

    out
}
