//! The browser form, compiled into the binary.
use axum::response::{Html, IntoResponse};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// GET / - Serve the idea form.
pub async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_posts_to_analyze() {
        assert!(INDEX_HTML.contains(r#"id="analyze-form""#));
        assert!(INDEX_HTML.contains(r#"postJson("/analyze""#));
        assert!(INDEX_HTML.contains(r#"postJson("/complete_analysis""#));
    }

    #[test]
    fn test_followups_reach_every_context_endpoint() {
        for path in [
            "/generate_market_competitor_analysis",
            "/analyze_competition",
            "/generate_tech_stack",
        ] {
            assert!(
                INDEX_HTML.contains(&format!(r#""{path}""#)),
                "page never calls {path}"
            );
        }
        assert!(INDEX_HTML.contains(r#"context: session.brief"#));
        assert!(INDEX_HTML.contains(r#"renderDiagram(container, data.mermaid_diagram)"#));
    }

    #[test]
    fn test_report_is_offered_as_download() {
        assert!(INDEX_HTML.contains(r#"postText("/report""#));
        assert!(INDEX_HTML.contains(r#"link.download = "complete_project_report.md""#));
    }

    #[test]
    fn test_blank_idea_is_checked_before_sending() {
        let check = INDEX_HTML
            .find(r#"idea.trim() === """#)
            .expect("blank check present");
        let send = INDEX_HTML
            .find(r#"postJson("/analyze""#)
            .expect("request present");
        assert!(check < send, "blank check must run before the request");
    }
}
