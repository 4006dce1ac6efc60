//! Prompt templates sent to the completion service
//!
//! Each template embeds the caller's text verbatim. Templates for structured endpoints spell out
//! the JSON object the model must return; the response sanitizer pulls that object back out.
use crate::models::{AnalyzeRequest, ProductBriefRequest, ProjectDetails};

/// Persona used for the competitor analysis prompt.
pub const COMPETITION_SYSTEM_PROMPT: &str =
    "You are a market research expert conducting competitive analysis.";

pub fn idea_analysis(idea: &str, target_market: Option<&str>) -> String {
    let market = match target_market {
        Some(market) => format!("\nTarget market: {market}\n"),
        None => String::new(),
    };

    format!(
        "Analyze the following business idea.\n\
         \n\
         Business idea:\n\
         {idea}\n\
         {market}\n\
         Cover the following points:\n\
         - Summary: what the business does and for whom.\n\
         - Market potential: size, trends and growth.\n\
         - Competition: existing alternatives and how this idea differs.\n\
         - Risks: the main challenges and how to mitigate them.\n\
         - Next steps: concrete actions to validate the idea.\n\
         \n\
         Keep the analysis concise and practical."
    )
}

/// Prompt for `/analyze`.
pub fn analyze(request: &AnalyzeRequest, idea: &str) -> String {
    idea_analysis(idea, request.target_market())
}

/// Prompt for `/prompt_to_json`.
pub fn project_json(details: &ProjectDetails) -> String {
    format!(
        r#"Analyze this business project and provide a concise JSON response:
- Domain: {domain}
- Problem: {problem}
- Website: {website}
- MVP: {mvp}

Return only a JSON object with these keys:
{{
    "industry": "industry category",
    "product": "product type",
    "website": "website URL",
    "minimum_viable_product": "MVP description",
    "business_impact": "expected impact"
}}"#,
        domain = details.domain,
        problem = details.problem,
        website = details.website,
        mvp = details.mvp,
    )
}

/// Prompt for `/generate_product_brief`.
pub fn product_brief(request: &ProductBriefRequest) -> String {
    let context = &request.context;
    format!(
        r#"Create a concise product brief based on this context:

Industry: {industry}
Product: {product}
Website: {website}
MVP: {mvp}
Impact: {impact}

Additional Context: {overview}

Provide a JSON response with these keys:
{{
    "problem_statement": "Brief description of problem and impact",
    "target_audience": "Core user base",
    "why_it_matters": "Key importance and alignment",
    "proposed_solution": "Core solution and features",
    "success_criteria": "Key success metrics",
    "risks_and_considerations": "Main challenges",
    "next_steps": "Immediate actions",
    "additional_notes": "Key information for teams"
}}
Keep each section concise and focused on essential information."#,
        industry = context.field("industry"),
        product = context.field("product"),
        website = context.field("website"),
        mvp = context.field("minimum_viable_product"),
        impact = context.field("business_impact"),
        overview = request.website_overview,
    )
}

/// Prompt for `/generate_tech_stack`.
pub fn tech_stack(request: &ProductBriefRequest) -> String {
    let context = &request.context;
    format!(
        r#"Based on the following product brief, provide a detailed technical implementation plan.

Industry: {industry}
Product: {product}
MVP: {mvp}
Proposed Solution: {solution}

Your explanation should include:

- **Frontend Technologies**: List and explain the frontend technologies to be used.
- **Backend Technologies**: List and explain the backend technologies to be used.
- **Cloud Infrastructure**: Describe the cloud services and infrastructure components.
- **AI/ML Components**: Detail the AI/ML frameworks and tools to be used.
- **Database**: Specify the type of database and justification.
- **APIs and Integration**: Explain how different components will communicate.
- **Security Measures**: Outline security practices and tools.

Present the information in markdown format with headings and bullet points under each category.

Additionally, provide a system diagram in Mermaid syntax that illustrates the architecture. **Ensure the diagram uses 'graph LR' to set the layout direction from left to right (horizontal).**

Return **only** a JSON object with the following structure, and ensure it is valid JSON:

```json
{{
    "technical_details": "Your detailed explanation here in markdown format.",
    "mermaid_diagram": "Your Mermaid syntax diagram here."
}}
```

Do not include any additional text or explanations outside the JSON object."#,
        industry = context.field("industry"),
        product = context.field("product"),
        mvp = context.field("minimum_viable_product"),
        solution = context.field("proposed_solution"),
    )
}

/// Prompt for `/generate_market_competitor_analysis`.
pub fn market_analysis(request: &ProductBriefRequest) -> String {
    let context = &request.context;
    format!(
        r#"Based on the following product brief, provide a detailed market and competitor analysis:

Industry: {industry}
Product: {product}
MVP: {mvp}
Proposed Solution: {solution}

Your analysis should include:

- Market Overview: Size, trends, and growth potential.
- Target Market: Specific segments and demographics.
- Competitive Landscape: Key competitors, their strengths and weaknesses.
- Opportunities and Threats: Market gaps and potential challenges.
- Differentiation: How this product stands out from competitors.

Provide the response in a structured JSON format with the following keys:

{{
    "market_overview": "...",
    "target_market": "...",
    "competitive_landscape": "...",
    "opportunities_and_threats": "...",
    "differentiation": "..."
}}"#,
        industry = context.field("industry"),
        product = context.field("product"),
        mvp = context.field("minimum_viable_product"),
        solution = context.field("proposed_solution"),
    )
}

/// Prompt for `/analyze_competition`.
pub fn competition(request: &ProductBriefRequest) -> String {
    let context = &request.context;
    format!(
        r#"Based on the following product brief, provide a detailed competitive analysis.

Industry: {industry}
Product: {product}
MVP Features: {mvp}
Proposed Solution: {solution}

For each major competitor (analyze 3-4 competitors) include:
- Company name
- Main features and offerings
- Key strengths
- Areas for improvement or weaknesses
- Market positioning

Additionally, provide a comparison diagram in Mermaid syntax.

Return only a JSON object with the following structure:
{{
    "competitive_analysis": {{
        "competitors": [
            {{
                "name": "Competitor Name",
                "description": "Brief description",
                "features": ["feature1", "feature2"],
                "strengths": ["strength1", "strength2"],
                "weaknesses": ["weakness1", "weakness2"],
                "market_position": "Description of market position"
            }}
        ]
    }},
    "mermaid_diagram": "graph LR\n    A[Your Product] --> B[Market]\n    B --> C[Competitor1]"
}}"#,
        industry = context.field("industry"),
        product = context.field("product"),
        mvp = context.field("minimum_viable_product"),
        solution = context.field("proposed_solution"),
    )
}
