//! Query tier templates and their expansion into search queries

use crate::config::types::QueryTier;
use crate::state::ReportType;

/// Placeholders a tier template may contain
pub const PLACEHOLDERS: [&str; 3] = ["{company}", "{company_slug}", "{year}"];

/// The seven built-in tiers, most specific first
///
/// The three annual-report tiers are strict; the sustainability and financial
/// fallbacks are accepted on extraction success alone.
pub fn default_tiers() -> Vec<QueryTier> {
    let tier = |template: &str, report_type: ReportType, strict: bool| QueryTier {
        template: template.to_string(),
        report_type,
        strict,
    };

    vec![
        tier(
            r#"site:{company_slug}.com filetype:pdf "annual report" {year}"#,
            ReportType::Annual,
            true,
        ),
        tier(
            r#""{company}" "annual report" {year} filetype:pdf"#,
            ReportType::Annual,
            true,
        ),
        tier(
            r#""{company}" "form 10-k" {year} filetype:pdf"#,
            ReportType::Annual,
            true,
        ),
        tier(
            r#""{company}" "sustainability report" {year} filetype:pdf"#,
            ReportType::Sustainability,
            false,
        ),
        tier(
            r#""{company}" "ESG report" {year} filetype:pdf"#,
            ReportType::Sustainability,
            false,
        ),
        tier(
            r#""{company}" "financial statements" {year} filetype:pdf"#,
            ReportType::Financial,
            false,
        ),
        tier(
            r#""{company}" "financial report" {year} filetype:pdf"#,
            ReportType::Financial,
            false,
        ),
    ]
}

/// Lowercases a company name and drops its whitespace, for `site:` queries
pub fn company_slug(company: &str) -> String {
    company
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl QueryTier {
    /// Expands this tier's template for one company
    pub fn render(&self, company: &str, year: u32) -> String {
        self.template
            .replace("{company_slug}", &company_slug(company))
            .replace("{company}", company.trim())
            .replace("{year}", &year.to_string())
    }
}

/// Returns any `{...}` placeholder in the template that is not supported
pub fn unknown_placeholders(template: &str) -> Vec<String> {
    let mut unknown = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let after = &rest[start..];
        match after.find('}') {
            Some(end) => {
                let placeholder = &after[..=end];
                if !PLACEHOLDERS.contains(&placeholder) {
                    unknown.push(placeholder.to_string());
                }
                rest = &after[end + 1..];
            }
            None => {
                unknown.push(after.to_string());
                break;
            }
        }
    }

    unknown
}
