use crate::config::tiers::unknown_placeholders;
use crate::config::types::{Config, EngineConfig, OutputConfig, QueryTier, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Every check here runs before any request is issued; a configuration error
/// is the only condition that aborts a run.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_search_config(&config.search)?;
    validate_output_config(&config.output)?;
    validate_companies(&config.companies)?;
    validate_tiers(&config.tiers)?;
    Ok(())
}

/// Validates engine configuration
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.max_concurrent_companies < 1 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_companies must be >= 1, got {}",
            config.max_concurrent_companies
        )));
    }

    if config.min_text_length < 1 {
        return Err(ConfigError::Validation(
            "min_text_length must be >= 1".to_string(),
        ));
    }

    if config.preview_pages < 1 {
        return Err(ConfigError::Validation(
            "preview_pages must be >= 1".to_string(),
        ));
    }

    if config.classification_prefix_chars < 1 {
        return Err(ConfigError::Validation(
            "classification_prefix_chars must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 || config.probe_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got request={}s probe={}s",
            config.request_timeout_secs, config.probe_timeout_secs
        )));
    }

    Ok(())
}

/// Validates the search endpoint and header values
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search url '{}': {}", config.url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Search url '{}' must use http or https",
            config.url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("user_agent", &config.user_agent),
        ("accept", &config.accept),
        ("accept_language", &config.accept_language),
        ("referer", &config.referer),
    ] {
        if !is_header_safe(value) {
            return Err(ConfigError::Validation(format!(
                "{} contains characters not allowed in an HTTP header",
                name
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("database_path", &config.database_path),
        ("results_path", &config.results_path),
        ("summary_path", &config.summary_path),
        ("audit_log_path", &config.audit_log_path),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates company names
fn validate_companies(companies: &[String]) -> Result<(), ConfigError> {
    if let Some(position) = companies.iter().position(|c| c.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "company #{} has an empty name",
            position + 1
        )));
    }
    Ok(())
}

/// Validates the ordered query tiers
fn validate_tiers(tiers: &[QueryTier]) -> Result<(), ConfigError> {
    if tiers.is_empty() {
        return Err(ConfigError::Validation(
            "at least one query tier is required".to_string(),
        ));
    }

    for (index, tier) in tiers.iter().enumerate() {
        if tier.template.trim().is_empty() {
            return Err(ConfigError::InvalidTemplate(format!(
                "tier {} has an empty template",
                index + 1
            )));
        }

        if !tier.template.contains("{company}") && !tier.template.contains("{company_slug}") {
            return Err(ConfigError::InvalidTemplate(format!(
                "tier {} template '{}' does not reference the company",
                index + 1,
                tier.template
            )));
        }

        let unknown = unknown_placeholders(&tier.template);
        if !unknown.is_empty() {
            return Err(ConfigError::InvalidTemplate(format!(
                "tier {} uses unknown placeholders: {}",
                index + 1,
                unknown.join(", ")
            )));
        }
    }

    Ok(())
}

/// Visible ASCII plus spaces and tabs
fn is_header_safe(value: &str) -> bool {
    value.chars().all(|c| c == '\t' || (' '..='~').contains(&c))
}
