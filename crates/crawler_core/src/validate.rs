use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter at least one URL")]
    NoUrls,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Please select an output directory")]
    NoOutputDir,
}

/// One URL per line; surrounding whitespace and blank lines are dropped.
pub fn parse_urls(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// A crawlable URL needs both a scheme and a host.
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() && !parsed.host_str().unwrap_or_default().is_empty() => {
            Ok(())
        }
        _ => Err(ValidationError::InvalidUrl(url.to_string())),
    }
}

/// Check the raw inputs of a run and return the URL list in input order.
pub fn validate_inputs(raw_urls: &str, output_dir: &str) -> Result<Vec<String>, ValidationError> {
    let urls = parse_urls(raw_urls);
    if urls.is_empty() {
        return Err(ValidationError::NoUrls);
    }
    for url in &urls {
        validate_url(url)?;
    }
    if output_dir.trim().is_empty() {
        return Err(ValidationError::NoOutputDir);
    }
    Ok(urls)
}
