use url::Url;

pub const OUTPUT_EXTENSION: &str = ".md";

/// Output filename for a URL: `{host}_{path with separators as '_'}.md`.
///
/// Query strings and fragments are not part of the name, so URLs that differ
/// only there map to the same file.
pub fn derive_output_filename(url: &str) -> String {
    let stem = match Url::parse(url) {
        Ok(parsed) if parsed.host_str().is_some() => url_stem(&parsed),
        _ => sanitize(url),
    };
    let mut name = if stem.is_empty() {
        "untitled".to_string()
    } else {
        stem
    };
    if !name.ends_with(OUTPUT_EXTENSION) {
        name.push_str(OUTPUT_EXTENSION);
    }
    name
}

fn url_stem(url: &Url) -> String {
    let mut host = url.host_str().unwrap_or_default().to_string();
    if let Some(port) = url.port() {
        host.push('_');
        host.push_str(&port.to_string());
    }
    let path = url.path().strip_prefix('/').unwrap_or(url.path());
    sanitize(&format!("{host}_{path}"))
}

fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}
