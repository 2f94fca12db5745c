use scraper::{Html, Selector};

/// Picks the part of a page worth rendering: the first `<article>`, else
/// `<body>`, else the whole document.
pub fn main_content_html(html: &str) -> String {
    let doc = Html::parse_document(html);
    ["article", "body"]
        .iter()
        .filter_map(|tag| Selector::parse(tag).ok())
        .find_map(|sel| doc.select(&sel).next().map(|node| node.inner_html()))
        .unwrap_or_else(|| doc.root_element().html())
}

#[cfg(test)]
mod tests {
    use super::main_content_html;

    #[test]
    fn article_wins_over_body() {
        let html = "<html><body><nav>menu</nav><article><p>story</p></article></body></html>";
        let content = main_content_html(html);
        assert!(content.contains("story"));
        assert!(!content.contains("menu"));
    }

    #[test]
    fn body_is_used_without_article() {
        let html = "<html><head><title>t</title></head><body><p>text</p></body></html>";
        let content = main_content_html(html);
        assert!(content.contains("<p>text</p>"));
        assert!(!content.contains("<title>"));
    }
}
