/// Wrap markdown prose at `width` columns.
///
/// Headings, fenced code and lines already within the limit are left alone.
/// Words longer than `width` are never split. List continuation lines are
/// indented under the item text. A width of zero disables wrapping.
pub fn wrap_markdown(markdown: &str, width: usize) -> String {
    if width == 0 {
        return markdown.to_string();
    }

    let mut out = Vec::new();
    let mut in_fence = false;
    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            out.push(line.to_string());
            continue;
        }
        if in_fence || line.starts_with('#') || line.chars().count() <= width {
            out.push(line.to_string());
            continue;
        }
        wrap_line(line, width, &mut out);
    }
    out.join("\n")
}

fn wrap_line(line: &str, width: usize, out: &mut Vec<String>) {
    let indent = continuation_indent(line);
    let lead_len = line.len() - line.trim_start().len();

    let mut current = line[..lead_len].to_string();
    let mut current_len = current.chars().count();
    let mut has_word = false;
    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        if has_word && current_len + 1 + word_len > width {
            out.push(std::mem::take(&mut current));
            current = " ".repeat(indent);
            current_len = indent;
            has_word = false;
        }
        if has_word {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
        has_word = true;
    }
    out.push(current);
}

/// Width of the list marker prefix (`  * `, `- `, `12. `), or the leading whitespace.
fn continuation_indent(line: &str) -> usize {
    let trimmed = line.trim_start();
    let lead = line.len() - trimmed.len();
    let marker = if trimmed.starts_with("* ") || trimmed.starts_with("- ") || trimmed.starts_with("+ ") {
        2
    } else {
        let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
        if digits > 0 && trimmed[digits..].starts_with(". ") {
            digits + 2
        } else {
            0
        }
    };
    lead + marker
}

#[cfg(test)]
mod tests {
    use super::wrap_markdown;

    #[test]
    fn long_paragraph_is_wrapped_at_width() {
        let wrapped = wrap_markdown("one two three four five", 9);
        assert_eq!(wrapped, "one two\nthree\nfour five");
        assert!(wrapped.lines().all(|l| l.chars().count() <= 9));
    }

    #[test]
    fn list_items_indent_continuation() {
        let wrapped = wrap_markdown("  * alpha beta gamma", 12);
        assert_eq!(wrapped, "  * alpha\n    beta\n    gamma");
    }

    #[test]
    fn headings_and_code_fences_are_untouched() {
        let text = "# a very long heading here\n```\nlet some_long_code = line_that_stays();\n```";
        assert_eq!(wrap_markdown(text, 10), text);
    }

    #[test]
    fn oversize_word_stays_whole() {
        assert_eq!(wrap_markdown("a supercalifragilistic b", 5), "a\nsupercalifragilistic\nb");
    }

    #[test]
    fn zero_width_disables_wrapping() {
        let text = "one two three";
        assert_eq!(wrap_markdown(text, 0), text);
    }
}
