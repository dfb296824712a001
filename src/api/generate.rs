// HTML snippet generator
//
// Returns a deterministic placeholder until a model backend is wired in.

use super::request::ApiRequest;
use super::response::Reply;
use super::types::{GenerateRequest, GeneratedSnippet};
use crate::error::ApiError;

const DEFAULT_SECTION: &str = "page";
const EMPTY_PROMPT_HEADING: &str = "New Section";
const PLACEHOLDER_CSS: &str =
    ".generated{padding:2rem;border:1px dashed #999;border-radius:8px;font-family:system-ui,sans-serif}";

/// `POST /api/generate-html {prompt, section}`
pub fn generate_html(req: &ApiRequest) -> Result<Reply, ApiError> {
    let GenerateRequest { prompt, section } = req.json()?;
    let snippet = placeholder_snippet(
        prompt.as_deref().unwrap_or_default(),
        section.as_deref().unwrap_or(DEFAULT_SECTION),
    );
    Reply::ok(snippet)
}

pub fn placeholder_snippet(prompt: &str, section: &str) -> GeneratedSnippet {
    let heading = if prompt.is_empty() {
        EMPTY_PROMPT_HEADING.to_string()
    } else {
        escape_html(prompt)
    };

    let html = format!(
        "<!-- generated:{} -->\n<section class=\"generated\">\n  <h2>{heading}</h2>\n  <p>Placeholder content.</p>\n</section>",
        comment_label(section)
    );

    GeneratedSnippet {
        html,
        css: PLACEHOLDER_CSS.to_string(),
        js: String::new(),
    }
}

/// Escape text for an HTML element body or attribute value
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Section name safe inside `<!-- -->`: `[A-Za-z0-9_-]`, no `--` runs
fn comment_label(section: &str) -> String {
    let mut label = String::with_capacity(section.len());
    for c in section.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' };
        if c == '-' && label.ends_with('-') {
            continue;
        }
        label.push(c);
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_escaped() {
        let snippet = placeholder_snippet("<script>", "hero");
        assert!(snippet.html.contains("&lt;script&gt;"));
        assert!(!snippet.html.contains("<script>"));
        assert!(snippet.html.starts_with("<!-- generated:hero -->"));
        assert!(snippet.html.contains("<section"));
        assert!(snippet.js.is_empty());
        assert_eq!(snippet.css, PLACEHOLDER_CSS);
    }

    #[test]
    fn test_empty_prompt_uses_default_heading() {
        let snippet = placeholder_snippet("", DEFAULT_SECTION);
        assert!(snippet.html.contains("<h2>New Section</h2>"));
        assert!(snippet.html.contains("generated:page"));
    }

    #[test]
    fn test_output_is_deterministic() {
        assert_eq!(
            placeholder_snippet("Pricing table", "pricing"),
            placeholder_snippet("Pricing table", "pricing")
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a & "b" <'c'>"#), "a &amp; &quot;b&quot; &lt;&#39;c&#39;&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_section_cannot_close_comment() {
        let snippet = placeholder_snippet("x", "a --> <b>");
        assert!(snippet.html.starts_with("<!-- generated:a-b- -->"));
    }
}
