use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;

fn body_regex() -> &'static Regex {
    static BODY: OnceLock<Regex> = OnceLock::new();
    BODY.get_or_init(|| {
        Regex::new(r"(?is)<body(?:\s[^>]*)?>(.*?)(?:</body\s*>|\z)")
            .expect("body regex is valid")
    })
}

/// Inner HTML of the document's `<body>`, trimmed. Documents without a body
/// element are returned whole.
pub fn extract_body(html: &str) -> String {
    body_regex()
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .unwrap_or(html)
        .trim()
        .to_string()
}

/// Plain-text rendering for terminal output, with blank runs collapsed.
pub fn html_to_text(html: &str, width: usize) -> Result<String> {
    let text = html2text::from_read(html.as_bytes(), width)
        .map_err(|e| anyhow::anyhow!("Failed to convert HTML to text: {}", e))?;

    let mut cleaned = Vec::new();
    let mut previous_blank = true;
    for line in text.lines().map(str::trim_end) {
        let blank = line.trim().is_empty();
        if !(blank && previous_blank) {
            cleaned.push(line);
        }
        previous_blank = blank;
    }
    Ok(cleaned.join("\n").trim_end().to_string())
}
