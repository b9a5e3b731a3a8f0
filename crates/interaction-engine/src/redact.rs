//! Post-signal redaction: query strings and fragments never leave the engine.

pub fn url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => format!(
            "{}://{}{}",
            parsed.scheme(),
            parsed.host_str().unwrap_or(""),
            parsed.path()
        ),
        Err(_) => raw.to_string(),
    }
}

pub fn title(raw: &str, max_len: usize) -> String {
    if raw.chars().count() > max_len {
        let mut trimmed: String = raw.chars().take(max_len).collect();
        trimmed.push('…');
        trimmed
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_drops_query_and_fragment() {
        assert_eq!(
            url("https://example.com/checkout?token=secret#step2"),
            "https://example.com/checkout"
        );
    }

    #[test]
    fn title_truncates_long_text() {
        let long = "x".repeat(200);
        let out = title(&long, 128);
        assert_eq!(out.chars().count(), 129);
        assert!(out.ends_with('…'));
    }
}
