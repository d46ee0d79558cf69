//! Citation labels for source URLs.

use lp_core::Citation;
use url::Url;

/// Turns source URLs into `{text: domain, url}` citations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CitationFormatter;

impl CitationFormatter {
    /// Citations for every URL that has a host; the rest are dropped.
    pub fn format<I, S>(&self, urls: I) -> Vec<Citation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>
    {
        self.partition(urls).0
    }

    /// Citations plus the inputs that were skipped, so callers can report
    /// them.
    pub fn partition<I, S>(&self, urls: I) -> (Vec<Citation>, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>
    {
        let mut citations = Vec::new();
        let mut skipped = Vec::new();
        for raw in urls {
            let raw = raw.as_ref();
            match domain_of(raw) {
                Some(text) => citations.push(Citation {
                    text,
                    url: raw.to_string()
                }),
                None => skipped.push(raw.to_string())
            }
        }
        (citations, skipped)
    }
}

/// Host of `raw` without a leading `www.`.
pub fn domain_of(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        return None;
    }
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_urls_are_skipped() {
        let citations =
            CitationFormatter.format(["https://www.example.com/a", "not a url"]);
        assert_eq!(
            citations,
            vec![Citation {
                text: "example.com".to_string(),
                url: "https://www.example.com/a".to_string()
            }]
        );
    }

    #[test]
    fn test_partition_reports_skipped() {
        let (citations, skipped) = CitationFormatter.partition(vec![
            "https://docs.rs/regex".to_string(),
            "mailto:someone@example.com".to_string(),
            String::new(),
        ]);
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].text, "docs.rs");
        assert_eq!(skipped, vec!["mailto:someone@example.com", ""]);
    }

    #[test]
    fn test_only_leading_www_is_stripped() {
        assert_eq!(
            domain_of("http://news.www.example.org/x").as_deref(),
            Some("news.www.example.org")
        );
        assert_eq!(domain_of("https://WWW.Example.com").as_deref(), Some("example.com"));
    }
}
