//! Icon candidates from a page's `<link>` tags, best first.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

static LINK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<link\b[^>]*>").expect("valid link regex"));

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)([a-z][a-z0-9_:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("valid attribute regex")
});

const ICON_RELS: [&str; 5] = [
    "icon",
    "shortcut icon",
    "apple-touch-icon",
    "apple-touch-icon-precomposed",
    "mask-icon",
];

#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    url: Url,
    score: u32,
}

/// Resolve every icon `<link>` against `base` and order them by declared size
pub fn icon_links(html: &str, base: &Url) -> Vec<Url> {
    let mut candidates: Vec<Candidate> = LINK_TAG
        .find_iter(html)
        .filter_map(|tag| candidate(tag.as_str(), base))
        .collect();

    // Stable: equal scores keep document order
    candidates.sort_by(|a, b| b.score.cmp(&a.score));

    let mut urls: Vec<Url> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !urls.contains(&candidate.url) {
            urls.push(candidate.url);
        }
    }
    urls
}

fn candidate(tag: &str, base: &Url) -> Option<Candidate> {
    let mut rel = None;
    let mut href = None;
    let mut sizes = None;

    for caps in ATTRIBUTE.captures_iter(tag) {
        let name = caps.get(1)?.as_str().to_ascii_lowercase();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .unwrap_or_default();

        match name.as_str() {
            "rel" => rel = Some(value.trim().to_ascii_lowercase()),
            "href" => href = Some(unescape(value.trim())),
            "sizes" => sizes = Some(value.to_ascii_lowercase()),
            _ => {}
        }
    }

    let rel = rel?;
    let rel = rel.split_whitespace().collect::<Vec<_>>().join(" ");
    if !ICON_RELS.contains(&rel.as_str()) {
        return None;
    }

    let href = href.filter(|h| !h.is_empty())?;
    let url = base.join(&href).ok()?;
    if !matches!(url.scheme(), "http" | "https" | "data") {
        return None;
    }

    Some(Candidate {
        url,
        score: score(&rel, sizes.as_deref()),
    })
}

fn score(rel: &str, sizes: Option<&str>) -> u32 {
    let declared = sizes.and_then(|sizes| {
        sizes
            .split_whitespace()
            .filter_map(|size| {
                if size == "any" {
                    return Some(1024);
                }
                let (w, h) = size.split_once('x')?;
                Some(w.parse::<u32>().ok()?.max(h.parse::<u32>().ok()?))
            })
            .max()
    });

    match declared {
        Some(size) => size,
        None if rel.starts_with("apple-touch-icon") => 180,
        // Monochrome pinned-tab masks rarely make a good tile
        None if rel == "mask-icon" => 1,
        None => 16,
    }
}

fn unescape(value: &str) -> String {
    value
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/app/index.html").unwrap()
    }

    #[test]
    fn test_ranked_by_size() {
        let html = r#"
            <head>
              <link rel="stylesheet" href="/style.css">
              <link rel="icon" href="/favicon-16.png" sizes="16x16">
              <LINK REL="apple-touch-icon" HREF="touch.png">
              <link href='/favicon-192.png' rel='icon' sizes='192x192'>
              <link rel="shortcut icon" href="/favicon.ico">
            </head>"#;

        let urls: Vec<String> = icon_links(html, &base()).into_iter().map(|u| u.to_string()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/favicon-192.png",
                "https://example.com/app/touch.png",
                "https://example.com/favicon-16.png",
                "https://example.com/favicon.ico",
            ]
        );
    }

    #[test]
    fn test_protocol_relative_and_entities() {
        let html = r#"<link rel=icon href="//cdn.example.net/i.png?v=1&amp;s=2">"#;
        let urls = icon_links(html, &base());
        assert_eq!(urls[0].as_str(), "https://cdn.example.net/i.png?v=1&s=2");
    }

    #[test]
    fn test_data_uri_kept_and_duplicates_dropped() {
        let html = r#"
            <link rel="icon" href="data:image/svg+xml;base64,PHN2Zz48L3N2Zz4=">
            <link rel="icon" href="/a.png">
            <link rel="icon" href="/a.png">"#;
        let urls = icon_links(html, &base());
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].scheme(), "data");
    }

    #[test]
    fn test_non_icon_links_ignored() {
        let html = r#"<link rel="preload" href="/font.woff2"><link rel="icon" href="">"#;
        assert!(icon_links(html, &base()).is_empty());
    }
}
