//! `emoji:name[]` inline macro and emoji fetching.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use adeck_asciidoc::InlineMacro;
use adeck_cache::{CacheBucket, CacheBucketExt};
use indexmap::IndexMap;
use ureq::Agent;

use super::emoji_table::codepoint;

/// Error fetching an emoji image.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("response is not an SVG image")]
    NotSvg,
}

/// Where emoji images come from when they are not cached.
pub trait EmojiSource: Send + Sync {
    /// SVG markup for the emoji with the given code point.
    fn fetch(&self, codepoint: &str) -> Result<String, FetchError>;
}

/// Fetches Twemoji SVGs from a CDN: `{base_url}/{codepoint}.svg`.
pub struct CdnEmojiSource {
    agent: Agent,
    base_url: String,
}

impl CdnEmojiSource {
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            agent: adeck_diagrams::create_agent(timeout),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

impl EmojiSource for CdnEmojiSource {
    fn fetch(&self, codepoint: &str) -> Result<String, FetchError> {
        let url = format!("{}/{codepoint}.svg", self.base_url);
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        let status = response.status().as_u16();
        if status >= 400 {
            return Err(FetchError::Status(status));
        }
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        if !body.contains("<svg") {
            return Err(FetchError::NotSvg);
        }
        Ok(body)
    }
}

/// Fetches one emoji at most once per build.
///
/// The cache is consulted first; the source is only hit on a miss and a
/// successful download is written back.
#[derive(Debug)]
pub struct EmojiFetcher {
    name: String,
    codepoint: &'static str,
    cache_key: String,
    svg: OnceLock<Option<String>>,
}

impl EmojiFetcher {
    fn new(name: &str, codepoint: &'static str) -> Self {
        Self {
            name: name.to_owned(),
            codepoint,
            cache_key: format!("{name}.svg"),
            svg: OnceLock::new(),
        }
    }

    /// SVG markup of the emoji, `None` when it could not be fetched.
    pub fn fetch(&self, bucket: &dyn CacheBucket, source: &dyn EmojiSource) -> Option<&str> {
        self.svg
            .get_or_init(|| {
                if let Some(svg) = bucket.get_string(&self.cache_key) {
                    tracing::debug!(emoji = %self.name, "Emoji cache hit");
                    return Some(svg);
                }
                match source.fetch(self.codepoint) {
                    Ok(svg) => {
                        bucket.set_string(&self.cache_key, &svg);
                        Some(svg)
                    }
                    Err(e) => {
                        tracing::warn!(emoji = %self.name, error = %e, "Failed to fetch emoji");
                        None
                    }
                }
            })
            .as_deref()
    }
}

/// An emoji used by the deck.
#[derive(Debug, Clone)]
pub struct EmojiEntry {
    pub name: String,
    /// File name in the `emojis` cache bucket.
    pub cache_key: String,
    pub css_class: String,
    pub fetcher: Arc<EmojiFetcher>,
}

/// Handles `emoji:name[]`.
#[derive(Debug, Default)]
pub struct EmojiMacro {
    emojis: IndexMap<String, EmojiEntry>,
}

impl EmojiMacro {
    /// Emojis encountered so far, in first-use order.
    pub fn into_emojis(self) -> IndexMap<String, EmojiEntry> {
        self.emojis
    }
}

impl InlineMacro for EmojiMacro {
    fn name(&self) -> &str {
        "emoji"
    }

    fn process(&mut self, target: &str, _attributes: &str) -> Option<String> {
        let Some(codepoint) = codepoint(target) else {
            tracing::error!(emoji = %target, "Unknown emoji");
            return Some(format!(":{}:", html_escape::encode_text(target)));
        };
        self.emojis.entry(target.to_owned()).or_insert_with(|| {
            let fetcher = EmojiFetcher::new(target, codepoint);
            EmojiEntry {
                name: target.to_owned(),
                cache_key: fetcher.cache_key.clone(),
                css_class: css_class(target),
                fetcher: Arc::new(fetcher),
            }
        });
        Some(format!(
            "<img class=\"emoji-placeholder\" data-emoji=\"{}\">",
            html_escape::encode_double_quoted_attribute(target)
        ))
    }
}

fn css_class(name: &str) -> String {
    let mut class = String::from("emoji-");
    for c in name.chars() {
        match c {
            '+' => class.push_str("plus"),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => class.push(c),
            _ => class.push('_'),
        }
    }
    class
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use adeck_cache::NullCacheBucket;
    use pretty_assertions::assert_eq;

    use super::*;

    struct Counting {
        calls: AtomicUsize,
    }

    impl EmojiSource for Counting {
        fn fetch(&self, codepoint: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if codepoint == "274c" {
                return Err(FetchError::Status(404));
            }
            Ok(format!("<svg id=\"{codepoint}\"></svg>"))
        }
    }

    #[test]
    fn test_known_emoji_is_registered_once() {
        let mut handler = EmojiMacro::default();
        let first = handler.process("rocket", "").unwrap();
        let second = handler.process("rocket", "").unwrap();

        assert_eq!(first, "<img class=\"emoji-placeholder\" data-emoji=\"rocket\">");
        assert_eq!(first, second);
        let emojis = handler.into_emojis();
        assert_eq!(emojis.len(), 1);
        let entry = &emojis["rocket"];
        assert_eq!(entry.cache_key, "rocket.svg");
        assert_eq!(entry.css_class, "emoji-rocket");
    }

    #[test]
    fn test_unknown_emoji_stays_text() {
        let mut handler = EmojiMacro::default();
        assert_eq!(handler.process("nope", "").as_deref(), Some(":nope:"));
        assert!(handler.into_emojis().is_empty());
    }

    #[test]
    fn test_css_class_sanitizes() {
        assert_eq!(css_class("+1"), "emoji-plus1");
        assert_eq!(css_class("-1"), "emoji--1");
    }

    #[test]
    fn test_fetcher_fetches_at_most_once() {
        let source = Counting {
            calls: AtomicUsize::new(0),
        };
        let fetcher = EmojiFetcher::new("rocket", "1f680");
        let bucket = NullCacheBucket;

        assert_eq!(fetcher.fetch(&bucket, &source), Some("<svg id=\"1f680\"></svg>"));
        assert_eq!(fetcher.fetch(&bucket, &source), Some("<svg id=\"1f680\"></svg>"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_fetch_is_remembered() {
        let source = Counting {
            calls: AtomicUsize::new(0),
        };
        let fetcher = EmojiFetcher::new("x", "274c");
        let bucket = NullCacheBucket;

        assert_eq!(fetcher.fetch(&bucket, &source), None);
        assert_eq!(fetcher.fetch(&bucket, &source), None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
