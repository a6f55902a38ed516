use super::Request;
use crate::http::{parse_accept_header, AcceptEntry};

use http::header;
use once_cell::unsync::OnceCell;

impl Request {
    /// The entries of the `Accept` header, most preferred first.
    pub fn acceptable_content_types(&self) -> &[AcceptEntry] {
        self.content_types.get_or_init(|| {
            self.header(header::ACCEPT)
                .map(parse_accept_header)
                .unwrap_or_default()
        })
    }

    pub fn set_acceptable_content_types(&mut self, types: Vec<AcceptEntry>) {
        self.content_types = OnceCell::from(types);
    }

    /// The languages of the `Accept-Language` header, most preferred first.
    pub fn acceptable_languages(&self) -> &[String] {
        self.languages.get_or_init(|| {
            self.header(header::ACCEPT_LANGUAGE)
                .map(|value| {
                    parse_accept_header(value)
                        .into_iter()
                        .map(|entry| entry.value)
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    pub fn set_acceptable_languages(&mut self, languages: Vec<String>) {
        self.languages = OnceCell::from(languages);
    }

    /// Pick the candidate language that best matches the acceptable languages.
    ///
    /// Languages match when they are equal, or when one is a prefix of the
    /// other followed by `-` (`en` matches `en-US`), ignoring case and
    /// treating `_` as `-`. If nothing matches, the first candidate is
    /// returned. Without candidates, the configured default language is
    /// returned.
    pub fn preferred_language<'a>(&'a self, candidates: &[&'a str]) -> &'a str {
        let first = match candidates.first() {
            Some(first) => *first,
            None => return &self.app.config().default_language,
        };

        for acceptable in self.acceptable_languages() {
            let acceptable = normalize_language(acceptable);

            for candidate in candidates {
                let normalized = normalize_language(candidate);

                if normalized == acceptable
                    || is_subtag_of(&acceptable, &normalized)
                    || is_subtag_of(&normalized, &acceptable)
                {
                    return *candidate;
                }
            }
        }

        first
    }
}

fn normalize_language(language: &str) -> String {
    language.to_lowercase().replace('_', "-")
}

/// Returns `true` if `tag` starts with `prefix-`.
fn is_subtag_of(tag: &str, prefix: &str) -> bool {
    tag.strip_prefix(prefix)
        .map_or(false, |rest| rest.starts_with('-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtags() {
        assert!(is_subtag_of("en-us", "en"));
        assert!(!is_subtag_of("en", "en"));
        assert!(!is_subtag_of("eng", "en"));
        assert_eq!(normalize_language("zh_Hans_CN"), "zh-hans-cn");
    }
}
