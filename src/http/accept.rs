/// A single entry of an `Accept`-style header.
#[derive(Clone, Debug, PartialEq)]
pub struct AcceptEntry {
    /// The accepted value, e.g. `text/html` or `en-US`.
    pub value: String,
    /// The `q` parameter, between 0 and 1.
    pub quality: f32,
    /// Any other parameters attached to the entry.
    pub params: Vec<(String, String)>,
}

impl AcceptEntry {
    pub fn new(value: impl Into<String>, quality: f32) -> Self {
        Self {
            value: value.into(),
            quality: if quality.is_nan() {
                0.0
            } else {
                quality.clamp(0.0, 1.0)
            },
            params: Vec::new(),
        }
    }
}

/// Parse a comma separated header list such as `Accept` or
/// `Accept-Language`.
///
/// Entries are ordered by descending quality. Entries with equal
/// quality keep the order in which they appeared. A missing `q`
/// means 1, an unparseable one means 0.
pub fn parse_accept_header(header: &str) -> Vec<AcceptEntry> {
    let mut entries = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let value = pieces.next()?.trim();

            if value.is_empty() {
                return None;
            }

            let mut entry = AcceptEntry::new(value, 1.0);

            for piece in pieces {
                let (name, param) = match piece.split_once('=') {
                    Some((name, param)) => (name.trim(), param.trim()),
                    None => continue,
                };

                if name.eq_ignore_ascii_case("q") {
                    entry.quality = param
                        .parse::<f32>()
                        .ok()
                        .filter(|q| !q.is_nan())
                        .map_or(0.0, |q| q.clamp(0.0, 1.0));
                } else {
                    entry.params.push((name.to_owned(), param.to_owned()));
                }
            }

            Some(entry)
        })
        .collect::<Vec<_>>();

    // `sort_by` is stable
    entries.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    entries
}
