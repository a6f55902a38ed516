//! Form-style percent decoding.

/// Percent-decode `input`, treating `+` as a space.
///
/// Malformed escapes are kept verbatim.
pub(crate) fn url_decode(input: &str) -> Vec<u8> {
    let spaced = input.replace('+', " ");
    urlencoding::decode_binary(spaced.as_bytes()).into_owned()
}

/// Interpret bytes as UTF-8, falling back to Latin-1 when they are
/// not valid UTF-8. Unlike a lossy conversion no byte is discarded.
pub(crate) fn utf8_or_latin1(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(string) => string,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}
