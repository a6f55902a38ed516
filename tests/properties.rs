//! Property tests over token masking, cookie signing and parameter parsing.

mod common;

use common::{get, request, signed};

use portico::http::parse_accept_header;
use portico::security::{HmacSecurity, Security};
use proptest::prelude::*;

fn arb_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,7}").unwrap()
}

fn arb_value() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9._~-]{0,12}").unwrap()
}

proptest! {
    #[test]
    fn masked_tokens_unmask_to_the_original(token in "\\PC{0,64}") {
        let security = HmacSecurity::new();
        let masked = security.mask_token(&token).unwrap();

        prop_assert_eq!(security.unmask_token(&masked), Some(token));
    }

    #[test]
    fn masking_never_repeats(token in "[A-Za-z0-9_-]{16,32}") {
        let security = HmacSecurity::new();
        let a = security.mask_token(&token).unwrap();
        let b = security.mask_token(&token).unwrap();

        prop_assert_ne!(a, b);
    }

    #[test]
    fn tampered_data_never_validates(
        data in "\\PC{1,32}",
        index in any::<prop::sample::Index>(),
    ) {
        let security = HmacSecurity::new();
        let signed = security.hash_data(&data, "key").unwrap();

        let mut bytes = signed.into_bytes();
        // only flip bits of the hex tag so the result stays valid UTF-8
        let at = index.index(64);
        bytes[at] = if bytes[at] == b'0' { b'1' } else { b'0' };
        let tampered = String::from_utf8(bytes).unwrap();

        prop_assert_eq!(security.validate_data(&tampered, "key"), None);
    }

    #[test]
    fn signed_cookies_load(name in arb_name(), value in "\\PC{0,32}") {
        let req = request(get("/").cookie(name.as_str(), signed(&name, &value)));
        let cookies = req.cookies().unwrap();

        prop_assert_eq!(cookies.value(&name), Some(value.as_str()));
    }

    #[test]
    fn last_query_value_wins(pairs in prop::collection::vec((arb_name(), arb_value()), 0..8)) {
        let query = pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&");

        let req = request(get("/").query_string(query));

        for (name, _) in &pairs {
            let last = pairs
                .iter()
                .rev()
                .find(|(other, _)| other == name)
                .map(|(_, value)| value.as_str());

            prop_assert_eq!(req.query_param(name), last);
        }

        prop_assert!(std::ptr::eq(req.query_params(), req.query_params()));
    }

    #[test]
    fn accept_entries_are_ordered(
        entries in prop::collection::vec((arb_name(), 0u16..=1000), 0..8),
    ) {
        let header = entries
            .iter()
            .map(|(value, q)| format!("{};q={}", value, *q as f32 / 1000.0))
            .collect::<Vec<_>>()
            .join(", ");

        let parsed = parse_accept_header(&header);
        prop_assert_eq!(parsed.len(), entries.len());

        for pair in parsed.windows(2) {
            prop_assert!(pair[0].quality >= pair[1].quality);
        }

        for entry in &parsed {
            prop_assert!((0.0..=1.0).contains(&entry.quality));
        }
    }
}
