//! Public slugs for shared itineraries.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use unicode_normalization::UnicodeNormalization;

/// Lowercase ASCII slug of a name: accents stripped, runs of other characters
/// collapsed into single dashes.
pub(crate) fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.nfkd().filter(char::is_ascii) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    out
}

/// 8 random bytes, base64url without padding.
pub(crate) fn random_token() -> String {
    let bytes: [u8; 8] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// `slugify(name)-token`, or just the token when the name has no usable
/// characters.
pub(crate) fn public_slug(name: &str) -> String {
    let base = slugify(name);
    let token = random_token();
    if base.is_empty() {
        token
    } else {
        format!("{base}-{token}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_strips_accents_and_punctuation() {
        assert_eq!(slugify("Summer in Côte d'Azur!"), "summer-in-cote-dazur");
        assert_eq!(slugify("  Tokyo   2024  "), "tokyo-2024");
        assert_eq!(slugify("東京"), "");
    }

    #[test]
    fn token_is_url_safe() {
        let token = random_token();
        assert_eq!(token.len(), 11);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn public_slug_keeps_name_prefix() {
        let slug = public_slug("Rome Trip");
        assert!(slug.starts_with("rome-trip-"));
        assert_ne!(public_slug("Rome Trip"), slug);
    }
}
