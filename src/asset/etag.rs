//! Weak validators for conditional caching.
//!
//! The validator is a blake3 fingerprint of the raw file bytes, computed
//! before any transform so a matching `If-None-Match` is never charged
//! transform work.

/// Hex digits of the blake3 digest kept in the tag.
const TAG_LEN: usize = 16;

/// Compute the weak validator tag for a raw byte buffer.
pub fn weak_tag(bytes: &[u8]) -> String {
    let digest = blake3::hash(bytes);
    format!("W/\"{}\"", &digest.to_hex()[..TAG_LEN])
}

/// Check an `If-None-Match` header value against a tag. Handles both a
/// single tag and a comma-separated list.
pub fn matches(if_none_match: Option<&str>, tag: &str) -> bool {
    let Some(header) = if_none_match else {
        return false;
    };
    header.split(',').any(|candidate| candidate.trim() == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_weak_and_content_addressed() {
        let tag = weak_tag(b"let a = 1;");
        assert!(tag.starts_with("W/\""));
        assert!(tag.ends_with('"'));
        assert_eq!(tag, weak_tag(b"let a = 1;"));
        assert_ne!(tag, weak_tag(b"let a = 2;"));
    }

    #[test]
    fn matches_exact_and_list_membership() {
        let tag = weak_tag(b"content");
        let list = format!("W/\"other\", {tag}");
        assert!(matches(Some(tag.as_str()), &tag));
        assert!(matches(Some(list.as_str()), &tag));
        assert!(!matches(Some("W/\"other\""), &tag));
        assert!(!matches(None, &tag));
    }
}
