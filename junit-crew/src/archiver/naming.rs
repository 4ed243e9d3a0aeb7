// Copyright (c) The junit-crew Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File names for archived artifacts.
//!
//! Names have the form `<prefix>-<name>-<hash>.<extension>`, where the prefix is sanitized and at
//! most [`MAX_PREFIX_LEN`] bytes, the name is lowercased, sanitized and at most [`MAX_NAME_LEN`]
//! bytes, the hash is [`SHORT_HASH_LEN`] hex digits derived from the artifact's content, and the
//! extension is at most [`MAX_EXTENSION_LEN`] bytes.
//! The result is always shorter than 250 bytes, which is safe on all common filesystems.

use junit_crew_events::Artifact;
use xxhash_rust::xxh3::xxh3_64;

/// The maximum length of the prefix, in bytes.
pub const MAX_PREFIX_LEN: usize = 10;

/// The maximum length of the name, in bytes.
pub const MAX_NAME_LEN: usize = 220;

/// The maximum length of the extension, in bytes.
pub const MAX_EXTENSION_LEN: usize = 4;

/// The length of the hash.
pub const SHORT_HASH_LEN: usize = 10;

/// Returns a short, deterministic fingerprint of an artifact's encoded value.
///
/// This is the first [`SHORT_HASH_LEN`] hex digits of the xxh3-64 digest.
pub fn short_hash(encoded_value: &str) -> String {
    let hash = format!("{:016x}", xxh3_64(encoded_value.as_bytes()));
    hash[..SHORT_HASH_LEN].to_owned()
}

/// Returns the file name an artifact is archived under.
pub fn file_name_for(prefix: &str, name: &str, artifact: &Artifact, extension: &str) -> String {
    let prefix = sanitize(prefix);
    let prefix = truncate_at_char_boundary(&prefix, MAX_PREFIX_LEN);
    let name = sanitize(&name.to_lowercase());
    let name = truncate_at_char_boundary(&name, MAX_NAME_LEN);
    let extension = truncate_at_char_boundary(extension, MAX_EXTENSION_LEN);
    let hash = short_hash(artifact.encoded_value());

    // At most 10 + 1 + 220 + 1 + 10 + 1 + 4 = 247 bytes.
    format!("{prefix}-{name}-{hash}.{extension}")
}

/// Replaces characters that are unsafe in file names on common filesystems with `_`.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect()
}

/// Truncates `s` to at most `max_len` bytes without splitting a character.
fn truncate_at_char_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use junit_crew_events::ArtifactKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn short_hash_is_deterministic() {
        let hash = short_hash("abc");
        assert_eq!(hash.len(), SHORT_HASH_LEN);
        assert!(hash.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_eq!(hash, short_hash("abc"));
        assert_ne!(hash, short_hash("abd"));
    }

    #[test]
    fn basic_file_name() {
        let artifact = Artifact::xml("<testsuites/>");
        let file_name = file_name_for("junit", "Result", &artifact, "xml");
        assert_eq!(
            file_name,
            format!("junit-result-{}.xml", short_hash(artifact.encoded_value()))
        );
    }

    #[test_case("a/b\\c", "a_b_c" ; "path separators")]
    #[test_case("what? <yes>|no", "what_ _yes__no" ; "reserved characters")]
    #[test_case("line\nbreak\ttab", "line_break_tab" ; "control characters")]
    #[test_case("Ünïcode Name", "ünïcode name" ; "unicode is lowercased")]
    fn name_is_sanitized(name: &str, expected: &str) {
        let artifact = Artifact::xml("x");
        let file_name = file_name_for("junit", name, &artifact, "xml");
        assert_eq!(
            file_name,
            format!("junit-{expected}-{}.xml", short_hash(artifact.encoded_value()))
        );
    }

    #[test_case("../../etc", ".._.._etc" ; "parent directories")]
    #[test_case("a\\b", "a_b" ; "backslash")]
    #[test_case("/abs", "_abs" ; "absolute path")]
    fn prefix_is_sanitized(prefix: &str, expected: &str) {
        let artifact = Artifact::xml("abc");
        let file_name = file_name_for(prefix, "Result", &artifact, "xml");
        assert_eq!(
            file_name,
            format!("{expected}-result-{}.xml", short_hash(artifact.encoded_value()))
        );
        assert_eq!(Utf8Path::new(&file_name).components().count(), 1);
    }

    #[test]
    fn long_components_are_truncated() {
        let artifact = Artifact::xml("x");
        let file_name = file_name_for("prefix-that-is-long", &"n".repeat(500), &artifact, "xml");

        assert!(file_name.starts_with("prefix-tha-nnn"));
        assert_eq!(
            file_name.len(),
            MAX_PREFIX_LEN + 1 + MAX_NAME_LEN + 1 + SHORT_HASH_LEN + 1 + 3
        );
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // "é" is two bytes, so 220 bytes can't be filled exactly with an odd offset.
        let name = format!("a{}", "é".repeat(200));
        let artifact = Artifact::xml("x");
        let file_name = file_name_for("junit", &name, &artifact, "xml");

        let name_part = &file_name["junit-".len()..file_name.len() - "-0123456789.xml".len()];
        assert_eq!(name_part.len(), MAX_NAME_LEN - 1);
    }

    proptest! {
        #[test]
        fn file_name_is_always_short(
            prefix in ".{0,40}",
            name in ".{0,400}",
            kind in prop_oneof![
                Just(ArtifactKind::XmlData),
                Just(ArtifactKind::JsonData),
                Just(ArtifactKind::Photo),
            ],
        ) {
            let artifact = Artifact::from_string(kind, &name);
            let file_name = file_name_for(&prefix, &name, &artifact, kind.extension());
            prop_assert!(file_name.len() < 250, "{} is too long", file_name.len());
            prop_assert!(!file_name.contains(['/', '\\']), "{file_name} has a separator");
        }
    }
}
