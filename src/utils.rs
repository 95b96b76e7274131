use crate::models::Algorithm;

/// Pull the expected digest out of pasted text or a checksum file.
///
/// Accepted shapes, first matching line wins:
/// - a single hex line
/// - `<digest>  <filename>` (coreutils `sha256sum` output)
/// - `<filename> <digest>`
///
/// A token whose length matches `algorithm` is preferred; otherwise any hex
/// token of at least 32 characters is taken. The result is lowercased.
pub fn parse_expected_digest(text: &str, algorithm: Algorithm) -> Option<String> {
    for line in text.lines() {
        let t = line.trim();
        if t.is_empty() || t.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = t.split_whitespace().collect();
        if let Some(tok) = tokens
            .iter()
            .find(|tok| tok.len() == algorithm.hex_len() && is_hex(tok))
        {
            return Some(tok.to_ascii_lowercase());
        }
        if let Some(tok) = tokens.iter().find(|tok| tok.len() >= 32 && is_hex(tok)) {
            return Some(tok.to_ascii_lowercase());
        }
    }
    None
}

fn is_hex(tok: &str) -> bool {
    !tok.is_empty() && tok.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MD5_HELLO: &str = "5d41402abc4b2a76b9719d911017c592";

    #[test]
    fn bare_digest() {
        let text = format!("\n  {}\n", MD5_HELLO.to_uppercase());
        assert_eq!(
            parse_expected_digest(&text, Algorithm::Md5).as_deref(),
            Some(MD5_HELLO)
        );
    }

    #[test]
    fn coreutils_and_reversed_layouts() {
        let sums = format!("{MD5_HELLO}  hello.txt\n");
        assert_eq!(
            parse_expected_digest(&sums, Algorithm::Md5).as_deref(),
            Some(MD5_HELLO)
        );
        let reversed = format!("hello.txt {MD5_HELLO}");
        assert_eq!(
            parse_expected_digest(&reversed, Algorithm::Md5).as_deref(),
            Some(MD5_HELLO)
        );
    }

    #[test]
    fn prefers_token_matching_algorithm_length() {
        let sha1 = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";
        let text = format!("{MD5_HELLO} {sha1}");
        assert_eq!(parse_expected_digest(&text, Algorithm::Sha1).as_deref(), Some(sha1));
        assert_eq!(
            parse_expected_digest(&text, Algorithm::Md5).as_deref(),
            Some(MD5_HELLO)
        );
    }

    #[test]
    fn skips_comments_and_rejects_non_hex() {
        assert_eq!(parse_expected_digest("# checksums\n", Algorithm::Md5), None);
        assert_eq!(parse_expected_digest("not a digest", Algorithm::Md5), None);
        assert_eq!(parse_expected_digest("", Algorithm::Sha256), None);
    }
}
