// String helpers

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_]+").expect("valid separator regex"));
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9-]").expect("valid slug regex"));
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid hyphen regex"));

/// Lower-case, hyphen-separated, URL-safe slug
pub fn slugify(text: &str) -> String {
    let text = text.to_lowercase();
    let text = SEPARATORS.replace_all(&text, "-");
    let text = DISALLOWED.replace_all(&text, "");
    let text = HYPHEN_RUNS.replace_all(&text, "-");
    text.trim_matches('-').to_string()
}

/// Cut `text` to at most `length` chars, ending with `suffix` when cut
pub fn truncate(text: &str, length: usize, suffix: &str) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }
    let keep = length.saturating_sub(suffix.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(suffix);
    out
}

/// Show only the first and last `visible_chars` characters
pub fn mask_secret(value: &str, visible_chars: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let shown = visible_chars.saturating_mul(2);
    if chars.len() <= shown {
        return "*".repeat(chars.len());
    }

    let hidden = chars.len() - shown;
    let mut out: String = chars[..visible_chars].iter().collect();
    out.push_str(&"*".repeat(hidden));
    out.extend(&chars[chars.len() - visible_chars..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Hello  World"), "hello-world");
        assert_eq!(slugify("hello_world"), "hello-world");
        assert_eq!(slugify("Special!@#Chars"), "specialchars");
        assert_eq!(slugify("  --Trim me--  "), "trim-me");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 20, "..."), "Hello World");
        assert_eq!(truncate("Hello World", 8, "..."), "Hello...");
        assert_eq!(truncate("Hello World", 8, "~"), "Hello W~");
        assert_eq!(truncate("héllo wörld", 6, "…"), "héllo…");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("1234567890", 4), "1234**7890");
        assert_eq!(mask_secret("12345678", 2), "12****78");
        assert_eq!(mask_secret("short", 4), "*****");
        assert_eq!(mask_secret("abc", usize::MAX / 2 + 1), "***");
    }
}
