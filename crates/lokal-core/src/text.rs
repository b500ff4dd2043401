//! Text helpers: slug normalization and HTML-to-description
//! extraction.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static SENTENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]+").expect("valid regex"));
static DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").expect("valid regex"));

/// Maximum length of a generated SEO description, in characters.
pub const SEO_DESCRIPTION_MAX_CHARS: usize = 160;

/// Map a lowercase letter with diacritics to its ASCII base.
fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'í' | 'ì' | 'î' | 'ï' | 'ī' | 'į' => "i",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ő' | 'ø' | 'ō' => "o",
        'ú' | 'ù' | 'û' | 'ü' | 'ű' | 'ū' | 'ů' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ç' | 'ć' | 'č' => "c",
        'ď' => "d",
        'ğ' => "g",
        'ł' | 'ľ' | 'ĺ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ř' | 'ŕ' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ť' | 'ţ' => "t",
        'ź' | 'ż' | 'ž' => "z",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        _ => return None,
    };
    Some(folded)
}

/// ASCII-normalize a slug: lowercase, strip diacritics, turn whitespace
/// and underscores into dashes, drop anything else outside `[a-z0-9-]`.
///
/// `"Kávézó Ősz"` becomes `"kavezo-osz"`.
pub fn normalize_slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c);
        } else if c.is_whitespace() || c == '_' {
            out.push('-');
        } else if let Some(folded) = fold_char(c) {
            out.push_str(folded);
        }
    }
    DASH_RE.replace_all(&out, "-").trim_matches('-').to_string()
}

/// Strip tags, decode the handful of entities the editor emits and
/// collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    WS_RE.replace_all(&decoded, " ").trim().to_string()
}

/// Build an SEO description from HTML content: the first two sentences
/// of the plain text, capped at [`SEO_DESCRIPTION_MAX_CHARS`].
///
/// Returns `None` for content with no text.
pub fn seo_description_from_html(html: &str) -> Option<String> {
    let text = strip_html(html);
    if text.is_empty() {
        return None;
    }

    let sentences: Vec<&str> = SENTENCE_RE
        .find_iter(&text)
        .take(2)
        .map(|m| m.as_str().trim())
        .collect();
    let summary = if sentences.is_empty() {
        text.clone()
    } else {
        sentences.join(" ")
    };

    Some(truncate_chars(&summary, SEO_DESCRIPTION_MAX_CHARS))
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_hungarian_and_german_diacritics() {
        assert_eq!(normalize_slug("kávézó-ősz"), "kavezo-osz");
        assert_eq!(normalize_slug("Tűzoltó Múzeum"), "tuzolto-muzeum");
        assert_eq!(normalize_slug("Straße_über"), "strasse-uber");
    }

    #[test]
    fn normalize_collapses_and_trims_dashes() {
        assert_eq!(normalize_slug("  --a  b--c-- "), "a-b-c");
        assert_eq!(normalize_slug("a!?b"), "ab");
    }

    #[test]
    fn normalize_keeps_plain_ascii_slug_unchanged() {
        assert_eq!(normalize_slug("fo-ter-12"), "fo-ter-12");
    }

    #[test]
    fn strip_html_removes_tags_and_entities() {
        let html = "<p>Hello&nbsp;<strong>world</strong> &amp; friends</p>\n<p>Bye</p>";
        assert_eq!(strip_html(html), "Hello world & friends Bye");
    }

    #[test]
    fn seo_description_takes_first_two_sentences() {
        let html = "<h1>Impresszum</h1><p>Első mondat. Második mondat! Harmadik mondat?</p>";
        assert_eq!(
            seo_description_from_html(html).unwrap(),
            "Impresszum Első mondat. Második mondat!"
        );
    }

    #[test]
    fn seo_description_without_punctuation_uses_whole_text() {
        assert_eq!(seo_description_from_html("<p>No full stop</p>").unwrap(), "No full stop");
    }

    #[test]
    fn seo_description_is_truncated() {
        let long = format!("<p>{}.</p>", "a".repeat(400));
        let desc = seo_description_from_html(&long).unwrap();
        assert_eq!(desc.chars().count(), SEO_DESCRIPTION_MAX_CHARS);
        assert!(desc.ends_with('…'));
    }

    #[test]
    fn seo_description_of_empty_html_is_none() {
        assert!(seo_description_from_html("<p> </p>").is_none());
    }
}
