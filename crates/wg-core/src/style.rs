//! Style fragment helpers and inline CSS serialization.
//!
//! A component template carries at most one `<style>` fragment for hover
//! rules and custom properties. These helpers locate it textually (never via
//! a CSS parse) and degrade to no-ops when the markup has none.

use crate::model::StyleOverrides;
use std::ops::Range;

/// Byte range of the first complete `<style ...>...</style>` fragment.
///
/// Tag names match ASCII case-insensitively and the opening tag may carry
/// attributes. An unterminated fragment is not a match.
pub fn find_style_fragment(markup: &str) -> Option<Range<usize>> {
    let open = find_style_fragment_parts(markup)?;
    Some(open.outer)
}

/// Inner text of the first style fragment.
pub fn extract_style_text(markup: &str) -> Option<&str> {
    let parts = find_style_fragment_parts(markup)?;
    Some(&markup[parts.inner])
}

/// The full text of the first style fragment, tags included.
pub fn style_fragment(markup: &str) -> Option<&str> {
    find_style_fragment(markup).map(|r| &markup[r])
}

/// `markup` with its first style fragment removed. Unchanged if it has none.
pub fn strip_style_fragment(markup: &str) -> String {
    match find_style_fragment(markup) {
        Some(range) => {
            let mut out = String::with_capacity(markup.len() - range.len());
            out.push_str(&markup[..range.start]);
            out.push_str(&markup[range.end..]);
            out
        }
        None => markup.to_string(),
    }
}

/// Number of complete style fragments in `markup`.
pub fn count_style_fragments(markup: &str) -> usize {
    let mut count = 0;
    let mut rest = markup;
    while let Some(parts) = find_style_fragment_parts(rest) {
        count += 1;
        rest = &rest[parts.outer.end..];
    }
    count
}

struct FragmentParts {
    outer: Range<usize>,
    inner: Range<usize>,
}

fn find_style_fragment_parts(markup: &str) -> Option<FragmentParts> {
    let mut from = 0;
    loop {
        let start = from + find_ascii_ci(&markup[from..], "<style")?;
        let after_name = start + "<style".len();
        // `<styles>` or `<style-guide>` are different tags.
        let boundary = markup[after_name..].chars().next()?;
        if !(boundary == '>' || boundary == '/' || boundary.is_ascii_whitespace()) {
            from = after_name;
            continue;
        }
        let open_end = after_name + markup[after_name..].find('>')? + 1;
        let close = open_end + find_ascii_ci(&markup[open_end..], "</style")?;
        let close_end = close + markup[close..].find('>')? + 1;
        return Some(FragmentParts {
            outer: start..close_end,
            inner: open_end..close,
        });
    }
}

/// ASCII case-insensitive substring search; `needle` must be lowercase ASCII.
pub(crate) fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() {
        return Some(0);
    }
    if h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| {
        h[i..i + n.len()]
            .iter()
            .zip(n)
            .all(|(a, b)| a.to_ascii_lowercase() == *b)
    })
}

/// Offset of the first `"<name>: <value>"` declaration in `css` that stands
/// on its own: not preceded by a name character and followed by `;`, `}`,
/// `!`, whitespace or the end of the text. `--c: #111111` therefore does not
/// match inside `--c: #1111112` or `--b--c: #111111`.
pub fn find_declaration(css: &str, name: &str, value: &str) -> Option<usize> {
    let needle = format!("{name}: {value}");
    css.match_indices(&needle).map(|(at, _)| at).find(|&at| {
        let before = css[..at].chars().next_back();
        let after = css[at + needle.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            && after.is_none_or(|c| matches!(c, ';' | '}' | '!' | '<') || c.is_whitespace())
    })
}

// ─── Inline CSS ──────────────────────────────────────────────────────────

/// `backgroundColor` → `background-color`. Every uppercase letter becomes
/// `-` plus its lowercase form, so `WebkitTransform` → `-webkit-transform`.
pub fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Serialize overrides as inline declarations: `font-size: 24px; color: red;`.
pub fn inline_css(styles: &StyleOverrides) -> String {
    styles
        .iter()
        .map(|(k, v)| format!("{}: {v};", kebab_case(k)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = "<style>.card-x { --accent: #111111; }</style><div class=\"card-x\">Hi</div>";

    #[test]
    fn finds_first_fragment() {
        let range = find_style_fragment(CARD).unwrap();
        assert_eq!(&CARD[range], "<style>.card-x { --accent: #111111; }</style>");
        assert_eq!(extract_style_text(CARD), Some(".card-x { --accent: #111111; }"));
    }

    #[test]
    fn declaration_needs_value_boundary() {
        let css = ".c { --b--c: #111111; --c: #1111112; --c: #111111 !important }";
        assert_eq!(find_declaration(css, "--c", "#111111"), css.rfind("--c: #111111 "));
        assert_eq!(find_declaration(".c{--c: red}", "--c", "red"), Some(3));
        assert_eq!(find_declaration(".c { --c: #1111112; }", "--c", "#111111"), None);
    }

    #[test]
    fn strip_removes_only_first() {
        let two = "<style>a{}</style><p>x</p><style>b{}</style>";
        assert_eq!(strip_style_fragment(two), "<p>x</p><style>b{}</style>");
        assert_eq!(count_style_fragments(two), 2);
    }

    #[test]
    fn tolerates_attributes_and_case() {
        let m = "<STYLE type=\"text/css\">p{}</Style ><p></p>";
        assert_eq!(extract_style_text(m), Some("p{}"));
        assert_eq!(strip_style_fragment(m), "<p></p>");
    }

    #[test]
    fn ignores_lookalike_tags_and_unterminated_fragments() {
        assert!(find_style_fragment("<styles>x</styles>").is_none());
        assert!(find_style_fragment("<style>never closed").is_none());
        assert_eq!(strip_style_fragment("<p>plain</p>"), "<p>plain</p>");
        assert_eq!(count_style_fragments("<p>plain</p>"), 0);
    }

    #[test]
    fn kebab_case_matches_browser_convention() {
        assert_eq!(kebab_case("fontSize"), "font-size");
        assert_eq!(kebab_case("backgroundColor"), "background-color");
        assert_eq!(kebab_case("WebkitTransform"), "-webkit-transform");
        assert_eq!(kebab_case("color"), "color");
    }

    #[test]
    fn inline_css_preserves_order() {
        let styles: StyleOverrides = [("fontSize", "24px"), ("color", "#333")]
            .into_iter()
            .collect();
        assert_eq!(inline_css(&styles), "font-size: 24px; color: #333;");
        assert_eq!(inline_css(&StyleOverrides::new()), "");
    }
}
