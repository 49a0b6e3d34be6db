//! Path normalization for template keys and device names

use regex::Regex;
use std::sync::LazyLock;

static REPEATED_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("valid underscore regex"));

/// Convert a template key or device name to snake case
///
/// Dashes become underscores, camel-case boundaries are split, spaces become
/// underscores and underscores touching a `/` are dropped. Acronyms and
/// multi-digit numbers stay joined.
///
/// ```
/// use hall_processor::app::services::instrument_mapper::to_snake_case;
///
/// assert_eq!(
///     to_snake_case("My_String-Dashed_LS56 Sep AC / test_ls58_/@with_unit 345"),
///     "my_string_dashed_ls56_sep_ac/test_ls58/@with_unit_345"
/// );
/// ```
pub fn to_snake_case(text: &str) -> String {
    let split = split_camel_case(&text.replace('-', "_")).to_lowercase();
    let collapsed = REPEATED_UNDERSCORES.replace_all(&split, "_");
    let spaced = collapsed.replace(' ', "_");
    let trimmed = drop_underscores_at_slashes(&spaced);
    REPEATED_UNDERSCORES.replace_all(&trimmed, "_").into_owned()
}

/// Insert `_` at `aB` and at `ABc` (before the `B`)
fn split_camel_case(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let previous = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if previous.is_ascii_lowercase() || (previous.is_ascii_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.push(c);
    }

    out
}

/// Remove one `_` directly after and one directly before each `/`
fn drop_underscores_at_slashes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            let after_slash = i > 0 && chars[i - 1] == '/';
            let before_slash = chars.get(i + 1) == Some(&'/');
            if after_slash || before_slash {
                continue;
            }
        }
        out.push(c);
    }

    out
}
