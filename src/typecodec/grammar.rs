// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Small bracket-balancing helpers for the C++-mangled type grammar.
//!
//! Per spec.md §9: a dedicated scan rather than a general tokenizer, since
//! only `<`/`>` nesting depth and the position of a top-level comma are
//! ever needed.

/// Strip a known prefix and the matching outer `<...>` pair, returning the
/// content between them. Returns `None` if `type_string` doesn't start with
/// `prefix` (which must itself end in `<`).
pub fn strip_template(type_string: &str, prefix: &str) -> Option<String> {
    debug_assert!(prefix.ends_with('<'));
    let inner = type_string.strip_prefix(prefix)?;
    let trimmed = inner.strip_suffix('>')?;
    Some(trimmed.trim_end().to_string())
}

/// Split `content` at the first comma that sits at bracket-nesting depth 0,
/// honoring nested `<...>` groups. Returns the text before that comma (or
/// the whole string, if no top-level comma exists).
pub fn first_top_level_segment(content: &str) -> &str {
    let mut depth = 0i32;
    for (idx, ch) in content.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => return &content[..idx],
            _ => {}
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_simple_template() {
        let stripped = strip_template("class ceng::math::CVector2<float>", "class ceng::math::CVector2<");
        assert_eq!(stripped.as_deref(), Some("float"));
    }

    #[test]
    fn strips_template_with_trailing_space_before_close() {
        let stripped = strip_template(
            "class std::vector<float,class std::allocator<float> >",
            "class std::vector<",
        );
        assert_eq!(
            stripped.as_deref(),
            Some("float,class std::allocator<float>")
        );
    }

    #[test]
    fn splits_at_top_level_comma_only() {
        let content = "class ceng::math::CVector2<float>,class std::allocator<class ceng::math::CVector2<float> >";
        assert_eq!(
            first_top_level_segment(content),
            "class ceng::math::CVector2<float>"
        );
    }

    #[test]
    fn no_comma_returns_whole_string() {
        assert_eq!(first_top_level_segment("float"), "float");
    }
}
