// path.rs — Hierarchical path helpers.
//
// Library paths look like `module\sub\library`, optionally with a leading
// separator (`\module\library`). The module is always the first non-empty
// segment. Directive lists are comma-separated.

/// The reserved hierarchical separator.
pub const SEPARATOR: char = '\\';

/// Resolve the module name of `path`.
///
/// - `cut > 0`: the first `cut` bytes of `path` are the module (the whole
///   path when it is shorter).
/// - `cut == 0`: skip the first character, find the next separator and
///   resolve again on the remainder with that boundary. No separator means
///   the module cannot be resolved.
/// - `cut < 0`: invalid, unresolved.
///
/// Returns `None` when unresolved or when the result would be empty.
pub fn resolve_module(path: &str, cut: isize) -> Option<&str> {
    match cut {
        c if c > 0 => {
            let module = path.get(..(c as usize).min(path.len()))?;
            (!module.is_empty()).then_some(module)
        }
        0 => {
            let first = path.chars().next()?.len_utf8();
            let rest = &path[first..];
            let boundary = rest.find(SEPARATOR)?;
            resolve_module(rest, boundary as isize)
        }
        _ => None,
    }
}

/// Split a comma-separated directive list.
///
/// Empty tokens are dropped; duplicates are removed keeping the first
/// occurrence so the caller's ordering survives.
pub fn split_list(raw: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = Vec::new();
    for token in raw.split(',') {
        if !token.is_empty() && !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

/// Join path segments with the separator.
pub fn join(segments: &[&str]) -> String {
    let mut buf = [0u8; 4];
    segments.join(SEPARATOR.encode_utf8(&mut buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_cut_takes_prefix() {
        assert_eq!(resolve_module("user\\account", 4), Some("user"));
        assert_eq!(resolve_module("abc", 10), Some("abc"));
    }

    #[test]
    fn discovery_skips_leading_separator() {
        assert_eq!(resolve_module("\\Foo\\Bar\\Baz", 0), Some("Foo"));
    }

    #[test]
    fn discovery_collapses_repeated_leading_separators() {
        assert_eq!(resolve_module("\\\\Foo\\Bar", 0), Some("Foo"));
    }

    #[test]
    fn discovery_without_second_separator_is_unresolved() {
        assert_eq!(resolve_module("\\Foo", 0), None);
        assert_eq!(resolve_module("", 0), None);
    }

    #[test]
    fn negative_cut_is_unresolved() {
        assert_eq!(resolve_module("Foo\\Bar", -1), None);
    }

    #[test]
    fn cut_inside_multibyte_char_is_unresolved() {
        // 'é' is two bytes; cutting after one byte is not a char boundary.
        assert_eq!(resolve_module("é\\x", 1), None);
        assert_eq!(resolve_module("\\é\\x", 0), Some("é"));
    }

    #[test]
    fn split_list_drops_empty_and_duplicate_tokens() {
        assert_eq!(
            split_list("A\\B,,A\\B,A\\C,run,run"),
            vec!["A\\B", "A\\C", "run"]
        );
        assert!(split_list(",,").is_empty());
    }

    #[test]
    fn join_uses_separator() {
        assert_eq!(join(&["a", "b", "c"]), "a\\b\\c");
        assert_eq!(join(&["", "a"]), "\\a");
    }
}
