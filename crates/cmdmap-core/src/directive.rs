// directive.rs — Parser for the "cmd" and "map" directive grammars.
//
// cmd: `user\account,user\profile,login`
//   tokens with a separator are library invocations (module = first segment),
//   tokens without one are bare method names.
//
// map: `user\account\login\token:auth_token`
//   the result of `user\account\login` is indexed by `token` and written into
//   the input pool as `auth_token`. The library part must already be
//   registered by cmd, so cmd is parsed first.
//
// Malformed tokens are skipped without error.

use crate::path::{join, resolve_module, split_list, SEPARATOR};
use crate::registry::{KeyMap, KeyMapEntry, MethodList, ModuleRegistry};

/// Delimiter between the source path and target key in a map token.
pub const MAP_DELIMITER: char = ':';

/// One classified cmd token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// A library to load, with its resolved module.
    ModuleInvocation { module: String, library: String },
    /// A method to call on every requested library.
    BareMethod(String),
}

/// Classify a single cmd token. `None` for tokens that resolve to nothing.
pub fn classify(token: &str) -> Option<Directive> {
    match token.find(SEPARATOR) {
        Some(offset) => {
            let module = resolve_module(token, offset as isize)?;
            let remainder = &token[offset + SEPARATOR.len_utf8()..];
            if remainder.is_empty() {
                return None;
            }
            Some(Directive::ModuleInvocation {
                module: module.to_string(),
                library: token.to_string(),
            })
        }
        None if token.is_empty() => None,
        None => Some(Directive::BareMethod(token.to_string())),
    }
}

/// The registries produced by parsing one request's directives.
#[derive(Debug, Clone, Default)]
pub struct DirectiveSet {
    pub modules: ModuleRegistry,
    pub methods: MethodList,
    pub keymap: KeyMap,
}

impl DirectiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse both grammars in the required order (cmd before map).
    pub fn parse(cmd: Option<&str>, map: Option<&str>) -> Self {
        let mut set = Self::new();
        if let Some(cmd) = cmd {
            set.parse_cmd(cmd);
        }
        if let Some(map) = map {
            set.parse_map(map);
        }
        set
    }

    /// Register the libraries and bare methods listed in a cmd value.
    pub fn parse_cmd(&mut self, raw: &str) {
        for token in split_list(raw) {
            match classify(token) {
                Some(Directive::ModuleInvocation { module, library }) => {
                    self.modules.insert(&module, &library);
                }
                Some(Directive::BareMethod(method)) => {
                    self.methods.insert(&method);
                }
                None => {}
            }
        }
    }

    /// Register routing rules listed in a map value.
    pub fn parse_map(&mut self, raw: &str) {
        for token in split_list(raw) {
            if let Some(entry) = self.resolve_map_token(token) {
                self.keymap.insert(entry);
            }
        }
    }

    /// Turn one map token into a key-map entry.
    ///
    /// The source path is matched against the libraries already registered
    /// for its module, longest prefix first. The first segment past the
    /// matched library is the method; anything deeper is the lookup path into
    /// the method's result.
    fn resolve_map_token(&self, token: &str) -> Option<KeyMapEntry> {
        let (map_from, map_to) = token.split_once(MAP_DELIMITER)?;
        let offset = map_from.find(SEPARATOR)?;
        let module = resolve_module(map_from, offset as isize)?;
        let libraries = self.modules.libraries(module)?;

        let segments: Vec<&str> = map_from.split(SEPARATOR).collect();
        // Shrink from the full path until a registered library matches.
        for held in (1..=segments.len()).rev() {
            let candidate = join(&segments[..held]);
            if !libraries.iter().any(|l| *l == candidate) {
                continue;
            }
            let (method, from) = segments[held..].split_first()?;
            return Some(KeyMapEntry {
                library_method_key: format!("{candidate}{SEPARATOR}{method}"),
                from: from.iter().map(|s| s.to_string()).collect(),
                to: map_to.to_string(),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_module_invocation() {
        assert_eq!(
            classify("user\\account"),
            Some(Directive::ModuleInvocation {
                module: "user".into(),
                library: "user\\account".into(),
            })
        );
    }

    #[test]
    fn classify_leading_separator_resolves_first_segment() {
        assert_eq!(
            classify("\\user\\account"),
            Some(Directive::ModuleInvocation {
                module: "user".into(),
                library: "\\user\\account".into(),
            })
        );
    }

    #[test]
    fn classify_rejects_dangling_paths() {
        assert_eq!(classify("user\\"), None);
        assert_eq!(classify("\\user"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn classify_bare_method() {
        assert_eq!(classify("login"), Some(Directive::BareMethod("login".into())));
    }

    #[test]
    fn parse_cmd_is_idempotent() {
        let mut set = DirectiveSet::new();
        set.parse_cmd("A\\B,A\\B,A\\C");
        set.parse_cmd("A\\C,A\\B");
        assert_eq!(set.modules.len(), 1);
        assert_eq!(
            set.modules.libraries("A").unwrap(),
            &["A\\B".to_string(), "A\\C".to_string()]
        );
        assert!(set.methods.is_empty());
    }

    #[test]
    fn parse_cmd_splits_libraries_and_methods() {
        let set = DirectiveSet::parse(Some("user\\account,login,shop\\cart,login,,"), None);
        let modules: Vec<&str> = set.modules.iter().map(|e| e.module.as_str()).collect();
        assert_eq!(modules, vec!["user", "shop"]);
        assert_eq!(set.methods.iter().collect::<Vec<_>>(), vec!["login"]);
    }

    #[test]
    fn parse_map_without_lookup_path_routes_raw_result() {
        let set = DirectiveSet::parse(Some("M\\L"), Some("M\\L\\fetch:auth_token"));
        let entry = set.keymap.get("M\\L\\fetch").unwrap();
        assert!(entry.from.is_empty());
        assert_eq!(entry.to, "auth_token");
    }

    #[test]
    fn parse_map_keeps_nested_keys_in_given_order() {
        let set = DirectiveSet::parse(
            Some("M\\L"),
            Some("M\\L\\fetch\\data\\session\\token:auth_token"),
        );
        let entry = set.keymap.get("M\\L\\fetch").unwrap();
        assert_eq!(entry.from, vec!["data", "session", "token"]);
    }

    #[test]
    fn parse_map_prefers_longest_registered_library() {
        let set = DirectiveSet::parse(Some("M\\L,M\\L\\sub"), Some("M\\L\\sub\\go\\id:x"));
        assert!(set.keymap.get("M\\L\\sub\\go").is_some());
        assert!(set.keymap.get("M\\L\\sub").is_none());
        assert_eq!(set.keymap.get("M\\L\\sub\\go").unwrap().from, vec!["id"]);
    }

    #[test]
    fn parse_map_skips_malformed_and_unknown_tokens() {
        let set = DirectiveSet::parse(
            Some("M\\L"),
            Some("M\\L\\fetch,nosep:x,Other\\L\\fetch:y,M\\L:z,M\\Q\\fetch:w"),
        );
        assert!(set.keymap.is_empty());
    }

    #[test]
    fn parse_map_target_is_text_after_first_colon() {
        let set = DirectiveSet::parse(Some("M\\L"), Some("M\\L\\fetch:a:b"));
        assert_eq!(set.keymap.get("M\\L\\fetch").unwrap().to, "a:b");
    }

    #[test]
    fn parse_map_matches_leading_separator_libraries_exactly() {
        let set = DirectiveSet::parse(Some("\\M\\L"), Some("\\M\\L\\fetch:t,M\\L\\fetch:u"));
        assert_eq!(set.keymap.len(), 1);
        assert_eq!(set.keymap.get("\\M\\L\\fetch").unwrap().to, "t");
    }
}
