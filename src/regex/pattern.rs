//! Pattern compilation.
//!
//! A pattern is compiled once at registration into an anchored
//! [`regex::Regex`] plus a *literal prefix*: the text every matching path is
//! guaranteed to start with, read off the parsed pattern. Most requests that reach the
//! regex router miss most of its routes, and `str::starts_with` rejects those
//! without entering the regex engine.
//!
//! ```text
//! source   /myapp/users/(?P<user_id>\d+)/$
//! regex    ^(?:/myapp/users/(?P<user_id>\d+)/$)
//! prefix   /myapp/users/
//! ```

use regex::Regex;
use regex_syntax::hir::Look;
use regex_syntax::hir::literal::Extractor;

use crate::error::RouteError;
use crate::params::Params;

/// A compiled regex route pattern.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    prefix: String,
    regex: Regex,
    named: usize,
}

impl Pattern {
    /// Compiles `source`, anchoring it at the start of the path.
    ///
    /// A source that already begins with `^` is used as written. Anything else
    /// must be valid on its own and is then wrapped as `^(?:source)`, so every
    /// alternative is anchored.
    pub fn new(source: &str) -> Result<Self, RouteError> {
        let invalid = |e| RouteError::InvalidPattern { pattern: source.to_owned(), source: e };
        let regex = if source.starts_with('^') {
            Regex::new(source).map_err(invalid)?
        } else {
            // `/a)|(/b` only parses once wrapped, and then its second
            // alternative escapes the anchor.
            Regex::new(source).map_err(invalid)?;
            Regex::new(&format!("^(?:{source})")).map_err(invalid)?
        };
        let named = regex.capture_names().flatten().count();

        Ok(Self {
            source: source.to_owned(),
            prefix: literal_prefix(regex.as_str()),
            regex,
            named,
        })
    }

    /// The pattern exactly as registered.
    pub fn source(&self) -> &str { &self.source }

    /// Literal text every matching path starts with. May be empty.
    pub fn prefix(&self) -> &str { &self.prefix }

    /// Matches `path`, returning its named captures in declaration order.
    ///
    /// Group 0 and unnamed groups are never reported. A named group that did
    /// not participate in the match is reported with an empty value.
    pub fn captures(&self, path: &str) -> Option<Params> {
        if !path.starts_with(&self.prefix) {
            return None;
        }
        self.captures_unchecked(path)
    }

    /// [`captures`](Self::captures) without the prefix pre-check. Always
    /// returns the same result, only slower on paths the prefix rejects.
    pub fn captures_unchecked(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;
        let mut params = Params::with_capacity(self.named);
        for (i, name) in self.regex.capture_names().enumerate().skip(1) {
            if let Some(name) = name {
                params.push(name, caps.get(i).map_or("", |m| m.as_str()));
            }
        }
        Some(params)
    }
}

/// Longest text every match of the compiled `pattern` starts with.
///
/// Read off the parsed pattern: the common prefix of the extracted prefix
/// literals, and nothing at all unless every alternative is anchored at the
/// start of the haystack.
fn literal_prefix(pattern: &str) -> String {
    let Ok(hir) = regex_syntax::Parser::new().parse(pattern) else {
        return String::new();
    };
    if !hir.properties().look_set_prefix().contains(Look::Start) {
        return String::new();
    }
    let literals = Extractor::new().extract(&hir);
    let bytes = literals.longest_common_prefix().unwrap_or_default();
    // Case folding can split a multi-byte char; keep whole chars only.
    let valid = match std::str::from_utf8(bytes) {
        Ok(_) => bytes.len(),
        Err(e) => e.valid_up_to(),
    };
    String::from_utf8_lossy(&bytes[..valid]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().copied().collect()
    }

    #[test]
    fn captures_named_groups() {
        let cases: &[(&str, &str, Option<Params>)] = &[
            (r"^/myapp/users/(?P<user_id>\d+)/$", "/myapp/not_match/1234/", None),
            (r"^/myapp/users/(?P<user_id>\d+)/$", "/myapp/users/123456/", Some(params(&[("user_id", "123456")]))),
            (r"^/myapp/users\d+/$", "/myapp/users123456/", Some(Params::new())),
        ];
        for (source, path, expected) in cases {
            let pattern = Pattern::new(source).unwrap();
            assert_eq!(&pattern.captures(path), expected, "{source} on {path}");
        }
    }

    #[test]
    fn reports_groups_in_declaration_order() {
        let pattern = Pattern::new(r"^/(?P<org>\w+)/(\w+)/(?P<repo>\w+)(?:/(?P<rest>.*))?$").unwrap();

        let got = pattern.captures("/tsu/ignored/core").unwrap();
        assert_eq!(got, params(&[("org", "tsu"), ("repo", "core"), ("rest", "")]));
    }

    #[test]
    fn anchors_unanchored_sources() {
        let anchored = Pattern::new(r"^/users/(?P<id>\d+)/$").unwrap();
        let bare = Pattern::new(r"/users/(?P<id>\d+)/$").unwrap();

        for pattern in [&anchored, &bare] {
            assert_eq!(pattern.captures("/users/42/"), Some(params(&[("id", "42")])));
            assert_eq!(pattern.captures_unchecked("/other/users/42/"), None);
        }
    }

    #[test]
    fn anchors_every_alternative() {
        let pattern = Pattern::new("/a/|/b/").unwrap();
        assert!(pattern.captures("/b/").is_some());
        assert!(pattern.captures_unchecked("/x/b/").is_none());
    }

    #[test]
    fn invalid_source_is_a_configuration_error() {
        let err = Pattern::new(r"^/users/(?P<id>\d+/$").unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { ref pattern, .. } if pattern == r"^/users/(?P<id>\d+/$"));
    }

    #[test]
    fn sources_are_validated_before_anchoring() {
        let err = Pattern::new(r"/a)|(/b").unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { ref pattern, .. } if pattern == r"/a)|(/b"));
    }

    #[test]
    fn literal_prefixes() {
        let cases = [
            (r"^/myapp/users/(?P<user_id>\d+)/$", "/myapp/users/"),
            (r"/users/settings/$", "/users/settings/"),
            (r"^/.*$", "/"),
            (r"^.*$", ""),
            (r"^/static\.files/", "/static.files/"),
            (r"^/colou?r/", "/colo"),
            (r"^/ab*", "/a"),
            (r"^/ab+", "/ab"),
            (r"^/a{0,2}b", "/"),
            (r"^/a|/b", ""),
            (r"^/a(/x|/y)", "/a/"),
            (r"^/a[|]b", "/a|b"),
            (r"^/a[](]|/b", ""),
            (r"/a|/b", "/"),
            (r"^/привет/(?P<id>\d+)", "/привет/"),
            ("^", ""),
        ];
        for (source, prefix) in cases {
            assert_eq!(Pattern::new(source).unwrap().prefix(), prefix, "{source}");
        }
    }

    #[test]
    fn prefix_check_never_changes_the_outcome() {
        let sources = [
            r"^/users/(?P<id>\d+)/$",
            r"/users/settings/$",
            r"^/colou?r/(?P<shade>\w+)$",
            r"^/ab*c",
            r"^/a{0,2}b",
            r"^/a|/b",
            r"^/files/(?P<path>.*)$",
            r"^/v\d+/items",
            r"^.*$",
            r"^/a[](]|/b",
            r"/a[](]|/b",
            r"(?i)^/Users/(?P<id>\d+)",
        ];
        let paths = [
            "/", "", "/users/42/", "/users/x/", "/users/settings/", "/other/users/42/",
            "/color/red", "/colour/blue", "/colr/x", "/ac", "/abbbc", "/b", "/aab",
            "/files/", "/files/a/b.txt", "/v2/items", "/vx/items",
            "/a]", "/a(", "/x/b", "/USERS/7", "/users/7",
        ];
        for source in sources {
            let pattern = Pattern::new(source).unwrap();
            for path in paths {
                assert_eq!(
                    pattern.captures(path),
                    pattern.captures_unchecked(path),
                    "{source} on {path:?}",
                );
            }
        }
    }
}
