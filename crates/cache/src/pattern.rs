//! Glob-style key patterns
//!
//! Supports `*`, `?`, character classes (`[abc]`, `[a-z]`, `[^a]`) and
//! backslash escapes, the same dialect Redis uses for `KEYS`.

use regex::{Regex, RegexBuilder};
use shared::{Error, Result};

/// Compiled key pattern
#[derive(Debug, Clone)]
pub struct KeyPattern {
    source: String,
    regex: Regex,
}

impl KeyPattern {
    /// Compile a glob pattern
    pub fn new(pattern: &str) -> Result<Self> {
        // Keys may hold any byte, newlines included.
        let regex = RegexBuilder::new(&format!("^{}$", translate(pattern)))
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| Error::invalid_input(format!("bad key pattern '{}': {}", pattern, e)))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Translate glob syntax into a regex body
fn translate(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                out.push_str(&regex::escape(&chars[i].to_string()));
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push('[');
                    let mut j = i + 1;
                    if chars[j] == '^' {
                        out.push('^');
                        j += 1;
                    }
                    let mut members = Vec::new();
                    while j < end {
                        if chars[j] == '\\' && j + 1 < end {
                            j += 1;
                            members.push((chars[j], true));
                        } else {
                            members.push((chars[j], false));
                        }
                        j += 1;
                    }
                    push_class(&mut out, &members);
                    out.push(']');
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    out
}

/// Emit class members as `(char, escaped)` pairs. A reversed range such as
/// `z-a` matches like `a-z`.
fn push_class(out: &mut String, members: &[(char, bool)]) {
    let mut k = 0;
    while k < members.len() {
        let lo = members[k].0;
        if k + 2 < members.len() && members[k + 1] == ('-', false) {
            let hi = members[k + 2].0;
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            push_class_char(out, lo);
            out.push('-');
            push_class_char(out, hi);
            k += 3;
        } else {
            push_class_char(out, lo);
            k += 1;
        }
    }
}

fn push_class_char(out: &mut String, c: char) {
    // Characters with meaning inside a regex class
    if matches!(c, '[' | ']' | '&' | '~' | '\\' | '-' | '^') {
        out.push('\\');
    }
    out.push(c);
}

/// Index of the `]` closing the class opened at `start`, if any
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'^') {
        j += 1;
    }
    // An empty class is not a class
    if chars.get(j) == Some(&']') || j >= chars.len() {
        return None;
    }
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            ']' => return Some(j),
            _ => j += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pattern: &str, key: &str) -> bool {
        KeyPattern::new(pattern).unwrap().matches(key)
    }

    #[test]
    fn test_star() {
        assert!(m("*", ""));
        assert!(m("*", "anything:at:all"));
        assert!(m("session:*", "session:42"));
        assert!(!m("session:*", "user:42"));
        assert!(m("*:42", "session:42"));
    }

    #[test]
    fn test_question_mark() {
        assert!(m("h?llo", "hello"));
        assert!(m("h?llo", "hallo"));
        assert!(!m("h?llo", "hllo"));
    }

    #[test]
    fn test_classes() {
        assert!(m("h[ae]llo", "hello"));
        assert!(!m("h[ae]llo", "hillo"));
        assert!(m("h[^e]llo", "hallo"));
        assert!(!m("h[^e]llo", "hello"));
        assert!(m("key[0-9]", "key7"));
        assert!(!m("key[0-9]", "keyx"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(m("a.b", "a.b"));
        assert!(!m("a.b", "axb"));
        assert!(m("price($)", "price($)"));
        assert!(m("user+1", "user+1"));
    }

    #[test]
    fn test_escapes_and_unclosed_class() {
        assert!(m(r"star\*", "star*"));
        assert!(!m(r"star\*", "starry"));
        assert!(m("open[", "open["));
        assert!(m("[]x", "[]x"));
    }

    #[test]
    fn test_wildcards_match_newlines() {
        assert!(m("*", "line1\nline2"));
        assert!(m("line1?line2", "line1\nline2"));
        assert!(m("line1*", "line1\n"));
        assert!(m("a[^b]c", "a\nc"));
    }

    #[test]
    fn test_reversed_range() {
        assert!(m("key[z-a]", "keym"));
        assert!(m("key[9-0]", "key5"));
        assert!(!m("key[z-a]", "key5"));
    }

    #[test]
    fn test_literal_dash_and_caret_in_class() {
        assert!(m("a[-x]b", "a-b"));
        assert!(m("a[x-]b", "a-b"));
        assert!(m("a[x^]b", "a^b"));
        assert!(!m("a[x^]b", "ayb"));
    }
}
