//! Include/exclude joint filters for partial binds.

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyChar,
    AnySequence,
    Class { negated: bool, ranges: Vec<(char, char)> },
}

impl Token {
    fn matches(&self, c: char) -> bool {
        match self {
            Token::Literal(expected) => *expected == c,
            Token::AnyChar => true,
            Token::AnySequence => false,
            Token::Class { negated, ranges } => {
                ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi) != *negated
            }
        }
    }
}

/// A shell-style name pattern: `*`, `?`, `[abc]`, `[a-z]`, `[!a-z]`.
///
/// A backslash makes the next character literal. An unterminated `[` is
/// literal too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    pattern: String,
    tokens: Vec<Token>,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            tokens: parse_tokens(pattern),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, name: &str) -> bool {
        let name: Vec<char> = name.chars().collect();
        let tokens = &self.tokens;
        let (mut p, mut n) = (0, 0);
        let mut backtrack: Option<(usize, usize)> = None;

        while n < name.len() {
            match tokens.get(p) {
                Some(Token::AnySequence) => {
                    backtrack = Some((p, n));
                    p += 1;
                    continue;
                }
                Some(token) if token.matches(name[n]) => {
                    p += 1;
                    n += 1;
                    continue;
                }
                _ => {}
            }
            // Let the last `*` swallow one more character.
            match backtrack {
                Some((star, consumed)) => {
                    p = star + 1;
                    n = consumed + 1;
                    backtrack = Some((star, consumed + 1));
                }
                None => return false,
            }
        }

        tokens[p..].iter().all(|token| *token == Token::AnySequence)
    }
}

fn parse_tokens(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => tokens.push(Token::AnySequence),
            '?' => tokens.push(Token::AnyChar),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                tokens.push(Token::Literal(chars[i]));
            }
            '[' => match parse_class(&chars[i + 1..]) {
                Some((token, used)) => {
                    tokens.push(token);
                    i += used;
                }
                None => tokens.push(Token::Literal('[')),
            },
            c => tokens.push(Token::Literal(c)),
        }
        i += 1;
    }
    tokens
}

/// Parse the body of a `[...]` class. Returns the token and the number of
/// characters consumed, including the closing bracket.
fn parse_class(chars: &[char]) -> Option<(Token, usize)> {
    let mut i = 0;
    let negated = matches!(chars.first(), Some('!') | Some('^'));
    if negated {
        i += 1;
    }

    let mut ranges = Vec::new();
    let mut first = true;
    while i < chars.len() {
        let c = chars[i];
        if c == ']' && !first {
            return Some((Token::Class { negated, ranges }, i + 1));
        }
        first = false;
        if i + 2 < chars.len() && chars[i + 1] == '-' && chars[i + 2] != ']' {
            ranges.push((c, chars[i + 2]));
            i += 3;
        } else {
            ranges.push((c, c));
            i += 1;
        }
    }
    None
}

/// Restricts which joints an animation binds.
///
/// A joint is included if its name matches an include pattern and excluded
/// if it matches an exclude pattern; otherwise it inherits the decision of
/// its parent. With no include patterns the root starts out included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartSubset {
    include: Vec<GlobPattern>,
    exclude: Vec<GlobPattern>,
}

impl PartSubset {
    /// Include everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_include_joint(&mut self, pattern: &str) -> &mut Self {
        self.include.push(GlobPattern::new(pattern));
        self
    }

    pub fn add_exclude_joint(&mut self, pattern: &str) -> &mut Self {
        self.exclude.push(GlobPattern::new(pattern));
        self
    }

    /// Append another subset's patterns to this one.
    pub fn append(&mut self, other: &PartSubset) {
        self.include.extend(other.include.iter().cloned());
        self.exclude.extend(other.exclude.iter().cloned());
    }

    pub fn is_include_empty(&self) -> bool {
        self.include.is_empty()
    }

    pub fn matches_include(&self, joint_name: &str) -> bool {
        self.include.iter().any(|glob| glob.matches(joint_name))
    }

    pub fn matches_exclude(&self, joint_name: &str) -> bool {
        self.exclude.iter().any(|glob| glob.matches(joint_name))
    }

    /// Apply this subset's patterns at one node, given the parent's decision.
    pub(crate) fn resolve(&self, joint_name: &str, parent_included: bool) -> bool {
        if self.matches_include(joint_name) {
            true
        } else if self.matches_exclude(joint_name) {
            false
        } else {
            parent_included
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_wildcards() {
        let glob = GlobPattern::new("Left*Hand?");
        assert!(glob.matches("LeftHand1"));
        assert!(glob.matches("LeftUpperHandX"));
        assert!(!glob.matches("LeftHand"));
        assert!(!glob.matches("RightHand1"));

        assert!(GlobPattern::new("*").matches(""));
        assert!(GlobPattern::new("a*b*c").matches("aXXbYYc"));
        assert!(!GlobPattern::new("a*b*c").matches("aXXbYY"));
    }

    #[test]
    fn test_glob_classes() {
        let glob = GlobPattern::new("finger[0-3]");
        assert!(glob.matches("finger2"));
        assert!(!glob.matches("finger7"));

        let negated = GlobPattern::new("joint[!ab]");
        assert!(negated.matches("jointc"));
        assert!(!negated.matches("jointa"));

        assert!(GlobPattern::new("[]x]").matches("]"));
        assert!(GlobPattern::new("open[").matches("open["));
        assert!(GlobPattern::new("a\\*").matches("a*"));
        assert!(!GlobPattern::new("a\\*").matches("ab"));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let mut subset = PartSubset::new();
        subset.add_include_joint("neck").add_exclude_joint("neck");
        assert!(subset.resolve("neck", false));
        assert!(!subset.resolve("spine", false));
        assert!(subset.resolve("spine", true));
        assert!(!subset.is_include_empty());
    }
}
