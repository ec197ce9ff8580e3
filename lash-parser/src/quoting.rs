//! Quote-state tracking shared by every scanning pass.
//!
//! The splitters, the heredoc extractor, the statement parser, and the expansion engine all
//! walk raw text one character at a time. They all do it through [`QuoteTracker`] so that
//! the answer to "is this character quoted?" can never differ between passes.

/// The quoting mode in effect at a given point in the text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuoteMode {
    /// No quotes are open.
    #[default]
    None,
    /// Inside a single-quoted region.
    Single,
    /// Inside a double-quoted region.
    Double,
}

/// Classification of a single character fed to a [`QuoteTracker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharState {
    /// Unquoted, unescaped, and outside any substitution; the character has syntactic meaning.
    Active,
    /// The character opens or closes a quoted region, or is an escaping backslash.
    Delimiter,
    /// The character is protected by an enclosing quote or substitution.
    Quoted,
    /// The character was escaped by a preceding backslash.
    Escaped,
}

#[derive(Clone, Copy, Debug)]
enum Context {
    Single,
    Double,
    Backtick,
    Subst { parens: usize },
    Brace,
}

/// Incremental quote-state machine.
#[derive(Clone, Debug, Default)]
pub struct QuoteTracker {
    stack: Vec<Context>,
    escaped: bool,
    after_dollar: bool,
}

impl QuoteTracker {
    /// Returns a tracker positioned at the start of unquoted text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the quote mode of the innermost quoted region, if any.
    pub fn mode(&self) -> QuoteMode {
        match self.stack.last() {
            Some(Context::Single) => QuoteMode::Single,
            Some(Context::Double) => QuoteMode::Double,
            _ => QuoteMode::None,
        }
    }

    /// Returns the nesting depth of quotes and substitutions currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns whether the next character will be taken literally due to a backslash.
    pub const fn is_escaping(&self) -> bool {
        self.escaped
    }

    /// Returns whether the tracker is back in plain unquoted text.
    pub fn is_unquoted(&self) -> bool {
        self.stack.is_empty() && !self.escaped
    }

    /// Feeds the next character of the text and classifies it.
    ///
    /// # Arguments
    ///
    /// * `c` - The next character.
    pub fn feed(&mut self, c: char) -> CharState {
        if self.escaped {
            self.escaped = false;
            self.after_dollar = false;
            return CharState::Escaped;
        }

        let after_dollar = std::mem::take(&mut self.after_dollar);

        match self.stack.last().copied() {
            Some(Context::Single) => {
                if c == '\'' {
                    self.stack.pop();
                    CharState::Delimiter
                } else {
                    CharState::Quoted
                }
            }
            Some(Context::Backtick) => {
                match c {
                    '\\' => self.escaped = true,
                    '`' => {
                        self.stack.pop();
                        return CharState::Delimiter;
                    }
                    _ => (),
                }
                CharState::Quoted
            }
            Some(Context::Brace) => {
                if c == '}' {
                    self.stack.pop();
                }
                CharState::Quoted
            }
            Some(Context::Double) => {
                if after_dollar && self.open_after_dollar(c) {
                    return CharState::Quoted;
                }

                match c {
                    '\\' => self.escaped = true,
                    '"' => {
                        self.stack.pop();
                        return CharState::Delimiter;
                    }
                    '`' => self.stack.push(Context::Backtick),
                    '$' => self.after_dollar = true,
                    _ => (),
                }
                CharState::Quoted
            }
            Some(Context::Subst { parens }) => {
                if after_dollar && self.open_after_dollar(c) {
                    return CharState::Quoted;
                }

                match c {
                    '\\' => self.escaped = true,
                    '\'' => self.stack.push(Context::Single),
                    '"' => self.stack.push(Context::Double),
                    '`' => self.stack.push(Context::Backtick),
                    '$' => self.after_dollar = true,
                    '(' => self.set_top(Context::Subst { parens: parens + 1 }),
                    ')' => {
                        if parens == 0 {
                            self.stack.pop();
                        } else {
                            self.set_top(Context::Subst { parens: parens - 1 });
                        }
                    }
                    _ => (),
                }
                CharState::Quoted
            }
            None => {
                if after_dollar && self.open_after_dollar(c) {
                    return CharState::Quoted;
                }

                match c {
                    '\\' => {
                        self.escaped = true;
                        CharState::Delimiter
                    }
                    '\'' => {
                        self.stack.push(Context::Single);
                        CharState::Delimiter
                    }
                    '"' => {
                        self.stack.push(Context::Double);
                        CharState::Delimiter
                    }
                    '`' => {
                        self.stack.push(Context::Backtick);
                        CharState::Delimiter
                    }
                    '$' => {
                        self.after_dollar = true;
                        CharState::Active
                    }
                    _ => CharState::Active,
                }
            }
        }
    }

    fn open_after_dollar(&mut self, c: char) -> bool {
        match c {
            '(' => {
                self.stack.push(Context::Subst { parens: 0 });
                true
            }
            '{' => {
                self.stack.push(Context::Brace);
                true
            }
            _ => false,
        }
    }

    fn set_top(&mut self, context: Context) {
        if let Some(top) = self.stack.last_mut() {
            *top = context;
        }
    }
}

/// Finds the byte index of the character closing the substitution that starts at `start`.
///
/// `start` must index a `$` followed by `(` or `{`, or a backquote. Returns `None` if the
/// substitution is never closed.
///
/// # Arguments
///
/// * `text` - The text to scan.
/// * `start` - Byte index of the substitution's first character.
pub fn find_closing_paren(text: &str, start: usize) -> Option<usize> {
    let mut tracker = QuoteTracker::new();
    let mut opened = false;

    for (i, c) in text.get(start..)?.char_indices() {
        tracker.feed(c);
        if tracker.depth() > 0 {
            opened = true;
        } else if opened {
            return Some(start + i);
        } else if i > 0 {
            // Nothing was opened by the leading characters.
            return None;
        }
    }

    None
}

/// Returns whether the given string is a valid variable or function name.
///
/// # Arguments
///
/// * `s` - The candidate name.
pub fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn states(s: &str) -> Vec<CharState> {
        let mut tracker = QuoteTracker::new();
        s.chars().map(|c| tracker.feed(c)).collect()
    }

    #[test]
    fn single_quotes_protect_everything() {
        assert_eq!(
            states("'a$'"),
            vec![
                CharState::Delimiter,
                CharState::Quoted,
                CharState::Quoted,
                CharState::Delimiter
            ]
        );
    }

    #[test]
    fn backslash_escapes_next_char() {
        assert_eq!(
            states(r"\;;"),
            vec![CharState::Delimiter, CharState::Escaped, CharState::Active]
        );
    }

    #[test]
    fn command_substitution_is_opaque() {
        let s = "$(a; b) ;";
        let st = states(s);
        assert_eq!(st[0], CharState::Active);
        assert!(st[1..7].iter().all(|s| *s == CharState::Quoted));
        assert_eq!(st[8], CharState::Active);
    }

    #[test]
    fn double_quote_mode_is_reported() {
        let mut tracker = QuoteTracker::new();
        tracker.feed('"');
        assert_eq!(tracker.mode(), QuoteMode::Double);
        tracker.feed('"');
        assert_eq!(tracker.mode(), QuoteMode::None);
        assert!(tracker.is_unquoted());
    }

    #[test]
    fn closing_paren_skips_nested_quotes() {
        let text = r#"x $(echo ")" (a)) y"#;
        assert_eq!(find_closing_paren(text, 2), Some(16));
        assert_eq!(find_closing_paren("$((1 + 2)) z", 0), Some(9));
        assert_eq!(find_closing_paren("${HOME}/x", 0), Some(6));
        assert_eq!(find_closing_paren("`a b` c", 0), Some(4));
        assert_eq!(find_closing_paren("$(unterminated", 0), None);
    }

    #[test]
    fn names() {
        assert!(is_valid_name("abc_1"));
        assert!(is_valid_name("_x"));
        assert!(!is_valid_name("1x"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a-b"));
    }
}
