use crate::ast::{PipelineSegment, Redirect, RedirectKind, Word, WordChar};
use crate::error::TokenizerError;
use crate::quoting::QuoteMode;

/// A token produced by [`tokenize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A word, with quotes removed.
    Word(Word),
    /// A redirection operator.
    Redirect(RedirectKind),
}

/// Splits an expanded command into words and redirection operators.
///
/// Quote characters are consumed. Glob metacharacters keep their special meaning only when
/// they appear unquoted and unescaped.
///
/// # Arguments
///
/// * `input` - The command text to tokenize.
pub fn tokenize(input: &str) -> Result<Vec<Token>, TokenizerError> {
    tracing::debug!(target: "tokenize", "tokenizing: {input:?}");
    Tokenizer::new(input).run()
}

/// Separates a token stream into a pipeline segment's words and redirections.
///
/// # Arguments
///
/// * `tokens` - Tokens produced by [`tokenize`].
pub fn parse_segment(tokens: Vec<Token>) -> Result<PipelineSegment, TokenizerError> {
    let mut segment = PipelineSegment::default();
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        match token {
            Token::Word(word) => segment.words.push(word),
            Token::Redirect(kind) if kind.takes_target() => match tokens.next() {
                Some(Token::Word(target)) => segment.redirects.push(Redirect {
                    kind,
                    target: Some(target),
                }),
                _ => return Err(TokenizerError::MissingRedirectTarget(kind.to_string())),
            },
            Token::Redirect(kind) => segment.redirects.push(Redirect { kind, target: None }),
        }
    }

    Ok(segment)
}

struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    mode: QuoteMode,
    tokens: Vec<Token>,
    current: Vec<WordChar>,
    in_word: bool,
}

impl Tokenizer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            mode: QuoteMode::None,
            tokens: vec![],
            current: vec![],
            in_word: false,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizerError> {
        while let Some(c) = self.next_char() {
            match self.mode {
                QuoteMode::Single => {
                    if c == '\'' {
                        self.mode = QuoteMode::None;
                    } else {
                        self.push(WordChar::Literal(c));
                    }
                }
                QuoteMode::Double => match c {
                    '"' => self.mode = QuoteMode::None,
                    '\\' => match self.peek(0) {
                        Some('\n') => self.pos += 1,
                        Some(next @ ('$' | '"' | '\\' | '`')) => {
                            self.pos += 1;
                            self.push(WordChar::Literal(next));
                        }
                        _ => self.push(WordChar::Literal('\\')),
                    },
                    _ => self.push(WordChar::Literal(c)),
                },
                QuoteMode::None => self.unquoted(c),
            }
        }

        match self.mode {
            QuoteMode::Single => return Err(TokenizerError::UnterminatedSingleQuote),
            QuoteMode::Double => return Err(TokenizerError::UnterminatedDoubleQuote),
            QuoteMode::None => (),
        }

        self.delimit_word();
        Ok(self.tokens)
    }

    fn unquoted(&mut self, c: char) {
        match c {
            ' ' | '\t' | '\n' => self.delimit_word(),
            '\'' => {
                self.mode = QuoteMode::Single;
                self.in_word = true;
            }
            '"' => {
                self.mode = QuoteMode::Double;
                self.in_word = true;
            }
            '\\' => match self.next_char() {
                // Line continuation.
                Some('\n') => (),
                Some(next) => self.push(WordChar::Literal(next)),
                None => self.push(WordChar::Literal('\\')),
            },
            '*' | '?' | '[' | ']' => self.push(WordChar::Glob(c)),
            '>' => {
                self.delimit_word();
                let kind = match self.peek(0) {
                    Some('>') => {
                        self.pos += 1;
                        RedirectKind::StdoutAppend
                    }
                    Some('|') => {
                        self.pos += 1;
                        RedirectKind::StdoutTruncate
                    }
                    Some('&') if self.peek(1) == Some('2') => {
                        self.pos += 2;
                        RedirectKind::StdoutToStderr
                    }
                    _ => RedirectKind::StdoutTruncate,
                };
                self.tokens.push(Token::Redirect(kind));
            }
            '<' => {
                self.delimit_word();
                let kind = if self.peek(0) == Some('<') {
                    self.pos += 1;
                    if self.peek(0) == Some('-') {
                        self.pos += 1;
                    }
                    RedirectKind::HereDocument
                } else {
                    RedirectKind::StdinRead
                };
                self.tokens.push(Token::Redirect(kind));
            }
            '2' if !self.in_word && self.peek(0) == Some('>') => {
                self.pos += 1;
                let kind = match (self.peek(0), self.peek(1)) {
                    (Some('>'), _) => {
                        self.pos += 1;
                        RedirectKind::StderrAppend
                    }
                    (Some('&'), Some('1')) => {
                        self.pos += 2;
                        RedirectKind::StderrToStdout
                    }
                    _ => RedirectKind::StderrTruncate,
                };
                self.tokens.push(Token::Redirect(kind));
            }
            _ => self.push(WordChar::Literal(c)),
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn push(&mut self, c: WordChar) {
        self.current.push(c);
        self.in_word = true;
    }

    fn delimit_word(&mut self) {
        if self.in_word {
            let word = Word(std::mem::take(&mut self.current));
            self.tokens.push(Token::Word(word));
            self.in_word = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    fn words(input: &str) -> Result<Vec<String>> {
        Ok(tokenize(input)?
            .into_iter()
            .map(|t| match t {
                Token::Word(w) => w.to_string(),
                Token::Redirect(k) => format!("<{k}>"),
            })
            .collect())
    }

    #[test]
    fn splits_on_unquoted_whitespace() -> Result<()> {
        assert_eq!(words("echo  a\tb")?, vec!["echo", "a", "b"]);
        assert_eq!(words(r#"echo "a b" 'c d'"#)?, vec!["echo", "a b", "c d"]);
        assert_eq!(words(r#"x"y"'z'"#)?, vec!["xyz"]);
        Ok(())
    }

    #[test]
    fn single_quotes_are_fully_literal() -> Result<()> {
        for s in ["$HOME", "*.txt", "`date`", r"a\b", "$((1+2))"] {
            let tokens = tokenize(&format!("'{s}'"))?;
            assert_eq!(tokens, vec![Token::Word(Word::from(s))]);
        }
        Ok(())
    }

    #[test]
    fn empty_quotes_produce_empty_word() -> Result<()> {
        assert_eq!(words(r#"echo "" ''"#)?, vec!["echo", "", ""]);
        Ok(())
    }

    #[test]
    fn backslash_rules() -> Result<()> {
        assert_eq!(words(r"a\ b")?, vec!["a b"]);
        assert_eq!(words(r#""a\$b\x""#)?, vec![r"a$b\x"]);
        assert_eq!(words("a\\\nb")?, vec!["ab"]);
        assert_eq!(words(r"trailing\")?, vec![r"trailing\"]);
        Ok(())
    }

    #[test]
    fn glob_chars_are_tagged_only_when_unquoted() -> Result<()> {
        let tokens = tokenize(r#"*.txt "*".txt \*"#)?;
        let Token::Word(first) = &tokens[0] else {
            anyhow::bail!("expected word");
        };
        let Token::Word(second) = &tokens[1] else {
            anyhow::bail!("expected word");
        };
        let Token::Word(third) = &tokens[2] else {
            anyhow::bail!("expected word");
        };
        assert!(first.has_glob());
        assert!(!second.has_glob());
        assert!(!third.has_glob());
        assert_eq!(third.to_string(), "*");
        Ok(())
    }

    #[test]
    fn bracket_expressions_are_tagged() -> Result<()> {
        let tokens = tokenize(r#"[ab].txt "[ab]" ]"#)?;
        let Token::Word(bracket) = &tokens[0] else {
            anyhow::bail!("expected word");
        };
        assert_eq!(bracket.chars()[0], WordChar::Glob('['));
        assert_eq!(bracket.chars()[3], WordChar::Glob(']'));
        assert!(bracket.has_glob());

        let Token::Word(quoted) = &tokens[1] else {
            anyhow::bail!("expected word");
        };
        assert!(!quoted.has_glob());

        let Token::Word(closing) = &tokens[2] else {
            anyhow::bail!("expected word");
        };
        assert!(!closing.has_glob());
        assert_eq!(closing.to_string(), "]");
        Ok(())
    }

    #[test]
    fn redirect_operators() -> Result<()> {
        assert_eq!(
            words("cmd >out 2>>err <in")?,
            vec!["cmd", "<>>", "out", "<2>>>", "err", "<<>", "in"]
        );
        assert_eq!(words("echo hi>|f 2>&1")?, vec!["echo", "hi", "<>>", "f", "<2>&1>"]);
        assert_eq!(words("echo a2>f")?, vec!["echo", "a2", "<>>", "f"]);
        assert_eq!(words("echo '>' \\>")?, vec!["echo", ">", ">"]);
        assert_eq!(words("echo oops >&2")?, vec!["echo", "oops", "<>&2>"]);
        Ok(())
    }

    #[test]
    fn unterminated_quotes_are_errors() {
        assert_eq!(
            tokenize("echo 'abc"),
            Err(TokenizerError::UnterminatedSingleQuote)
        );
        assert_eq!(
            tokenize("echo \"abc"),
            Err(TokenizerError::UnterminatedDoubleQuote)
        );
    }

    #[test]
    fn segment_pairs_redirects_with_targets() -> Result<()> {
        let segment = parse_segment(tokenize("sort < in > out 2>&1")?)?;
        assert_eq!(segment.words, vec![Word::from("sort")]);
        assert_eq!(
            segment.redirects,
            vec![
                Redirect {
                    kind: RedirectKind::StdinRead,
                    target: Some(Word::from("in"))
                },
                Redirect {
                    kind: RedirectKind::StdoutTruncate,
                    target: Some(Word::from("out"))
                },
                Redirect {
                    kind: RedirectKind::StderrToStdout,
                    target: None
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn missing_redirect_target() -> Result<()> {
        assert_eq!(
            parse_segment(tokenize("echo >")?),
            Err(TokenizerError::MissingRedirectTarget(">".into()))
        );
        Ok(())
    }
}
