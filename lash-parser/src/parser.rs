//! Incremental statement parser.
//!
//! Source text is carved into *pieces*: runs of text delimited by unquoted newlines or `;`.
//! Control-construct keywords are only recognized at the start of a piece, and a construct's
//! closing keyword may be followed by `&&` or `||` and another command on the same line.

use std::collections::VecDeque;

use crate::ast::{
    CaseCommand, CaseItem, Command, CompoundOperator, ConditionalBranch, ForCommand,
    FunctionDefinition, IfCommand, Statement, WhileCommand,
};
use crate::error::ParseError;
use crate::quoting::{CharState, QuoteTracker, is_valid_name};
use crate::split::strip_background_operator;

const KEYWORDS: &[&str] = &[
    "if", "then", "elif", "else", "fi", "while", "until", "do", "done", "for", "case", "esac",
];

#[derive(Clone, Debug)]
enum Piece {
    Text {
        text: String,
        connector: CompoundOperator,
    },
    CaseBreak,
    Function(FunctionDefinition),
}

/// Parses statements one at a time, so a caller can execute each statement before the next
/// is parsed.
pub struct Parser<'a> {
    source: &'a str,
    pos: usize,
    pending: VecDeque<Piece>,
}

impl<'a> Parser<'a> {
    /// Returns a parser over the given source text.
    ///
    /// # Arguments
    ///
    /// * `source` - Source text, with here-document bodies already removed.
    pub const fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            pending: VecDeque::new(),
        }
    }

    /// Parses the next statement; returns `None` at end of input.
    pub fn next_statement(&mut self) -> Option<Result<Statement, ParseError>> {
        self.parse_statement().transpose()
    }

    fn parse_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        let Some(piece) = self.next_piece()? else {
            return Ok(None);
        };

        let (connector, text) = match piece {
            Piece::CaseBreak => return Err(ParseError::UnexpectedKeyword(";;".into())),
            Piece::Function(def) => {
                tracing::debug!(target: "parse", "function definition: {}", def.name);
                return Ok(Some(Statement {
                    connector: CompoundOperator::None,
                    command: Command::Function(def),
                }));
            }
            Piece::Text { text, connector } => (connector, text),
        };

        let command = match split_keyword(&text) {
            (Some("if"), rest) => self.parse_if(rest)?,
            (Some("while"), rest) => self.parse_while(rest, false)?,
            (Some("until"), rest) => self.parse_while(rest, true)?,
            (Some("for"), rest) => self.parse_for(rest)?,
            (Some("case"), rest) => self.parse_case(rest)?,
            (Some(keyword), _) => return Err(ParseError::UnexpectedKeyword(keyword.to_owned())),
            (None, _) => match strip_background_operator(&text) {
                Some(command) => Command::Background(command.to_owned()),
                None => Command::Simple(text.clone()),
            },
        };

        Ok(Some(Statement { connector, command }))
    }

    fn parse_if(&mut self, rest: &str) -> Result<Command, ParseError> {
        let mut branches = vec![];
        let mut condition = self.parse_condition(rest, "then", "if")?;

        loop {
            let body = self.parse_statements_until(&["elif", "else", "fi"], "if")?;
            branches.push(ConditionalBranch { condition, body });

            let (keyword, rest) = self.take_terminator("if")?;
            match keyword.as_str() {
                "elif" => condition = self.parse_condition(&rest, "then", "if")?,
                "else" => {
                    self.push_front_text(&rest, CompoundOperator::None);
                    let else_body = self.parse_statements_until(&["fi"], "if")?;
                    let (_, rest) = self.take_terminator("if")?;
                    self.finish_construct(&rest)?;
                    return Ok(Command::If(IfCommand {
                        branches,
                        else_body: Some(else_body),
                    }));
                }
                _ => {
                    self.finish_construct(&rest)?;
                    return Ok(Command::If(IfCommand {
                        branches,
                        else_body: None,
                    }));
                }
            }
        }
    }

    fn parse_while(&mut self, rest: &str, until: bool) -> Result<Command, ParseError> {
        let construct = if until { "until" } else { "while" };
        let condition = self.parse_condition(rest, "do", construct)?;
        let body = self.parse_statements_until(&["done"], construct)?;
        let (_, rest) = self.take_terminator(construct)?;
        self.finish_construct(&rest)?;

        Ok(Command::While(WhileCommand {
            until,
            condition,
            body,
        }))
    }

    fn parse_for(&mut self, rest: &str) -> Result<Command, ParseError> {
        let (variable, after) = split_first_word(rest);
        if !is_valid_name(variable) {
            return Err(ParseError::InvalidIdentifier(variable.to_owned()));
        }

        let values = match split_first_word(after) {
            ("", _) => None,
            ("in", list) => Some(list.trim().to_owned()),
            _ => {
                return Err(ParseError::MissingKeyword {
                    expected: "in",
                    construct: "for",
                });
            }
        };

        self.expect_keyword("do", "for")?;
        let body = self.parse_statements_until(&["done"], "for")?;
        let (_, rest) = self.take_terminator("for")?;
        self.finish_construct(&rest)?;

        Ok(Command::For(ForCommand {
            variable: variable.to_owned(),
            values,
            body,
        }))
    }

    fn parse_case(&mut self, rest: &str) -> Result<Command, ParseError> {
        let missing_in = ParseError::MissingKeyword {
            expected: "in",
            construct: "case",
        };

        let (word, after) = split_first_word(rest);
        let (keyword, clauses) = split_first_word(after);
        if word.is_empty() || keyword != "in" {
            return Err(missing_in);
        }

        self.push_front_text(clauses, CompoundOperator::None);

        let mut items = vec![];
        loop {
            let text = match self.next_piece()? {
                None => return Err(ParseError::Unterminated("case")),
                Some(Piece::CaseBreak) => continue,
                Some(Piece::Function(def)) => {
                    return Err(ParseError::UnexpectedKeyword(def.name));
                }
                Some(Piece::Text { text, .. }) => text,
            };

            if let (Some("esac"), rest) = split_keyword(&text) {
                self.finish_construct(rest)?;
                break;
            }

            let (patterns, body_text) =
                split_case_pattern(&text).ok_or(ParseError::MissingKeyword {
                    expected: ")",
                    construct: "case",
                })?;
            self.push_front_text(body_text, CompoundOperator::None);

            let body = self.parse_statements_until(&[";;", "esac"], "case")?;
            items.push(CaseItem {
                patterns: patterns.to_owned(),
                body,
            });
        }

        Ok(Command::Case(CaseCommand {
            word: word.to_owned(),
            items,
        }))
    }

    /// Collects condition pieces up to the piece starting with `terminator`.
    fn parse_condition(
        &mut self,
        first: &str,
        terminator: &'static str,
        construct: &'static str,
    ) -> Result<String, ParseError> {
        let mut parts = vec![];
        if !first.is_empty() {
            parts.push(first.to_owned());
        }

        loop {
            match self.next_piece()? {
                None => return Err(ParseError::Unterminated(construct)),
                Some(Piece::Text { text, .. }) => match split_keyword(&text) {
                    (Some(keyword), rest) if keyword == terminator => {
                        self.push_front_text(rest, CompoundOperator::None);
                        break;
                    }
                    (Some(keyword), _) => {
                        return Err(ParseError::UnexpectedKeyword(keyword.to_owned()));
                    }
                    (None, _) => parts.push(text),
                },
                Some(_) => {
                    return Err(ParseError::MissingKeyword {
                        expected: terminator,
                        construct,
                    });
                }
            }
        }

        if parts.is_empty() {
            return Err(ParseError::UnexpectedKeyword(terminator.to_owned()));
        }

        Ok(parts.join("; "))
    }

    fn parse_statements_until(
        &mut self,
        terminators: &[&str],
        construct: &'static str,
    ) -> Result<Vec<Statement>, ParseError> {
        let mut statements = vec![];

        loop {
            let piece = self
                .next_piece()?
                .ok_or(ParseError::Unterminated(construct))?;

            let is_terminator = match &piece {
                Piece::CaseBreak => terminators.contains(&";;"),
                Piece::Text { text, .. } => {
                    matches!(split_keyword(text), (Some(k), _) if terminators.contains(&k))
                }
                Piece::Function(_) => false,
            };

            self.pending.push_front(piece);
            if is_terminator {
                return Ok(statements);
            }

            let statement = self
                .parse_statement()?
                .ok_or(ParseError::Unterminated(construct))?;
            statements.push(statement);
        }
    }

    fn expect_keyword(
        &mut self,
        keyword: &'static str,
        construct: &'static str,
    ) -> Result<(), ParseError> {
        match self.next_piece()? {
            None => Err(ParseError::Unterminated(construct)),
            Some(Piece::Text { text, .. }) => match split_keyword(&text) {
                (Some(k), rest) if k == keyword => {
                    self.push_front_text(rest, CompoundOperator::None);
                    Ok(())
                }
                _ => Err(ParseError::MissingKeyword {
                    expected: keyword,
                    construct,
                }),
            },
            Some(_) => Err(ParseError::MissingKeyword {
                expected: keyword,
                construct,
            }),
        }
    }

    fn take_terminator(&mut self, construct: &'static str) -> Result<(String, String), ParseError> {
        match self.next_piece()? {
            Some(Piece::Text { text, .. }) => {
                let (keyword, rest) = split_keyword(&text);
                Ok((keyword.unwrap_or_default().to_owned(), rest.to_owned()))
            }
            _ => Err(ParseError::Unterminated(construct)),
        }
    }

    /// Handles text following a construct's closing keyword.
    fn finish_construct(&mut self, rest: &str) -> Result<(), ParseError> {
        let rest = rest.trim();
        if rest.is_empty() {
            return Ok(());
        }

        if let Some(command) = rest.strip_prefix("&&") {
            self.push_front_text(command, CompoundOperator::And);
        } else if let Some(command) = rest.strip_prefix("||") {
            self.push_front_text(command, CompoundOperator::Or);
        } else {
            let (word, _) = split_first_word(rest);
            return Err(ParseError::UnexpectedKeyword(word.to_owned()));
        }

        Ok(())
    }

    fn push_front_text(&mut self, text: &str, connector: CompoundOperator) {
        let text = text.trim();
        if !text.is_empty() {
            self.pending.push_front(Piece::Text {
                text: text.to_owned(),
                connector,
            });
        }
    }

    fn next_piece(&mut self) -> Result<Option<Piece>, ParseError> {
        if self.pending.is_empty() {
            self.read_source()?;
        }
        Ok(self.pending.pop_front())
    }

    /// Reads the next non-empty piece(s) from the source into the pending queue.
    fn read_source(&mut self) -> Result<(), ParseError> {
        let source = self.source;
        loop {
            let rest = &source[self.pos..];
            let skipped = rest.len() - rest.trim_start().len();
            self.pos += skipped;
            if self.pos >= source.len() {
                return Ok(());
            }

            if let Some(def) = self.function_definition()? {
                self.pending.push_back(Piece::Function(def));
                return Ok(());
            }

            // A body keyword on the same line as a function definition becomes its own piece.
            if let Some((keyword, offset)) = keyword_before_function(&source[self.pos..]) {
                self.pending.push_back(Piece::Text {
                    text: keyword.to_owned(),
                    connector: CompoundOperator::None,
                });
                self.pos += offset;
                continue;
            }

            let rest = &source[self.pos..];
            let mut tracker = QuoteTracker::new();
            let mut text = String::new();
            let mut prev: Option<char> = None;
            let mut consumed = rest.len();
            let mut case_break = false;
            let mut chars = rest.char_indices().peekable();

            while let Some((i, c)) = chars.next() {
                if tracker.feed(c) == CharState::Active {
                    match c {
                        '#' if prev.is_none_or(char::is_whitespace) => {
                            while chars.next_if(|(_, n)| *n != '\n').is_some() {}
                            continue;
                        }
                        '\n' if ends_with_continuation(&text) => {
                            while chars.next_if(|(_, n)| matches!(n, ' ' | '\t')).is_some() {}
                            text.push(' ');
                            prev = Some(' ');
                            continue;
                        }
                        '\n' => {
                            consumed = i + 1;
                            break;
                        }
                        ';' => {
                            if chars.peek().is_some_and(|(_, n)| *n == ';') {
                                case_break = true;
                                consumed = i + 2;
                            } else {
                                consumed = i + 1;
                            }
                            break;
                        }
                        _ => (),
                    }
                }

                text.push(c);
                prev = Some(c);
            }

            self.pos += consumed;

            let text = text.trim();
            if !text.is_empty() {
                self.pending.push_back(Piece::Text {
                    text: text.to_owned(),
                    connector: CompoundOperator::None,
                });
            }
            if case_break {
                self.pending.push_back(Piece::CaseBreak);
            }
            if !self.pending.is_empty() {
                return Ok(());
            }
        }
    }

    fn function_definition(&mut self) -> Result<Option<FunctionDefinition>, ParseError> {
        let source = self.source;
        let rest = &source[self.pos..];
        let Some((name, open)) = function_header(rest) else {
            return Ok(None);
        };

        let close =
            find_closing_brace(rest, open + 1).ok_or(ParseError::Unterminated("function"))?;

        let def = FunctionDefinition {
            name: name.to_owned(),
            body: rest[open + 1..close].trim().to_owned(),
        };
        self.pos += close + 1;

        Ok(Some(def))
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<Statement, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_statement()
    }
}

/// Parses a whole block of source text into statements.
///
/// # Arguments
///
/// * `source` - Source text, with here-document bodies already removed.
pub fn parse_block(source: &str) -> Result<Vec<Statement>, ParseError> {
    Parser::new(source).collect()
}

fn split_keyword(text: &str) -> (Option<&str>, &str) {
    let (word, rest) = split_first_word(text);
    if KEYWORDS.contains(&word) {
        (Some(word), rest.trim())
    } else {
        (None, text.trim())
    }
}

/// Splits off the first word, ending at the first unquoted whitespace.
fn split_first_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    let mut tracker = QuoteTracker::new();

    for (i, c) in text.char_indices() {
        if tracker.feed(c) == CharState::Active && c.is_whitespace() {
            return (&text[..i], text[i..].trim_start());
        }
    }

    (text, "")
}

fn split_case_pattern(text: &str) -> Option<(&str, &str)> {
    let text = text.trim();
    let text = text.strip_prefix('(').unwrap_or(text);
    let mut tracker = QuoteTracker::new();

    for (i, c) in text.char_indices() {
        if tracker.feed(c) == CharState::Active && c == ')' {
            return Some((text[..i].trim(), text[i + 1..].trim()));
        }
    }

    None
}

fn ends_with_continuation(text: &str) -> bool {
    let text = text.trim_end();
    text.ends_with("&&") || (text.ends_with('|') && !text.ends_with("\\|"))
}

/// Recognizes `name() {` or `function name [()] {`, returning the name and the byte offset
/// of the opening brace.
fn function_header(text: &str) -> Option<(&str, usize)> {
    let (name_start, explicit) = match text.strip_prefix("function") {
        Some(rest) if rest.starts_with([' ', '\t']) => {
            (text.len() - rest.trim_start_matches([' ', '\t']).len(), true)
        }
        _ => (0, false),
    };

    let name_len = text[name_start..]
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len() - name_start);
    let name = &text[name_start..name_start + name_len];
    if !is_valid_name(name) {
        return None;
    }

    let mut rest = text[name_start + name_len..].trim_start_matches([' ', '\t']);
    let has_parens = if let Some(inner) = rest.strip_prefix('(') {
        rest = inner.trim_start_matches([' ', '\t']).strip_prefix(')')?;
        true
    } else {
        false
    };

    if !explicit && !has_parens {
        return None;
    }

    let rest = rest.trim_start();
    let after_brace = rest.strip_prefix('{')?;
    if !after_brace.is_empty() && !after_brace.starts_with(char::is_whitespace) {
        return None;
    }

    Some((name, text.len() - rest.len()))
}

/// Recognizes a body-opening keyword directly followed by a function definition, returning
/// the keyword and the byte offset of the definition.
fn keyword_before_function(text: &str) -> Option<(&'static str, usize)> {
    ["then", "do", "else"].into_iter().find_map(|keyword| {
        let rest = text.strip_prefix(keyword)?;
        let definition = rest.trim_start();
        if definition.len() == rest.len() {
            return None;
        }

        function_header(definition)?;
        Some((keyword, text.len() - definition.len()))
    })
}

fn find_closing_brace(text: &str, start: usize) -> Option<usize> {
    let mut tracker = QuoteTracker::new();
    let mut depth = 1usize;
    let mut prev: Option<char> = None;
    let mut chars = text[start..].char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if tracker.feed(c) == CharState::Active {
            match c {
                '#' if prev.is_none_or(char::is_whitespace) => {
                    while chars.next_if(|(_, n)| *n != '\n').is_some() {}
                    continue;
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(start + i);
                    }
                }
                _ => (),
            }
        }
        prev = Some(c);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    fn simple(text: &str) -> Statement {
        Statement {
            connector: CompoundOperator::None,
            command: Command::Simple(text.into()),
        }
    }

    #[test]
    fn simple_lines_and_comments() -> Result<()> {
        let statements = parse_block("echo a; echo b # c\n\n# only a comment\necho $# d\n")?;
        assert_eq!(
            statements,
            vec![simple("echo a"), simple("echo b"), simple("echo $# d")]
        );
        Ok(())
    }

    #[test]
    fn compound_operators_stay_in_one_statement() -> Result<()> {
        assert_eq!(
            parse_block("false && echo A || echo B")?,
            vec![simple("false && echo A || echo B")]
        );
        assert_eq!(
            parse_block("echo a &&\n  echo b |\n cat")?,
            vec![simple("echo a && echo b | cat")]
        );
        Ok(())
    }

    #[test]
    fn quoted_separators_do_not_split() -> Result<()> {
        assert_eq!(
            parse_block("echo 'a;b' \"c\nd\" # x")?,
            vec![simple("echo 'a;b' \"c\nd\"")]
        );
        Ok(())
    }

    #[test]
    fn single_line_if_else() -> Result<()> {
        let statements = parse_block(r#"if [ -z "" ]; then echo yes; else echo no; fi"#)?;
        assert_eq!(
            statements,
            vec![Statement {
                connector: CompoundOperator::None,
                command: Command::If(IfCommand {
                    branches: vec![ConditionalBranch {
                        condition: r#"[ -z "" ]"#.into(),
                        body: vec![simple("echo yes")],
                    }],
                    else_body: Some(vec![simple("echo no")]),
                }),
            }]
        );
        Ok(())
    }

    #[test]
    fn multi_line_if_elif() -> Result<()> {
        let source = "if false\nthen\n  echo a\nelif true; then\n  echo b\n  echo c\nfi\necho after";
        let statements = parse_block(source)?;
        assert_eq!(statements.len(), 2);

        let Command::If(cmd) = &statements[0].command else {
            anyhow::bail!("expected if");
        };
        assert_eq!(cmd.branches.len(), 2);
        assert_eq!(cmd.branches[0].condition, "false");
        assert_eq!(cmd.branches[1].condition, "true");
        assert_eq!(
            cmd.branches[1].body,
            vec![simple("echo b"), simple("echo c")]
        );
        assert!(cmd.else_body.is_none());
        assert_eq!(statements[1], simple("echo after"));
        Ok(())
    }

    #[test]
    fn loops() -> Result<()> {
        let statements =
            parse_block("for i in 1 2 3; do echo $i; done\nwhile false; do :; done\nuntil true\ndo\n:\ndone")?;

        assert_eq!(
            statements[0].command,
            Command::For(ForCommand {
                variable: "i".into(),
                values: Some("1 2 3".into()),
                body: vec![simple("echo $i")],
            })
        );
        assert!(matches!(&statements[1].command, Command::While(w) if !w.until));
        assert!(matches!(&statements[2].command, Command::While(w) if w.until && w.condition == "true"));
        Ok(())
    }

    #[test]
    fn for_without_in() -> Result<()> {
        let statements = parse_block("for arg\ndo\necho $arg\ndone")?;
        assert!(matches!(&statements[0].command, Command::For(f) if f.values.is_none()));
        Ok(())
    }

    #[test]
    fn nested_constructs() -> Result<()> {
        let statements =
            parse_block("for i in a b; do if [ $i = a ]; then echo A; fi; done")?;
        let Command::For(cmd) = &statements[0].command else {
            anyhow::bail!("expected for");
        };
        assert!(matches!(cmd.body[0].command, Command::If(_)));
        Ok(())
    }

    #[test]
    fn case_clauses() -> Result<()> {
        let single = parse_block("case $x in a) echo a;; b|c) echo bc;; *) echo other;; esac")?;
        let multi = parse_block("case $x in\n  a)\n    echo a\n    ;;\n  b|c) echo bc ;;\n  *)\n    echo other\n    ;;\nesac")?;

        for statements in [single, multi] {
            let Command::Case(cmd) = &statements[0].command else {
                anyhow::bail!("expected case");
            };
            assert_eq!(cmd.word, "$x");
            let patterns: Vec<_> = cmd.items.iter().map(|i| i.patterns.as_str()).collect();
            assert_eq!(patterns, vec!["a", "b|c", "*"]);
            assert_eq!(cmd.items[1].body, vec![simple("echo bc")]);
        }
        Ok(())
    }

    #[test]
    fn function_definitions() -> Result<()> {
        let source = "greet() { echo \"hi $1\"; }\nfunction twice {\n  # don't { count this\n  greet $1; greet $1\n}\nfunction other()\n{\n  echo ${#X}\n}; greet x";
        let statements = parse_block(source)?;

        let names: Vec<_> = statements
            .iter()
            .filter_map(|s| match &s.command {
                Command::Function(def) => Some(def.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["greet", "twice", "other"]);

        let Command::Function(def) = &statements[0].command else {
            anyhow::bail!("expected function");
        };
        assert_eq!(def.body, "echo \"hi $1\";");
        assert_eq!(statements.last(), Some(&simple("greet x")));
        Ok(())
    }

    #[test]
    fn function_definitions_inside_construct_bodies() -> Result<()> {
        let statements = parse_block("if true; then f() { echo inner; }; fi; f")?;
        assert_eq!(statements.len(), 2);

        let Command::If(cmd) = &statements[0].command else {
            anyhow::bail!("expected if");
        };
        let Command::Function(def) = &cmd.branches[0].body[0].command else {
            anyhow::bail!("expected function");
        };
        assert_eq!(def.name, "f");
        assert_eq!(def.body, "echo inner;");
        assert_eq!(statements[1], simple("f"));

        let statements = parse_block("for i in 1; do function g { :; }; done")?;
        let Command::For(cmd) = &statements[0].command else {
            anyhow::bail!("expected for");
        };
        assert!(matches!(&cmd.body[0].command, Command::Function(def) if def.name == "g"));

        let statements = parse_block("if false; then :; else h() { :; }; fi")?;
        let Command::If(cmd) = &statements[0].command else {
            anyhow::bail!("expected if");
        };
        assert!(matches!(
            cmd.else_body.as_deref(),
            Some([Statement { command: Command::Function(_), .. }])
        ));
        Ok(())
    }

    #[test]
    fn closing_keyword_followed_by_and() -> Result<()> {
        let statements = parse_block("if true; then echo a; fi && echo b")?;
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[1],
            Statement {
                connector: CompoundOperator::And,
                command: Command::Simple("echo b".into()),
            }
        );
        Ok(())
    }

    #[test]
    fn background_statement() -> Result<()> {
        assert_eq!(
            parse_block("sleep 1 &")?[0].command,
            Command::Background("sleep 1".into())
        );
        Ok(())
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(
            parse_block("if true; then echo a"),
            Err(ParseError::Unterminated("if"))
        );
        assert_eq!(
            parse_block("fi"),
            Err(ParseError::UnexpectedKeyword("fi".into()))
        );
        assert_eq!(
            parse_block("for 1x in a; do :; done"),
            Err(ParseError::InvalidIdentifier("1x".into()))
        );
        assert_eq!(
            parse_block("f() { echo"),
            Err(ParseError::Unterminated("function"))
        );
    }

    #[test]
    fn statements_before_an_error_are_still_produced() {
        let mut parser = Parser::new("echo ok\nfi\necho never");
        assert_eq!(parser.next_statement(), Some(Ok(simple("echo ok"))));
        assert!(matches!(parser.next_statement(), Some(Err(_))));
    }
}
