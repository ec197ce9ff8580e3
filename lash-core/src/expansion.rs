//! Word expansion.
//!
//! Raw compound text goes through four ordered passes: arithmetic, command substitution,
//! parameters, then tilde. Each pass scans the output of the previous one. Globbing happens
//! later, per word, once the text has been tokenized.
//!
//! Substituted values are escaped for the quoting context they land in, so that the tokenizer
//! sees them as literal text and later passes never re-expand them.

use async_recursion::async_recursion;
use lash_parser::ast::Word;
use lash_parser::{CharState, QuoteMode, QuoteTracker, Token};

use crate::error::Error;
use crate::interp::ExecutionParameters;
use crate::{Shell, arithmetic, env, patterns, trace_categories};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    Arithmetic,
    CommandSubstitution,
    Parameters,
}

/// How substituted values are written back into the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Escaping {
    /// The text will be tokenized; values are escaped for the quote context they land in.
    Shell,
    /// The text is used as-is (e.g., as an arithmetic expression).
    Raw,
}

/// A region of text to be replaced by the result of an expansion.
#[derive(Debug)]
struct Span {
    start: usize,
    end: usize,
    double_quoted: bool,
}

/// Expands the given compound text, ready to be split into pipeline segments and tokenized.
///
/// # Arguments
///
/// * `shell` - The shell whose state is read.
/// * `params` - Execution parameters for command substitutions.
/// * `text` - The raw text.
#[async_recursion]
pub async fn expand_text(
    shell: &Shell,
    params: &ExecutionParameters,
    text: &str,
) -> Result<String, Error> {
    let text = expand_pass(shell, params, text, Pass::Arithmetic, Escaping::Shell).await?;
    let text =
        expand_pass(shell, params, &text, Pass::CommandSubstitution, Escaping::Shell).await?;
    let text = expand_pass(shell, params, &text, Pass::Parameters, Escaping::Shell).await?;
    let text = expand_tilde(shell, &text);

    tracing::debug!(target: trace_categories::EXPANSION, "expanded: {text:?}");
    Ok(text)
}

/// Expands arithmetic, command substitutions and parameters in text that is not going to be
/// tokenized, such as an arithmetic expression. Values are substituted verbatim.
///
/// # Arguments
///
/// * `shell` - The shell whose state is read.
/// * `params` - Execution parameters for command substitutions.
/// * `text` - The raw text.
#[async_recursion]
pub async fn expand_unquoted_str(
    shell: &Shell,
    params: &ExecutionParameters,
    text: &str,
) -> Result<String, Error> {
    let text = expand_pass(shell, params, text, Pass::Arithmetic, Escaping::Raw).await?;
    let text =
        expand_pass(shell, params, &text, Pass::CommandSubstitution, Escaping::Raw).await?;
    expand_pass(shell, params, &text, Pass::Parameters, Escaping::Raw).await
}

/// Expands text and splits it into fields, globbing each unquoted pattern.
///
/// # Arguments
///
/// * `shell` - The shell whose state is read.
/// * `params` - Execution parameters for command substitutions.
/// * `text` - The raw text.
pub async fn expand_and_split(
    shell: &Shell,
    params: &ExecutionParameters,
    text: &str,
) -> Result<Vec<String>, Error> {
    let expanded = expand_text(shell, params, text).await?;
    let words = split_words(&expanded)?;
    expand_words(shell, &words).await
}

/// Expands text into words without globbing, e.g. for a `case` word or pattern.
///
/// # Arguments
///
/// * `shell` - The shell whose state is read.
/// * `params` - Execution parameters for command substitutions.
/// * `text` - The raw text.
pub(crate) async fn expand_to_words(
    shell: &Shell,
    params: &ExecutionParameters,
    text: &str,
) -> Result<Vec<Word>, Error> {
    let expanded = expand_text(shell, params, text).await?;
    split_words(&expanded)
}

fn split_words(text: &str) -> Result<Vec<Word>, Error> {
    // Redirection operators carry no meaning here; keep them as the text they were.
    Ok(lash_parser::tokenize(text)?
        .into_iter()
        .map(|token| match token {
            Token::Word(word) => word,
            Token::Redirect(kind) => Word::from(kind.to_string().as_str()),
        })
        .collect())
}

/// Performs glob expansion on tokenized words. A pattern that matches nothing is kept as
/// literal text.
///
/// # Arguments
///
/// * `shell` - The shell whose filesystem and working directory are used.
/// * `words` - The words to expand.
pub async fn expand_words(shell: &Shell, words: &[Word]) -> Result<Vec<String>, Error> {
    let mut fields = vec![];
    let working_dir = shell.working_dir();

    for word in words {
        if !word.has_glob() {
            fields.push(word.to_string());
            continue;
        }

        let pattern = patterns::escape_word(word);
        let matches = shell.fs().glob(&pattern, &working_dir).await?;
        tracing::debug!(target: trace_categories::EXPANSION, "glob {pattern:?} => {matches:?}");

        if matches.is_empty() {
            fields.push(word.to_string());
        } else {
            fields.extend(matches);
        }
    }

    Ok(fields)
}

async fn expand_pass(
    shell: &Shell,
    params: &ExecutionParameters,
    text: &str,
    pass: Pass,
    escaping: Escaping,
) -> Result<String, Error> {
    let spans = find_spans(text, pass);
    if spans.is_empty() {
        return Ok(text.to_owned());
    }

    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    for span in spans {
        result.push_str(&text[last..span.start]);
        let source = &text[span.start..span.end];

        let value = match pass {
            Pass::Arithmetic => {
                let expr = &source[3..source.len() - 2];
                arithmetic::expand_and_eval(shell, params, expr)
                    .await?
                    .to_string()
            }
            Pass::CommandSubstitution => run_substitution(shell, params, source).await?,
            Pass::Parameters => expand_parameter(shell, source)?,
        };

        match escaping {
            Escaping::Raw => result.push_str(&value),
            Escaping::Shell => escape_into(&mut result, &value, span.double_quoted),
        }
        last = span.end;
    }

    result.push_str(&text[last..]);
    Ok(result)
}

/// Finds the expansions of the given kind that are eligible in the text: not escaped, not
/// single-quoted, and not nested inside another substitution.
fn find_spans(text: &str, pass: Pass) -> Vec<Span> {
    let mut spans = vec![];
    let mut tracker = QuoteTracker::new();
    let mut skip_until = 0;

    for (i, c) in text.char_indices() {
        let eligible = i >= skip_until
            && !tracker.is_escaping()
            && (tracker.depth() == 0
                || (tracker.depth() == 1 && tracker.mode() == QuoteMode::Double));
        let double_quoted = tracker.mode() == QuoteMode::Double;
        tracker.feed(c);

        if !eligible {
            continue;
        }

        let rest = &text[i..];
        let end = match pass {
            Pass::Arithmetic if rest.starts_with("$((") => {
                lash_parser::find_closing_paren(text, i)
                    .filter(|end| *end > i + 3 && text[..*end].ends_with(')'))
                    .map(|end| end + 1)
            }
            Pass::CommandSubstitution if rest.starts_with("$(") || c == '`' => {
                lash_parser::find_closing_paren(text, i).map(|end| end + 1)
            }
            Pass::Parameters if c == '$' => parameter_end(text, i),
            _ => None,
        };

        if let Some(end) = end {
            spans.push(Span {
                start: i,
                end,
                double_quoted,
            });
            skip_until = end;
        }
    }

    spans
}

/// Returns the end of the parameter reference starting at the `$` at `start`, if any.
fn parameter_end(text: &str, start: usize) -> Option<usize> {
    let rest = &text[start + 1..];
    let first = rest.chars().next()?;

    match first {
        '{' => lash_parser::find_closing_paren(text, start).map(|end| end + 1),
        '?' | '#' | '@' | '0'..='9' => Some(start + 2),
        c if c.is_ascii_alphabetic() || c == '_' => {
            let len = rest
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .unwrap_or(rest.len());
            Some(start + 1 + len)
        }
        _ => None,
    }
}

async fn run_substitution(
    shell: &Shell,
    params: &ExecutionParameters,
    source: &str,
) -> Result<String, Error> {
    let command = if let Some(inner) = source.strip_prefix('`') {
        unescape_backquoted(inner.strip_suffix('`').unwrap_or(inner))
    } else {
        source[2..source.len() - 1].to_owned()
    };

    tracing::debug!(target: trace_categories::EXPANSION, "command substitution: {command:?}");

    let sub_params = ExecutionParameters {
        stdout: crate::sinks::OutputSink::buffer(),
        stdin: None,
        ..params.clone()
    };
    crate::interp::execute_text(shell, &command, &sub_params).await?;

    let mut output = sub_params.stdout.contents();
    output.truncate(output.trim_end_matches('\n').len());
    Ok(output)
}

fn unescape_backquoted(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(next) = chars.peek().copied()
            && matches!(next, '`' | '\\' | '$')
        {
            result.push(next);
            chars.next();
            continue;
        }
        result.push(c);
    }

    result
}

fn expand_parameter(shell: &Shell, source: &str) -> Result<String, Error> {
    let reference = &source[1..];
    let Some(inner) = reference
        .strip_prefix('{')
        .and_then(|r| r.strip_suffix('}'))
    else {
        return Ok(lookup(shell, reference));
    };

    if let Some(name) = inner.strip_prefix('#')
        && is_parameter_name(name)
    {
        return Ok(lookup(shell, name).chars().count().to_string());
    }

    if let Some((name, default)) = inner.split_once(":-")
        && is_parameter_name(name)
    {
        let value = lookup(shell, name);
        if !value.is_empty() {
            return Ok(value);
        }
        return expand_parameters_in(shell, default);
    }

    if is_parameter_name(inner) {
        return Ok(lookup(shell, inner));
    }

    Err(Error::BadSubstitution(source.to_owned()))
}

/// Expands parameter references in a default value; nothing else is expanded there.
fn expand_parameters_in(shell: &Shell, text: &str) -> Result<String, Error> {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    for span in find_spans(text, Pass::Parameters) {
        result.push_str(&text[last..span.start]);
        result.push_str(&expand_parameter(shell, &text[span.start..span.end])?);
        last = span.end;
    }

    result.push_str(&text[last..]);
    Ok(result)
}

fn is_parameter_name(name: &str) -> bool {
    lash_parser::is_valid_name(name)
        || (!name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()))
        || name == env::LAST_EXIT_CODE
        || name == env::PARAMETER_COUNT
        || name == env::ALL_PARAMETERS
}

fn lookup(shell: &Shell, name: &str) -> String {
    match name {
        env::PARAMETER_COUNT | env::ALL_PARAMETERS => shell.read_env(|env| {
            env.get(name)
                .map_or_else(|| default_positional(name), ToOwned::to_owned)
        }),
        _ => shell.env_var(name).unwrap_or_default(),
    }
}

fn default_positional(name: &str) -> String {
    if name == env::PARAMETER_COUNT {
        "0".to_owned()
    } else {
        String::new()
    }
}

/// Expands an unquoted leading `~` in each word to the home directory.
fn expand_tilde(shell: &Shell, text: &str) -> String {
    if !text.contains('~') {
        return text.to_owned();
    }

    let home = shell.env_var("HOME").unwrap_or_default();
    let mut result = String::with_capacity(text.len());
    let mut tracker = QuoteTracker::new();
    let mut prev: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let state = tracker.feed(c);
        let at_word_start = prev.is_none_or(|p| p.is_whitespace() || p == '=');
        let next = chars.peek().copied();

        if c == '~'
            && state == CharState::Active
            && at_word_start
            && next.is_none_or(|n| n == '/' || n.is_whitespace())
        {
            escape_into(&mut result, &home, false);
        } else {
            result.push(c);
        }
        prev = Some(c);
    }

    result
}

/// Appends a substituted value so that the tokenizer reads it back as literal text.
///
/// Unquoted values stay subject to field splitting and globbing.
fn escape_into(result: &mut String, value: &str, double_quoted: bool) {
    for c in value.chars() {
        if double_quoted {
            if matches!(c, '"' | '\\' | '$' | '`') {
                result.push('\\');
            }
            result.push(c);
        } else {
            match c {
                '\n' => result.push(' '),
                '\'' | '"' | '\\' | '$' | '`' | '|' | '&' | ';' | '<' | '>' | '~' => {
                    result.push('\\');
                    result.push(c);
                }
                _ => result.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CreateOptions;
    use crate::fs::{Filesystem, MemoryFs};
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn shell() -> Shell {
        let shell = Shell::new(
            Arc::new(MemoryFs::new()),
            CreateOptions::builder().home("/home/me").build(),
        );
        shell.set_env_var("NAME", "world");
        shell
    }

    async fn expand(shell: &Shell, text: &str) -> Result<Vec<String>> {
        Ok(expand_and_split(shell, &ExecutionParameters::default(), text).await?)
    }

    #[tokio::test]
    async fn parameters() -> Result<()> {
        let shell = shell();
        assert_eq!(expand(&shell, "hello $NAME").await?.len(), 2);
        assert_eq!(expand(&shell, "\"$NAME!\" ${NAME}s").await?, vec!["world!", "worlds"]);
        assert_eq!(expand(&shell, "a${MISSING}b $MISSING").await?, vec!["ab"]);
        assert_eq!(expand(&shell, "${#NAME} ${MISSING:-fallback}").await?, vec!["5", "fallback"]);
        assert_eq!(expand(&shell, "$? $#").await?, vec!["0", "0"]);
        assert_eq!(expand(&shell, "'$NAME' \\$NAME").await?, vec!["$NAME", "$NAME"]);
        Ok(())
    }

    #[tokio::test]
    async fn bad_substitution() {
        let shell = shell();
        let result = expand_text(&shell, &ExecutionParameters::default(), "${NAME!}").await;
        assert!(matches!(result, Err(Error::BadSubstitution(_))));
    }

    #[tokio::test]
    async fn substituted_values_are_not_reexpanded() -> Result<()> {
        let shell = shell();
        shell.set_env_var("TRICKY", "$NAME ~ a|b \"q\"");
        assert_eq!(
            expand(&shell, "$TRICKY").await?,
            vec!["$NAME", "~", "a|b", "\"q\""]
        );
        assert_eq!(expand(&shell, "\"$TRICKY\"").await?, vec!["$NAME ~ a|b \"q\""]);
        Ok(())
    }

    #[tokio::test]
    async fn tilde() -> Result<()> {
        let shell = shell();
        assert_eq!(
            expand(&shell, "~ ~/docs X=~ a~ '~' \"~\"").await?,
            vec!["/home/me", "/home/me/docs", "X=/home/me", "a~", "~", "~"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn arithmetic_in_words() -> Result<()> {
        let shell = shell();
        shell.set_env_var("x", "4");
        assert_eq!(
            expand(&shell, "$((2 + 3 * 4)) \"$(( x * $x ))\"").await?,
            vec!["14", "16"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn globbing() -> Result<()> {
        let fs = Arc::new(MemoryFs::new());
        fs.write("/b.txt", b"").await?;
        fs.write("/a.txt", b"").await?;
        let shell = Shell::new(fs, CreateOptions::default());

        assert_eq!(expand(&shell, "*.txt").await?, vec!["a.txt", "b.txt"]);
        assert_eq!(expand(&shell, "*.md").await?, vec!["*.md"]);
        assert_eq!(expand(&shell, "'*.txt' \\*.txt").await?, vec!["*.txt", "*.txt"]);
        Ok(())
    }
}
