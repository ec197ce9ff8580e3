//! Shell glob patterns: matching and filesystem expansion.
//!
//! Pattern text uses `*`, `?` and `[...]` as metacharacters; a backslash makes the next
//! character literal. [`escape_word`] produces pattern text from a tokenized word, keeping
//! only the metacharacters that were unquoted in the source.

use lash_parser::ast::{Word, WordChar};

use crate::error::Error;
use crate::fs::{FileKind, Filesystem, FsError, resolve_path};
use crate::trace_categories;

/// A compiled shell pattern.
#[derive(Debug)]
pub struct Pattern {
    regex: fancy_regex::Regex,
}

impl Pattern {
    /// Compiles a pattern that must match an entire string.
    ///
    /// # Arguments
    ///
    /// * `pattern` - The pattern text.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let regex_str = pattern_to_regex_str(pattern);
        tracing::trace!(target: trace_categories::PATTERN, "pattern '{pattern}' => regex '{regex_str}'");

        let regex = fancy_regex::Regex::new(&regex_str)
            .map_err(|_| Error::InvalidPattern(pattern.to_owned()))?;
        Ok(Self { regex })
    }

    /// Returns whether the pattern matches the whole of `value`.
    ///
    /// # Arguments
    ///
    /// * `value` - The string to test.
    pub fn exactly_matches(&self, value: &str) -> bool {
        self.regex.is_match(value).unwrap_or(false)
    }
}

/// Returns whether the text contains an unescaped glob metacharacter.
///
/// # Arguments
///
/// * `pattern` - The pattern text.
pub fn requires_expansion(pattern: &str) -> bool {
    let mut escaped = false;
    for c in pattern.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if matches!(c, '*' | '?' | '[') {
            return true;
        }
    }
    false
}

/// Converts a tokenized word to pattern text. Literal characters that would otherwise be
/// metacharacters are backslash-escaped.
///
/// # Arguments
///
/// * `word` - The word.
pub fn escape_word(word: &Word) -> String {
    let mut pattern = String::new();
    for c in word.chars() {
        match c {
            WordChar::Glob(c) => pattern.push(*c),
            WordChar::Literal(c) => {
                if matches!(c, '*' | '?' | '[' | ']' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(*c);
            }
        }
    }
    pattern
}

/// Removes pattern escapes, yielding the literal text.
///
/// # Arguments
///
/// * `pattern` - The pattern text.
pub fn unescape(pattern: &str) -> String {
    let mut result = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            result.push(chars.next().unwrap_or('\\'));
        } else {
            result.push(c);
        }
    }
    result
}

fn pattern_to_regex_str(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut regex = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                i += 1;
                push_literal(&mut regex, chars.get(i).copied().unwrap_or('\\'));
            }
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '[' => {
                if let Some((class, end)) = bracket_expression(&chars, i) {
                    regex.push_str(&class);
                    i = end;
                } else {
                    push_literal(&mut regex, '[');
                }
            }
            c => push_literal(&mut regex, c),
        }
        i += 1;
    }

    regex.push('$');
    regex
}

fn push_literal(regex: &mut String, c: char) {
    if regex_char_is_special(c) {
        regex.push('\\');
    }
    regex.push(c);
}

const fn regex_char_is_special(c: char) -> bool {
    matches!(
        c,
        '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
    )
}

/// Translates the bracket expression starting at `start`; returns the regex class and the
/// index of the closing `]`.
fn bracket_expression(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut i = start + 1;
    let mut class = String::from("[");

    if matches!(chars.get(i), Some('!' | '^')) {
        class.push('^');
        i += 1;
    }

    let first = i;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ']' if i > first => {
                class.push(']');
                return Some((class, i));
            }
            '\\' => {
                i += 1;
                class.push('\\');
                class.push(*chars.get(i)?);
            }
            '-' => class.push('-'),
            c if c.is_ascii_alphanumeric() => class.push(c),
            c => {
                class.push('\\');
                class.push(c);
            }
        }
        i += 1;
    }

    None
}

/// Expands a glob pattern against a filesystem.
///
/// Hidden entries only match components that start with a literal `.`. A pattern ending in
/// `/` matches only directories. Results are sorted; relative patterns yield relative paths.
///
/// # Arguments
///
/// * `fs` - The filesystem to search.
/// * `pattern` - The pattern text.
/// * `base` - Absolute directory that relative patterns are matched against.
pub async fn expand_glob<F: Filesystem + ?Sized>(
    fs: &F,
    pattern: &str,
    base: &str,
) -> Result<Vec<String>, FsError> {
    let absolute = pattern.starts_with('/');
    let dirs_only = pattern.ends_with('/');
    let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty()).collect();

    // Each candidate pairs the path as displayed with its absolute location.
    let mut candidates = if absolute {
        vec![("/".to_owned(), "/".to_owned())]
    } else {
        vec![(String::new(), base.to_owned())]
    };

    for (index, component) in components.iter().enumerate() {
        let must_be_dir = dirs_only || index + 1 < components.len();
        let mut next = vec![];

        if requires_expansion(component) {
            let Ok(matcher) = Pattern::new(component) else {
                return Ok(vec![]);
            };
            let allow_hidden = component.starts_with('.') || component.starts_with("\\.");

            for (display, location) in &candidates {
                let Ok(entries) = fs.list(location).await else {
                    continue;
                };

                for entry in entries {
                    if entry.name.starts_with('.') && !allow_hidden {
                        continue;
                    }
                    if must_be_dir && entry.kind == FileKind::File {
                        continue;
                    }
                    if matcher.exactly_matches(&entry.name) {
                        next.push((
                            join_display(display, &entry.name),
                            resolve_path(location, &entry.name),
                        ));
                    }
                }
            }
        } else {
            let literal = unescape(component);
            for (display, location) in &candidates {
                let target = resolve_path(location, &literal);
                match fs.stat(&target).await {
                    Ok(metadata) if !must_be_dir || !metadata.is_file() => {
                        next.push((join_display(display, &literal), target));
                    }
                    _ => (),
                }
            }
        }

        candidates = next;
        if candidates.is_empty() {
            break;
        }
    }

    let mut results: Vec<String> = candidates
        .into_iter()
        .map(|(display, _)| if dirs_only { display + "/" } else { display })
        .collect();
    results.sort();

    tracing::debug!(target: trace_categories::PATTERN, "glob '{pattern}' => {results:?}");
    Ok(results)
}

fn join_display(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else if prefix.ends_with('/') {
        format!("{prefix}{name}")
    } else {
        format!("{prefix}/{name}")
    }
}
