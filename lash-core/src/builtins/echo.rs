use crate::builtins::SimpleCommand;
use crate::commands::ExecutionContext;
use crate::error;
use crate::results::ExecutionResult;

/// Echo text to standard output.
///
/// Options are only recognized before the first operand, and an unknown option is printed as
/// text, so this command interprets its raw arguments.
pub(crate) struct EchoCommand;

impl SimpleCommand for EchoCommand {
    fn description() -> &'static str {
        "Echo text to standard output."
    }

    async fn execute(context: &mut ExecutionContext<'_>) -> Result<ExecutionResult, error::Error> {
        let mut no_trailing_newline = false;
        let mut interpret_backslash_escapes = false;

        let mut operands = context.args.as_slice();
        while let Some((first, rest)) = operands.split_first() {
            let Some(flags) = first.strip_prefix('-') else {
                break;
            };
            if flags.is_empty() || !flags.chars().all(|c| matches!(c, 'n' | 'e' | 'E')) {
                break;
            }

            for c in flags.chars() {
                match c {
                    'n' => no_trailing_newline = true,
                    'e' => interpret_backslash_escapes = true,
                    _ => interpret_backslash_escapes = false,
                }
            }
            operands = rest;
        }

        let mut s = operands.join(" ");
        if interpret_backslash_escapes {
            let (expanded, keep_going) = expand_backslash_escapes(&s);
            s = expanded;
            if !keep_going {
                no_trailing_newline = true;
            }
        }

        if !no_trailing_newline {
            s.push('\n');
        }

        context.stdout.push_str(&s);
        Ok(ExecutionResult::success())
    }
}

/// Interprets `echo -e` escape sequences. Returns the expanded text and whether output
/// should continue past it (`\c` stops all further output).
fn expand_backslash_escapes(s: &str) -> (String, bool) {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('a') => result.push('\x07'),
            Some('b') => result.push('\x08'),
            Some('e' | 'E') => result.push('\x1b'),
            Some('f') => result.push('\x0c'),
            Some('v') => result.push('\x0b'),
            Some('\\') => result.push('\\'),
            Some('c') => return (result, false),
            Some('0') => {
                let mut value = 0u32;
                for _ in 0..3 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                result.extend(char::from_u32(value));
            }
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    (result, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escapes() {
        assert_eq!(expand_backslash_escapes(r"a\tb\n"), ("a\tb\n".to_owned(), true));
        assert_eq!(expand_backslash_escapes(r"x\cy"), ("x".to_owned(), false));
        assert_eq!(expand_backslash_escapes(r"\0101\q"), ("A\\q".to_owned(), true));
    }
}
