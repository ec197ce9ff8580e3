use crate::ast::{CompoundCommand, CompoundOperator};
use crate::quoting::{CharState, QuoteTracker};

/// Splits a line into compound commands on unquoted `&&`, `||`, and `;`.
///
/// Each compound records the operator that *preceded* it. Empty compounds are dropped.
///
/// # Arguments
///
/// * `text` - The line to split.
pub fn split_compounds(text: &str) -> Vec<CompoundCommand> {
    let mut compounds = vec![];
    let mut tracker = QuoteTracker::new();
    let mut chars = text.char_indices().peekable();
    let mut start = 0;
    let mut operator = CompoundOperator::None;

    while let Some((i, c)) = chars.next() {
        if tracker.feed(c) != CharState::Active {
            continue;
        }

        let next = chars.peek().map(|(_, c)| *c);
        let (next_operator, width) = match (c, next) {
            ('&', Some('&')) => (CompoundOperator::And, 2),
            ('|', Some('|')) => (CompoundOperator::Or, 2),
            (';', _) => (CompoundOperator::Sequence, 1),
            _ => continue,
        };

        if width == 2 {
            if let Some((_, second)) = chars.next() {
                tracker.feed(second);
            }
        }

        push_compound(&mut compounds, operator, &text[start..i]);
        operator = next_operator;
        start = i + width;
    }

    push_compound(&mut compounds, operator, &text[start..]);
    compounds
}

fn push_compound(compounds: &mut Vec<CompoundCommand>, operator: CompoundOperator, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        compounds.push(CompoundCommand {
            operator,
            text: text.to_owned(),
        });
    }
}

/// Splits a compound command's text into pipeline segments on unquoted single `|`.
///
/// `||` and the `>|` redirection operator are not split on.
///
/// # Arguments
///
/// * `text` - The compound text to split.
pub fn split_pipeline(text: &str) -> Vec<String> {
    let mut segments = vec![];
    let mut tracker = QuoteTracker::new();
    let mut chars = text.char_indices().peekable();
    let mut start = 0;
    let mut prev_active = None;

    while let Some((i, c)) = chars.next() {
        let state = tracker.feed(c);
        if state != CharState::Active {
            prev_active = None;
            continue;
        }

        if c == '|' {
            let next = chars.peek().map(|(_, c)| *c);
            if next != Some('|') && !matches!(prev_active, Some('|' | '>')) {
                segments.push(text[start..i].trim().to_owned());
                start = i + 1;
            }
        }

        prev_active = Some(c);
    }

    segments.push(text[start..].trim().to_owned());
    segments
}

/// If the line ends in an unquoted lone `&`, returns the line without it.
///
/// # Arguments
///
/// * `text` - The line to inspect.
pub fn strip_background_operator(text: &str) -> Option<&str> {
    let mut tracker = QuoteTracker::new();
    let mut chars = text.char_indices().peekable();
    let mut prev = None;
    let mut candidate = None;

    while let Some((i, c)) = chars.next() {
        let state = tracker.feed(c);
        if state == CharState::Active && c == '&' {
            let next = chars.peek().map(|(_, c)| *c);
            if next != Some('&') && !matches!(prev, Some('&' | '>')) {
                candidate = Some(i);
            }
        }
        if !c.is_whitespace() {
            prev = Some(c);
            if c != '&' {
                candidate = None;
            }
        }
    }

    let index = candidate?;
    let command = text[..index].trim_end();
    (tracker.is_unquoted() && !command.is_empty()).then_some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compounds(text: &str) -> Vec<(CompoundOperator, String)> {
        split_compounds(text)
            .into_iter()
            .map(|c| (c.operator, c.text))
            .collect()
    }

    #[test]
    fn compounds_record_preceding_operator() {
        assert_eq!(
            compounds("false && echo A; echo B || echo C"),
            vec![
                (CompoundOperator::None, "false".into()),
                (CompoundOperator::And, "echo A".into()),
                (CompoundOperator::Sequence, "echo B".into()),
                (CompoundOperator::Or, "echo C".into()),
            ]
        );
    }

    #[test]
    fn compounds_respect_quoting() {
        assert_eq!(
            compounds(r#"echo "a;b" 'c && d' e\;f $(x; y)"#),
            vec![(
                CompoundOperator::None,
                r#"echo "a;b" 'c && d' e\;f $(x; y)"#.into()
            )]
        );
    }

    #[test]
    fn compounds_drop_empty_pieces() {
        assert_eq!(
            compounds("echo a;"),
            vec![(CompoundOperator::None, "echo a".into())]
        );
    }

    #[test]
    fn pipeline_splits_on_single_bar_only() {
        assert_eq!(split_pipeline("a | b|c"), vec!["a", "b", "c"]);
        assert_eq!(split_pipeline("echo x >| f"), vec!["echo x >| f"]);
        assert_eq!(split_pipeline("a || b"), vec!["a || b"]);
        assert_eq!(split_pipeline(r#"echo "a|b" | cat"#), vec![r#"echo "a|b""#, "cat"]);
    }

    #[test]
    fn background_operator() {
        assert_eq!(strip_background_operator("sleep 1 &"), Some("sleep 1"));
        assert_eq!(strip_background_operator("sleep 1&  "), Some("sleep 1"));
        assert_eq!(strip_background_operator("a && b"), None);
        assert_eq!(strip_background_operator("echo '&'"), None);
        assert_eq!(strip_background_operator(r"echo \&"), None);
        assert_eq!(strip_background_operator("cmd 2>&1"), None);
        assert_eq!(strip_background_operator("&"), None);
    }
}
