use std::collections::VecDeque;

use crate::quoting::{CharState, QuoteTracker};

/// Here-document bodies in the order their operators appear in the source.
///
/// Extraction rewrites each `<<TAG` operator to `<<N`, where `N` is the body's index, so a tag
/// that is reused within one block still finds its own body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HereDocuments {
    bodies: Vec<String>,
}

impl HereDocuments {
    /// Returns the body referenced by a rewritten here-document operator's target.
    ///
    /// # Arguments
    ///
    /// * `key` - The operator's target word, as left in the text by extraction.
    pub fn get(&self, key: &str) -> Option<&str> {
        let index = key.parse::<usize>().ok()?;
        self.bodies.get(index).map(String::as_str)
    }

    /// Returns the number of bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns whether no bodies were extracted.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

struct PendingBody {
    tag: String,
    index: usize,
    strip_tabs: bool,
}

/// Removes here-document bodies from the text, returning the remaining text and the bodies.
///
/// The operators themselves stay in the text so the tokenizer can attach them to their
/// command, but each tag is replaced by the index of its body. Each body line keeps its
/// trailing newline; with `<<-`, leading tabs are stripped from body lines and from the
/// terminating line. Quotes around the tag are removed. Bodies are literal; no expansion is
/// applied to them.
///
/// # Arguments
///
/// * `text` - The source text.
pub fn extract_here_documents(text: &str) -> (String, HereDocuments) {
    let mut bodies: Vec<String> = Vec::new();
    let mut remaining = String::with_capacity(text.len());
    let mut tracker = QuoteTracker::new();
    let mut pending: VecDeque<PendingBody> = VecDeque::new();
    let mut body = String::new();

    for line in text.split_inclusive('\n') {
        if let Some(current) = pending.front() {
            let content = line.strip_suffix('\n').unwrap_or(line);
            let content = if current.strip_tabs {
                content.trim_start_matches('\t')
            } else {
                content
            };

            if content == current.tag {
                if let Some(done) = pending.pop_front() {
                    bodies[done.index] = std::mem::take(&mut body);
                }
            } else {
                body.push_str(content);
                body.push('\n');
            }
            continue;
        }

        remaining.push_str(&scan_line(line, &mut tracker, &mut pending, &mut bodies));
    }

    // Unterminated bodies run to the end of the input.
    while let Some(unterminated) = pending.pop_front() {
        tracing::debug!(target: "parse", "here-document '{}' not terminated", unterminated.tag);
        bodies[unterminated.index] = std::mem::take(&mut body);
    }

    (remaining, HereDocuments { bodies })
}

/// Scans one line for here-document operators, queueing their bodies and returning the line
/// with each tag replaced by its body index.
fn scan_line(
    line: &str,
    tracker: &mut QuoteTracker,
    pending: &mut VecDeque<PendingBody>,
    bodies: &mut Vec<String>,
) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut rewritten = String::with_capacity(line.len());
    let mut i = 0;

    while i < chars.len() {
        let state = tracker.feed(chars[i]);
        rewritten.push(chars[i]);
        i += 1;

        if state != CharState::Active || chars[i - 1] != '<' || chars.get(i) != Some(&'<') {
            continue;
        }

        tracker.feed('<');
        rewritten.push('<');
        i += 1;

        // Here-strings are not supported; leave them to the tokenizer.
        if chars.get(i) == Some(&'<') {
            tracker.feed('<');
            rewritten.push('<');
            i += 1;
            continue;
        }

        let strip_tabs = chars.get(i) == Some(&'-');
        if strip_tabs {
            tracker.feed('-');
            rewritten.push('-');
            i += 1;
        }

        while let Some(c) = chars.get(i).copied().filter(|c| matches!(c, ' ' | '\t')) {
            tracker.feed(c);
            rewritten.push(c);
            i += 1;
        }

        let start = i;
        let mut tag = String::new();
        while let Some(&c) = chars.get(i) {
            let mut lookahead = tracker.clone();
            let state = lookahead.feed(c);
            if state == CharState::Active && (c.is_whitespace() || ";|&<>()".contains(c)) {
                break;
            }

            *tracker = lookahead;
            i += 1;
            if state != CharState::Delimiter {
                tag.push(c);
            }
        }

        if tag.is_empty() {
            rewritten.extend(&chars[start..i]);
            continue;
        }

        let index = bodies.len();
        bodies.push(String::new());
        rewritten.push_str(&index.to_string());
        pending.push_back(PendingBody {
            tag,
            index,
            strip_tabs,
        });
    }

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_body_and_keeps_operator() {
        let (text, docs) = extract_here_documents("cat <<EOF\nhello $X\nworld\nEOF\necho done\n");
        assert_eq!(text, "cat <<0\necho done\n");
        assert_eq!(docs.get("0"), Some("hello $X\nworld\n"));
    }

    #[test]
    fn strips_tabs_and_quotes() {
        let (text, docs) = extract_here_documents("cat <<-'END'\n\tone\n\t\ttwo\n\tEND\n");
        assert_eq!(text, "cat <<-0\n");
        assert_eq!(docs.get("0"), Some("one\ntwo\n"));
    }

    #[test]
    fn multiple_documents_in_order() {
        let (text, docs) = extract_here_documents("cmd <<A <<B\n1\nA\n2\nB\n");
        assert_eq!(text, "cmd <<0 <<1\n");
        assert_eq!(docs.get("0"), Some("1\n"));
        assert_eq!(docs.get("1"), Some("2\n"));
    }

    #[test]
    fn reused_tags_keep_their_own_bodies() {
        let (text, docs) =
            extract_here_documents("cat <<EOF\nfirst\nEOF\ncat <<EOF\nsecond\nEOF\n");
        assert_eq!(text, "cat <<0\ncat <<1\n");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs.get("0"), Some("first\n"));
        assert_eq!(docs.get("1"), Some("second\n"));
        assert_eq!(docs.get("EOF"), None);
    }

    #[test]
    fn ignores_quoted_and_arithmetic_shifts() {
        let input = "echo '<<X' $((1 << 2))\nX\n";
        let (text, docs) = extract_here_documents(input);
        assert_eq!(text, input);
        assert!(docs.is_empty());
    }

    #[test]
    fn unterminated_body_runs_to_end() {
        let (text, docs) = extract_here_documents("cat <<EOF\nabc");
        assert_eq!(text, "cat <<0\n");
        assert_eq!(docs.get("0"), Some("abc\n"));
    }
}
