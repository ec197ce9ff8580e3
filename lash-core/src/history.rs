//! Command history.

/// Ordered, append-only list of submitted command lines.
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    /// Records a submitted line. Blank lines are not recorded.
    ///
    /// # Arguments
    ///
    /// * `line` - The line as submitted.
    pub fn add(&mut self, line: &str) {
        let line = line.trim_end_matches('\n');
        if !line.trim().is_empty() {
            self.entries.push(line.to_owned());
        }
    }

    /// Returns the recorded lines, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
