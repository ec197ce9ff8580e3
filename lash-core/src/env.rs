//! Implements the shell's environment variable map.

use std::collections::HashMap;

/// Well-known variable holding the last exit code.
pub const LAST_EXIT_CODE: &str = "?";
/// Well-known variable holding the parameter count.
pub const PARAMETER_COUNT: &str = "#";
/// Well-known variable holding all parameters, space-joined.
pub const ALL_PARAMETERS: &str = "@";

/// Represents the shell variable environment. Keys are case-sensitive.
#[derive(Clone, Debug, Default)]
pub struct ShellEnvironment {
    vars: HashMap<String, String>,
}

/// Positional parameters saved by [`ShellEnvironment::bind_positional_parameters`].
#[derive(Debug)]
#[must_use]
pub struct SavedPositionalParameters(Vec<(String, String)>);

impl ShellEnvironment {
    /// Returns a new, empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a variable, if set.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable's name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Sets a variable.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable's name.
    /// * `value` - The new value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Removes a variable, returning its previous value.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable's name.
    pub fn unset(&mut self, name: &str) -> Option<String> {
        self.vars.remove(name)
    }

    /// Iterates over all variables in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.vars.iter()
    }

    /// Returns a copy of the variable map.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.vars.clone()
    }

    /// Returns the positional parameters `1..N`.
    pub fn positional_parameters(&self) -> Vec<String> {
        let count: usize = self
            .get(PARAMETER_COUNT)
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);

        (1..=count)
            .map(|i| self.get(&i.to_string()).unwrap_or_default().to_owned())
            .collect()
    }

    /// Replaces the positional parameters for the duration of a call, returning the values
    /// that must be handed back to [`Self::restore_positional_parameters`] afterwards.
    ///
    /// # Arguments
    ///
    /// * `name` - Value for `$0`: the function or script being called.
    /// * `args` - Values for `$1..$N`.
    pub fn bind_positional_parameters(
        &mut self,
        name: &str,
        args: &[String],
    ) -> SavedPositionalParameters {
        let saved = self.remove_positional_parameters();

        self.set("0", name);
        for (i, arg) in args.iter().enumerate() {
            self.set((i + 1).to_string(), arg.as_str());
        }
        self.set(PARAMETER_COUNT, args.len().to_string());
        self.set(ALL_PARAMETERS, args.join(" "));

        SavedPositionalParameters(saved)
    }

    /// Restores positional parameters saved by [`Self::bind_positional_parameters`]. Keys
    /// that did not exist before the call are removed.
    ///
    /// # Arguments
    ///
    /// * `saved` - The saved parameters.
    pub fn restore_positional_parameters(&mut self, saved: SavedPositionalParameters) {
        self.remove_positional_parameters();
        self.vars.extend(saved.0);
    }

    fn remove_positional_parameters(&mut self) -> Vec<(String, String)> {
        let keys: Vec<String> = self
            .vars
            .keys()
            .filter(|k| is_positional_key(k))
            .cloned()
            .collect();

        keys.into_iter()
            .filter_map(|k| self.vars.remove_entry(&k))
            .collect()
    }
}

fn is_positional_key(key: &str) -> bool {
    key == PARAMETER_COUNT
        || key == ALL_PARAMETERS
        || (!key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()))
}

/// Returns whether the string is a `NAME=VALUE` assignment, and if so splits it.
///
/// # Arguments
///
/// * `s` - The candidate word.
pub fn parse_assignment(s: &str) -> Option<(&str, &str)> {
    let (name, value) = s.split_once('=')?;
    lash_parser::is_valid_name(name).then_some((name, value))
}
