//! Structures for managing function registrations and calls.

use std::collections::HashMap;
use std::sync::Arc;

use lash_parser::HereDocuments;
use lash_parser::ast::FunctionDefinition;

/// An environment for defined, named functions.
#[derive(Clone, Debug, Default)]
pub struct FunctionEnv {
    functions: HashMap<String, Arc<Registration>>,
}

impl FunctionEnv {
    /// Tries to retrieve the registration for a function by name.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the function to retrieve.
    pub fn get(&self, name: &str) -> Option<&Arc<Registration>> {
        self.functions.get(name)
    }

    /// Unregisters a function from the environment.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the function to remove.
    pub fn remove(&mut self, name: &str) -> Option<Arc<Registration>> {
        self.functions.remove(name)
    }

    /// Updates a function registration in this environment.
    ///
    /// # Arguments
    ///
    /// * `registration` - The function to register.
    pub fn update(&mut self, registration: Registration) {
        self.functions.insert(
            registration.definition.name.clone(),
            Arc::new(registration),
        );
    }

    /// Returns the names of all defined functions, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Encapsulates a registration for a defined function.
#[derive(Clone, Debug)]
pub struct Registration {
    /// The definition; its body stays unparsed until the function is called.
    pub definition: FunctionDefinition,
    /// Here-document bodies that were extracted from the text containing the definition.
    pub here_documents: Arc<HereDocuments>,
}
