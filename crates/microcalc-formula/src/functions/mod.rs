//! Built-in functions

pub mod logical;
pub mod text;

use crate::ast::Node;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Function implementation signature
///
/// Arguments arrive fully evaluated, left to right. Implementations return
/// [`Node::Error`] for arguments they cannot use.
pub type FunctionImpl = fn(&[Node]) -> Node;

/// Function definition
pub struct FunctionDef {
    /// Function name as written in formulas
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

impl FunctionDef {
    /// Whether `count` arguments are acceptable
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }

    /// Call with already evaluated arguments, checking arity first
    pub fn call(&self, args: &[Node]) -> Node {
        if !self.accepts(args.len()) {
            return Node::Error;
        }
        (self.implementation)(args)
    }
}

/// Function registry
///
/// Names are matched exactly, so `IF` is known and `if` is not.
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

/// Shared registry of built-in functions (lazily initialized)
pub fn builtin_registry() -> &'static FunctionRegistry {
    static REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();
    REGISTRY.get_or_init(FunctionRegistry::new)
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register_text_functions();
        registry.register_logical_functions();

        registry
    }

    /// Create a registry without any functions
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    /// Register a function, replacing any previous one of the same name
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_string(), def);
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.values().map(|def| def.name).collect();
        names.sort_unstable();
        names
    }

    fn register_text_functions(&mut self) {
        // CONCATENATE
        self.register(FunctionDef {
            name: "CONCATENATE",
            min_args: 0,
            max_args: None,
            implementation: text::fn_concatenate,
        });
    }

    fn register_logical_functions(&mut self) {
        // IF
        self.register(FunctionDef {
            name: "IF",
            min_args: 3,
            max_args: Some(3),
            implementation: logical::fn_if,
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
