//! Method registry for service dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::HproseError;
use crate::message::ResultMode;
use crate::types::Value;

/// A registered method body. Receives the invoked name (the catch-all sees
/// the original call name) and the argument list, which it may mutate for
/// by-ref echo.
pub type MethodFn =
    Arc<dyn Fn(&str, &mut Vec<Value>) -> Result<Vec<Value>, HproseError> + Send + Sync>;

/// Reserved name under which the catch-all method is registered.
pub const MISSING_METHOD: &str = "*";

/// Declared argument shape of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` positional arguments. Extras beyond `n` are silently
    /// dropped; missing ones arrive as null.
    Fixed(usize),
    /// At least `n` positional arguments; extras stay packed at the tail.
    Variadic(usize),
}

/// Per-method registration options.
#[derive(Debug, Clone, Default)]
pub struct MethodOptions {
    pub result_mode: ResultMode,
    /// Serialize results without a reference table.
    pub simple: bool,
    /// Namespace prefix: the method is published as `prefix_name`.
    pub prefix: Option<String>,
}

pub struct Method {
    pub(crate) func: MethodFn,
    pub result_mode: ResultMode,
    pub simple: bool,
    pub arity: Arity,
}

/// The published methods of a service. Lookup is case-insensitive; the
/// original spellings are kept for the discovery frame.
#[derive(Default)]
pub struct Methods {
    names: Vec<String>,
    methods: HashMap<String, Arc<Method>>,
}

impl Methods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function under `name`, applying any prefix from the
    /// options. The catch-all name is never prefixed.
    pub fn add_function<F>(&mut self, name: &str, arity: Arity, options: MethodOptions, f: F)
    where
        F: Fn(&mut Vec<Value>) -> Result<Vec<Value>, HproseError> + Send + Sync + 'static,
    {
        self.add_named_function(name, arity, options, move |_, args| f(args));
    }

    /// Registers a batch of functions, all under the same options.
    pub fn add_functions(
        &mut self,
        entries: Vec<(&str, Arity, MethodFn)>,
        options: MethodOptions,
    ) {
        for (name, arity, func) in entries {
            self.insert(name, arity, &options, func);
        }
    }

    /// Registers the catch-all method, invoked with the original call name
    /// when no exact match exists.
    pub fn add_missing_method<F>(&mut self, options: MethodOptions, f: F)
    where
        F: Fn(&str, &mut Vec<Value>) -> Result<Vec<Value>, HproseError> + Send + Sync + 'static,
    {
        self.add_named_function(MISSING_METHOD, Arity::Variadic(0), options, f);
    }

    fn add_named_function<F>(&mut self, name: &str, arity: Arity, options: MethodOptions, f: F)
    where
        F: Fn(&str, &mut Vec<Value>) -> Result<Vec<Value>, HproseError> + Send + Sync + 'static,
    {
        self.insert(name, arity, &options, Arc::new(f));
    }

    fn insert(&mut self, name: &str, arity: Arity, options: &MethodOptions, func: MethodFn) {
        assert!(!name.is_empty(), "method name can't be empty");
        let name = match &options.prefix {
            Some(prefix) if name != MISSING_METHOD => format!("{prefix}_{name}"),
            _ => name.to_string(),
        };
        let method = Method {
            func,
            result_mode: options.result_mode,
            simple: options.simple,
            arity,
        };
        self.methods.insert(name.to_lowercase(), Arc::new(method));
        self.names.push(name);
    }

    pub fn get(&self, name: &str) -> Option<Arc<Method>> {
        self.methods.get(&name.to_lowercase()).cloned()
    }

    pub fn missing_method(&self) -> Option<Arc<Method>> {
        self.methods.get(MISSING_METHOD).cloned()
    }

    /// Published method names, in registration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(args: &mut Vec<Value>) -> Result<Vec<Value>, HproseError> {
        Ok(args.clone())
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut methods = Methods::new();
        methods.add_function("Hello", Arity::Fixed(1), MethodOptions::default(), echo);
        assert!(methods.get("hello").is_some());
        assert!(methods.get("HELLO").is_some());
        assert!(methods.get("other").is_none());
        assert_eq!(methods.names(), ["Hello"]);
    }

    #[test]
    fn prefix_namespaces_the_name() {
        let mut methods = Methods::new();
        let options = MethodOptions {
            prefix: Some("math".to_string()),
            ..Default::default()
        };
        methods.add_function("sum", Arity::Variadic(0), options, echo);
        assert!(methods.get("math_sum").is_some());
        assert!(methods.get("sum").is_none());
    }

    #[test]
    fn batch_registration() {
        let mut methods = Methods::new();
        let double: MethodFn = Arc::new(|_, args| {
            Ok(vec![Value::Int(args[0].to_i64()? * 2)])
        });
        let triple: MethodFn = Arc::new(|_, args| {
            Ok(vec![Value::Int(args[0].to_i64()? * 3)])
        });
        methods.add_functions(
            vec![
                ("double", Arity::Fixed(1), double),
                ("triple", Arity::Fixed(1), triple),
            ],
            MethodOptions::default(),
        );
        assert_eq!(methods.names(), ["double", "triple"]);
        assert!(methods.get("Triple").is_some());
    }

    #[test]
    fn catch_all_is_never_prefixed() {
        let mut methods = Methods::new();
        let options = MethodOptions {
            prefix: Some("ns".to_string()),
            ..Default::default()
        };
        methods.add_missing_method(options, |name, _| Ok(vec![Value::from(name)]));
        assert!(methods.missing_method().is_some());
    }

    #[test]
    #[should_panic(expected = "method name can't be empty")]
    fn empty_name_is_rejected() {
        let mut methods = Methods::new();
        methods.add_function("", Arity::Fixed(0), MethodOptions::default(), echo);
    }
}
