use crate::error::{Error, Result};
use crate::runtime::Value;
use std::collections::HashMap;

/// A scope of variable bindings.
///
/// The parent link is a shared borrow, so a child scope can never outlive the
/// scope it was created from, and nothing but lookups ever reach through it.
/// Writes always land in the scope they are made on, shadowing any binding of
/// the same name further out.
#[derive(Debug, Default)]
pub struct Environment<'p> {
    bindings: HashMap<String, Value>,
    parent: Option<&'p Environment<'p>>,
}

impl<'p> Environment<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        match self.bindings.get(name) {
            Some(value) => Ok(value.clone()),
            None => match self.parent {
                Some(parent) => parent.get(name),
                None => Err(Error::UndefinedVariable {
                    name: name.to_string(),
                }),
            },
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn child_scope(&self) -> Environment<'_> {
        Environment {
            bindings: HashMap::new(),
            parent: Some(self),
        }
    }

    pub fn depth(&self) -> usize {
        self.parent.map_or(0, |parent| parent.depth() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward() -> Result<()> {
        let mut root = Environment::new();
        root.set("x", Value::Integer(1));

        let child = root.child_scope();
        let grandchild = child.child_scope();

        assert_eq!(grandchild.get("x")?, Value::Integer(1));
        assert_eq!(grandchild.depth(), 2);
        Ok(())
    }

    #[test]
    fn test_set_shadows_instead_of_overwriting() -> Result<()> {
        let mut root = Environment::new();
        root.set("x", Value::Integer(1));

        {
            let mut child = root.child_scope();
            child.set("x", Value::Integer(2));
            child.set("y", Value::Boolean(true));
            assert_eq!(child.get("x")?, Value::Integer(2));
        }

        assert_eq!(root.get("x")?, Value::Integer(1));
        assert!(matches!(
            root.get("y"),
            Err(Error::UndefinedVariable { name }) if name == "y"
        ));
        Ok(())
    }

    #[test]
    fn test_set_overwrites_in_same_scope() -> Result<()> {
        let mut env = Environment::new();
        env.set("name", Value::String("a".to_string()));
        env.set("name", Value::Float(2.5));

        assert_eq!(env.get("name")?, Value::Float(2.5));
        Ok(())
    }
}
