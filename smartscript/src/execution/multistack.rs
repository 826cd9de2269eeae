//! Named value stacks used for loop variables
//!
//! Each key owns an independent LIFO stack. Keys appear on first push and
//! disappear when their last value is popped, so nested loops reusing a
//! variable name shadow and then restore the outer binding.

use super::error::MultistackError;
use super::value::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Multistack {
    entries: HashMap<String, Vec<Value>>,
}

impl Multistack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: Value) {
        self.entries.entry(key.to_string()).or_default().push(value);
    }

    pub fn pop(&mut self, key: &str) -> Result<Value, MultistackError> {
        let stack = self.entries.get_mut(key).ok_or_else(|| empty(key))?;
        let value = stack.pop().ok_or_else(|| empty(key))?;
        if stack.is_empty() {
            self.entries.remove(key);
        }
        Ok(value)
    }

    pub fn peek(&self, key: &str) -> Result<&Value, MultistackError> {
        self.entries
            .get(key)
            .and_then(|stack| stack.last())
            .ok_or_else(|| empty(key))
    }

    /// Check whether a key has no values
    pub fn is_empty(&self, key: &str) -> bool {
        !self.entries.contains_key(key)
    }

    /// Number of values stored under a key
    pub fn len(&self, key: &str) -> usize {
        self.entries.get(key).map_or(0, Vec::len)
    }

    /// Number of keys currently holding values
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}

fn empty(key: &str) -> MultistackError {
    MultistackError::EmptyEntry {
        key: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_lifo_per_key() {
        let mut stack = Multistack::new();
        stack.push("a", Value::Integer(1));
        stack.push("a", Value::Integer(2));
        stack.push("b", Value::from("x"));

        assert_eq!(stack.len("a"), 2);
        assert_eq!(stack.peek("a"), Ok(&Value::Integer(2)));
        assert_eq!(stack.pop("a"), Ok(Value::Integer(2)));
        assert_eq!(stack.pop("b"), Ok(Value::from("x")));
        assert_eq!(stack.pop("a"), Ok(Value::Integer(1)));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut stack = Multistack::new();
        stack.push("outer", Value::Integer(10));
        stack.push("inner", Value::Integer(20));
        assert_eq!(stack.pop("inner"), Ok(Value::Integer(20)));
        assert_eq!(stack.peek("outer"), Ok(&Value::Integer(10)));
        assert_eq!(stack.len("outer"), 1);
    }

    #[test]
    fn test_empty_keys_are_removed() {
        let mut stack = Multistack::new();
        stack.push("k", Value::Null);
        assert_eq!(stack.key_count(), 1);
        stack.pop("k").unwrap();
        assert!(stack.is_empty("k"));
        assert_eq!(stack.key_count(), 0);
    }

    #[test]
    fn test_empty_access_fails() {
        let mut stack = Multistack::new();
        assert_matches!(stack.pop("missing"), Err(MultistackError::EmptyEntry { ref key }) if key == "missing");
        assert_matches!(stack.peek("missing"), Err(MultistackError::EmptyEntry { .. }));
    }
}
