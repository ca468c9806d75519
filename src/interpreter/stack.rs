//! Operand stack.

use crate::object::Value;

/// Operand stack of an interpreter run.
///
/// Popping an empty stack yields `Value::Null`, so handlers can pop the
/// operands they expect without checking the depth first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    values: Vec<Value>,
}

impl Stack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values on the stack.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the stack holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Push a value.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Pop the top value, or `Value::Null` when empty.
    pub fn pop(&mut self) -> Value {
        self.values.pop().unwrap_or(Value::Null)
    }

    /// The top value without removing it.
    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    /// Remove every value, returning them bottom first.
    pub fn take_all(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_empty_is_null() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), Value::Null);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_take_all_keeps_push_order() {
        let mut stack = Stack::new();
        stack.push(Value::Integer(1));
        stack.push(Value::Integer(2));
        assert_eq!(stack.peek(), Some(&Value::Integer(2)));
        assert_eq!(stack.take_all(), vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(stack.len(), 0);
    }
}
