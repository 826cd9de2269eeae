//! Tree-walking template engine
//!
//! Each [`SmartScriptEngine::execute`] call walks the document with a fresh
//! [`Multistack`], so one parsed document can be rendered any number of
//! times. All output goes through the [`RequestContext`].

use super::context::RequestContext;
use super::error::{ExecutionError, ExecutionResult};
use super::functions::{standard_registry, FunctionRegistry};
use super::multistack::Multistack;
use super::value::Value;
use crate::elements::Element;
use crate::nodes::{walk_children, DocumentNode, EchoNode, ForLoopNode, NodeVisitor, TextNode};
use std::cmp::Ordering;

/// Renders a parsed document against request contexts
pub struct SmartScriptEngine<'a> {
    document: &'a DocumentNode,
    registry: &'a FunctionRegistry,
}

impl<'a> SmartScriptEngine<'a> {
    /// Engine using the standard built-in functions
    pub fn new(document: &'a DocumentNode) -> Self {
        Self::with_registry(document, standard_registry())
    }

    pub fn with_registry(document: &'a DocumentNode, registry: &'a FunctionRegistry) -> Self {
        Self { document, registry }
    }

    /// Render the document, writing every byte through `context`
    pub fn execute(&self, context: &mut RequestContext<'_>) -> ExecutionResult<()> {
        let mut visitor = ExecutionVisitor {
            context: &mut *context,
            registry: self.registry,
            multistack: Multistack::new(),
        };
        self.document.accept(&mut visitor)?;
        context.flush()?;
        Ok(())
    }
}

/// Render a document with the standard built-ins
pub fn execute(document: &DocumentNode, context: &mut RequestContext<'_>) -> ExecutionResult<()> {
    SmartScriptEngine::new(document).execute(context)
}

struct ExecutionVisitor<'c, 'o> {
    context: &'c mut RequestContext<'o>,
    registry: &'c FunctionRegistry,
    multistack: Multistack,
}

impl ExecutionVisitor<'_, '_> {
    /// Value for a constant or bound variable
    fn evaluate(&self, element: &Element) -> ExecutionResult<Value> {
        match element {
            Element::ConstantInteger(value) => Ok(Value::Integer(i64::from(*value))),
            Element::ConstantDouble(value) => Ok(Value::Double(*value)),
            Element::StringLiteral(value) => Ok(Value::String(value.clone())),
            Element::Variable(name) => self
                .multistack
                .peek(name)
                .cloned()
                .map_err(|_| ExecutionError::UnboundVariable { name: name.clone() }),
            Element::Function(_) | Element::Operator(_) => Err(ExecutionError::invalid_operand(
                element.as_text(),
                "expected a constant or variable",
            )),
        }
    }

    fn loop_should_continue(&self, variable: &str, end: &Value) -> ExecutionResult<bool> {
        let current = self.multistack.peek(variable)?;
        Ok(current.compare(end)? != Ordering::Greater)
    }
}

fn ensure_operands(operation: String, required: usize, stack: &[Value]) -> ExecutionResult<()> {
    if stack.len() < required {
        return Err(ExecutionError::StackUnderflow {
            operation,
            required,
            available: stack.len(),
        });
    }
    Ok(())
}

impl NodeVisitor for ExecutionVisitor<'_, '_> {
    type Error = ExecutionError;

    fn visit_document(&mut self, node: &DocumentNode) -> ExecutionResult<()> {
        walk_children(self, &node.children)
    }

    fn visit_text(&mut self, node: &TextNode) -> ExecutionResult<()> {
        self.context.write(&node.text)?;
        Ok(())
    }

    fn visit_echo(&mut self, node: &EchoNode) -> ExecutionResult<()> {
        let mut stack: Vec<Value> = Vec::new();

        for element in &node.elements {
            match element {
                Element::Operator(op) => {
                    let available = stack.len();
                    match (stack.pop(), stack.pop()) {
                        (Some(right), Some(left)) => stack.push(left.apply(*op, &right)?),
                        _ => {
                            return Err(ExecutionError::StackUnderflow {
                                operation: op.symbol().to_string(),
                                required: 2,
                                available,
                            })
                        }
                    }
                }
                Element::Function(name) => {
                    let function = self.registry.resolve(name)?;
                    let arity = function.arity();
                    ensure_operands(format!("@{}", name), arity, &stack)?;
                    let operands = stack.split_off(stack.len() - arity);
                    stack.extend(function.call(operands, self.context)?);
                }
                constant_or_variable => stack.push(self.evaluate(constant_or_variable)?),
            }
        }

        for value in &stack {
            self.context.write(&value.to_string())?;
        }
        Ok(())
    }

    fn visit_for_loop(&mut self, node: &ForLoopNode) -> ExecutionResult<()> {
        let start = self.evaluate(&node.start)?;
        let end = self.evaluate(&node.end)?;
        let step = match &node.step {
            Some(step) => self.evaluate(step)?,
            None => Value::Integer(1),
        };
        let variable = node.variable.as_str();

        self.multistack.push(variable, start);
        while self.loop_should_continue(variable, &end)? {
            walk_children(self, &node.children)?;
            let current = self.multistack.pop(variable)?;
            self.multistack.push(variable, current.add(&step)?);
        }
        self.multistack.pop(variable)?;
        Ok(())
    }
}
