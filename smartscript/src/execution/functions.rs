//! Built-in function dispatch for `@name` elements
//!
//! The engine only relies on [`BuiltinFunction`]: a fixed arity and an
//! operation over the popped operands. Operands are passed deepest first,
//! so for `{$= x "0.00" @decfmt $}` the call receives `[x, "0.00"]`.
//! Returned values are pushed in order, the last one ending on top.

use super::context::RequestContext;
use super::error::{ExecutionError, ExecutionResult};
use super::value::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Function callable from echo tags
pub trait BuiltinFunction: Send + Sync {
    /// Name without the leading `@`
    fn name(&self) -> &str;

    /// Number of operands popped from the value stack
    fn arity(&self) -> usize;

    fn call(
        &self,
        operands: Vec<Value>,
        context: &mut RequestContext<'_>,
    ) -> ExecutionResult<Vec<Value>>;
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Name to function lookup table
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Box<dyn BuiltinFunction>>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every standard built-in
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for function in builtin_functions() {
            registry.functions.insert(function.name().to_string(), function);
        }
        registry
    }

    /// Register a function; names must be unique
    pub fn register(&mut self, function: Box<dyn BuiltinFunction>) -> ExecutionResult<()> {
        let name = function.name().to_string();
        if self.functions.contains_key(&name) {
            return Err(ExecutionError::DuplicateFunction { name });
        }
        self.functions.insert(name, function);
        Ok(())
    }

    /// Look up a function by name (without `@`)
    pub fn resolve(&self, name: &str) -> ExecutionResult<&dyn BuiltinFunction> {
        self.functions
            .get(name)
            .map(|function| function.as_ref())
            .ok_or_else(|| ExecutionError::UnknownFunction {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Shared registry of the standard built-ins
pub fn standard_registry() -> &'static FunctionRegistry {
    static STANDARD: OnceLock<FunctionRegistry> = OnceLock::new();
    STANDARD.get_or_init(FunctionRegistry::with_builtins)
}

fn builtin_functions() -> Vec<Box<dyn BuiltinFunction>> {
    vec![
        Box::new(Sin),
        Box::new(DecimalFormat),
        Box::new(Duplicate),
        Box::new(Swap),
        Box::new(SetMimeType),
        Box::new(ParamGet::new("paramGet", ParameterScope::Request)),
        Box::new(ParamGet::new("pparamGet", ParameterScope::Persistent)),
        Box::new(ParamGet::new("tparamGet", ParameterScope::Temporary)),
        Box::new(ParamSet::new("pparamSet", WritableScope::Persistent)),
        Box::new(ParamSet::new("tparamSet", WritableScope::Temporary)),
        Box::new(ParamDel::new("pparamDel", WritableScope::Persistent)),
        Box::new(ParamDel::new("tparamDel", WritableScope::Temporary)),
    ]
}

/// Destructure operands into a fixed-size array
fn take<const N: usize>(name: &str, operands: Vec<Value>) -> ExecutionResult<[Value; N]> {
    operands.try_into().map_err(|operands: Vec<Value>| {
        ExecutionError::function_failed(
            name,
            format!("expected {} operand(s), got {}", N, operands.len()),
        )
    })
}

// ============================================================================
// NUMERIC AND STACK FUNCTIONS
// ============================================================================

/// `x @sin`: sine of an angle given in degrees
struct Sin;

impl BuiltinFunction for Sin {
    fn name(&self) -> &str {
        "sin"
    }

    fn arity(&self) -> usize {
        1
    }

    fn call(&self, operands: Vec<Value>, _: &mut RequestContext<'_>) -> ExecutionResult<Vec<Value>> {
        let [x] = take::<1>(self.name(), operands)?;
        Ok(vec![Value::Double(x.to_f64()?.to_radians().sin())])
    }
}

/// `x pattern @decfmt`: format a number with a decimal pattern
struct DecimalFormat;

impl BuiltinFunction for DecimalFormat {
    fn name(&self) -> &str {
        "decfmt"
    }

    fn arity(&self) -> usize {
        2
    }

    fn call(&self, operands: Vec<Value>, _: &mut RequestContext<'_>) -> ExecutionResult<Vec<Value>> {
        let [x, pattern] = take::<2>(self.name(), operands)?;
        let formatted = format_decimal(x.to_f64()?, &pattern.to_string())
            .map_err(|reason| ExecutionError::function_failed(self.name(), reason))?;
        Ok(vec![Value::String(formatted)])
    }
}

/// `v @dup`: leave two copies of the top value
struct Duplicate;

impl BuiltinFunction for Duplicate {
    fn name(&self) -> &str {
        "dup"
    }

    fn arity(&self) -> usize {
        1
    }

    fn call(&self, operands: Vec<Value>, _: &mut RequestContext<'_>) -> ExecutionResult<Vec<Value>> {
        let [value] = take::<1>(self.name(), operands)?;
        Ok(vec![value.clone(), value])
    }
}

/// `a b @swap`: exchange the two top values
struct Swap;

impl BuiltinFunction for Swap {
    fn name(&self) -> &str {
        "swap"
    }

    fn arity(&self) -> usize {
        2
    }

    fn call(&self, operands: Vec<Value>, _: &mut RequestContext<'_>) -> ExecutionResult<Vec<Value>> {
        let [below, top] = take::<2>(self.name(), operands)?;
        Ok(vec![top, below])
    }
}

// ============================================================================
// CONTEXT FUNCTIONS
// ============================================================================

/// `type @setMimeType`
struct SetMimeType;

impl BuiltinFunction for SetMimeType {
    fn name(&self) -> &str {
        "setMimeType"
    }

    fn arity(&self) -> usize {
        1
    }

    fn call(
        &self,
        operands: Vec<Value>,
        context: &mut RequestContext<'_>,
    ) -> ExecutionResult<Vec<Value>> {
        let [mime_type] = take::<1>(self.name(), operands)?;
        context.set_mime_type(mime_type.to_string());
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Copy)]
enum ParameterScope {
    Request,
    Persistent,
    Temporary,
}

#[derive(Debug, Clone, Copy)]
enum WritableScope {
    Persistent,
    Temporary,
}

/// `name default @paramGet`: parameter value, or the default when missing
struct ParamGet {
    name: &'static str,
    scope: ParameterScope,
}

impl ParamGet {
    fn new(name: &'static str, scope: ParameterScope) -> Self {
        Self { name, scope }
    }
}

impl BuiltinFunction for ParamGet {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> usize {
        2
    }

    fn call(
        &self,
        operands: Vec<Value>,
        context: &mut RequestContext<'_>,
    ) -> ExecutionResult<Vec<Value>> {
        let [key, default] = take::<2>(self.name, operands)?;
        let key = key.to_string();
        let found = match self.scope {
            ParameterScope::Request => context.parameter(&key),
            ParameterScope::Persistent => context.persistent_parameter(&key),
            ParameterScope::Temporary => context.temporary_parameter(&key),
        };
        Ok(vec![found.map(Value::from).unwrap_or(default)])
    }
}

/// `value name @pparamSet`
struct ParamSet {
    name: &'static str,
    scope: WritableScope,
}

impl ParamSet {
    fn new(name: &'static str, scope: WritableScope) -> Self {
        Self { name, scope }
    }
}

impl BuiltinFunction for ParamSet {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> usize {
        2
    }

    fn call(
        &self,
        operands: Vec<Value>,
        context: &mut RequestContext<'_>,
    ) -> ExecutionResult<Vec<Value>> {
        let [value, key] = take::<2>(self.name, operands)?;
        match self.scope {
            WritableScope::Persistent => {
                context.set_persistent_parameter(key.to_string(), value.to_string())
            }
            WritableScope::Temporary => {
                context.set_temporary_parameter(key.to_string(), value.to_string())
            }
        }
        Ok(Vec::new())
    }
}

/// `name @pparamDel`
struct ParamDel {
    name: &'static str,
    scope: WritableScope,
}

impl ParamDel {
    fn new(name: &'static str, scope: WritableScope) -> Self {
        Self { name, scope }
    }
}

impl BuiltinFunction for ParamDel {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> usize {
        1
    }

    fn call(
        &self,
        operands: Vec<Value>,
        context: &mut RequestContext<'_>,
    ) -> ExecutionResult<Vec<Value>> {
        let [key] = take::<1>(self.name, operands)?;
        let key = key.to_string();
        match self.scope {
            WritableScope::Persistent => context.remove_persistent_parameter(&key),
            WritableScope::Temporary => context.remove_temporary_parameter(&key),
        };
        Ok(Vec::new())
    }
}

// ============================================================================
// DECIMAL PATTERNS
// ============================================================================

/// Parsed form of a pattern such as `#,##0.00`
#[derive(Debug, PartialEq)]
struct DecimalPattern<'p> {
    prefix: &'p str,
    suffix: &'p str,
    min_integer_digits: usize,
    grouping_size: Option<usize>,
    min_fraction_digits: usize,
    max_fraction_digits: usize,
}

fn is_pattern_char(ch: char) -> bool {
    matches!(ch, '0' | '#' | ',' | '.')
}

impl<'p> DecimalPattern<'p> {
    fn parse(pattern: &'p str) -> Result<Self, String> {
        let start = pattern
            .find(is_pattern_char)
            .ok_or_else(|| format!("pattern '{}' contains no digit placeholders", pattern))?;
        let end = pattern
            .rfind(is_pattern_char)
            .map_or(start, |index| index + 1);
        let body = &pattern[start..end];

        if body.contains(|c: char| !is_pattern_char(c)) {
            return Err(format!("unsupported character in pattern '{}'", pattern));
        }
        if !body.contains(|c: char| matches!(c, '0' | '#')) {
            return Err(format!("pattern '{}' contains no digit placeholders", pattern));
        }

        let (integer, fraction) = match body.split_once('.') {
            Some((_, fraction)) if fraction.contains('.') => {
                return Err(format!("multiple decimal separators in '{}'", pattern))
            }
            Some((integer, fraction)) => (integer, fraction),
            None => (body, ""),
        };

        if fraction.contains(',') {
            return Err(format!("grouping separator after decimal point in '{}'", pattern));
        }
        if fraction.trim_end_matches('#').contains('#') {
            return Err(format!("'0' after '#' in fraction of '{}'", pattern));
        }

        let grouping_size = integer
            .rfind(',')
            .map(|index| integer[index + 1..].len())
            .filter(|size| *size > 0);

        Ok(Self {
            prefix: &pattern[..start],
            suffix: &pattern[end..],
            min_integer_digits: integer.chars().filter(|c| *c == '0').count(),
            grouping_size,
            min_fraction_digits: fraction.chars().filter(|c| *c == '0').count(),
            max_fraction_digits: fraction.len(),
        })
    }

    fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return format!("{}{}{}", self.prefix, value, self.suffix);
        }

        let rounded = format!("{:.*}", self.max_fraction_digits, value.abs());
        let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));

        let mut integer = integer.trim_start_matches('0').to_string();
        if integer.len() < self.min_integer_digits {
            integer = "0".repeat(self.min_integer_digits - integer.len()) + &integer;
        }

        let mut fraction = fraction.trim_end_matches('0');
        if fraction.len() < self.min_fraction_digits {
            fraction = &rounded[rounded.len() - self.max_fraction_digits..][..self.min_fraction_digits];
        }

        if integer.is_empty() && fraction.is_empty() {
            integer.push('0');
        }

        if let Some(size) = self.grouping_size {
            integer = group_digits(&integer, size);
        }

        let negative = value < 0.0 && rounded.chars().any(|c| c.is_ascii_digit() && c != '0');
        let mut output = String::from(self.prefix);
        if negative {
            output.push('-');
        }
        output.push_str(&integer);
        if !fraction.is_empty() {
            output.push('.');
            output.push_str(fraction);
        }
        output.push_str(self.suffix);
        output
    }
}

fn group_digits(digits: &str, size: usize) -> String {
    let count = digits.chars().count();
    let mut grouped = String::with_capacity(count + count / size);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (count - index) % size == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Format a number with a `DecimalFormat`-style pattern (`0`, `#`, `.`, `,`)
pub fn format_decimal(value: f64, pattern: &str) -> Result<String, String> {
    DecimalPattern::parse(pattern).map(|parsed| parsed.format(value))
}
