//! Formula evaluator
//!
//! Runs a postfix token sequence on a value stack. Operand tokens push values
//! (references stay unresolved), operator and function tokens pop their
//! operands and push one result. The value left on the stack is resolved to a
//! scalar at the end.

use crate::context::EvaluationContext;
use crate::error::{EvaluationAbort, FormulaResult};
use crate::functions::{operators, registry, ArgShape};
use crate::resolver;
use crate::token::Token;
use crate::value::Value;
use gridcalc_core::ErrorCode;

/// Evaluate a token sequence for the cell described by `ctx`
///
/// Formula errors come back as `Ok(Value::Error(_))`. An `Err` means the token
/// sequence itself is malformed. A blank result reads as 0, as it does when a
/// formula refers to an empty cell.
pub fn evaluate(tokens: &[Token], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let result = evaluate_to_value(tokens, ctx).map_err(|abort| {
        log::debug!("evaluation aborted: {}", abort);
        abort
    })?;
    Ok(match resolver::resolve_single(&result, ctx) {
        Value::Blank | Value::MissingArgument => Value::Number(0.0),
        value => value,
    })
}

/// Evaluate a token sequence, leaving a final reference unresolved
pub fn evaluate_to_value(tokens: &[Token], ctx: &EvaluationContext) -> FormulaResult<Value> {
    if tokens.is_empty() {
        return Err(EvaluationAbort::EmptyFormula);
    }

    let mut stack: Vec<Value> = Vec::with_capacity(tokens.len());
    for (position, token) in tokens.iter().enumerate() {
        log::trace!("token {} {} (stack depth {})", position, token, stack.len());
        let value = match token {
            Token::Number(n) => Value::Number(*n),
            Token::Text(s) => Value::Text(s.clone()),
            Token::Boolean(b) => Value::Boolean(*b),
            Token::Error(e) => Value::Error(*e),
            Token::Missing => Value::MissingArgument,
            Token::Cell(cell) => Value::CellRef(*cell),
            Token::Area(area) => Value::AreaRef(*area),
            Token::Operator(op) => {
                let operands = pop_operands(&mut stack, op.arity(), position, || op.to_string())?;
                operators::apply(*op, &operands, ctx)
            }
            Token::Function { name, arg_count } => {
                let args = pop_operands(&mut stack, *arg_count, position, || name.clone())?;
                call_function(name, args, ctx)?
            }
        };
        stack.push(value);
    }

    match stack.len() {
        1 => stack.pop().ok_or(EvaluationAbort::ResidualStack { remaining: 0 }),
        remaining => Err(EvaluationAbort::ResidualStack { remaining }),
    }
}

/// Pop `count` operands, returned in push order
fn pop_operands<F>(
    stack: &mut Vec<Value>,
    count: usize,
    position: usize,
    operation: F,
) -> FormulaResult<Vec<Value>>
where
    F: FnOnce() -> String,
{
    if stack.len() < count {
        return Err(EvaluationAbort::StackUnderflow {
            position,
            operation: operation(),
            needed: count,
            available: stack.len(),
        });
    }
    Ok(stack.split_off(stack.len() - count))
}

fn call_function(name: &str, args: Vec<Value>, ctx: &EvaluationContext) -> FormulaResult<Value> {
    let Some(def) = registry().get(name) else {
        log::warn!("unknown function {}", name);
        return Err(EvaluationAbort::UnknownFunction(name.to_string()));
    };

    if !def.accepts(args.len()) {
        return Ok(Value::Error(ErrorCode::InvalidArgCount));
    }

    let args = match def.arg_shape {
        ArgShape::Scalar => args
            .iter()
            .map(|arg| resolver::resolve_single(arg, ctx))
            .collect(),
        ArgShape::Reference => args,
    };
    (def.implementation)(&args, ctx)
}

/// True if any function in the sequence is volatile (TODAY, NOW)
pub fn contains_volatile(tokens: &[Token]) -> bool {
    tokens.iter().any(|token| match token {
        Token::Function { name, .. } => registry().get(name).is_some_and(|def| def.volatile),
        _ => false,
    })
}
