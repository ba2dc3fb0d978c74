//! Text functions
//!
//! Lengths and positions count characters, not bytes.

use gridcalc_core::ErrorCode;

use super::{number_arg, text_arg};
use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::resolver;
use crate::value::Value;

/// Character count argument; absent means `default`, negative is `#VALUE!`
fn count_arg(
    args: &[Value],
    index: usize,
    default: usize,
    ctx: &EvaluationContext,
) -> Result<usize, ErrorCode> {
    if args.get(index).is_none() {
        return Ok(default);
    }
    let n = number_arg(args, index, ctx)?.trunc();
    if n < 0.0 {
        return Err(ErrorCode::Value);
    }
    Ok(n.min(usize::MAX as f64) as usize)
}

/// LEN(text) - Number of characters
pub fn fn_len(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let text = try_value!(text_arg(args, 0, ctx));
    Ok(Value::Number(text.chars().count() as f64))
}

/// LEFT(text, [num_chars]) - Leading characters
pub fn fn_left(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let text = try_value!(text_arg(args, 0, ctx));
    let n = try_value!(count_arg(args, 1, 1, ctx));
    Ok(Value::Text(text.chars().take(n).collect()))
}

/// RIGHT(text, [num_chars]) - Trailing characters
pub fn fn_right(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let text = try_value!(text_arg(args, 0, ctx));
    let n = try_value!(count_arg(args, 1, 1, ctx));
    let len = text.chars().count();
    Ok(Value::Text(text.chars().skip(len.saturating_sub(n)).collect()))
}

/// MID(text, start_num, num_chars) - Characters from a 1-based position
pub fn fn_mid(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let text = try_value!(text_arg(args, 0, ctx));
    let start = try_value!(number_arg(args, 1, ctx)).trunc();
    let n = try_value!(count_arg(args, 2, 0, ctx));
    if start < 1.0 {
        return Ok(Value::Error(ErrorCode::Value));
    }
    let skip = (start - 1.0).min(usize::MAX as f64) as usize;
    Ok(Value::Text(text.chars().skip(skip).take(n).collect()))
}

/// UPPER(text)
pub fn fn_upper(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let text = try_value!(text_arg(args, 0, ctx));
    Ok(Value::Text(text.to_uppercase()))
}

/// LOWER(text)
pub fn fn_lower(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let text = try_value!(text_arg(args, 0, ctx));
    Ok(Value::Text(text.to_lowercase()))
}

/// TRIM(text) - Removes leading and trailing spaces and collapses inner runs
pub fn fn_trim(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let text = try_value!(text_arg(args, 0, ctx));
    let words: Vec<&str> = text.split(' ').filter(|w| !w.is_empty()).collect();
    Ok(Value::Text(words.join(" ")))
}

/// CONCATENATE(text1, ...) - Joins several texts
pub fn fn_concatenate(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let mut result = String::new();
    for arg in args {
        result.push_str(&try_value!(resolver::coerce_to_text(arg, ctx)));
    }
    Ok(Value::Text(result))
}

/// VALUE(text) - Converts text that looks like a number or date to a number
pub fn fn_value(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let value = match args.first() {
        Some(v) => resolver::resolve_single(v, ctx),
        None => Value::Blank,
    };
    Ok(match value {
        Value::Number(n) => Value::Number(n),
        Value::Blank | Value::MissingArgument => Value::Number(0.0),
        Value::Text(s) => match resolver::text_to_number(&s, ctx) {
            Some(n) => Value::Number(n),
            None => Value::Error(ErrorCode::Value),
        },
        Value::Error(e) => Value::Error(e),
        _ => Value::Error(ErrorCode::Value),
    })
}

/// T(value) - The text itself, or "" for anything else
pub fn fn_t(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let value = match args.first() {
        Some(v) => resolver::resolve_single(v, ctx),
        None => Value::Blank,
    };
    Ok(match value {
        text @ Value::Text(_) => text,
        Value::Error(e) => Value::Error(e),
        _ => Value::Text(String::new()),
    })
}

/// N(value) - The number itself, 1/0 for booleans, 0 for anything else
pub fn fn_n(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let value = match args.first() {
        Some(v) => resolver::resolve_single(v, ctx),
        None => Value::Blank,
    };
    Ok(match value {
        Value::Number(n) => Value::Number(n),
        Value::Boolean(b) => Value::Number(if b { 1.0 } else { 0.0 }),
        Value::Error(e) => Value::Error(e),
        _ => Value::Number(0.0),
    })
}
