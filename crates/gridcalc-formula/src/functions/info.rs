//! Information functions

use gridcalc_core::ErrorCode;

use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::resolver;
use crate::value::Value;

fn test_value<F>(args: &[Value], ctx: &EvaluationContext, test: F) -> FormulaResult<Value>
where
    F: Fn(&Value) -> bool,
{
    let value = match args.first() {
        Some(v) => resolver::resolve_single(v, ctx),
        None => Value::Blank,
    };
    Ok(Value::Boolean(test(&value)))
}

/// ISBLANK(value) - TRUE for an empty cell
pub fn fn_isblank(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    test_value(args, ctx, |v| matches!(v, Value::Blank))
}

/// ISNUMBER(value)
pub fn fn_isnumber(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    test_value(args, ctx, |v| matches!(v, Value::Number(_)))
}

/// ISTEXT(value)
pub fn fn_istext(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    test_value(args, ctx, |v| matches!(v, Value::Text(_)))
}

/// ISLOGICAL(value)
pub fn fn_islogical(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    test_value(args, ctx, |v| matches!(v, Value::Boolean(_)))
}

/// ISERROR(value) - TRUE for any error
pub fn fn_iserror(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    test_value(args, ctx, Value::is_error)
}

/// ISERR(value) - TRUE for any error except #N/A
pub fn fn_iserr(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    test_value(args, ctx, |v| matches!(v, Value::Error(e) if *e != ErrorCode::Na))
}

/// ISNA(value) - TRUE only for #N/A
pub fn fn_isna(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    test_value(args, ctx, |v| matches!(v, Value::Error(ErrorCode::Na)))
}

/// NA() - The #N/A error
pub fn fn_na(_args: &[Value], _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(Value::Error(ErrorCode::Na))
}
