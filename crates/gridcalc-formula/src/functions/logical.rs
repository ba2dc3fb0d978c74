//! Logical functions

use gridcalc_core::ErrorCode;

use super::aggregate::{for_each_operand, CollectOptions, Origin};
use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::resolver;
use crate::value::Value;

/// An omitted branch argument reads as blank
fn branch(arg: &Value) -> Value {
    match arg {
        Value::MissingArgument => Value::Blank,
        other => other.clone(),
    }
}

/// IF(condition, value_if_true, [value_if_false])
///
/// The chosen branch is returned as it is, so a reference stays a reference.
/// Without a false branch the result is FALSE.
pub fn fn_if(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let condition = match args.first() {
        Some(v) => try_value!(resolver::coerce_to_boolean(v, ctx)),
        None => return Ok(Value::Error(ErrorCode::Value)),
    };
    let chosen = if condition { args.get(1) } else { args.get(2) };
    Ok(match chosen {
        Some(v) => branch(v),
        None => Value::Boolean(false),
    })
}

/// Truth values of all operands, ignoring text and blanks inside references
fn truth_values(args: &[Value], ctx: &EvaluationContext) -> Result<Vec<bool>, ErrorCode> {
    let mut values = Vec::new();
    for_each_operand(args, ctx, CollectOptions::default(), |value, origin| {
        let text_is_blank = origin == Origin::Reference;
        if let Some(b) = resolver::coerce_to_optional_boolean(value, ctx, text_is_blank)? {
            values.push(b);
        }
        Ok(())
    })?;
    if values.is_empty() {
        return Err(ErrorCode::Value);
    }
    Ok(values)
}

/// AND(logical1, ...) - TRUE if all arguments are TRUE
pub fn fn_and(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let values = try_value!(truth_values(args, ctx));
    Ok(Value::Boolean(values.iter().all(|b| *b)))
}

/// OR(logical1, ...) - TRUE if any argument is TRUE
pub fn fn_or(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let values = try_value!(truth_values(args, ctx));
    Ok(Value::Boolean(values.iter().any(|b| *b)))
}

/// NOT(logical) - Reverses a logical value
pub fn fn_not(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let value = match args.first() {
        Some(v) => try_value!(resolver::coerce_to_boolean(v, ctx)),
        None => false,
    };
    Ok(Value::Boolean(!value))
}

/// IFERROR(value, value_if_error) - Replaces an error with a fallback
pub fn fn_iferror(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let [value, fallback] = args else {
        return Ok(Value::Error(ErrorCode::Value));
    };
    if resolver::resolve_single(value, ctx).is_error() {
        Ok(branch(fallback))
    } else {
        Ok(branch(value))
    }
}

/// TRUE() - The logical value TRUE
pub fn fn_true(_args: &[Value], _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(Value::Boolean(true))
}

/// FALSE() - The logical value FALSE
pub fn fn_false(_args: &[Value], _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(Value::Boolean(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{area, cell, workbook};
    use gridcalc_core::CellValue;

    fn eval(f: crate::functions::FunctionImpl, args: &[Value]) -> Value {
        f(args, &EvaluationContext::simple()).unwrap()
    }

    #[test]
    fn test_if() {
        let yes = Value::text("Yes");
        let no = Value::text("No");
        assert_eq!(eval(fn_if, &[Value::Boolean(true), yes.clone(), no.clone()]), yes);
        assert_eq!(eval(fn_if, &[Value::Number(0.0), yes.clone(), no.clone()]), no);
        assert_eq!(eval(fn_if, &[Value::Boolean(false), yes.clone()]), Value::Boolean(false));
        assert_eq!(
            eval(fn_if, &[Value::Boolean(true), Value::MissingArgument, no.clone()]),
            Value::Blank
        );
        assert_eq!(
            eval(fn_if, &[Value::text("maybe"), yes.clone(), no.clone()]),
            Value::Error(ErrorCode::Value)
        );
        assert_eq!(
            eval(fn_if, &[Value::Error(ErrorCode::Na), yes, no]),
            Value::Error(ErrorCode::Na)
        );
    }

    #[test]
    fn test_if_returns_reference_branch() {
        let wb = workbook(&[("A1", CellValue::Number(1.0))]);
        let ctx = EvaluationContext::for_workbook(&wb, 0, 5, 5);
        assert_eq!(
            fn_if(&[cell("A1"), area("B1:B3"), Value::Number(0.0)], &ctx).unwrap(),
            area("B1:B3")
        );
    }

    #[test]
    fn test_and_or() {
        let t = Value::Boolean(true);
        let f = Value::Boolean(false);
        assert_eq!(eval(fn_and, &[t.clone(), t.clone()]), t);
        assert_eq!(eval(fn_and, &[t.clone(), f.clone()]), f);
        assert_eq!(eval(fn_or, &[f.clone(), Value::Number(2.0)]), t);
        assert_eq!(eval(fn_or, &[f.clone(), Value::text("true")]), t);
        assert_eq!(eval(fn_or, &[Value::text("abc")]), Value::Error(ErrorCode::Value));
        assert_eq!(
            eval(fn_and, &[t, Value::Error(ErrorCode::Div0)]),
            Value::Error(ErrorCode::Div0)
        );
    }

    #[test]
    fn test_and_or_over_references() {
        let wb = workbook(&[
            ("A1", CellValue::Boolean(true)),
            ("A2", CellValue::string("text")),
            ("A3", CellValue::Number(1.0)),
        ]);
        let ctx = EvaluationContext::for_workbook(&wb, 0, 9, 9);
        assert_eq!(fn_and(&[area("A1:A4")], &ctx).unwrap(), Value::Boolean(true));
        assert_eq!(
            fn_or(&[area("A2"), area("B1:B3")], &ctx).unwrap(),
            Value::Error(ErrorCode::Value)
        );
    }

    #[test]
    fn test_not_and_constants() {
        assert_eq!(eval(fn_not, &[Value::Boolean(true)]), Value::Boolean(false));
        assert_eq!(eval(fn_not, &[Value::Blank]), Value::Boolean(true));
        assert_eq!(eval(fn_true, &[]), Value::Boolean(true));
        assert_eq!(eval(fn_false, &[]), Value::Boolean(false));
    }

    #[test]
    fn test_iferror() {
        assert_eq!(
            eval(fn_iferror, &[Value::Error(ErrorCode::Div0), Value::text("oops")]),
            Value::text("oops")
        );
        assert_eq!(
            eval(fn_iferror, &[Value::Number(1.0), Value::text("oops")]),
            Value::Number(1.0)
        );
        let wb = workbook(&[("A1", CellValue::Error(ErrorCode::Na))]);
        let ctx = EvaluationContext::for_workbook(&wb, 0, 5, 5);
        assert_eq!(
            fn_iferror(&[cell("A1"), Value::Number(0.0)], &ctx).unwrap(),
            Value::Number(0.0)
        );
    }
}
