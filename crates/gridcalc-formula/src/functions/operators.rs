//! Operator semantics
//!
//! Operands arrive unresolved. Value operators collapse them to scalars with
//! implicit intersection; the reference operators (range and intersection)
//! work on the references themselves. Errors are checked left operand first.

use std::cmp::Ordering;

use gridcalc_core::ErrorCode;

use super::number_result;
use crate::context::EvaluationContext;
use crate::number_text::{round_significant, SIGNIFICANT_DIGITS};
use crate::resolver::{coerce_to_number, coerce_to_text, resolve_single};
use crate::token::Operator;
use crate::value::{AreaRef, Value};

/// Apply an operator to operands popped from the stack, in push order
///
/// The operand count must match [`Operator::arity`]; a mismatch gives `#VALUE!`.
pub fn apply(op: Operator, operands: &[Value], ctx: &EvaluationContext) -> Value {
    match operands {
        [operand] if op.arity() == 1 => apply_unary(op, operand, ctx),
        [left, right] if op.arity() == 2 => apply_binary(op, left, right, ctx),
        _ => Value::Error(ErrorCode::Value),
    }
}

/// Apply a unary operator
pub fn apply_unary(op: Operator, operand: &Value, ctx: &EvaluationContext) -> Value {
    match op {
        Operator::UnaryPlus => match resolve_single(operand, ctx) {
            text @ Value::Text(_) => text,
            other => numeric(&other, ctx, number_result),
        },
        Operator::UnaryMinus => numeric(operand, ctx, |n| number_result(-n)),
        Operator::Percent => numeric(operand, ctx, |n| number_result(n / 100.0)),
        _ => Value::Error(ErrorCode::Value),
    }
}

/// Apply a binary operator
pub fn apply_binary(op: Operator, left: &Value, right: &Value, ctx: &EvaluationContext) -> Value {
    match op {
        Operator::Add => arithmetic(left, right, ctx, |a, b| Ok(number_result(a + b))),
        Operator::Subtract => arithmetic(left, right, ctx, |a, b| {
            let n = a - b;
            Ok(if n.is_finite() {
                Value::Number(n)
            } else {
                Value::Error(ErrorCode::Num)
            })
        }),
        Operator::Multiply => arithmetic(left, right, ctx, |a, b| Ok(number_result(a * b))),
        Operator::Divide => arithmetic(left, right, ctx, |a, b| {
            if b == 0.0 {
                return Err(ErrorCode::Div0);
            }
            Ok(number_result(a / b))
        }),
        Operator::Power => arithmetic(left, right, ctx, |a, b| {
            if a == 0.0 && b == 0.0 {
                return Err(ErrorCode::Num);
            }
            if a == 0.0 && b < 0.0 {
                return Err(ErrorCode::Div0);
            }
            Ok(number_result(a.powf(b)))
        }),
        Operator::Concat => match (coerce_to_text(left, ctx), coerce_to_text(right, ctx)) {
            (Err(e), _) | (_, Err(e)) => Value::Error(e),
            (Ok(a), Ok(b)) => Value::Text(a + &b),
        },
        Operator::Equal => compare(left, right, ctx, Ordering::is_eq),
        Operator::NotEqual => compare(left, right, ctx, Ordering::is_ne),
        Operator::LessThan => compare(left, right, ctx, Ordering::is_lt),
        Operator::LessEqual => compare(left, right, ctx, Ordering::is_le),
        Operator::GreaterThan => compare(left, right, ctx, Ordering::is_gt),
        Operator::GreaterEqual => compare(left, right, ctx, Ordering::is_ge),
        Operator::Range => match reference_operands(left, right) {
            Ok((a, b)) if on_one_sheet(&a, &b) => Value::AreaRef(a.bounding_box(&b)),
            Ok(_) => Value::Error(ErrorCode::Value),
            Err(e) => Value::Error(e),
        },
        Operator::Intersection => match reference_operands(left, right) {
            Ok((a, b)) => match a.intersect(&b) {
                Some(area) if area.is_single_cell() => Value::CellRef(area.top_left()),
                Some(area) => Value::AreaRef(area),
                None => Value::Error(ErrorCode::Null),
            },
            Err(e) => Value::Error(e),
        },
        Operator::UnaryPlus | Operator::UnaryMinus | Operator::Percent => {
            Value::Error(ErrorCode::Value)
        }
    }
}

fn numeric<F>(operand: &Value, ctx: &EvaluationContext, f: F) -> Value
where
    F: FnOnce(f64) -> Value,
{
    match coerce_to_number(operand, ctx) {
        Ok(n) => f(n),
        Err(e) => Value::Error(e),
    }
}

fn arithmetic<F>(left: &Value, right: &Value, ctx: &EvaluationContext, f: F) -> Value
where
    F: FnOnce(f64, f64) -> Result<Value, ErrorCode>,
{
    let result = coerce_to_number(left, ctx)
        .and_then(|a| coerce_to_number(right, ctx).map(|b| (a, b)))
        .and_then(|(a, b)| f(a, b));
    match result {
        Ok(v) => v,
        Err(e) => Value::Error(e),
    }
}

fn reference_operands(left: &Value, right: &Value) -> Result<(AreaRef, AreaRef), ErrorCode> {
    let as_area = |v: &Value| match v {
        Value::Error(e) => Err(*e),
        other => other.as_area().ok_or(ErrorCode::Value),
    };
    Ok((as_area(left)?, as_area(right)?))
}

fn on_one_sheet(a: &AreaRef, b: &AreaRef) -> bool {
    a.sheet() == b.sheet() && !a.spans_multiple_sheets() && !b.spans_multiple_sheets()
}

fn compare<F>(left: &Value, right: &Value, ctx: &EvaluationContext, test: F) -> Value
where
    F: FnOnce(Ordering) -> bool,
{
    let a = resolve_single(left, ctx);
    let b = resolve_single(right, ctx);
    if let Value::Error(e) = a {
        return Value::Error(e);
    }
    if let Value::Error(e) = b {
        return Value::Error(e);
    }
    Value::Boolean(test(compare_scalars(&a, &b)))
}

/// Order two scalars the way comparison operators do
///
/// A blank adopts the type of the other side (0, "" or FALSE). Across types,
/// numbers sort before text and text before booleans. Text compares without
/// regard to case. Numbers compare after rounding to 15 significant digits, so
/// `-0` and `0` are equal.
pub fn compare_scalars(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Blank | Value::MissingArgument, Value::Blank | Value::MissingArgument) => {
            Ordering::Equal
        }
        (Value::Blank | Value::MissingArgument, other) => compare_scalars(&blank_like(other), other),
        (other, Value::Blank | Value::MissingArgument) => compare_scalars(other, &blank_like(other)),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Boolean(_), _) => Ordering::Greater,
        (_, Value::Boolean(_)) => Ordering::Less,
        (Value::Text(x), Value::Text(y)) => x.to_uppercase().cmp(&y.to_uppercase()),
        (Value::Text(_), _) => Ordering::Greater,
        (_, Value::Text(_)) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => compare_numbers(*x, *y),
        // Remaining combinations involve errors or references, which callers resolve first
        _ => Ordering::Equal,
    }
}

fn blank_like(other: &Value) -> Value {
    match other {
        Value::Boolean(_) => Value::Boolean(false),
        Value::Text(_) => Value::Text(String::new()),
        _ => Value::Number(0.0),
    }
}

fn compare_numbers(x: f64, y: f64) -> Ordering {
    let x = round_significant(x, SIGNIFICANT_DIGITS);
    let y = round_significant(y, SIGNIFICANT_DIGITS);
    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{area, cell, workbook};
    use gridcalc_core::CellValue;

    fn binary(op: Operator, a: impl Into<Value>, b: impl Into<Value>) -> Value {
        apply_binary(op, &a.into(), &b.into(), &EvaluationContext::simple())
    }

    fn unary(op: Operator, a: impl Into<Value>) -> Value {
        apply_unary(op, &a.into(), &EvaluationContext::simple())
    }

    fn is_negative_zero(v: &Value) -> bool {
        matches!(v, Value::Number(n) if *n == 0.0 && n.is_sign_negative())
    }

    #[test]
    fn test_sign_of_zero() {
        assert!(is_negative_zero(&binary(Operator::Subtract, -0.0, 0.0)));
        assert!(!is_negative_zero(&binary(Operator::Add, -0.0, 0.0)));
        assert!(!is_negative_zero(&binary(Operator::Multiply, -1.0, 0.0)));
        assert!(!is_negative_zero(&binary(Operator::Divide, 0.0, -5.0)));
        assert!(!is_negative_zero(&unary(Operator::UnaryMinus, 0.0)));
        assert!(!is_negative_zero(&unary(Operator::UnaryPlus, -0.0)));
        assert!(!is_negative_zero(&unary(Operator::Percent, -0.0)));
    }

    #[test]
    fn test_percent() {
        assert_eq!(unary(Operator::Percent, 5.0), Value::Number(0.05));
        assert_eq!(unary(Operator::Percent, 3000.0), Value::Number(30.0));
        assert_eq!(unary(Operator::Percent, -150.0), Value::Number(-1.5));

        let wb = workbook(&[("A1", CellValue::Number(50.0))]);
        let ctx = EvaluationContext::for_workbook(&wb, 0, 4, 4);
        assert_eq!(
            apply_unary(Operator::Percent, &area("A1:A1"), &ctx),
            Value::Number(0.5)
        );
    }

    #[test]
    fn test_arithmetic_errors() {
        assert_eq!(binary(Operator::Divide, 1.0, 0.0), Value::Error(ErrorCode::Div0));
        assert_eq!(binary(Operator::Power, 0.0, 0.0), Value::Error(ErrorCode::Num));
        assert_eq!(binary(Operator::Power, 0.0, -1.0), Value::Error(ErrorCode::Div0));
        assert_eq!(binary(Operator::Power, -8.0, 0.5), Value::Error(ErrorCode::Num));
        assert_eq!(binary(Operator::Multiply, 1e200, 1e200), Value::Error(ErrorCode::Num));
        assert_eq!(binary(Operator::Add, "abc", 1.0), Value::Error(ErrorCode::Value));
        assert_eq!(binary(Operator::Add, "2", true), Value::Number(3.0));
    }

    #[test]
    fn test_left_error_wins() {
        assert_eq!(
            binary(Operator::Add, ErrorCode::Na, ErrorCode::Div0),
            Value::Error(ErrorCode::Na)
        );
        assert_eq!(
            binary(Operator::Equal, ErrorCode::Ref, ErrorCode::Na),
            Value::Error(ErrorCode::Ref)
        );
        assert_eq!(
            binary(Operator::Concat, "a", ErrorCode::Num),
            Value::Error(ErrorCode::Num)
        );
    }

    #[test]
    fn test_unary_plus_keeps_text() {
        assert_eq!(unary(Operator::UnaryPlus, "abc"), Value::text("abc"));
        assert_eq!(unary(Operator::UnaryMinus, "abc"), Value::Error(ErrorCode::Value));
        assert_eq!(unary(Operator::UnaryPlus, true), Value::Number(1.0));
    }

    #[test]
    fn test_concat() {
        assert_eq!(binary(Operator::Concat, "Value: ", 42.0), Value::text("Value: 42"));
        assert_eq!(binary(Operator::Concat, true, Value::Blank), Value::text("TRUE"));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(binary(Operator::Equal, -0.0, 0.0), Value::Boolean(true));
        assert_eq!(binary(Operator::Equal, "abc", "ABC"), Value::Boolean(true));
        assert_eq!(binary(Operator::LessThan, 100.0, "1"), Value::Boolean(true));
        assert_eq!(binary(Operator::GreaterThan, false, "zzz"), Value::Boolean(true));
        assert_eq!(binary(Operator::Equal, Value::Blank, 0.0), Value::Boolean(true));
        assert_eq!(binary(Operator::Equal, Value::Blank, ""), Value::Boolean(true));
        assert_eq!(binary(Operator::Equal, false, Value::Blank), Value::Boolean(true));
        assert_eq!(binary(Operator::LessThan, Value::Blank, 1.0), Value::Boolean(true));
        assert_eq!(binary(Operator::Equal, 0.1 + 0.2, 0.3), Value::Boolean(true));
        assert_eq!(binary(Operator::NotEqual, 1.0, 2.0), Value::Boolean(true));
        assert_eq!(binary(Operator::GreaterEqual, 2.0, 2.0), Value::Boolean(true));
        assert_eq!(binary(Operator::LessEqual, 3.0, 2.0), Value::Boolean(false));
    }

    #[test]
    fn test_range_operator() {
        let ctx = EvaluationContext::simple();
        assert_eq!(
            apply_binary(Operator::Range, &cell("C3"), &area("A1:B2"), &ctx),
            area("A1:C3")
        );
        let other_sheet = Value::AreaRef(AreaRef::parse(1, "D4").unwrap());
        assert_eq!(
            apply_binary(Operator::Range, &cell("A1"), &other_sheet, &ctx),
            Value::Error(ErrorCode::Value)
        );
        assert_eq!(
            apply_binary(Operator::Range, &cell("A1"), &Value::Number(1.0), &ctx),
            Value::Error(ErrorCode::Value)
        );
    }

    #[test]
    fn test_intersection_operator() {
        let ctx = EvaluationContext::simple();
        assert_eq!(
            apply_binary(Operator::Intersection, &area("A1:C3"), &area("B2:D4"), &ctx),
            area("B2:C3")
        );
        assert_eq!(
            apply_binary(Operator::Intersection, &area("A1:C3"), &area("C3:D4"), &ctx),
            cell("C3")
        );
        assert_eq!(
            apply_binary(Operator::Intersection, &area("A1:B2"), &area("D4:E5"), &ctx),
            Value::Error(ErrorCode::Null)
        );
    }

    #[test]
    fn test_operand_count_mismatch() {
        let ctx = EvaluationContext::simple();
        assert_eq!(
            apply(Operator::Add, &[Value::Number(1.0)], &ctx),
            Value::Error(ErrorCode::Value)
        );
        assert_eq!(
            apply(Operator::Add, &[Value::Number(1.0), Value::Number(2.0)], &ctx),
            Value::Number(3.0)
        );
    }
}
