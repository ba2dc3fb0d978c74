//! Math functions

use gridcalc_core::ErrorCode;

use super::aggregate::{collect_numbers, CollectOptions};
use super::{number_arg, number_result, operators};
use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::number_text::{round_significant, SIGNIFICANT_DIGITS};
use crate::token::Operator;
use crate::value::Value;

/// SUM(number1, ...) - Adds all numbers
pub fn fn_sum(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let numbers = try_value!(collect_numbers(args, ctx, CollectOptions::default()));
    Ok(number_result(numbers.iter().sum()))
}

/// PRODUCT(number1, ...) - Multiplies all numbers
pub fn fn_product(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let numbers = try_value!(collect_numbers(args, ctx, CollectOptions::default()));
    if numbers.is_empty() {
        return Ok(Value::Number(0.0));
    }
    Ok(number_result(numbers.iter().product()))
}

/// ABS(number) - Absolute value
pub fn fn_abs(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let n = try_value!(number_arg(args, 0, ctx));
    Ok(number_result(n.abs()))
}

/// INT(number) - Rounds down to the nearest integer
pub fn fn_int(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let n = try_value!(number_arg(args, 0, ctx));
    Ok(number_result(n.floor()))
}

/// ROUND(number, num_digits) - Rounds half away from zero
pub fn fn_round(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    round_with(args, ctx, f64::round)
}

/// ROUNDUP(number, num_digits) - Rounds away from zero
pub fn fn_roundup(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    round_with(args, ctx, |x| x.abs().ceil().copysign(x))
}

/// ROUNDDOWN(number, num_digits) - Rounds toward zero
pub fn fn_rounddown(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    round_with(args, ctx, f64::trunc)
}

fn round_with<F>(args: &[Value], ctx: &EvaluationContext, mode: F) -> FormulaResult<Value>
where
    F: Fn(f64) -> f64,
{
    let number = try_value!(number_arg(args, 0, ctx));
    let digits = try_value!(number_arg(args, 1, ctx));
    Ok(number_result(round_to_digits(number, digits, mode)))
}

/// Round to `digits` decimal places (negative digits round left of the point)
///
/// The number is first cut to 15 significant digits so that binary noise such
/// as 2.675 being stored as 2.67499999... does not decide the rounding.
fn round_to_digits<F>(number: f64, digits: f64, mode: F) -> f64
where
    F: Fn(f64) -> f64,
{
    let number = round_significant(number, SIGNIFICANT_DIGITS);
    if number == 0.0 {
        return 0.0;
    }
    let digits = digits.trunc().clamp(-308.0, 308.0) as i32;
    // Already exact at this many decimals
    let magnitude = number.abs().log10().floor() as i32;
    let last_significant_place = SIGNIFICANT_DIGITS as i32 - 1 - magnitude;
    if digits >= last_significant_place {
        return number;
    }
    let factor = 10f64.powi(digits.abs());
    let scaled = if digits >= 0 {
        number * factor
    } else {
        number / factor
    };
    if !scaled.is_finite() {
        return number;
    }
    let rounded = mode(round_significant(scaled, SIGNIFICANT_DIGITS));
    if digits >= 0 {
        rounded / factor
    } else {
        rounded * factor
    }
}

/// MOD(number, divisor) - Remainder with the sign of the divisor
pub fn fn_mod(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let n = try_value!(number_arg(args, 0, ctx));
    let d = try_value!(number_arg(args, 1, ctx));
    if d == 0.0 {
        return Ok(Value::Error(ErrorCode::Div0));
    }
    Ok(number_result(n - d * (n / d).floor()))
}

/// SQRT(number) - Square root
pub fn fn_sqrt(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let n = try_value!(number_arg(args, 0, ctx));
    if n < 0.0 {
        return Ok(Value::Error(ErrorCode::Num));
    }
    Ok(number_result(n.sqrt()))
}

/// POWER(number, power) - Same as the ^ operator
pub fn fn_power(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let base = try_value!(number_arg(args, 0, ctx));
    let exponent = try_value!(number_arg(args, 1, ctx));
    Ok(operators::apply_binary(
        Operator::Power,
        &Value::Number(base),
        &Value::Number(exponent),
        ctx,
    ))
}

/// SIGN(number) - 1, 0 or -1
pub fn fn_sign(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let n = try_value!(number_arg(args, 0, ctx));
    let sign = if n > 0.0 {
        1.0
    } else if n < 0.0 {
        -1.0
    } else {
        0.0
    };
    Ok(Value::Number(sign))
}
