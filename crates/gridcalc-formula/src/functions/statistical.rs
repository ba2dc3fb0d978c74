//! Statistical functions

use gridcalc_core::ErrorCode;

use super::aggregate::{collect_numbers, for_each_operand, CollectOptions};
use super::number_result;
use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::resolver;
use crate::value::Value;

/// COUNT(value1, ...) - Counts numbers and empty argument slots
pub fn fn_count(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(count_matching(args, ctx, CollectOptions::default(), is_countable))
}

/// COUNTA(value1, ...) - Counts non-blank values
pub fn fn_counta(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(count_matching(args, ctx, CollectOptions::default(), is_non_blank))
}

/// COUNTBLANK(range) - Counts blank cells and cells holding empty text
pub fn fn_countblank(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let area = match args.first() {
        Some(Value::Error(e)) => return Ok(Value::Error(*e)),
        Some(arg) => match arg.as_area() {
            Some(area) => area,
            None => return Ok(Value::Error(ErrorCode::Value)),
        },
        None => return Ok(Value::Error(ErrorCode::Value)),
    };
    let count = area
        .cells()
        .filter(|cell| match resolver::fetch(*cell, ctx) {
            Value::Blank => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        })
        .count();
    Ok(Value::Number(count as f64))
}

fn is_countable(value: &Value) -> bool {
    matches!(value, Value::Number(_) | Value::MissingArgument)
}

fn is_non_blank(value: &Value) -> bool {
    !matches!(value, Value::Blank)
}

fn count_matching<F>(
    args: &[Value],
    ctx: &EvaluationContext,
    opts: CollectOptions,
    pred: F,
) -> Value
where
    F: Fn(&Value) -> bool,
{
    let mut count = 0usize;
    let walked = for_each_operand(args, ctx, opts, |value, _| {
        if pred(value) {
            count += 1;
        }
        Ok(())
    });
    match walked {
        Ok(()) => Value::Number(count as f64),
        Err(e) => Value::Error(e),
    }
}

/// AVERAGE(number1, ...) - Arithmetic mean
pub fn fn_average(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(aggregate(args, ctx, CollectOptions::default(), average))
}

/// MIN(number1, ...) - Smallest number, 0 if there are none
pub fn fn_min(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(aggregate(args, ctx, CollectOptions::default(), min))
}

/// MAX(number1, ...) - Largest number, 0 if there are none
pub fn fn_max(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(aggregate(args, ctx, CollectOptions::default(), max))
}

/// STDEV(number1, ...) - Sample standard deviation
pub fn fn_stdev(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(aggregate(args, ctx, CollectOptions::default(), stdev))
}

/// STDEVP(number1, ...) - Population standard deviation
pub fn fn_stdevp(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(aggregate(args, ctx, CollectOptions::default(), stdevp))
}

/// VAR(number1, ...) - Sample variance
pub fn fn_var(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(aggregate(args, ctx, CollectOptions::default(), var))
}

/// VARP(number1, ...) - Population variance
pub fn fn_varp(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(aggregate(args, ctx, CollectOptions::default(), varp))
}

type Reducer = fn(&[f64]) -> Result<f64, ErrorCode>;

fn aggregate(
    args: &[Value],
    ctx: &EvaluationContext,
    opts: CollectOptions,
    reduce: Reducer,
) -> Value {
    match collect_numbers(args, ctx, opts).and_then(|numbers| reduce(&numbers)) {
        Ok(n) => number_result(n),
        Err(e) => Value::Error(e),
    }
}

fn sum(numbers: &[f64]) -> Result<f64, ErrorCode> {
    Ok(numbers.iter().sum())
}

fn product(numbers: &[f64]) -> Result<f64, ErrorCode> {
    if numbers.is_empty() {
        return Ok(0.0);
    }
    Ok(numbers.iter().product())
}

fn average(numbers: &[f64]) -> Result<f64, ErrorCode> {
    if numbers.is_empty() {
        return Err(ErrorCode::Div0);
    }
    Ok(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

fn min(numbers: &[f64]) -> Result<f64, ErrorCode> {
    Ok(numbers.iter().copied().reduce(f64::min).unwrap_or(0.0))
}

fn max(numbers: &[f64]) -> Result<f64, ErrorCode> {
    Ok(numbers.iter().copied().reduce(f64::max).unwrap_or(0.0))
}

/// Sum of squared deviations from the mean
fn squared_deviations(numbers: &[f64]) -> f64 {
    let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
    numbers.iter().map(|n| (n - mean) * (n - mean)).sum()
}

fn var(numbers: &[f64]) -> Result<f64, ErrorCode> {
    if numbers.len() < 2 {
        return Err(ErrorCode::Div0);
    }
    Ok(squared_deviations(numbers) / (numbers.len() - 1) as f64)
}

fn varp(numbers: &[f64]) -> Result<f64, ErrorCode> {
    if numbers.is_empty() {
        return Err(ErrorCode::Div0);
    }
    Ok(squared_deviations(numbers) / numbers.len() as f64)
}

fn stdev(numbers: &[f64]) -> Result<f64, ErrorCode> {
    var(numbers).map(f64::sqrt)
}

fn stdevp(numbers: &[f64]) -> Result<f64, ErrorCode> {
    varp(numbers).map(f64::sqrt)
}

/// SUBTOTAL(function_num, ref1, ...) - Aggregate that skips other subtotals
///
/// Codes 1-11 select AVERAGE, COUNT, COUNTA, MAX, MIN, PRODUCT, STDEV, STDEVP,
/// SUM, VAR and VARP. Codes 101-111 do the same but also skip hidden rows.
pub fn fn_subtotal(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let Some((code, refs)) = args.split_first() else {
        return Ok(Value::Error(ErrorCode::Value));
    };
    let code = try_value!(resolver::coerce_to_number(code, ctx)).trunc() as i64;
    let (function, ignore_hidden) = match code {
        1..=11 => (code, false),
        101..=111 => (code - 100, true),
        _ => return Ok(Value::Error(ErrorCode::Value)),
    };
    let opts = CollectOptions::subtotal(ignore_hidden);

    let result = match function {
        2 => count_matching(refs, ctx, opts, is_countable),
        3 => count_matching(refs, ctx, opts, is_non_blank),
        _ => {
            let reduce: Reducer = match function {
                1 => average,
                4 => max,
                5 => min,
                6 => product,
                7 => stdev,
                8 => stdevp,
                9 => sum,
                10 => var,
                _ => varp,
            };
            aggregate(refs, ctx, opts, reduce)
        }
    };
    Ok(result)
}

/// SLOPE(known_y's, known_x's) - Slope of the least squares regression line
pub fn fn_slope(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(match regression(args, ctx) {
        Ok((slope, _)) => number_result(slope),
        Err(e) => Value::Error(e),
    })
}

/// INTERCEPT(known_y's, known_x's) - Y intercept of the least squares regression line
pub fn fn_intercept(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(match regression(args, ctx) {
        Ok((_, intercept)) => number_result(intercept),
        Err(e) => Value::Error(e),
    })
}

/// Values of an argument in order: every cell of a reference, or the value itself
fn array_items(arg: &Value, ctx: &EvaluationContext) -> Vec<Value> {
    match arg.as_area() {
        Some(area) => area.cells().map(|cell| resolver::fetch(cell, ctx)).collect(),
        None => vec![arg.clone()],
    }
}

/// Least squares fit returning (slope, intercept)
///
/// Only positions where both arrays hold numbers take part. Errors in the first
/// array are reported before errors in the second.
fn regression(args: &[Value], ctx: &EvaluationContext) -> Result<(f64, f64), ErrorCode> {
    let [ys, xs] = args else {
        return Err(ErrorCode::Value);
    };
    let ys = array_items(ys, ctx);
    let xs = array_items(xs, ctx);
    if ys.is_empty() || ys.len() != xs.len() {
        return Err(ErrorCode::Na);
    }

    let mut first_y_error = None;
    let mut first_x_error = None;
    let mut pairs = Vec::with_capacity(ys.len());
    for (y, x) in ys.iter().zip(&xs) {
        match (y, x) {
            (Value::Error(e), _) => {
                first_y_error.get_or_insert(*e);
            }
            (_, Value::Error(e)) => {
                first_x_error.get_or_insert(*e);
            }
            (Value::Number(y), Value::Number(x)) => pairs.push((*x, *y)),
            _ => {}
        }
    }
    if let Some(e) = first_y_error.or(first_x_error) {
        return Err(e);
    }
    if pairs.is_empty() {
        return Err(ErrorCode::Div0);
    }

    let n = pairs.len() as f64;
    let x_mean = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let y_mean = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut xx = 0.0;
    let mut xy = 0.0;
    for (x, y) in &pairs {
        xx += (x - x_mean) * (x - x_mean);
        xy += (x - x_mean) * (y - y_mean);
    }
    if xx == 0.0 {
        return Err(ErrorCode::Div0);
    }
    let slope = xy / xx;
    let intercept = y_mean - slope * x_mean;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(ErrorCode::Num);
    }
    Ok((slope, intercept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{area, cell, workbook};
    use gridcalc_core::{CellValue, Workbook};

    fn nums(values: &[f64]) -> Vec<Value> {
        values.iter().map(|n| Value::Number(*n)).collect()
    }

    fn eval(f: crate::functions::FunctionImpl, args: &[Value]) -> Value {
        f(args, &EvaluationContext::simple()).unwrap()
    }

    #[test]
    fn test_count_counts_numbers_and_missing_only() {
        let args = [
            Value::Number(1.0),
            Value::text("2"),
            Value::Boolean(true),
            Value::MissingArgument,
            Value::Error(ErrorCode::Na),
        ];
        assert_eq!(eval(fn_count, &args), Value::Number(2.0));
    }

    #[test]
    fn test_counta_and_countblank() {
        let wb = workbook(&[
            ("A1", CellValue::Number(1.0)),
            ("A2", CellValue::string("")),
            ("A4", CellValue::Error(ErrorCode::Div0)),
        ]);
        let ctx = EvaluationContext::for_workbook(&wb, 0, 9, 9);
        assert_eq!(fn_counta(&[area("A1:A4")], &ctx).unwrap(), Value::Number(3.0));
        assert_eq!(fn_countblank(&[area("A1:A4")], &ctx).unwrap(), Value::Number(2.0));
        assert_eq!(
            fn_countblank(&[Value::Number(1.0)], &ctx).unwrap(),
            Value::Error(ErrorCode::Value)
        );
    }

    #[test]
    fn test_average_min_max() {
        assert_eq!(eval(fn_average, &nums(&[2.0, 4.0, 6.0])), Value::Number(4.0));
        assert_eq!(eval(fn_average, &[Value::Blank]), Value::Error(ErrorCode::Div0));
        assert_eq!(eval(fn_min, &nums(&[5.0, 2.0, 8.0, 1.0])), Value::Number(1.0));
        assert_eq!(eval(fn_max, &nums(&[5.0, 2.0, 8.0, 1.0])), Value::Number(8.0));
        assert_eq!(eval(fn_max, &[Value::Blank]), Value::Number(0.0));
    }

    #[test]
    fn test_variance_family() {
        let data = nums(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(eval(fn_var, &data), Value::Number(55.0 / 6.0));
        assert_eq!(eval(fn_varp, &data), Value::Number(8.25));
        match eval(fn_stdev, &data) {
            Value::Number(n) => assert!((n - 3.0276503540974917).abs() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(eval(fn_var, &nums(&[1.0])), Value::Error(ErrorCode::Div0));
        assert_eq!(eval(fn_stdevp, &nums(&[1.0])), Value::Number(0.0));
    }

    /// B2=1, B3=3, B4=SUBTOTAL(..,B2:B3), B5=1, B6=7
    fn subtotal_sheet() -> Workbook {
        workbook(&[
            ("B2", CellValue::Number(1.0)),
            ("B3", CellValue::Number(3.0)),
            ("B4", CellValue::formula("=SUBTOTAL(9,B2:B3)", CellValue::Number(4.0))),
            ("B5", CellValue::Number(1.0)),
            ("B6", CellValue::Number(7.0)),
        ])
    }

    fn subtotal(wb: &Workbook, code: f64, refs: &[Value]) -> Value {
        let ctx = EvaluationContext::for_workbook(wb, 0, 7, 1);
        let mut args = vec![Value::Number(code)];
        args.extend_from_slice(refs);
        fn_subtotal(&args, &ctx).unwrap()
    }

    #[test]
    fn test_subtotal_skips_nested_subtotals() {
        let wb = subtotal_sheet();
        assert_eq!(subtotal(&wb, 9.0, &[area("B2:B6")]), Value::Number(12.0));
        assert_eq!(subtotal(&wb, 1.0, &[area("B2:B6")]), Value::Number(3.0));
        assert_eq!(subtotal(&wb, 2.0, &[area("B2:B6")]), Value::Number(4.0));
        assert_eq!(subtotal(&wb, 4.0, &[area("B2:B6")]), Value::Number(7.0));
        assert_eq!(subtotal(&wb, 10.0, &[area("B2:B6")]), Value::Number(8.0));
        assert_eq!(subtotal(&wb, 11.0, &[area("B2:B6")]), Value::Number(6.0));
        let cells: Vec<Value> = ["B2", "B3", "B4", "B5", "B6"].iter().map(|a| cell(a)).collect();
        assert_eq!(subtotal(&wb, 9.0, &cells), Value::Number(12.0));
    }

    #[test]
    fn test_subtotal_hidden_rows() {
        let mut wb = subtotal_sheet();
        wb.worksheet_mut(0).unwrap().set_row_hidden(5, true);
        assert_eq!(subtotal(&wb, 9.0, &[area("B2:B6")]), Value::Number(12.0));
        assert_eq!(subtotal(&wb, 109.0, &[area("B2:B6")]), Value::Number(5.0));
        assert_eq!(subtotal(&wb, 103.0, &[area("B2:B6")]), Value::Number(3.0));
    }

    #[test]
    fn test_subtotal_invalid_code() {
        let wb = subtotal_sheet();
        assert_eq!(subtotal(&wb, 0.0, &[area("B2:B3")]), Value::Error(ErrorCode::Value));
        assert_eq!(subtotal(&wb, 12.0, &[area("B2:B3")]), Value::Error(ErrorCode::Value));
        assert_eq!(
            fn_subtotal(&[], &EvaluationContext::simple()).unwrap(),
            Value::Error(ErrorCode::Value)
        );
    }

    fn regression_sheet() -> Workbook {
        // known_y's in A1:A7, known_x's in B1:B7
        let ys = [2.0, 3.0, 9.0, 1.0, 8.0, 7.0, 5.0];
        let xs = [6.0, 5.0, 11.0, 7.0, 5.0, 4.0, 4.0];
        let mut wb = Workbook::new();
        let ws = wb.worksheet_mut(0).unwrap();
        for (i, (y, x)) in ys.iter().zip(&xs).enumerate() {
            ws.set_cell_value_at(i as u32, 0, *y).unwrap();
            ws.set_cell_value_at(i as u32, 1, *x).unwrap();
        }
        wb
    }

    #[test]
    fn test_slope_and_intercept() {
        let wb = regression_sheet();
        let ctx = EvaluationContext::for_workbook(&wb, 0, 10, 10);
        let args = [area("A1:A7"), area("B1:B7")];
        match fn_slope(&args, &ctx).unwrap() {
            Value::Number(n) => assert!((n - 0.305555556).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
        match fn_intercept(&args, &ctx).unwrap() {
            Value::Number(n) => assert!((n - 3.166666667).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_slope_errors() {
        let mut wb = regression_sheet();
        let ctx_args = [area("A1:A7"), area("B1:B6")];
        {
            let ctx = EvaluationContext::for_workbook(&wb, 0, 10, 10);
            assert_eq!(fn_slope(&ctx_args, &ctx).unwrap(), Value::Error(ErrorCode::Na));
        }

        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_cell_value("A5", ErrorCode::Ref).unwrap();
        ws.set_cell_value("B2", ErrorCode::Num).unwrap();
        let ctx = EvaluationContext::for_workbook(&wb, 0, 10, 10);
        assert_eq!(
            fn_slope(&[area("A1:A7"), area("B1:B7")], &ctx).unwrap(),
            Value::Error(ErrorCode::Ref)
        );
        assert_eq!(
            fn_slope(&[area("B1:B7"), area("A1:A7")], &ctx).unwrap(),
            Value::Error(ErrorCode::Num)
        );
    }

    #[test]
    fn test_slope_skips_non_numeric_pairs() {
        let wb = workbook(&[
            ("A1", CellValue::Number(1.0)),
            ("A2", CellValue::string("x")),
            ("A3", CellValue::Number(3.0)),
            ("A4", CellValue::Number(5.0)),
            ("B1", CellValue::Number(1.0)),
            ("B2", CellValue::Number(2.0)),
            ("B3", CellValue::Number(3.0)),
        ]);
        let ctx = EvaluationContext::for_workbook(&wb, 0, 10, 10);
        assert_eq!(
            fn_slope(&[area("A1:A4"), area("B1:B4")], &ctx).unwrap(),
            Value::Number(1.0)
        );
        assert_eq!(
            fn_slope(&[area("A2"), area("B4")], &ctx).unwrap(),
            Value::Error(ErrorCode::Div0)
        );
    }
}
