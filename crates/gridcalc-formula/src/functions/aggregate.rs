//! Walking the operands of aggregate functions
//!
//! Aggregates see two kinds of operand: values passed directly as arguments and
//! values read from referenced cells. The two follow different rules (a direct
//! `"3"` is the number 3, a cell holding `"3"` is ignored by SUM), so the walker
//! reports where each value came from.

use gridcalc_core::ErrorCode;

use crate::context::EvaluationContext;
use crate::resolver;
use crate::value::Value;

/// Which referenced cells to skip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectOptions {
    /// Skip cells holding SUBTOTAL formulas
    pub skip_subtotals: bool,
    /// Skip cells in hidden rows
    pub skip_hidden_rows: bool,
}

impl CollectOptions {
    /// Options used by SUBTOTAL for the given function code
    pub fn subtotal(ignore_hidden: bool) -> Self {
        Self {
            skip_subtotals: true,
            skip_hidden_rows: ignore_hidden,
        }
    }
}

/// Where an operand came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Passed directly as an argument
    Direct,
    /// Read from a referenced cell
    Reference,
}

/// Visit every operand of an aggregate, expanding references cell by cell
///
/// The visitor may stop the walk by returning an error.
pub fn for_each_operand<F>(
    args: &[Value],
    ctx: &EvaluationContext,
    opts: CollectOptions,
    mut visit: F,
) -> Result<(), ErrorCode>
where
    F: FnMut(&Value, Origin) -> Result<(), ErrorCode>,
{
    let source = ctx.source();
    for arg in args {
        let Some(area) = arg.as_area() else {
            visit(arg, Origin::Direct)?;
            continue;
        };
        for cell in area.cells() {
            if opts.skip_hidden_rows && source.is_hidden_row(cell.sheet, cell.row) {
                continue;
            }
            if opts.skip_subtotals && source.is_subtotal(cell.sheet, cell.row, cell.col) {
                continue;
            }
            visit(&resolver::fetch(cell, ctx), Origin::Reference)?;
        }
    }
    Ok(())
}

/// Collect the numeric operands of an aggregate such as SUM or AVERAGE
///
/// Direct numbers, booleans and numeric text count and a direct missing
/// argument counts as 0; other direct text is `#VALUE!`. Inside references only
/// numbers count. The first error met is returned.
pub fn collect_numbers(
    args: &[Value],
    ctx: &EvaluationContext,
    opts: CollectOptions,
) -> Result<Vec<f64>, ErrorCode> {
    let mut numbers = Vec::new();
    for_each_operand(args, ctx, opts, |value, origin| {
        match (value, origin) {
            (Value::Error(e), _) => return Err(*e),
            (Value::Number(n), _) => numbers.push(*n),
            (Value::Boolean(b), Origin::Direct) => numbers.push(if *b { 1.0 } else { 0.0 }),
            (Value::MissingArgument, Origin::Direct) => numbers.push(0.0),
            (Value::Text(s), Origin::Direct) => {
                numbers.push(resolver::text_to_number(s, ctx).ok_or(ErrorCode::Value)?)
            }
            _ => {}
        }
        Ok(())
    })?;
    Ok(numbers)
}
