//! Lookup and reference functions
//!
//! These take their arguments unresolved and mostly return references.

use gridcalc_core::ErrorCode;

use super::number_arg;
use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::value::{AreaRef, Value};

/// Area behind a reference argument, or the error to report
fn area_arg(arg: Option<&Value>) -> Result<Option<AreaRef>, ErrorCode> {
    match arg {
        Some(Value::Error(e)) => Err(*e),
        Some(v) => Ok(v.as_area()),
        None => Ok(None),
    }
}

/// TRANSPOSE(array) - Swaps rows and columns
///
/// Inside an array formula each output cell reads the input element with its
/// row and column swapped; cells past the transposed shape get `#N/A`.
/// Elsewhere the result is the top-left element.
pub fn fn_transpose(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let area = match try_value!(area_arg(args.first())) {
        Some(area) => area,
        None => {
            let value = args.first().cloned().unwrap_or(Value::Blank);
            return Ok(value);
        }
    };
    if area.spans_multiple_sheets() {
        return Ok(Value::Error(ErrorCode::Value));
    }
    let cell = match ctx.array_position() {
        Some(pos) => {
            let rel_row = u32::from(pos.col);
            let Ok(rel_col) = u16::try_from(pos.row) else {
                return Ok(Value::Error(ErrorCode::Na));
            };
            match area.get(rel_row, rel_col) {
                Some(cell) => cell,
                None => return Ok(Value::Error(ErrorCode::Na)),
            }
        }
        None => area.top_left(),
    };
    Ok(Value::CellRef(cell))
}

/// Read a 1-based index argument; 0 selects the whole row or column
fn index_number(args: &[Value], index: usize, ctx: &EvaluationContext) -> Result<u32, ErrorCode> {
    match args.get(index) {
        None | Some(Value::MissingArgument) => Ok(0),
        Some(_) => {
            let n = number_arg(args, index, ctx)?.trunc();
            if n < 0.0 {
                Err(ErrorCode::Value)
            } else {
                Ok(n.min(u32::MAX as f64) as u32)
            }
        }
    }
}

/// INDEX(reference, row_num, [column_num]) - Cell or slice of a reference
///
/// A row or column number of 0 selects the whole column or row. With only one
/// index on a single-row area the index counts columns.
pub fn fn_index(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let row = try_value!(index_number(args, 1, ctx));
    let col = try_value!(index_number(args, 2, ctx));

    let area = match try_value!(area_arg(args.first())) {
        Some(area) => area,
        None => {
            // A scalar behaves as a 1x1 array
            let value = args.first().cloned().unwrap_or(Value::Blank);
            return Ok(if row <= 1 && col <= 1 {
                value
            } else {
                Value::Error(ErrorCode::Ref)
            });
        }
    };
    if area.spans_multiple_sheets() {
        return Ok(Value::Error(ErrorCode::Ref));
    }

    let (row, col) = if args.len() < 3 && area.is_row() && !area.is_column() {
        (1, row)
    } else {
        (row, col)
    };
    if row > area.height() || col > u32::from(area.width()) {
        return Ok(Value::Error(ErrorCode::Ref));
    }

    let sheet = area.sheet();
    let (first_row, last_row) = match row {
        0 => (area.first_row(), area.last_row()),
        n => {
            let r = area.first_row() + (n - 1);
            (r, r)
        }
    };
    let (first_col, last_col) = match col {
        0 => (area.first_col(), area.last_col()),
        n => {
            let c = area.first_col() + (n - 1) as u16;
            (c, c)
        }
    };
    let slice = AreaRef::new(sheet, first_row, first_col, last_row, last_col);
    Ok(if slice.is_single_cell() {
        Value::CellRef(slice.top_left())
    } else {
        Value::AreaRef(slice)
    })
}

/// ROWS(array) - Number of rows in a reference
pub fn fn_rows(args: &[Value], _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(match try_value!(area_arg(args.first())) {
        Some(area) => Value::Number(f64::from(area.height())),
        None => Value::Number(1.0),
    })
}

/// COLUMNS(array) - Number of columns in a reference
pub fn fn_columns(args: &[Value], _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(match try_value!(area_arg(args.first())) {
        Some(area) => Value::Number(f64::from(area.width())),
        None => Value::Number(1.0),
    })
}

/// ROW([reference]) - 1-based row number of a reference or of the calling cell
pub fn fn_row(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    match args.first() {
        None | Some(Value::MissingArgument) => Ok(Value::Number(f64::from(ctx.row) + 1.0)),
        Some(arg) => Ok(match try_value!(area_arg(Some(arg))) {
            Some(area) => Value::Number(f64::from(area.first_row()) + 1.0),
            None => Value::Error(ErrorCode::Value),
        }),
    }
}

/// COLUMN([reference]) - 1-based column number of a reference or of the calling cell
pub fn fn_column(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    match args.first() {
        None | Some(Value::MissingArgument) => Ok(Value::Number(f64::from(ctx.col) + 1.0)),
        Some(arg) => Ok(match try_value!(area_arg(Some(arg))) {
            Some(area) => Value::Number(f64::from(area.first_col()) + 1.0),
            None => Value::Error(ErrorCode::Value),
        }),
    }
}
