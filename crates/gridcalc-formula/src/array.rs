//! Array formula evaluation
//!
//! An array formula is evaluated once per cell of its output range. Each pass
//! runs with the output position set on the context, which makes area operands
//! index by position (broadcasting single rows and columns) and lets
//! position-aware functions such as TRANSPOSE pick their element.

use crate::context::EvaluationContext;
use crate::error::{EvaluationAbort, FormulaResult};
use crate::evaluator::evaluate;
use crate::token::Token;
use crate::value::Value;

/// Evaluate an array formula into a `rows` x `cols` grid, row-major
///
/// `ctx` describes the top-left cell of the output range. Cells beyond the
/// natural shape of the result hold `#N/A`.
pub fn evaluate_array(
    tokens: &[Token],
    ctx: &EvaluationContext,
    rows: u32,
    cols: u16,
) -> FormulaResult<Vec<Vec<Value>>> {
    if rows == 0 || cols == 0 {
        return Err(EvaluationAbort::InvalidOutputRange { rows, cols });
    }
    log::trace!("array formula over {}x{} at row {} col {}", rows, cols, ctx.row, ctx.col);

    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| evaluate(tokens, &ctx.at_array_position(r, c)))
                .collect()
        })
        .collect()
}
