//! Read access to cell contents during evaluation

use gridcalc_core::{ErrorCode, Workbook};

use crate::value::Value;

/// Read-only view of the cells a formula may reference
///
/// Implementations must return scalar values (never references). A source backed
/// by a lazily recalculated cell graph is responsible for detecting circular
/// references itself and returning `#NUM!` for a cell already being evaluated.
pub trait CellValueSource {
    /// Get the current value of a cell
    fn get_value(&self, sheet: usize, row: u32, col: u16) -> Value;

    /// Whether the cell holds a SUBTOTAL formula (SUBTOTAL skips these)
    fn is_subtotal(&self, _sheet: usize, _row: u32, _col: u16) -> bool {
        false
    }

    /// Whether the row is hidden
    fn is_hidden_row(&self, _sheet: usize, _row: u32) -> bool {
        false
    }
}

/// A source with no cells: every lookup is blank
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCellSource;

impl CellValueSource for EmptyCellSource {
    fn get_value(&self, _sheet: usize, _row: u32, _col: u16) -> Value {
        Value::Blank
    }
}

impl CellValueSource for Workbook {
    fn get_value(&self, sheet: usize, row: u32, col: u16) -> Value {
        match self.worksheet(sheet) {
            Some(ws) => ws.get_value_at(row, col).into(),
            None => Value::Error(ErrorCode::Ref),
        }
    }

    fn is_subtotal(&self, sheet: usize, row: u32, col: u16) -> bool {
        self.worksheet(sheet)
            .map(|ws| ws.is_subtotal_cell(row, col))
            .unwrap_or(false)
    }

    fn is_hidden_row(&self, sheet: usize, row: u32) -> bool {
        self.worksheet(sheet)
            .map(|ws| ws.is_row_hidden(row))
            .unwrap_or(false)
    }
}
