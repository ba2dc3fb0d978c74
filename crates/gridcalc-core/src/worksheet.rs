//! Worksheet type - a grid of cell values

use std::collections::BTreeSet;

use ahash::AHashMap;

use crate::cell::{CellAddress, CellValue};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A single worksheet in a workbook snapshot
///
/// Cells are stored sparsely; anything never written reads as [`CellValue::Empty`].
#[derive(Debug, Clone)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell storage keyed by (row, col)
    cells: AHashMap<(u32, u16), CellValue>,
    /// Rows hidden by the user or a filter
    hidden_rows: BTreeSet<u32>,
}

impl Worksheet {
    /// Create a new empty worksheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: AHashMap::new(),
            hidden_rows: BTreeSet::new(),
        }
    }

    /// Get the worksheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    // ==================== Cell Access ====================

    /// Get the raw stored value at an A1-style address
    pub fn cell(&self, address: &str) -> Result<Option<&CellValue>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_at(addr.row, addr.col))
    }

    /// Get the raw stored value at a position
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Get the effective value at an A1-style address
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get the effective value at a position
    ///
    /// Formula cells yield their cached result.
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(&(row, col))
            .map(|v| v.effective_value().clone())
            .unwrap_or(CellValue::Empty)
    }

    /// Set a cell value by A1-style address
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by position
    ///
    /// Writing [`CellValue::Empty`] clears the cell.
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        Self::check_bounds(row, col)?;
        match value.into() {
            CellValue::Empty => {
                self.cells.remove(&(row, col));
            }
            value => {
                self.cells.insert((row, col), value);
            }
        }
        Ok(())
    }

    /// Store a formula together with its cached result
    pub fn set_cell_formula(
        &mut self,
        address: &str,
        formula: &str,
        cached_value: CellValue,
    ) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_formula_at(addr.row, addr.col, formula, cached_value)
    }

    /// Store a formula together with its cached result, by position
    pub fn set_cell_formula_at(
        &mut self,
        row: u32,
        col: u16,
        formula: &str,
        cached_value: CellValue,
    ) -> Result<()> {
        let text = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };
        self.set_cell_value_at(row, col, CellValue::formula(text, cached_value))
    }

    /// Whether the cell holds a formula that calls SUBTOTAL
    ///
    /// SUBTOTAL skips such cells so that nested subtotals are not double counted.
    pub fn is_subtotal_cell(&self, row: u32, col: u16) -> bool {
        self.cells
            .get(&(row, col))
            .and_then(CellValue::formula_text)
            .map(|text| text.to_ascii_uppercase().contains("SUBTOTAL("))
            .unwrap_or(false)
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the worksheet has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // ==================== Rows ====================

    /// Check if a row is hidden
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.hidden_rows.contains(&row)
    }

    /// Hide or show a row
    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        if hidden {
            self.hidden_rows.insert(row);
        } else {
            self.hidden_rows.remove(&row);
        }
    }

    fn check_bounds(row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }
}
