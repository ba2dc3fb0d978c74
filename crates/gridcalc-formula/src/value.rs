//! Values produced while evaluating a formula

use std::fmt;

use gridcalc_core::{CellAddress, CellRange, CellValue, ErrorCode};

use crate::number_text;

/// A value on the evaluation stack
///
/// References are lazy: they name cells and are only read when an operator or
/// function resolves them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    /// Content of an empty cell
    Blank,
    /// An argument slot left empty, as in `IF(A1,,1)`
    MissingArgument,
    Error(ErrorCode),
    CellRef(CellRef),
    AreaRef(AreaRef),
}

impl Value {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Get the error code if this is one
    pub fn error(&self) -> Option<ErrorCode> {
        match self {
            Value::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Check if this is a cell or area reference
    pub fn is_reference(&self) -> bool {
        matches!(self, Value::CellRef(_) | Value::AreaRef(_))
    }

    /// Get the referenced cells as an area, if this is a reference
    pub fn as_area(&self) -> Option<AreaRef> {
        match self {
            Value::CellRef(cell) => Some(AreaRef::from_cell(*cell)),
            Value::AreaRef(area) => Some(*area),
            _ => None,
        }
    }

    /// Get the type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Blank => "blank",
            Value::MissingArgument => "missing",
            Value::Error(_) => "error",
            Value::CellRef(_) => "cell reference",
            Value::AreaRef(_) => "area reference",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&number_text::to_text(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Value::Blank | Value::MissingArgument => Ok(()),
            Value::Error(e) => write!(f, "{}", e),
            Value::CellRef(cell) => write!(f, "{}", cell),
            Value::AreaRef(area) => write!(f, "{}", area),
        }
    }
}

impl From<CellValue> for Value {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Empty => Value::Blank,
            CellValue::Boolean(b) => Value::Boolean(b),
            CellValue::Number(n) => Value::Number(n),
            CellValue::String(s) => Value::Text(s),
            CellValue::Error(e) => Value::Error(e),
            CellValue::Formula { cached_value, .. } => cached_value
                .map(|v| Value::from(*v))
                .unwrap_or(Value::Blank),
        }
    }
}

impl From<&CellValue> for Value {
    fn from(value: &CellValue) -> Self {
        Value::from(value.effective_value().clone())
    }
}

/// Convert a finished result into a storable cell value
///
/// References have no stored form; a result that is still a reference
/// becomes `#VALUE!`.
impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => CellValue::Number(n),
            Value::Text(s) => CellValue::String(s),
            Value::Boolean(b) => CellValue::Boolean(b),
            Value::Blank | Value::MissingArgument => CellValue::Empty,
            Value::Error(e) => CellValue::Error(e),
            Value::CellRef(_) | Value::AreaRef(_) => CellValue::Error(ErrorCode::Value),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<ErrorCode> for Value {
    fn from(e: ErrorCode) -> Self {
        Value::Error(e)
    }
}

impl From<CellRef> for Value {
    fn from(cell: CellRef) -> Self {
        Value::CellRef(cell)
    }
}

impl From<AreaRef> for Value {
    fn from(area: AreaRef) -> Self {
        Value::AreaRef(area)
    }
}

/// A pointer to one cell (0-based sheet, row and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub sheet: usize,
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    /// Create a new cell reference
    pub fn new(sheet: usize, row: u32, col: u16) -> Self {
        Self { sheet, row, col }
    }

    /// Parse an A1-style address on the given sheet
    pub fn parse(sheet: usize, address: &str) -> gridcalc_core::Result<Self> {
        let addr = CellAddress::parse(address)?;
        Ok(Self::new(sheet, addr.row, addr.col))
    }

    /// Get the cell's address within its sheet
    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.row, self.col)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.sheet, self.address())
    }
}

/// A rectangular block of cells, possibly spanning several sheets
///
/// Corners are normalized on construction and the area cannot be changed
/// afterwards. Cells are only reachable through bounds-checked lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AreaRef {
    first_sheet: usize,
    last_sheet: usize,
    range: CellRange,
}

impl AreaRef {
    /// Create an area on a single sheet
    pub fn new(sheet: usize, first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        Self::new_3d(sheet, sheet, first_row, first_col, last_row, last_col)
    }

    /// Create an area spanning the sheets `first_sheet..=last_sheet`
    pub fn new_3d(
        first_sheet: usize,
        last_sheet: usize,
        first_row: u32,
        first_col: u16,
        last_row: u32,
        last_col: u16,
    ) -> Self {
        Self {
            first_sheet: first_sheet.min(last_sheet),
            last_sheet: first_sheet.max(last_sheet),
            range: CellRange::from_indices(first_row, first_col, last_row, last_col),
        }
    }

    /// Create a 1x1 area holding a single cell
    pub fn from_cell(cell: CellRef) -> Self {
        Self::new(cell.sheet, cell.row, cell.col, cell.row, cell.col)
    }

    /// Parse an A1-style range on the given sheet
    pub fn parse(sheet: usize, range: &str) -> gridcalc_core::Result<Self> {
        let range = CellRange::parse(range)?;
        Ok(Self {
            first_sheet: sheet,
            last_sheet: sheet,
            range,
        })
    }

    /// First sheet index
    pub fn sheet(&self) -> usize {
        self.first_sheet
    }

    /// Last sheet index (equal to [`AreaRef::sheet`] for ordinary areas)
    pub fn last_sheet(&self) -> usize {
        self.last_sheet
    }

    pub fn first_row(&self) -> u32 {
        self.range.start.row
    }

    pub fn last_row(&self) -> u32 {
        self.range.end.row
    }

    pub fn first_col(&self) -> u16 {
        self.range.start.col
    }

    pub fn last_col(&self) -> u16 {
        self.range.end.col
    }

    /// Number of rows
    pub fn height(&self) -> u32 {
        self.range.row_count()
    }

    /// Number of columns
    pub fn width(&self) -> u16 {
        self.range.col_count()
    }

    /// The cell range covered on each sheet
    pub fn range(&self) -> CellRange {
        self.range
    }

    pub fn is_single_cell(&self) -> bool {
        self.height() == 1 && self.width() == 1 && !self.spans_multiple_sheets()
    }

    /// True if the area is a single row
    pub fn is_row(&self) -> bool {
        self.height() == 1
    }

    /// True if the area is a single column
    pub fn is_column(&self) -> bool {
        self.width() == 1
    }

    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.first_row() && row <= self.last_row()
    }

    pub fn contains_col(&self, col: u16) -> bool {
        col >= self.first_col() && col <= self.last_col()
    }

    pub fn spans_multiple_sheets(&self) -> bool {
        self.first_sheet != self.last_sheet
    }

    /// Look up a cell by its offset from the top-left corner
    ///
    /// Returns `None` when the offset falls outside the area.
    pub fn get(&self, rel_row: u32, rel_col: u16) -> Option<CellRef> {
        if rel_row >= self.height() || rel_col >= self.width() {
            return None;
        }
        Some(CellRef::new(
            self.first_sheet,
            self.first_row() + rel_row,
            self.first_col() + rel_col,
        ))
    }

    /// Look up a cell by sheet coordinates, if it lies inside the area
    pub fn get_absolute(&self, row: u32, col: u16) -> Option<CellRef> {
        if self.contains_row(row) && self.contains_col(col) {
            Some(CellRef::new(self.first_sheet, row, col))
        } else {
            None
        }
    }

    /// Top-left cell
    pub fn top_left(&self) -> CellRef {
        CellRef::new(self.first_sheet, self.first_row(), self.first_col())
    }

    /// Iterate over every cell, sheet by sheet and row by row
    pub fn cells(&self) -> impl Iterator<Item = CellRef> {
        let range = self.range;
        (self.first_sheet..=self.last_sheet).flat_map(move |sheet| {
            range
                .cells()
                .map(move |addr| CellRef::new(sheet, addr.row, addr.col))
        })
    }

    /// Smallest area on one sheet enclosing both areas
    pub fn bounding_box(&self, other: &AreaRef) -> AreaRef {
        AreaRef::new_3d(
            self.first_sheet.min(other.first_sheet),
            self.last_sheet.max(other.last_sheet),
            self.first_row().min(other.first_row()),
            self.first_col().min(other.first_col()),
            self.last_row().max(other.last_row()),
            self.last_col().max(other.last_col()),
        )
    }

    /// Cells common to both areas, if any
    pub fn intersect(&self, other: &AreaRef) -> Option<AreaRef> {
        if self.first_sheet != other.first_sheet || self.last_sheet != other.last_sheet {
            return None;
        }
        self.range.intersect(&other.range).map(|range| AreaRef {
            first_sheet: self.first_sheet,
            last_sheet: self.last_sheet,
            range,
        })
    }
}

impl fmt::Display for AreaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.spans_multiple_sheets() {
            write!(f, "[{}:{}]{}", self.first_sheet, self.last_sheet, self.range)
        } else {
            write!(f, "[{}]{}", self.first_sheet, self.range)
        }
    }
}
