//! # gridcalc-core
//!
//! Core data structures shared by the gridcalc formula engine.
//!
//! This crate provides:
//! - [`ErrorCode`] - The fixed set of spreadsheet error values (`#VALUE!`, `#N/A`, ...)
//! - [`CellValue`] - What a cell stores (numbers, text, booleans, errors, formulas)
//! - [`CellAddress`] and [`CellRange`] - A1-style cell addressing
//! - [`Workbook`], [`Worksheet`] - A read-mostly snapshot of cell contents
//! - [`ValueLocale`] - Date order, date system and time zone used for coercion
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", 42.0).unwrap();
//! sheet.set_cell_value_at(1, 0, "text").unwrap();
//!
//! assert_eq!(sheet.get_value_at(0, 0), CellValue::Number(42.0));
//! ```

pub mod cell;
pub mod error;
pub mod settings;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellRange, CellValue, ErrorCode};
pub use error::{Error, Result};
pub use settings::{DateOrder, DateSystem, ValueLocale};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
