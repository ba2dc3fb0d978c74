//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`ErrorCode`] - The spreadsheet error values
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")

mod address;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use value::{CellValue, ErrorCode};
