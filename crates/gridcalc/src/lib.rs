//! # gridcalc
//!
//! Spreadsheet formula evaluation with Excel semantics.
//!
//! gridcalc evaluates formulas that have already been tokenized into postfix
//! order, reading cell values from a workbook snapshot or any other
//! [`CellValueSource`].
//!
//! ## Features
//!
//! - Stack-based evaluation of operators and built-in functions
//! - Implicit intersection and Excel coercion rules for numbers, text and booleans
//! - Array formulas over an output range
//! - 1900 and 1904 date systems, locale-aware date text
//! - Formula errors as values (`#VALUE!`, `#N/A`, ...) kept apart from malformed input
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", "Hello").unwrap();
//! sheet.set_cell_value("B1", 42.0).unwrap();
//!
//! // =A1&" "&B1*2
//! let tokens = vec![
//!     Token::cell(0, "A1").unwrap(),
//!     Token::text(" "),
//!     Token::Operator(Operator::Concat),
//!     Token::cell(0, "B1").unwrap(),
//!     Token::Number(2.0),
//!     Token::Operator(Operator::Multiply),
//!     Token::Operator(Operator::Concat),
//! ];
//! let value = workbook.evaluate_at(0, "C1", &tokens).unwrap();
//! assert_eq!(value, Value::text("Hello 84"));
//! ```

pub mod calculation;
pub mod prelude;

pub use calculation::{
    CalculationError, CalculationResult, CalculationStats, FormulaCell, WorkbookCalculationExt,
};

// Re-export core types
pub use gridcalc_core::{
    CellAddress, CellRange, CellValue, DateOrder, DateSystem, Error, ErrorCode, Result,
    ValueLocale, Workbook, Worksheet,
};

// Re-export formula types
pub use gridcalc_formula::{
    contains_volatile, evaluate, evaluate_array, evaluate_to_value, registry, AreaRef, CellRef,
    CellValueSource, EmptyCellSource, EvaluationAbort, EvaluationContext, FormulaResult,
    FunctionDef, FunctionRegistry, Operator, Token, Value,
};
