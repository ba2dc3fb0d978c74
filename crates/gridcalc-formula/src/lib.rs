//! # gridcalc-formula
//!
//! Formula evaluation engine for gridcalc.
//!
//! This crate provides:
//! - A postfix evaluator over pre-tokenized formulas (tokens → value)
//! - Array formula evaluation over an output range
//! - Operand resolution and Excel-compatible type coercion
//! - Serial date arithmetic for the 1900 and 1904 date systems
//! - Built-in operators and functions
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellValue, Workbook};
//! use gridcalc_formula::{evaluate, EvaluationContext, Operator, Token, Value};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", 10.0).unwrap();
//! sheet.set_cell_value("A2", 32.0).unwrap();
//!
//! // =SUM(A1:A2)/2, evaluated from B1
//! let tokens = vec![
//!     Token::area(0, "A1:A2").unwrap(),
//!     Token::function("SUM", 1),
//!     Token::Number(2.0),
//!     Token::Operator(Operator::Divide),
//! ];
//! let ctx = EvaluationContext::for_workbook(&workbook, 0, 0, 1);
//! assert_eq!(evaluate(&tokens, &ctx).unwrap(), Value::Number(21.0));
//! ```

pub mod array;
pub mod context;
pub mod datetime;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod number_text;
pub mod resolver;
pub mod source;
pub mod token;
pub mod value;

#[cfg(test)]
mod test_util;

pub use array::evaluate_array;
pub use context::{ArrayPosition, EvaluationContext};
pub use error::{EvaluationAbort, FormulaResult};
pub use evaluator::{contains_volatile, evaluate, evaluate_to_value};
pub use functions::{registry, ArgShape, FunctionDef, FunctionRegistry};
pub use source::{CellValueSource, EmptyCellSource};
pub use token::{Operator, Token};
pub use value::{AreaRef, CellRef, Value};
