//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    // Calculation types
    CalculationError,
    CalculationStats,
    // Cell types
    CellAddress,
    CellRange,
    CellValue,
    // Settings
    DateOrder,
    DateSystem,
    // Error types
    Error,
    ErrorCode,
    EvaluationAbort,
    // Evaluation
    EvaluationContext,
    FormulaCell,
    Operator,
    Result,
    Token,
    Value,
    ValueLocale,
    // Main types
    Workbook,
    // Extension traits
    WorkbookCalculationExt,
    Worksheet,
};
