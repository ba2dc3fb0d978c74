//! Structural evaluation failures
//!
//! Formula-level errors (`#VALUE!`, `#N/A`, ...) are ordinary values and never
//! appear here. An [`EvaluationAbort`] means the token stream itself could not
//! be evaluated, which points at a tokenizer/evaluator mismatch.

use thiserror::Error;

/// Result type for evaluation steps
pub type FormulaResult<T> = std::result::Result<T, EvaluationAbort>;

/// Fatal failures that stop evaluation of a token sequence
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationAbort {
    /// The token sequence was empty
    #[error("Empty token sequence")]
    EmptyFormula,

    /// An operator or function needed more operands than the stack held
    #[error("Stack underflow at token {position}: {operation} needs {needed} operands, {available} available")]
    StackUnderflow {
        position: usize,
        operation: String,
        needed: usize,
        available: usize,
    },

    /// Evaluation finished with more than one value on the stack
    #[error("Token sequence left {remaining} values on the stack")]
    ResidualStack { remaining: usize },

    /// A function token named a function the registry does not know
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// An array formula was bound to an output range with no cells
    #[error("Invalid array output range: {rows}x{cols}")]
    InvalidOutputRange { rows: u32, cols: u16 },
}
