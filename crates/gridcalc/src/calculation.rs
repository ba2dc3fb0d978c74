//! Workbook-level formula calculation
//!
//! Evaluates pre-tokenized formulas against a workbook and stores each result
//! as the formula's cached value. Cells are calculated in the order given; the
//! caller is responsible for ordering dependent formulas and for detecting
//! circular references.
//!
//! # Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", 10.0).unwrap();
//! sheet.set_cell_value("A2", 20.0).unwrap();
//!
//! let tokens = vec![
//!     Token::cell(0, "A1").unwrap(),
//!     Token::cell(0, "A2").unwrap(),
//!     Token::Operator(Operator::Add),
//! ];
//! let result = workbook.calculate_cell(0, "A3", "=A1+A2", &tokens).unwrap();
//! assert_eq!(result, Value::Number(30.0));
//! ```

use gridcalc_core::{CellAddress, CellRange, CellValue, Workbook};
use gridcalc_formula::{
    contains_volatile, evaluate, evaluate_array, EvaluationAbort, EvaluationContext, Token, Value,
};
use thiserror::Error;

/// Errors from workbook calculation
#[derive(Debug, Error)]
pub enum CalculationError {
    /// Bad address, range or sheet index
    #[error(transparent)]
    Workbook(#[from] gridcalc_core::Error),

    /// The token sequence could not be evaluated
    #[error("Formula {formula} could not be evaluated: {source}")]
    Abort {
        formula: String,
        #[source]
        source: EvaluationAbort,
    },
}

/// Result type for calculation
pub type CalculationResult<T> = std::result::Result<T, CalculationError>;

/// A formula to calculate: where it lives, its text and its tokens
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaCell {
    pub sheet: usize,
    pub address: CellAddress,
    /// Formula text stored alongside the result
    pub text: String,
    /// Postfix tokens for the formula
    pub tokens: Vec<Token>,
}

impl FormulaCell {
    /// Create a formula cell from an A1 address
    pub fn new<S: Into<String>>(
        sheet: usize,
        address: &str,
        text: S,
        tokens: Vec<Token>,
    ) -> gridcalc_core::Result<Self> {
        Ok(Self {
            sheet,
            address: CellAddress::parse(address)?,
            text: text.into(),
            tokens,
        })
    }
}

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Number of cells calculated
    pub cells_calculated: usize,
    /// Number of cells whose result is an error value
    pub errors: usize,
    /// Number of cells calling a volatile function
    pub volatile_cells: usize,
}

/// Extension trait for Workbook to add calculation methods
pub trait WorkbookCalculationExt {
    /// Evaluate tokens as if they were the formula of the given cell
    fn evaluate_at(&self, sheet: usize, address: &str, tokens: &[Token])
        -> CalculationResult<Value>;

    /// Evaluate a formula and store it with its result in the cell
    fn calculate_cell(
        &mut self,
        sheet: usize,
        address: &str,
        text: &str,
        tokens: &[Token],
    ) -> CalculationResult<Value>;

    /// Evaluate an array formula over a range and store the results
    fn calculate_array(
        &mut self,
        sheet: usize,
        range: &str,
        text: &str,
        tokens: &[Token],
    ) -> CalculationResult<Vec<Vec<Value>>>;

    /// Calculate a batch of formulas in order
    fn calculate_all(&mut self, formulas: &[FormulaCell]) -> CalculationResult<CalculationStats>;
}

fn check_sheet(workbook: &Workbook, sheet: usize) -> gridcalc_core::Result<()> {
    if sheet < workbook.sheet_count() {
        Ok(())
    } else {
        Err(gridcalc_core::Error::SheetOutOfBounds(
            sheet,
            workbook.sheet_count(),
        ))
    }
}

fn evaluate_cell(
    workbook: &Workbook,
    sheet: usize,
    address: CellAddress,
    text: &str,
    tokens: &[Token],
) -> CalculationResult<Value> {
    check_sheet(workbook, sheet)?;
    let ctx = EvaluationContext::for_workbook(workbook, sheet, address.row, address.col);
    evaluate(tokens, &ctx).map_err(|source| CalculationError::Abort {
        formula: text.to_string(),
        source,
    })
}

fn store(
    workbook: &mut Workbook,
    sheet: usize,
    address: CellAddress,
    text: &str,
    value: &Value,
) -> CalculationResult<()> {
    let sheet_count = workbook.sheet_count();
    let ws = workbook
        .worksheet_mut(sheet)
        .ok_or(gridcalc_core::Error::SheetOutOfBounds(sheet, sheet_count))?;
    ws.set_cell_formula_at(address.row, address.col, text, CellValue::from(value.clone()))?;
    Ok(())
}

impl WorkbookCalculationExt for Workbook {
    fn evaluate_at(
        &self,
        sheet: usize,
        address: &str,
        tokens: &[Token],
    ) -> CalculationResult<Value> {
        let addr = CellAddress::parse(address)?;
        evaluate_cell(self, sheet, addr, address, tokens)
    }

    fn calculate_cell(
        &mut self,
        sheet: usize,
        address: &str,
        text: &str,
        tokens: &[Token],
    ) -> CalculationResult<Value> {
        let addr = CellAddress::parse(address)?;
        let value = evaluate_cell(self, sheet, addr, text, tokens)?;
        store(self, sheet, addr, text, &value)?;
        Ok(value)
    }

    fn calculate_array(
        &mut self,
        sheet: usize,
        range: &str,
        text: &str,
        tokens: &[Token],
    ) -> CalculationResult<Vec<Vec<Value>>> {
        let range = CellRange::parse(range)?;
        check_sheet(self, sheet)?;
        let ctx = EvaluationContext::for_workbook(self, sheet, range.start.row, range.start.col);
        let grid = evaluate_array(tokens, &ctx, range.row_count(), range.col_count()).map_err(
            |source| CalculationError::Abort {
                formula: text.to_string(),
                source,
            },
        )?;

        for addr in range.cells() {
            let r = (addr.row - range.start.row) as usize;
            let c = (addr.col - range.start.col) as usize;
            if let Some(value) = grid.get(r).and_then(|row| row.get(c)) {
                store(self, sheet, addr, text, value)?;
            }
        }
        Ok(grid)
    }

    fn calculate_all(&mut self, formulas: &[FormulaCell]) -> CalculationResult<CalculationStats> {
        let mut stats = CalculationStats::default();
        for formula in formulas {
            let value = evaluate_cell(
                self,
                formula.sheet,
                formula.address,
                &formula.text,
                &formula.tokens,
            )?;
            store(self, formula.sheet, formula.address, &formula.text, &value)?;

            stats.cells_calculated += 1;
            if value.is_error() {
                stats.errors += 1;
            }
            if contains_volatile(&formula.tokens) {
                stats.volatile_cells += 1;
            }
        }
        log::debug!(
            "calculated {} cells ({} errors)",
            stats.cells_calculated,
            stats.errors
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcalc_core::ErrorCode;
    use gridcalc_formula::Operator;

    fn sample() -> Workbook {
        let mut wb = Workbook::new();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_cell_value("A1", 10.0).unwrap();
        ws.set_cell_value("A2", 20.0).unwrap();
        wb
    }

    #[test]
    fn test_calculate_cell_stores_cached_value() {
        let mut wb = sample();
        let tokens = vec![
            Token::area(0, "A1:A2").unwrap(),
            Token::function("SUM", 1),
        ];
        let value = wb.calculate_cell(0, "A3", "=SUM(A1:A2)", &tokens).unwrap();
        assert_eq!(value, Value::Number(30.0));

        let stored = wb.worksheet(0).unwrap().cell("A3").unwrap().unwrap();
        assert_eq!(stored.formula_text(), Some("=SUM(A1:A2)"));
        assert_eq!(stored.effective_value(), &CellValue::Number(30.0));
    }

    #[test]
    fn test_calculate_all_in_order() {
        let mut wb = sample();
        let formulas = vec![
            FormulaCell::new(
                0,
                "B1",
                "=A1*2",
                vec![
                    Token::cell(0, "A1").unwrap(),
                    Token::Number(2.0),
                    Token::Operator(Operator::Multiply),
                ],
            )
            .unwrap(),
            FormulaCell::new(
                0,
                "B2",
                "=B1/0",
                vec![
                    Token::cell(0, "B1").unwrap(),
                    Token::Number(0.0),
                    Token::Operator(Operator::Divide),
                ],
            )
            .unwrap(),
            FormulaCell::new(0, "B3", "=TODAY()", vec![Token::function("TODAY", 0)]).unwrap(),
        ];
        let stats = wb.calculate_all(&formulas).unwrap();
        assert_eq!(
            stats,
            CalculationStats {
                cells_calculated: 3,
                errors: 1,
                volatile_cells: 1,
            }
        );

        let ws = wb.worksheet(0).unwrap();
        assert_eq!(ws.get_value("B1").unwrap().effective_value(), &CellValue::Number(20.0));
        assert_eq!(
            ws.get_value("B2").unwrap().effective_value(),
            &CellValue::Error(ErrorCode::Div0)
        );
    }

    #[test]
    fn test_abort_is_reported_with_formula() {
        let mut wb = sample();
        let err = wb
            .calculate_cell(0, "C1", "=1 2", &[Token::Number(1.0), Token::Number(2.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            CalculationError::Abort {
                source: EvaluationAbort::ResidualStack { remaining: 2 },
                ..
            }
        ));
        assert!(wb.worksheet(0).unwrap().cell("C1").unwrap().is_none());
    }

    #[test]
    fn test_reference_to_another_sheet() {
        let mut wb = sample();
        let data = wb.add_worksheet("Data");
        wb.worksheet_mut(data)
            .unwrap()
            .set_cell_value("B2", 5.0)
            .unwrap();

        let tokens = vec![
            Token::cell(data, "B2").unwrap(),
            Token::cell(0, "A1").unwrap(),
            Token::Operator(Operator::Add),
        ];
        let value = wb.calculate_cell(0, "C1", "=Data!B2+A1", &tokens).unwrap();
        assert_eq!(value, Value::Number(15.0));
        assert_eq!(
            wb.worksheet(0).unwrap().get_value("C1").unwrap(),
            CellValue::Number(15.0)
        );
    }

    #[test]
    fn test_bad_sheet_index() {
        let wb = sample();
        assert!(matches!(
            wb.evaluate_at(3, "A1", &[Token::Number(1.0)]),
            Err(CalculationError::Workbook(
                gridcalc_core::Error::SheetOutOfBounds(3, 1)
            ))
        ));
    }
}
