//! Helpers shared by unit tests

use gridcalc_core::{CellValue, Workbook};

use crate::token::Token;
use crate::value::{AreaRef, CellRef, Value};

/// Build a one-sheet workbook from (address, value) pairs
pub(crate) fn workbook(cells: &[(&str, CellValue)]) -> Workbook {
    let mut wb = Workbook::new();
    let ws = wb.worksheet_mut(0).unwrap();
    for (address, value) in cells {
        ws.set_cell_value(address, value.clone()).unwrap();
    }
    wb
}

/// Area reference on sheet 0
pub(crate) fn area(range: &str) -> Value {
    Value::AreaRef(AreaRef::parse(0, range).unwrap())
}

/// Cell reference on sheet 0
pub(crate) fn cell(address: &str) -> Value {
    Value::CellRef(CellRef::parse(0, address).unwrap())
}

/// Cell reference token on sheet 0
pub(crate) fn cell_token(address: &str) -> Token {
    Token::cell(0, address).unwrap()
}

/// Area reference token on sheet 0
pub(crate) fn area_token(range: &str) -> Token {
    Token::area(0, range).unwrap()
}
