//! Operand resolution and coercion
//!
//! Operators and most functions want scalars. This module turns references into
//! the scalar they denote (applying implicit intersection for areas) and
//! converts scalars between number, boolean and text following Excel's rules.
//! Errors are never converted: every coercion of an error yields that error.

use chrono::Datelike;
use gridcalc_core::ErrorCode;
use lazy_regex::regex_is_match;

use crate::context::EvaluationContext;
use crate::datetime;
use crate::number_text;
use crate::value::{AreaRef, CellRef, Value};

/// Read a referenced cell, making sure a scalar comes back
pub fn fetch(cell: CellRef, ctx: &EvaluationContext) -> Value {
    match ctx.get_value(cell.sheet, cell.row, cell.col) {
        v @ (Value::CellRef(_) | Value::AreaRef(_)) => {
            log::debug!("cell source returned {} for {}", v.type_name(), cell);
            Value::Error(ErrorCode::Value)
        }
        Value::MissingArgument => Value::Blank,
        v => v,
    }
}

/// Collapse a value to a single scalar
///
/// Cell references are read. A 1x1 area is read directly. Larger areas are
/// intersected with the calling cell: a column area picks the calling row, a
/// row area picks the calling column, and a block must contain both. When no
/// single cell is selected the result is `#VALUE!`.
///
/// Inside an array formula the area is instead indexed by the position in the
/// output range, with single-row and single-column areas broadcast; positions
/// past the end of the area give `#N/A`.
pub fn resolve_single(value: &Value, ctx: &EvaluationContext) -> Value {
    match value {
        Value::CellRef(cell) => fetch(*cell, ctx),
        Value::AreaRef(area) => match choose_single_element(area, ctx) {
            Ok(cell) => fetch(cell, ctx),
            Err(e) => Value::Error(e),
        },
        other => other.clone(),
    }
}

fn choose_single_element(area: &AreaRef, ctx: &EvaluationContext) -> Result<CellRef, ErrorCode> {
    if area.spans_multiple_sheets() {
        return Err(ErrorCode::Value);
    }
    if area.is_single_cell() {
        return Ok(area.top_left());
    }

    if let Some(pos) = ctx.array_position() {
        let rel_row = if area.is_row() { 0 } else { pos.row };
        let rel_col = if area.is_column() { 0 } else { pos.col };
        return area.get(rel_row, rel_col).ok_or(ErrorCode::Na);
    }

    if area.is_column() {
        return area
            .get_absolute(ctx.row, area.first_col())
            .ok_or(ErrorCode::Value);
    }
    if area.is_row() {
        return area
            .get_absolute(area.first_row(), ctx.col)
            .ok_or(ErrorCode::Value);
    }
    area.get_absolute(ctx.row, ctx.col).ok_or(ErrorCode::Value)
}

/// Parse text using the spreadsheet numeric literal grammar
///
/// Accepts surrounding spaces, a sign, a decimal point and an exponent. Thousands
/// separators, "NaN", "Infinity" and a bare sign are rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim_matches(' ');
    if !regex_is_match!(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$", trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Convert text to a number: a numeric literal, or a date/time literal as a serial number
pub fn text_to_number(text: &str, ctx: &EvaluationContext) -> Option<f64> {
    parse_number(text)
        .or_else(|| datetime::parse_date_time(text, &ctx.locale, ctx.today().year()))
}

/// Coerce a value to a number
///
/// References are resolved first. Blank and missing are 0, booleans are 1 or 0,
/// text goes through [`text_to_number`]. Anything else is `#VALUE!`.
pub fn coerce_to_number(value: &Value, ctx: &EvaluationContext) -> Result<f64, ErrorCode> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Blank | Value::MissingArgument => Ok(0.0),
        Value::Text(s) => text_to_number(s, ctx).ok_or(ErrorCode::Value),
        Value::Error(e) => Err(*e),
        Value::CellRef(_) | Value::AreaRef(_) => coerce_to_number(&resolve_single(value, ctx), ctx),
    }
}

/// Coerce a value to a boolean, reading blank as `false`
pub fn coerce_to_boolean(value: &Value, ctx: &EvaluationContext) -> Result<bool, ErrorCode> {
    coerce_to_optional_boolean(value, ctx, false).map(|b| b.unwrap_or(false))
}

/// Coerce a value to a boolean, with `None` for values that carry no truth value
///
/// Blank and missing give `None`. Text gives `None` when `text_is_blank` is set;
/// otherwise "TRUE"/"FALSE" (any case) are accepted and other text is `#VALUE!`.
pub fn coerce_to_optional_boolean(
    value: &Value,
    ctx: &EvaluationContext,
    text_is_blank: bool,
) -> Result<Option<bool>, ErrorCode> {
    match value {
        Value::Boolean(b) => Ok(Some(*b)),
        Value::Number(n) if n.is_nan() => Err(ErrorCode::Value),
        Value::Number(n) => Ok(Some(*n != 0.0)),
        Value::Blank | Value::MissingArgument => Ok(None),
        Value::Text(_) if text_is_blank => Ok(None),
        Value::Text(s) if s.eq_ignore_ascii_case("TRUE") => Ok(Some(true)),
        Value::Text(s) if s.eq_ignore_ascii_case("FALSE") => Ok(Some(false)),
        Value::Text(_) => Err(ErrorCode::Value),
        Value::Error(e) => Err(*e),
        Value::CellRef(_) | Value::AreaRef(_) => {
            coerce_to_optional_boolean(&resolve_single(value, ctx), ctx, text_is_blank)
        }
    }
}

/// Coerce a value to text
///
/// Numbers render as in the General format, booleans as "TRUE"/"FALSE", blank
/// and missing as the empty string.
pub fn coerce_to_text(value: &Value, ctx: &EvaluationContext) -> Result<String, ErrorCode> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        Value::Number(n) => Ok(number_text::to_text(*n)),
        Value::Boolean(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Value::Blank | Value::MissingArgument => Ok(String::new()),
        Value::Error(e) => Err(*e),
        Value::CellRef(_) | Value::AreaRef(_) => coerce_to_text(&resolve_single(value, ctx), ctx),
    }
}
