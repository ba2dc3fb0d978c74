//! Criteria matching for COUNTIF and SUMIF
//!
//! Excel criteria can be:
//! - A number: exact match (e.g., 5)
//! - A boolean: matches that boolean only
//! - A text string: case-insensitive match (e.g., "apple")
//! - A comparison expression: ">5", ">=10", "<100", "<=50", "<>0", "=5", ">b"
//! - Wildcards: "*" matches any characters, "?" matches single character
//! - Empty string: matches empty cells; "<>" matches non-empty cells

use std::cmp::Ordering;

use gridcalc_core::ErrorCode;

use super::number_result;
use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::resolver;
use crate::value::{AreaRef, Value};

/// Criteria matcher for COUNTIF/SUMIF
/// Handles comparison operators, wildcards, and exact matching
#[derive(Debug)]
pub struct CriteriaMatcher {
    criteria_type: CriteriaType,
}

#[derive(Debug)]
enum CriteriaType {
    /// Exact number match
    Number(f64),
    /// Comparison with number (operator, value)
    Comparison(ComparisonOp, f64),
    /// Comparison with text (operator, lowercase text)
    TextComparison(ComparisonOp, String),
    /// Text match (case-insensitive, with wildcards)
    Text(String),
    Boolean(bool),
    Error(ErrorCode),
    /// Match empty values
    Empty,
    /// Match anything but empty values
    NotEmpty,
    /// A blank criteria cell matches nothing
    Nothing,
}

#[derive(Debug, Clone, Copy)]
enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl ComparisonOp {
    fn test(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Equal => ordering.is_eq(),
            ComparisonOp::NotEqual => ordering.is_ne(),
            ComparisonOp::LessThan => ordering.is_lt(),
            ComparisonOp::LessEqual => ordering.is_le(),
            ComparisonOp::GreaterThan => ordering.is_gt(),
            ComparisonOp::GreaterEqual => ordering.is_ge(),
        }
    }
}

const NUMBER_TOLERANCE: f64 = 1e-10;

fn compare_numbers(a: f64, b: f64) -> Ordering {
    if (a - b).abs() < NUMBER_TOLERANCE {
        Ordering::Equal
    } else {
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    }
}

impl CriteriaMatcher {
    /// Create a new criteria matcher from a scalar value
    pub fn new(criteria: &Value) -> Self {
        let criteria_type = match criteria {
            Value::Number(n) => CriteriaType::Number(*n),
            Value::Boolean(b) => CriteriaType::Boolean(*b),
            Value::Text(s) => Self::parse_string_criteria(s),
            Value::Error(e) => CriteriaType::Error(*e),
            Value::Blank | Value::MissingArgument => CriteriaType::Nothing,
            // References are resolved by the caller
            Value::CellRef(_) | Value::AreaRef(_) => CriteriaType::Nothing,
        };

        Self { criteria_type }
    }

    fn parse_string_criteria(s: &str) -> CriteriaType {
        if s.is_empty() {
            return CriteriaType::Empty;
        }

        if let Some(ct) = Self::try_parse_comparison(s) {
            return ct;
        }

        match s.to_ascii_uppercase().as_str() {
            "TRUE" => return CriteriaType::Boolean(true),
            "FALSE" => return CriteriaType::Boolean(false),
            _ => {}
        }

        if let Some(n) = resolver::parse_number(s) {
            return CriteriaType::Number(n);
        }

        CriteriaType::Text(s.to_lowercase())
    }

    fn try_parse_comparison(s: &str) -> Option<CriteriaType> {
        // Longer operators first
        let (op, rest) = if let Some(rest) = s.strip_prefix(">=") {
            (ComparisonOp::GreaterEqual, rest)
        } else if let Some(rest) = s.strip_prefix("<=") {
            (ComparisonOp::LessEqual, rest)
        } else if let Some(rest) = s.strip_prefix("<>") {
            (ComparisonOp::NotEqual, rest)
        } else if let Some(rest) = s.strip_prefix('>') {
            (ComparisonOp::GreaterThan, rest)
        } else if let Some(rest) = s.strip_prefix('<') {
            (ComparisonOp::LessThan, rest)
        } else if let Some(rest) = s.strip_prefix('=') {
            (ComparisonOp::Equal, rest)
        } else {
            return None;
        };

        if rest.is_empty() {
            return match op {
                ComparisonOp::Equal => Some(CriteriaType::Empty),
                ComparisonOp::NotEqual => Some(CriteriaType::NotEmpty),
                _ => Some(CriteriaType::TextComparison(op, String::new())),
            };
        }
        if let Some(n) = resolver::parse_number(rest) {
            return Some(CriteriaType::Comparison(op, n));
        }
        match op {
            ComparisonOp::Equal => Some(CriteriaType::Text(rest.to_lowercase())),
            _ => Some(CriteriaType::TextComparison(op, rest.to_lowercase())),
        }
    }

    /// Check if a value matches the criteria
    pub fn matches(&self, value: &Value) -> bool {
        match &self.criteria_type {
            // SUMIF(A:A, 5) does not match the text "5"
            CriteriaType::Number(criteria_num) => match value {
                Value::Number(n) => compare_numbers(*n, *criteria_num).is_eq(),
                _ => false,
            },

            CriteriaType::Comparison(op, criteria_num) => match value {
                Value::Number(n) => op.test(compare_numbers(*n, *criteria_num)),
                // "<>5" also matches everything that is not a number
                _ => matches!(op, ComparisonOp::NotEqual),
            },

            CriteriaType::TextComparison(op, pattern) => match value {
                Value::Text(s) => match op {
                    ComparisonOp::NotEqual => !Self::wildcard_match(pattern, &s.to_lowercase()),
                    _ => op.test(s.to_lowercase().as_str().cmp(pattern.as_str())),
                },
                _ => matches!(op, ComparisonOp::NotEqual),
            },

            CriteriaType::Text(pattern) => match value {
                Value::Text(s) => Self::wildcard_match(pattern, &s.to_lowercase()),
                _ => false,
            },

            CriteriaType::Boolean(b) => matches!(value, Value::Boolean(v) if v == b),

            CriteriaType::Error(e) => matches!(value, Value::Error(v) if v == e),

            CriteriaType::Empty => {
                matches!(value, Value::Blank)
                    || matches!(value, Value::Text(s) if s.is_empty())
            }

            CriteriaType::NotEmpty => !matches!(value, Value::Blank),

            CriteriaType::Nothing => false,
        }
    }

    /// Match with wildcards: * = any characters, ? = single character
    fn wildcard_match(pattern: &str, text: &str) -> bool {
        if !pattern.contains('*') && !pattern.contains('?') {
            return pattern == text;
        }

        let pattern_chars: Vec<char> = pattern.chars().collect();
        let text_chars: Vec<char> = text.chars().collect();

        Self::wildcard_match_impl(&pattern_chars, &text_chars)
    }

    fn wildcard_match_impl(pattern: &[char], text: &[char]) -> bool {
        let mut pi = 0;
        let mut ti = 0;
        // Last '*' seen in the pattern and the text position it was tried at
        let mut star_pi = None;
        let mut star_ti = 0;

        while ti < text.len() {
            if pi < pattern.len() && (pattern[pi] == '?' || pattern[pi] == text[ti]) {
                pi += 1;
                ti += 1;
            } else if pi < pattern.len() && pattern[pi] == '*' {
                star_pi = Some(pi);
                star_ti = ti;
                pi += 1;
            } else if let Some(sp) = star_pi {
                // Let the last star swallow one more character
                pi = sp + 1;
                star_ti += 1;
                ti = star_ti;
            } else {
                return false;
            }
        }

        while pi < pattern.len() && pattern[pi] == '*' {
            pi += 1;
        }

        pi == pattern.len()
    }
}

/// Range and matcher shared by COUNTIF and SUMIF
fn range_and_matcher(
    args: &[Value],
    ctx: &EvaluationContext,
) -> Result<(AreaRef, CriteriaMatcher), ErrorCode> {
    let range = match args.first() {
        Some(Value::Error(e)) => return Err(*e),
        Some(arg) => arg.as_area().ok_or(ErrorCode::Value)?,
        None => return Err(ErrorCode::Value),
    };
    if range.spans_multiple_sheets() {
        return Err(ErrorCode::Value);
    }
    let criteria = match args.get(1) {
        Some(v) => resolver::resolve_single(v, ctx),
        None => Value::Blank,
    };
    Ok((range, CriteriaMatcher::new(&criteria)))
}

/// COUNTIF(range, criteria) - Counts cells matching the criteria
pub fn fn_countif(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let (range, matcher) = try_value!(range_and_matcher(args, ctx));
    let count = range
        .cells()
        .filter(|cell| matcher.matches(&resolver::fetch(*cell, ctx)))
        .count();
    Ok(Value::Number(count as f64))
}

/// SUMIF(range, criteria, [sum_range]) - Sums cells whose range cell matches
///
/// The sum range is aligned with the criteria range from its top-left corner
/// and takes the criteria range's shape.
pub fn fn_sumif(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let (range, matcher) = try_value!(range_and_matcher(args, ctx));
    let sum_range = match args.get(2) {
        Some(Value::Error(e)) => return Ok(Value::Error(*e)),
        Some(Value::MissingArgument) | None => range,
        Some(arg) => match arg.as_area() {
            Some(area) => {
                let corner = area.top_left();
                AreaRef::new(
                    corner.sheet,
                    corner.row,
                    corner.col,
                    corner.row.saturating_add(range.height() - 1),
                    corner.col.saturating_add(range.width() - 1),
                )
            }
            None => return Ok(Value::Error(ErrorCode::Value)),
        },
    };

    let mut sum = 0.0;
    for row in 0..range.height() {
        for col in 0..range.width() {
            let (Some(test_cell), Some(sum_cell)) = (range.get(row, col), sum_range.get(row, col))
            else {
                continue;
            };
            if !matcher.matches(&resolver::fetch(test_cell, ctx)) {
                continue;
            }
            match resolver::fetch(sum_cell, ctx) {
                Value::Number(n) => sum += n,
                Value::Error(e) => return Ok(Value::Error(e)),
                _ => {}
            }
        }
    }
    Ok(number_result(sum))
}
