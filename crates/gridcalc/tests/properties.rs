//! Property tests for operator and resolver invariants

use gridcalc::prelude::*;
use gridcalc_formula::functions::operators::{apply_binary, apply_unary};
use gridcalc_formula::resolver::{parse_number, resolve_single};
use gridcalc_formula::{AreaRef, CellRef};
use proptest::prelude::*;

fn operand() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        Just(-0.0),
        -1.0e6f64..1.0e6,
        (-1000i32..1000).prop_map(f64::from),
    ]
}

fn is_negative_zero(value: &Value) -> bool {
    matches!(value, Value::Number(n) if *n == 0.0 && n.is_sign_negative())
}

fn cell_value() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Empty),
        (-1.0e9f64..1.0e9).prop_map(CellValue::Number),
        any::<bool>().prop_map(CellValue::Boolean),
        "[a-z ]{0,8}".prop_map(CellValue::String),
        Just(CellValue::Error(ErrorCode::Div0)),
    ]
}

proptest! {
    #[test]
    fn results_never_carry_negative_zero(a in operand(), b in operand()) {
        let ctx = EvaluationContext::simple();
        let (a, b) = (Value::Number(a), Value::Number(b));
        for op in [Operator::Add, Operator::Multiply, Operator::Divide, Operator::Power] {
            let result = apply_binary(op, &a, &b, &ctx);
            prop_assert!(!is_negative_zero(&result), "{} gave {:?}", op, result);
        }
        for op in [Operator::UnaryMinus, Operator::UnaryPlus, Operator::Percent] {
            let result = apply_unary(op, &a, &ctx);
            prop_assert!(!is_negative_zero(&result), "{} gave {:?}", op, result);
        }
    }

    #[test]
    fn plain_decimal_text_parses_back(n in -1.0e12f64..1.0e12) {
        prop_assert_eq!(parse_number(&n.to_string()), Some(n));
    }

    #[test]
    fn single_cell_area_resolves_like_its_cell(
        value in cell_value(),
        row in 0u32..50,
        col in 0u16..20,
        at_row in 0u32..60,
        at_col in 0u16..30,
    ) {
        let mut wb = Workbook::new();
        wb.worksheet_mut(0)
            .unwrap()
            .set_cell_value_at(row, col, value)
            .unwrap();
        let ctx = EvaluationContext::for_workbook(&wb, 0, at_row, at_col);

        let cell = CellRef::new(0, row, col);
        prop_assert_eq!(
            resolve_single(&Value::AreaRef(AreaRef::from_cell(cell)), &ctx),
            resolve_single(&Value::CellRef(cell), &ctx)
        );
    }

    #[test]
    fn comparison_is_consistent(a in operand(), b in operand()) {
        let ctx = EvaluationContext::simple();
        let (va, vb) = (Value::Number(a), Value::Number(b));
        let lt = apply_binary(Operator::LessThan, &va, &vb, &ctx);
        let ge = apply_binary(Operator::GreaterEqual, &va, &vb, &ctx);
        prop_assert_ne!(lt, ge);
    }
}

#[test]
fn subtraction_keeps_the_sign_of_zero() {
    let ctx = EvaluationContext::simple();
    let result = apply_binary(
        Operator::Subtract,
        &Value::Number(-0.0),
        &Value::Number(0.0),
        &ctx,
    );
    assert!(is_negative_zero(&result));

    let result = apply_binary(Operator::Add, &Value::Number(-0.0), &Value::Number(0.0), &ctx);
    assert!(matches!(result, Value::Number(n) if n == 0.0 && n.is_sign_positive()));
}

#[test]
fn negative_zero_equals_zero() {
    let ctx = EvaluationContext::simple();
    let result = apply_binary(Operator::Equal, &Value::Number(-0.0), &Value::Number(0.0), &ctx);
    assert_eq!(result, Value::Boolean(true));
}

#[test]
fn percent_examples() {
    let ctx = EvaluationContext::simple();
    let percent = |n: f64| apply_unary(Operator::Percent, &Value::Number(n), &ctx);
    assert_eq!(percent(5.0), Value::Number(0.05));
    assert_eq!(percent(3000.0), Value::Number(30.0));
    assert_eq!(percent(-150.0), Value::Number(-1.5));

    let mut wb = Workbook::new();
    wb.worksheet_mut(0)
        .unwrap()
        .set_cell_value("A1", 50.0)
        .unwrap();
    let ctx = EvaluationContext::for_workbook(&wb, 0, 5, 5);
    let area = Value::AreaRef(AreaRef::parse(0, "A1").unwrap());
    assert_eq!(apply_unary(Operator::Percent, &area, &ctx), Value::Number(0.5));
}

#[test]
fn numeric_text_grammar() {
    for text in [".1", "+1E5", "  +1E5  ", "1e-3", "-2.5"] {
        assert!(parse_number(text).is_some(), "{:?} should parse", text);
    }
    for text in ["-", "1,000", "NaN", "Infinity", "", "1e", "0x10"] {
        assert!(parse_number(text).is_none(), "{:?} should not parse", text);
    }
}
