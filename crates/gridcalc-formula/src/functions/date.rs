//! Date and time functions
//!
//! Dates are serial numbers in the context's date system. Arguments may be
//! numbers or date/time text.

use chrono::{Datelike, NaiveDate};
use gridcalc_core::{DateSystem, ErrorCode};

use super::number_arg;
use crate::context::EvaluationContext;
use crate::datetime::{self, DateParts};
use crate::error::FormulaResult;
use crate::resolver;
use crate::value::Value;

fn system(ctx: &EvaluationContext) -> DateSystem {
    ctx.locale.date_system
}

fn date_value(date: Option<NaiveDate>, ctx: &EvaluationContext) -> Value {
    match date.and_then(|d| datetime::date_to_serial(d, system(ctx))) {
        Some(serial) => Value::Number(serial),
        None => Value::Error(ErrorCode::Num),
    }
}

/// DATE(year, month, day) - Serial number of a date
pub fn fn_date(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let year = try_value!(number_arg(args, 0, ctx)).trunc();
    let month = try_value!(number_arg(args, 1, ctx)).trunc();
    let day = try_value!(number_arg(args, 2, ctx)).trunc();
    if ![year, month, day].iter().all(|n| n.abs() < 1e9) {
        return Ok(Value::Error(ErrorCode::Num));
    }
    match datetime::serial_from_ymd(year as i64, month as i64, day as i64, system(ctx)) {
        Some(serial) => Ok(Value::Number(serial)),
        None => Ok(Value::Error(ErrorCode::Num)),
    }
}

fn calendar_field<F>(args: &[Value], ctx: &EvaluationContext, field: F) -> FormulaResult<Value>
where
    F: Fn(&DateParts) -> f64,
{
    let serial = try_value!(number_arg(args, 0, ctx));
    let parts = try_value!(datetime::calendar_fields(serial, system(ctx)));
    Ok(Value::Number(field(&parts)))
}

/// YEAR(serial_number) - Year of a date
pub fn fn_year(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    calendar_field(args, ctx, |p| f64::from(p.year))
}

/// MONTH(serial_number) - Month of a date (1-12)
pub fn fn_month(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    calendar_field(args, ctx, |p| f64::from(p.month))
}

/// DAY(serial_number) - Day of the month
pub fn fn_day(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    calendar_field(args, ctx, |p| f64::from(p.day))
}

/// HOUR(serial_number) - Hour (0-23)
pub fn fn_hour(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    calendar_field(args, ctx, |p| f64::from(p.hour))
}

/// MINUTE(serial_number) - Minute (0-59)
pub fn fn_minute(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    calendar_field(args, ctx, |p| f64::from(p.minute))
}

/// SECOND(serial_number) - Second (0-59)
pub fn fn_second(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    calendar_field(args, ctx, |p| f64::from(p.second))
}

/// Start date and whole month offset shared by EDATE and EOMONTH
///
/// A start value with no calendar date is `#VALUE!`.
fn start_and_months(
    args: &[Value],
    ctx: &EvaluationContext,
) -> Result<(NaiveDate, i32), ErrorCode> {
    let serial = number_arg(args, 0, ctx)?;
    let months = number_arg(args, 1, ctx)?.trunc();
    let start = datetime::serial_to_date(serial, system(ctx)).ok_or(ErrorCode::Value)?;
    if months.abs() > f64::from(i32::MAX) {
        return Err(ErrorCode::Num);
    }
    Ok((start, months as i32))
}

/// EDATE(start_date, months) - Same day of the month, months before or after
///
/// The day is clamped to the length of the target month. Exactly two
/// arguments are required; anything else is `#VALUE!`.
pub fn fn_edate(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    if args.len() != 2 {
        return Ok(Value::Error(ErrorCode::Value));
    }
    let (start, months) = try_value!(start_and_months(args, ctx));
    Ok(date_value(datetime::add_months(start, months), ctx))
}

/// EOMONTH(start_date, months) - Last day of the month, months before or after
pub fn fn_eomonth(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let (start, months) = try_value!(start_and_months(args, ctx));
    let end = datetime::add_months(start, months).and_then(datetime::end_of_month);
    Ok(date_value(end, ctx))
}

/// DAYS360(start_date, end_date, [method]) - Days between dates on a 360-day year
///
/// `method` FALSE or omitted selects the US (NASD) rules, TRUE the European ones.
pub fn fn_days360(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    let start = try_value!(number_arg(args, 0, ctx));
    let end = try_value!(number_arg(args, 1, ctx));
    let european = match args.get(2) {
        Some(v) => try_value!(resolver::coerce_to_boolean(v, ctx)),
        None => false,
    };
    let (Some(start), Some(end)) = (
        datetime::serial_to_date(start, system(ctx)),
        datetime::serial_to_date(end, system(ctx)),
    ) else {
        return Ok(Value::Error(ErrorCode::Num));
    };
    Ok(Value::Number(days360(start, end, european)))
}

/// 30/360 day count
fn days360(start: NaiveDate, end: NaiveDate, european: bool) -> f64 {
    let mut start_day = start.day().min(30);
    if !european && datetime::is_last_day_of_month(start) {
        start_day = 30;
    }

    let (mut end_year, mut end_month, mut end_day) = (end.year(), end.month(), end.day());
    if end_day == 31 {
        if !european && start_day < 30 {
            // Roll to the first of the following month
            end_day = 1;
            end_month += 1;
            if end_month > 12 {
                end_month = 1;
                end_year += 1;
            }
        } else {
            end_day = 30;
        }
    }

    let day_count = |year: i32, month: u32, day: u32| {
        f64::from(year) * 360.0 + f64::from(month) * 30.0 + f64::from(day)
    };
    day_count(end_year, end_month, end_day) - day_count(start.year(), start.month(), start_day)
}

/// TODAY() - Current date
pub fn fn_today(_args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(date_value(Some(ctx.today()), ctx))
}

/// NOW() - Current date and time
pub fn fn_now(_args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    match datetime::datetime_to_serial(ctx.now(), system(ctx)) {
        Some(serial) => Ok(Value::Number(serial)),
        None => Ok(Value::Error(ErrorCode::Num)),
    }
}

/// DATEVALUE(date_text) - Serial number of a date written as text
///
/// Any time of day in the text is dropped.
pub fn fn_datevalue(args: &[Value], ctx: &EvaluationContext) -> FormulaResult<Value> {
    match args.first() {
        Some(Value::Text(s)) => {
            match datetime::parse_date_time(s, &ctx.locale, ctx.today().year()) {
                Some(serial) => Ok(Value::Number(serial.floor())),
                None => Ok(Value::Error(ErrorCode::Value)),
            }
        }
        Some(Value::Error(e)) => Ok(Value::Error(*e)),
        _ => Ok(Value::Error(ErrorCode::Value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::area;
    use crate::value::AreaRef;
    use gridcalc_core::ValueLocale;

    fn eval(f: crate::functions::FunctionImpl, args: &[Value]) -> Value {
        f(args, &EvaluationContext::simple()).unwrap()
    }

    fn serial(y: i32, m: u32, d: u32) -> Value {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        Value::Number(datetime::date_to_serial(date, DateSystem::Excel1900).unwrap())
    }

    fn n(x: f64) -> Value {
        Value::Number(x)
    }

    #[test]
    fn test_date() {
        assert_eq!(eval(fn_date, &[n(2019.0), n(1.0), n(18.0)]), n(43483.0));
        // Month and day roll over
        assert_eq!(eval(fn_date, &[n(2018.0), n(13.0), n(18.0)]), n(43483.0));
        assert_eq!(eval(fn_date, &[n(2019.0), n(2.0), n(0.0)]), serial(2019, 1, 31));
        // Two-digit years are offset from 1900
        assert_eq!(eval(fn_date, &[n(99.0), n(1.0), n(1.0)]), serial(1999, 1, 1));
        assert_eq!(
            eval(fn_date, &[n(10000.0), n(1.0), n(1.0)]),
            Value::Error(ErrorCode::Num)
        );
    }

    #[test]
    fn test_calendar_fields() {
        let stamp = n(43483.75);
        assert_eq!(eval(fn_year, &[stamp.clone()]), n(2019.0));
        assert_eq!(eval(fn_month, &[stamp.clone()]), n(1.0));
        assert_eq!(eval(fn_day, &[stamp.clone()]), n(18.0));
        assert_eq!(eval(fn_hour, &[stamp]), n(18.0));
        assert_eq!(eval(fn_minute, &[n(0.5 + 30.0 / 1440.0)]), n(30.0));
        assert_eq!(eval(fn_second, &[Value::text("15:43:09")]), n(9.0));
        assert_eq!(eval(fn_year, &[Value::text("2019/1/18")]), n(2019.0));
    }

    #[test]
    fn test_calendar_pseudo_dates() {
        assert_eq!(eval(fn_year, &[n(0.0)]), n(1900.0));
        assert_eq!(eval(fn_month, &[n(0.0)]), n(1.0));
        assert_eq!(eval(fn_day, &[n(0.0)]), n(0.0));
        assert_eq!(eval(fn_day, &[n(60.0)]), n(29.0));
        assert_eq!(eval(fn_month, &[n(60.0)]), n(2.0));
        assert_eq!(eval(fn_day, &[n(61.0)]), n(1.0));
        assert_eq!(eval(fn_year, &[n(-1.0)]), Value::Error(ErrorCode::Num));
    }

    #[test]
    fn test_edate() {
        assert_eq!(eval(fn_edate, &[serial(2011, 1, 15), n(1.0)]), serial(2011, 2, 15));
        assert_eq!(eval(fn_edate, &[serial(2011, 3, 31), n(-1.0)]), serial(2011, 2, 28));
        assert_eq!(eval(fn_edate, &[serial(2012, 1, 31), n(1.0)]), serial(2012, 2, 29));
        // Time of day is dropped
        assert_eq!(eval(fn_edate, &[n(43483.75), n(0.0)]), n(43483.0));
        assert_eq!(
            eval(fn_edate, &[Value::text("2019/1/18"), n(12.0)]),
            serial(2020, 1, 18)
        );
    }

    #[test]
    fn test_edate_errors() {
        assert_eq!(eval(fn_edate, &[n(40000.0)]), Value::Error(ErrorCode::Value));
        assert_eq!(
            eval(fn_edate, &[n(40000.0), n(1.0), n(1.0)]),
            Value::Error(ErrorCode::Value)
        );
        assert_eq!(
            eval(fn_edate, &[Value::text("not a date"), n(1.0)]),
            Value::Error(ErrorCode::Value)
        );
        assert_eq!(eval(fn_edate, &[n(-5.0), n(1.0)]), Value::Error(ErrorCode::Value));
        let cube = Value::AreaRef(AreaRef::new_3d(0, 1, 0, 0, 0, 0));
        assert_eq!(eval(fn_edate, &[cube, n(1.0)]), Value::Error(ErrorCode::Value));
        assert_eq!(eval(fn_edate, &[area("A1"), n(1.0)]), n(31.0));
    }

    #[test]
    fn test_eomonth() {
        assert_eq!(eval(fn_eomonth, &[serial(2011, 1, 1), n(1.0)]), serial(2011, 2, 28));
        assert_eq!(eval(fn_eomonth, &[serial(2011, 1, 1), n(-3.0)]), serial(2010, 10, 31));
        assert_eq!(eval(fn_eomonth, &[serial(2011, 1, 1), n(1.9)]), serial(2011, 2, 28));
    }

    #[test]
    fn test_days360_us() {
        let us = Value::Boolean(false);
        assert_eq!(
            eval(fn_days360, &[serial(2009, 1, 15), serial(2009, 5, 15), us.clone()]),
            n(120.0)
        );
        assert_eq!(
            eval(fn_days360, &[serial(2009, 5, 15), serial(2009, 1, 15), us.clone()]),
            n(-120.0)
        );
        assert_eq!(
            eval(fn_days360, &[serial(2018, 2, 28), serial(2018, 3, 31), us.clone()]),
            n(30.0)
        );
        assert_eq!(
            eval(fn_days360, &[serial(2018, 1, 15), serial(2018, 3, 31), us]),
            n(76.0)
        );
        assert_eq!(
            eval(fn_days360, &[serial(2018, 1, 1), serial(2018, 12, 31)]),
            n(360.0)
        );
    }

    #[test]
    fn test_days360_european() {
        let eu = Value::Boolean(true);
        assert_eq!(
            eval(fn_days360, &[serial(2018, 2, 28), serial(2018, 3, 31), eu.clone()]),
            n(32.0)
        );
        assert_eq!(
            eval(fn_days360, &[serial(2018, 1, 31), serial(2018, 3, 31), eu]),
            n(60.0)
        );
    }

    #[test]
    fn test_days360_month_boundaries() {
        // Consecutive month ends are 30 days apart under the US rules, except
        // that a February end counts its actual day
        let mut start = NaiveDate::from_ymd_opt(2015, 1, 31).unwrap();
        for _ in 0..60 {
            let end = datetime::end_of_month(start.succ_opt().unwrap()).unwrap();
            let expected = if end.month() == 2 {
                f64::from(end.day())
            } else {
                30.0
            };
            assert_eq!(days360(start, end, false), expected, "{} -> {}", start, end);
            start = end;
        }
    }

    #[test]
    fn test_today_and_now_use_context_clock() {
        let now = NaiveDate::from_ymd_opt(2019, 1, 18)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        let ctx = EvaluationContext::simple().with_now(now);
        assert_eq!(fn_today(&[], &ctx).unwrap(), n(43483.0));
        assert_eq!(fn_now(&[], &ctx).unwrap(), n(43483.75));

        let ctx_1904 = ctx.with_locale(ValueLocale::default().date_system(DateSystem::Excel1904));
        assert_eq!(fn_today(&[], &ctx_1904).unwrap(), n(42021.0));
    }

    #[test]
    fn test_datevalue() {
        assert_eq!(eval(fn_datevalue, &[Value::text("2019/1/18")]), n(43483.0));
        assert_eq!(
            eval(fn_datevalue, &[Value::text("18-Jan-2019 15:00")]),
            n(43483.0)
        );
        assert_eq!(
            eval(fn_datevalue, &[Value::text("nonsense")]),
            Value::Error(ErrorCode::Value)
        );
        assert_eq!(eval(fn_datevalue, &[n(1.0)]), Value::Error(ErrorCode::Value));
    }
}
