//! Per-call evaluation context

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use gridcalc_core::{ValueLocale, Workbook};

use crate::source::{CellValueSource, EmptyCellSource};
use crate::value::Value;

static NO_CELLS: EmptyCellSource = EmptyCellSource;

/// Offset of the cell being computed within an array formula's output range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayPosition {
    pub row: u32,
    pub col: u16,
}

/// Everything a single evaluation needs besides the tokens
///
/// The context is passed explicitly to every operator and function; nothing is
/// read from process-wide state, so evaluations on different threads are
/// independent as long as each uses its own context.
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    source: &'a dyn CellValueSource,
    /// Sheet of the cell whose formula is evaluated
    pub sheet: usize,
    /// Row of the cell whose formula is evaluated
    pub row: u32,
    /// Column of the cell whose formula is evaluated
    pub col: u16,
    /// Locale used for text coercion and the date system
    pub locale: ValueLocale,
    now: Option<NaiveDateTime>,
    array_position: Option<ArrayPosition>,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context for the cell at (sheet, row, col)
    pub fn new(source: &'a dyn CellValueSource, sheet: usize, row: u32, col: u16) -> Self {
        Self {
            source,
            sheet,
            row,
            col,
            locale: ValueLocale::default(),
            now: None,
            array_position: None,
        }
    }

    /// Create a context over a workbook, adopting the workbook's locale
    pub fn for_workbook(workbook: &'a Workbook, sheet: usize, row: u32, col: u16) -> Self {
        Self::new(workbook, sheet, row, col).with_locale(*workbook.locale())
    }

    /// Create a context at A1 with no cells (for testing)
    pub fn simple() -> EvaluationContext<'static> {
        EvaluationContext::new(&NO_CELLS, 0, 0, 0)
    }

    /// Use the given locale
    pub fn with_locale(mut self, locale: ValueLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Pin the clock used by TODAY, NOW and year-less dates (local time)
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Current local date and time
    ///
    /// Uses the pinned clock if one was set, otherwise the system clock shifted
    /// by the locale's UTC offset.
    pub fn now(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| {
            Utc::now()
                .with_timezone(&self.locale.fixed_offset())
                .naive_local()
        })
    }

    /// Current local date
    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Read a cell from the source
    pub fn get_value(&self, sheet: usize, row: u32, col: u16) -> Value {
        self.source.get_value(sheet, row, col)
    }

    /// The cell source backing this evaluation
    pub fn source(&self) -> &'a dyn CellValueSource {
        self.source
    }

    /// Position within the array output range, when evaluating an array formula
    pub fn array_position(&self) -> Option<ArrayPosition> {
        self.array_position
    }

    /// Context for one cell of an array formula anchored at this context's cell
    pub fn at_array_position(&self, row: u32, col: u16) -> Self {
        Self {
            row: self.row + row,
            col: self.col + col,
            array_position: Some(ArrayPosition { row, col }),
            ..*self
        }
    }
}

impl fmt::Debug for EvaluationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationContext")
            .field("sheet", &self.sheet)
            .field("row", &self.row)
            .field("col", &self.col)
            .field("locale", &self.locale)
            .field("now", &self.now)
            .field("array_position", &self.array_position)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcalc_core::{DateOrder, DateSystem};

    #[test]
    fn test_pinned_clock() {
        let now = NaiveDate::from_ymd_opt(2019, 1, 18)
            .unwrap()
            .and_hms_opt(15, 43, 9)
            .unwrap();
        let ctx = EvaluationContext::simple().with_now(now);
        assert_eq!(ctx.now(), now);
        assert_eq!(ctx.today(), NaiveDate::from_ymd_opt(2019, 1, 18).unwrap());
    }

    #[test]
    fn test_workbook_locale_is_adopted() {
        let mut wb = Workbook::new();
        wb.set_locale(
            ValueLocale::with_date_order(DateOrder::Dmy).date_system(DateSystem::Excel1904),
        );
        let ctx = EvaluationContext::for_workbook(&wb, 0, 4, 2);
        assert_eq!(ctx.locale.date_order, DateOrder::Dmy);
        assert_eq!((ctx.row, ctx.col), (4, 2));
    }

    #[test]
    fn test_array_position_offsets_calling_cell() {
        let ctx = EvaluationContext::simple();
        let ctx = EvaluationContext::new(ctx.source(), 0, 10, 3);
        let cell = ctx.at_array_position(2, 1);
        assert_eq!((cell.row, cell.col), (12, 4));
        assert_eq!(cell.array_position(), Some(ArrayPosition { row: 2, col: 1 }));
        assert_eq!(ctx.array_position(), None);
    }
}
