//! Workbook type - an ordered collection of worksheets

use crate::settings::ValueLocale;
use crate::worksheet::Worksheet;

/// A workbook snapshot
///
/// Holds the worksheets a formula may reference and the locale its values were
/// entered under. Sheets are addressed by their 0-based index.
#[derive(Debug, Clone)]
pub struct Workbook {
    /// Worksheets in the workbook
    worksheets: Vec<Worksheet>,
    /// Locale used to coerce text values
    locale: ValueLocale,
}

impl Workbook {
    /// Create a new workbook with one worksheet named "Sheet1"
    pub fn new() -> Self {
        Self {
            worksheets: vec![Worksheet::new("Sheet1")],
            locale: ValueLocale::default(),
        }
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Append a worksheet and return its index
    pub fn add_worksheet<S: Into<String>>(&mut self, name: S) -> usize {
        self.worksheets.push(Worksheet::new(name));
        self.worksheets.len() - 1
    }

    /// Get the locale values in this workbook were entered under
    pub fn locale(&self) -> &ValueLocale {
        &self.locale
    }

    /// Replace the workbook locale
    pub fn set_locale(&mut self, locale: ValueLocale) {
        self.locale = locale;
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
