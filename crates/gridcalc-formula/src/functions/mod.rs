//! Built-in operators and functions
//!
//! Functions live in a closed registry keyed by upper-case name. Each entry
//! declares its arity and whether its arguments are collapsed to scalars before
//! the call ([`ArgShape::Scalar`]) or passed through as references
//! ([`ArgShape::Reference`]) for functions that iterate over ranges.

/// Unwrap a coercion result, returning the error as the function's value
macro_rules! try_value {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => return Ok($crate::value::Value::Error(e)),
        }
    };
}

pub mod aggregate;
pub mod criteria;
pub mod date;
pub mod info;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod operators;
pub mod statistical;
pub mod text;

use std::collections::HashMap;

use gridcalc_core::ErrorCode;
use once_cell::sync::Lazy;

use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::resolver;
use crate::value::Value;

/// Function implementation signature
///
/// Formula errors are returned as `Ok(Value::Error(_))`.
pub type FunctionImpl = fn(&[Value], &EvaluationContext) -> FormulaResult<Value>;

/// How the driver prepares arguments before calling a function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// Every argument is resolved to a single scalar (implicit intersection)
    Scalar,
    /// Arguments are passed as they are, references included
    Reference,
}

/// Function definition
#[derive(Debug, Clone, Copy)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Argument preparation
    pub arg_shape: ArgShape,
    /// Implementation
    pub implementation: FunctionImpl,
    /// Is volatile (result depends on more than its inputs)
    pub volatile: bool,
}

impl FunctionDef {
    /// A function taking scalar arguments
    pub const fn scalar(
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: FunctionImpl,
    ) -> Self {
        Self {
            name,
            min_args,
            max_args,
            arg_shape: ArgShape::Scalar,
            implementation,
            volatile: false,
        }
    }

    /// A function receiving its arguments unresolved
    pub const fn reference(
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: FunctionImpl,
    ) -> Self {
        Self {
            name,
            min_args,
            max_args,
            arg_shape: ArgShape::Reference,
            implementation,
            volatile: false,
        }
    }

    /// Mark the function as volatile
    pub const fn volatile(mut self) -> Self {
        self.volatile = true;
        self
    }

    /// Check an argument count against the declared arity
    pub fn accepts(&self, arg_count: usize) -> bool {
        arg_count >= self.min_args && self.max_args.map_or(true, |max| arg_count <= max)
    }
}

/// Function registry
#[derive(Debug)]
pub struct FunctionRegistry {
    functions: HashMap<&'static str, FunctionDef>,
}

static REGISTRY: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::new);

/// The registry of built-in functions
pub fn registry() -> &'static FunctionRegistry {
    &REGISTRY
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        registry.register_math_functions();
        registry.register_statistical_functions();
        registry.register_date_functions();
        registry.register_logical_functions();
        registry.register_info_functions();
        registry.register_text_functions();
        registry.register_lookup_functions();

        registry
    }

    /// Look up a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name.to_ascii_uppercase().as_str())
    }

    fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name, def);
    }

    fn register_math_functions(&mut self) {
        use math::*;
        self.register(FunctionDef::reference("SUM", 1, None, fn_sum));
        self.register(FunctionDef::reference("PRODUCT", 1, None, fn_product));
        self.register(FunctionDef::scalar("ABS", 1, Some(1), fn_abs));
        self.register(FunctionDef::scalar("INT", 1, Some(1), fn_int));
        self.register(FunctionDef::scalar("ROUND", 2, Some(2), fn_round));
        self.register(FunctionDef::scalar("ROUNDUP", 2, Some(2), fn_roundup));
        self.register(FunctionDef::scalar("ROUNDDOWN", 2, Some(2), fn_rounddown));
        self.register(FunctionDef::scalar("MOD", 2, Some(2), fn_mod));
        self.register(FunctionDef::scalar("SQRT", 1, Some(1), fn_sqrt));
        self.register(FunctionDef::scalar("POWER", 2, Some(2), fn_power));
        self.register(FunctionDef::scalar("SIGN", 1, Some(1), fn_sign));
    }

    fn register_statistical_functions(&mut self) {
        use statistical::*;
        self.register(FunctionDef::reference("COUNT", 0, None, fn_count));
        self.register(FunctionDef::reference("COUNTA", 1, None, fn_counta));
        self.register(FunctionDef::reference("COUNTBLANK", 1, Some(1), fn_countblank));
        self.register(FunctionDef::reference("AVERAGE", 1, None, fn_average));
        self.register(FunctionDef::reference("MIN", 1, None, fn_min));
        self.register(FunctionDef::reference("MAX", 1, None, fn_max));
        self.register(FunctionDef::reference("STDEV", 1, None, fn_stdev));
        self.register(FunctionDef::reference("STDEVP", 1, None, fn_stdevp));
        self.register(FunctionDef::reference("VAR", 1, None, fn_var));
        self.register(FunctionDef::reference("VARP", 1, None, fn_varp));
        self.register(FunctionDef::reference("SUBTOTAL", 2, None, fn_subtotal));
        self.register(FunctionDef::reference("SLOPE", 2, Some(2), fn_slope));
        self.register(FunctionDef::reference("INTERCEPT", 2, Some(2), fn_intercept));
        self.register(FunctionDef::reference("COUNTIF", 2, Some(2), criteria::fn_countif));
        self.register(FunctionDef::reference("SUMIF", 2, Some(3), criteria::fn_sumif));
    }

    fn register_date_functions(&mut self) {
        use date::*;
        self.register(FunctionDef::scalar("DATE", 3, Some(3), fn_date));
        self.register(FunctionDef::scalar("YEAR", 1, Some(1), fn_year));
        self.register(FunctionDef::scalar("MONTH", 1, Some(1), fn_month));
        self.register(FunctionDef::scalar("DAY", 1, Some(1), fn_day));
        self.register(FunctionDef::scalar("HOUR", 1, Some(1), fn_hour));
        self.register(FunctionDef::scalar("MINUTE", 1, Some(1), fn_minute));
        self.register(FunctionDef::scalar("SECOND", 1, Some(1), fn_second));
        // EDATE checks its own argument count
        self.register(FunctionDef::reference("EDATE", 0, None, fn_edate));
        self.register(FunctionDef::scalar("EOMONTH", 2, Some(2), fn_eomonth));
        self.register(FunctionDef::scalar("DAYS360", 2, Some(3), fn_days360));
        self.register(FunctionDef::scalar("TODAY", 0, Some(0), fn_today).volatile());
        self.register(FunctionDef::scalar("NOW", 0, Some(0), fn_now).volatile());
        self.register(FunctionDef::scalar("DATEVALUE", 1, Some(1), fn_datevalue));
    }

    fn register_logical_functions(&mut self) {
        use logical::*;
        self.register(FunctionDef::reference("IF", 2, Some(3), fn_if));
        self.register(FunctionDef::reference("AND", 1, None, fn_and));
        self.register(FunctionDef::reference("OR", 1, None, fn_or));
        self.register(FunctionDef::scalar("NOT", 1, Some(1), fn_not));
        self.register(FunctionDef::reference("IFERROR", 2, Some(2), fn_iferror));
        self.register(FunctionDef::scalar("TRUE", 0, Some(0), fn_true));
        self.register(FunctionDef::scalar("FALSE", 0, Some(0), fn_false));
    }

    fn register_info_functions(&mut self) {
        use info::*;
        self.register(FunctionDef::scalar("ISBLANK", 1, Some(1), fn_isblank));
        self.register(FunctionDef::scalar("ISNUMBER", 1, Some(1), fn_isnumber));
        self.register(FunctionDef::scalar("ISTEXT", 1, Some(1), fn_istext));
        self.register(FunctionDef::scalar("ISLOGICAL", 1, Some(1), fn_islogical));
        self.register(FunctionDef::scalar("ISERROR", 1, Some(1), fn_iserror));
        self.register(FunctionDef::scalar("ISERR", 1, Some(1), fn_iserr));
        self.register(FunctionDef::scalar("ISNA", 1, Some(1), fn_isna));
        self.register(FunctionDef::scalar("NA", 0, Some(0), fn_na));
    }

    fn register_text_functions(&mut self) {
        use text::*;
        self.register(FunctionDef::scalar("LEN", 1, Some(1), fn_len));
        self.register(FunctionDef::scalar("LEFT", 1, Some(2), fn_left));
        self.register(FunctionDef::scalar("RIGHT", 1, Some(2), fn_right));
        self.register(FunctionDef::scalar("MID", 3, Some(3), fn_mid));
        self.register(FunctionDef::scalar("UPPER", 1, Some(1), fn_upper));
        self.register(FunctionDef::scalar("LOWER", 1, Some(1), fn_lower));
        self.register(FunctionDef::scalar("TRIM", 1, Some(1), fn_trim));
        self.register(FunctionDef::scalar("CONCATENATE", 1, None, fn_concatenate));
        self.register(FunctionDef::scalar("VALUE", 1, Some(1), fn_value));
        self.register(FunctionDef::scalar("T", 1, Some(1), fn_t));
        self.register(FunctionDef::scalar("N", 1, Some(1), fn_n));
    }

    fn register_lookup_functions(&mut self) {
        use lookup::*;
        self.register(FunctionDef::reference("TRANSPOSE", 1, Some(1), fn_transpose));
        self.register(FunctionDef::reference("INDEX", 2, Some(3), fn_index));
        self.register(FunctionDef::reference("ROWS", 1, Some(1), fn_rows));
        self.register(FunctionDef::reference("COLUMNS", 1, Some(1), fn_columns));
        self.register(FunctionDef::reference("ROW", 0, Some(1), fn_row));
        self.register(FunctionDef::reference("COLUMN", 0, Some(1), fn_column));
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a computed number, turning NaN and infinities into `#NUM!` and `-0` into `0`
pub(crate) fn number_result(n: f64) -> Value {
    if !n.is_finite() {
        Value::Error(ErrorCode::Num)
    } else if n == 0.0 {
        Value::Number(0.0)
    } else {
        Value::Number(n)
    }
}

/// Coerce the argument at `index` to a number; an absent argument reads as 0
pub(crate) fn number_arg(
    args: &[Value],
    index: usize,
    ctx: &EvaluationContext,
) -> Result<f64, ErrorCode> {
    match args.get(index) {
        Some(v) => resolver::coerce_to_number(v, ctx),
        None => Ok(0.0),
    }
}

/// Coerce the argument at `index` to text; an absent argument reads as ""
pub(crate) fn text_arg(
    args: &[Value],
    index: usize,
    ctx: &EvaluationContext,
) -> Result<String, ErrorCode> {
    match args.get(index) {
        Some(v) => resolver::coerce_to_text(v, ctx),
        None => Ok(String::new()),
    }
}
