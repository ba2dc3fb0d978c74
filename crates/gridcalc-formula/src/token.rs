//! Formula tokens in postfix order
//!
//! Tokens come from an external tokenizer. `=1+A1*2` arrives as
//! `[Number(1), Cell(A1), Number(2), Operator(Multiply), Operator(Add)]`.

use std::fmt;

use gridcalc_core::ErrorCode;

use crate::value::{AreaRef, CellRef};

/// Built-in operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Concat,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    UnaryPlus,
    UnaryMinus,
    Percent,
    /// `A1:B2` - bounding box of two references
    Range,
    /// `A1:C3 B2:D4` - cells common to two references
    Intersection,
}

impl Operator {
    /// Number of operands taken from the stack
    pub fn arity(&self) -> usize {
        match self {
            Operator::UnaryPlus | Operator::UnaryMinus | Operator::Percent => 1,
            _ => 2,
        }
    }

    /// Symbol as written in formula text
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add | Operator::UnaryPlus => "+",
            Operator::Subtract | Operator::UnaryMinus => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "^",
            Operator::Concat => "&",
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterEqual => ">=",
            Operator::Percent => "%",
            Operator::Range => ":",
            Operator::Intersection => " ",
        }
    }

    /// True for the six comparison operators
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::NotEqual
                | Operator::LessThan
                | Operator::LessEqual
                | Operator::GreaterThan
                | Operator::GreaterEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::UnaryPlus => f.write_str("unary +"),
            Operator::UnaryMinus => f.write_str("unary -"),
            Operator::Intersection => f.write_str("intersection"),
            op => f.write_str(op.symbol()),
        }
    }
}

/// One operation in a postfix token sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(ErrorCode),
    /// An empty argument slot
    Missing,
    Cell(CellRef),
    Area(AreaRef),
    Operator(Operator),
    /// Call a function with the given number of arguments from the stack
    Function { name: String, arg_count: usize },
}

impl Token {
    /// Create a text literal token
    pub fn text<S: Into<String>>(s: S) -> Self {
        Token::Text(s.into())
    }

    /// Create a function call token
    pub fn function<S: Into<String>>(name: S, arg_count: usize) -> Self {
        Token::Function {
            name: name.into(),
            arg_count,
        }
    }

    /// Create a cell reference token from an A1-style address
    pub fn cell(sheet: usize, address: &str) -> gridcalc_core::Result<Self> {
        CellRef::parse(sheet, address).map(Token::Cell)
    }

    /// Create an area reference token from an A1-style range
    pub fn area(sheet: usize, range: &str) -> gridcalc_core::Result<Self> {
        AreaRef::parse(sheet, range).map(Token::Area)
    }
}

impl From<Operator> for Token {
    fn from(op: Operator) -> Self {
        Token::Operator(op)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Text(s) => write!(f, "{:?}", s),
            Token::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Token::Error(e) => write!(f, "{}", e),
            Token::Missing => f.write_str("<missing>"),
            Token::Cell(cell) => write!(f, "{}", cell),
            Token::Area(area) => write!(f, "{}", area),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Function { name, arg_count } => write!(f, "{}/{}", name, arg_count),
        }
    }
}
