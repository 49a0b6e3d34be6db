//! Unit expression registry
//!
//! Parses unit expressions such as `ohm * cm`, `cm ** 2/volt * second` or
//! `1/cm ** 3` into a base-unit conversion factor and a dimension vector.
//! Operators are evaluated left to right with juxtaposition meaning
//! multiplication, so `a / b * c` is `(a / b) * c`.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::sync::LazyLock;

use crate::{Error, Result};

/// Exponents over length, mass, time, current, temperature, amount, luminosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Dimension(pub [i8; 7]);

impl Dimension {
    pub const DIMENSIONLESS: Dimension = Dimension([0; 7]);

    pub fn is_dimensionless(&self) -> bool {
        self == &Self::DIMENSIONLESS
    }

    /// Exponents multiplied by `exponent`; `None` when one leaves the `i8` range
    pub fn checked_powi(self, exponent: i32) -> Option<Self> {
        let mut out = self.0;
        for e in out.iter_mut() {
            *e = i32::from(*e)
                .checked_mul(exponent)
                .and_then(|v| i8::try_from(v).ok())?;
        }
        Some(Dimension(out))
    }

    /// Exponents added pairwise; `None` on overflow
    pub fn checked_add(self, other: Dimension) -> Option<Self> {
        let mut out = self.0;
        for (lhs, rhs) in out.iter_mut().zip(other.0) {
            *lhs = lhs.checked_add(rhs)?;
        }
        Some(Dimension(out))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SYMBOLS: [&str; 7] = ["m", "kg", "s", "A", "K", "mol", "cd"];
        let parts: Vec<String> = SYMBOLS
            .iter()
            .zip(self.0.iter())
            .filter(|(_, e)| **e != 0)
            .map(|(s, e)| if *e == 1 { s.to_string() } else { format!("{}^{}", s, e) })
            .collect();
        if parts.is_empty() {
            write!(f, "dimensionless")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

/// Conversion of a unit expression to SI base units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitQuantity {
    /// Multiply a value in this unit by `factor` to get base units
    pub factor: f64,
    pub dimension: Dimension,
}

impl UnitQuantity {
    pub const ONE: UnitQuantity = UnitQuantity {
        factor: 1.0,
        dimension: Dimension::DIMENSIONLESS,
    };

    const fn new(factor: f64, dims: [i8; 7]) -> Self {
        Self {
            factor,
            dimension: Dimension(dims),
        }
    }

    fn scaled(self, factor: f64) -> Self {
        Self {
            factor: self.factor * factor,
            dimension: self.dimension,
        }
    }

    pub fn checked_powi(self, exponent: i32) -> Option<Self> {
        Some(Self {
            factor: self.factor.powi(exponent),
            dimension: self.dimension.checked_powi(exponent)?,
        })
    }

    pub fn checked_mul(self, rhs: UnitQuantity) -> Option<Self> {
        Some(Self {
            factor: self.factor * rhs.factor,
            dimension: self.dimension.checked_add(rhs.dimension)?,
        })
    }

    pub fn checked_div(self, rhs: UnitQuantity) -> Option<Self> {
        self.checked_mul(rhs.checked_powi(-1)?)
    }
}

// =============================================================================
// Unit and Prefix Tables
// =============================================================================

// [length, mass, time, current, temperature, amount, luminosity]
const METRE: UnitQuantity = UnitQuantity::new(1.0, [1, 0, 0, 0, 0, 0, 0]);
const GRAM: UnitQuantity = UnitQuantity::new(1e-3, [0, 1, 0, 0, 0, 0, 0]);
const SECOND: UnitQuantity = UnitQuantity::new(1.0, [0, 0, 1, 0, 0, 0, 0]);
const AMPERE: UnitQuantity = UnitQuantity::new(1.0, [0, 0, 0, 1, 0, 0, 0]);
const KELVIN: UnitQuantity = UnitQuantity::new(1.0, [0, 0, 0, 0, 1, 0, 0]);
const MOLE: UnitQuantity = UnitQuantity::new(1.0, [0, 0, 0, 0, 0, 1, 0]);
const CANDELA: UnitQuantity = UnitQuantity::new(1.0, [0, 0, 0, 0, 0, 0, 1]);
const VOLT: UnitQuantity = UnitQuantity::new(1.0, [2, 1, -3, -1, 0, 0, 0]);
const OHM: UnitQuantity = UnitQuantity::new(1.0, [2, 1, -3, -2, 0, 0, 0]);
const SIEMENS: UnitQuantity = UnitQuantity::new(1.0, [-2, -1, 3, 2, 0, 0, 0]);
const COULOMB: UnitQuantity = UnitQuantity::new(1.0, [0, 0, 1, 1, 0, 0, 0]);
const TESLA: UnitQuantity = UnitQuantity::new(1.0, [0, 1, -2, -1, 0, 0, 0]);
const WEBER: UnitQuantity = UnitQuantity::new(1.0, [2, 1, -2, -1, 0, 0, 0]);
const HENRY: UnitQuantity = UnitQuantity::new(1.0, [2, 1, -2, -2, 0, 0, 0]);
const FARAD: UnitQuantity = UnitQuantity::new(1.0, [-2, -1, 4, 2, 0, 0, 0]);
const WATT: UnitQuantity = UnitQuantity::new(1.0, [2, 1, -3, 0, 0, 0, 0]);
const JOULE: UnitQuantity = UnitQuantity::new(1.0, [2, 1, -2, 0, 0, 0, 0]);
const PASCAL: UnitQuantity = UnitQuantity::new(1.0, [-1, 1, -2, 0, 0, 0, 0]);
const HERTZ: UnitQuantity = UnitQuantity::new(1.0, [0, 0, -1, 0, 0, 0, 0]);
const AMPERE_PER_METRE: UnitQuantity = UnitQuantity::new(1.0, [-1, 0, 0, 1, 0, 0, 0]);

fn default_units() -> Vec<(&'static str, UnitQuantity)> {
    vec![
        ("m", METRE),
        ("meter", METRE),
        ("metre", METRE),
        ("g", GRAM),
        ("gram", GRAM),
        ("s", SECOND),
        ("sec", SECOND),
        ("second", SECOND),
        ("seconds", SECOND),
        ("min", SECOND.scaled(60.0)),
        ("minute", SECOND.scaled(60.0)),
        ("h", SECOND.scaled(3600.0)),
        ("hr", SECOND.scaled(3600.0)),
        ("hour", SECOND.scaled(3600.0)),
        ("A", AMPERE),
        ("amp", AMPERE),
        ("ampere", AMPERE),
        ("K", KELVIN),
        ("kelvin", KELVIN),
        ("mol", MOLE),
        ("cd", CANDELA),
        ("V", VOLT),
        ("volt", VOLT),
        ("ohm", OHM),
        ("Ohm", OHM),
        ("S", SIEMENS),
        ("siemens", SIEMENS),
        ("C", COULOMB),
        ("coulomb", COULOMB),
        ("T", TESLA),
        ("tesla", TESLA),
        ("G", TESLA.scaled(1e-4)),
        ("gauss", TESLA.scaled(1e-4)),
        ("Oe", AMPERE_PER_METRE.scaled(1000.0 / (4.0 * PI))),
        ("oersted", AMPERE_PER_METRE.scaled(1000.0 / (4.0 * PI))),
        ("Wb", WEBER),
        ("weber", WEBER),
        ("H", HENRY),
        ("henry", HENRY),
        ("F", FARAD),
        ("farad", FARAD),
        ("W", WATT),
        ("watt", WATT),
        ("J", JOULE),
        ("joule", JOULE),
        ("Pa", PASCAL),
        ("pascal", PASCAL),
        ("Hz", HERTZ),
        ("hertz", HERTZ),
        ("%", UnitQuantity::ONE.scaled(0.01)),
        ("percent", UnitQuantity::ONE.scaled(0.01)),
        ("dimensionless", UnitQuantity::ONE),
    ]
}

/// Name prefixes are tried before symbol prefixes
const PREFIXES: &[(&str, f64)] = &[
    ("pico", 1e-12),
    ("nano", 1e-9),
    ("micro", 1e-6),
    ("milli", 1e-3),
    ("centi", 1e-2),
    ("kilo", 1e3),
    ("mega", 1e6),
    ("giga", 1e9),
    ("p", 1e-12),
    ("n", 1e-9),
    ("u", 1e-6),
    ("m", 1e-3),
    ("c", 1e-2),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
];

static DEFAULT_REGISTRY: LazyLock<UnitRegistry> = LazyLock::new(UnitRegistry::new);

/// Shared registry with the default unit table
pub fn registry() -> &'static UnitRegistry {
    &DEFAULT_REGISTRY
}

// =============================================================================
// Registry
// =============================================================================

/// Known units and the expression parser over them
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: HashMap<&'static str, UnitQuantity>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self {
            units: default_units().into_iter().collect(),
        }
    }

    /// Look up a single unit symbol or name, applying an SI prefix if needed
    pub fn lookup(&self, symbol: &str) -> Option<UnitQuantity> {
        if let Some(unit) = self.units.get(symbol) {
            return Some(*unit);
        }
        PREFIXES.iter().find_map(|(prefix, factor)| {
            symbol
                .strip_prefix(prefix)
                .filter(|rest| !rest.is_empty())
                .and_then(|rest| self.units.get(rest))
                .map(|unit| unit.scaled(*factor))
        })
    }

    /// Parse a unit expression
    pub fn parse(&self, expression: &str) -> Result<UnitQuantity> {
        let tokens = tokenize(expression)?;
        if tokens.is_empty() {
            return Err(Error::unit(expression, "empty unit expression"));
        }
        let mut parser = ExpressionParser {
            registry: self,
            source: expression,
            tokens,
            position: 0,
        };
        let quantity = parser.expression()?;
        if parser.position != parser.tokens.len() {
            return Err(Error::unit(
                expression,
                format!("unexpected '{}'", parser.tokens[parser.position]),
            ));
        }
        Ok(quantity)
    }

    /// Factor converting a value in `expression` to SI base units
    pub fn base_factor(&self, expression: &str) -> Result<f64> {
        self.parse(expression).map(|q| q.factor)
    }
}

// =============================================================================
// Expression Parsing
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Mul,
    Div,
    Pow,
    Minus,
    Plus,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Mul => write!(f, "*"),
            Token::Div => write!(f, "/"),
            Token::Pow => write!(f, "**"),
            Token::Minus => write!(f, "-"),
            Token::Plus => write!(f, "+"),
            Token::Open => write!(f, "("),
            Token::Close => write!(f, ")"),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '%'
}

fn tokenize(expression: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = expression.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Pow);
                i += 2;
            }
            '*' | '·' => {
                tokens.push(Token::Mul);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Pow);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Div);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '(' => {
                tokens.push(Token::Open);
                i += 1;
            }
            ')' => {
                tokens.push(Token::Close);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let number = text
                    .parse::<f64>()
                    .map_err(|_| Error::unit(expression, format!("invalid number '{}'", text)))?;
                tokens.push(Token::Number(number));
            }
            c if is_ident_char(c) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));

                // `cm2` and `cm-3` carry their exponent inline
                let sign_len = usize::from(chars.get(i) == Some(&'-'));
                if chars.get(i + sign_len).is_some_and(|c| c.is_ascii_digit()) {
                    tokens.push(Token::Pow);
                    if sign_len == 1 {
                        tokens.push(Token::Minus);
                        i += 1;
                    }
                }
            }
            other => {
                return Err(Error::unit(
                    expression,
                    format!("unexpected character '{}'", other),
                ));
            }
        }
    }

    Ok(tokens)
}

struct ExpressionParser<'a> {
    registry: &'a UnitRegistry,
    source: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl ExpressionParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::unit(self.source, message)
    }

    fn overflow(&self) -> Error {
        self.error("dimension exponent out of range")
    }

    /// term (('*' | '/' | juxtaposition) term)*
    fn expression(&mut self) -> Result<UnitQuantity> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Mul) => {
                    self.position += 1;
                    let rhs = self.term()?;
                    value = value.checked_mul(rhs).ok_or_else(|| self.overflow())?;
                }
                Some(Token::Div) => {
                    self.position += 1;
                    let rhs = self.term()?;
                    value = value.checked_div(rhs).ok_or_else(|| self.overflow())?;
                }
                Some(Token::Number(_)) | Some(Token::Ident(_)) | Some(Token::Open) => {
                    let rhs = self.term()?;
                    value = value.checked_mul(rhs).ok_or_else(|| self.overflow())?;
                }
                _ => return Ok(value),
            }
        }
    }

    /// factor ('**' signed_integer)?
    fn term(&mut self) -> Result<UnitQuantity> {
        let base = self.factor()?;
        if self.peek() != Some(&Token::Pow) {
            return Ok(base);
        }
        self.position += 1;

        let sign = match self.peek() {
            Some(Token::Minus) => {
                self.position += 1;
                -1
            }
            Some(Token::Plus) => {
                self.position += 1;
                1
            }
            _ => 1,
        };
        match self.next() {
            Some(Token::Number(n)) if n.fract() == 0.0 => {
                if n > f64::from(i32::MAX) {
                    return Err(self.error(format!("exponent {} is too large", n)));
                }
                base.checked_powi(sign * n as i32).ok_or_else(|| self.overflow())
            }
            Some(token) => Err(self.error(format!("exponent must be an integer, got '{}'", token))),
            None => Err(self.error("missing exponent")),
        }
    }

    fn factor(&mut self) -> Result<UnitQuantity> {
        match self.next() {
            Some(Token::Number(n)) => Ok(UnitQuantity::ONE.scaled(n)),
            Some(Token::Ident(name)) => self
                .registry
                .lookup(&name)
                .ok_or_else(|| self.error(format!("unknown unit '{}'", name))),
            Some(Token::Open) => {
                let inner = self.expression()?;
                match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(self.error("unbalanced parentheses")),
                }
            }
            Some(token) => Err(self.error(format!("unexpected '{}'", token))),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}
