//! Safe expression evaluation.
//!
//! Calculator notation is normalized, parsed by a small grammar that knows only
//! a fixed set of functions and constants, and evaluated numerically. Nothing
//! outside that grammar is ever resolved.

pub mod ast;
pub mod lexer;
pub mod normalize;
pub mod parser;

use crate::{errors::ErrorKind, session::PLACEHOLDER};

pub use normalize::normalize;
pub use parser::parse;

/// Fractional digits kept when formatting a non-integral result.
const MAX_FRACTION_DIGITS: usize = 10;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("at {pos}: {message}")]
pub struct ParseError {
    pub pos: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(pos: usize, message: impl Into<String>) -> Self {
        Self {
            pos,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("invalid syntax {0}")]
    Syntax(#[from] ParseError),

    #[error("division by zero")]
    DivisionByZero,

    #[error("math domain error in {0}")]
    Domain(&'static str),

    #[error("result is not a finite number")]
    NonFinite,
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::Syntax(_) => ErrorKind::InvalidSyntax,
            EvalError::DivisionByZero => ErrorKind::DivisionByZero,
            EvalError::Domain(_) => ErrorKind::MathDomain,
            EvalError::NonFinite => ErrorKind::CalculationError,
        }
    }
}

/// Evaluate calculator notation to its display string.
///
/// Callers are expected to run [`crate::validator::validate`] first.
pub fn evaluate(expression: &str) -> Result<String, ErrorKind> {
    evaluate_detailed(expression).map_err(|e| {
        tracing::debug!(expression, error = %e, "evaluation failed");
        e.kind()
    })
}

/// Like [`evaluate`], keeping the internal failure detail.
pub fn evaluate_detailed(expression: &str) -> Result<String, EvalError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER {
        return Ok(PLACEHOLDER.to_string());
    }

    let normalized = normalize(trimmed);
    let value = parse(&normalized)?.eval()?;
    Ok(format_number(value))
}

/// Integral values print as integers; others keep up to ten fractional
/// digits without trailing zeros.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        if value == 0.0 {
            return PLACEHOLDER.to_string();
        }
        return format!("{value:.0}");
    }

    let fixed = format!("{value:.prec$}", prec = MAX_FRACTION_DIGITS);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(s: &str) -> String {
        evaluate(s).unwrap_or_else(|k| panic!("{s:?} failed with {k}"))
    }

    fn err(s: &str) -> ErrorKind {
        evaluate(s).expect_err(s)
    }

    #[test]
    fn placeholder_and_empty_are_zero() {
        assert_eq!(ok("0"), "0");
        assert_eq!(ok(""), "0");
        assert_eq!(ok("   "), "0");
    }

    #[test]
    fn basic_arithmetic() {
        assert_eq!(ok("2+2"), "4");
        assert_eq!(ok("(5+3)*2"), "16");
        assert_eq!(ok("7-10"), "-3");
        assert_eq!(ok("1/4"), "0.25");
        assert_eq!(ok("6×3÷2"), "9");
        assert_eq!(ok("0.1+0.2"), "0.3");
    }

    #[test]
    fn caret_and_double_star_agree() {
        assert_eq!(ok("2^3"), "8");
        assert_eq!(ok("2**3"), "8");
        assert_eq!(ok("-2^2"), "-4");
        assert_eq!(ok("2^-1"), "0.5");
        assert_eq!(ok("2^3^2"), "512");
    }

    #[test]
    fn factorial_and_functions() {
        assert_eq!(ok("5!"), "120");
        assert_eq!(ok("0!"), "1");
        assert_eq!(ok("3!+1"), "7");
        assert_eq!(ok("sqrt(25)"), "5");
        assert_eq!(ok("abs(-3)"), "3");
        assert_eq!(ok("log(100)"), "2");
        assert_eq!(ok("ln(e)"), "1");
        assert_eq!(ok("sin(0)"), "0");
        assert_eq!(ok("sin(pi)"), "0");
        assert_eq!(ok("factorial(4)"), "24");
    }

    #[test]
    fn pi_times_two_has_no_trailing_zeros() {
        let v = ok("pi*2");
        assert!(v.starts_with("6.28318"), "{v}");
        assert_eq!(v, "6.2831853072");
    }

    #[test]
    fn implicit_multiplication_with_constants() {
        assert_eq!(ok("2pi"), ok("2*pi"));
        assert_eq!(ok("pie"), ok("pi*e"));
        assert_eq!(ok("2(3+4)"), "14");
    }

    #[test]
    fn percent_divides_by_hundred() {
        assert_eq!(ok("50%"), "0.5");
        assert_eq!(ok("200×10%"), "20");
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(err("5/0"), ErrorKind::DivisionByZero);
        assert_eq!(err("5÷(2-2)"), ErrorKind::DivisionByZero);
        assert_eq!(err("0^-1"), ErrorKind::DivisionByZero);
    }

    #[test]
    fn math_domain() {
        assert_eq!(err("log(-1)"), ErrorKind::MathDomain);
        assert_eq!(err("ln(0)"), ErrorKind::MathDomain);
        assert_eq!(err("sqrt(-4)"), ErrorKind::MathDomain);
        assert_eq!(err("factorial(-1)"), ErrorKind::MathDomain);
        assert_eq!(err("factorial(2.5)"), ErrorKind::MathDomain);
        assert_eq!(err("(-8)^0.5"), ErrorKind::MathDomain);
    }

    #[test]
    fn invalid_syntax() {
        for s in ["5+", "2**", "(1", "sin(", "x", "__import__('os')", "1.2.3", "!5", "5!("] {
            assert_eq!(err(s), ErrorKind::InvalidSyntax, "{s:?}");
        }
    }

    #[test]
    fn postfix_factorial_after_any_operand() {
        assert_eq!(ok("(3)!"), "6");
        assert_eq!(ok("(2+3)!"), "120");
        assert_eq!(ok("sqrt(9)!"), "6");
        assert_eq!(ok("3!!"), "720");
        assert_eq!(ok("2^3!"), "64");
        assert_eq!(err("pi!"), ErrorKind::MathDomain);
        assert_eq!(err("(0-1)!"), ErrorKind::MathDomain);
    }

    #[test]
    fn exponent_notation_is_not_supported() {
        // 2e3 reads as 2 * e * 3, never 2000.
        assert_eq!(ok("2e3"), ok("2*e*3"));
        assert_ne!(ok("2e3"), "2000");
    }

    #[test]
    fn long_sums_fail_cleanly() {
        let s = format!("{}1", "1+".repeat(20_000));
        assert_eq!(err(&s), ErrorKind::InvalidSyntax);
        let s = format!("{}1", "1+".repeat(99));
        assert_eq!(ok(&s), "100");
    }

    #[test]
    fn overflow_is_a_calculation_error() {
        assert_eq!(err("200!"), ErrorKind::CalculationError);
        assert_eq!(err("10^400"), ErrorKind::CalculationError);
    }

    #[test]
    fn detailed_errors_keep_the_cause() {
        assert_eq!(
            evaluate_detailed("sqrt(-1)"),
            Err(EvalError::Domain("sqrt"))
        );
        assert!(matches!(
            evaluate_detailed("1+"),
            Err(EvalError::Syntax(ParseError { .. }))
        ));
    }

    #[test]
    fn format_rules() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333");
        assert_eq!(format_number(2.00000000004), "2");
        assert_eq!(format_number(-1e-12), "0");
    }
}
