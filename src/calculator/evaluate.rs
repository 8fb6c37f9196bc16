//! Exact arithmetic for a single pending binary operation.

use thiserror::Error;

use super::Operator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("division by zero")]
    DivisionByZero,
}

/// Parse an entry string as a float. Anything unparsable becomes NaN.
pub fn parse_operand(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Compute `a op b` exactly.
pub fn evaluate(a: &str, b: &str, op: Operator) -> Result<f64, CalcError> {
    let lhs = parse_operand(a);
    let rhs = parse_operand(b);
    match op {
        Operator::Add => Ok(lhs + rhs),
        Operator::Subtract => Ok(lhs - rhs),
        Operator::Multiply => Ok(lhs * rhs),
        Operator::Divide if rhs == 0.0 => Err(CalcError::DivisionByZero),
        Operator::Divide => Ok(lhs / rhs),
    }
}

/// Like [`evaluate`] but takes the operator as a raw symbol. An unknown symbol
/// yields the second operand unchanged.
pub fn evaluate_symbol(a: &str, b: &str, symbol: &str) -> Result<f64, CalcError> {
    match Operator::from_symbol(symbol) {
        Some(op) => evaluate(a, b, op),
        None => Ok(parse_operand(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_arithmetic() {
        assert_eq!(evaluate("5", "5", Operator::Add), Ok(10.0));
        assert_eq!(evaluate("3", "10", Operator::Subtract), Ok(-7.0));
        assert_eq!(evaluate("2.5", "4", Operator::Multiply), Ok(10.0));
        assert_eq!(evaluate("10", "4", Operator::Divide), Ok(2.5));
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        assert_eq!(evaluate("10", "0", Operator::Divide), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("10", "0.", Operator::Divide), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("0", "0", Operator::Divide), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn partial_entries_parse() {
        assert_eq!(parse_operand("7."), 7.0);
        assert_eq!(parse_operand("0.5"), 0.5);
        assert!(parse_operand("Error").is_nan());
    }

    #[test]
    fn unknown_symbol_returns_second_operand() {
        assert_eq!(evaluate_symbol("3", "9", "%"), Ok(9.0));
        assert_eq!(evaluate_symbol("3", "9", "×"), Ok(27.0));
    }
}
