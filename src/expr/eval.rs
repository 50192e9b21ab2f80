use super::error::ExprError;
use super::parser::{BinaryOp, Expr};
use crate::record::Record;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Evaluate `expr` against the fields of `record`.
///
/// Arithmetic is carried out in exact decimals; field values are read as
/// `f64` and converted through their shortest decimal rendering.
pub fn eval_expr(expr: &Expr, record: &Record) -> Result<Decimal, ExprError> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Variable(name) => eval_variable(name, record),
        Expr::Paren(inner) => eval_expr(inner, record),
        Expr::Negate(inner) => Ok(-eval_expr(inner, record)?),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval_expr(lhs, record)?;
            let rhs = eval_expr(rhs, record)?;
            apply(*op, lhs, rhs)
        }
    }
}

fn eval_variable(name: &str, record: &Record) -> Result<Decimal, ExprError> {
    let raw = record
        .get(name)
        .ok_or_else(|| ExprError::UnknownVariable(name.to_string()))?;

    let non_numeric = || ExprError::NonNumericVariable {
        name: name.to_string(),
        value: raw.to_string(),
    };

    let number = raw.parse::<f64>().map_err(|_| non_numeric())?;
    if !number.is_finite() {
        return Err(non_numeric());
    }
    let out_of_range = || ExprError::OutOfRange {
        name: name.to_string(),
        value: raw.to_string(),
    };

    // 28 fractional digits at most: tinier values would round to zero
    let value = Decimal::from_str(&number.to_string()).map_err(|_| out_of_range())?;
    if value.is_zero() && number != 0.0 {
        return Err(out_of_range());
    }
    Ok(value)
}

fn apply(op: BinaryOp, lhs: Decimal, rhs: Decimal) -> Result<Decimal, ExprError> {
    let result = match op {
        BinaryOp::Add => lhs.checked_add(rhs),
        BinaryOp::Sub => lhs.checked_sub(rhs),
        BinaryOp::Mul => lhs.checked_mul(rhs),
        BinaryOp::Div => {
            if rhs.is_zero() {
                return Err(ExprError::DivisionByZero);
            }
            lhs.checked_div(rhs)
        }
    };
    result.ok_or(ExprError::Overflow)
}

/// Canonical decimal rendering: no trailing zeros, no negative zero
pub fn render(value: Decimal) -> String {
    value.normalize().to_string()
}
