use std::f64::consts;

use super::EvalError;

/// Largest `n` with a finite `n!` in `f64`.
const MAX_FACTORIAL: f64 = 170.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    /// Base 10.
    Log,
    Ln,
    Sqrt,
    Factorial,
    Abs,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Log => "log",
            Function::Ln => "ln",
            Function::Sqrt => "sqrt",
            Function::Factorial => "factorial",
            Function::Abs => "abs",
        }
    }

    fn apply(self, x: f64) -> Result<f64, EvalError> {
        let domain = || EvalError::Domain(self.name());
        match self {
            Function::Sin => Ok(x.sin()),
            Function::Cos => Ok(x.cos()),
            Function::Tan => Ok(x.tan()),
            Function::Log if x <= 0.0 => Err(domain()),
            Function::Log => Ok(x.log10()),
            Function::Ln if x <= 0.0 => Err(domain()),
            Function::Ln => Ok(x.ln()),
            Function::Sqrt if x < 0.0 => Err(domain()),
            Function::Sqrt => Ok(x.sqrt()),
            Function::Abs => Ok(x.abs()),
            Function::Factorial => factorial(x).ok_or_else(domain),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    fn value(self) -> f64 {
        match self {
            Constant::Pi => consts::PI,
            Constant::E => consts::E,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Num(f64),
    Const(Constant),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

impl Expr {
    pub fn eval(&self) -> Result<f64, EvalError> {
        let value = match self {
            Expr::Num(v) => *v,
            Expr::Const(c) => c.value(),
            Expr::Neg(inner) => -inner.eval()?,
            Expr::Call(f, arg) => f.apply(arg.eval()?)?,
            Expr::Binary(op, lhs, rhs) => binary(*op, lhs.eval()?, rhs.eval()?)?,
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NonFinite)
        }
    }
}

fn binary(op: BinOp, a: f64, b: f64) -> Result<f64, EvalError> {
    match op {
        BinOp::Add => Ok(a + b),
        BinOp::Sub => Ok(a - b),
        BinOp::Mul => Ok(a * b),
        BinOp::Div if b == 0.0 => Err(EvalError::DivisionByZero),
        BinOp::Div => Ok(a / b),
        BinOp::Pow if a == 0.0 && b < 0.0 => Err(EvalError::DivisionByZero),
        BinOp::Pow if a < 0.0 && b.fract() != 0.0 => Err(EvalError::Domain("pow")),
        BinOp::Pow => Ok(a.powf(b)),
    }
}

/// `n!` for non-negative integral `n`; `None` outside that domain.
fn factorial(n: f64) -> Option<f64> {
    if n < 0.0 || n.fract() != 0.0 {
        return None;
    }
    if n > MAX_FACTORIAL {
        return Some(f64::INFINITY);
    }
    Some((2..=n as u64).fold(1.0, |acc, k| acc * k as f64))
}
