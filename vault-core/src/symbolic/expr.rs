//! Expression AST: construction helpers, simplification, symbolic
//! differentiation, and numeric evaluation.

use std::fmt;

use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, One, Signed, Zero};

/// Unary functions the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Exp => "exp",
            Func::Ln => "ln",
            Func::Sqrt => "sqrt",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Func::Sin),
            "cos" => Some(Func::Cos),
            "tan" => Some(Func::Tan),
            "exp" => Some(Func::Exp),
            "ln" => Some(Func::Ln),
            "sqrt" => Some(Func::Sqrt),
            _ => None,
        }
    }

    fn apply(self, v: f64) -> f64 {
        match self {
            Func::Sin => v.sin(),
            Func::Cos => v.cos(),
            Func::Tan => v.tan(),
            Func::Exp => v.exp(),
            Func::Ln => v.ln(),
            Func::Sqrt => v.sqrt(),
        }
    }
}

/// An algebraic expression in the single variable `x`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(Rational64),
    Var,
    Pi,
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Fun(Func, Box<Expr>),
}

impl Expr {
    pub fn int(n: i64) -> Expr {
        Expr::Num(Rational64::from_integer(n))
    }

    pub fn add(a: Expr, b: Expr) -> Expr {
        Expr::Add(Box::new(a), Box::new(b))
    }

    pub fn sub(a: Expr, b: Expr) -> Expr {
        Expr::Sub(Box::new(a), Box::new(b))
    }

    pub fn mul(a: Expr, b: Expr) -> Expr {
        Expr::Mul(Box::new(a), Box::new(b))
    }

    pub fn div(a: Expr, b: Expr) -> Expr {
        Expr::Div(Box::new(a), Box::new(b))
    }

    pub fn pow(a: Expr, b: Expr) -> Expr {
        Expr::Pow(Box::new(a), Box::new(b))
    }

    pub fn neg(a: Expr) -> Expr {
        Expr::Neg(Box::new(a))
    }

    pub fn fun(f: Func, a: Expr) -> Expr {
        Expr::Fun(f, Box::new(a))
    }

    fn as_num(&self) -> Option<Rational64> {
        match self {
            Expr::Num(r) => Some(*r),
            _ => None,
        }
    }

    /// First symbolic derivative with respect to `x`.
    pub fn diff(&self) -> Expr {
        match self {
            Expr::Num(_) | Expr::Pi => Expr::int(0),
            Expr::Var => Expr::int(1),
            Expr::Add(a, b) => Expr::add(a.diff(), b.diff()),
            Expr::Sub(a, b) => Expr::sub(a.diff(), b.diff()),
            Expr::Neg(a) => Expr::neg(a.diff()),
            Expr::Mul(a, b) => Expr::add(
                Expr::mul(a.diff(), (**b).clone()),
                Expr::mul((**a).clone(), b.diff()),
            ),
            Expr::Div(a, b) => Expr::div(
                Expr::sub(
                    Expr::mul(a.diff(), (**b).clone()),
                    Expr::mul((**a).clone(), b.diff()),
                ),
                Expr::pow((**b).clone(), Expr::int(2)),
            ),
            Expr::Pow(base, exp) => match exp.as_num() {
                // power rule: d(u^n) = n * u^(n-1) * u'
                Some(n) => Expr::mul(
                    Expr::mul(
                        Expr::Num(n),
                        Expr::pow((**base).clone(), Expr::Num(n - Rational64::one())),
                    ),
                    base.diff(),
                ),
                // general case: d(u^v) = u^v * (v' ln u + v u'/u)
                None => Expr::mul(
                    self.clone(),
                    Expr::add(
                        Expr::mul(exp.diff(), Expr::fun(Func::Ln, (**base).clone())),
                        Expr::div(
                            Expr::mul((**exp).clone(), base.diff()),
                            (**base).clone(),
                        ),
                    ),
                ),
            },
            Expr::Fun(f, u) => {
                let du = u.diff();
                let u = (**u).clone();
                match f {
                    Func::Sin => Expr::mul(Expr::fun(Func::Cos, u), du),
                    Func::Cos => Expr::neg(Expr::mul(Expr::fun(Func::Sin, u), du)),
                    Func::Tan => Expr::div(
                        du,
                        Expr::pow(Expr::fun(Func::Cos, u), Expr::int(2)),
                    ),
                    Func::Exp => Expr::mul(Expr::fun(Func::Exp, u), du),
                    Func::Ln => Expr::div(du, u),
                    Func::Sqrt => Expr::div(
                        du,
                        Expr::mul(Expr::int(2), Expr::fun(Func::Sqrt, u)),
                    ),
                }
            }
        }
    }

    /// Constant folding and identity elimination. Not a full canonical
    /// form — polynomial expressions get that from `Poly` instead.
    ///
    /// Folding uses checked arithmetic: a constant subtree whose value
    /// would overflow `i64` is left unfolded rather than panicking.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Add(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                match (a.as_num(), b.as_num()) {
                    (Some(x), Some(y)) => match x.checked_add(&y) {
                        Some(v) => Expr::Num(v),
                        None => Expr::add(a, b),
                    },
                    (Some(x), None) if x.is_zero() => b,
                    (None, Some(y)) if y.is_zero() => a,
                    _ => Expr::add(a, b),
                }
            }
            Expr::Sub(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                if a == b {
                    return Expr::int(0);
                }
                match (a.as_num(), b.as_num()) {
                    (Some(x), Some(y)) => match x.checked_sub(&y) {
                        Some(v) => Expr::Num(v),
                        None => Expr::sub(a, b),
                    },
                    (None, Some(y)) if y.is_zero() => a,
                    (Some(x), None) if x.is_zero() => Expr::neg(b).simplify(),
                    _ => Expr::sub(a, b),
                }
            }
            Expr::Mul(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                match (a.as_num(), b.as_num()) {
                    (Some(x), Some(y)) => match x.checked_mul(&y) {
                        Some(v) => Expr::Num(v),
                        None => Expr::mul(a, b),
                    },
                    (Some(x), _) if x.is_zero() => Expr::int(0),
                    (_, Some(y)) if y.is_zero() => Expr::int(0),
                    (Some(x), None) if x.is_one() => b,
                    (None, Some(y)) if y.is_one() => a,
                    _ => Expr::mul(a, b),
                }
            }
            Expr::Div(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                match (a.as_num(), b.as_num()) {
                    // checked_div also declines division by zero
                    (Some(x), Some(y)) => match x.checked_div(&y) {
                        Some(v) => Expr::Num(v),
                        None => Expr::div(a, b),
                    },
                    (Some(x), None) if x.is_zero() => Expr::int(0),
                    (None, Some(y)) if y.is_one() => a,
                    _ => Expr::div(a, b),
                }
            }
            Expr::Pow(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                if let Some(y) = b.as_num() {
                    if y.is_zero() {
                        return Expr::int(1);
                    }
                    if y.is_one() {
                        return a;
                    }
                    if let Some(x) = a.as_num() {
                        if y.is_integer() && y.numer().unsigned_abs() <= 16 {
                            if let Some(v) = checked_rat_pow(x, *y.numer()) {
                                return Expr::Num(v);
                            }
                        }
                    }
                }
                if a.as_num().map(|x| x.is_one()).unwrap_or(false) {
                    return Expr::int(1);
                }
                Expr::pow(a, b)
            }
            Expr::Neg(a) => {
                let a = a.simplify();
                match a {
                    Expr::Num(x) => match x.checked_mul(&Rational64::from_integer(-1)) {
                        Some(v) => Expr::Num(v),
                        None => Expr::neg(Expr::Num(x)),
                    },
                    Expr::Neg(inner) => *inner,
                    _ => Expr::neg(a),
                }
            }
            Expr::Fun(f, a) => Expr::fun(*f, a.simplify()),
            _ => self.clone(),
        }
    }

    /// Numeric evaluation at a concrete `x`. Domain errors surface as
    /// non-finite values for the sampling path to detect.
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Num(r) => rat_to_f64(*r),
            Expr::Var => x,
            Expr::Pi => std::f64::consts::PI,
            Expr::Add(a, b) => a.eval(x) + b.eval(x),
            Expr::Sub(a, b) => a.eval(x) - b.eval(x),
            Expr::Mul(a, b) => a.eval(x) * b.eval(x),
            Expr::Div(a, b) => a.eval(x) / b.eval(x),
            Expr::Pow(a, b) => a.eval(x).powf(b.eval(x)),
            Expr::Neg(a) => -a.eval(x),
            Expr::Fun(f, a) => f.apply(a.eval(x)),
        }
    }

    fn prec(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(..) => 2,
            Expr::Pow(..) => 3,
            Expr::Num(r) => {
                if r.is_negative() {
                    2
                } else if !r.is_integer() {
                    2
                } else {
                    4
                }
            }
            _ => 4,
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        let prec = self.prec();
        if prec < parent {
            write!(f, "(")?;
        }
        match self {
            Expr::Num(r) => write!(f, "{}", rat_str(*r))?,
            Expr::Var => write!(f, "x")?,
            Expr::Pi => write!(f, "pi")?,
            Expr::Add(a, b) => {
                a.fmt_prec(f, 1)?;
                // render "a + -c" as "a - c"
                match &**b {
                    Expr::Neg(inner) => {
                        write!(f, " - ")?;
                        inner.fmt_prec(f, 2)?;
                    }
                    Expr::Num(r) if r.is_negative() => {
                        write!(f, " - {}", rat_str(-*r))?;
                    }
                    other => {
                        write!(f, " + ")?;
                        other.fmt_prec(f, 1)?;
                    }
                }
            }
            Expr::Sub(a, b) => {
                a.fmt_prec(f, 1)?;
                write!(f, " - ")?;
                b.fmt_prec(f, 2)?;
            }
            Expr::Mul(a, b) => {
                a.fmt_prec(f, 2)?;
                write!(f, "*")?;
                b.fmt_prec(f, 2)?;
            }
            Expr::Div(a, b) => {
                a.fmt_prec(f, 2)?;
                write!(f, "/")?;
                b.fmt_prec(f, 3)?;
            }
            Expr::Pow(a, b) => {
                a.fmt_prec(f, 4)?;
                write!(f, "**")?;
                b.fmt_prec(f, 3)?;
            }
            Expr::Neg(a) => {
                write!(f, "-")?;
                a.fmt_prec(f, 3)?;
            }
            Expr::Fun(func, a) => {
                write!(f, "{}({})", func.name(), a)?;
            }
        }
        if prec < parent {
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}

/// Integer power of a rational, by repeated checked multiplication.
/// `None` on overflow or `0 ** -n`.
pub(crate) fn checked_rat_pow(base: Rational64, exp: i64) -> Option<Rational64> {
    let mut acc = Rational64::one();
    for _ in 0..exp.unsigned_abs() {
        acc = acc.checked_mul(&base)?;
    }
    if exp < 0 {
        Rational64::one().checked_div(&acc)
    } else {
        Some(acc)
    }
}

pub(crate) fn rat_to_f64(r: Rational64) -> f64 {
    (*r.numer() as f64) / (*r.denom() as f64)
}

/// Plain-text rendering: "4", "-3", "1/2".
pub(crate) fn rat_str(r: Rational64) -> String {
    if r.is_integer() {
        r.numer().to_string()
    } else {
        format!("{}/{}", r.numer(), r.denom())
    }
}
