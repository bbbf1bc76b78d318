//! Symbolic math engine — exact algebra over expressions in `x`.
//!
//! Provides the capability behind the math evaluator:
//! - parsing of algebraic expressions (`parse`)
//! - symbolic first derivatives (`Expr::diff`)
//! - exact equation solving for polynomials up to degree 2 (`solve_equation`)
//! - numeric sampling for plotting (`sample_curve`)
//!
//! All coefficient arithmetic is exact rational (`num-rational`); floating
//! point appears only in the sampling path.

pub mod expr;
pub mod parser;
pub mod poly;

pub use expr::{Expr, Func};
pub use poly::{Poly, PolyError, Root, Solutions};

use thiserror::Error;

/// X range sampled for plotting: 101 points from -5.0 to 5.0, step 0.1.
pub const SAMPLE_MIN_TENTHS: i64 = -50;
pub const SAMPLE_MAX_TENTHS: i64 = 50;

#[derive(Error, Debug)]
pub enum SymbolicError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("f({x}) is not a finite number")]
    NonFinite { x: f64 },
}

/// Parse an algebraic expression in the variable `x`.
pub fn parse(input: &str) -> Result<Expr, SymbolicError> {
    parser::parse(input)
}

/// Solve `lhs = rhs` for `x` exactly.
///
/// Only polynomial equations of degree <= 2 are supported; anything else
/// is reported as an unsupported-form error for the caller to surface.
pub fn solve_equation(lhs: &Expr, rhs: &Expr) -> Result<Solutions, SymbolicError> {
    let p = equation_poly(lhs, rhs)?;
    poly::solve(&p)
}

/// The normal form `lhs - rhs` rendered as text, for explanation output.
pub fn normal_form(lhs: &Expr, rhs: &Expr) -> String {
    match equation_poly(lhs, rhs) {
        Ok(p) => p.to_string(),
        Err(_) => Expr::sub(lhs.clone(), rhs.clone()).simplify().to_string(),
    }
}

fn equation_poly(lhs: &Expr, rhs: &Expr) -> Result<Poly, SymbolicError> {
    let l = Poly::from_expr(lhs).map_err(poly_error)?;
    let r = Poly::from_expr(rhs).map_err(poly_error)?;
    l.sub(&r).ok_or_else(poly::too_large_error)
}

fn poly_error(e: PolyError) -> SymbolicError {
    match e {
        PolyError::NotPolynomial => SymbolicError::Unsupported(
            "only polynomial equations in x are supported".to_string(),
        ),
        PolyError::TooLarge => poly::too_large_error(),
    }
}

/// Render an expression in its simplest supported form: canonical
/// polynomial text when the expression is polynomial, otherwise the
/// constant-folded expression.
pub fn simplify_text(e: &Expr) -> String {
    match Poly::from_expr(e) {
        Ok(p) => p.to_string(),
        Err(_) => e.simplify().to_string(),
    }
}

/// Sample `f(x)` at 101 evenly spaced points in [-5.0, 5.0].
///
/// Any sample that is not a finite number (division by zero, log of a
/// nonpositive value, ...) aborts the whole plot.
pub fn sample_curve(f: &Expr) -> Result<Vec<(f64, f64)>, SymbolicError> {
    let mut points = Vec::with_capacity(101);
    for i in SAMPLE_MIN_TENTHS..=SAMPLE_MAX_TENTHS {
        let x = (i as f64) / 10.0;
        let y = f.eval(x);
        if !y.is_finite() {
            return Err(SymbolicError::NonFinite { x });
        }
        points.push((x, y));
    }
    Ok(points)
}
