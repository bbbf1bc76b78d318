//! Rational polynomial normal form and exact root finding.

use std::fmt;

use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, One, Signed, Zero};

use super::expr::{rat_str, Expr};
use super::SymbolicError;

/// Why an expression has no polynomial normal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyError {
    /// Contains a function, `pi`, a non-constant divisor, or a
    /// non-integer/negative/oversized exponent.
    NotPolynomial,
    /// A coefficient overflowed 64-bit exact arithmetic.
    TooLarge,
}

pub(crate) fn too_large_error() -> SymbolicError {
    SymbolicError::Unsupported("coefficients too large for exact arithmetic".to_string())
}

/// A polynomial in `x` with exact rational coefficients, ascending order.
/// Canonical: no trailing zero coefficients; the zero polynomial is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poly(Vec<Rational64>);

impl Poly {
    pub fn zero() -> Self {
        Poly(Vec::new())
    }

    pub fn constant(c: Rational64) -> Self {
        Poly(vec![c]).normalized()
    }

    pub fn var() -> Self {
        Poly(vec![Rational64::zero(), Rational64::one()])
    }

    fn normalized(mut self) -> Self {
        while self.0.last().map(|c| c.is_zero()).unwrap_or(false) {
            self.0.pop();
        }
        self
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Degree, or `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.0.len().checked_sub(1)
    }

    pub fn coeff(&self, i: usize) -> Rational64 {
        self.0.get(i).copied().unwrap_or_else(Rational64::zero)
    }

    /// Checked coefficient arithmetic throughout: `None` means a
    /// coefficient overflowed `i64`, never a wrong answer.
    pub fn add(&self, other: &Poly) -> Option<Poly> {
        let len = self.0.len().max(other.0.len());
        let mut coeffs = Vec::with_capacity(len);
        for i in 0..len {
            coeffs.push(self.coeff(i).checked_add(&other.coeff(i))?);
        }
        Some(Poly(coeffs).normalized())
    }

    pub fn sub(&self, other: &Poly) -> Option<Poly> {
        self.add(&other.neg()?)
    }

    pub fn neg(&self) -> Option<Poly> {
        let minus_one = Rational64::from_integer(-1);
        let coeffs: Option<Vec<Rational64>> =
            self.0.iter().map(|c| c.checked_mul(&minus_one)).collect();
        Some(Poly(coeffs?))
    }

    pub fn mul(&self, other: &Poly) -> Option<Poly> {
        if self.is_zero() || other.is_zero() {
            return Some(Poly::zero());
        }
        let mut coeffs = vec![Rational64::zero(); self.0.len() + other.0.len() - 1];
        for (i, a) in self.0.iter().enumerate() {
            for (j, b) in other.0.iter().enumerate() {
                let term = a.checked_mul(b)?;
                coeffs[i + j] = coeffs[i + j].checked_add(&term)?;
            }
        }
        Some(Poly(coeffs).normalized())
    }

    pub fn scale(&self, k: Rational64) -> Option<Poly> {
        let coeffs: Option<Vec<Rational64>> =
            self.0.iter().map(|c| c.checked_mul(&k)).collect();
        Some(Poly(coeffs?).normalized())
    }

    pub fn pow(&self, n: u32) -> Option<Poly> {
        let mut acc = Poly::constant(Rational64::one());
        for _ in 0..n {
            acc = acc.mul(self)?;
        }
        Some(acc)
    }

    /// Convert an expression to polynomial normal form.
    ///
    /// `NotPolynomial` covers functions, `pi`, division by a non-constant,
    /// and non-integer/negative exponents; `TooLarge` means a coefficient
    /// overflowed exact 64-bit arithmetic along the way.
    pub fn from_expr(e: &Expr) -> Result<Poly, PolyError> {
        match e {
            Expr::Num(r) => Ok(Poly::constant(*r)),
            Expr::Var => Ok(Poly::var()),
            Expr::Pi => Err(PolyError::NotPolynomial),
            Expr::Add(a, b) => Poly::from_expr(a)?
                .add(&Poly::from_expr(b)?)
                .ok_or(PolyError::TooLarge),
            Expr::Sub(a, b) => Poly::from_expr(a)?
                .sub(&Poly::from_expr(b)?)
                .ok_or(PolyError::TooLarge),
            Expr::Neg(a) => Poly::from_expr(a)?.neg().ok_or(PolyError::TooLarge),
            Expr::Mul(a, b) => Poly::from_expr(a)?
                .mul(&Poly::from_expr(b)?)
                .ok_or(PolyError::TooLarge),
            Expr::Div(a, b) => {
                let divisor = Poly::from_expr(b)?;
                if divisor.degree() == Some(0) {
                    let inv = Rational64::one()
                        .checked_div(&divisor.coeff(0))
                        .ok_or(PolyError::TooLarge)?;
                    Poly::from_expr(a)?.scale(inv).ok_or(PolyError::TooLarge)
                } else {
                    Err(PolyError::NotPolynomial)
                }
            }
            Expr::Pow(base, exp) => match **exp {
                Expr::Num(n) if n.is_integer() && !n.is_negative() && *n.numer() <= 12 => {
                    Poly::from_expr(base)?
                        .pow(*n.numer() as u32)
                        .ok_or(PolyError::TooLarge)
                }
                _ => Err(PolyError::NotPolynomial),
            },
            Expr::Fun(..) => Err(PolyError::NotPolynomial),
        }
    }
}

impl fmt::Display for Poly {
    /// Descending-power rendering: "x**2 - 4", "2*x + 3", "0".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut first = true;
        for k in (0..self.0.len()).rev() {
            let c = self.coeff(k);
            if c.is_zero() {
                continue;
            }
            if first {
                if c.is_negative() {
                    write!(f, "-")?;
                }
                first = false;
            } else if c.is_negative() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            let mag = c.abs();
            match k {
                0 => write!(f, "{}", rat_str(mag))?,
                _ => {
                    if !mag.is_one() {
                        write!(f, "{}*", rat_str(mag))?;
                    }
                    if k == 1 {
                        write!(f, "x")?;
                    } else {
                        write!(f, "x**{}", k)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// One root of a polynomial: exact rational, or a symbolic rendering when
/// the root is irrational.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Root {
    Exact(Rational64),
    Symbolic(String),
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Root::Exact(r) => write!(f, "{}", rat_str(*r)),
            Root::Symbolic(s) => write!(f, "{}", s),
        }
    }
}

/// Solution set of `p(x) = 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solutions {
    /// Zero, one, or two roots, ascending where comparable.
    Roots(Vec<Root>),
    /// The equation holds for every x (0 = 0).
    AllReals,
}

/// Solve `p(x) = 0` exactly for degree <= 2.
pub fn solve(p: &Poly) -> Result<Solutions, SymbolicError> {
    match p.degree() {
        None => Ok(Solutions::AllReals),
        Some(0) => Ok(Solutions::Roots(Vec::new())),
        Some(1) => {
            let root = p
                .coeff(0)
                .checked_div(&p.coeff(1))
                .and_then(|q| q.checked_mul(&Rational64::from_integer(-1)))
                .ok_or_else(too_large_error)?;
            Ok(Solutions::Roots(vec![Root::Exact(root)]))
        }
        Some(2) => solve_quadratic(p.coeff(2), p.coeff(1), p.coeff(0))
            .map(Solutions::Roots)
            .ok_or_else(too_large_error),
        Some(n) => Err(SymbolicError::Unsupported(format!(
            "solving degree {} equations is not supported",
            n
        ))),
    }
}

/// `None` means an intermediate value overflowed exact arithmetic.
fn solve_quadratic(a: Rational64, b: Rational64, c: Rational64) -> Option<Vec<Root>> {
    let four = Rational64::from_integer(4);
    let two = Rational64::from_integer(2);
    let minus_one = Rational64::from_integer(-1);
    let disc = b
        .checked_mul(&b)?
        .checked_sub(&four.checked_mul(&a)?.checked_mul(&c)?)?;

    if disc.is_negative() {
        // no real roots
        return Some(Vec::new());
    }
    let den = two.checked_mul(&a)?;
    let neg_b = b.checked_mul(&minus_one)?;
    if disc.is_zero() {
        return Some(vec![Root::Exact(neg_b.checked_div(&den)?)]);
    }

    if let Some(r) = sqrt_rational(disc) {
        let mut roots = vec![
            Root::Exact(neg_b.checked_sub(&r)?.checked_div(&den)?),
            Root::Exact(neg_b.checked_add(&r)?.checked_div(&den)?),
        ];
        roots.sort();
        return Some(roots);
    }

    // irrational roots: (-b +/- sqrt(disc)) / (2a), rendered as
    // (A +/- B*sqrt(m))/D with the square factor pulled out of the radical
    let u = neg_b.checked_div(&den)?;
    // sqrt(P/Q) = sqrt(P*Q)/Q
    let (s, m) = sqrt_factor(disc.numer().checked_mul(disc.denom())?);
    let v = Rational64::new(s, *disc.denom()).checked_div(&den)?.abs();

    let dcom = checked_lcm(*u.denom(), *v.denom())?;
    let a_int = u.numer().checked_mul(&(dcom / *u.denom()))?;
    let b_int = v.numer().checked_mul(&(dcom / *v.denom()))?;

    let render = |sign: char| -> String {
        let radical = if b_int == 1 {
            format!("sqrt({})", m)
        } else {
            format!("{}*sqrt({})", b_int, m)
        };
        let core = if a_int == 0 {
            if sign == '-' {
                format!("-{}", radical)
            } else {
                radical
            }
        } else {
            format!("{} {} {}", a_int, sign, radical)
        };
        if dcom == 1 {
            core
        } else if a_int == 0 {
            format!("{}/{}", core, dcom)
        } else {
            format!("({})/{}", core, dcom)
        }
    };
    Some(vec![Root::Symbolic(render('-')), Root::Symbolic(render('+'))])
}

/// Trial division stops here so one query cannot spin for billions of
/// iterations on a large prime radicand.
const SQUARE_FACTOR_BOUND: i64 = 1 << 16;

/// Factor `n >= 0` as `s*s * m`; returns `(s, m)`. `m` is square-free up
/// to `SQUARE_FACTOR_BOUND`; larger square factors stay under the radical.
fn sqrt_factor(n: i64) -> (i64, i64) {
    let mut s = 1i64;
    let mut m = n;
    let mut p = 2i64;
    while p <= SQUARE_FACTOR_BOUND && p * p <= m {
        while m % (p * p) == 0 {
            m /= p * p;
            s *= p;
        }
        p += 1;
    }
    (s, m)
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

fn checked_lcm(a: i64, b: i64) -> Option<i64> {
    (a / gcd(a, b)).checked_mul(b)
}

/// Exact square root of a nonnegative rational, when one exists.
fn sqrt_rational(r: Rational64) -> Option<Rational64> {
    let n = isqrt(*r.numer())?;
    let d = isqrt(*r.denom())?;
    Some(Rational64::new(n, d))
}

fn isqrt(n: i64) -> Option<i64> {
    if n < 0 {
        return None;
    }
    let guess = (n as f64).sqrt().round() as i64;
    for cand in guess.saturating_sub(1)..=guess + 1 {
        if cand >= 0 && cand.checked_mul(cand) == Some(n) {
            return Some(cand);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse;

    fn rat(n: i64) -> Rational64 {
        Rational64::from_integer(n)
    }

    fn poly_of(src: &str) -> Poly {
        Poly::from_expr(&parse(src).unwrap()).unwrap()
    }

    #[test]
    fn expands_products_into_normal_form() {
        let p = poly_of("(x+1)*(x-1)");
        assert_eq!(p.to_string(), "x**2 - 1");
        let p = poly_of("(x+2)**2");
        assert_eq!(p.to_string(), "x**2 + 4*x + 4");
    }

    #[test]
    fn division_by_constant_scales_coefficients() {
        let p = poly_of("(2*x + 4)/2");
        assert_eq!(p.to_string(), "x + 2");
    }

    #[test]
    fn division_by_x_is_not_polynomial() {
        for src in ["1/x", "x**-1", "sin(x)", "pi*x"] {
            assert_eq!(
                Poly::from_expr(&parse(src).unwrap()),
                Err(PolyError::NotPolynomial),
                "{}",
                src
            );
        }
    }

    #[test]
    fn coefficient_overflow_is_an_error_not_a_panic() {
        // 99999**9 does not fit in an i64
        assert_eq!(
            Poly::from_expr(&parse("99999**9").unwrap()),
            Err(PolyError::TooLarge)
        );
        assert_eq!(
            Poly::from_expr(&parse("9000000000000000000 + 9000000000000000000").unwrap()),
            Err(PolyError::TooLarge)
        );
    }

    #[test]
    fn display_handles_signs_and_unit_coefficients() {
        assert_eq!(poly_of("x").to_string(), "x");
        assert_eq!(poly_of("-x").to_string(), "-x");
        assert_eq!(poly_of("0*x").to_string(), "0");
        assert_eq!(poly_of("x**2 - x - 1").to_string(), "x**2 - x - 1");
        assert_eq!(poly_of("x/2 + 1").to_string(), "1/2*x + 1");
    }

    #[test]
    fn linear_root_is_exact() {
        let p = poly_of("2*x - 8");
        assert_eq!(
            solve(&p).unwrap(),
            Solutions::Roots(vec![Root::Exact(rat(4))])
        );
    }

    #[test]
    fn double_root_is_reported_once() {
        let p = poly_of("x**2 - 2*x + 1");
        assert_eq!(
            solve(&p).unwrap(),
            Solutions::Roots(vec![Root::Exact(rat(1))])
        );
    }

    #[test]
    fn rational_roots_from_perfect_square_discriminant() {
        // 2*x**2 - x - 1 = 0 -> x = -1/2, 1
        let p = poly_of("2*x**2 - x - 1");
        assert_eq!(
            solve(&p).unwrap(),
            Solutions::Roots(vec![
                Root::Exact(Rational64::new(-1, 2)),
                Root::Exact(rat(1)),
            ])
        );
    }

    #[test]
    fn irrational_roots_render_with_sqrt() {
        let p = poly_of("x**2 - 2");
        match solve(&p).unwrap() {
            Solutions::Roots(roots) => {
                let rendered: Vec<String> = roots.iter().map(|r| r.to_string()).collect();
                assert_eq!(rendered, vec!["-sqrt(2)", "sqrt(2)"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn golden_ratio_rendering() {
        let p = poly_of("x**2 - x - 1");
        match solve(&p).unwrap() {
            Solutions::Roots(roots) => {
                let rendered: Vec<String> = roots.iter().map(|r| r.to_string()).collect();
                assert_eq!(rendered, vec!["(1 - sqrt(5))/2", "(1 + sqrt(5))/2"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn quadratic_with_overflowing_discriminant_is_an_error() {
        // b = 2e12 so b*b overflows during the discriminant computation
        let p = poly_of("(x+1000)**2 * 1000000000 - 1");
        let err = solve(&p).unwrap_err();
        assert!(err.to_string().contains("too large"), "{}", err);
    }

    #[test]
    fn large_prime_discriminant_solves_without_spinning() {
        // 999999999999999989 is prime; factoring must stop at the bound
        let p = poly_of("x**2 - 999999999999999989");
        match solve(&p).unwrap() {
            Solutions::Roots(roots) => {
                assert_eq!(roots.len(), 2);
                assert_eq!(roots[1].to_string(), "sqrt(999999999999999989)");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn square_factor_extraction_is_bounded() {
        assert_eq!(sqrt_factor(4), (2, 1));
        assert_eq!(sqrt_factor(8), (2, 2));
        assert_eq!(sqrt_factor(45), (3, 5));
        // prime beyond the trial-division bound stays under the radical
        assert_eq!(
            sqrt_factor(999_999_999_999_999_989),
            (1, 999_999_999_999_999_989)
        );
    }

    #[test]
    fn isqrt_detects_perfect_squares() {
        assert_eq!(isqrt(0), Some(0));
        assert_eq!(isqrt(16), Some(4));
        assert_eq!(isqrt(17), None);
        assert_eq!(isqrt(-4), None);
        assert_eq!(sqrt_rational(Rational64::new(9, 4)), Some(Rational64::new(3, 2)));
        assert_eq!(sqrt_rational(Rational64::new(1, 2)), None);
    }
}
