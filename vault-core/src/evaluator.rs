//! Math evaluator — user-facing equation solving and differentiation.
//!
//! Total functions: every failure is rendered into the returned
//! (summary, deep dive) pair, never propagated. Without the `symbolic`
//! feature both operations answer in degraded mode instead of crashing,
//! mirroring the optional-capability contract.

use crate::error::VaultError;

#[cfg(feature = "symbolic")]
use crate::symbolic::{self, Solutions};

/// Whether symbolic math support was compiled in.
pub fn available() -> bool {
    cfg!(feature = "symbolic")
}

/// Solve an equation in `x`, or simplify a bare expression.
///
/// Input with `=` is split at the first occurrence into an equation;
/// input without is simplified, with guidance that solving needs an
/// equation. Parse failures come back as a recovered pair embedding the
/// parser diagnostic.
#[cfg(feature = "symbolic")]
pub fn solve(expression: &str) -> (String, String) {
    match solve_inner(expression) {
        Ok(pair) => pair,
        Err(e) => (
            "Could not parse equation".to_string(),
            format!(
                "Ensure a valid algebraic expression (e.g., '2*x+3=11'). Error: {}",
                e
            ),
        ),
    }
}

#[cfg(feature = "symbolic")]
fn solve_inner(expression: &str) -> Result<(String, String), symbolic::SymbolicError> {
    if let Some((left, right)) = expression.split_once('=') {
        let lhs = symbolic::parse(left)?;
        let rhs = symbolic::parse(right)?;
        let solutions = symbolic::solve_equation(&lhs, &rhs)?;
        let summary = match &solutions {
            Solutions::AllReals => "Solution: x = all real numbers".to_string(),
            Solutions::Roots(roots) => {
                let rendered: Vec<String> = roots.iter().map(|r| r.to_string()).collect();
                format!("Solution: x = [{}]", rendered.join(", "))
            }
        };
        let deep = format!(
            "Simplified equation: {} = 0\nSolved with exact rational arithmetic; no floating point is involved.",
            symbolic::normal_form(&lhs, &rhs)
        );
        Ok((summary, deep))
    } else {
        let expr = symbolic::parse(expression)?;
        Ok((
            format!("Simplified: {}", symbolic::simplify_text(&expr)),
            "Provide an equation with '=' to solve for x, e.g., '2*x+3=11'.".to_string(),
        ))
    }
}

/// Compute the first derivative of an expression in `x`.
#[cfg(feature = "symbolic")]
pub fn differentiate(expression: &str) -> (String, String) {
    match symbolic::parse(expression) {
        Ok(f) => {
            let df = f.diff();
            (
                format!("Derivative df/dx: {}", symbolic::simplify_text(&df)),
                format!(
                    "Computed by symbolic differentiation on f(x) = {}.",
                    symbolic::simplify_text(&f)
                ),
            )
        }
        Err(e) => (
            "Could not compute derivative".to_string(),
            format!("Check expression validity. Error: {}", e),
        ),
    }
}

/// Sample `f(x)` for plotting: 101 points over [-5.0, 5.0].
#[cfg(feature = "symbolic")]
pub fn sample_curve(expression: &str) -> Result<Vec<(f64, f64)>, VaultError> {
    let f = symbolic::parse(expression).map_err(|e| VaultError::Other(e.to_string()))?;
    symbolic::sample_curve(&f).map_err(|e| VaultError::Other(e.to_string()))
}

#[cfg(not(feature = "symbolic"))]
const UNAVAILABLE_HINT: &str =
    "This build was compiled without the `symbolic` feature. Rebuild with default \
     features to enable local symbolic computation.";

#[cfg(not(feature = "symbolic"))]
pub fn solve(_expression: &str) -> (String, String) {
    ("Math solver unavailable".to_string(), UNAVAILABLE_HINT.to_string())
}

#[cfg(not(feature = "symbolic"))]
pub fn differentiate(_expression: &str) -> (String, String) {
    ("Derivative unavailable".to_string(), UNAVAILABLE_HINT.to_string())
}

#[cfg(not(feature = "symbolic"))]
pub fn sample_curve(_expression: &str) -> Result<Vec<(f64, f64)>, VaultError> {
    Err(VaultError::Other(UNAVAILABLE_HINT.to_string()))
}

#[cfg(all(test, feature = "symbolic"))]
mod tests {
    use super::*;

    #[test]
    fn solves_linear_equation_to_single_root() {
        let (summary, deep) = solve("2*x+3=11");
        assert_eq!(summary, "Solution: x = [4]");
        assert!(deep.contains("2*x - 8 = 0"), "{}", deep);
    }

    #[test]
    fn solves_quadratic_to_root_set() {
        let (summary, _) = solve("x**2=4");
        assert_eq!(summary, "Solution: x = [-2, 2]");
    }

    #[test]
    fn expression_without_equals_is_simplified_with_guidance() {
        let (summary, deep) = solve("x + x + 1");
        assert_eq!(summary, "Simplified: 2*x + 1");
        assert!(deep.contains("Provide an equation with '='"));
    }

    #[test]
    fn parse_failure_is_recovered_with_diagnostic() {
        let (summary, deep) = solve("Solve 2*x+3=11");
        assert_eq!(summary, "Could not parse equation");
        assert!(deep.contains("Error:"), "{}", deep);
    }

    #[test]
    fn oversized_constants_are_recovered_not_panicked() {
        // constants that overflow exact 64-bit arithmetic
        let (summary, deep) = solve("99999**9 = 1");
        assert_eq!(summary, "Could not parse equation");
        assert!(deep.contains("too large"), "{}", deep);

        // fits as a polynomial, but the discriminant overflows
        let (summary, deep) = solve("(x+1000)**2 * 1000000000 = 1");
        assert_eq!(summary, "Could not parse equation");
        assert!(deep.contains("too large"), "{}", deep);
    }

    #[test]
    fn derivative_of_square() {
        let (summary, deep) = differentiate("x**2");
        assert_eq!(summary, "Derivative df/dx: 2*x");
        assert!(deep.contains("f(x) = x**2"), "{}", deep);
    }

    #[test]
    fn derivative_parse_failure_is_recovered() {
        let (summary, deep) = differentiate("what is d/dx of x**2");
        assert_eq!(summary, "Could not compute derivative");
        assert!(deep.contains("Error:"), "{}", deep);
    }

    #[test]
    fn availability_reflects_feature() {
        assert!(available());
    }

    #[test]
    fn sample_curve_is_101_points() {
        let points = sample_curve("x**2").unwrap();
        assert_eq!(points.len(), 101);
    }

    #[test]
    fn sample_curve_surfaces_parse_and_domain_errors() {
        assert!(sample_curve("not an expression").is_err());
        assert!(sample_curve("1/x").is_err());
    }
}

// Exercised with `cargo test -p vault-core --no-default-features`.
#[cfg(all(test, not(feature = "symbolic")))]
mod degraded_tests {
    use super::*;

    #[test]
    fn solve_answers_with_the_unavailable_pair() {
        let (summary, deep) = solve("2*x+3=11");
        assert_eq!(summary, "Math solver unavailable");
        assert!(deep.contains("`symbolic` feature"), "{}", deep);
    }

    #[test]
    fn differentiate_answers_with_the_unavailable_pair() {
        let (summary, deep) = differentiate("x**2");
        assert_eq!(summary, "Derivative unavailable");
        assert!(deep.contains("`symbolic` feature"), "{}", deep);
    }

    #[test]
    fn sample_curve_is_an_error_and_availability_is_false() {
        assert!(!available());
        assert!(sample_curve("x**2").is_err());
    }
}
