//! Treating an [`Expression`] as a polynomial in one of its [`Parameter`]s.

use crate::algebra::{
    ops::{self, Context, EvaluationError},
    BinaryOperation, Expression, Parameter,
};

/// Powers larger than this are never expanded.
const MAX_DEGREE: u32 = 16;

/// The degree of `expr` when it is viewed as a polynomial in `param`, or
/// `None` when it isn't a polynomial (e.g. `1/x` or `ln(x)`).
///
/// The degree is an upper bound, `x*x - x*x` reports `2`.
pub fn polynomial_degree<C>(
    expr: &Expression,
    param: &Parameter,
    ctx: &C,
) -> Option<u32>
where
    C: Context,
{
    if !expr.depends_on(param) {
        return Some(0);
    }

    match expr {
        Expression::Parameter(_) => Some(1),
        Expression::Constant(_) => Some(0),
        Expression::Binary { left, right, op } => match op {
            BinaryOperation::Plus | BinaryOperation::Minus => {
                let left = polynomial_degree(left, param, ctx)?;
                let right = polynomial_degree(right, param, ctx)?;
                Some(left.max(right))
            },
            BinaryOperation::Times => {
                let left = polynomial_degree(left, param, ctx)?;
                let right = polynomial_degree(right, param, ctx)?;
                Some(left + right)
            },
            BinaryOperation::Divide if !right.depends_on(param) => {
                polynomial_degree(left, param, ctx)
            },
            BinaryOperation::Divide => None,
            BinaryOperation::Power if right.depends_on(param) => None,
            BinaryOperation::Power => {
                let exponent = ops::as_constant(right, ctx)?;
                let is_whole = exponent >= 0.0
                    && exponent.fract() == 0.0
                    && exponent <= MAX_DEGREE as f64;

                if is_whole {
                    let base = polynomial_degree(left, param, ctx)?;
                    Some(base * exponent as u32)
                } else {
                    None
                }
            },
        },
        Expression::Negate(inner) => polynomial_degree(inner, param, ctx),
        Expression::FunctionCall { .. } => None,
    }
}

/// The coefficients `[c_0, c_1, ..., c_degree]` such that
/// `expr = c_0 + c_1*x + ... + c_degree*x^degree`.
///
/// Coefficients may still mention other parameters. They are found from the
/// Taylor expansion around `x = 0`, so `expr` must be a polynomial in `param`
/// of at most `degree`.
pub fn coefficients<C>(
    expr: &Expression,
    param: &Parameter,
    degree: u32,
    ctx: &C,
) -> Result<Vec<Expression>, EvaluationError>
where
    C: Context,
{
    let zero = Expression::Constant(0.0);
    let mut derivative = ops::fold_constants(expr, ctx);
    let mut factorial = 1.0;
    let mut coefficients = Vec::with_capacity(degree as usize + 1);

    for k in 0..=degree {
        if k > 0 {
            derivative = ops::fold_constants(
                &ops::partial_derivative(&derivative, param, ctx)?,
                ctx,
            );
            factorial *= f64::from(k);
        }

        let at_zero = ops::substitute(&derivative, param, &zero);
        let coefficient = at_zero / Expression::Constant(factorial);
        coefficients.push(ops::fold_constants(&coefficient, ctx));
    }

    Ok(coefficients)
}

/// Rewrite `expr` as a single fraction, `numerator / denominator`, so an
/// equation like `Q - 100/P = 0` can be solved through `Q*P - 100 = 0`.
///
/// Only divisions by something which mentions `param` are moved into the
/// denominator, `None` means there weren't any.
pub fn as_fraction<C>(
    expr: &Expression,
    param: &Parameter,
    ctx: &C,
) -> (Expression, Option<Expression>)
where
    C: Context,
{
    if !expr.depends_on(param) {
        return (expr.clone(), None);
    }

    match expr {
        Expression::Binary { left, right, op } => match op {
            BinaryOperation::Plus | BinaryOperation::Minus => {
                let (a, da) = as_fraction(left, param, ctx);
                let (b, db) = as_fraction(right, param, ctx);

                match (da, db) {
                    (None, None) => (Expression::binary(a, *op, b), None),
                    (Some(d), None) => {
                        (Expression::binary(a, *op, b * d.clone()), Some(d))
                    },
                    (None, Some(d)) => {
                        (Expression::binary(a * d.clone(), *op, b), Some(d))
                    },
                    (Some(da), Some(db)) => (
                        Expression::binary(a * db.clone(), *op, b * da.clone()),
                        Some(da * db),
                    ),
                }
            },
            BinaryOperation::Times => {
                let (a, da) = as_fraction(left, param, ctx);
                let (b, db) = as_fraction(right, param, ctx);

                (a * b, product(da, db))
            },
            BinaryOperation::Divide if !right.depends_on(param) => {
                let (a, da) = as_fraction(left, param, ctx);

                (a / Expression::clone(right), da)
            },
            BinaryOperation::Divide => {
                let (a, da) = as_fraction(left, param, ctx);
                let (b, db) = as_fraction(right, param, ctx);

                (multiply(a, db), product(da, Some(b)))
            },
            BinaryOperation::Power if !right.depends_on(param) => {
                let exponent = match ops::as_constant(right, ctx) {
                    Some(n)
                        if n.fract() == 0.0 && n.abs() <= MAX_DEGREE as f64 =>
                    {
                        n
                    },
                    _ => return (expr.clone(), None),
                };
                let (base, denominator) = as_fraction(left, param, ctx);
                let raise = |e: Expression| {
                    e.pow(Expression::Constant(exponent.abs()))
                };

                if exponent >= 0.0 {
                    (raise(base), denominator.map(raise))
                } else {
                    let numerator = denominator
                        .map(raise)
                        .unwrap_or(Expression::Constant(1.0));
                    (numerator, Some(raise(base)))
                }
            },
            BinaryOperation::Power => (expr.clone(), None),
        },
        Expression::Negate(inner) => {
            let (numerator, denominator) = as_fraction(inner, param, ctx);
            (-numerator, denominator)
        },
        _ => (expr.clone(), None),
    }
}

fn multiply(expr: Expression, factor: Option<Expression>) -> Expression {
    match factor {
        Some(factor) => expr * factor,
        None => expr,
    }
}

fn product(
    left: Option<Expression>,
    right: Option<Expression>,
) -> Option<Expression> {
    match (left, right) {
        (Some(left), right) => Some(multiply(left, right)),
        (None, right) => right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::ops::Builtins;

    #[test]
    fn degrees() {
        let x = Parameter::named("x");
        let ctx = Builtins::default();
        let inputs = vec![
            ("5", Some(0)),
            ("y", Some(0)),
            ("x", Some(1)),
            ("3x + 2", Some(1)),
            ("x(x + 1)", Some(2)),
            ("x^2 - 4", Some(2)),
            ("(x + 1)^3", Some(3)),
            ("x/2", Some(1)),
            ("2/x", None),
            ("\\ln(x)", None),
            ("x^{0.5}", None),
            ("2^x", None),
        ];

        for (src, should_be) in inputs {
            let expr: Expression = src.parse().unwrap();

            let got = polynomial_degree(&expr, &x, &ctx);

            assert_eq!(got, should_be, "degree of {}", src);
        }
    }

    #[test]
    fn coefficients_of_a_quadratic() {
        let x = Parameter::named("x");
        let ctx = Builtins::default();
        let expr: Expression = "3 - 2x + 0.5x^2".parse().unwrap();

        let got = coefficients(&expr, &x, 2, &ctx).unwrap();

        assert_eq!(
            got,
            vec![
                Expression::Constant(3.0),
                Expression::Constant(-2.0),
                Expression::Constant(0.5)
            ]
        );
    }

    fn assert_same_function(got: &Expression, should_be: &str) {
        let should_be: Expression = should_be.parse().unwrap();
        let ctx = Builtins::default();

        for x in [0.5, 3.0, -2.0] {
            let lookup = |p: &Parameter| match p.name() {
                "x" => Some(x),
                _ => Some(7.0),
            };
            let a = ops::evaluate(got, lookup, &ctx).unwrap();
            let b = ops::evaluate(&should_be, lookup, &ctx).unwrap();

            approx::assert_relative_eq!(a, b, max_relative = 1e-12);
        }
    }

    #[test]
    fn rational_expressions_become_a_single_fraction() {
        let x = Parameter::named("x");
        let ctx = Builtins::default();
        let inputs = vec![
            ("Q - 100/x", "Q*x - 100", Some("x")),
            ("3x + 2", "3x + 2", None),
            ("1/x + 1/(x - 1)", "(x - 1) + x", Some("x(x - 1)")),
            ("x^{-2} - 4", "1 - 4x^2", Some("x^2")),
            ("\\frac{x}{2} - 1", "x/2 - 1", None),
        ];

        for (src, numerator, denominator) in inputs {
            let expr: Expression = src.parse().unwrap();

            let (got, got_denominator) = as_fraction(&expr, &x, &ctx);

            assert_same_function(&got, numerator);
            assert!(polynomial_degree(&got, &x, &ctx).is_some(), "{}", src);
            match (got_denominator, denominator) {
                (None, None) => {},
                (Some(got), Some(should_be)) => {
                    assert_same_function(&got, should_be)
                },
                (got, should_be) => panic!(
                    "{}: got {:?}, expected {:?}",
                    src, got, should_be
                ),
            }
        }
    }

    #[test]
    fn coefficients_can_be_symbolic() {
        let q = Parameter::named("Q");
        let ctx = Builtins::default();
        let expr: Expression = "Q - (a - b P)".parse().unwrap();

        let got = coefficients(&expr, &q, 1, &ctx).unwrap();

        assert_eq!(got[1], Expression::Constant(1.0));
        assert!(got[0].depends_on(&Parameter::named("P")));
        assert!(!got[0].depends_on(&q));
    }
}
