//! [`Expression`] operations.

use crate::algebra::{polynomial, BinaryOperation, Expression, Parameter};
use smol_str::SmolStr;

/// Contextual information used when evaluating an [`Expression`].
pub trait Context {
    fn evaluate_function(
        &self,
        name: &str,
        argument: f64,
    ) -> Result<f64, EvaluationError>;

    /// For some [`Parameter`], `x`, and function, `f`, get `f'(x)`.
    fn differentiate_function(
        &self,
        name: &str,
        param: &Parameter,
    ) -> Result<Expression, EvaluationError>;

    /// For some [`Parameter`], `x`, and function, `f`, get `∫f(x) dx`.
    fn integrate_function(
        &self,
        name: &str,
        param: &Parameter,
    ) -> Result<Expression, EvaluationError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("unknown function \"{name}\"")]
    UnknownFunction { name: SmolStr },
    #[error("no value was provided for \"{name}\"")]
    UnknownParameter { name: SmolStr },
    #[error("unable to differentiate \"{name}\"")]
    UnableToDifferentiate { name: SmolStr },
    #[error("unable to integrate \"{expression}\" symbolically")]
    UnableToIntegrate { expression: String },
    #[error("\"{expression}\" is undefined here")]
    Undefined { expression: String },
}

/// The set of builtin functions. Angles are in radians.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Builtins;

impl Context for Builtins {
    fn evaluate_function(
        &self,
        name: &str,
        argument: f64,
    ) -> Result<f64, EvaluationError> {
        match name {
            "sqrt" => Ok(argument.sqrt()),
            "ln" | "log" => Ok(argument.ln()),
            "exp" => Ok(argument.exp()),
            "sin" => Ok(argument.sin()),
            "cos" => Ok(argument.cos()),
            "tan" => Ok(argument.tan()),
            _ => Err(EvaluationError::UnknownFunction { name: name.into() }),
        }
    }

    fn differentiate_function(
        &self,
        name: &str,
        param: &Parameter,
    ) -> Result<Expression, EvaluationError> {
        let x = Expression::Parameter(param.clone());

        match name {
            "sqrt" => {
                Ok(Expression::Constant(0.5) / Expression::call("sqrt", x))
            },
            "ln" | "log" => Ok(Expression::Constant(1.0) / x),
            "exp" => Ok(Expression::call("exp", x)),
            "sin" => Ok(Expression::call("cos", x)),
            "cos" => Ok(-Expression::call("sin", x)),
            "tan" => Ok(Expression::Constant(1.0)
                / Expression::call("cos", x).pow(Expression::Constant(2.0))),
            _ => Err(EvaluationError::UnableToDifferentiate {
                name: name.into(),
            }),
        }
    }

    fn integrate_function(
        &self,
        name: &str,
        param: &Parameter,
    ) -> Result<Expression, EvaluationError> {
        let x = Expression::Parameter(param.clone());

        match name {
            "sqrt" => Ok(Expression::Constant(2.0 / 3.0)
                * x.pow(Expression::Constant(1.5))),
            "ln" | "log" => {
                Ok(x.clone() * Expression::call("ln", x.clone()) - x)
            },
            "exp" => Ok(Expression::call("exp", x)),
            "sin" => Ok(-Expression::call("cos", x)),
            "cos" => Ok(Expression::call("sin", x)),
            _ => Err(EvaluationError::UnableToIntegrate {
                expression: format!("{}({})", name, x),
            }),
        }
    }
}

/// Simplify an expression by evaluating all constant operations.
pub fn fold_constants<C>(expr: &Expression, ctx: &C) -> Expression
where
    C: Context,
{
    match expr {
        Expression::Binary { left, right, op } => {
            fold_binary_op(left, right, *op, ctx)
        },
        Expression::Negate(inner) => negate(fold_constants(inner, ctx)),
        Expression::FunctionCall { function, argument } => {
            let argument = fold_constants(argument, ctx);

            if let Expression::Constant(value) = &argument {
                if let Ok(result) = ctx.evaluate_function(function, *value) {
                    if result.is_finite() {
                        return Expression::Constant(result);
                    }
                }
            }

            Expression::FunctionCall {
                function: function.clone(),
                argument: Box::new(argument),
            }
        },
        _ => expr.clone(),
    }
}

/// Negate an already folded expression.
fn negate(expr: Expression) -> Expression {
    match expr {
        Expression::Constant(value) => Expression::Constant(-value),
        // double negative
        Expression::Negate(inner) => *inner,
        Expression::Binary { left, right, op } => match (*left, op) {
            (
                Expression::Constant(value),
                BinaryOperation::Times | BinaryOperation::Divide,
            ) => Expression::binary(Expression::Constant(-value), op, *right),
            (left, op) => -Expression::binary(left, op, *right),
        },
        other => -other,
    }
}

/// Multiply an already folded expression by a constant, merging it into any
/// leading coefficient.
fn scale(factor: f64, expr: Expression) -> Expression {
    if factor == 0.0 {
        return Expression::Constant(0.0);
    }
    if factor == 1.0 {
        return expr;
    }
    if factor == -1.0 {
        return negate(expr);
    }

    match expr {
        Expression::Constant(value) => Expression::Constant(factor * value),
        Expression::Negate(inner) => scale(-factor, *inner),
        Expression::Binary { left, right, op } => match (*left, op) {
            (Expression::Constant(value), BinaryOperation::Times) => {
                scale(factor * value, *right)
            },
            (Expression::Constant(value), BinaryOperation::Divide) => {
                Expression::binary(
                    Expression::Constant(factor * value),
                    op,
                    *right,
                )
            },
            (left, op) => {
                Expression::Constant(factor)
                    * Expression::binary(left, op, *right)
            },
        },
        other => Expression::Constant(factor) * other,
    }
}

/// Split a folded term into its coefficient and the rest, `3*x` is `(3, x)`.
fn coefficient_of(expr: &Expression) -> (f64, &Expression) {
    match expr {
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Times,
        } => match **left {
            Expression::Constant(coefficient) => (coefficient, &**right),
            _ => (1.0, expr),
        },
        Expression::Negate(inner) => {
            let (coefficient, rest) = coefficient_of(inner);
            (-coefficient, rest)
        },
        _ => (1.0, expr),
    }
}

fn like_terms(left: &Expression, right: &Expression) -> bool {
    let (_, left) = coefficient_of(left);
    let (_, right) = coefficient_of(right);

    left == right && !left.is_constant()
}

fn fold_binary_op<C>(
    left: &Expression,
    right: &Expression,
    op: BinaryOperation,
    ctx: &C,
) -> Expression
where
    C: Context,
{
    let left = fold_constants(left, ctx);
    let right = fold_constants(right, ctx);

    // If our operands contain constants, we can use arithmetic's identity laws
    // to simplify things
    match (left, right, op) {
        // Evaluate in-place
        (Expression::Constant(l), Expression::Constant(r), op)
            if op.apply(l, r).is_finite() =>
        {
            Expression::Constant(op.apply(l, r))
        },

        // like terms, 2*x + 3*x = 5*x
        (left, right, op @ (BinaryOperation::Plus | BinaryOperation::Minus))
            if like_terms(&left, &right) =>
        {
            let (a, term) = coefficient_of(&left);
            let (b, _) = coefficient_of(&right);
            let total = if op == BinaryOperation::Plus { a + b } else { a - b };

            scale(total, term.clone())
        },
        (
            Expression::Parameter(p_left),
            Expression::Parameter(p_right),
            BinaryOperation::Divide,
        ) if p_left == p_right => Expression::Constant(1.0),

        // x + 0 = x
        (Expression::Constant(l), right, BinaryOperation::Plus)
            if l == 0.0 =>
        {
            right
        },
        (left, Expression::Constant(r), BinaryOperation::Plus)
            if r == 0.0 =>
        {
            left
        },
        // x + -y = x - y
        (left, Expression::Negate(right), BinaryOperation::Plus) => {
            left - *right
        },
        (left, Expression::Constant(r), BinaryOperation::Plus) if r < 0.0 => {
            left - Expression::Constant(-r)
        },

        // x - 0 = x
        (left, Expression::Constant(r), BinaryOperation::Minus)
            if r == 0.0 =>
        {
            left
        },
        // 0 - x = -x
        (Expression::Constant(l), right, BinaryOperation::Minus)
            if l == 0.0 =>
        {
            negate(right)
        },
        // x - -y = x + y
        (left, Expression::Negate(right), BinaryOperation::Minus) => {
            left + *right
        },
        (left, Expression::Constant(r), BinaryOperation::Minus) if r < 0.0 => {
            left + Expression::Constant(-r)
        },

        // 0 * x = 0
        (Expression::Constant(l), _, BinaryOperation::Times)
            if l == 0.0 =>
        {
            Expression::Constant(0.0)
        },
        (_, Expression::Constant(r), BinaryOperation::Times)
            if r == 0.0 =>
        {
            Expression::Constant(0.0)
        },
        // coefficients go on the left, 2 * (3 * x) = 6 * x
        (Expression::Constant(l), right, BinaryOperation::Times) => {
            scale(l, right)
        },
        (left, Expression::Constant(r), BinaryOperation::Times) => {
            scale(r, left)
        },

        // 0 / x = 0
        (Expression::Constant(l), _, BinaryOperation::Divide)
            if l == 0.0 =>
        {
            Expression::Constant(0.0)
        },
        // x / c = (1/c) * x
        (left, Expression::Constant(r), BinaryOperation::Divide)
            if r != 0.0 =>
        {
            scale(1.0 / r, left)
        },

        // x^0 = 1, x^1 = x and 1^x = 1
        (_, Expression::Constant(r), BinaryOperation::Power)
            if r == 0.0 =>
        {
            Expression::Constant(1.0)
        },
        (left, Expression::Constant(r), BinaryOperation::Power)
            if r == 1.0 =>
        {
            left
        },
        (Expression::Constant(l), _, BinaryOperation::Power)
            if l == 1.0 =>
        {
            Expression::Constant(1.0)
        },

        // Oh well, we tried
        (left, right, op) => Expression::binary(left, op, right),
    }
}

/// Replace all references to a [`Parameter`] with an [`Expression`].
pub fn substitute(
    expression: &Expression,
    param: &Parameter,
    value: &Expression,
) -> Expression {
    match expression {
        Expression::Parameter(p) => {
            if p == param {
                value.clone()
            } else {
                Expression::Parameter(p.clone())
            }
        },
        Expression::Constant(value) => Expression::Constant(*value),
        Expression::Binary { left, right, op } => {
            let left = substitute(left, param, value);
            let right = substitute(right, param, value);
            Expression::binary(left, *op, right)
        },
        Expression::Negate(inner) => -substitute(inner, param, value),
        Expression::FunctionCall { function, argument } => {
            Expression::FunctionCall {
                function: function.clone(),
                argument: Box::new(substitute(argument, param, value)),
            }
        },
    }
}

/// Evaluate an [`Expression`], using `lookup` to find each [`Parameter`]'s
/// value.
pub fn evaluate<F, C>(
    expr: &Expression,
    lookup: F,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    F: Fn(&Parameter) -> Option<f64>,
    C: Context,
{
    evaluate_with(expr, &lookup, ctx)
}

fn evaluate_with<F, C>(
    expr: &Expression,
    lookup: &F,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    F: Fn(&Parameter) -> Option<f64>,
    C: Context,
{
    match expr {
        Expression::Parameter(p) => {
            lookup(p).ok_or_else(|| EvaluationError::UnknownParameter {
                name: p.name().into(),
            })
        },
        Expression::Constant(value) => Ok(*value),
        Expression::Binary { left, right, op } => {
            let left = evaluate_with(left, lookup, ctx)?;
            let right = evaluate_with(right, lookup, ctx)?;
            Ok(op.apply(left, right))
        },
        Expression::Negate(inner) => Ok(-evaluate_with(inner, lookup, ctx)?),
        Expression::FunctionCall { function, argument } => {
            let argument = evaluate_with(argument, lookup, ctx)?;
            ctx.evaluate_function(function, argument)
        },
    }
}

/// The value of an expression which doesn't mention any [`Parameter`]s.
pub fn as_constant<C>(expr: &Expression, ctx: &C) -> Option<f64>
where
    C: Context,
{
    if let Expression::Constant(value) = expr {
        return Some(*value);
    }
    if expr.params().next().is_some() {
        return None;
    }

    evaluate(expr, |_| None, ctx)
        .ok()
        .filter(|value| value.is_finite())
}

/// Anything smaller than this is rounding noise left over from cancelling
/// terms, e.g. `0.1 + 0.2 - 0.3`.
const ROUNDING_NOISE: f64 = 1e-12;

/// Is this expression a constant which is zero, give or take rounding noise?
pub fn is_zero<C>(expr: &Expression, ctx: &C) -> bool
where
    C: Context,
{
    as_constant(expr, ctx).map_or(false, |value| value.abs() <= ROUNDING_NOISE)
}

/// Calculate an [`Expression`]'s partial derivative with respect to a
/// particular [`Parameter`].
pub fn partial_derivative<C>(
    expr: &Expression,
    param: &Parameter,
    ctx: &C,
) -> Result<Expression, EvaluationError>
where
    C: Context,
{
    if !expr.depends_on(param) {
        return Ok(Expression::Constant(0.0));
    }

    let got = match expr {
        Expression::Parameter(_) => Expression::Constant(1.0),
        Expression::Constant(_) => Expression::Constant(0.0),
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Plus,
        } => {
            partial_derivative(left, param, ctx)?
                + partial_derivative(right, param, ctx)?
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Minus,
        } => {
            partial_derivative(left, param, ctx)?
                - partial_derivative(right, param, ctx)?
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Times,
        } => {
            // The product rule
            let d_left = partial_derivative(left, param, ctx)?;
            let d_right = partial_derivative(right, param, ctx)?;
            let left = Expression::clone(left);
            let right = Expression::clone(right);

            d_left * right + d_right * left
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Divide,
        } => {
            // The quotient rule
            let d_left = partial_derivative(left, param, ctx)?;
            let d_right = partial_derivative(right, param, ctx)?;
            let right = Expression::clone(right);
            let left = Expression::clone(left);

            (d_left * right.clone() - left * d_right)
                / right.pow(Expression::Constant(2.0))
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Power,
        } => {
            let base = Expression::clone(left);
            let exponent = Expression::clone(right);

            if !right.depends_on(param) {
                // The power rule, (u^n)' = n * u^(n-1) * u'
                let d_base = partial_derivative(left, param, ctx)?;
                exponent.clone()
                    * base.pow(exponent - Expression::Constant(1.0))
                    * d_base
            } else if !left.depends_on(param) {
                // (a^v)' = a^v * ln(a) * v'
                let d_exponent = partial_derivative(right, param, ctx)?;
                base.clone().pow(exponent)
                    * Expression::call("ln", base)
                    * d_exponent
            } else {
                // (u^v)' = u^v * (v' * ln(u) + v * u' / u)
                let d_base = partial_derivative(left, param, ctx)?;
                let d_exponent = partial_derivative(right, param, ctx)?;
                base.clone().pow(exponent.clone())
                    * (d_exponent * Expression::call("ln", base.clone())
                        + exponent * d_base / base)
            }
        },
        Expression::Negate(inner) => -partial_derivative(inner, param, ctx)?,
        Expression::FunctionCall { function, argument } => {
            // implement the chain rule: (f o g)' = (f' o g) * g'
            let g = Parameter::named("__temp__");
            let f_dash_of_g = ctx.differentiate_function(function, &g)?;
            let g_dash = partial_derivative(argument, param, ctx)?;

            substitute(&f_dash_of_g, &g, argument) * g_dash
        },
    };

    Ok(got)
}

/// Find an antiderivative of an [`Expression`] with respect to a
/// [`Parameter`], `∫expr d(param)`, without a constant of integration.
///
/// Sums, constant multiples, polynomials, powers and builtin functions of a
/// linear argument are supported.
pub fn antiderivative<C>(
    expr: &Expression,
    param: &Parameter,
    ctx: &C,
) -> Result<Expression, EvaluationError>
where
    C: Context,
{
    let x = Expression::Parameter(param.clone());
    let unable = || EvaluationError::UnableToIntegrate {
        expression: expr.to_string(),
    };

    if !expr.depends_on(param) {
        return Ok(fold_constants(&(expr.clone() * x), ctx));
    }

    let got = match expr {
        Expression::Parameter(_) => {
            Expression::Constant(0.5) * x.pow(Expression::Constant(2.0))
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Plus,
        } => {
            antiderivative(left, param, ctx)?
                + antiderivative(right, param, ctx)?
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Minus,
        } => {
            antiderivative(left, param, ctx)?
                - antiderivative(right, param, ctx)?
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Times,
        } if !left.depends_on(param) => {
            Expression::clone(left) * antiderivative(right, param, ctx)?
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Times,
        } if !right.depends_on(param) => {
            antiderivative(left, param, ctx)? * Expression::clone(right)
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Divide,
        } if !right.depends_on(param) => {
            antiderivative(left, param, ctx)? / Expression::clone(right)
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Divide,
        } if !left.depends_on(param) => {
            // ∫ c/(a*x + b) dx = c * ln(a*x + b) / a
            let slope = linear_slope(right, param, ctx).ok_or_else(unable)?;
            Expression::clone(left)
                * Expression::call("ln", Expression::clone(right))
                / slope
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Power,
        } if !right.depends_on(param) => {
            let slope = linear_slope(left, param, ctx).ok_or_else(unable)?;
            let base = Expression::clone(left);
            let exponent = Expression::clone(right);

            match as_constant(&exponent, ctx) {
                Some(n) if n == -1.0 => {
                    Expression::call("ln", base) / slope
                },
                _ => {
                    let raised = exponent + Expression::Constant(1.0);
                    base.pow(raised.clone()) / (raised * slope)
                },
            }
        },
        Expression::Negate(inner) => -antiderivative(inner, param, ctx)?,
        Expression::FunctionCall { function, argument } => {
            // ∫ f(a*x + b) dx = F(a*x + b) / a
            let slope =
                linear_slope(argument, param, ctx).ok_or_else(unable)?;
            let g = Parameter::named("__temp__");
            let big_f = ctx.integrate_function(function, &g)?;

            substitute(&big_f, &g, argument) / slope
        },
        _ => polynomial_antiderivative(expr, param, ctx)?.ok_or_else(unable)?,
    };

    Ok(fold_constants(&got, ctx))
}

/// Integrate anything that is a polynomial in `param` term by term.
fn polynomial_antiderivative<C>(
    expr: &Expression,
    param: &Parameter,
    ctx: &C,
) -> Result<Option<Expression>, EvaluationError>
where
    C: Context,
{
    let degree = match polynomial::polynomial_degree(expr, param, ctx) {
        Some(degree) => degree,
        None => return Ok(None),
    };
    let coefficients = polynomial::coefficients(expr, param, degree, ctx)?;

    let x = Expression::Parameter(param.clone());
    let mut integral = Expression::Constant(0.0);

    for (power, coefficient) in coefficients.into_iter().enumerate() {
        let raised = (power + 1) as f64;
        integral = integral
            + coefficient * x.clone().pow(Expression::Constant(raised))
                / Expression::Constant(raised);
    }

    Ok(Some(integral))
}

/// The constant `a` when `expr` is `a*param + b`.
fn linear_slope<C>(
    expr: &Expression,
    param: &Parameter,
    ctx: &C,
) -> Option<Expression>
where
    C: Context,
{
    let derivative = partial_derivative(expr, param, ctx).ok()?;
    let derivative = fold_constants(&derivative, ctx);

    if derivative.depends_on(param) || is_zero(&derivative, ctx) {
        None
    } else {
        Some(derivative)
    }
}

/// Evaluate `∫expr d(param)` between two bounds.
///
/// Any other [`Parameter`] in the integrand is an error.
pub fn definite_integral<C>(
    expr: &Expression,
    param: &Parameter,
    lower: f64,
    upper: f64,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    C: Context,
{
    let integral = antiderivative(expr, param, ctx)?;
    let at = |value: f64| {
        evaluate(&integral, |p| if p == param { Some(value) } else { None }, ctx)
    };

    let area = at(upper)? - at(lower)?;

    if area.is_finite() {
        Ok(area)
    } else {
        Err(EvaluationError::Undefined {
            expression: integral.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_fold_simple_arithmetic() {
        let inputs = vec![
            ("1", 1.0),
            ("1 + 1.5", 1.0 + 1.5),
            ("1 - 1.5", 1.0 - 1.5),
            ("2 * 3", 2.0 * 3.0),
            ("4 / 2", 4.0 / 2.0),
            ("2^3", 8.0),
            ("sqrt(4)", 4_f64.sqrt()),
            ("sqrt(2 + 2)", (2_f64 + 2.0).sqrt()),
            ("\\ln(1)", 0.0),
            ("sqrt(2 + sqrt(4))", (2.0 + 4_f64.sqrt()).sqrt()),
            ("-(1 + 2)", -(1.0 + 2.0)),
            ("10 - 4 - 3", 3.0),
            ("0 * x", 0.0),
            ("x - x", 0.0),
            ("x/x", 1.0),
            ("x^0", 1.0),
        ];
        let ctx = Builtins::default();

        for (src, should_be) in inputs {
            let expr: Expression = src.parse().unwrap();
            let got = fold_constants(&expr, &ctx);

            match got {
                Expression::Constant(value) => assert_eq!(
                    value, should_be,
                    "{} -> {} != {}",
                    expr, value, should_be
                ),
                other => panic!(
                    "Expected a constant expression, but got \"{}\"",
                    other
                ),
            }
        }
    }

    #[test]
    fn constant_folding_leaves_unknowns_unevaluated() {
        let inputs = vec![
            ("x", "x"),
            ("-(2 * 3 + x)", "-(6 + x)"),
            ("2 * x * 3", "6 * x"),
            ("x * 2", "2 * x"),
            ("x / 4", "0.25 * x"),
            ("x + 5", "x + 5"),
            ("x + 5*2", "x + 10"),
            ("x + -3", "x - 3"),
            ("x + x", "2*x"),
            ("0 + x", "x"),
            ("x + 0", "x"),
            ("1 * x", "x"),
            ("x * 1", "x"),
            ("-1 * x", "-x"),
            ("x - 0", "x"),
            ("0 - x", "-x"),
            ("0 - 2*x", "-2*x"),
            ("x / 1", "x"),
            ("--x", "x"),
            ("x - -y", "x + y"),
            ("x^1", "x"),
            ("(x + x)*3 + 5", "6*x + 5"),
        ];
        let ctx = Builtins::default();

        for (src, should_be) in inputs {
            let expr: Expression = src.parse().unwrap();

            let got = fold_constants(&expr, &ctx);

            let should_be = fold_constants(&should_be.parse().unwrap(), &ctx);

            assert_eq!(got, should_be, "{} != {}", got, should_be);
        }
    }

    #[test]
    fn scaled_terms_with_different_bodies_stay_apart() {
        let ctx = Builtins::default();
        let expr: Expression =
            "(G + 1200 - 0.8T)*(-50) - 50(M/P)".parse().unwrap();

        let got = fold_constants(&expr, &ctx);

        let lookup = |p: &Parameter| match p.name() {
            "G" => Some(900.0),
            "T" => Some(800.0),
            "M" => Some(3400.0),
            "P" => Some(2.0),
            _ => None,
        };
        let should_be = -50.0 * (900.0 + 1200.0 - 640.0) - 50.0 * 1700.0;
        approx::assert_relative_eq!(
            evaluate(&got, lookup, &ctx).unwrap(),
            should_be,
            max_relative = 1e-12
        );
        assert_eq!(fold_constants(&got, &ctx), got);
    }

    #[test]
    fn small_coefficients_are_kept() {
        let ctx = Builtins::default();
        let inputs = vec![
            ("0.0000005 * x", 0.0000005),
            ("x * 0.0000001", 0.0000001),
            ("x / 1000000000", 1e-9),
            ("1.0000001 * x", 1.0000001),
            ("x + 0.0000001x", 1.0000001),
        ];

        for (src, coefficient) in inputs {
            let expr: Expression = src.parse().unwrap();

            let got = fold_constants(&expr, &ctx);

            let value = evaluate(&got, |_| Some(1.0), &ctx).unwrap();
            approx::assert_relative_eq!(
                value,
                coefficient,
                max_relative = 1e-12
            );
            assert!(got.depends_on(&Parameter::named("x")), "{}", got);
        }

        assert!(!is_zero(&Expression::Constant(1e-9), &ctx));
        assert!(is_zero(&"0.1 + 0.2 - 0.3".parse().unwrap(), &ctx));
    }

    #[test]
    fn basic_substitutions() {
        let parameter = Parameter::named("x");
        let inputs = vec![
            ("1 + 2", "3", "1 + 2"),
            ("x", "5", "5"),
            ("y", "5", "y"),
            ("x + 5", "5", " 5 + 5"),
            ("-x", "5", "-5"),
            ("sin(x)", "y + y", "sin(y + y)"),
        ];

        for (src, new_value, should_be) in inputs {
            let original: Expression = src.parse().unwrap();
            let new_value: Expression = new_value.parse().unwrap();
            let should_be: Expression = should_be.parse().unwrap();

            let got = substitute(&original, &parameter, &new_value);

            assert_eq!(got, should_be, "{} != {}", got, should_be);
        }
    }

    #[test]
    fn differentiate_wrt_x() {
        let x = Parameter::named("x");
        let inputs = vec![
            ("x", "1"),
            ("1", "0"),
            ("x*x", "2 * x"),
            ("3*x*x + 5*x + 2", "6*x + 5"),
            ("x - y", "1"),
            ("sin(x)", "cos(x)"),
            ("cos(x)", "-sin(x)"),
            ("sqrt(x)", "0.5 / sqrt(x)"),
            ("x^3", "3 * x^2"),
            ("\\ln(x)", "1/x"),
        ];
        let ctx = Builtins::default();

        for (src, should_be) in inputs {
            let original: Expression = src.parse().unwrap();
            let should_be =
                fold_constants(&should_be.parse().unwrap(), &ctx);

            let got = partial_derivative(&original, &x, &ctx).unwrap();
            let got = fold_constants(&got, &ctx);

            assert_eq!(got, should_be, "{} != {}", got, should_be);
        }
    }

    #[test]
    fn quotient_rule_subtracts() {
        let x = Parameter::named("x");
        let ctx = Builtins::default();
        let expr: Expression = "1/x".parse().unwrap();

        let got = partial_derivative(&expr, &x, &ctx).unwrap();
        let got = evaluate(&got, |_| Some(2.0), &ctx).unwrap();

        assert_eq!(got, -0.25);
    }

    #[test]
    fn evaluate_with_lookup() {
        let ctx = Builtins::default();
        let expr: Expression = "100 - 2P".parse().unwrap();

        let got = evaluate(
            &expr,
            |p| if p.name() == "P" { Some(10.0) } else { None },
            &ctx,
        )
        .unwrap();
        assert_eq!(got, 80.0);

        let err = evaluate(&expr, |_| None, &ctx).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::UnknownParameter { name: "P".into() }
        );
    }

    #[test]
    fn integrate_over_an_interval() {
        let q = Parameter::named("Q");
        let ctx = Builtins::default();
        let inputs = vec![
            ("50 - 0.5Q", 0.0, 52.0, 50.0 * 52.0 - 0.25 * 52.0 * 52.0),
            ("Q^2", 0.0, 3.0, 9.0),
            ("3", 1.0, 4.0, 9.0),
            ("(Q + 20)/3", 0.0, 52.0, (52.0 * 52.0 / 2.0 + 20.0 * 52.0) / 3.0),
            ("1/Q", 1.0, std::f64::consts::E, 1.0),
            ("\\sqrt{Q}", 0.0, 4.0, 16.0 / 3.0),
            ("exp(2Q)", 0.0, 1.0, (2_f64.exp() - 1.0) / 2.0),
        ];

        for (src, lower, upper, should_be) in inputs {
            let expr: Expression = src.parse().unwrap();

            let got = definite_integral(&expr, &q, lower, upper, &ctx).unwrap();

            approx::assert_relative_eq!(got, should_be, max_relative = 1e-9);
        }
    }

    #[test]
    fn products_of_the_variable_are_integrated_as_polynomials() {
        let q = Parameter::named("Q");
        let ctx = Builtins::default();
        let expr: Expression = "Q(Q + 1)".parse().unwrap();

        let got = definite_integral(&expr, &q, 0.0, 3.0, &ctx).unwrap();

        approx::assert_relative_eq!(got, 9.0 + 4.5, max_relative = 1e-9);
    }

    #[test]
    fn unsupported_integrands_are_reported() {
        let q = Parameter::named("Q");
        let ctx = Builtins::default();
        let expr: Expression = "sin(Q^2)".parse().unwrap();

        let got = antiderivative(&expr, &q, &ctx);

        assert!(matches!(
            got,
            Err(EvaluationError::UnableToIntegrate { .. })
        ));
    }
}
