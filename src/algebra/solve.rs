//! Exact solutions for polynomial equations and small systems.

use crate::algebra::{
    ops::{self, Context, EvaluationError},
    polynomial, Equation, Expression, Parameter,
};
use approx::relative_eq;
use arrayvec::ArrayVec;
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;

/// The real roots of an equation which is at most quadratic in the unknown.
pub type Roots = ArrayVec<Expression, 2>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error(transparent)]
    Eval(#[from] EvaluationError),
    #[error("the equation is not a polynomial in {parameter}")]
    NotPolynomial { parameter: Parameter },
    #[error("the equation has degree {degree} in {parameter} but only linear and quadratic equations can be solved")]
    DegreeTooHigh { parameter: Parameter, degree: u32 },
    #[error("unable to solve {equations} equations for {unknowns} unknowns")]
    NotSquare { equations: usize, unknowns: usize },
    #[error("nonlinear systems can only be solved for two unknowns")]
    Nonlinear,
    #[error("the system has infinitely many solutions")]
    Underdetermined,
}

/// One assignment of values to the unknowns which satisfies every equation.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub known_values: HashMap<Parameter, Expression>,
}

impl Solution {
    pub fn get(&self, param: &Parameter) -> Option<&Expression> {
        self.known_values.get(param)
    }

    /// Evaluate the solution for one unknown, using `lookup` for any symbolic
    /// constants it still mentions.
    pub fn evaluate<F, C>(
        &self,
        param: &Parameter,
        lookup: F,
        ctx: &C,
    ) -> Result<f64, SolveError>
    where
        F: Fn(&Parameter) -> Option<f64>,
        C: Context,
    {
        let expr =
            self.get(param)
                .ok_or_else(|| EvaluationError::UnknownParameter {
                    name: param.name().into(),
                })?;

        Ok(ops::evaluate(expr, lookup, ctx)?)
    }
}

/// Solve `expr = 0` for `param`.
///
/// Only equations which are polynomials of degree 1 or 2 in `param` are
/// supported. Quadratics with numeric coefficients only report their real
/// roots (one root for a repeated root), symbolic ones report both branches
/// of the quadratic formula.
pub fn isolate<C>(
    expr: &Expression,
    param: &Parameter,
    ctx: &C,
) -> Result<Roots, SolveError>
where
    C: Context,
{
    let (expr, denominator) =
        match polynomial::polynomial_degree(expr, param, ctx) {
            Some(_) => (expr.clone(), None),
            // multiply through by the denominator, 100/P = Q becomes 100 = PQ
            None => polynomial::as_fraction(expr, param, ctx),
        };

    let degree =
        polynomial::polynomial_degree(&expr, param, ctx).ok_or_else(|| {
            SolveError::NotPolynomial {
                parameter: param.clone(),
            }
        })?;

    let mut coefficients =
        polynomial::coefficients(&expr, param, degree, ctx)?;

    // the degree is only an upper bound
    while coefficients.len() > 1
        && coefficients.last().map_or(false, |c| ops::is_zero(c, ctx))
    {
        coefficients.pop();
    }

    let mut roots = Roots::new();

    match coefficients.as_slice() {
        [] => {},
        [constant] => {
            if ops::is_zero(constant, ctx) {
                return Err(SolveError::Underdetermined);
            }
        },
        [constant, slope] => {
            let root = -constant.clone() / slope.clone();
            roots.push(ops::fold_constants(&root, ctx));
        },
        [c, b, a] => quadratic_roots(a, b, c, ctx, &mut roots),
        _ => {
            return Err(SolveError::DegreeTooHigh {
                parameter: param.clone(),
                degree: coefficients.len() as u32 - 1,
            })
        },
    }

    if let Some(denominator) = denominator {
        // the original equation is undefined where its denominator vanishes
        roots.retain(|root| {
            let at_root = ops::substitute(&denominator, param, root);
            !ops::is_zero(&ops::fold_constants(&at_root, ctx), ctx)
        });
    }

    Ok(roots)
}

fn quadratic_roots<C>(
    a: &Expression,
    b: &Expression,
    c: &Expression,
    ctx: &C,
    roots: &mut Roots,
) where
    C: Context,
{
    let numeric = (
        ops::as_constant(a, ctx),
        ops::as_constant(b, ctx),
        ops::as_constant(c, ctx),
    );

    if let (Some(a), Some(b), Some(c)) = numeric {
        let discriminant = b * b - 4.0 * a * c;
        let scale = (b * b).abs().max((4.0 * a * c).abs()).max(1.0);

        if discriminant.abs() <= scale * 1e-12 {
            roots.push(Expression::Constant(-b / (2.0 * a)));
        } else if discriminant > 0.0 {
            let sqrt = discriminant.sqrt();
            roots.push(Expression::Constant((-b - sqrt) / (2.0 * a)));
            roots.push(Expression::Constant((-b + sqrt) / (2.0 * a)));
        }

        return;
    }

    let two = Expression::Constant(2.0);
    let discriminant = b.clone().pow(two.clone())
        - Expression::Constant(4.0) * a.clone() * c.clone();
    let sqrt = Expression::call("sqrt", discriminant);
    let denominator = two * a.clone();

    for root in [
        (-b.clone() - sqrt.clone()) / denominator.clone(),
        (-b.clone() + sqrt) / denominator,
    ] {
        roots.push(ops::fold_constants(&root, ctx));
    }
}

pub(crate) fn solve<C>(
    equations: &[Equation],
    unknowns: &[Parameter],
    ctx: &C,
) -> Result<Vec<Solution>, SolveError>
where
    C: Context,
{
    if equations.len() != unknowns.len() || unknowns.is_empty() {
        return Err(SolveError::NotSquare {
            equations: equations.len(),
            unknowns: unknowns.len(),
        });
    }

    let jacobian = Jacobian::create(equations, unknowns, ctx)?;

    if jacobian.is_linear() {
        log::debug!(
            "Solving {} linear equation(s) with Cramer's rule",
            equations.len()
        );
        jacobian.solve_linear(equations, ctx)
    } else if unknowns.len() == 2 {
        log::debug!("Solving a nonlinear system by substitution");
        solve_by_substitution(equations, unknowns, ctx)
    } else if unknowns.len() == 1 {
        let roots = isolate(&equations[0].body, &unknowns[0], ctx)?;

        Ok(roots
            .into_iter()
            .map(|root| Solution {
                known_values: std::iter::once((unknowns[0].clone(), root))
                    .collect(),
            })
            .collect())
    } else {
        Err(SolveError::Nonlinear)
    }
}

/// The matrix of partial derivatives, `J[i][j] = ∂f_i/∂x_j`.
#[derive(Debug, Clone, PartialEq)]
struct Jacobian<'a> {
    matrix: DMatrix<Expression>,
    unknowns: &'a [Parameter],
}

impl<'a> Jacobian<'a> {
    fn create<C>(
        equations: &[Equation],
        unknowns: &'a [Parameter],
        ctx: &C,
    ) -> Result<Self, EvaluationError>
    where
        C: Context,
    {
        let mut cells = Vec::with_capacity(equations.len() * unknowns.len());

        for equation in equations {
            for param in unknowns {
                let derivative =
                    ops::partial_derivative(&equation.body, param, ctx)?;
                cells.push(ops::fold_constants(&derivative, ctx));
            }
        }

        let matrix = DMatrix::from_row_iterator(
            equations.len(),
            unknowns.len(),
            cells,
        );

        Ok(Jacobian { matrix, unknowns })
    }

    /// The system is linear when no derivative mentions an unknown.
    fn is_linear(&self) -> bool {
        self.matrix
            .iter()
            .all(|cell| self.unknowns.iter().all(|p| !cell.depends_on(p)))
    }

    /// Cramer's rule, `x_j = det(A_j) / det(A)`.
    fn solve_linear<C>(
        &self,
        equations: &[Equation],
        ctx: &C,
    ) -> Result<Vec<Solution>, SolveError>
    where
        C: Context,
    {
        // f(x) = A x + f(0) = 0, so A x = -f(0)
        let rhs = DVector::from_iterator(
            equations.len(),
            equations.iter().map(|equation| {
                let mut at_origin = equation.body.clone();
                for param in self.unknowns {
                    at_origin = ops::substitute(
                        &at_origin,
                        param,
                        &Expression::Constant(0.0),
                    );
                }
                ops::fold_constants(&-at_origin, ctx)
            }),
        );

        let denominator = determinant(&self.matrix, ctx);
        let numerators: Vec<Expression> = (0..self.unknowns.len())
            .map(|column| {
                let mut replaced = self.matrix.clone();
                replaced.set_column(column, &rhs);
                determinant(&replaced, ctx)
            })
            .collect();

        if ops::is_zero(&denominator, ctx) {
            let consistent = numerators.iter().all(|n| ops::is_zero(n, ctx))
                && (self.matrix.iter().any(|c| !ops::is_zero(c, ctx))
                    || rhs.iter().all(|r| ops::is_zero(r, ctx)));

            return if consistent {
                Err(SolveError::Underdetermined)
            } else {
                Ok(Vec::new())
            };
        }

        let known_values = self
            .unknowns
            .iter()
            .cloned()
            .zip(numerators)
            .map(|(param, numerator)| {
                let value = numerator / denominator.clone();
                (param, ops::fold_constants(&value, ctx))
            })
            .collect();

        Ok(vec![Solution { known_values }])
    }
}

/// A symbolic determinant using cofactor expansion along the first row.
fn determinant<C>(matrix: &DMatrix<Expression>, ctx: &C) -> Expression
where
    C: Context,
{
    match matrix.nrows() {
        0 => Expression::Constant(1.0),
        1 => matrix[(0, 0)].clone(),
        n => {
            let mut det = Expression::Constant(0.0);

            for column in 0..n {
                let cofactor = &matrix[(0, column)];
                if ops::is_zero(cofactor, ctx) {
                    continue;
                }

                let term = cofactor.clone()
                    * determinant(&minor(matrix, column), ctx);

                det = if column % 2 == 0 { det + term } else { det - term };
            }

            ops::fold_constants(&det, ctx)
        },
    }
}

/// The matrix without its first row and the given column.
///
/// Cells are cloned one by one, `remove_row()` and `remove_column()` shift
/// elements with raw copies and aren't safe for non-`Copy` cells.
fn minor(matrix: &DMatrix<Expression>, column: usize) -> DMatrix<Expression> {
    let n = matrix.nrows() - 1;

    DMatrix::from_fn(n, n, |row, col| {
        let col = if col < column { col } else { col + 1 };
        matrix[(row + 1, col)].clone()
    })
}

/// Solve a pair of polynomial equations by isolating one unknown and
/// substituting it into the other equation.
fn solve_by_substitution<C>(
    equations: &[Equation],
    unknowns: &[Parameter],
    ctx: &C,
) -> Result<Vec<Solution>, SolveError>
where
    C: Context,
{
    // try the easiest eliminations first
    let mut attempts = Vec::new();
    for (e, equation) in equations.iter().enumerate() {
        for (u, unknown) in unknowns.iter().enumerate() {
            let (cleared, _) =
                polynomial::as_fraction(&equation.body, unknown, ctx);

            match polynomial::polynomial_degree(&cleared, unknown, ctx) {
                Some(degree @ 1..=2) => attempts.push((degree, e, u)),
                _ => {},
            }
        }
    }
    attempts.sort();

    let mut last_error = SolveError::Nonlinear;

    for (_, e, u) in attempts {
        match substitute_and_solve(equations, unknowns, e, u, ctx) {
            Ok(solutions) => return Ok(solutions),
            Err(SolveError::Underdetermined) => {
                return Err(SolveError::Underdetermined)
            },
            Err(other) => {
                log::trace!("Eliminating {} failed: {}", unknowns[u], other);
                last_error = other;
            },
        }
    }

    Err(last_error)
}

fn substitute_and_solve<C>(
    equations: &[Equation],
    unknowns: &[Parameter],
    e: usize,
    u: usize,
    ctx: &C,
) -> Result<Vec<Solution>, SolveError>
where
    C: Context,
{
    let (isolated, other) = (&unknowns[u], &unknowns[1 - u]);
    let (source, target) = (&equations[e].body, &equations[1 - e].body);

    let mut points: Vec<(f64, f64)> = Vec::new();

    for root in isolate(source, isolated, ctx)? {
        let reduced = ops::fold_constants(
            &ops::substitute(target, isolated, &root),
            ctx,
        );

        for value in isolate(&reduced, other, ctx)? {
            let other_value = ops::evaluate(&value, |_| None, ctx)?;
            let isolated_value = ops::evaluate(
                &root,
                |p| if p == other { Some(other_value) } else { None },
                ctx,
            )?;

            if !other_value.is_finite() || !isolated_value.is_finite() {
                continue;
            }

            let seen = points.iter().any(|(a, b)| {
                relative_eq!(*a, isolated_value, max_relative = 1e-9)
                    && relative_eq!(*b, other_value, max_relative = 1e-9)
            });
            if !seen {
                points.push((isolated_value, other_value));
            }
        }
    }

    Ok(points
        .into_iter()
        .map(|(isolated_value, other_value)| Solution {
            known_values: vec![
                (isolated.clone(), Expression::Constant(isolated_value)),
                (other.clone(), Expression::Constant(other_value)),
            ]
            .into_iter()
            .collect(),
        })
        .collect())
}
