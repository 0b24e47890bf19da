use crate::algebra::{
    ops::Context,
    solve::{self, Solution, SolveError},
    Expression, Parameter, ParseError,
};
use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// An equation in implicit form, `body = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub(crate) body: Expression,
}

impl Equation {
    /// The equation `left = right`, stored as `left - right = 0`.
    pub fn new(left: Expression, right: Expression) -> Self {
        Equation { body: left - right }
    }

    /// An expression which is implicitly equal to zero.
    pub fn implicit(body: Expression) -> Self { Equation { body } }

    pub fn body(&self) -> &Expression { &self.body }

    pub fn into_body(self) -> Expression { self.body }
}

impl FromStr for Equation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseError::EmptyEquation);
        }

        match s.matches('=').count() {
            0 => Ok(Equation { body: s.parse()? }),
            1 => {
                let (left, right) = s.split_once('=').unwrap_or((s, ""));
                if left.trim().is_empty() || right.trim().is_empty() {
                    return Err(ParseError::EmptyEquation);
                }

                Ok(Equation::new(left.parse()?, right.parse()?))
            },
            count => Err(ParseError::TooManyEqualsSigns { count }),
        }
    }
}

impl Display for Equation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = 0", self.body)
    }
}

/// A builder for constructing a system of equations and solving them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SystemOfEquations {
    equations: Vec<Equation>,
}

impl SystemOfEquations {
    pub fn new() -> Self { SystemOfEquations::default() }

    pub fn with(mut self, equation: Equation) -> Self {
        self.push(equation);
        self
    }

    pub fn push(&mut self, equation: Equation) {
        self.equations.push(equation);
    }

    pub fn equations(&self) -> &[Equation] { &self.equations }

    /// Every [`Parameter`] mentioned by the system, sorted by name.
    pub fn unknowns(&self) -> Vec<Parameter> {
        let params: BTreeSet<_> = self
            .equations
            .iter()
            .flat_map(|eq| eq.body.params())
            .cloned()
            .collect();

        params.into_iter().collect()
    }

    /// Solve for every [`Parameter`] in the system.
    pub fn solve<C>(&self, ctx: &C) -> Result<Vec<Solution>, SolveError>
    where
        C: Context,
    {
        self.solve_for(&self.unknowns(), ctx)
    }

    /// Solve the system for a particular set of unknowns, treating any other
    /// [`Parameter`] as a symbolic constant.
    ///
    /// An empty list means the system is inconsistent.
    pub fn solve_for<C>(
        &self,
        unknowns: &[Parameter],
        ctx: &C,
    ) -> Result<Vec<Solution>, SolveError>
    where
        C: Context,
    {
        solve::solve(&self.equations, unknowns, ctx)
    }
}
