use crate::algebra::parse::GREEK_LETTERS;
use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Div, Mul, Neg, Sub},
};

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Parameter(Parameter),
    Constant(f64),
    /// An expression involving two operands.
    Binary {
        left: Box<Expression>,
        right: Box<Expression>,
        op: BinaryOperation,
    },
    /// Negate the expression.
    Negate(Box<Expression>),
    /// Invoke a builtin function.
    FunctionCall {
        function: SmolStr,
        argument: Box<Expression>,
    },
}

impl Expression {
    pub fn named<S: Into<SmolStr>>(name: S) -> Self {
        Expression::Parameter(Parameter::named(name))
    }

    pub fn call<S: Into<SmolStr>>(function: S, argument: Expression) -> Self {
        Expression::FunctionCall {
            function: function.into(),
            argument: Box::new(argument),
        }
    }

    pub fn binary(
        left: Expression,
        op: BinaryOperation,
        right: Expression,
    ) -> Self {
        Expression::Binary {
            left: Box::new(left),
            right: Box::new(right),
            op,
        }
    }

    pub fn pow(self, exponent: Expression) -> Self {
        Expression::binary(self, BinaryOperation::Power, exponent)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Constant(_))
    }

    /// Every [`Parameter`] mentioned by this expression, in the order they
    /// appear (duplicates included).
    pub fn params(&self) -> impl Iterator<Item = &Parameter> + '_ {
        let mut params = Vec::new();
        self.visit_params(&mut |p| params.push(p));
        params.into_iter()
    }

    pub fn depends_on(&self, param: &Parameter) -> bool {
        match self {
            Expression::Parameter(p) => p == param,
            Expression::Constant(_) => false,
            Expression::Binary { left, right, .. } => {
                left.depends_on(param) || right.depends_on(param)
            },
            Expression::Negate(inner) => inner.depends_on(param),
            Expression::FunctionCall { argument, .. } => {
                argument.depends_on(param)
            },
        }
    }

    fn visit_params<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a Parameter),
    {
        match self {
            Expression::Parameter(p) => visit(p),
            Expression::Constant(_) => {},
            Expression::Binary { left, right, .. } => {
                left.visit_params(visit);
                right.visit_params(visit);
            },
            Expression::Negate(inner) => inner.visit_params(visit),
            Expression::FunctionCall { argument, .. } => {
                argument.visit_params(visit)
            },
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Binary { op, .. } => op.precedence(),
            Expression::Negate(_) => 2,
            Expression::Constant(value) if value.is_sign_negative() => 2,
            _ => 4,
        }
    }
}

/// A named unknown, e.g. `P`, `Q_d` or `rho`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Parameter {
    name: SmolStr,
}

impl Parameter {
    pub fn named<S: Into<SmolStr>>(name: S) -> Self {
        Parameter { name: name.into() }
    }

    pub fn name(&self) -> &str { &self.name }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = self.name.as_str();
        let mut chars = name.chars();

        match (chars.next(), chars.next()) {
            (Some(_), None) => write!(f, "{}", name),
            (Some(base), Some('_')) => {
                write!(f, "{}_{{{}}}", base, &name[base.len_utf8() + 1..])
            },
            _ if GREEK_LETTERS.contains(&name) => write!(f, "\\{}", name),
            _ => write!(f, "\\text{{{}}}", name),
        }
    }
}

/// An operation that can be applied to two arguments.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperation {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

impl BinaryOperation {
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOperation::Plus => left + right,
            BinaryOperation::Minus => left - right,
            BinaryOperation::Times => left * right,
            BinaryOperation::Divide => left / right,
            BinaryOperation::Power => left.powf(right),
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOperation::Plus | BinaryOperation::Minus => 1,
            BinaryOperation::Times | BinaryOperation::Divide => 2,
            BinaryOperation::Power => 3,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            BinaryOperation::Plus => " + ",
            BinaryOperation::Minus => " - ",
            BinaryOperation::Times => "*",
            BinaryOperation::Divide => "/",
            BinaryOperation::Power => "^",
        }
    }
}

// define some operator overloads to make constructing an expression easier.

impl Add for Expression {
    type Output = Expression;

    fn add(self, rhs: Expression) -> Expression {
        Expression::binary(self, BinaryOperation::Plus, rhs)
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(self, rhs: Expression) -> Expression {
        Expression::binary(self, BinaryOperation::Minus, rhs)
    }
}

impl Mul for Expression {
    type Output = Expression;

    fn mul(self, rhs: Expression) -> Expression {
        Expression::binary(self, BinaryOperation::Times, rhs)
    }
}

impl Div for Expression {
    type Output = Expression;

    fn div(self, rhs: Expression) -> Expression {
        Expression::binary(self, BinaryOperation::Divide, rhs)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Self::Output { Expression::Negate(Box::new(self)) }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self { Expression::Constant(value) }
}

impl From<Parameter> for Expression {
    fn from(param: Parameter) -> Self { Expression::Parameter(param) }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Parameter(p) => write!(f, "{}", p),
            Expression::Constant(value) => write!(f, "{}", value),
            Expression::Binary { left, right, op } => {
                // powers are right-associative and bind tighter than a
                // leading minus, so their base always needs brackets
                let left_needs_parens = if *op == BinaryOperation::Power {
                    left.precedence() <= op.precedence()
                } else {
                    left.precedence() < op.precedence()
                };
                write_operand(left, left_needs_parens, f)?;
                write!(f, "{}", op.symbol())?;
                write_operand(right, right.precedence() <= op.precedence(), f)
            },
            Expression::Negate(inner) => {
                write!(f, "-")?;
                let needs_parens =
                    matches!(**inner, Expression::Binary { .. })
                        || inner.precedence() < 4;
                write_operand(inner, needs_parens, f)
            },
            Expression::FunctionCall { function, argument } => {
                write!(f, "{}({})", function, argument)
            },
        }
    }
}

fn write_operand(
    expr: &Expression,
    needs_parens: bool,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    if needs_parens {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}
