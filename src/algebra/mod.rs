//! The symbolic algebra system.

mod equations;
mod expr;
pub mod ops;
mod parse;
pub mod polynomial;
mod solve;

pub use equations::{Equation, SystemOfEquations};
pub use expr::{BinaryOperation, Expression, Parameter};
pub use parse::{parse, ParseError, TokenKind};
pub use solve::{isolate, Roots, Solution, SolveError};
