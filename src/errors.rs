use crate::algebra::{ParseError, SolveError};
use smol_str::SmolStr;

/// Everything that can go wrong while building or solving an economic model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to read the equation \"{equation}\": {source}")]
    Parse {
        equation: String,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Equilibrium(#[from] EquilibriumError),
    #[error("invalid {parameter}: {message}")]
    Validation { parameter: SmolStr, message: String },
    #[error("unable to calculate the surpluses: {source}")]
    Surplus {
        #[source]
        source: Box<Error>,
    },
    #[error("unable to draw the chart: {message}")]
    Graph { message: String },
}

impl Error {
    pub(crate) fn validation<P, M>(parameter: P, message: M) -> Self
    where
        P: Into<SmolStr>,
        M: Into<String>,
    {
        Error::Validation {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub(crate) fn graph<E: std::fmt::Display>(error: E) -> Self {
        Error::Graph {
            message: error.to_string(),
        }
    }
}

/// Why a market or IS-LM equilibrium couldn't be found.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EquilibriumError {
    #[error("there is no equilibrium: the curves never intersect (parallel lines have the same slope but different intercepts)")]
    NoEquilibrium,
    #[error("{}", ambiguous(.count))]
    Ambiguous { count: Option<usize> },
    #[error("the equilibrium is economically meaningless because prices and quantities can't be negative (P* = {price}, Q* = {quantity})")]
    Negative { price: f64, quantity: f64 },
    #[error("unable to solve the system of equations: {0}")]
    Unsolvable(SolveError),
}

impl From<SolveError> for EquilibriumError {
    fn from(e: SolveError) -> Self {
        match e {
            SolveError::Underdetermined => {
                EquilibriumError::Ambiguous { count: None }
            },
            other => EquilibriumError::Unsolvable(other),
        }
    }
}

fn ambiguous(count: &Option<usize>) -> String {
    match count {
        Some(count) => format!(
            "the equilibrium is ambiguous: the curves intersect {} times, rewrite them so there is a single crossing point",
            count
        ),
        None => "the equilibrium is ambiguous: the curves coincide, so every point on them is an equilibrium".to_string(),
    }
}
