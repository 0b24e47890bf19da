use crate::{
    algebra::{Equation, Expression},
    Error,
};

/// Turn equation text like `"Q = 100 - 2P"` into the implicit form
/// `Q - (100 - 2P)`, which is zero on the curve.
///
/// Text without an `=` is already assumed to equal zero.
pub fn normalize(equation: &str) -> Result<Expression, Error> {
    let parsed: Equation = equation.parse().map_err(|source| Error::Parse {
        equation: equation.to_string(),
        source,
    })?;

    log::debug!("Normalized \"{}\" to {}", equation, parsed);

    Ok(parsed.into_body())
}
