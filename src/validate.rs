//! Fail-fast checks for the numbers and equations handed to a model.

use crate::{algebra::ParseError, market::CurveKind, Error};

fn finite(value: f64, name: &str) -> Result<f64, Error> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::validation(
            name,
            format!("{} must be a finite number, got {}", name, value),
        ))
    }
}

/// Prices, incomes and elasticity inputs must be strictly positive.
pub fn validate_positive(value: f64, name: &str) -> Result<f64, Error> {
    let value = finite(value, name)?;

    if value > 0.0 {
        Ok(value)
    } else {
        Err(Error::validation(
            name,
            format!("{} must be positive, got {}", name, value),
        ))
    }
}

pub fn validate_non_negative(value: f64, name: &str) -> Result<f64, Error> {
    let value = finite(value, name)?;

    if value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::validation(
            name,
            format!(
                "{} can't be negative (got {}), quantities and prices start at zero",
                name, value
            ),
        ))
    }
}

/// Check that `min <= value <= max`, either bound may be left open.
pub fn validate_range(
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
    name: &str,
) -> Result<f64, Error> {
    let value = finite(value, name)?;

    if let Some(min) = min {
        if value < min {
            return Err(Error::validation(
                name,
                format!("{} must be at least {}, got {}", name, min, value),
            ));
        }
    }

    if let Some(max) = max {
        if value > max {
            return Err(Error::validation(
                name,
                format!("{} must be at most {}, got {}", name, max, value),
            ));
        }
    }

    Ok(value)
}

/// Marginal propensities (to consume, save, import) lie in `[0, 1]`.
pub fn validate_propensity(value: f64, name: &str) -> Result<f64, Error> {
    validate_range(value, Some(0.0), Some(1.0), name).map_err(|_| {
        Error::validation(
            name,
            format!(
                "{} must be between 0 and 1 because households can't spend less than nothing or more than all of an extra unit of income, got {}",
                name, value
            ),
        )
    })
}

/// Elasticities may be any finite number, but an unusual sign for the kind
/// of curve is worth a warning.
pub fn validate_elasticity(
    value: f64,
    name: &str,
    kind: Option<CurveKind>,
) -> Result<f64, Error> {
    let value = finite(value, name)?;

    match kind {
        Some(CurveKind::Demand) if value > 0.0 => log::warn!(
            "The {} is positive ({:.4}), demand usually falls as the price rises. This would be a Giffen good",
            name,
            value
        ),
        Some(CurveKind::Supply) if value < 0.0 => log::warn!(
            "The {} is negative ({:.4}), supply usually rises with the price",
            name,
            value
        ),
        _ => {},
    }

    Ok(value)
}

/// Reject equation text that can never be normalized.
///
/// These are the same checks the parser makes, so the error is always
/// [`Error::Parse`].
pub fn validate_equation(equation: &str) -> Result<(), Error> {
    let problem = if equation.trim().is_empty() {
        ParseError::EmptyEquation
    } else {
        match equation.matches('=').count() {
            0 | 1 => return Ok(()),
            count => ParseError::TooManyEqualsSigns { count },
        }
    };

    Err(Error::Parse {
        equation: equation.to_string(),
        source: problem,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_checked() {
        let inputs: Vec<(Result<f64, Error>, bool)> = vec![
            (validate_positive(1.0, "price"), true),
            (validate_positive(0.0, "price"), false),
            (validate_positive(f64::NAN, "price"), false),
            (validate_non_negative(0.0, "quantity"), true),
            (validate_non_negative(-0.5, "quantity"), false),
            (validate_non_negative(f64::INFINITY, "quantity"), false),
            (validate_range(5.0, Some(0.0), None, "x"), true),
            (validate_range(5.0, None, Some(4.0), "x"), false),
            (validate_propensity(0.8, "mpc"), true),
            (validate_propensity(1.2, "mpc"), false),
            (validate_propensity(-0.1, "mpc"), false),
            (validate_elasticity(0.5, "elasticity", None), true),
            (validate_elasticity(f64::NAN, "elasticity", None), false),
        ];

        for (i, (got, ok)) in inputs.into_iter().enumerate() {
            assert_eq!(got.is_ok(), ok, "case {}: {:?}", i, got);
        }
    }

    #[test]
    fn unusual_elasticity_signs_are_only_warnings() {
        let got =
            validate_elasticity(0.3, "price elasticity", Some(CurveKind::Demand))
                .unwrap();

        assert_eq!(got, 0.3);
    }

    #[test]
    fn validation_errors_name_the_parameter() {
        match validate_positive(-2.0, "price").unwrap_err() {
            Error::Validation { parameter, message } => {
                assert_eq!(parameter, "price");
                assert!(message.contains("-2"));
            },
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[test]
    fn equations_need_one_equals_sign_at_most() {
        assert!(validate_equation("Q = 100 - 2P").is_ok());
        assert!(validate_equation("Q + 2P - 100").is_ok());

        let inputs = vec![
            ("  ", ParseError::EmptyEquation),
            ("Q = 1 = 2", ParseError::TooManyEqualsSigns { count: 2 }),
        ];

        for (equation, should_be) in inputs {
            match validate_equation(equation).unwrap_err() {
                Error::Parse { equation: got, source } => {
                    assert_eq!(got, equation);
                    assert_eq!(source, should_be);
                },
                other => panic!("Unexpected error: {:?}", other),
            }
        }
    }
}
