//! Supply and demand.

use crate::{
    algebra::{
        isolate,
        ops::{self, Builtins},
        Equation, Expression, Parameter, SystemOfEquations,
    },
    display::{Report, Results},
    help::{EconomicHelp, Explain},
    normalize,
    validate::{
        validate_elasticity, validate_equation, validate_non_negative,
        validate_positive,
    },
    EquilibriumError, Error,
};
use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    ops::Deref,
};

/// The name of the price variable in curve equations.
pub const PRICE: &str = "P";
/// The name of the quantity variable in curve equations.
pub const QUANTITY: &str = "Q";

fn price_param() -> Parameter { Parameter::named(PRICE) }

fn quantity_param() -> Parameter { Parameter::named(QUANTITY) }

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CurveKind {
    Demand,
    Supply,
}

impl CurveKind {
    pub fn name(self) -> &'static str {
        match self {
            CurveKind::Demand => "demand",
            CurveKind::Supply => "supply",
        }
    }
}

impl Display for CurveKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CurveKind::Demand => write!(f, "Demand"),
            CurveKind::Supply => write!(f, "Supply"),
        }
    }
}

/// How strongly quantity responds to the price.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ElasticityClass {
    /// `|ε| > 1`
    Elastic,
    /// `|ε| < 1`
    Inelastic,
    /// `|ε| = 1`
    Unitary,
}

impl ElasticityClass {
    pub fn classify(elasticity: f64) -> Self {
        let magnitude = elasticity.abs();

        if (magnitude - 1.0).abs() <= 1e-9 {
            ElasticityClass::Unitary
        } else if magnitude > 1.0 {
            ElasticityClass::Elastic
        } else {
            ElasticityClass::Inelastic
        }
    }

    fn explanation(self, kind: CurveKind) -> &'static str {
        match (kind, self) {
            (CurveKind::Demand, ElasticityClass::Elastic) => {
                "consumers are very sensitive to the price, a 1% price rise cuts the quantity demanded by more than 1%"
            },
            (CurveKind::Demand, ElasticityClass::Inelastic) => {
                "consumers are not very sensitive to the price, a 1% price rise cuts the quantity demanded by less than 1%"
            },
            (CurveKind::Demand, ElasticityClass::Unitary) => {
                "a 1% price rise cuts the quantity demanded by exactly 1%, so total spending stays the same"
            },
            (CurveKind::Supply, ElasticityClass::Elastic) => {
                "producers can easily expand output when the price rises"
            },
            (CurveKind::Supply, ElasticityClass::Inelastic) => {
                "producers struggle to expand output when the price rises"
            },
            (CurveKind::Supply, ElasticityClass::Unitary) => {
                "output grows in exact proportion to the price"
            },
        }
    }
}

impl Display for ElasticityClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ElasticityClass::Elastic => write!(f, "ELASTIC"),
            ElasticityClass::Inelastic => write!(f, "INELASTIC"),
            ElasticityClass::Unitary => write!(f, "UNIT ELASTIC"),
        }
    }
}

/// A market curve relating the price, `P`, and quantity, `Q`.
///
/// The equation is kept in its implicit form, `lhs - rhs = 0`, and solved
/// for whichever variable is needed on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    kind: CurveKind,
    equation: String,
    expression: Expression,
}

impl Curve {
    pub fn new(kind: CurveKind, equation: &str) -> Result<Self, Error> {
        validate_equation(equation)?;
        let expression = normalize(equation)?;
        let (price, quantity) = (price_param(), quantity_param());

        if let Some(unknown) =
            expression.params().find(|p| **p != price && **p != quantity)
        {
            return Err(Error::validation(
                kind.name(),
                format!(
                    "a {} curve may only mention {} and {}, but \"{}\" uses \"{}\"",
                    kind.name(),
                    PRICE,
                    QUANTITY,
                    equation,
                    unknown.name()
                ),
            ));
        }

        if !expression.depends_on(&price) && !expression.depends_on(&quantity)
        {
            return Err(Error::validation(
                kind.name(),
                format!(
                    "a {} curve must relate {} and {}, \"{}\" mentions neither",
                    kind.name(),
                    PRICE,
                    QUANTITY,
                    equation
                ),
            ));
        }

        log::debug!("{} curve: {} = 0", kind, expression);

        Ok(Curve {
            kind,
            equation: equation.to_string(),
            expression,
        })
    }

    pub fn kind(&self) -> CurveKind { self.kind }

    /// The equation as it was originally written.
    pub fn equation(&self) -> &str { &self.equation }

    /// The normalized expression, which is zero along the curve.
    pub fn expression(&self) -> &Expression { &self.expression }

    /// The quantity at a particular price.
    pub fn quantity(&self, price: f64) -> Result<f64, Error> {
        let price = validate_positive(price, "price")?;
        let (_, quantity) =
            self.branch(&quantity_param(), &price_param(), price)?;

        Ok(quantity.max(0.0))
    }

    /// The price at a particular quantity.
    pub fn price(&self, quantity: f64) -> Result<f64, Error> {
        let quantity = validate_non_negative(quantity, "quantity")?;
        let (_, price) =
            self.branch(&price_param(), &quantity_param(), quantity)?;

        Ok(price.max(0.0))
    }

    /// The point price elasticity, `ε = dQ/dP · P/Q`.
    pub fn price_elasticity(
        &self,
        price: f64,
        quantity: f64,
    ) -> Result<f64, Error> {
        let price = validate_positive(price, "price")?;
        let quantity = validate_positive(quantity, "quantity")?;
        let p = price_param();

        let (schedule, _) = self.branch(&quantity_param(), &p, price)?;
        let slope = ops::partial_derivative(&schedule, &p, &Builtins)
            .and_then(|derivative| {
                ops::evaluate(
                    &derivative,
                    |x| if x == &p { Some(price) } else { None },
                    &Builtins,
                )
            })
            .map_err(|e| {
                Error::validation(
                    "price elasticity",
                    format!(
                        "unable to differentiate the {} curve: {}",
                        self.kind.name(),
                        e
                    ),
                )
            })?;

        validate_elasticity(
            slope * price / quantity,
            "price elasticity",
            Some(self.kind),
        )
    }

    pub fn elasticity_class(
        &self,
        price: f64,
        quantity: f64,
    ) -> Result<ElasticityClass, Error> {
        self.price_elasticity(price, quantity)
            .map(ElasticityClass::classify)
    }

    /// A sentence explaining what the elasticity at this point means.
    pub fn interpret_elasticity(
        &self,
        price: f64,
        quantity: f64,
    ) -> Result<String, Error> {
        let elasticity = self.price_elasticity(price, quantity)?;
        let class = ElasticityClass::classify(elasticity);
        let symbol = match self.kind {
            CurveKind::Demand => "ε",
            CurveKind::Supply => "η",
        };

        Ok(format!(
            "{} is {} ({} = {:.2}): {}",
            self.kind,
            class,
            symbol,
            elasticity,
            class.explanation(self.kind)
        ))
    }

    /// The price along the curve, or `None` when it isn't defined or would
    /// be negative.
    pub(crate) fn price_at(&self, quantity: f64) -> Option<f64> {
        self.branch(&price_param(), &quantity_param(), quantity)
            .ok()
            .map(|(_, price)| price)
            .filter(|price| *price >= 0.0)
    }

    /// `∫₀^q P(Q) dQ`, the area under the inverse curve.
    fn area_under_inverse(&self, quantity: f64) -> Result<f64, Error> {
        let q = quantity_param();
        let (inverse, _) = self.branch(&price_param(), &q, quantity)?;

        ops::definite_integral(&inverse, &q, 0.0, quantity, &Builtins).map_err(
            |e| {
                Error::validation(
                    self.kind.name(),
                    format!(
                        "unable to integrate the inverse {} curve: {}",
                        self.kind.name(),
                        e
                    ),
                )
            },
        )
    }

    /// Solve for `target` given `known = at`, returning the chosen root and
    /// its value.
    ///
    /// The first root which is finite and non-negative wins, falling back to
    /// the first finite root.
    fn branch(
        &self,
        target: &Parameter,
        known: &Parameter,
        at: f64,
    ) -> Result<(Expression, f64), Error> {
        let roots =
            isolate(&self.expression, target, &Builtins).map_err(|e| {
                Error::validation(
                    self.kind.name(),
                    format!(
                        "unable to solve the {} curve \"{}\" for {}: {}",
                        self.kind.name(),
                        self.equation,
                        target.name(),
                        e
                    ),
                )
            })?;

        let mut candidates: Vec<(Expression, f64)> = roots
            .into_iter()
            .filter_map(|root| {
                let value = ops::evaluate(
                    &root,
                    |p| if p == known { Some(at) } else { None },
                    &Builtins,
                )
                .ok()?;

                if value.is_finite() {
                    Some((root, value))
                } else {
                    None
                }
            })
            .collect();

        let chosen = candidates
            .iter()
            .position(|(_, value)| *value >= 0.0)
            .unwrap_or(0);

        if chosen < candidates.len() {
            Ok(candidates.swap_remove(chosen))
        } else {
            Err(Error::validation(
                self.kind.name(),
                format!(
                    "the {} curve \"{}\" has no real value of {} when {} = {}",
                    self.kind.name(),
                    self.equation,
                    target.name(),
                    known.name(),
                    at
                ),
            ))
        }
    }
}

impl Display for Curve {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.equation)
    }
}

/// A demand curve, e.g. `Q = 100 - 2P`.
#[derive(Debug, Clone, PartialEq)]
pub struct Demand(Curve);

impl Demand {
    pub fn new(equation: &str) -> Result<Self, Error> {
        Curve::new(CurveKind::Demand, equation).map(Demand)
    }
}

impl Deref for Demand {
    type Target = Curve;

    fn deref(&self) -> &Curve { &self.0 }
}

impl Display for Demand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A supply curve, e.g. `Q = -20 + 3P`.
#[derive(Debug, Clone, PartialEq)]
pub struct Supply(Curve);

impl Supply {
    pub fn new(equation: &str) -> Result<Self, Error> {
        Curve::new(CurveKind::Supply, equation).map(Supply)
    }
}

impl Deref for Supply {
    type Target = Curve;

    fn deref(&self) -> &Curve { &self.0 }
}

impl Display for Supply {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl Explain for Demand {
    fn help() -> EconomicHelp {
        EconomicHelp {
            title: "Demand",
            description: "The demand curve shows how much of a good consumers are willing and able to buy at each price. By the law of demand it slopes downwards: a higher price means a smaller quantity demanded.",
            assumptions: &[
                "ceteris paribus, income, tastes and the prices of related goods are held constant",
                "consumers are rational and maximise their utility",
                "the good is a normal good",
            ],
            courses: &["Microeconomics I", "Principles of Economics"],
        }
    }

    fn explain(&self) -> String {
        format!(
            "{}\n\nThis curve: {}",
            Self::help(),
            self.equation()
        )
    }
}

impl Explain for Supply {
    fn help() -> EconomicHelp {
        EconomicHelp {
            title: "Supply",
            description: "The supply curve shows how much of a good producers are willing to sell at each price. By the law of supply it slopes upwards: a higher price makes it profitable to produce more.",
            assumptions: &[
                "ceteris paribus, technology and input prices are held constant",
                "firms maximise their profits",
                "the market is perfectly competitive",
            ],
            courses: &["Microeconomics I", "Principles of Economics"],
        }
    }

    fn explain(&self) -> String {
        format!(
            "{}\n\nThis curve: {}",
            Self::help(),
            self.equation()
        )
    }
}

/// The point where the quantity supplied equals the quantity demanded.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Equilibrium {
    pub price: f64,
    pub quantity: f64,
}

impl Report for Equilibrium {
    fn results(&self) -> Results {
        [
            (SmolStr::new_inline("P*"), self.price),
            (SmolStr::new_inline("Q*"), self.quantity),
        ]
        .into_iter()
        .collect()
    }
}

impl Explain for Equilibrium {
    fn help() -> EconomicHelp {
        EconomicHelp {
            title: "Market equilibrium",
            description: "The market clears at the price where the quantity consumers want to buy equals the quantity producers want to sell. Above it there is a surplus of goods, below it a shortage.",
            assumptions: &[
                "perfect competition, nobody can set the price",
                "perfect information",
                "prices adjust freely",
            ],
            courses: &["Microeconomics I", "Principles of Economics"],
        }
    }

    fn explain(&self) -> String {
        format!(
            "{}\n\nThe market clears at P* = {:.2} and Q* = {:.2}.",
            Self::help(),
            self.price,
            self.quantity
        )
    }
}

/// Find the market equilibrium, `(P*, Q*)`.
pub fn equilibrium(
    supply: &Supply,
    demand: &Demand,
) -> Result<Equilibrium, Error> {
    let (p, q) = (price_param(), quantity_param());

    let system = SystemOfEquations::new()
        .with(Equation::implicit(supply.expression().clone()))
        .with(Equation::implicit(demand.expression().clone()));

    let solutions = system
        .solve_for(&[p.clone(), q.clone()], &Builtins)
        .map_err(EquilibriumError::from)?;

    let solution = match solutions.as_slice() {
        [] => return Err(EquilibriumError::NoEquilibrium.into()),
        [solution] => solution,
        many => {
            return Err(EquilibriumError::Ambiguous {
                count: Some(many.len()),
            }
            .into())
        },
    };

    let value_of = |param: &Parameter| {
        solution
            .evaluate(param, |_| None, &Builtins)
            .map(round_off_zero)
            .map_err(EquilibriumError::from)
    };
    let price = value_of(&p)?;
    let quantity = value_of(&q)?;

    if price < 0.0 || quantity < 0.0 {
        return Err(EquilibriumError::Negative { price, quantity }.into());
    }

    log::debug!("Market equilibrium at P* = {}, Q* = {}", price, quantity);

    Ok(Equilibrium { price, quantity })
}

/// Tiny negatives are rounding error, not a negative equilibrium.
fn round_off_zero(value: f64) -> f64 {
    if value.abs() < 1e-12 {
        0.0
    } else {
        value
    }
}

/// Consumer, producer and total surplus at a price and quantity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Surplus {
    pub consumer: f64,
    pub producer: f64,
    pub social: f64,
    pub price: f64,
    pub quantity: f64,
}

impl Report for Surplus {
    fn results(&self) -> Results {
        [
            (SmolStr::new_inline("EC"), self.consumer),
            (SmolStr::new_inline("EP"), self.producer),
            (SmolStr::new_inline("ES"), self.social),
            (SmolStr::new_inline("P"), self.price),
            (SmolStr::new_inline("Q"), self.quantity),
        ]
        .into_iter()
        .collect()
    }
}

/// Calculate the surpluses at a particular price and quantity, defaulting to
/// the market equilibrium when either is missing.
///
/// - consumer surplus: `∫₀^Q P_d(q) dq - P·Q`
/// - producer surplus: `P·Q - ∫₀^Q P_s(q) dq`
pub fn surplus(
    supply: &Supply,
    demand: &Demand,
    price: Option<f64>,
    quantity: Option<f64>,
) -> Result<Surplus, Error> {
    let (price, quantity) = match (price, quantity) {
        (Some(price), Some(quantity)) => (
            validate_non_negative(price, "price")?,
            validate_non_negative(quantity, "quantity")?,
        ),
        _ => {
            let Equilibrium { price, quantity } = equilibrium(supply, demand)?;
            (price, quantity)
        },
    };

    let wrap = |source: Error| Error::Surplus {
        source: Box::new(source),
    };
    let under_demand = demand.area_under_inverse(quantity).map_err(wrap)?;
    let under_supply = supply.area_under_inverse(quantity).map_err(wrap)?;

    let spending = price * quantity;
    let consumer = under_demand - spending;
    let producer = spending - under_supply;

    Ok(Surplus {
        consumer,
        producer,
        social: consumer + producer,
        price,
        quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn textbook_market() -> (Supply, Demand) {
        (
            Supply::new("Q = -20 + 3P").unwrap(),
            Demand::new("Q = 100 - 2P").unwrap(),
        )
    }

    #[test]
    fn evaluate_the_curves() {
        let (supply, demand) = textbook_market();

        assert_eq!(demand.quantity(10.0).unwrap(), 80.0);
        assert_eq!(demand.price(80.0).unwrap(), 10.0);
        assert_eq!(supply.quantity(15.0).unwrap(), 25.0);
        assert_eq!(supply.price(25.0).unwrap(), 15.0);
    }

    #[test]
    fn negative_quantities_are_clamped() {
        let (supply, demand) = textbook_market();

        assert_eq!(demand.quantity(60.0).unwrap(), 0.0);
        assert_eq!(supply.quantity(5.0).unwrap(), 0.0);
    }

    #[test]
    fn price_and_quantity_are_inverses() {
        let inputs = vec![
            ("Q = 100 - 2P", vec![1.0, 10.0, 24.0, 37.5, 49.0]),
            ("Q = 100 - P^2", vec![0.5, 2.5, 5.0, 7.5, 9.9]),
            ("Q = 100/P", vec![0.5, 4.0, 10.0, 250.0]),
        ];

        for (src, prices) in inputs {
            let demand = Demand::new(src).unwrap();

            for price in prices {
                let quantity = demand.quantity(price).unwrap();

                let got = demand.price(quantity).unwrap();

                assert_relative_eq!(got, price, max_relative = 1e-9);
            }
        }

        let supply = Supply::new("Q = -20 + 3P").unwrap();
        for price in [7.0, 15.0, 24.0, 80.0] {
            let quantity = supply.quantity(price).unwrap();
            assert_relative_eq!(
                supply.price(quantity).unwrap(),
                price,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn curves_are_clamped_at_their_intercepts() {
        let (supply, demand) = textbook_market();

        // the demand curve meets the price axis at P = 50
        assert_eq!(demand.quantity(50.0).unwrap(), 0.0);
        assert_eq!(demand.price(0.0).unwrap(), 50.0);
        assert_eq!(demand.price(100.0).unwrap(), 0.0);
        assert_eq!(demand.price(120.0).unwrap(), 0.0);
        // supply only starts above P = 20/3
        assert_relative_eq!(
            supply.price(0.0).unwrap(),
            20.0 / 3.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            supply.quantity(20.0 / 3.0).unwrap(),
            0.0,
            epsilon = 1e-9
        );
        assert_eq!(supply.quantity(1.0).unwrap(), 0.0);
    }

    #[test]
    fn tiny_slopes_are_not_rounded_away() {
        let demand = Demand::new("Q = 1 - 0.0000005P").unwrap();

        assert_relative_eq!(
            demand.quantity(1_000_000.0).unwrap(),
            0.5,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            demand.price(0.5).unwrap(),
            1_000_000.0,
            max_relative = 1e-9
        );
    }

    #[test]
    fn hyperbolic_demand() {
        let demand = Demand::new("Q = 100/P").unwrap();
        let supply = Supply::new("P = 5").unwrap();

        assert_relative_eq!(demand.price(10.0).unwrap(), 10.0);
        assert_relative_eq!(demand.quantity(4.0).unwrap(), 25.0);
        // spending is the same at every price
        assert_relative_eq!(demand.price_elasticity(10.0, 10.0).unwrap(), -1.0);
        assert_eq!(
            demand.elasticity_class(4.0, 25.0).unwrap(),
            ElasticityClass::Unitary
        );
        assert_eq!(demand.price_at(20.0), Some(5.0));

        let got = equilibrium(&supply, &demand).unwrap();

        assert_relative_eq!(got.price, 5.0, max_relative = 1e-12);
        assert_relative_eq!(got.quantity, 20.0, max_relative = 1e-12);
    }

    #[test]
    fn a_hyperbola_and_a_line_through_the_origin_cross_twice() {
        let demand = Demand::new("Q = 100/P").unwrap();
        let supply = Supply::new("Q = P").unwrap();

        let got = equilibrium(&supply, &demand).unwrap_err();

        assert!(matches!(
            got,
            Error::Equilibrium(EquilibriumError::Ambiguous { count: Some(2) })
        ));
    }

    #[test]
    fn extra_equals_signs_are_parse_errors() {
        let inputs = vec!["Q = 1 = P", "Q = 100 - 2P = 3 = 4"];

        for src in inputs {
            match Demand::new(src).unwrap_err() {
                Error::Parse { equation, source } => {
                    assert_eq!(equation, src);
                    assert!(matches!(
                        source,
                        crate::algebra::ParseError::TooManyEqualsSigns { .. }
                    ));
                },
                other => panic!("Unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn bad_inputs_are_rejected() {
        let (_, demand) = textbook_market();

        assert!(demand.quantity(0.0).is_err());
        assert!(demand.quantity(-3.0).is_err());
        assert!(demand.price(-1.0).is_err());
        assert!(demand.price_elasticity(10.0, 0.0).is_err());
    }

    #[test]
    fn quadratic_curves_pick_the_non_negative_branch() {
        let demand = Demand::new("Q = 100 - P^2").unwrap();

        assert_relative_eq!(demand.price(64.0).unwrap(), 6.0);
        assert_relative_eq!(demand.quantity(6.0).unwrap(), 64.0);
    }

    #[test]
    fn curves_only_mention_price_and_quantity() {
        let inputs = vec!["Q = 100 - 2X", "5 = 5", "", "Q = = P"];

        for src in inputs {
            assert!(Demand::new(src).is_err(), "{:?} should be rejected", src);
        }
    }

    #[test]
    fn a_curve_without_the_target_variable_has_no_value() {
        let demand = Demand::new("Q = 50").unwrap();

        assert_eq!(demand.quantity(3.0).unwrap(), 50.0);
        assert!(demand.price(10.0).is_err());
    }

    #[test]
    fn elasticities() {
        let (supply, demand) = textbook_market();

        assert_relative_eq!(demand.price_elasticity(10.0, 80.0).unwrap(), -0.25);
        assert_relative_eq!(supply.price_elasticity(15.0, 25.0).unwrap(), 1.8);
    }

    #[test]
    fn elasticity_signs() {
        let demands = vec!["Q = 100 - 2P", "Q = 50 - 0.5P", "P = 40 - Q"];
        let supplies = vec!["Q = -20 + 3P", "Q = 2P", "P = 5 + Q"];

        for src in demands {
            let demand = Demand::new(src).unwrap();
            let q = demand.quantity(10.0).unwrap();

            assert!(demand.price_elasticity(10.0, q).unwrap() < 0.0, "{}", src);
        }

        for src in supplies {
            let supply = Supply::new(src).unwrap();
            let q = supply.quantity(10.0).unwrap();

            assert!(supply.price_elasticity(10.0, q).unwrap() > 0.0, "{}", src);
        }
    }

    #[test]
    fn classify_elasticities() {
        let inputs = vec![
            (-0.25, ElasticityClass::Inelastic),
            (1.8, ElasticityClass::Elastic),
            (-1.0, ElasticityClass::Unitary),
            (1.0 + 1e-12, ElasticityClass::Unitary),
            (-3.0, ElasticityClass::Elastic),
            (0.0, ElasticityClass::Inelastic),
        ];

        for (elasticity, should_be) in inputs {
            assert_eq!(ElasticityClass::classify(elasticity), should_be);
        }
    }

    #[test]
    fn interpretations_explain_the_class() {
        let (supply, demand) = textbook_market();

        let got = demand.interpret_elasticity(10.0, 80.0).unwrap();
        assert!(got.starts_with("Demand is INELASTIC (ε = -0.25)"), "{}", got);

        let got = supply.interpret_elasticity(15.0, 25.0).unwrap();
        assert!(got.starts_with("Supply is ELASTIC (η = 1.80)"), "{}", got);
    }

    #[test]
    fn textbook_equilibrium() {
        let (supply, demand) = textbook_market();

        let got = equilibrium(&supply, &demand).unwrap();

        assert_relative_eq!(got.price, 24.0);
        assert_relative_eq!(got.quantity, 52.0);
        let results = got.results();
        assert_eq!(results.keys().collect::<Vec<_>>(), vec!["P*", "Q*"]);
    }

    #[test]
    fn linear_equilibrium_formula() {
        // demand Q = a - bP and supply Q = c + dP
        let inputs = vec![
            (100.0, 2.0, -20.0, 3.0),
            (50.0, 1.0, 10.0, 1.0),
            (80.0, 0.5, 0.0, 1.5),
            (12.0, 3.0, 2.0, 2.0),
        ];

        for (a, b, c, d) in inputs {
            let demand = Demand::new(&format!("Q = {} - {}P", a, b)).unwrap();
            let supply = Supply::new(&format!("Q = {} + {}P", c, d)).unwrap();

            let got = equilibrium(&supply, &demand).unwrap();

            let price = (a - c) / (b + d);
            assert_relative_eq!(got.price, price, max_relative = 1e-9);
            assert_relative_eq!(got.quantity, a - b * price, max_relative = 1e-9);
            // the equilibrium lies on both curves
            assert_relative_eq!(
                demand.quantity(got.price).unwrap(),
                got.quantity,
                max_relative = 1e-9
            );
            assert_relative_eq!(
                supply.quantity(got.price).unwrap(),
                got.quantity,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn equilibrium_doesnt_depend_on_the_equation_order() {
        let first = Supply::new("Q = -20 + 3P").unwrap();
        let second = Demand::new("Q = 100 - 2P").unwrap();
        let swapped_supply = Supply::new("Q = 100 - 2P").unwrap();
        let swapped_demand = Demand::new("Q = -20 + 3P").unwrap();

        let got = equilibrium(&first, &second).unwrap();
        let swapped = equilibrium(&swapped_supply, &swapped_demand).unwrap();

        assert_relative_eq!(got.price, swapped.price);
        assert_relative_eq!(got.quantity, swapped.quantity);
    }

    #[test]
    fn curves_written_for_the_price_give_the_same_equilibrium() {
        let supply = Supply::new("P = \\frac{Q + 20}{3}").unwrap();
        let demand = Demand::new("P = 50 - 0.5Q").unwrap();

        let got = equilibrium(&supply, &demand).unwrap();

        assert_relative_eq!(got.price, 24.0, max_relative = 1e-12);
        assert_relative_eq!(got.quantity, 52.0, max_relative = 1e-12);
    }

    #[test]
    fn parallel_curves_have_no_equilibrium() {
        let demand = Demand::new("Q = 10 - P").unwrap();
        let supply = Supply::new("Q = 20 - P").unwrap();

        let got = equilibrium(&supply, &demand).unwrap_err();

        assert!(matches!(
            got,
            Error::Equilibrium(EquilibriumError::NoEquilibrium)
        ));
    }

    #[test]
    fn identical_curves_are_ambiguous() {
        let demand = Demand::new("Q = 10 - P").unwrap();
        let supply = Supply::new("2Q = 20 - 2P").unwrap();

        let got = equilibrium(&supply, &demand).unwrap_err();

        assert!(matches!(
            got,
            Error::Equilibrium(EquilibriumError::Ambiguous { count: None })
        ));
    }

    #[test]
    fn two_crossings_are_ambiguous() {
        let demand = Demand::new("Q = 100 - P^2").unwrap();
        let supply = Supply::new("Q = 20 + 4P").unwrap();

        let got = equilibrium(&supply, &demand).unwrap_err();

        assert!(matches!(
            got,
            Error::Equilibrium(EquilibriumError::Ambiguous { count: Some(2) })
        ));
    }

    #[test]
    fn negative_equilibria_are_rejected() {
        let demand = Demand::new("Q = 10 - P").unwrap();
        let supply = Supply::new("Q = 20 + P").unwrap();

        let got = equilibrium(&supply, &demand).unwrap_err();

        match got {
            Error::Equilibrium(EquilibriumError::Negative { price, quantity }) => {
                assert_relative_eq!(price, -5.0);
                assert_relative_eq!(quantity, 15.0);
            },
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[test]
    fn textbook_surplus() {
        let (supply, demand) = textbook_market();

        let got = surplus(&supply, &demand, None, None).unwrap();

        assert_relative_eq!(got.consumer, 676.0, max_relative = 1e-9);
        assert_relative_eq!(got.producer, 1352.0 / 3.0, max_relative = 1e-9);
        assert_relative_eq!(got.social, 3380.0 / 3.0, max_relative = 1e-9);
        assert_eq!(got.social, got.consumer + got.producer);
        assert_relative_eq!(got.price, 24.0);
        assert_relative_eq!(got.quantity, 52.0);
    }

    #[test]
    fn surplus_at_a_given_point() {
        let (supply, demand) = textbook_market();

        // a price ceiling at P = 20, where only 40 units are supplied
        let got = surplus(&supply, &demand, Some(20.0), Some(40.0)).unwrap();

        // ∫₀⁴⁰ (50 - Q/2) dQ = 1600 and ∫₀⁴⁰ (Q + 20)/3 dQ = 1600/3
        assert_relative_eq!(got.consumer, 800.0, max_relative = 1e-9);
        assert_relative_eq!(got.producer, 800.0 / 3.0, max_relative = 1e-9);
    }

    #[test]
    fn surpluses_are_non_negative_at_equilibrium() {
        let markets = vec![
            ("Q = -20 + 3P", "Q = 100 - 2P"),
            ("Q = 2P", "Q = 60 - P"),
            ("Q = -5 + P", "Q = 45 - 4P"),
            ("P = 2 + Q", "P = 30 - 0.5Q"),
        ];

        for (supply, demand) in markets {
            let supply = Supply::new(supply).unwrap();
            let demand = Demand::new(demand).unwrap();

            let got = surplus(&supply, &demand, None, None).unwrap();

            assert!(got.consumer >= 0.0, "{:?}", got);
            assert!(got.producer >= 0.0, "{:?}", got);
        }
    }

    #[test]
    fn surplus_needs_an_equilibrium() {
        let demand = Demand::new("Q = 10 - P").unwrap();
        let supply = Supply::new("Q = 20 - P").unwrap();

        let got = surplus(&supply, &demand, None, Some(3.0)).unwrap_err();

        assert!(matches!(
            got,
            Error::Equilibrium(EquilibriumError::NoEquilibrium)
        ));
    }

    #[test]
    fn integration_failures_are_surplus_errors() {
        let supply = Supply::new("Q = -20 + 3P").unwrap();
        let demand = Demand::new("Q = 100 - \\ln(P)").unwrap();

        let got = surplus(&supply, &demand, Some(10.0), Some(20.0)).unwrap_err();

        assert!(matches!(got, Error::Surplus { .. }), "{:?}", got);
    }
}
