//! The IS-LM model of short run equilibrium in a closed economy.

use crate::{
    algebra::{
        ops::{self, Builtins, EvaluationError},
        isolate, polynomial, Equation, Expression, Parameter, SolveError,
        SystemOfEquations,
    },
    display::{Report, Results},
    help::{EconomicHelp, Explain},
    normalize,
    validate::{
        validate_equation, validate_non_negative, validate_positive,
        validate_propensity,
    },
    EquilibriumError, Error,
};
use smol_str::SmolStr;

pub const OUTPUT: &str = "Y";
pub const INTEREST_RATE: &str = "i";
pub const GOVERNMENT_SPENDING: &str = "G";
pub const TAXES: &str = "T";
pub const MONEY_SUPPLY: &str = "M";
pub const PRICE_LEVEL: &str = "P";
pub const CONSUMPTION: &str = "C";
pub const INVESTMENT: &str = "I";
pub const MONEY_DEMAND: &str = "L";

/// Other names people use for the interest rate.
const INTEREST_RATE_ALIASES: [&str; 3] = ["r", "rho", "rate"];

/// Symbols a behavioral function may depend on.
const EXPLANATORY: [&str; 6] = [
    OUTPUT,
    INTEREST_RATE,
    GOVERNMENT_SPENDING,
    TAXES,
    MONEY_SUPPLY,
    PRICE_LEVEL,
];

fn symbol(name: &str) -> Expression { Expression::named(name) }

/// The exogenous policy variables.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PolicyParameters {
    /// `G`
    pub government_spending: f64,
    /// `T`
    pub taxes: f64,
    /// `M`, the nominal money supply.
    pub money_supply: f64,
    /// `P`, which defaults to `1`.
    pub price_level: f64,
}

impl PolicyParameters {
    pub fn new(
        government_spending: f64,
        taxes: f64,
        money_supply: f64,
    ) -> Result<Self, Error> {
        Ok(PolicyParameters {
            government_spending: validate_non_negative(
                government_spending,
                "government spending",
            )?,
            taxes: validate_non_negative(taxes, "taxes")?,
            money_supply: validate_non_negative(money_supply, "money supply")?,
            price_level: 1.0,
        })
    }

    pub fn with_price_level(self, price_level: f64) -> Result<Self, Error> {
        Ok(PolicyParameters {
            price_level: validate_positive(price_level, "price level")?,
            ..self
        })
    }

    fn lookup(&self, param: &Parameter) -> Option<f64> {
        match param.name() {
            GOVERNMENT_SPENDING => Some(self.government_spending),
            TAXES => Some(self.taxes),
            MONEY_SUPPLY => Some(self.money_supply),
            PRICE_LEVEL => Some(self.price_level),
            _ => None,
        }
    }
}

/// An IS-LM model built from its three behavioral functions.
#[derive(Debug, Clone, PartialEq)]
pub struct IsLm {
    consumption: Expression,
    investment: Expression,
    money_demand: Expression,
}

impl IsLm {
    /// Create a model from equations like `"C = 200 + 0.8(Y - T)"`,
    /// `"I = 1000 - 50r"` and `"L = 0.25Y - 50r"`.
    ///
    /// The interest rate may be written as `i`, `r`, `\rho` or
    /// `\text{rate}`.
    pub fn new(
        consumption: &str,
        investment: &str,
        money_demand: &str,
    ) -> Result<Self, Error> {
        let consumption = behavioral_function(consumption, CONSUMPTION)?;
        let investment = behavioral_function(investment, INVESTMENT)?;
        let money_demand = behavioral_function(money_demand, MONEY_DEMAND)?;

        let mpc = ops::partial_derivative(
            &consumption,
            &Parameter::named(OUTPUT),
            &Builtins,
        )
        .ok()
        .map(|derivative| ops::fold_constants(&derivative, &Builtins))
        .and_then(|derivative| ops::as_constant(&derivative, &Builtins));

        if let Some(mpc) = mpc {
            validate_propensity(mpc, "marginal propensity to consume")?;
        }

        Ok(IsLm {
            consumption,
            investment,
            money_demand,
        })
    }

    /// `C(Y, T, i)`
    pub fn consumption(&self) -> &Expression { &self.consumption }

    /// `I(Y, i)`
    pub fn investment(&self) -> &Expression { &self.investment }

    /// `L(Y, i)`
    pub fn money_demand(&self) -> &Expression { &self.money_demand }

    /// The goods market clears, `Y - C - I - G = 0`.
    pub fn is_curve(&self) -> Equation {
        Equation::implicit(
            symbol(OUTPUT)
                - self.consumption.clone()
                - self.investment.clone()
                - symbol(GOVERNMENT_SPENDING),
        )
    }

    /// The money market clears, `L - M/P = 0`.
    pub fn lm_curve(&self) -> Equation {
        Equation::implicit(
            self.money_demand.clone()
                - symbol(MONEY_SUPPLY) / symbol(PRICE_LEVEL),
        )
    }

    /// Solve for output and the interest rate.
    ///
    /// The system is solved with the policy variables left symbolic so the
    /// multipliers, `∂Y*/∂G` and `∂Y*/∂M`, can be found before any numbers
    /// are plugged in.
    pub fn equilibrium(
        &self,
        policy: &PolicyParameters,
    ) -> Result<IsLmEquilibrium, Error> {
        let (y, i) = (Parameter::named(OUTPUT), Parameter::named(INTEREST_RATE));
        let system = SystemOfEquations::new()
            .with(self.is_curve())
            .with(self.lm_curve());

        log::debug!("IS: {}", system.equations()[0]);
        log::debug!("LM: {}", system.equations()[1]);

        let solutions = system
            .solve_for(&[y.clone(), i.clone()], &Builtins)
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

        let lookup = |p: &Parameter| policy.lookup(p);
        let output_expr = solution.get(&y).ok_or_else(|| missing(&y))?;
        let rate_expr = solution.get(&i).ok_or_else(|| missing(&i))?;

        let output = ops::evaluate(output_expr, lookup, &Builtins)
            .map_err(unsolvable)?;
        let interest_rate =
            ops::evaluate(rate_expr, lookup, &Builtins).map_err(unsolvable)?;

        let multiplier = |name: &str| {
            ops::partial_derivative(
                output_expr,
                &Parameter::named(name),
                &Builtins,
            )
            .and_then(|derivative| {
                ops::evaluate(&derivative, lookup, &Builtins)
            })
            .map_err(unsolvable)
        };
        let fiscal_multiplier = multiplier(GOVERNMENT_SPENDING)?;
        let monetary_multiplier = multiplier(MONEY_SUPPLY)?;

        let at_equilibrium = |p: &Parameter| match p.name() {
            OUTPUT => Some(output),
            INTEREST_RATE => Some(interest_rate),
            _ => policy.lookup(p),
        };
        let consumption =
            ops::evaluate(&self.consumption, at_equilibrium, &Builtins)
                .map_err(unsolvable)?;
        let investment =
            ops::evaluate(&self.investment, at_equilibrium, &Builtins)
                .map_err(unsolvable)?;

        log::debug!(
            "IS-LM equilibrium at Y* = {}, i* = {}",
            output,
            interest_rate
        );

        Ok(IsLmEquilibrium {
            output,
            interest_rate,
            fiscal_multiplier,
            monetary_multiplier,
            consumption,
            investment,
        })
    }
}

fn unsolvable(e: EvaluationError) -> Error {
    EquilibriumError::Unsolvable(SolveError::Eval(e)).into()
}

fn missing(param: &Parameter) -> Error {
    unsolvable(EvaluationError::UnknownParameter {
        name: param.name().into(),
    })
}

/// Parse a behavioral equation and solve it for its dependent variable.
fn behavioral_function(
    equation: &str,
    dependent: &str,
) -> Result<Expression, Error> {
    validate_equation(equation)?;
    let mut expr = normalize(equation)?;

    let rate = Expression::named(INTEREST_RATE);
    for alias in INTEREST_RATE_ALIASES {
        expr = ops::substitute(&expr, &Parameter::named(alias), &rate);
    }

    let dependent_param = Parameter::named(dependent);
    let function = if expr.depends_on(&dependent_param) {
        isolate_dependent(&expr, &dependent_param, equation)?
    } else {
        ops::fold_constants(&expr, &Builtins)
    };

    if let Some(unknown) = function
        .params()
        .find(|p| !EXPLANATORY.contains(&p.name()))
    {
        return Err(Error::validation(
            dependent,
            format!(
                "\"{}\" depends on \"{}\", but behavioral functions may only use {}",
                equation,
                unknown.name(),
                EXPLANATORY.join(", ")
            ),
        ));
    }

    log::debug!("{} = {}", dependent, function);

    Ok(function)
}

fn isolate_dependent(
    expr: &Expression,
    dependent: &Parameter,
    equation: &str,
) -> Result<Expression, Error> {
    let not_linear = || {
        Error::validation(
            dependent.name(),
            format!(
                "\"{}\" must be linear in {} so it can be solved for it",
                equation,
                dependent.name()
            ),
        )
    };

    if polynomial::polynomial_degree(expr, dependent, &Builtins) != Some(1) {
        return Err(not_linear());
    }

    let roots = isolate(expr, dependent, &Builtins).map_err(|_| not_linear())?;

    match roots.as_slice() {
        [root] => Ok(root.clone()),
        _ => Err(not_linear()),
    }
}

impl Explain for IsLm {
    fn help() -> EconomicHelp {
        EconomicHelp {
            title: "IS-LM model",
            description: "The IS-LM model describes short run equilibrium in a closed economy. The IS curve holds the (Y, i) pairs where the goods market clears, Y = C + I + G. The LM curve holds the pairs where the money market clears, M/P = L(Y, i). Together they show how fiscal and monetary policy move output and the interest rate.",
            assumptions: &[
                "a closed economy with no foreign sector",
                "prices are fixed in the short run",
                "there is unemployment, the economy is below full employment",
                "the interest rate is flexible",
                "expectations are static",
            ],
            courses: &[
                "Intermediate Macroeconomics",
                "Macroeconomic Theory",
                "Economic Policy",
            ],
        }
    }

    fn explain(&self) -> String {
        format!(
            "{}\n\n\
             C = {}\n\
             I = {}\n\
             L = {}\n\n\
             Expansionary fiscal policy (more G) shifts IS to the right, raising Y and i. The higher rate can crowd out private investment.\n\
             Expansionary monetary policy (more M) shifts LM to the right, raising Y and lowering i, which stimulates investment.",
            Self::help(),
            self.consumption,
            self.investment,
            self.money_demand
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IsLmEquilibrium {
    /// `Y*`
    pub output: f64,
    /// `i*`, which may be negative.
    pub interest_rate: f64,
    /// `k = ∂Y*/∂G`
    pub fiscal_multiplier: f64,
    /// `m = ∂Y*/∂M`
    pub monetary_multiplier: f64,
    /// `C*`
    pub consumption: f64,
    /// `I*`
    pub investment: f64,
}

impl Report for IsLmEquilibrium {
    fn results(&self) -> Results {
        [
            (SmolStr::new_inline("Y*"), self.output),
            (SmolStr::new_inline("r*"), self.interest_rate),
            (SmolStr::new_inline("k"), self.fiscal_multiplier),
            (SmolStr::new_inline("m"), self.monetary_multiplier),
            (SmolStr::new_inline("C*"), self.consumption),
            (SmolStr::new_inline("I*"), self.investment),
        ]
        .into_iter()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn textbook_model() -> IsLm {
        IsLm::new("C = 200 + 0.8(Y - T)", "I = 1000 - 50r", "L = 0.25Y - 50r")
            .unwrap()
    }

    fn textbook_policy() -> PolicyParameters {
        PolicyParameters::new(900.0, 800.0, 3400.0).unwrap()
    }

    #[test]
    fn textbook_equilibrium() {
        let got = textbook_model().equilibrium(&textbook_policy()).unwrap();

        assert_relative_eq!(got.output, 10800.0, max_relative = 1e-9);
        assert_relative_eq!(got.interest_rate, -14.0, max_relative = 1e-9);
        assert_relative_eq!(got.fiscal_multiplier, 1.0 / 0.45, max_relative = 1e-9);
        assert_relative_eq!(
            got.monetary_multiplier,
            1.0 / 0.45,
            max_relative = 1e-9
        );
        assert_relative_eq!(got.consumption, 8200.0, max_relative = 1e-9);
        assert_relative_eq!(got.investment, 1700.0, max_relative = 1e-9);
    }

    #[test]
    fn results_use_the_usual_names() {
        let got = textbook_model()
            .equilibrium(&textbook_policy())
            .unwrap()
            .results();

        assert_eq!(
            got.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
            vec!["Y*", "r*", "k", "m", "C*", "I*"]
        );
    }

    #[test]
    fn the_interest_rate_can_have_other_names() {
        let inputs = vec![
            ("I = 1000 - 50i", "L = 0.25Y - 50i"),
            ("I = 1000 - 50\\rho", "L = 0.25Y - 50\\rho"),
            ("I = 1000 - 50\\text{rate}", "L = 0.25Y - 50r"),
        ];

        for (investment, money_demand) in inputs {
            let model =
                IsLm::new("C = 200 + 0.8(Y - T)", investment, money_demand)
                    .unwrap();

            let got = model.equilibrium(&textbook_policy()).unwrap();

            assert_relative_eq!(got.output, 10800.0, max_relative = 1e-9);
            assert_relative_eq!(got.interest_rate, -14.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn behavioral_functions_can_omit_the_dependent_variable() {
        let model =
            IsLm::new("200 + 0.8(Y - T)", "1000 - 50r", "0.25Y - 50r").unwrap();

        let got = model.equilibrium(&textbook_policy()).unwrap();

        assert_relative_eq!(got.output, 10800.0, max_relative = 1e-9);
    }

    #[test]
    fn the_dependent_variable_is_isolated() {
        let model =
            IsLm::new("2C = 400 + 1.6(Y - T)", "I - 1000 = -50r", "L = 0.25Y - 50r")
                .unwrap();

        let got = model.equilibrium(&textbook_policy()).unwrap();

        assert_relative_eq!(got.consumption, 8200.0, max_relative = 1e-9);
        assert_relative_eq!(got.investment, 1700.0, max_relative = 1e-9);
    }

    #[test]
    fn invalid_models_are_rejected() {
        let inputs = vec![
            ("C = 200 + 1.2Y", "I = 1000 - 50r", "L = 0.25Y - 50r"),
            ("C = 200 - 0.2Y", "I = 1000 - 50r", "L = 0.25Y - 50r"),
            ("C^2 = Y", "I = 1000 - 50r", "L = 0.25Y - 50r"),
            ("C = 200 + 0.8Y", "I = 1000 - 50r + X", "L = 0.25Y - 50r"),
            ("C = 200 + 0.8Y", "I = 0.1C", "L = 0.25Y - 50r"),
            ("C = 200 + 0.8Y", "I = 1000 - 50r", ""),
            ("C = = 200", "I = 1000 - 50r", "L = 0.25Y - 50r"),
        ];

        for (c, i, l) in inputs {
            assert!(IsLm::new(c, i, l).is_err(), "{} / {} / {}", c, i, l);
        }
    }

    #[test]
    fn policy_parameters_are_validated() {
        assert!(PolicyParameters::new(-1.0, 800.0, 3400.0).is_err());
        assert!(PolicyParameters::new(900.0, f64::NAN, 3400.0).is_err());
        assert!(textbook_policy().with_price_level(0.0).is_err());
        assert_eq!(textbook_policy().price_level, 1.0);
    }

    #[test]
    fn the_price_level_deflates_the_money_supply() {
        let policy = textbook_policy().with_price_level(2.0).unwrap();

        let got = textbook_model().equilibrium(&policy).unwrap();

        // 0.45Y = 560 + G + M/P
        assert_relative_eq!(got.output, (1460.0 + 1700.0) / 0.45, max_relative = 1e-9);
        assert_relative_eq!(
            got.monetary_multiplier,
            1.0 / 0.9,
            max_relative = 1e-9
        );
        assert_relative_eq!(got.fiscal_multiplier, 1.0 / 0.45, max_relative = 1e-9);
    }

    #[test]
    fn expansionary_policies() {
        let model = textbook_model();
        let base = model.equilibrium(&textbook_policy()).unwrap();

        let fiscal = PolicyParameters::new(1000.0, 800.0, 3400.0).unwrap();
        let got = model.equilibrium(&fiscal).unwrap();
        assert!(got.output > base.output);
        assert!(got.interest_rate > base.interest_rate);
        assert!(got.investment < base.investment, "crowding out");

        let monetary = PolicyParameters::new(900.0, 800.0, 3500.0).unwrap();
        let got = model.equilibrium(&monetary).unwrap();
        assert!(got.output > base.output);
        assert!(got.interest_rate < base.interest_rate);
    }

    #[test]
    fn a_vertical_is_and_lm_never_meet() {
        // neither market responds to the interest rate and the LM curve
        // pins output at a level the IS curve can't reach
        let model =
            IsLm::new("C = 0.5Y", "I = 100", "L = 0.5Y").unwrap();

        let got = model.equilibrium(&textbook_policy());

        // IS: 0.5Y = 100 + G and LM: 0.5Y = M, both without i
        assert!(got.is_err());
    }

    #[test]
    fn explanations_mention_the_functions() {
        let got = textbook_model().explain();

        assert!(got.contains("IS-LM MODEL"));
        assert!(got.contains("C = "));
        assert!(got.contains("crowd out"));
    }
}
