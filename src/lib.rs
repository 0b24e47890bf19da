//! Supply and demand, elasticities, surpluses and the IS-LM model, for
//! people learning economics.
//!
//! Models are written as equations in a LaTeX-like notation and solved with
//! a small symbolic [`algebra`] engine.
//!
//! ```rust
//! use oikos::{equilibrium, surplus, Demand, Supply};
//!
//! let demand = Demand::new("Q = 100 - 2P")?;
//! let supply = Supply::new("Q = -20 + 3P")?;
//!
//! let eq = equilibrium(&supply, &demand)?;
//! assert!((eq.price - 24.0).abs() < 1e-9);
//! assert!((eq.quantity - 52.0).abs() < 1e-9);
//!
//! let s = surplus(&supply, &demand, None, None)?;
//! assert!((s.consumer - 676.0).abs() < 1e-9);
//! # Ok::<(), oikos::Error>(())
//! ```

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod algebra;
pub mod canvas;
pub mod display;
mod errors;
pub mod help;
pub mod islm;
pub mod market;
mod normalize;
pub mod validate;

pub use errors::{EquilibriumError, Error};
pub use islm::{IsLm, IsLmEquilibrium, PolicyParameters};
pub use market::{equilibrium, surplus, Demand, Supply};
pub use normalize::normalize;
