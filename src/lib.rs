#![forbid(unsafe_code)]

//! Machinery mode selection by grounding risk.
//!
//! A vessel losing propulsion near shore has a time-to-grounding (TTG)
//! window. Each machinery mode carries recovery chains (start or restart
//! engines) and this crate estimates, per mode:
//! 1. **Failure probability**: some engine the mode relies on fails
//! 2. **Recovery failure probability**: no recovery chain completes within TTG
//! 3. **Total risk**: grounding probability weighted by grounding costs
//!
//! and selects the mode with the smallest total risk.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use mso_risk::prelude::*;
//!
//! # fn main() -> mso_risk::core::errors::Result<()> {
//! let model = reference_vessel().to_model(1000.0)?;
//! let mode = RiskAssessor::new(&model).select_mode(300.0)?;
//! println!("{mode}");
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod assessment;
pub mod core;
pub mod logger;
pub mod model;
