//! Fund assumptions: validated configuration and return modeling

mod config;
mod returns;

pub use config::{FeeBasis, FeeFunding, FeeStepDown, FundConfig, CURVE_TOLERANCE};
pub use returns::{ReturnFlows, ReturnModel};
