//! Coordination planning.
//!
//! - [`builder::PlanBuilder`]: turns registered workers into ordered steps
//! - [`step::CoordinationPlan`] / [`step::Step`]: the plan itself

pub mod builder;
pub mod step;
