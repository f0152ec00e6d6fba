//! Interface address pipeline
//!
//! Stages consume an ordered slice of [`IfAddr`] and return a fresh vector;
//! the caller's sequence is never modified.

pub mod filter;
pub mod transform;

pub use filter::{
    exclude, exclude_by_flag, exclude_by_name, exclude_by_network, exclude_by_rfc,
    exclude_by_type, filter_by_type, if_by_flag, if_by_name, if_by_network, if_by_rfc,
    if_by_rfcs, if_by_type, include, include_by_flag, include_by_name, include_by_network,
    include_by_rfc, include_by_type, parse_flags, FlagFilter, Partition, Selector,
};
pub use transform::{
    first_attr, join, limit, math, math_address, math_network, offset, parse_delta, reverse,
    sort_by, unique, MathOp,
};

use crate::error::Result;
use crate::models::IfAddr;

/// One step of a user-assembled pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Include { selector: String, param: String },
    Exclude { selector: String, param: String },
    Sort(String),
    Unique(String),
    Limit(i64),
    Offset(i64),
    Reverse,
    Math { op: String, value: String },
}

impl Stage {
    pub fn apply(&self, seq: &[IfAddr]) -> Result<Vec<IfAddr>> {
        match self {
            Stage::Include { selector, param } => include(selector, param, seq),
            Stage::Exclude { selector, param } => exclude(selector, param, seq),
            Stage::Sort(spec) => sort_by(seq, spec),
            Stage::Unique(attr) => unique(seq, attr),
            Stage::Limit(n) => limit(seq, *n),
            Stage::Offset(n) => Ok(offset(seq, *n)),
            Stage::Reverse => Ok(reverse(seq)),
            Stage::Math { op, value } => math(seq, op, value),
        }
    }
}

/// Applies `stages` left to right. The first failing stage aborts the run.
pub fn run(seq: &[IfAddr], stages: &[Stage]) -> Result<Vec<IfAddr>> {
    stages.iter().try_fold(seq.to_vec(), |current, stage| {
        let next = stage.apply(&current)?;
        tracing::debug!(?stage, before = current.len(), after = next.len(), "pipeline stage");
        Ok(next)
    })
}
