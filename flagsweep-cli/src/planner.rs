//! Sweep Planner
//!
//! Builds the execution plan from the configured axes.
//!
//! Without a filter every combination is planned. A label regex narrows the
//! sweep to matching combinations.
//!
//! Ordering: combinations keep enumeration order (first axis outermost). The
//! order of printed results follows it, so the plan never re-sorts.

use flagsweep_core::{Axes, Combination};
use regex::Regex;

/// Execution plan for a sweep
#[derive(Debug, Clone)]
pub struct SweepPlan {
    /// Ordered list of combinations to build and measure
    pub combinations: Vec<Combination>,
    /// Size of the unfiltered sweep
    pub total: usize,
}

impl SweepPlan {
    /// Number of planned combinations
    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    /// Whether nothing is planned
    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    /// Whether a filter dropped any combination
    pub fn is_filtered(&self) -> bool {
        self.combinations.len() != self.total
    }
}

/// Build execution plan from the configured axes
pub fn build_plan(axes: &Axes, filter: Option<&Regex>) -> SweepPlan {
    let combinations = axes
        .combinations()
        .filter(|c| filter.is_none_or(|re| re.is_match(&c.label)))
        .collect();

    SweepPlan {
        combinations,
        total: axes.combination_count(),
    }
}
