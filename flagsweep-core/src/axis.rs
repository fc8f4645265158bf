//! Flag Groups
//!
//! A flag group is one configuration axis: a short ordered list of mutually
//! exclusive labeled choices, each carrying the build-tool arguments it adds.
//! The ordered list of groups ([`Axes`]) is the whole sweep table.

use crate::combination::Combinations;
use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between per-axis labels in a composite combination label
pub const LABEL_SEPARATOR: &str = "-";

/// Errors found while validating a configuration table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AxesError {
    /// The table declares no axes at all.
    #[error("No axes configured")]
    NoAxes,

    /// An axis declares no choices, so the sweep would be empty.
    #[error("Axis '{0}' has no choices")]
    EmptyAxis(String),

    /// A choice has an empty label.
    #[error("Axis '{axis}' has a choice with an empty label")]
    EmptyLabel {
        /// Axis name
        axis: String,
    },

    /// Two choices in the same axis share a label.
    #[error("Axis '{axis}' declares label '{label}' more than once")]
    DuplicateLabel {
        /// Axis name
        axis: String,
        /// Repeated label
        label: String,
    },

    /// A label contains the composite-label separator.
    #[error("Label '{label}' in axis '{axis}' contains the separator '-'")]
    SeparatorInLabel {
        /// Axis name
        axis: String,
        /// Offending label
        label: String,
    },
}

/// One labeled choice within a flag group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagChoice {
    /// Short identifier used in the composite label (e.g. `O2`)
    pub label: String,
    /// Arguments passed to the build tool's configure action
    #[serde(default)]
    pub args: Vec<String>,
}

impl FlagChoice {
    /// Create a choice from a label and its arguments
    pub fn new<I, S>(label: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// A configuration axis: mutually exclusive choices, in declared order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagGroup {
    /// Axis name (e.g. `opt`, `lto`)
    pub name: String,
    /// Choices in enumeration order
    #[serde(default)]
    pub choices: Vec<FlagChoice>,
}

impl FlagGroup {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            choices: Vec::new(),
        }
    }

    /// Append a choice, builder style
    #[must_use]
    pub fn choice<I, S>(mut self, label: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices.push(FlagChoice::new(label, args));
        self
    }

    /// Number of choices
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    /// Whether the group has no choices
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    fn validate(&self) -> Result<(), AxesError> {
        if self.choices.is_empty() {
            return Err(AxesError::EmptyAxis(self.name.clone()));
        }

        let mut seen = FxHashSet::default();
        for choice in &self.choices {
            if choice.label.is_empty() {
                return Err(AxesError::EmptyLabel {
                    axis: self.name.clone(),
                });
            }
            if choice.label.contains(LABEL_SEPARATOR) {
                return Err(AxesError::SeparatorInLabel {
                    axis: self.name.clone(),
                    label: choice.label.clone(),
                });
            }
            if !seen.insert(choice.label.as_str()) {
                return Err(AxesError::DuplicateLabel {
                    axis: self.name.clone(),
                    label: choice.label.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Ordered list of flag groups; the sweep is their Cartesian product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Axes {
    groups: Vec<FlagGroup>,
}

impl Axes {
    /// Build the table from groups in axis order
    pub fn new(groups: Vec<FlagGroup>) -> Self {
        Self { groups }
    }

    /// Groups in axis order
    pub fn groups(&self) -> &[FlagGroup] {
        &self.groups
    }

    /// Number of axes
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no axes are declared
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Axis names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// Total number of combinations (product of the group sizes)
    pub fn combination_count(&self) -> usize {
        self.groups.iter().map(FlagGroup::len).product()
    }

    /// Lazily enumerate every combination.
    ///
    /// The first declared axis is outermost; the last one varies fastest.
    pub fn combinations(&self) -> Combinations<'_> {
        Combinations::new(&self.groups)
    }

    /// Check the table can produce a well-formed sweep.
    pub fn validate(&self) -> Result<(), AxesError> {
        if self.groups.is_empty() {
            return Err(AxesError::NoAxes);
        }
        self.groups.iter().try_for_each(FlagGroup::validate)
    }
}

impl FromIterator<FlagGroup> for Axes {
    fn from_iter<T: IntoIterator<Item = FlagGroup>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
