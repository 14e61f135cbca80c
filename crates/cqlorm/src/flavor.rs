//! Naming policy × parameter mode.

use crate::naming::NamingPolicy;
use serde::{Deserialize, Serialize};

/// How condition and column values reach the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterMode {
    /// Values are formatted into the text; the parameter list stays empty.
    Literal,
    /// `?` placeholders, values appended left to right.
    #[default]
    Positional,
    /// `:name` placeholders, values appended left to right.
    ///
    /// Names come from the column, so two comparisons on one column share a
    /// name and bind to the same value. Use `between`, `in_list` or a raw
    /// condition for ranges.
    Named,
}

impl ParameterMode {
    pub const ALL: [ParameterMode; 3] = [
        ParameterMode::Literal,
        ParameterMode::Positional,
        ParameterMode::Named,
    ];
}

/// The two strategies a statement is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Flavor {
    pub naming: NamingPolicy,
    pub mode: ParameterMode,
}

impl Flavor {
    pub const fn new(naming: NamingPolicy, mode: ParameterMode) -> Self {
        Self { naming, mode }
    }

    /// All nine combinations.
    pub fn all() -> impl Iterator<Item = Flavor> {
        NamingPolicy::ALL
            .into_iter()
            .flat_map(|naming| ParameterMode::ALL.into_iter().map(move |mode| Flavor::new(naming, mode)))
    }
}
