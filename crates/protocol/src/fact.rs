use crate::error::{AtlasError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Closed predicate vocabulary for graph edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Predicate {
    HasRoot,
    Contains,
    Defines,
    Exports,
    Imports,
    ImportsFrom,
    Implements,
    Extends,
    Calls,
    Uses,
    DependsOn,
}

impl Predicate {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HasRoot => "HAS_ROOT",
            Self::Contains => "CONTAINS",
            Self::Defines => "DEFINES",
            Self::Exports => "EXPORTS",
            Self::Imports => "IMPORTS",
            Self::ImportsFrom => "IMPORTS_FROM",
            Self::Implements => "IMPLEMENTS",
            Self::Extends => "EXTENDS",
            Self::Calls => "CALLS",
            Self::Uses => "USES",
            Self::DependsOn => "DEPENDS_ON",
        }
    }

    pub const ALL: [Self; 11] = [
        Self::HasRoot,
        Self::Contains,
        Self::Defines,
        Self::Exports,
        Self::Imports,
        Self::ImportsFrom,
        Self::Implements,
        Self::Extends,
        Self::Calls,
        Self::Uses,
        Self::DependsOn,
    ];
}

impl FromStr for Predicate {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| AtlasError::Validation(format!("unknown predicate: {s}")))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One edge of the fact graph.
///
/// Subject and object are encoded [`crate::NodeId`] tokens; facts are
/// append-only within a build and never mutated after publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Fact {
    pub subject: String,
    pub predicate: Predicate,
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

impl Fact {
    pub fn new(subject: impl Into<String>, predicate: Predicate, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
            properties: None,
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Identity triple used for deduplication.
    #[must_use]
    pub fn triple(&self) -> (&str, Predicate, &str) {
        (&self.subject, self.predicate, &self.object)
    }
}

/// Pattern for typed fact queries. At least one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FactFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Predicate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

impl FactFilter {
    #[must_use]
    pub fn subject(id: impl Into<String>) -> Self {
        Self {
            subject: Some(id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn object(id: impl Into<String>) -> Self {
        Self {
            object: Some(id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn predicate(predicate: Predicate) -> Self {
        Self {
            predicate: Some(predicate),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.predicate.is_none() && self.object.is_none()
    }

    #[must_use]
    pub fn matches(&self, fact: &Fact) -> bool {
        if let Some(subject) = &self.subject {
            if subject != &fact.subject {
                return false;
            }
        }
        if let Some(predicate) = self.predicate {
            if predicate != fact.predicate {
                return false;
            }
        }
        if let Some(object) = &self.object {
            if object != &fact.object {
                return false;
            }
        }
        true
    }
}
