use crate::error::{AtlasError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of graph node a [`NodeId`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Project,
    File,
    Function,
    Class,
    Interface,
    Method,
    Variable,
    Package,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::File => "file",
            Self::Function => "function",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Method => "method",
            Self::Variable => "variable",
            Self::Package => "package",
        }
    }
}

impl FromStr for NodeKind {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "project" => Ok(Self::Project),
            "file" => Ok(Self::File),
            "function" => Ok(Self::Function),
            "class" => Ok(Self::Class),
            "interface" => Ok(Self::Interface),
            "method" => Ok(Self::Method),
            "variable" => Ok(Self::Variable),
            "package" => Ok(Self::Package),
            other => Err(AtlasError::Validation(format!(
                "unknown node kind: {other}"
            ))),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical identity of a graph node.
///
/// Encodes as `kind:name` for project/package scoped nodes or
/// `kind:filePath#name` for file scoped entities. The encoding round-trips
/// for any file path not containing `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct NodeId {
    pub kind: NodeKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl NodeId {
    pub fn project(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Project,
            name: name.into(),
            file_path: None,
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::File,
            name: path.into(),
            file_path: None,
        }
    }

    pub fn package(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Package,
            name: name.into(),
            file_path: None,
        }
    }

    /// A file scoped entity such as `function:src/auth.ts#login`.
    pub fn entity(kind: NodeKind, file_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            file_path: Some(file_path.into()),
        }
    }

    /// Canonical string form.
    #[must_use]
    pub fn encode(&self) -> String {
        match &self.file_path {
            Some(path) => format!("{}:{}#{}", self.kind, path, self.name),
            None => format!("{}:{}", self.kind, self.name),
        }
    }

    /// Reverse of [`NodeId::encode`].
    pub fn parse(token: &str) -> Result<Self> {
        let (kind, rest) = token
            .split_once(':')
            .ok_or_else(|| AtlasError::Validation(format!("malformed node id: {token}")))?;
        if rest.is_empty() {
            return Err(AtlasError::Validation(format!("empty node name: {token}")));
        }
        let kind = kind.parse::<NodeKind>()?;

        match rest.split_once('#') {
            Some((path, name)) => {
                if path.is_empty() || name.is_empty() {
                    return Err(AtlasError::Validation(format!(
                        "malformed file-scoped node id: {token}"
                    )));
                }
                Ok(Self {
                    kind,
                    name: name.to_string(),
                    file_path: Some(path.to_string()),
                })
            }
            None => Ok(Self {
                kind,
                name: rest.to_string(),
                file_path: None,
            }),
        }
    }

    /// The file this node belongs to, if any.
    ///
    /// File nodes name their own path; file scoped entities carry theirs.
    #[must_use]
    pub fn containing_file(&self) -> Option<&str> {
        match (&self.file_path, self.kind) {
            (Some(path), _) => Some(path),
            (None, NodeKind::File) => Some(&self.name),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for NodeId {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
