//! Entity identifiers.

use crate::error::{Result, StopgridError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an entity: operator, type name and operator-local id.
///
/// The text form is `operator:type:id`, the reference format used by the
/// source data. The local id may itself contain `:`.
///
/// # Examples
///
/// ```
/// use stopgrid::Id;
///
/// let id: Id = "RUT:ServiceLink:3011_3012".parse().unwrap();
/// assert_eq!(id.operator(), "RUT");
/// assert_eq!(id.type_name(), "ServiceLink");
/// assert_eq!(id.to_string(), "RUT:ServiceLink:3011_3012");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Id {
    operator: String,
    type_name: String,
    local: String,
}

impl Id {
    pub fn new(
        operator: impl Into<String>,
        type_name: impl Into<String>,
        local: impl Into<String>,
    ) -> Result<Self> {
        let id = Self {
            operator: operator.into(),
            type_name: type_name.into(),
            local: local.into(),
        };
        if id.operator.is_empty() || id.type_name.is_empty() || id.local.is_empty() {
            return Err(StopgridError::InvalidId(format!(
                "empty component in {}",
                id
            )));
        }
        if id.operator.contains(':') || id.type_name.contains(':') {
            return Err(StopgridError::InvalidId(format!(
                "operator and type may not contain ':': {}",
                id
            )));
        }
        Ok(id)
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    /// Whether this id declares the given type name.
    pub fn is(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }
}

impl FromStr for Id {
    type Err = StopgridError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(operator), Some(type_name), Some(local)) => Id::new(operator, type_name, local),
            _ => Err(StopgridError::InvalidId(format!(
                "expected operator:type:id, got {:?}",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Id {
    type Error = StopgridError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.to_string()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.operator, self.type_name, self.local)
    }
}
