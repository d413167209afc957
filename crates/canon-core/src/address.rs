//! Closed addressing scheme used by presentation consumers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CanonError, ErrorInfo};
use crate::model::is_valid_id;

/// Prefix reserved for formula addresses.
pub const FORMULA_PREFIX: &str = "formula";

/// Element address resolved by consumers against the export document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Address {
    /// `formula.<id>`
    Formula(String),
    /// `<category>.<id>`
    Parameter {
        /// Navigation category of the parameter.
        category: String,
        /// Parameter id.
        id: String,
    },
}

impl Address {
    /// Entity id the address points at.
    pub fn id(&self) -> &str {
        match self {
            Address::Formula(id) | Address::Parameter { id, .. } => id,
        }
    }

    /// Checks that a parameter category can appear in an address.
    pub fn validate_category(category: &str) -> Result<(), CanonError> {
        if category.is_empty() || category.contains('.') || category == FORMULA_PREFIX {
            return Err(CanonError::Schema(
                ErrorInfo::new(
                    "canon.address.category",
                    format!("category `{category}` cannot be used in an address"),
                )
                .with_hint("categories must be non-empty, dot-free and not `formula`"),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Formula(id) => write!(f, "{FORMULA_PREFIX}.{id}"),
            Address::Parameter { category, id } => write!(f, "{category}.{id}"),
        }
    }
}

impl FromStr for Address {
    type Err = CanonError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            CanonError::Schema(
                ErrorInfo::new("canon.address.syntax", "address must be `<prefix>.<id>`")
                    .with_context("address", raw),
            )
        };
        let (prefix, id) = raw.split_once('.').ok_or_else(invalid)?;
        if !is_valid_id(id) || prefix.is_empty() {
            return Err(invalid());
        }
        if prefix == FORMULA_PREFIX {
            Ok(Address::Formula(id.to_string()))
        } else {
            Ok(Address::Parameter {
                category: prefix.to_string(),
                id: id.to_string(),
            })
        }
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl TryFrom<String> for Address {
    type Error = CanonError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_address_forms() {
        assert_eq!(
            "formula.F1".parse::<Address>().unwrap(),
            Address::Formula("F1".into())
        );
        assert_eq!(
            "masses.m_h".parse::<Address>().unwrap(),
            Address::Parameter {
                category: "masses".into(),
                id: "m_h".into()
            }
        );
        assert!("masses".parse::<Address>().is_err());
        assert!("masses.a.b".parse::<Address>().is_err());
        assert!(".x".parse::<Address>().is_err());
    }

    #[test]
    fn display_matches_parse() {
        let address = Address::Parameter {
            category: "couplings".into(),
            id: "alpha".into(),
        };
        assert_eq!(address.to_string().parse::<Address>().unwrap(), address);
    }
}
