//! Actor identity as resolved by the (external) authentication layer.
//!
//! The engine only ever works with the resolved `(id, kind)` pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::id::ActorId;

/// The kinds of actor that can own, share, or follow nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "actor_kind"))]
pub enum ActorKind {
    /// An individual person.
    #[serde(rename = "pf", alias = "personal")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "pf"))]
    Personal,
    /// A company account. Its id doubles as the `company_id` of company nodes.
    #[serde(rename = "pj", alias = "company")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "pj"))]
    Company,
    /// A freelancer linked to one or more companies.
    #[serde(rename = "freelancer")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "freelancer"))]
    Freelancer,
    /// An internal company collaborator.
    #[serde(rename = "collaborator")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "collaborator"))]
    Collaborator,
}

impl ActorKind {
    /// Return the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "pf",
            Self::Company => "pj",
            Self::Freelancer => "freelancer",
            Self::Collaborator => "collaborator",
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActorKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pf" | "personal" => Ok(Self::Personal),
            "pj" | "company" => Ok(Self::Company),
            "freelancer" => Ok(Self::Freelancer),
            "collaborator" => Ok(Self::Collaborator),
            _ => Err(AppError::validation(format!(
                "Invalid actor kind: '{s}'. Expected one of: pf, pj, freelancer, collaborator"
            ))),
        }
    }
}

/// A resolved actor: an id qualified by its kind.
///
/// Ids are only unique within a kind, so every ownership or grant check
/// compares the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Actor id.
    pub id: ActorId,
    /// Actor kind.
    pub kind: ActorKind,
}

impl Actor {
    /// Create a new actor reference.
    pub const fn new(id: ActorId, kind: ActorKind) -> Self {
        Self { id, kind }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_kind_round_trip_aliases() {
        assert_eq!("pf".parse::<ActorKind>().unwrap(), ActorKind::Personal);
        assert_eq!("Company".parse::<ActorKind>().unwrap(), ActorKind::Company);
        assert!("robot".parse::<ActorKind>().is_err());

        let kind: ActorKind = serde_json::from_str("\"personal\"").unwrap();
        assert_eq!(kind, ActorKind::Personal);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"pf\"");
    }

    #[test]
    fn test_actor_display() {
        let actor = Actor::new(ActorId(7), ActorKind::Freelancer);
        assert_eq!(actor.to_string(), "freelancer:7");
    }
}
