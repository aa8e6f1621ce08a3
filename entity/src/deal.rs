use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "deals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    /// Externally supplied business identifier, unique across deals.
    #[sea_orm(unique)]
    pub deal_id: String,
    pub customer_name: String,
    pub current_stage: Stage,
    pub ta_owner: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::version::Entity")]
    Version,
}

impl Related<super::version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Version.def()
    }
}

/// Pipeline stage a deal occupies. The serde names are the wire
/// contract; the string values are what lands in the database.
#[derive(
    Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "deal_stage")]
pub enum Stage {
    #[sea_orm(string_value = "DISCOVERY")]
    #[serde(rename = "Discovery")]
    Discovery,
    #[sea_orm(string_value = "PROPOSAL")]
    #[serde(rename = "Proposal")]
    Proposal,
    #[sea_orm(string_value = "NEGOTIATION")]
    #[serde(rename = "Negotiation")]
    Negotiation,
    #[sea_orm(string_value = "CLOSED_WON")]
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[sea_orm(string_value = "CLOSED_LOST")]
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Discovery => "Discovery",
            Stage::Proposal => "Proposal",
            Stage::Negotiation => "Negotiation",
            Stage::ClosedWon => "Closed Won",
            Stage::ClosedLost => "Closed Lost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStage(pub String);

impl fmt::Display for UnknownStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown stage: {}", self.0)
    }
}

impl std::error::Error for UnknownStage {}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Discovery" => Ok(Stage::Discovery),
            "Proposal" => Ok(Stage::Proposal),
            "Negotiation" => Ok(Stage::Negotiation),
            "Closed Won" => Ok(Stage::ClosedWon),
            "Closed Lost" => Ok(Stage::ClosedLost),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_round_trips_through_wire_names() {
        for stage in [
            Stage::Discovery,
            Stage::Proposal,
            Stage::Negotiation,
            Stage::ClosedWon,
            Stage::ClosedLost,
        ] {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
        }
    }

    #[test]
    fn stage_serde_uses_display_names() {
        let json = serde_json::to_string(&Stage::ClosedWon).unwrap();
        assert_eq!(json, "\"Closed Won\"");
        let parsed: Stage = serde_json::from_str("\"Negotiation\"").unwrap();
        assert_eq!(parsed, Stage::Negotiation);
    }

    #[test]
    fn unknown_stage_is_rejected() {
        let err = "Qualify".parse::<Stage>().unwrap_err();
        assert_eq!(err, UnknownStage("Qualify".to_string()));
        assert!(serde_json::from_str::<Stage>("\"Qualify\"").is_err());
    }
}
