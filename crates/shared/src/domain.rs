use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(BillId);
id_newtype!(ActionId);
id_newtype!(PersonId);
id_newtype!(OrganizationId);
id_newtype!(PostId);
id_newtype!(MembershipId);
id_newtype!(EventId);

/// Legislative status inferred by the upstream sync job from a bill's
/// action history. Stored on the bill row, never recomputed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredStatus {
    Passed,
    Failed,
    Active,
}

impl InferredStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            InferredStatus::Passed => "Passed",
            InferredStatus::Failed => "Failed",
            InferredStatus::Active => "Active",
        }
    }

    pub fn from_db_str(raw: &str) -> Option<Self> {
        match raw {
            "Passed" => Some(InferredStatus::Passed),
            "Failed" => Some(InferredStatus::Failed),
            "Active" => Some(InferredStatus::Active),
            _ => None,
        }
    }
}

/// Role a person holds on an organization. The upstream data uses free-form
/// labels; the two we filter on get named variants, everything else is
/// carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipRole {
    Chairperson,
    CommitteeMember,
    Other(String),
}

impl MembershipRole {
    pub fn as_db_str(&self) -> &str {
        match self {
            MembershipRole::Chairperson => "CHAIRPERSON",
            MembershipRole::CommitteeMember => "Committee Member",
            MembershipRole::Other(raw) => raw,
        }
    }

    pub fn from_db_str(raw: &str) -> Self {
        match raw {
            "CHAIRPERSON" => MembershipRole::Chairperson,
            "Committee Member" => MembershipRole::CommitteeMember,
            other => MembershipRole::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Confirmed,
    Cancelled,
    Passed,
}

impl EventStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            EventStatus::Confirmed => "confirmed",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Passed => "passed",
        }
    }

    pub fn from_db_str(raw: &str) -> Self {
        match raw {
            "cancelled" => EventStatus::Cancelled,
            "passed" => EventStatus::Passed,
            _ => EventStatus::Confirmed,
        }
    }
}
