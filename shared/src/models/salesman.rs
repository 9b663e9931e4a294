//! Salesman Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Suspension lifecycle of a salesman account.
///
/// `Active` and `Restored` both count as "not suspended" when gating
/// operations; they stay distinct so the history shows whether an account
/// was ever suspended and later reinstated.
///
/// Transitions: `Active -> Suspended -> Restored -> Suspended -> ...`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspensionState {
    Active,
    Suspended,
    Restored,
}

impl SuspensionState {
    /// Integer column encoding: 0 active, 1 suspended, 2 restored.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Active),
            1 => Some(Self::Suspended),
            2 => Some(Self::Restored),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Active => 0,
            Self::Suspended => 1,
            Self::Restored => 2,
        }
    }

    /// Only `Suspended` blocks new credit issuance.
    pub fn is_suspended(self) -> bool {
        matches!(self, Self::Suspended)
    }
}

/// Salesman entity
///
/// `credit_limit` is the ceiling on the salesman's outstanding on-credit
/// exposure. It is only ever mutated through the salesman API, never by the
/// credit engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Salesman {
    pub id: i64,
    /// Platform user this salesman record belongs to
    pub user_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub credit_limit: Decimal,
    pub suspension: SuspensionState,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Salesman {
    pub fn is_suspended(&self) -> bool {
        self.suspension.is_suspended()
    }
}

/// Register salesman payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesmanCreate {
    pub user_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub credit_limit: Decimal,
}

/// Update salesman payload (the credit limit is the only editable field)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesmanUpdate {
    #[serde(with = "rust_decimal::serde::float")]
    pub credit_limit: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspension_codes_round_trip() {
        for state in [
            SuspensionState::Active,
            SuspensionState::Suspended,
            SuspensionState::Restored,
        ] {
            assert_eq!(SuspensionState::from_code(state.code()), Some(state));
        }
        assert_eq!(SuspensionState::from_code(7), None);
    }

    #[test]
    fn restored_is_not_suspended() {
        assert!(SuspensionState::Suspended.is_suspended());
        assert!(!SuspensionState::Active.is_suspended());
        assert!(!SuspensionState::Restored.is_suspended());
    }

    #[test]
    fn credit_limit_serializes_as_number() {
        let salesman = Salesman {
            id: 1,
            user_id: 2,
            credit_limit: Decimal::new(150050, 2), // 1500.50
            suspension: SuspensionState::Active,
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_value(&salesman).unwrap();
        assert_eq!(json["credit_limit"], serde_json::json!(1500.5));
        assert_eq!(json["suspension"], "active");
    }
}
