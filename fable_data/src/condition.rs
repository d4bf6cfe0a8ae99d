//! Branch and page conditions.
//!
//! A [`Condition`] guards an `if` command branch or an event page. The
//! serialized form is a flat map discriminated by `type`; `variable`
//! conditions carry a second `valueType` discriminator for their right-hand
//! side.

use serde::{Deserialize, Serialize};

/// One condition tested by `if` commands and event pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Switch {
        id: u32,
        value: bool,
    },
    SelfSwitch {
        id: u32,
        value: bool,
    },
    Variable {
        id: u32,
        comp: Comp,
        #[serde(flatten)]
        value: ConditionValue,
    },
    Item {
        id: i64,
        requirement: ItemRequirement,
    },
    /// Opaque host-defined conditions; the interpreter treats them as false.
    Special {
        raw: String,
    },
}

/// Right-hand side of a `variable` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "valueType", content = "value", rename_all = "snake_case")]
pub enum ConditionValue {
    Constant(i64),
    Variable(u32),
}

/// Comparison operator for `variable` conditions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comp {
    #[serde(rename = "==")]
    EqualTo,
    #[serde(rename = "!=")]
    NotEqualTo,
    #[serde(rename = ">=")]
    GreaterThanOrEqualTo,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<=")]
    LessThanOrEqualTo,
    #[serde(rename = "<")]
    LessThan,
}

impl Comp {
    /// Apply the comparison with the condition's lhs on the left.
    pub fn eval(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comp::EqualTo => lhs == rhs,
            Comp::NotEqualTo => lhs != rhs,
            Comp::GreaterThanOrEqualTo => lhs >= rhs,
            Comp::GreaterThan => lhs > rhs,
            Comp::LessThanOrEqualTo => lhs <= rhs,
            Comp::LessThan => lhs < rhs,
        }
    }
}

/// Inventory predicate for `item` conditions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemRequirement {
    Owned,
    NotOwned,
    Active,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comp_eval_covers_all_operators() {
        assert!(Comp::EqualTo.eval(3, 3));
        assert!(Comp::NotEqualTo.eval(3, 4));
        assert!(Comp::GreaterThanOrEqualTo.eval(3, 3));
        assert!(Comp::GreaterThan.eval(4, 3));
        assert!(Comp::LessThanOrEqualTo.eval(3, 3));
        assert!(Comp::LessThan.eval(2, 3));
        assert!(!Comp::GreaterThan.eval(3, 3));
    }

    #[test]
    fn switch_condition_roundtrip() {
        let cond = Condition::Switch { id: 7, value: true };
        let bytes = rmp_serde::to_vec_named(&cond).unwrap();
        let back: Condition = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(cond, back);
    }

    #[test]
    fn variable_condition_encodes_flat_map() {
        let cond = Condition::Variable {
            id: 2,
            comp: Comp::GreaterThanOrEqualTo,
            value: ConditionValue::Constant(10),
        };
        let json = serde_json::to_value(&cond).unwrap();
        assert_eq!(json["type"], "variable");
        assert_eq!(json["id"], 2);
        assert_eq!(json["comp"], ">=");
        assert_eq!(json["valueType"], "constant");
        assert_eq!(json["value"], 10);
    }

    #[test]
    fn variable_condition_roundtrip_with_variable_rhs() {
        let cond = Condition::Variable {
            id: 1,
            comp: Comp::LessThan,
            value: ConditionValue::Variable(9),
        };
        let bytes = rmp_serde::to_vec_named(&cond).unwrap();
        assert_eq!(cond, rmp_serde::from_slice(&bytes).unwrap());
    }

    #[test]
    fn item_condition_roundtrip() {
        let cond = Condition::Item {
            id: 4,
            requirement: ItemRequirement::Active,
        };
        let bytes = rmp_serde::to_vec_named(&cond).unwrap();
        assert_eq!(cond, rmp_serde::from_slice::<Condition>(&bytes).unwrap());
    }
}
