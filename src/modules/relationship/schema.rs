use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PAIR_FIELD: &str = "pair";
pub const STATUS_FIELD: &str = "status";
pub const PENDING: &str = "pending";
pub const CONFIRMED: &str = "confirmed";

/// One record per unordered pair of users. `pair` is unique in the
/// collection, so a pending request and a friendship can never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDoc {
    pub pair: String,
    #[serde(flatten)]
    pub state: RelationState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RelationState {
    Pending { from: Uuid, to: Uuid },
    Confirmed { user1: Uuid, user2: Uuid },
}

impl RelationshipDoc {
    pub fn pending(from: Uuid, to: Uuid) -> Self {
        RelationshipDoc { pair: pair_key(&from, &to), state: RelationState::Pending { from, to } }
    }
}

/// Order-independent key for two users.
pub fn pair_key(user_a: &Uuid, user_b: &Uuid) -> String {
    let (user_a, user_b) =
        if user_a <= user_b { (user_a, user_b) } else { (user_b, user_a) };
    format!("{user_a}:{user_b}")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn pair_key_ignores_order() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        assert_eq!(pair_key(&a, &b), pair_key(&b, &a));
        assert_ne!(pair_key(&a, &b), pair_key(&a, &a));
    }

    #[test]
    fn pending_doc_is_stored_flat() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let doc = serde_json::to_value(RelationshipDoc::pending(a, b)).expect("serialize");
        assert_eq!(
            doc,
            json!({ "pair": pair_key(&a, &b), "status": PENDING, "from": a, "to": b })
        );
    }
}
