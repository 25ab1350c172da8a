use crate::error::TransitionRejected;
use serde::Serialize;
use std::fmt;

/// A status enum with an explicit transition table.
///
/// Re-setting the current status is always accepted. Terminal states have
/// no successors.
pub trait StatusMachine: Copy + Eq + fmt::Debug + Serialize + 'static {
    /// States reachable in one step from `self`.
    fn successors(self) -> &'static [Self];

    fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    fn can_transition(self, next: Self) -> bool {
        self == next || self.successors().contains(&next)
    }

    /// `(current, requested) -> next | Rejected`.
    fn transition(self, next: Self) -> Result<Self, TransitionRejected> {
        if self.can_transition(next) {
            Ok(next)
        } else {
            Err(TransitionRejected {
                from: wire_name(&self),
                to: wire_name(&next),
            })
        }
    }
}

/// The serialized name of a unit variant (`"scheduled"`), falling back to
/// its Debug form.
fn wire_name<S: Serialize + fmt::Debug>(status: &S) -> String {
    match serde_json::to_value(status) {
        Ok(serde_json::Value::String(s)) => s,
        _ => format!("{status:?}"),
    }
}
