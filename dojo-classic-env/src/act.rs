use dojo_core::Act;
use serde::{Deserialize, Serialize};

/// Discrete action, the index of the chosen action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteAct(pub usize);

impl Act for DiscreteAct {}

impl From<usize> for DiscreteAct {
    fn from(a: usize) -> Self {
        Self(a)
    }
}

impl From<DiscreteAct> for usize {
    fn from(a: DiscreteAct) -> Self {
        a.0
    }
}
