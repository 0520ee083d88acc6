//! Core functionalities.
mod agent;
mod env;
mod policy;
mod step;
pub use agent::Agent;
pub use env::Env;
pub use policy::{Configurable, Policy};
use std::fmt::Debug;
pub use step::{Info, Step, Transition};

/// An observation of an environment.
///
/// Vectorized environments are not supported, so an object of this trait
/// holds a single observation.
pub trait Obs: Clone + Debug {
    /// Returns the number of elements in the observation.
    fn len(&self) -> usize;

    /// Returns the element at the given index, if the observation is a flat vector.
    fn value_at(&self, _ix: usize) -> Option<f32> {
        None
    }
}

/// An action of an environment.
pub trait Act: Clone + Debug {
    /// Returns the number of elements in the action.
    fn len(&self) -> usize {
        1
    }
}
