//! Environment step.
use super::Env;

/// Additional information to `Obs` and `Act`.
pub trait Info {}

impl Info for () {}

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with some additional information.
///
/// An environment emits [`Step`] object at every interaction steps.
/// This object is used to create a [`Transition`] `(o_t, a_t, r_t, o_t+1)`.
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation after the action.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Flag denoting if episode is truncated, e.g. by a time limit.
    pub is_truncated: bool,

    /// Information defined by user.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: f32,
        is_terminated: bool,
        is_truncated: bool,
        info: E::Info,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// A transition `(o_t, a_t, r_t, o_t+1)` with episode-end flags.
///
/// Transitions are built in the training loop and consumed immediately by
/// [`Agent::opt`](crate::Agent::opt). They are never stored.
pub struct Transition<E: Env> {
    /// Observation `o_t`.
    pub obs: E::Obs,

    /// Action `a_t`.
    pub act: E::Act,

    /// Reward `r_t`.
    pub reward: f32,

    /// Observation `o_t+1`.
    pub next_obs: E::Obs,

    /// If `true`, the target value does not bootstrap from `o_t+1`.
    pub is_terminated: bool,

    /// If `true`, the episode ended without reaching a terminal state.
    pub is_truncated: bool,
}

impl<E: Env> Transition<E> {
    /// Builds a transition from the previous observation and a [`Step`].
    ///
    /// `is_terminated` is given separately because the training loop may decide
    /// terminal states with its own condition.
    pub fn from_step(obs: E::Obs, step: &Step<E>, is_terminated: bool) -> Self {
        Self {
            obs,
            act: step.act.clone(),
            reward: step.reward,
            next_obs: step.obs.clone(),
            is_terminated,
            is_truncated: step.is_truncated,
        }
    }

    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}
