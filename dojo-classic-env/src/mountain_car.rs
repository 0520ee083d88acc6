use crate::{column, Dynamics, FRAME_WIDTH};
use rand::{rngs::SmallRng, Rng};

const MIN_POSITION: f64 = -1.2;
const MAX_POSITION: f64 = 0.6;
const MAX_SPEED: f64 = 0.07;
const GOAL_POSITION: f64 = 0.5;
const GOAL_VELOCITY: f64 = 0.0;
const FORCE: f64 = 0.001;
const GRAVITY: f64 = 0.0025;

/// An underpowered car in a valley that has to reach the flag on the right hill.
///
/// Actions are 0 (push left), 1 (no push) and 2 (push right). Reward is -1 for
/// every step.
#[derive(Debug, Clone)]
pub struct MountainCar {
    /// `[position, velocity]`.
    pub state: [f64; 2],
}

impl Default for MountainCar {
    fn default() -> Self {
        Self {
            state: [-0.5, 0.0],
        }
    }
}

impl Dynamics for MountainCar {
    fn reset(&mut self, rng: &mut SmallRng) {
        self.state = [rng.gen_range(-0.6..-0.4), 0.0];
    }

    fn step(&mut self, act: usize) -> (f32, bool) {
        let [mut position, mut velocity] = self.state;
        velocity += (act as f64 - 1.0) * FORCE + (3.0 * position).cos() * (-GRAVITY);
        velocity = velocity.clamp(-MAX_SPEED, MAX_SPEED);
        position += velocity;
        position = position.clamp(MIN_POSITION, MAX_POSITION);
        if position == MIN_POSITION && velocity < 0.0 {
            velocity = 0.0;
        }
        self.state = [position, velocity];

        let terminated = position >= GOAL_POSITION && velocity >= GOAL_VELOCITY;
        (-1.0, terminated)
    }

    fn state(&self) -> Vec<f32> {
        self.state.iter().map(|&v| v as f32).collect()
    }

    fn n_actions(&self) -> usize {
        3
    }

    fn obs_dim(&self) -> usize {
        2
    }

    fn frame(&self) -> String {
        let [position, velocity] = self.state;
        let mut line = vec![b'_'; FRAME_WIDTH];
        line[column(GOAL_POSITION, MIN_POSITION, MAX_POSITION)] = b'F';
        line[column(position, MIN_POSITION, MAX_POSITION)] = b'o';
        format!(
            "[{}] position = {:+.3}, velocity = {:+.4}",
            String::from_utf8_lossy(&line),
            position,
            velocity
        )
    }
}
