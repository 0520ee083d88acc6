use crate::{column, Dynamics, FRAME_WIDTH};
use rand::{rngs::SmallRng, Rng};

const GRAVITY: f64 = 9.8;
const MASS_CART: f64 = 1.0;
const MASS_POLE: f64 = 0.1;
const TOTAL_MASS: f64 = MASS_CART + MASS_POLE;
/// Half of the pole length.
const LENGTH: f64 = 0.5;
const POLE_MASS_LENGTH: f64 = MASS_POLE * LENGTH;
const FORCE_MAG: f64 = 10.0;
const TAU: f64 = 0.02;
const X_THRESHOLD: f64 = 2.4;
const THETA_THRESHOLD_RADIANS: f64 = 12.0 * 2.0 * std::f64::consts::PI / 360.0;

/// A pole on a cart moving along a frictionless track.
///
/// Action 0 pushes the cart to the left, action 1 to the right. Reward is 1 for
/// every step including the terminating one. The episode terminates when the
/// pole angle exceeds 12 degrees or the cart leaves `[-2.4, 2.4]`.
#[derive(Debug, Clone, Default)]
pub struct CartPole {
    /// `[x, x_dot, theta, theta_dot]`.
    pub state: [f64; 4],
}

impl Dynamics for CartPole {
    fn reset(&mut self, rng: &mut SmallRng) {
        for s in self.state.iter_mut() {
            *s = rng.gen_range(-0.05..0.05);
        }
    }

    fn step(&mut self, act: usize) -> (f32, bool) {
        let [x, x_dot, theta, theta_dot] = self.state;
        let force = if act == 1 { FORCE_MAG } else { -FORCE_MAG };
        let (sintheta, costheta) = theta.sin_cos();

        let temp = (force + POLE_MASS_LENGTH * theta_dot.powi(2) * sintheta) / TOTAL_MASS;
        let thetaacc = (GRAVITY * sintheta - costheta * temp)
            / (LENGTH * (4.0 / 3.0 - MASS_POLE * costheta.powi(2) / TOTAL_MASS));
        let xacc = temp - POLE_MASS_LENGTH * thetaacc * costheta / TOTAL_MASS;

        // Euler
        self.state = [
            x + TAU * x_dot,
            x_dot + TAU * xacc,
            theta + TAU * theta_dot,
            theta_dot + TAU * thetaacc,
        ];

        let [x, _, theta, _] = self.state;
        let terminated = x.abs() > X_THRESHOLD || theta.abs() > THETA_THRESHOLD_RADIANS;
        (1.0, terminated)
    }

    fn state(&self) -> Vec<f32> {
        self.state.iter().map(|&v| v as f32).collect()
    }

    fn n_actions(&self) -> usize {
        2
    }

    fn obs_dim(&self) -> usize {
        4
    }

    fn frame(&self) -> String {
        let [x, _, theta, _] = self.state;
        let mut line = vec![b'-'; FRAME_WIDTH];
        let pole = if theta > 0.05 {
            b'/'
        } else if theta < -0.05 {
            b'\\'
        } else {
            b'|'
        };
        line[column(x, -X_THRESHOLD, X_THRESHOLD)] = pole;
        format!(
            "[{}] x = {:+.3}, theta = {:+.3}",
            String::from_utf8_lossy(&line),
            x,
            theta
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminates_when_pole_falls() {
        let mut cartpole = CartPole {
            state: [0.0, 0.0, 0.2, 0.5],
        };
        let (reward, terminated) = cartpole.step(1);
        assert_eq!(reward, 1.0);
        assert!(terminated);
    }

    #[test]
    fn test_terminates_out_of_track() {
        let mut cartpole = CartPole {
            state: [2.399, 1.0, 0.0, 0.0],
        };
        let (_, terminated) = cartpole.step(1);
        assert!(terminated);
    }

    #[test]
    fn test_push_direction() {
        let mut cartpole = CartPole::default();
        cartpole.step(1);
        assert!(cartpole.state[1] > 0.0);
        assert!(cartpole.state[3] < 0.0);

        let mut cartpole = CartPole::default();
        cartpole.step(0);
        assert!(cartpole.state[1] < 0.0);
        assert!(cartpole.state[3] > 0.0);
    }
}
