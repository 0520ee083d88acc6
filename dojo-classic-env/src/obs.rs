use dojo_core::Obs;
use ndarray::Array1;

/// Observation of classic-control environments.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassicObs(pub Array1<f32>);

impl Obs for ClassicObs {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn value_at(&self, ix: usize) -> Option<f32> {
        self.0.get(ix).copied()
    }
}

impl From<Vec<f32>> for ClassicObs {
    fn from(v: Vec<f32>) -> Self {
        Self(Array1::from(v))
    }
}
