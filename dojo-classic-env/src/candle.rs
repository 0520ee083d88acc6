//! Conversion between candle tensors and observations/actions.
use crate::{ClassicObs, DiscreteAct};
use candle_core::{DType, Device, Error, Tensor};
use std::convert::TryFrom;

/// A tensor of shape `[1, obs_dim]`, a batch with a single observation.
impl TryFrom<ClassicObs> for Tensor {
    type Error = Error;

    fn try_from(obs: ClassicObs) -> Result<Self, Error> {
        let n = obs.0.len();
        Tensor::from_vec(obs.0.to_vec(), (1, n), &Device::Cpu)
    }
}

/// Takes an action index from a tensor with a single integer element.
impl TryFrom<Tensor> for DiscreteAct {
    type Error = Error;

    fn try_from(t: Tensor) -> Result<Self, Error> {
        let v = t.flatten_all()?.to_dtype(DType::I64)?.to_vec1::<i64>()?;
        match v.as_slice() {
            [a] if *a >= 0 => Ok(DiscreteAct(*a as usize)),
            _ => Err(Error::Msg(format!(
                "expected a non-negative scalar action, got {:?}",
                v
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obs_to_tensor() -> anyhow::Result<()> {
        let obs = ClassicObs::from(vec![0.1, -0.2, 0.3, 0.4]);
        let t = Tensor::try_from(obs)?;
        assert_eq!(t.dims(), &[1, 4]);
        assert_eq!(t.to_vec2::<f32>()?, vec![vec![0.1, -0.2, 0.3, 0.4]]);
        Ok(())
    }

    #[test]
    fn test_tensor_to_act() -> anyhow::Result<()> {
        let t = Tensor::new(&[2u32], &Device::Cpu)?;
        assert_eq!(DiscreteAct::try_from(t)?, DiscreteAct(2));
        let t = Tensor::new(&[1u32, 2], &Device::Cpu)?;
        assert!(DiscreteAct::try_from(t).is_err());
        Ok(())
    }
}
