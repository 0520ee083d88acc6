//! Utilities.
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::VarMap;
use log::trace;
use serde::{Deserialize, Serialize};

/// Critic loss type.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum CriticLoss {
    /// Mean squared error.
    Mse,

    /// Smooth L1 loss.
    SmoothL1,
}

/// Apply soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
///
/// With `tau = 1.0`, the values of `src` are copied to `dest`. The variables
/// in `dest` keep their own storage.
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    trace!("track with tau = {}", tau);
    let dest = dest.data().lock().map_err(|e| anyhow!("{}", e))?;
    let src = src.data().lock().map_err(|e| anyhow!("{}", e))?;

    for (k_dest, v_dest) in dest.iter() {
        let v_src = src
            .get(k_dest)
            .ok_or_else(|| anyhow!("Variable {} is not found in the source", k_dest))?;
        let t_src = v_src.as_tensor();
        let t_dest = v_dest.as_tensor();
        let t_dest = ((tau * t_src)? + ((1.0 - tau) * t_dest)?)?;
        v_dest.set(&t_dest)?;
    }

    Ok(())
}

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> usize;
}

/// Models whose output can be a probability distribution over actions.
pub trait ProbOut {
    /// Returns `true` if the output is already normalized by softmax.
    fn is_prob_out(&self) -> bool;
}

/// See <https://pytorch.org/docs/stable/generated/torch.nn.SmoothL1Loss.html>.
pub fn smooth_l1_loss(x: &Tensor, y: &Tensor) -> Result<Tensor, candle_core::Error> {
    let device = x.device();
    let d = (x - y)?.abs()?;
    let m1 = d.lt(1.0)?.to_dtype(DType::F32)?.to_device(device)?;
    let m2 = Tensor::try_from(1f32)?
        .to_device(device)?
        .broadcast_sub(&m1)?;
    (((0.5 * m1)? * d.powf(2.0))? + m2 * (d - 0.5))?.mean_all()
}

/// Returns the index of the maximum value of each row.
pub fn argmax(xs: &Tensor) -> Result<Vec<usize>> {
    let ixs = xs.argmax(D::Minus1)?.flatten_all()?.to_vec1::<u32>()?;
    Ok(ixs.into_iter().map(|i| i as usize).collect())
}

/// Concatenates observations into a batch along the first dimension.
pub fn obs_batch<O>(obs: &[O], device: &Device) -> Result<Tensor>
where
    O: Clone + TryInto<Tensor, Error = candle_core::Error>,
{
    let xs = obs
        .iter()
        .map(|o| o.clone().try_into())
        .collect::<Result<Vec<Tensor>, _>>()?;
    Ok(Tensor::cat(&xs, 0)?.to_device(device)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::Init;

    fn varmap_with(t: &Tensor) -> Result<VarMap> {
        let vm = VarMap::new();
        let init = Init::Randn {
            mean: 0.0,
            stdev: 1.0,
        };
        vm.get((3,), "var1", init, DType::F32, &Device::Cpu)?;
        vm.data().lock().unwrap().get("var1").unwrap().set(t)?;
        Ok(vm)
    }

    fn get(vm: &VarMap) -> Result<Vec<f32>> {
        let t = vm.data().lock().unwrap()["var1"].as_tensor().clone();
        Ok(t.to_vec1::<f32>()?)
    }

    #[test]
    fn test_track() -> Result<()> {
        let tau = 0.7;
        let t_src = Tensor::from_slice(&[1.0f32, 2.0, 3.0], (3,), &Device::Cpu)?;
        let t_dest = Tensor::from_slice(&[4.0f32, 5.0, 6.0], (3,), &Device::Cpu)?;
        let t = ((tau * &t_src)? + ((1.0 - tau) * &t_dest)?)?;

        let vm_src = varmap_with(&t_src)?;
        let vm_dest = varmap_with(&t_dest)?;
        track(&vm_dest, &vm_src, tau)?;

        let t_ = Tensor::from_vec(get(&vm_dest)?, (3,), &Device::Cpu)?;
        assert!((t - t_)?.abs()?.sum(0)?.to_scalar::<f32>()? < 1e-6);
        Ok(())
    }

    #[test]
    fn test_hard_copy_does_not_share_storage() -> Result<()> {
        let vm_src = varmap_with(&Tensor::new(&[1f32, 2., 3.], &Device::Cpu)?)?;
        let vm_dest = varmap_with(&Tensor::new(&[0f32, 0., 0.], &Device::Cpu)?)?;
        track(&vm_dest, &vm_src, 1.0)?;
        assert_eq!(get(&vm_dest)?, vec![1.0, 2.0, 3.0]);

        vm_src.data().lock().unwrap()["var1"].set(&Tensor::new(&[9f32, 9., 9.], &Device::Cpu)?)?;
        assert_eq!(get(&vm_dest)?, vec![1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_smooth_l1_loss() -> Result<()> {
        let x = Tensor::new(&[0.0f32, 0.0], &Device::Cpu)?;
        let y = Tensor::new(&[0.5f32, 3.0], &Device::Cpu)?;
        // (0.5 * 0.25 + 2.5) / 2
        let loss = smooth_l1_loss(&x, &y)?.to_scalar::<f32>()?;
        assert!((loss - 1.3125).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_argmax() -> Result<()> {
        let xs = Tensor::new(&[[0.1f32, 0.5, 0.2], [3.0, -1.0, 0.0]], &Device::Cpu)?;
        assert_eq!(argmax(&xs)?, vec![1, 0]);
        Ok(())
    }
}
