use super::{mlp_forward, MlpConfig, WeightInit};
use crate::model::SubModel1;
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{linear, Init, Linear, VarBuilder};

fn he_uniform_linear(in_dim: usize, out_dim: usize, vb: VarBuilder) -> Result<Linear> {
    let limit = (6.0 / in_dim as f64).sqrt();
    let init = Init::Uniform {
        lo: -limit,
        up: limit,
    };
    let w = vb.get_with_hints((out_dim, in_dim), "weight", init)?;
    let b = vb.get_with_hints(out_dim, "bias", Init::Const(0.0))?;
    Ok(Linear::new(w, Some(b)))
}

/// Returns vector of linear modules from [`MlpConfig`].
///
/// Parameters are named `{prefix}.ln{i}.weight` and `{prefix}.ln{i}.bias`.
fn create_linear_layers(prefix: &str, vs: VarBuilder, config: &MlpConfig) -> Result<Vec<Linear>> {
    let vs = vs.pp(prefix);

    config
        .dims()
        .windows(2)
        .enumerate()
        .map(|(i, dims)| {
            let vs = vs.pp(format!("ln{}", i));
            match config.init {
                WeightInit::HeUniform => he_uniform_linear(dims[0], dims[1], vs),
                WeightInit::Default => Ok(linear(dims[0], dims[1], vs)?),
            }
        })
        .collect()
}

/// Multilayer perceptron.
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    layers: Vec<Linear>,
}

impl Mlp {
    /// The configuration.
    pub fn config(&self) -> &MlpConfig {
        &self.config
    }
}

impl SubModel1 for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, xs: &Self::Input) -> Result<Tensor> {
        let xs = xs.to_device(&self.device)?;
        mlp_forward(
            xs,
            &self.layers,
            &self.config.activation,
            &self.config.activation_out,
        )
    }

    fn build(vs: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vs.device().clone();
        let layers = create_linear_layers("mlp", vs, &config)?;

        Ok(Self {
            config,
            device,
            layers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::Activation;
    use candle_core::{DType, D};
    use candle_nn::VarMap;

    #[test]
    fn test_single_layer_he_uniform() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let mlp = Mlp::build(vb, MlpConfig::new(4, vec![], 2))?;

        let data = varmap.data().lock().unwrap();
        let mut keys = data.keys().cloned().collect::<Vec<_>>();
        keys.sort();
        assert_eq!(keys, vec!["mlp.ln0.bias", "mlp.ln0.weight"]);

        let limit = (6.0f32 / 4.0).sqrt();
        let w = data["mlp.ln0.weight"].as_tensor().flatten_all()?.to_vec1::<f32>()?;
        assert_eq!(w.len(), 8);
        assert!(w.iter().all(|v| v.abs() <= limit));
        let b = data["mlp.ln0.bias"].as_tensor().to_vec1::<f32>()?;
        assert_eq!(b, vec![0.0, 0.0]);
        drop(data);

        let xs = Tensor::ones((3, 4), DType::F32, &Device::Cpu)?;
        assert_eq!(mlp.forward(&xs)?.dims(), &[3, 2]);
        Ok(())
    }

    #[test]
    fn test_softmax_output() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let config = MlpConfig::new(3, vec![16, 16], 5)
            .activation_out(Activation::Softmax)
            .init(WeightInit::Default);
        let mlp = Mlp::build(vb, config)?;
        assert_eq!(varmap.all_vars().len(), 6);

        let xs = Tensor::new(&[[0.5f32, -1.0, 2.0], [0.0, 0.0, 1.0]], &Device::Cpu)?;
        let ps = mlp.forward(&xs)?.sum(D::Minus1)?.to_vec1::<f32>()?;
        assert!(ps.iter().all(|p| (p - 1.0).abs() < 1e-5));
        Ok(())
    }
}
