use burn::backend::Autodiff;
use burn::tensor::{Distribution, Tensor};
use burn_ndarray::NdArray;
use efficientnet::prelude::*;

// Autodiff puts batch norm and dropout into training mode.
type ADBackend = Autodiff<NdArray<f32>>;

#[test]
fn gradients_flow_through_the_whole_network() {
    let device = <ADBackend as burn::tensor::backend::Backend>::Device::default();
    let model = efficientnet_b0::<ADBackend>(4, &device).unwrap();

    let input = Tensor::<ADBackend, 4>::random([2, 3, 32, 32], Distribution::Default, &device);
    let logits = model.forward(input);
    assert_eq!(logits.dims(), [2, 4]);

    let loss = logits.powf_scalar(2.0).mean();
    let loss_val: f32 = loss
        .clone()
        .into_data()
        .to_vec::<f32>()
        .unwrap_or_default()
        .into_iter()
        .next()
        .unwrap_or(f32::NAN);
    assert!(loss_val.is_finite());

    let grads = loss.backward();
    let params = burn::optim::GradientsParams::from_grads(grads, &model);
    assert!(!params.is_empty());
}
