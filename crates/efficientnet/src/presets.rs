//! One constructor per published size, each taking the class count.

use burn::tensor::backend::Backend;

use crate::error::Result;
use crate::model::EfficientNet;
use crate::variant::Variant;

pub fn build_variant<B: Backend>(
    variant: Variant,
    num_classes: usize,
    device: &B::Device,
) -> Result<EfficientNet<B>> {
    variant.config(num_classes).init(device)
}

pub fn efficientnet_b0<B: Backend>(
    num_classes: usize,
    device: &B::Device,
) -> Result<EfficientNet<B>> {
    build_variant(Variant::B0, num_classes, device)
}

pub fn efficientnet_b1<B: Backend>(
    num_classes: usize,
    device: &B::Device,
) -> Result<EfficientNet<B>> {
    build_variant(Variant::B1, num_classes, device)
}

pub fn efficientnet_b2<B: Backend>(
    num_classes: usize,
    device: &B::Device,
) -> Result<EfficientNet<B>> {
    build_variant(Variant::B2, num_classes, device)
}

pub fn efficientnet_b3<B: Backend>(
    num_classes: usize,
    device: &B::Device,
) -> Result<EfficientNet<B>> {
    build_variant(Variant::B3, num_classes, device)
}

pub fn efficientnet_b4<B: Backend>(
    num_classes: usize,
    device: &B::Device,
) -> Result<EfficientNet<B>> {
    build_variant(Variant::B4, num_classes, device)
}

pub fn efficientnet_b5<B: Backend>(
    num_classes: usize,
    device: &B::Device,
) -> Result<EfficientNet<B>> {
    build_variant(Variant::B5, num_classes, device)
}

pub fn efficientnet_b6<B: Backend>(
    num_classes: usize,
    device: &B::Device,
) -> Result<EfficientNet<B>> {
    build_variant(Variant::B6, num_classes, device)
}

pub fn efficientnet_b7<B: Backend>(
    num_classes: usize,
    device: &B::Device,
) -> Result<EfficientNet<B>> {
    build_variant(Variant::B7, num_classes, device)
}
