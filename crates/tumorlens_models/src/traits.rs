//! Classifier trait implementations.
//!
//! Implements `TumorClassifier` for the models in this crate.

use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use tumorlens_core::{FeatureTap, ImageShape, LayerDescriptor, TumorClassifier};

use crate::cnn::TumorCnn;

impl<B: AutodiffBackend> TumorClassifier<B> for TumorCnn<B> {
    fn input_shape(&self) -> ImageShape {
        Self::input_shape(self)
    }

    fn layers(&self) -> Vec<LayerDescriptor> {
        Self::layer_descriptors()
    }

    fn forward_tapped(&self, x: Tensor<B, 4>, tap: &mut FeatureTap<B>) -> Tensor<B, 2> {
        self.forward_tapped(x, tap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnn::{TumorCnnConfig, CONV_2};
    use burn_autodiff::Autodiff;
    use burn_ndarray::NdArray;
    use tumorlens_core::last_convolutional;

    type TestBackend = Autodiff<NdArray>;

    fn as_classifier<M: TumorClassifier<TestBackend>>(model: &M) -> &M {
        model
    }

    #[test]
    fn test_tumor_cnn_is_classifier() {
        let device = Default::default();
        let model = TumorCnnConfig::new(16)
            .with_filters(2, 4)
            .with_hidden_size(4)
            .init::<TestBackend>(&device)
            .unwrap();
        let classifier = as_classifier(&model);

        assert_eq!(
            TumorClassifier::input_shape(classifier),
            ImageShape::rgb(16, 16)
        );

        let layers = TumorClassifier::layers(classifier);
        assert_eq!(last_convolutional(&layers).unwrap().id, CONV_2);

        let x = Tensor::<TestBackend, 4>::zeros([1, 3, 16, 16], &device);
        let out = TumorClassifier::forward(classifier, x);
        assert_eq!(out.dims(), [1, 1]);
    }
}
