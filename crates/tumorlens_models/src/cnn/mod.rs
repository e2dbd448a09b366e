//! Convolutional classifiers.

mod tumor_cnn;

pub use tumor_cnn::{
    TumorCnn, TumorCnnConfig, CONV_1, CONV_2, DENSE_1, DENSE_2, FLATTEN, POOL_1, POOL_2,
};
