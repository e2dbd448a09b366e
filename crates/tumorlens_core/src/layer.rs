//! Layer introspection for classifiers.
//!
//! Classifiers report their layers as an ordered list of [`LayerDescriptor`]s.
//! Each descriptor carries a [`LayerKind`] tag so that consumers can pick a
//! layer by what it is rather than by how it happens to be named.

use serde::{Deserialize, Serialize};

/// Coarse category of a classifier layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    /// Convolution (including its fused activation).
    Convolutional,
    /// Spatial pooling.
    Pooling,
    /// Fully connected.
    Dense,
    /// Anything else (flatten, dropout, normalization).
    Other,
}

impl LayerKind {
    /// Whether the layer's output keeps a `(C, H, W)` spatial layout.
    #[must_use]
    pub const fn is_spatial(&self) -> bool {
        matches!(self, Self::Convolutional | Self::Pooling)
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Convolutional => "convolutional",
            Self::Pooling => "pooling",
            Self::Dense => "dense",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Identifier and kind of one layer in a classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// Unique layer identifier within the classifier.
    pub id: String,
    /// Layer category.
    pub kind: LayerKind,
}

impl LayerDescriptor {
    /// Create a new descriptor.
    pub fn new(id: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Shorthand for a convolutional layer.
    pub fn conv(id: impl Into<String>) -> Self {
        Self::new(id, LayerKind::Convolutional)
    }

    /// Shorthand for a pooling layer.
    pub fn pool(id: impl Into<String>) -> Self {
        Self::new(id, LayerKind::Pooling)
    }

    /// Shorthand for a dense layer.
    pub fn dense(id: impl Into<String>) -> Self {
        Self::new(id, LayerKind::Dense)
    }

    /// Shorthand for any other layer.
    pub fn other(id: impl Into<String>) -> Self {
        Self::new(id, LayerKind::Other)
    }
}

/// Find the last convolutional layer in `layers`.
#[must_use]
pub fn last_convolutional(layers: &[LayerDescriptor]) -> Option<&LayerDescriptor> {
    layers
        .iter()
        .rev()
        .find(|layer| layer.kind == LayerKind::Convolutional)
}

/// Find a layer by id.
#[must_use]
pub fn find_layer<'a>(layers: &'a [LayerDescriptor], id: &str) -> Option<&'a LayerDescriptor> {
    layers.iter().find(|layer| layer.id == id)
}
