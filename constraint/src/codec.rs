//! Codec contract.

use cascade_core::{Attribute, DataDocument};

/// Converts attribute values between their client and stored forms.
///
/// Both directions are pure and total: a value the codec does not understand
/// is returned unchanged.
pub trait ConstraintCodec {
    /// Client values -> stored values.
    fn encode(&self, attributes: &[Attribute], raw: &DataDocument) -> DataDocument;

    /// Stored values -> client values.
    fn decode(&self, attributes: &[Attribute], stored: &DataDocument) -> DataDocument;
}

/// Codec that stores values exactly as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCodec;

impl ConstraintCodec for PassthroughCodec {
    fn encode(&self, _attributes: &[Attribute], raw: &DataDocument) -> DataDocument {
        raw.clone()
    }

    fn decode(&self, _attributes: &[Attribute], stored: &DataDocument) -> DataDocument {
        stored.clone()
    }
}
