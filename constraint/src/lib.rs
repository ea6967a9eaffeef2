//! Cascade Constraint
//!
//! Conversion between client values and their stored representation.
//!
//! Responsibilities:
//! - Encode raw attribute values according to each attribute's constraint
//! - Decode stored values back for audit records and change propagation

mod codec;
mod error;
mod typed;

pub use codec::{ConstraintCodec, PassthroughCodec};
pub use error::{ConstraintError, ConstraintResult};
pub use typed::TypedCodec;
