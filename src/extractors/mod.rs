pub mod payload;

pub use payload::{BodyPayload, MergedPayload};
