//! Inference Row Validation
//!
//! Checks an incoming feature row against the column schema a model was
//! trained on and selects the values in trained order.

mod error;
mod validator;

pub use error::{format_feature_set, ValidationError};
pub use validator::SchemaValidator;
