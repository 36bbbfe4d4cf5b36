use std::sync::Arc;

use rxcore::ErrorRef;

#[derive(Debug, thiserror::Error)]
#[error("custom error: {0}")]
pub struct CustomError(pub &'static str);

pub fn custom_error(reason: &'static str) -> ErrorRef {
    Arc::new(CustomError(reason))
}
