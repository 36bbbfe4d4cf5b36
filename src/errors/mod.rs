mod observable_errors;

pub use observable_errors::*;
