/// Parser implementations for model output formats
pub mod pythonic_parser;

pub use pythonic_parser::{PythonicOptions, PythonicParser};
