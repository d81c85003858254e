//! Source file parsing

pub mod delimited;

pub use delimited::DelimitedReader;
