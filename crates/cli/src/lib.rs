//! Library side of the `textsift` binary.
pub mod commands;
