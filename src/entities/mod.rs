//! Registration of native domain types

#[macro_use]
pub mod macros;
