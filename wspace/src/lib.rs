//! Interpreter for the Whitespace programming language, with
//! arbitrary-precision integers.

pub mod error;
pub mod io;
pub mod vm;
