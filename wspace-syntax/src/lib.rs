//! Whitespace syntax.
//!
//! This crate turns Whitespace source into an immutable stream of tokens,
//! decodes instructions from that stream by prefix code, and resolves label
//! definitions ahead of execution.

mod builder;
mod codec;
mod decode;
mod filter;
mod inst;
mod labels;
mod table;
mod token;

pub use builder::*;
pub use codec::*;
pub use decode::*;
pub use filter::*;
pub use inst::*;
pub use labels::*;
pub use table::*;
pub use token::*;
