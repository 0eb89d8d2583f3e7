mod heap;
mod stack;
mod vm;

pub use heap::*;
pub use stack::*;
pub use vm::*;
