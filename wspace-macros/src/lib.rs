mod opcodes;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;
use syn::parse_macro_input;

use crate::opcodes::derive_opcode;

/// Derives a fieldless opcode enum for an instruction enum.
///
/// For `enum Inst`, this generates `enum Opcode` with one variant per
/// instruction, `Inst::opcode`, `Opcode::ALL` in declaration order, and
/// `Opcode::has_arg`, which is true for variants that carry an operand.
#[proc_macro_derive(Opcode)]
#[proc_macro_error]
pub fn opcode(input: TokenStream) -> TokenStream {
    derive_opcode(parse_macro_input!(input)).into()
}
