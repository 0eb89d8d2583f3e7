use std::iter::FusedIterator;

use rug::Integer;
use thiserror::Error;

use crate::{decode_operand, Inst, Label, Match, Opcode, PrefixTrie, Stream, Token, Unterminated};

/// Error from decoding an instruction.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum DecodeError {
    #[error("unknown instruction")]
    UnknownInstruction,
    #[error("incomplete instruction at end of program")]
    IncompleteInstruction,
    #[error("malformed operand: missing terminating line feed")]
    MalformedOperand,
}

/// An instruction decoded at an offset in the token stream.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decoded {
    pub inst: Inst,
    pub offset: usize,
    /// Length in tokens, including the prefix code and operand.
    pub len: usize,
}

/// Decodes instructions from a token stream.
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    trie: PrefixTrie,
}

impl Decoder {
    #[inline]
    pub fn new() -> Self {
        Decoder {
            trie: PrefixTrie::new(),
        }
    }

    /// Decodes the instruction at the start of `toks`, returning it and its
    /// length.
    pub fn decode(&self, toks: &[Token]) -> Result<(Inst, usize), DecodeError> {
        let (opcode, prefix_len) = match self.trie.lookup(toks) {
            Match::Opcode(opcode, len) => (opcode, len),
            Match::Invalid => return Err(DecodeError::UnknownInstruction),
            Match::Incomplete => return Err(DecodeError::IncompleteInstruction),
        };
        let mut len = prefix_len;
        let mut arg = || -> Result<Integer, DecodeError> {
            let op = decode_operand(&toks[prefix_len..]).map_err(|Unterminated| DecodeError::MalformedOperand)?;
            len += op.len;
            Ok(op.value)
        };
        let inst = match opcode {
            Opcode::Push => Inst::Push(arg()?),
            Opcode::Dup => Inst::Dup,
            Opcode::Copy => Inst::Copy(arg()?),
            Opcode::Swap => Inst::Swap,
            Opcode::Drop => Inst::Drop,
            Opcode::Slide => Inst::Slide(arg()?),
            Opcode::Add => Inst::Add,
            Opcode::Sub => Inst::Sub,
            Opcode::Mul => Inst::Mul,
            Opcode::Div => Inst::Div,
            Opcode::Mod => Inst::Mod,
            Opcode::Store => Inst::Store,
            Opcode::Retrieve => Inst::Retrieve,
            Opcode::Mark => Inst::Mark(Label(arg()?)),
            Opcode::Call => Inst::Call(Label(arg()?)),
            Opcode::Jmp => Inst::Jmp(Label(arg()?)),
            Opcode::Jz => Inst::Jz(Label(arg()?)),
            Opcode::Jn => Inst::Jn(Label(arg()?)),
            Opcode::Ret => Inst::Ret,
            Opcode::End => Inst::End,
            Opcode::Printc => Inst::Printc,
            Opcode::Printi => Inst::Printi,
            Opcode::Readc => Inst::Readc,
            Opcode::Readi => Inst::Readi,
        };
        Ok((inst, len))
    }

    /// Decodes the instruction at `offset` in the stream.
    #[inline]
    pub fn decode_at(&self, stream: &Stream, offset: usize) -> Result<Decoded, DecodeError> {
        let (inst, len) = self.decode(stream.tail(offset))?;
        Ok(Decoded { inst, offset, len })
    }

    /// Iterates the instructions of the stream in order, from the start. It
    /// stops after the first error.
    #[inline]
    pub fn iter<'a>(&'a self, stream: &'a Stream) -> Insts<'a> {
        Insts {
            decoder: self,
            stream,
            offset: 0,
            failed: false,
        }
    }
}

/// Iterator over the instructions of a stream.
#[derive(Clone, Debug)]
pub struct Insts<'a> {
    decoder: &'a Decoder,
    stream: &'a Stream,
    offset: usize,
    failed: bool,
}

impl Iterator for Insts<'_> {
    type Item = Result<Decoded, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.stream.len() {
            return None;
        }
        match self.decoder.decode_at(self.stream, self.offset) {
            Ok(d) => {
                self.offset += d.len;
                Some(Ok(d))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Insts<'_> {}
