use std::fmt::{self, Display, Formatter};

use rug::Integer;
use strum::Display;
use wspace_macros::Opcode;

use crate::{Builder, FormatTokens, Label, Token, TokenWriter};

/// Whitespace instruction with its decoded operand.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Opcode)]
pub enum Inst {
    Push(Integer),
    Dup,
    Copy(Integer),
    Swap,
    Drop,
    Slide(Integer),
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Store,
    Retrieve,
    Mark(Label),
    Call(Label),
    Jmp(Label),
    Jz(Label),
    Jn(Label),
    Ret,
    End,
    Printc,
    Printi,
    Readc,
    Readi,
}

/// Kind of operand that follows an opcode.
#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum ArgKind {
    Number,
    Label,
}

impl Opcode {
    /// The prefix code that selects this instruction. Prefix codes are
    /// prefix-free over the token alphabet.
    #[rustfmt::skip]
    pub const fn prefix(self) -> &'static [Token] {
        use Token::*;
        match self {
            Opcode::Push     => &[S, S],
            Opcode::Dup      => &[S, L, S],
            Opcode::Copy     => &[S, T, S],
            Opcode::Swap     => &[S, L, T],
            Opcode::Drop     => &[S, L, L],
            Opcode::Slide    => &[S, T, L],
            Opcode::Add      => &[T, S, S, S],
            Opcode::Sub      => &[T, S, S, T],
            Opcode::Mul      => &[T, S, S, L],
            Opcode::Div      => &[T, S, T, S],
            Opcode::Mod      => &[T, S, T, T],
            Opcode::Store    => &[T, T, S],
            Opcode::Retrieve => &[T, T, T],
            Opcode::Mark     => &[L, S, S],
            Opcode::Call     => &[L, S, T],
            Opcode::Jmp      => &[L, S, L],
            Opcode::Jz       => &[L, T, S],
            Opcode::Jn       => &[L, T, T],
            Opcode::Ret      => &[L, T, L],
            Opcode::End      => &[L, L, L],
            Opcode::Printc   => &[T, L, S, S],
            Opcode::Printi   => &[T, L, S, T],
            Opcode::Readc    => &[T, L, T, S],
            Opcode::Readi    => &[T, L, T, T],
        }
    }

    #[inline]
    pub const fn arg_kind(self) -> Option<ArgKind> {
        match self {
            Opcode::Push | Opcode::Copy | Opcode::Slide => Some(ArgKind::Number),
            Opcode::Mark | Opcode::Call | Opcode::Jmp | Opcode::Jz | Opcode::Jn => {
                Some(ArgKind::Label)
            }
            _ => None,
        }
    }

    /// Number of stack values the instruction pops before it can have any
    /// effect. `copy` and `slide` need more, depending on their operand.
    #[inline]
    pub const fn pops(self) -> usize {
        match self {
            Opcode::Dup | Opcode::Drop | Opcode::Slide => 1,
            Opcode::Swap => 2,
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod => 2,
            Opcode::Store => 2,
            Opcode::Retrieve | Opcode::Jz | Opcode::Jn => 1,
            Opcode::Printc | Opcode::Printi | Opcode::Readc | Opcode::Readi => 1,
            _ => 0,
        }
    }
}

impl Inst {
    #[inline]
    pub fn number(&self) -> Option<&Integer> {
        match self {
            Inst::Push(n) | Inst::Copy(n) | Inst::Slide(n) => Some(n),
            _ => None,
        }
    }

    #[inline]
    pub fn label(&self) -> Option<&Label> {
        match self {
            Inst::Mark(l) | Inst::Call(l) | Inst::Jmp(l) | Inst::Jz(l) | Inst::Jn(l) => Some(l),
            _ => None,
        }
    }
}

impl Display for Inst {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let opcode = self.opcode();
        if let Some(n) = self.number() {
            write!(f, "{opcode} {n}")
        } else if let Some(l) = self.label() {
            write!(f, "{opcode} {l}")
        } else {
            write!(f, "{opcode}")
        }
    }
}

impl FormatTokens for Inst {
    fn fmt_tokens<W: TokenWriter>(&self, b: &mut Builder<'_, W>) {
        b.append(self.opcode().prefix());
        if let Some(n) = self.number() {
            b.write_integer(n);
        } else if let Some(l) = self.label() {
            b.write_integer(l.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn arg_kinds_agree() {
        for opcode in Opcode::ALL {
            assert_eq!(opcode.has_arg(), opcode.arg_kind().is_some(), "{opcode}");
        }
        assert_eq!(Some(ArgKind::Number), Opcode::Slide.arg_kind());
        assert_eq!(Some(ArgKind::Label), Opcode::Jn.arg_kind());
        assert_eq!("label", ArgKind::Label.to_string());
    }

    #[test]
    fn display_listing() {
        let prog = [
            Inst::Push(Integer::from(-12)),
            Inst::Mark(Label::new(1)),
            Inst::Dup,
            Inst::Printi,
            Inst::Copy(Integer::from(2)),
            Inst::Jz(Label::new(-3)),
            Inst::Readc,
            Inst::End,
        ];
        let listing = prog
            .iter()
            .map(|inst| inst.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        assert_snapshot!(listing, @r"
        push -12
        mark @1
        dup
        printi
        copy 2
        jz @-3
        readc
        end
        ");
    }

    #[test]
    fn opcode_of_inst() {
        assert_eq!(Opcode::Jmp, Inst::Jmp(Label::new(0)).opcode());
        assert_eq!(Opcode::Readi, Inst::Readi.opcode());
        assert_eq!(24, Opcode::ALL.len());
    }
}
