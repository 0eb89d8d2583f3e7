use rug::Integer;

use crate::{encode_operand, Inst, Stream, Token};

/// Types that can be written as Whitespace tokens.
pub trait FormatTokens {
    fn fmt_tokens<W: TokenWriter>(&self, b: &mut Builder<'_, W>);
}

pub trait TokenWriter {
    fn write_token(&mut self, tok: Token);

    fn write_comment(&mut self, comment: &[u8]);
}

/// Writes instructions and operands to a token writer.
#[derive(Debug)]
pub struct Builder<'a, W> {
    w: &'a mut W,
}

impl<'a, W: TokenWriter> Builder<'a, W> {
    #[inline]
    pub fn new(token_writer: &'a mut W) -> Self {
        Builder { w: token_writer }
    }

    #[inline]
    pub fn push(&mut self, tok: Token) {
        self.w.write_token(tok);
    }

    pub fn append(&mut self, toks: &[Token]) {
        for &tok in toks {
            self.push(tok);
        }
    }

    /// Writes a signed operand and its terminating LF.
    #[inline]
    pub fn write_integer(&mut self, n: &Integer) {
        encode_operand(n, &mut *self.w);
    }

    #[inline]
    pub fn comment(&mut self, comment: &[u8]) {
        self.w.write_comment(comment);
    }

    #[inline]
    pub fn write<T: FormatTokens + ?Sized>(&mut self, v: &T) {
        v.fmt_tokens(self);
    }
}

impl<T: FormatTokens> FormatTokens for [T] {
    fn fmt_tokens<W: TokenWriter>(&self, b: &mut Builder<'_, W>) {
        for v in self {
            v.fmt_tokens(b);
        }
    }
}

impl TokenWriter for Vec<Token> {
    #[inline]
    fn write_token(&mut self, tok: Token) {
        self.push(tok);
    }

    #[inline]
    fn write_comment(&mut self, _comment: &[u8]) {}
}

/// Token writer that produces source bytes, keeping comments.
#[derive(Clone, Debug, Default)]
pub struct SourceWriter {
    buf: Vec<u8>,
}

impl SourceWriter {
    #[inline]
    pub fn new() -> Self {
        SourceWriter::default()
    }

    #[inline]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

impl TokenWriter for SourceWriter {
    #[inline]
    fn write_token(&mut self, tok: Token) {
        self.buf.push(tok.to_byte());
    }

    fn write_comment(&mut self, comment: &[u8]) {
        // Significant bytes in a comment would become tokens.
        self.buf
            .extend(comment.iter().filter(|&&b| Token::from_byte(b).is_none()));
    }
}

/// Assembles instructions into a token stream.
pub fn assemble(prog: &[Inst]) -> Stream {
    let mut toks = Vec::new();
    Builder::new(&mut toks).write(prog);
    Stream::from(toks)
}
