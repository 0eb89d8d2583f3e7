use std::iter::FusedIterator;
use std::ops::Index;
use std::slice::SliceIndex;

use memchr::memchr3;

use crate::Token;

/// Lexer for Whitespace tokens, that skips comment bytes using memchr.
///
/// Only space, tab, and LF are tokens. Every other byte, including CR and
/// bytes that are not valid UTF-8, is a comment.
#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    src: &'a [u8],
    offset: usize,
}

impl<'a> Lexer<'a> {
    #[inline]
    pub fn new(src: &'a [u8]) -> Self {
        Lexer { src, offset: 0 }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.src[self.offset..];
        match memchr3(b' ', b'\t', b'\n', rest) {
            Some(i) => {
                self.offset += i + 1;
                Token::from_byte(rest[i])
            }
            None => {
                self.offset = self.src.len();
                None
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.src.len() - self.offset))
    }
}

impl FusedIterator for Lexer<'_> {}

/// Immutable stream of Whitespace tokens, with comments removed.
///
/// Instruction pointers are offsets into this stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Stream {
    toks: Box<[Token]>,
}

impl Stream {
    /// Filters source text down to its tokens, in their original order.
    pub fn filter(src: &[u8]) -> Self {
        Lexer::new(src).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.toks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.toks.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Token] {
        &self.toks
    }

    /// Tokens from `offset` to the end, or an empty slice when `offset` is
    /// out of bounds.
    #[inline]
    pub fn tail(&self, offset: usize) -> &[Token] {
        self.toks.get(offset..).unwrap_or_default()
    }

    /// Converts back to source bytes with no comments.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.toks.iter().map(|tok| tok.to_byte()).collect()
    }
}

impl FromIterator<Token> for Stream {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Stream {
            toks: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Token>> for Stream {
    #[inline]
    fn from(toks: Vec<Token>) -> Self {
        Stream {
            toks: toks.into_boxed_slice(),
        }
    }
}

impl<I: SliceIndex<[Token]>> Index<I> for Stream {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        &self.toks[index]
    }
}
