use std::fmt::{self, Display, Formatter};

use bitvec::prelude::*;
use rug::integer::Order;
use rug::ops::NegAssign;
use rug::Integer;
use thiserror::Error;

use crate::{Token, TokenWriter};

/// A number or label operand decoded from the token stream.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Operand {
    pub value: Integer,
    /// Number of tokens consumed, including the terminating LF.
    pub len: usize,
}

/// The operand was not terminated by LF before the end of the stream.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
#[error("unterminated operand")]
pub struct Unterminated;

/// Whitespace label, identified by the integer its bits decode to.
#[repr(transparent)]
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub Integer);

/// Decodes a signed operand, that is terminated by LF.
///
/// The first token is the sign: S for non-negative and T for negative. The
/// rest is the magnitude in binary, most-significant bit first, with S as 0
/// and T as 1. A missing sign or magnitude decodes to zero.
pub fn decode_operand(toks: &[Token]) -> Result<Operand, Unterminated> {
    let end = toks.iter().position(|&tok| tok == Token::L).ok_or(Unterminated)?;
    let bits = toks[..end]
        .iter()
        .map(|&tok| tok == Token::T)
        .collect::<BitVec>();
    Ok(Operand {
        value: integer_from_signed_bits(&bits),
        len: end + 1,
    })
}

/// Encodes an integer as a signed operand with no leading zeros, including
/// the terminating LF. Zero is encoded as a lone positive sign.
pub fn encode_operand<W: TokenWriter + ?Sized>(value: &Integer, w: &mut W) {
    w.write_token(if value.is_negative() { Token::T } else { Token::S });
    for bit in unsigned_bits_from_integer(value) {
        w.write_token(if bit { Token::T } else { Token::S });
    }
    w.write_token(Token::L);
}

fn integer_from_signed_bits(bits: &BitSlice) -> Integer {
    match bits.split_first() {
        None => Integer::new(),
        Some((sign, bits)) => {
            let mut value = integer_from_unsigned_bits(bits);
            if *sign {
                value.neg_assign();
            }
            value
        }
    }
}

fn integer_from_unsigned_bits(bits: &BitSlice) -> Integer {
    if bits.len() < usize::BITS as usize {
        let mut arr = BitArray::<_, Lsb0>::new([0usize; 1]);
        let slice = &mut arr[..bits.len()];
        slice.copy_from_bitslice(bits);
        slice.reverse();
        Integer::from_digits(arr.as_raw_slice(), Order::LsfLe)
    } else {
        let mut boxed = BitBox::<usize, Lsb0>::from_bitslice(bits);
        boxed.force_align();
        boxed.fill_uninitialized(false);
        boxed.reverse();
        Integer::from_digits(boxed.as_raw_slice(), Order::LsfLe)
    }
}

/// Bits of the absolute value, most-significant first, with no leading zeros.
fn unsigned_bits_from_integer(value: &Integer) -> BitVec {
    let mut bits = BitVec::<usize, Lsb0>::from_vec(value.to_digits::<usize>(Order::LsfLe));
    bits.truncate(bits.last_one().map_or(0, |i| i + 1));
    bits.reverse();
    bits
}

impl Label {
    #[inline]
    pub fn new<T: Into<Integer>>(id: T) -> Self {
        Label(id.into())
    }

    #[inline]
    pub fn id(&self) -> &Integer {
        &self.0
    }
}

impl Display for Label {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl From<Integer> for Label {
    #[inline]
    fn from(id: Integer) -> Self {
        Label(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::*;

    fn value(toks: &[Token]) -> Integer {
        decode_operand(toks).unwrap().value
    }

    #[test]
    fn decode_signs() {
        assert_eq!(Integer::from(5), value(&[S, T, S, T, L]));
        assert_eq!(Integer::from(-5), value(&[T, T, S, T, L]));
        assert_eq!(Integer::from(1), value(&[S, S, S, T, L]));
    }

    #[test]
    fn decode_empty() {
        assert_eq!(Operand { value: Integer::ZERO, len: 1 }, decode_operand(&[L]).unwrap());
        assert_eq!(Operand { value: Integer::ZERO, len: 2 }, decode_operand(&[S, L]).unwrap());
        assert_eq!(Operand { value: Integer::ZERO, len: 2 }, decode_operand(&[T, L]).unwrap());
    }

    #[test]
    fn decode_len_stops_at_first_lf() {
        let op = decode_operand(&[S, T, T, L, S, S, L]).unwrap();
        assert_eq!(Integer::from(3), op.value);
        assert_eq!(4, op.len);
    }

    #[test]
    fn decode_unterminated() {
        assert_eq!(Err(Unterminated), decode_operand(&[]));
        assert_eq!(Err(Unterminated), decode_operand(&[S, T, T]));
    }

    #[test]
    fn decode_wide() {
        // 1 followed by 99 zeros is 2^99, which spans multiple words.
        let mut toks = vec![T, T];
        toks.extend([S; 99]);
        toks.push(L);
        assert_eq!(-Integer::from(Integer::from(1) << 99), value(&toks));
    }

    #[test]
    fn round_trip() {
        let mut values = vec![
            Integer::ZERO,
            Integer::from(1),
            Integer::from(-1),
            Integer::from(72),
            Integer::from(i64::MAX),
            Integer::from(i64::MIN),
            Integer::from(u64::MAX),
            Integer::from(1) << 200,
        ];
        values.push(-values.last().unwrap().clone());
        for n in values {
            let mut toks = Vec::new();
            encode_operand(&n, &mut toks);
            let op = decode_operand(&toks).unwrap();
            assert_eq!(n, op.value, "{toks:?}");
            assert_eq!(toks.len(), op.len);
        }
    }

    #[test]
    fn encode_canonical() {
        let mut toks = Vec::new();
        encode_operand(&Integer::ZERO, &mut toks);
        assert_eq!(vec![S, L], toks);
        toks.clear();
        encode_operand(&Integer::from(-6), &mut toks);
        assert_eq!(vec![T, T, T, S, L], toks);
    }
}
