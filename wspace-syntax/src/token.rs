/// Whitespace token.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
    /// Space
    S,
    /// Tab
    T,
    /// Line feed
    L,
}

impl Token {
    /// Every token, ordered by [`Token::index`].
    pub const ALL: [Token; 3] = [Token::S, Token::T, Token::L];

    /// Recognizes a significant source byte. All other bytes are comments.
    #[inline]
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            b' ' => Some(Token::S),
            b'\t' => Some(Token::T),
            b'\n' => Some(Token::L),
            _ => None,
        }
    }

    #[inline]
    pub const fn to_byte(self) -> u8 {
        match self {
            Token::S => b' ',
            Token::T => b'\t',
            Token::L => b'\n',
        }
    }

    /// Dense index of this token, for tables over the alphabet.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_mapping() {
        for tok in Token::ALL {
            assert_eq!(Some(tok), Token::from_byte(tok.to_byte()));
        }
        assert_eq!(None, Token::from_byte(b'\r'));
        assert_eq!(None, Token::from_byte(b'x'));
        assert_eq!([0, 1, 2], Token::ALL.map(Token::index));
    }
}
