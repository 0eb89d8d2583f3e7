use crate::{Opcode, Token};

/// Decision trie over the token alphabet, that maps prefix codes to opcodes.
///
/// Each node has one edge per token. A lookup walks at most as many nodes as
/// the longest prefix code, instead of comparing against every prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixTrie {
    nodes: Vec<[Edge; 3]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edge {
    None,
    Node(u16),
    Leaf(Opcode),
}

/// Result of matching tokens against a [`PrefixTrie`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Match {
    /// A prefix code matched, with its length.
    Opcode(Opcode, usize),
    /// The tokens follow no prefix code.
    Invalid,
    /// The tokens are a proper prefix of some code, but end too early.
    Incomplete,
}

impl PrefixTrie {
    /// Builds the trie for every Whitespace instruction, in the order of
    /// [`Opcode::ALL`].
    pub fn new() -> Self {
        let mut trie = PrefixTrie {
            nodes: vec![[Edge::None; 3]],
        };
        for opcode in Opcode::ALL {
            trie.insert(opcode.prefix(), opcode);
        }
        trie
    }

    /// Inserts a prefix code. Panics if it overlaps with a code that has
    /// already been inserted.
    fn insert(&mut self, prefix: &[Token], opcode: Opcode) {
        let (&last, init) = prefix.split_last().expect("empty prefix code");
        let mut node = 0;
        for &tok in init {
            node = match self.nodes[node][tok.index()] {
                Edge::None => {
                    let next = self.nodes.len();
                    self.nodes.push([Edge::None; 3]);
                    self.nodes[node][tok.index()] = Edge::Node(next as u16);
                    next
                }
                Edge::Node(next) => next as usize,
                Edge::Leaf(other) => panic!("prefix code for {other} is a prefix of {opcode}"),
            };
        }
        let edge = &mut self.nodes[node][last.index()];
        assert!(
            *edge == Edge::None,
            "prefix code for {opcode} overlaps another code",
        );
        *edge = Edge::Leaf(opcode);
    }

    /// Matches the start of `toks` against the prefix codes.
    pub fn lookup(&self, toks: &[Token]) -> Match {
        let mut node = 0;
        for (i, &tok) in toks.iter().enumerate() {
            match self.nodes[node][tok.index()] {
                Edge::None => return Match::Invalid,
                Edge::Node(next) => node = next as usize,
                Edge::Leaf(opcode) => return Match::Opcode(opcode, i + 1),
            }
        }
        Match::Incomplete
    }
}

impl Default for PrefixTrie {
    #[inline]
    fn default() -> Self {
        PrefixTrie::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::*;

    #[test]
    fn every_prefix_matches_itself() {
        let trie = PrefixTrie::new();
        for opcode in Opcode::ALL {
            let prefix = opcode.prefix();
            assert_eq!(Match::Opcode(opcode, prefix.len()), trie.lookup(prefix));
            // Trailing tokens are left for the operand or the next instruction.
            let mut longer = prefix.to_vec();
            longer.extend([L, S, T]);
            assert_eq!(Match::Opcode(opcode, prefix.len()), trie.lookup(&longer));
        }
    }

    #[test]
    fn first_match_agrees_with_linear_scan() {
        // Check every token sequence up to length 4 against a brute-force
        // comparison with each prefix code in table order.
        let trie = PrefixTrie::new();
        let mut seqs: Vec<Vec<Token>> = vec![vec![]];
        for _ in 0..4 {
            let mut next = Vec::new();
            for seq in &seqs {
                for tok in Token::ALL {
                    let mut seq = seq.clone();
                    seq.push(tok);
                    next.push(seq);
                }
            }
            for seq in &next {
                let linear = Opcode::ALL
                    .into_iter()
                    .find(|opcode| seq.starts_with(opcode.prefix()));
                match trie.lookup(seq) {
                    Match::Opcode(opcode, len) => {
                        assert_eq!(Some(opcode), linear, "{seq:?}");
                        assert_eq!(opcode.prefix().len(), len);
                    }
                    _ => assert_eq!(None, linear, "{seq:?}"),
                }
            }
            seqs = next;
        }
    }

    #[test]
    fn invalid_and_incomplete() {
        let trie = PrefixTrie::new();
        assert_eq!(Match::Incomplete, trie.lookup(&[]));
        assert_eq!(Match::Incomplete, trie.lookup(&[T, S]));
        assert_eq!(Match::Invalid, trie.lookup(&[S, T, T]));
        assert_eq!(Match::Invalid, trie.lookup(&[T, S, L]));
        assert_eq!(Match::Invalid, trie.lookup(&[T, L, L]));
        assert_eq!(Match::Invalid, trie.lookup(&[L, L, S]));
    }
}
