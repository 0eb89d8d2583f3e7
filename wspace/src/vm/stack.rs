use rug::Integer;
use wspace_syntax::Opcode;

use crate::error::Fault;

/// Operand stack of arbitrary-precision integers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack {
    values: Vec<Integer>,
}

impl Stack {
    #[inline]
    pub fn new() -> Self {
        Stack::default()
    }

    /// Values from bottom to top.
    #[inline]
    pub fn values(&self) -> &[Integer] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn push(&mut self, n: Integer) {
        self.values.push(n);
    }

    /// Checks that `opcode` can pop `needed` values, before it has any effect.
    #[inline]
    pub fn require(&self, opcode: Opcode, needed: usize) -> Result<(), Fault> {
        if self.len() < needed {
            return Err(self.underflow(opcode, Integer::from(needed)));
        }
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self, opcode: Opcode) -> Result<Integer, Fault> {
        match self.values.pop() {
            Some(n) => Ok(n),
            None => Err(self.underflow(opcode, Integer::from(1))),
        }
    }

    /// Pops the right operand, then the left, and returns them in source
    /// order.
    #[inline]
    pub fn pop2(&mut self, opcode: Opcode) -> Result<(Integer, Integer), Fault> {
        self.require(opcode, 2)?;
        let y = self.pop(opcode)?;
        let x = self.pop(opcode)?;
        Ok((x, y))
    }

    #[inline]
    pub fn top(&self, opcode: Opcode) -> Result<&Integer, Fault> {
        self.values
            .last()
            .ok_or_else(|| self.underflow(opcode, Integer::from(1)))
    }

    #[inline]
    pub fn swap(&mut self, opcode: Opcode) -> Result<(), Fault> {
        self.require(opcode, 2)?;
        let len = self.len();
        self.values.swap(len - 1, len - 2);
        Ok(())
    }

    /// Returns the value `n` below the top, where 0 is the top.
    pub fn copy(&self, n: &Integer) -> Result<Integer, Fault> {
        if n.is_negative() {
            return Err(Fault::NegativeOperand(n.clone()));
        }
        match n.to_usize() {
            Some(n) if n < self.len() => Ok(self.values[self.len() - 1 - n].clone()),
            _ => Err(self.underflow(Opcode::Copy, n.clone() + 1)),
        }
    }

    /// Pops the top, discards `n` values below it, and pushes the top back.
    /// A negative count discards nothing.
    pub fn slide(&mut self, n: &Integer) -> Result<(), Fault> {
        let n = if n.is_negative() {
            0
        } else {
            match n.to_usize() {
                Some(n) if n < self.len() => n,
                _ => return Err(self.underflow(Opcode::Slide, n.clone() + 1)),
            }
        };
        let top = self.pop(Opcode::Slide)?;
        self.values.truncate(self.len() - n);
        self.values.push(top);
        Ok(())
    }

    fn underflow(&self, opcode: Opcode, needed: Integer) -> Fault {
        Fault::StackUnderflow {
            opcode,
            needed,
            len: self.len(),
        }
    }
}
