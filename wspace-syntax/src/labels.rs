use hashbrown::HashMap;
use thiserror::Error;

use crate::{Decoder, Inst, Label, Stream};

/// Jump targets for every label defined in a program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelTable {
    targets: HashMap<Label, usize>,
}

/// Error from resolving label definitions.
#[derive(Clone, Debug, Error, PartialEq, Eq, Hash)]
pub enum LabelError {
    #[error("label {label} is already defined")]
    Duplicate {
        label: Label,
        /// Offset of the second `mark`.
        offset: usize,
    },
}

impl LabelTable {
    #[inline]
    pub fn new() -> Self {
        LabelTable::default()
    }

    /// Scans the stream once for `mark` instructions and records, for each
    /// label, the offset just past its definition.
    ///
    /// The scan advances by whole instructions, so the token pattern of
    /// `mark` within an operand is never taken for a definition. It stops at
    /// the first offset that does not decode; execution reports that error
    /// if it ever reaches there. The first definition of a label wins and a
    /// later one is rejected.
    pub fn scan(stream: &Stream, decoder: &Decoder) -> Result<Self, LabelError> {
        let mut table = LabelTable::new();
        for decoded in decoder.iter(stream) {
            let Ok(decoded) = decoded else {
                break;
            };
            if let Inst::Mark(label) = decoded.inst {
                table.define(label, decoded.offset, decoded.offset + decoded.len)?;
            }
        }
        Ok(table)
    }

    /// Defines `label` to jump to `target`. `offset` is the position of the
    /// definition, for reporting duplicates.
    pub fn define(&mut self, label: Label, offset: usize, target: usize) -> Result<(), LabelError> {
        if self.targets.contains_key(&label) {
            return Err(LabelError::Duplicate { label, offset });
        }
        self.targets.insert(label, target);
        Ok(())
    }

    #[inline]
    pub fn get(&self, label: &Label) -> Option<usize> {
        self.targets.get(label).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
