use std::hash::{Hash, Hasher};
use std::io::{self, ErrorKind};
use std::mem;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rug::Integer;
use thiserror::Error;
use wspace_syntax::{DecodeError, Label, LabelError, Opcode};

/// A fault that stopped a program, with the offset of the instruction that
/// raised it.
#[derive(Clone, Debug, Error, PartialEq, Eq, Hash)]
#[error("{fault} at offset {pc}")]
pub struct Error {
    pub fault: Fault,
    /// Token offset of the faulting instruction.
    pub pc: usize,
}

#[derive(Clone, Debug, Error, PartialEq, Eq, Hash)]
pub enum Fault {
    #[error("malformed operand: missing terminating line feed")]
    MalformedOperand,
    #[error("unknown instruction")]
    UnknownInstruction,
    #[error("stack underflow: {opcode} needs {needed} values, but the stack has {len}")]
    StackUnderflow {
        opcode: Opcode,
        needed: Integer,
        len: usize,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("undefined label {0}")]
    UnresolvedLabel(Label),
    #[error("return with empty call stack")]
    ReturnWithEmptyCallStack,
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("label {0} is already defined")]
    DuplicateLabel(Label),
    #[error("copy at negative index {0}")]
    NegativeOperand(Integer),
    #[error("printc of invalid code point {0}")]
    InvalidCodepoint(Integer),
    #[error("readi of invalid integer {0:?}")]
    InvalidInteger(String),
}

#[derive(Clone, Debug, Error)]
pub enum IoError {
    #[error("read at EOF")]
    Eof,
    #[error("read invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("broken pipe")]
    BrokenPipe,
    #[error("io error: {0}")]
    Other(Rc<io::Error>),
}

/// Error from loading the program file, before anything runs.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("{}: no such file or directory", .0.display())]
    NotFound(PathBuf),
    #[error("{}: permission denied", .0.display())]
    PermissionDenied(PathBuf),
    #[error("{}: is a directory", .0.display())]
    IsADirectory(PathBuf),
    #[error("{}: {1}", .0.display())]
    Other(PathBuf, io::Error),
}

impl Error {
    #[inline]
    pub fn new(fault: Fault, pc: usize) -> Self {
        Error { fault, pc }
    }
}

impl From<LabelError> for Error {
    fn from(err: LabelError) -> Self {
        match err {
            LabelError::Duplicate { label, offset } => {
                Error::new(Fault::DuplicateLabel(label), offset)
            }
        }
    }
}

impl From<DecodeError> for Fault {
    #[inline]
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnknownInstruction | DecodeError::IncompleteInstruction => {
                Fault::UnknownInstruction
            }
            DecodeError::MalformedOperand => Fault::MalformedOperand,
        }
    }
}

impl From<io::Error> for Fault {
    #[inline]
    fn from(err: io::Error) -> Self {
        Fault::Io(err.into())
    }
}

impl From<io::Error> for IoError {
    #[inline]
    fn from(err: io::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidData => IoError::InvalidUtf8,
            ErrorKind::UnexpectedEof => IoError::Eof,
            ErrorKind::BrokenPipe => IoError::BrokenPipe,
            _ => IoError::Other(Rc::new(err)),
        }
    }
}

impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IoError::Other(err1), IoError::Other(err2)) => Rc::ptr_eq(err1, err2),
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Eq for IoError {}

impl Hash for IoError {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        if let IoError::Other(err) = self {
            Rc::as_ptr(err).hash(state);
        }
    }
}

impl UsageError {
    /// Classifies an error from reading the program file at `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_owned();
        match err.kind() {
            ErrorKind::NotFound => UsageError::NotFound(path),
            ErrorKind::PermissionDenied => UsageError::PermissionDenied(path),
            // TODO: Use io::ErrorKind::IsADirectory once the minimum Rust
            // version reaches 1.83.
            _ if path.is_dir() => UsageError::IsADirectory(path),
            _ => UsageError::Other(path, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn display_with_offset() {
        let err = Error::new(Fault::UnresolvedLabel(Label::new(3)), 12);
        assert_eq!("undefined label @3 at offset 12", err.to_string());
        let err = Error::new(
            Fault::StackUnderflow {
                opcode: Opcode::Copy,
                needed: Integer::from(5),
                len: 2,
            },
            0,
        );
        assert_eq!(
            "stack underflow: copy needs 5 values, but the stack has 2 at offset 0",
            err.to_string(),
        );
    }

    #[test]
    fn io_error_kinds() {
        let eof = io::Error::from(ErrorKind::UnexpectedEof);
        assert_eq!(IoError::Eof, IoError::from(eof));
        let utf8 = io::Error::from(ErrorKind::InvalidData);
        assert_eq!(Fault::Io(IoError::InvalidUtf8), Fault::from(utf8));
        let pipe = io::Error::from(ErrorKind::BrokenPipe);
        assert_eq!(IoError::BrokenPipe, IoError::from(pipe));
        let other = IoError::from(io::Error::from(ErrorKind::Interrupted));
        assert_eq!(other, other.clone());
        assert_ne!(other, IoError::from(io::Error::from(ErrorKind::Interrupted)));
    }

    #[test]
    fn usage_errors() {
        let path = Path::new("no/such/program.ws");
        let err = fs::read(path).unwrap_err();
        let err = UsageError::from_io(path, err);
        assert!(matches!(err, UsageError::NotFound(_)), "{err:?}");
        assert_eq!("no/such/program.ws: no such file or directory", err.to_string());

        let dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let err = fs::read(dir).unwrap_err();
        let err = UsageError::from_io(dir, err);
        assert!(matches!(err, UsageError::IsADirectory(_)), "{err:?}");
    }
}
