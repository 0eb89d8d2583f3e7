use std::io::{BufRead, Write};

use rug::ops::{DivRounding, RemRounding};
use rug::Integer;
use smallvec::SmallVec;
use tracing::debug;
use wspace_syntax::{Decoded, Decoder, Inst, Label, LabelTable, Stream};

use crate::{
    error::{Error, Fault},
    io::Io,
    vm::{Heap, Stack},
};

#[derive(Debug)]
pub struct Vm<'a, I, O: Write + ?Sized> {
    stream: Stream,
    decoder: Decoder,
    labels: LabelTable,
    stack: Stack,
    heap: Heap,
    pc: usize,
    call_stack: SmallVec<[usize; 16]>,
    io: Io<'a, I, O>,
    state: State,
}

/// How a program stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Halt {
    /// `end` was executed.
    Exit,
    /// Execution ran off the end of the token stream.
    EndOfProgram,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum State {
    Running,
    Halted(Halt),
    Faulted(Error),
}

impl<'a, I: BufRead, O: Write + ?Sized> Vm<'a, I, O> {
    /// Loads a program, resolving the definitions of all labels.
    pub fn new(stream: Stream, stdin: I, stdout: &'a mut O) -> Result<Self, Error> {
        let decoder = Decoder::new();
        let labels = LabelTable::scan(&stream, &decoder)?;
        debug!(labels = labels.len(), tokens = stream.len(), "loaded program");
        Ok(Vm {
            stream,
            decoder,
            labels,
            stack: Stack::new(),
            heap: Heap::new(),
            pc: 0,
            call_stack: SmallVec::new(),
            io: Io::new(stdin, stdout),
            state: State::Running,
        })
    }

    #[inline]
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    #[inline]
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Token offset of the next instruction.
    #[inline]
    pub fn pc(&self) -> usize {
        self.pc
    }

    #[inline]
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    #[inline]
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running)
    }

    /// Runs until the program halts or faults.
    pub fn execute(&mut self) -> Result<Halt, Error> {
        loop {
            if let Some(halt) = self.step()? {
                return Ok(halt);
            }
        }
    }

    /// Executes one instruction and returns how the program halted, if it
    /// did. Stepping a stopped program has no effect and reports how it
    /// stopped again.
    pub fn step(&mut self) -> Result<Option<Halt>, Error> {
        match &self.state {
            State::Running => {}
            State::Halted(halt) => return Ok(Some(*halt)),
            State::Faulted(err) => return Err(err.clone()),
        }
        let pc = self.pc;
        let res = if pc >= self.stream.len() {
            self.halt(Halt::EndOfProgram)
        } else {
            self.exec()
        };
        match res {
            Ok(()) => match self.state {
                State::Halted(halt) => Ok(Some(halt)),
                _ => Ok(None),
            },
            Err(fault) => {
                let err = Error::new(fault, pc);
                self.state = State::Faulted(err.clone());
                // Output written before the fault is kept, even if this flush
                // fails in turn.
                let _ = self.io.flush();
                Err(err)
            }
        }
    }

    fn exec(&mut self) -> Result<(), Fault> {
        let Decoded { inst, len, .. } = self.decoder.decode_at(&self.stream, self.pc)?;
        debug!(pc = self.pc, %inst);
        let opcode = inst.opcode();
        self.stack.require(opcode, opcode.pops())?;
        let mut next = self.pc + len;

        macro_rules! arith(($x:ident, $y:ident => $op:expr) => ({
            let ($x, $y) = self.stack.pop2(opcode)?;
            self.stack.push($op);
        }));
        macro_rules! divmod(($x:ident, $y:ident => $op:expr) => ({
            if self.stack.top(opcode)?.is_zero() {
                return Err(Fault::DivisionByZero);
            }
            arith!($x, $y => $op);
        }));

        match inst {
            Inst::Push(n) => self.stack.push(n),
            Inst::Dup => {
                let top = self.stack.top(opcode)?.clone();
                self.stack.push(top);
            }
            Inst::Copy(n) => {
                let x = self.stack.copy(&n)?;
                self.stack.push(x);
            }
            Inst::Swap => self.stack.swap(opcode)?,
            Inst::Drop => {
                self.stack.pop(opcode)?;
            }
            Inst::Slide(n) => self.stack.slide(&n)?,
            Inst::Add => arith!(x, y => x + y),
            Inst::Sub => arith!(x, y => x - y),
            Inst::Mul => arith!(x, y => x * y),
            Inst::Div => divmod!(x, y => x.div_floor(y)),
            Inst::Mod => divmod!(x, y => x.rem_floor(y)),
            Inst::Store => {
                let (addr, n) = self.stack.pop2(opcode)?;
                self.heap.store(addr, n);
            }
            Inst::Retrieve => {
                let addr = self.stack.pop(opcode)?;
                let n = self.heap.retrieve(&addr);
                self.stack.push(n);
            }
            Inst::Mark(_) => {}
            Inst::Call(l) => {
                let target = self.target(&l)?;
                self.call_stack.push(next);
                next = target;
            }
            Inst::Jmp(l) => next = self.target(&l)?,
            Inst::Jz(l) => {
                if self.stack.pop(opcode)?.is_zero() {
                    next = self.target(&l)?;
                }
            }
            Inst::Jn(l) => {
                if self.stack.pop(opcode)?.is_negative() {
                    next = self.target(&l)?;
                }
            }
            Inst::Ret => {
                next = self
                    .call_stack
                    .pop()
                    .ok_or(Fault::ReturnWithEmptyCallStack)?;
            }
            Inst::End => self.halt(Halt::Exit)?,
            Inst::Printc => {
                let n = self.stack.pop(opcode)?;
                match n.to_u32().and_then(char::from_u32) {
                    Some(ch) => self.io.write_char(ch)?,
                    None => return Err(Fault::InvalidCodepoint(n)),
                }
            }
            Inst::Printi => {
                let n = self.stack.pop(opcode)?;
                self.io.write_integer(&n)?;
            }
            Inst::Readc => {
                let ch = self.io.read_char()?;
                let addr = self.stack.pop(opcode)?;
                self.heap.store(addr, Integer::from(u32::from(ch)));
            }
            Inst::Readi => {
                let n = self.io.read_integer()?;
                let addr = self.stack.pop(opcode)?;
                self.heap.store(addr, n);
            }
        }
        self.pc = next;
        Ok(())
    }

    fn target(&self, l: &Label) -> Result<usize, Fault> {
        self.labels
            .get(l)
            .ok_or_else(|| Fault::UnresolvedLabel(l.clone()))
    }

    fn halt(&mut self, halt: Halt) -> Result<(), Fault> {
        self.state = State::Halted(halt);
        debug!(pc = self.pc, ?halt, "halted");
        self.io.flush()
    }
}
