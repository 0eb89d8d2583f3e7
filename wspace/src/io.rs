use std::cell::{Ref, RefCell};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use rug::Integer;
use utf8_chars::BufReadCharsExt;

use crate::error::{Fault, IoError};

/// Character and integer I/O for a running program.
///
/// Output is buffered and flushed before every read, so that a prompt is
/// visible before the program blocks on its response.
#[derive(Debug)]
pub struct Io<'a, I, O: Write + ?Sized> {
    stdin: I,
    stdout: BufWriter<&'a mut O>,
}

impl<'a, I: BufRead, O: Write + ?Sized> Io<'a, I, O> {
    #[inline]
    pub fn new(stdin: I, stdout: &'a mut O) -> Self {
        Io {
            stdin,
            stdout: BufWriter::with_capacity(8192, stdout),
        }
    }

    /// Reads one UTF-8 encoded character.
    pub fn read_char(&mut self) -> Result<char, Fault> {
        self.flush()?;
        self.stdin.read_char()?.ok_or(Fault::Io(IoError::Eof))
    }

    /// Reads a decimal integer with an optional sign. Leading whitespace is
    /// skipped and the whitespace character that ends the number is consumed.
    pub fn read_integer(&mut self) -> Result<Integer, Fault> {
        self.flush()?;
        let mut text = String::new();
        loop {
            match self.stdin.read_char()? {
                Some(ch) if ch.is_whitespace() => {
                    if !text.is_empty() {
                        break;
                    }
                }
                Some(ch) => text.push(ch),
                None if text.is_empty() => return Err(IoError::Eof.into()),
                None => break,
            }
        }
        parse_integer(&text)
    }

    #[inline]
    pub fn write_char(&mut self, ch: char) -> Result<(), Fault> {
        write!(self.stdout, "{ch}")?;
        Ok(())
    }

    #[inline]
    pub fn write_integer(&mut self, n: &Integer) -> Result<(), Fault> {
        write!(self.stdout, "{n}")?;
        Ok(())
    }

    #[inline]
    pub fn flush(&mut self) -> Result<(), Fault> {
        self.stdout.flush()?;
        Ok(())
    }
}

fn parse_integer(text: &str) -> Result<Integer, Fault> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Fault::InvalidInteger(text.to_owned()));
    }
    Integer::from_str_radix(text, 10).map_err(|_| Fault::InvalidInteger(text.to_owned()))
}

/// Records the order of reads, writes, and flushes made through its stdin
/// and stdout handles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Recorder {
    effects: RefCell<Vec<Effect>>,
}

#[derive(Debug)]
pub struct StdinRecorder<'a, R> {
    rec: &'a Recorder,
    inner: BufReader<R>,
}

#[derive(Debug)]
pub struct StdoutRecorder<'a> {
    rec: &'a Recorder,
}

/// An observed I/O effect. Adjacent reads and adjacent writes are merged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Read(Vec<u8>),
    Write(Vec<u8>),
    Flush,
}

impl Recorder {
    #[inline]
    pub fn new() -> Self {
        Recorder::default()
    }

    #[inline]
    pub fn stdin<R: Read>(&self, r: R) -> StdinRecorder<'_, R> {
        StdinRecorder {
            rec: self,
            inner: BufReader::new(r),
        }
    }

    #[inline]
    pub fn stdout(&self) -> StdoutRecorder<'_> {
        StdoutRecorder { rec: self }
    }

    #[inline]
    pub fn effects(&self) -> Ref<'_, Vec<Effect>> {
        self.effects.borrow()
    }

    fn record(&self, effect: Effect) {
        let mut effects = self.effects.borrow_mut();
        if let Some(last) = effects.last_mut() {
            match (last, &effect) {
                (Effect::Read(prev), Effect::Read(buf))
                | (Effect::Write(prev), Effect::Write(buf)) => {
                    prev.extend_from_slice(buf);
                    return;
                }
                _ => {}
            }
        }
        effects.push(effect);
    }
}

impl<R: Read> Read for StdinRecorder<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n != 0 {
            self.rec.record(Effect::Read(buf[..n].to_owned()));
        }
        Ok(n)
    }
}

impl<R: Read> BufRead for StdinRecorder<'_, R> {
    #[inline]
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, n: usize) {
        if n != 0 {
            self.rec
                .record(Effect::Read(self.inner.buffer()[..n].to_owned()));
        }
        self.inner.consume(n);
    }
}

impl Write for StdoutRecorder<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !buf.is_empty() {
            self.rec.record(Effect::Write(buf.to_owned()));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.rec.record(Effect::Flush);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_integers(input: &str) -> Vec<Result<Integer, Fault>> {
        let mut stdout = Vec::new();
        let mut io = Io::new(input.as_bytes(), &mut stdout);
        let mut results = Vec::new();
        loop {
            let res = io.read_integer();
            let done = res.is_err();
            results.push(res);
            if done {
                return results;
            }
        }
    }

    #[test]
    fn read_integer_tokens() {
        assert_eq!(
            vec![
                Ok(Integer::from(42)),
                Ok(Integer::from(-7)),
                Ok(Integer::from(5)),
                Ok(Integer::from(100)),
                Err(Fault::Io(IoError::Eof)),
            ],
            read_integers("  42\n-7\t+5 100"),
        );
    }

    #[test]
    fn read_integer_invalid() {
        assert_eq!(
            vec![
                Ok(Integer::from(1)),
                Err(Fault::InvalidInteger("x2".to_owned())),
            ],
            read_integers("1 x2 3"),
        );
        assert_eq!(vec![Err(Fault::InvalidInteger("-".to_owned()))], read_integers("-\n"));
        assert_eq!(vec![Err(Fault::Io(IoError::Eof))], read_integers(" \n "));
    }

    #[test]
    fn read_integer_wide() {
        let mut stdout = Vec::new();
        let mut io = Io::new(&b"-123456789012345678901234567890\n"[..], &mut stdout);
        let n = io.read_integer().unwrap();
        assert_eq!("-123456789012345678901234567890", n.to_string());
    }

    #[test]
    fn read_char_utf8() {
        let mut stdout = Vec::new();
        let mut io = Io::new("aé😀".as_bytes(), &mut stdout);
        assert_eq!(Ok('a'), io.read_char());
        assert_eq!(Ok('é'), io.read_char());
        assert_eq!(Ok('😀'), io.read_char());
        assert_eq!(Err(Fault::Io(IoError::Eof)), io.read_char());

        let mut stdout = Vec::new();
        let mut io = Io::new(&b"\xff"[..], &mut stdout);
        assert_eq!(Err(Fault::Io(IoError::InvalidUtf8)), io.read_char());
    }

    #[test]
    fn flush_before_read() {
        let rec = Recorder::new();
        let mut stdin = rec.stdin(&b"7\n"[..]);
        let mut stdout = rec.stdout();
        let mut io = Io::new(&mut stdin, &mut stdout);
        io.write_char('?').unwrap();
        io.write_char(' ').unwrap();
        assert!(rec.effects().is_empty());
        assert_eq!(Ok(Integer::from(7)), io.read_integer());
        io.write_integer(&Integer::from(49)).unwrap();
        io.flush().unwrap();
        drop(io);
        assert_eq!(
            vec![
                Effect::Write(b"? ".to_vec()),
                Effect::Flush,
                Effect::Read(b"7\n".to_vec()),
                Effect::Write(b"49".to_vec()),
                Effect::Flush,
            ],
            *rec.effects(),
        );
    }
}
