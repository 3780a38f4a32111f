use std::{
    fs::File,
    io::{self, BufRead, BufReader, Lines},
    path::Path,
};

use thiserror::Error;
use vm_manager::{AccessType, VirtAddr};

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("cannot read trace: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub access: AccessType,
    pub vaddr: VirtAddr,
}

/// Parses one trace line. Accepts both `S 0x7ff000398` and valgrind
/// lackey's ` S 7ff000398,8`. Blank lines and lines starting with `=` or
/// `#` carry no record.
pub fn parse_line(line: &str) -> Result<Option<TraceRecord>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('=') || line.starts_with('#') {
        return Ok(None);
    }
    let mut chars = line.chars();
    let kind = chars.next().ok_or("empty record")?;
    let access =
        AccessType::from_char(kind).ok_or_else(|| format!("unknown access type `{}`", kind))?;

    let rest = chars.as_str().trim();
    let addr = rest.split(',').next().unwrap_or("").trim();
    let digits = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr);
    if digits.is_empty() {
        return Err("missing address".to_string());
    }
    let vaddr = u64::from_str_radix(digits, 16)
        .map_err(|e| format!("bad address `{}`: {}", addr, e))?;
    Ok(Some(TraceRecord {
        access,
        vaddr: VirtAddr(vaddr),
    }))
}

/// Lazily yields the records of a trace, one line at a time.
pub struct TraceReader<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl TraceReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TraceError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            match parse_line(&line) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(reason) => {
                    return Some(Err(TraceError::Malformed {
                        line: self.line,
                        reason,
                    }))
                }
            }
        }
    }
}
