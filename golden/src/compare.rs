//! Incremental silver-vs-golden stream comparison.
//!
//! [`GoldenComparator`] is a [`Write`] sink. Every write is mirrored to the
//! real silver destination while the same number of bytes is pulled from the
//! golden source and compared. The first divergence is rendered as a short
//! context diff and handed to a [`FailureReporter`].

use std::fmt;
use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

use crate::context::{context_lines, ContextLimits};
use crate::error::{GoldenError, Result};
use crate::render::render;
use crate::report::{FailureReporter, PanicReporter};

pub const DEFAULT_LOOKAHEAD_BYTES: usize = 50;
pub const DEFAULT_CLOSE_PROBE_BYTES: usize = 200;

/// How silver and golden came apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceKind {
    /// Both sides have a byte at the offset and they differ.
    Mismatch,
    /// Silver kept writing after golden ran out.
    GoldenExhausted,
    /// Golden still had bytes when silver was closed.
    SilverExhausted,
}

impl fmt::Display for DivergenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DivergenceKind::Mismatch => write!(f, "content mismatch"),
            DivergenceKind::GoldenExhausted => write!(f, "golden ended before silver"),
            DivergenceKind::SilverExhausted => write!(f, "silver ended before golden"),
        }
    }
}

/// The first point where silver and golden differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Divergence {
    pub kind: DivergenceKind,
    /// 1-based byte offset of the divergence.
    pub offset: usize,
    /// Rendered context diff (`= `, `< `, `> ` lines).
    pub diff: String,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "golden mismatch at byte {} ({}):", self.offset, self.kind)?;
        write!(f, "{}", self.diff)
    }
}

/// Tunables for a comparator. Defaults match the usual test setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
    pub context: ContextLimits,
    /// Golden bytes read past a content mismatch, for context only.
    pub lookahead_bytes: usize,
    /// Golden bytes probed at close to detect a short silver stream.
    pub close_probe_bytes: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            context: ContextLimits::default(),
            lookahead_bytes: DEFAULT_LOOKAHEAD_BYTES,
            close_probe_bytes: DEFAULT_CLOSE_PROBE_BYTES,
        }
    }
}

/// A silver sink that checks every byte against a golden source.
///
/// Call [`close`](Self::close) once all output is written; only then can a
/// silver stream that stopped short of the golden one be detected.
///
/// After the first divergence the comparator stops comparing and forwards
/// later writes straight to the silver sink, so the recorded silver output
/// stays complete and can be promoted to the new golden file.
pub struct GoldenComparator<R, W, F = PanicReporter> {
    golden: R,
    silver: W,
    reporter: F,
    options: CompareOptions,
    /// Bytes consumed from golden so far.
    pos: usize,
    golden_seen: Vec<u8>,
    silver_seen: Vec<u8>,
    divergence: Option<Divergence>,
    closed: bool,
}

impl<R: Read, W: Write> GoldenComparator<R, W, PanicReporter> {
    /// Create a comparator that panics on the first divergence.
    pub fn new(golden: R, silver: W) -> Self {
        Self::with_reporter(golden, silver, PanicReporter)
    }
}

impl<R: Read, W: Write, F: FailureReporter> GoldenComparator<R, W, F> {
    pub fn with_reporter(golden: R, silver: W, reporter: F) -> Self {
        Self {
            golden,
            silver,
            reporter,
            options: CompareOptions::default(),
            pos: 0,
            golden_seen: Vec::new(),
            silver_seen: Vec::new(),
            divergence: None,
            closed: false,
        }
    }

    pub fn with_options(mut self, options: CompareOptions) -> Self {
        self.options = options;
        self
    }

    /// Number of golden bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn divergence(&self) -> Option<&Divergence> {
        self.divergence.as_ref()
    }

    pub fn has_diverged(&self) -> bool {
        self.divergence.is_some()
    }

    pub fn reporter(&self) -> &F {
        &self.reporter
    }

    /// Give back the silver sink. Does not close the comparator.
    pub fn into_inner(self) -> W {
        self.silver
    }

    pub fn into_parts(self) -> (W, F) {
        (self.silver, self.reporter)
    }

    /// Write a single silver byte.
    pub fn write_byte(&mut self, b: u8) -> Result<()> {
        self.ensure_open()?;
        if self.divergence.is_some() {
            return self.pass_through(&[b]);
        }

        let mut golden = [0u8; 1];
        let got = read_full(&mut self.golden, &mut golden)?;
        self.silver_seen.push(b);
        self.silver.write_all(&[b])?;

        if got == 0 {
            return self.handle_diff(DivergenceKind::GoldenExhausted, self.pos + 1);
        }

        self.golden_seen.push(golden[0]);
        self.pos += 1;
        if golden[0] != b {
            self.read_lookahead();
            return self.handle_diff(DivergenceKind::Mismatch, self.pos);
        }
        Ok(())
    }

    /// Write a block of silver bytes.
    ///
    /// If golden runs out partway through the block, the divergence is
    /// reported at the first byte of the block rather than where golden
    /// actually ended.
    pub fn write_block(&mut self, block: &[u8]) -> Result<()> {
        self.ensure_open()?;
        if self.divergence.is_some() {
            return self.pass_through(block);
        }
        if block.is_empty() {
            return Ok(());
        }

        let start = self.pos;
        let mut golden = vec![0u8; block.len()];
        let got = read_full(&mut self.golden, &mut golden)?;
        golden.truncate(got);

        self.golden_seen.extend_from_slice(&golden);
        self.silver_seen.extend_from_slice(block);
        self.pos += got;
        self.silver.write_all(block)?;

        if got < block.len() {
            return self.handle_diff(DivergenceKind::GoldenExhausted, start + 1);
        }

        if let Some(d) = first_diff_index(&golden, block) {
            self.read_lookahead();
            return self.handle_diff(DivergenceKind::Mismatch, start + d + 1);
        }
        Ok(())
    }

    /// Finish the silver stream.
    ///
    /// Probes golden for leftover bytes; any found mean silver stopped short.
    /// A read error during the probe is logged and ignored. Flushes the
    /// silver sink. Calling `close` again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if self.divergence.is_none() {
            let mut probe = Vec::new();
            let limit = self.options.close_probe_bytes as u64;
            match self.golden.by_ref().take(limit).read_to_end(&mut probe) {
                Ok(0) => log::debug!("Silver matched golden ({} bytes)", self.pos),
                Ok(_) => {
                    self.golden_seen.extend_from_slice(&probe);
                    self.handle_diff(DivergenceKind::SilverExhausted, self.pos + 1)?;
                }
                Err(e) => log::warn!("Ignoring golden read error at close: {}", e),
            }
        }

        self.silver.flush()?;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(GoldenError::Closed);
        }
        Ok(())
    }

    fn pass_through(&mut self, bytes: &[u8]) -> Result<()> {
        self.silver.write_all(bytes)?;
        Ok(())
    }

    /// Pull a little more golden so the report shows what was expected next.
    /// Silver is never read ahead: it is still being produced.
    fn read_lookahead(&mut self) {
        let limit = self.options.lookahead_bytes as u64;
        // Bytes read before an error are kept.
        if let Err(e) = self.golden.by_ref().take(limit).read_to_end(&mut self.golden_seen) {
            log::warn!("Ignoring golden read error while gathering context: {}", e);
        }
    }

    fn handle_diff(&mut self, kind: DivergenceKind, offset: usize) -> Result<()> {
        let anchor = offset.saturating_sub(1);
        let golden = context_lines(&self.golden_seen, anchor, self.options.context);
        let silver = context_lines(&self.silver_seen, anchor, self.options.context);
        let divergence = Divergence {
            kind,
            offset,
            diff: render(&golden, &silver),
        };
        log::debug!("Divergence at byte {}: {}", offset, kind);

        // Silver must be on disk before a reporter that aborts the test runs.
        if let Err(e) = self.silver.flush() {
            log::warn!("Failed to flush silver output: {}", e);
        }

        let divergence = self.divergence.insert(divergence);
        self.reporter.report(divergence);
        Ok(())
    }
}

impl<R: Read, W: Write, F: FailureReporter> Write for GoldenComparator<R, W, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match buf {
            [b] => self.write_byte(*b)?,
            _ => self.write_block(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.silver.flush()
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn first_diff_index(golden: &[u8], silver: &[u8]) -> Option<usize> {
    golden
        .iter()
        .zip(silver)
        .position(|(g, s)| g != s)
        .or_else(|| (golden.len() != silver.len()).then(|| golden.len().min(silver.len())))
}
