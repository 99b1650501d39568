//! Report Sinks
//!
//! # Design
//!
//! The orchestrator formats a run's report into a `String` first, then calls
//! `write_all(bytes)`, which takes a lock only for the actual I/O. Formatting
//! never happens under the lock.
//!
//! # Correctness Guarantees
//!
//! - **Serialized batches**: each `write_all` acquires a mutex, so two
//!   reports cannot interleave at the byte level.
//! - **Flush semantics**: `flush()` pushes buffered data to the OS at the
//!   moment of the call; the orchestrator flushes once after both runs.
//! - **External interleaving**: other code writing to stdout directly (e.g.
//!   `println!`) goes through stdout's own lock and can interleave with sink
//!   output at batch granularity.

use std::io::{self, BufWriter, ErrorKind, Write};
use std::sync::Mutex;

/// Buffer size for the stdout sink.
///
/// Reports are a handful of short lines; 4 KiB holds an entire demo's output
/// so the terminal sees at most one write per flush.
const BUF_CAPACITY: usize = 4 * 1024;

// ============================================================================
// Trait
// ============================================================================

/// Destination for run reports.
///
/// # Panic Policy
///
/// Implementations panic on I/O errors (fail-fast), except `BrokenPipe` on
/// stdout which is silently ignored (standard behavior for `race-lab | head`).
pub trait ReportSink: Send + Sync {
    /// Write one batch of report bytes. Batches never interleave.
    fn write_all(&self, bytes: &[u8]);

    /// Flush buffered data to the OS. Call after runs have completed.
    fn flush(&self);
}

// ============================================================================
// StdoutSink
// ============================================================================

/// Buffered stdout sink.
pub struct StdoutSink {
    out: Mutex<BufWriter<io::Stdout>>,
}

impl StdoutSink {
    /// New stdout sink with the default buffer.
    pub fn new() -> Self {
        Self {
            out: Mutex::new(BufWriter::with_capacity(BUF_CAPACITY, io::stdout())),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for StdoutSink {
    fn write_all(&self, bytes: &[u8]) {
        let mut out = self.out.lock().expect("stdout sink mutex poisoned");
        if let Err(e) = out.write_all(bytes) {
            if e.kind() == ErrorKind::BrokenPipe {
                // Reader went away; standard CLI behavior is to go quiet.
                return;
            }
            panic!("stdout write failed: {}", e);
        }
    }

    fn flush(&self) {
        let mut out = self.out.lock().expect("stdout sink mutex poisoned");
        if let Err(e) = out.flush() {
            if e.kind() == ErrorKind::BrokenPipe {
                return;
            }
            panic!("stdout flush failed: {}", e);
        }
    }
}

// ============================================================================
// VecSink (for testing)
// ============================================================================

/// Test sink: captures all bytes in memory. Use `take()` to extract them.
pub struct VecSink {
    buf: Mutex<Vec<u8>>,
}

impl VecSink {
    /// New empty test sink.
    pub fn new() -> Self {
        Self {
            buf: Mutex::new(Vec::new()),
        }
    }

    /// Extract everything captured so far, leaving the sink empty.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.buf.lock().expect("vec sink mutex poisoned"))
    }
}

impl Default for VecSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for VecSink {
    fn write_all(&self, bytes: &[u8]) {
        self.buf
            .lock()
            .expect("vec sink mutex poisoned")
            .extend_from_slice(bytes);
    }

    fn flush(&self) {}
}
