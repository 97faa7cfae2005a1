//! Log writer for live event capture.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use blinc_platform::NativeEvent;

use crate::error::{ReplayError, Result};
use crate::record::{EventKind, EventRecord, WindowBase};

/// Appends live events to a replay log, one line per event.
///
/// Timestamps are written relative to the first timestamped event of the
/// session, so the first input event of a fresh log is at time 0.
#[derive(Debug)]
pub struct Recorder {
    path: PathBuf,
    out: BufWriter<File>,
    base: WindowBase,
    epoch: Option<u32>,
    written: u64,
}

impl Recorder {
    /// Create (or truncate) a log file.
    pub fn create(path: impl AsRef<Path>, base: WindowBase) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| ReplayError::io(&path, e))?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
            base,
            epoch: None,
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Record a live event.
    ///
    /// Returns `Ok(false)` when the event type is not recordable.
    pub fn record(&mut self, event: &NativeEvent) -> Result<bool> {
        let time = self.relative_time(event);
        let Some(record) = EventRecord::from_native(event, time) else {
            return Ok(false);
        };
        self.write_record(&record)?;
        Ok(true)
    }

    /// Append an already-built record and flush it to disk.
    pub fn write_record(&mut self, record: &EventRecord) -> Result<()> {
        let line = record.to_log_line(self.base);
        writeln!(self.out, "{line}")
            .and_then(|()| self.out.flush())
            .map_err(|e| ReplayError::io(&self.path, e))?;
        self.written += 1;
        tracing::trace!("recorded {}", line);
        Ok(())
    }

    /// Flush and close the log.
    pub fn finish(mut self) -> Result<()> {
        self.out
            .flush()
            .map_err(|e| ReplayError::io(&self.path, e))
    }

    fn relative_time(&mut self, event: &NativeEvent) -> u32 {
        let timestamped =
            EventKind::from_event_type(event.event_type).is_some_and(EventKind::is_replayable);
        if !timestamped {
            return 0;
        }
        let epoch = *self.epoch.get_or_insert(event.time);
        event.time.wrapping_sub(epoch)
    }
}
