//! Event journal
//!
//! Appends every telemetry alert and mission event to a JSON-lines file by
//! registering as an observer on both streams.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

use crate::kernel::VehicleKernel;

type Sink = Arc<Mutex<BufWriter<File>>>;

#[derive(Serialize)]
struct JournalLine<'a, T> {
    stream: &'a str,
    record: &'a T,
}

/// Open `path` for appending and subscribe it to the kernel's alert and event streams
pub fn attach(kernel: &mut VehicleKernel, path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening event journal {}", path.display()))?;
    let sink: Sink = Arc::new(Mutex::new(BufWriter::new(file)));

    let alerts = Arc::clone(&sink);
    kernel
        .monitor_mut()
        .on_alert(move |alert| append(&alerts, "alert", alert));
    kernel
        .missions_mut()
        .on_event(move |event| append(&sink, "mission", event));
    Ok(())
}

fn append<T: Serialize>(sink: &Sink, stream: &str, record: &T) {
    let line = match serde_json::to_string(&JournalLine { stream, record }) {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, stream, "Journal record not serializable");
            return;
        }
    };

    let Ok(mut out) = sink.lock() else {
        warn!("Journal writer poisoned");
        return;
    };
    if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
        warn!(error = %e, "Journal write failed");
    }
}
