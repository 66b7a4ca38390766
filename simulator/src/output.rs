//! Writes simulated traces as CSV.
use crate::simulation::Trace;
use std::io::{self, Write};
use tracing::instrument;

/// Writes a `time,flux` header followed by one line per sample.
#[instrument(skip_all, level = "debug", fields(num_samples = trace.flux.len()))]
pub(crate) fn write_trace<W: Write>(mut writer: W, trace: &Trace) -> io::Result<()> {
    writeln!(writer, "time,flux")?;
    for (time, flux) in trace.times.iter().zip(&trace.flux) {
        writeln!(writer, "{time},{flux}")?;
    }
    writer.flush()
}
