//! Per-iteration stats CSV writer (spec §6): one row per LNS iteration,
//! header `iteration,solution_cost,failed_iterations,runtime`.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use tracing::error;

use crate::lns::StatsRow;

/// Writes `rows` to `path` as a CSV with the header spec §6 requires.
/// Runtime is reported in fractional seconds, matching the original
/// implementation's `time.time() - start_time` convention.
pub fn write_stats(path: impl AsRef<Path>, rows: &[StatsRow]) -> io::Result<()> {
    let mut file = File::create(path.as_ref())?;
    writeln!(file, "iteration,solution_cost,failed_iterations,runtime")?;
    for row in rows {
        if let Err(e) = writeln!(
            file,
            "{},{},{},{:.3}",
            row.iteration,
            row.solution_cost,
            row.failed_iterations,
            row.runtime.as_secs_f64()
        ) {
            error!("failed to write stats row {}: {e}", row.iteration);
            return Err(e);
        }
    }
    Ok(())
}
