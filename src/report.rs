//! Rendering an [`Estimate`] for the terminal or for other programs.

use crate::coordinator::Estimate;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

/// Plain-text report, one fact per line.
pub fn write_text<W: Write>(out: &mut W, estimate: &Estimate, elapsed: Duration) -> io::Result<()> {
    writeln!(out, "Number of trials: {}", estimate.total_trials)?;
    writeln!(out, "Number of threads: {}", estimate.effective_workers)?;
    writeln!(out, "Estimation of pi is {:.10}", estimate.pi)?;
    writeln!(out, "Deviation from pi: {:.10}", estimate.abs_error())?;
    writeln!(out, "Elapsed: {:.2?}", elapsed)?;
    writeln!(out, "Trials per second: {:.2e}", throughput(estimate, elapsed))?;

    if estimate.clamped() {
        writeln!(
            out,
            "Note: {} workers requested for {} trials, ran on 1",
            estimate.requested_workers, estimate.total_trials
        )?;
    }

    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    estimate: &'a Estimate,
    clamped: bool,
    abs_error: f64,
    elapsed_secs: f64,
}

/// Single-line JSON report.
pub fn write_json<W: Write>(out: &mut W, estimate: &Estimate, elapsed: Duration) -> io::Result<()> {
    let report = JsonReport {
        estimate,
        clamped: estimate.clamped(),
        abs_error: estimate.abs_error(),
        elapsed_secs: elapsed.as_secs_f64(),
    };
    serde_json::to_writer(&mut *out, &report)?;
    writeln!(out)
}

fn throughput(estimate: &Estimate, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        estimate.total_trials as f64 / secs
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;

    fn sample_estimate(requested_workers: usize) -> Estimate {
        Estimate {
            pi: 3.0,
            hits: 3,
            total_trials: 4,
            effective_workers: 1,
            requested_workers,
            backend: Backend::Threads,
        }
    }

    #[test]
    fn test_text_report_lines() {
        let mut out = Vec::new();
        write_text(&mut out, &sample_estimate(1), Duration::from_millis(2)).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Number of trials: 4");
        assert_eq!(lines[1], "Number of threads: 1");
        assert_eq!(lines[2], "Estimation of pi is 3.0000000000");
        assert_eq!(lines[3], "Deviation from pi: 0.1415926536");
        assert!(lines[5].starts_with("Trials per second: 2.00e3"));
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_text_report_mentions_clamp() {
        let mut out = Vec::new();
        write_text(&mut out, &sample_estimate(100), Duration::from_secs(1)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("Note: 100 workers requested for 4 trials, ran on 1\n"));
    }

    #[test]
    fn test_json_report_fields() {
        let mut out = Vec::new();
        write_json(&mut out, &sample_estimate(100), Duration::from_millis(500)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["pi"], 3.0);
        assert_eq!(value["hits"], 3);
        assert_eq!(value["total_trials"], 4);
        assert_eq!(value["effective_workers"], 1);
        assert_eq!(value["requested_workers"], 100);
        assert_eq!(value["backend"], "threads");
        assert_eq!(value["clamped"], true);
        assert_eq!(value["elapsed_secs"], 0.5);
    }

    #[test]
    fn test_zero_elapsed_has_zero_throughput() {
        assert_eq!(throughput(&sample_estimate(1), Duration::ZERO), 0.0);
    }
}
