use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ir::VertexCounters;

/// Sentinel for a metric value or percent that is not known.
pub const UNKNOWN: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    Input,
    Output,
    RecordsRead,
    RecordsWrite,
    TezTasks,
    SpilledRecords,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Input,
        MetricKind::Output,
        MetricKind::RecordsRead,
        MetricKind::RecordsWrite,
        MetricKind::TezTasks,
        MetricKind::SpilledRecords,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Input => "input",
            MetricKind::Output => "output",
            MetricKind::RecordsRead => "recordsRead",
            MetricKind::RecordsWrite => "recordsWrite",
            MetricKind::TezTasks => "tezTasks",
            MetricKind::SpilledRecords => "spilledRecords",
        }
    }

    /// Legend title shown next to the heat box.
    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Input => "Input",
            MetricKind::Output => "Output",
            MetricKind::RecordsRead => "Records Read",
            MetricKind::RecordsWrite => "Records Written",
            MetricKind::TezTasks => "Tasks",
            MetricKind::SpilledRecords => "Spilled Records",
        }
    }

    pub fn is_bytes(self) -> bool {
        matches!(self, MetricKind::Input | MetricKind::Output)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|ch| *ch != '-' && *ch != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| format!("unknown metric type '{value}'"))
    }
}

/// Fixed-shape metric record; every field defaults to [`UNKNOWN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metrics {
    pub input: i64,
    pub output: i64,
    pub records_read: i64,
    pub records_write: i64,
    pub tez_tasks: i64,
    pub spilled_records: i64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::unknown()
    }
}

impl Metrics {
    pub const fn unknown() -> Self {
        Self {
            input: UNKNOWN,
            output: UNKNOWN,
            records_read: UNKNOWN,
            records_write: UNKNOWN,
            tez_tasks: UNKNOWN,
            spilled_records: UNKNOWN,
        }
    }

    pub fn from_counters(counters: &VertexCounters) -> Self {
        Self {
            input: sum_known(&[counters.file_read_bytes, counters.hdfs_read_bytes]),
            output: sum_known(&[counters.file_write_bytes, counters.hdfs_write_bytes]),
            records_read: sum_known(&[counters.record_read_count]),
            records_write: sum_known(&[counters.record_write_count]),
            tez_tasks: sum_known(&[counters.tasks_count]),
            spilled_records: sum_known(&[counters.spilled_records]),
        }
    }

    pub fn get(&self, kind: MetricKind) -> i64 {
        match kind {
            MetricKind::Input => self.input,
            MetricKind::Output => self.output,
            MetricKind::RecordsRead => self.records_read,
            MetricKind::RecordsWrite => self.records_write,
            MetricKind::TezTasks => self.tez_tasks,
            MetricKind::SpilledRecords => self.spilled_records,
        }
    }

    pub fn set(&mut self, kind: MetricKind, value: i64) {
        let slot = match kind {
            MetricKind::Input => &mut self.input,
            MetricKind::Output => &mut self.output,
            MetricKind::RecordsRead => &mut self.records_read,
            MetricKind::RecordsWrite => &mut self.records_write,
            MetricKind::TezTasks => &mut self.tez_tasks,
            MetricKind::SpilledRecords => &mut self.spilled_records,
        };
        *slot = if value < 0 { UNKNOWN } else { value };
    }
}

fn sum_known(parts: &[Option<u64>]) -> i64 {
    let mut total: Option<i64> = None;
    for part in parts.iter().flatten() {
        let value = i64::try_from(*part).unwrap_or(i64::MAX);
        total = Some(total.unwrap_or(0).saturating_add(value));
    }
    total.unwrap_or(UNKNOWN)
}

/// Position of `value` inside `[min, max]` as a rounded percentage, or `-1`
/// when the value is unknown or the range is empty. Values within half a
/// percent of `max` also round to 100.
pub fn metric_percent(value: i64, min: i64, max: i64) -> i32 {
    if value < 0 || min < 0 || max <= min {
        return UNKNOWN as i32;
    }
    let percent = (value - min) as f64 * 100.0 / (max - min) as f64;
    percent.round().clamp(0.0, 100.0) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeatBand {
    None,
    Band0To20,
    Band20To40,
    Band40To60,
    Band60To80,
    Band80To100,
}

impl HeatBand {
    pub fn from_percent(percent: i32) -> Self {
        match percent {
            0..=20 => HeatBand::Band0To20,
            21..=40 => HeatBand::Band20To40,
            41..=60 => HeatBand::Band40To60,
            61..=80 => HeatBand::Band60To80,
            81..=100 => HeatBand::Band80To100,
            _ => HeatBand::None,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            HeatBand::None => "heat-none",
            HeatBand::Band0To20 => "heat-0-20",
            HeatBand::Band20To40 => "heat-20-40",
            HeatBand::Band40To60 => "heat-40-60",
            HeatBand::Band60To80 => "heat-60-80",
            HeatBand::Band80To100 => "heat-80-100",
        }
    }
}

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

pub fn bytes_to_size(bytes: i64) -> String {
    if bytes < 0 {
        return String::new();
    }
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

pub fn metric_display(kind: MetricKind, value: i64) -> String {
    if value < 0 {
        return String::new();
    }
    if kind.is_bytes() {
        bytes_to_size(value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_sum_into_io_metrics() {
        let counters = VertexCounters {
            file_read_bytes: Some(24),
            hdfs_read_bytes: Some(1000),
            hdfs_write_bytes: Some(7),
            tasks_count: Some(3),
            ..VertexCounters::default()
        };
        let metrics = Metrics::from_counters(&counters);
        assert_eq!(metrics.input, 1024);
        assert_eq!(metrics.output, 7);
        assert_eq!(metrics.tez_tasks, 3);
        assert_eq!(metrics.records_read, UNKNOWN);
        assert_eq!(metrics.spilled_records, UNKNOWN);
    }

    #[test]
    fn percent_is_guarded() {
        assert_eq!(metric_percent(50, 10, 90), 50);
        assert_eq!(metric_percent(90, 10, 90), 100);
        assert_eq!(metric_percent(10, 10, 90), 0);
        assert_eq!(metric_percent(10, 10, 10), -1);
        assert_eq!(metric_percent(UNKNOWN, 10, 90), -1);
    }

    #[test]
    fn percent_rounds_half_away_from_zero() {
        assert_eq!(metric_percent(1000, 0, 1000), 100);
        assert_eq!(metric_percent(996, 0, 1000), 100);
        assert_eq!(metric_percent(995, 0, 1000), 100);
        assert_eq!(metric_percent(994, 0, 1000), 99);
        assert_eq!(metric_percent(5, 0, 1000), 1);
        assert_eq!(metric_percent(4, 0, 1000), 0);
    }

    #[test]
    fn heat_bands_match_legend() {
        assert_eq!(HeatBand::from_percent(-1).css_class(), "heat-none");
        assert_eq!(HeatBand::from_percent(0).css_class(), "heat-0-20");
        assert_eq!(HeatBand::from_percent(20).css_class(), "heat-0-20");
        assert_eq!(HeatBand::from_percent(21).css_class(), "heat-20-40");
        assert_eq!(HeatBand::from_percent(100).css_class(), "heat-80-100");
        assert_eq!(HeatBand::from_percent(101), HeatBand::None);
    }

    #[test]
    fn formats_byte_sizes() {
        assert_eq!(bytes_to_size(0), "0 Bytes");
        assert_eq!(bytes_to_size(512), "512 Bytes");
        assert_eq!(bytes_to_size(1536), "1.5 KB");
        assert_eq!(bytes_to_size(100 * 1024 * 1024), "100 MB");
        assert_eq!(metric_display(MetricKind::Input, UNKNOWN), "");
        assert_eq!(metric_display(MetricKind::TezTasks, 12), "12");
    }

    #[test]
    fn parses_metric_names() {
        assert_eq!("recordsRead".parse::<MetricKind>(), Ok(MetricKind::RecordsRead));
        assert_eq!("spilled-records".parse::<MetricKind>(), Ok(MetricKind::SpilledRecords));
        assert_eq!("TEZ_TASKS".parse::<MetricKind>(), Ok(MetricKind::TezTasks));
        assert!("duration".parse::<MetricKind>().is_err());
    }
}
