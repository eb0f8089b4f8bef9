use std::{io::Write, ops::Range};

use chrono::NaiveDate;

use crate::error::Result;

/// Column headers of the weekly table; `date` is the index column.
pub const COLUMNS: [&str; 5] = ["date", "mean", "raw_cases", "is_outbreak", "n_outbreak_cases"];

#[derive(Debug, Clone, PartialEq)]
pub struct WeekRecord {
    pub week_index: usize,
    pub date: NaiveDate,
    /// Mean of the Poisson draw, including any outbreak shift.
    pub mean: f64,
    pub raw_cases: u64,
    pub is_outbreak: bool,
    pub n_outbreak_cases: u64,
}

impl WeekRecord {
    pub fn new(
        week_index: usize,
        date: NaiveDate,
        mean: f64,
        raw_cases: u64,
        is_outbreak: bool,
    ) -> WeekRecord {
        WeekRecord {
            week_index,
            date,
            mean,
            raw_cases,
            is_outbreak,
            n_outbreak_cases: if is_outbreak { raw_cases } else { 0 },
        }
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            self.mean.to_string(),
            self.raw_cases.to_string(),
            u8::from(self.is_outbreak).to_string(),
            self.n_outbreak_cases.to_string(),
        ]
    }
}

/// Weekly series produced by one simulation run, in chronological order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationResult {
    records: Vec<WeekRecord>,
}

impl SimulationResult {
    pub(crate) fn new(records: Vec<WeekRecord>) -> SimulationResult {
        SimulationResult { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[WeekRecord] {
        &self.records
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    pub fn means(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.mean).collect()
    }

    pub fn raw_cases(&self) -> Vec<u64> {
        self.records.iter().map(|r| r.raw_cases).collect()
    }

    /// Outbreak indicators as 0/1.
    pub fn is_outbreak(&self) -> Vec<u8> {
        self.records.iter().map(|r| u8::from(r.is_outbreak)).collect()
    }

    pub fn n_outbreak_cases(&self) -> Vec<u64> {
        self.records.iter().map(|r| r.n_outbreak_cases).collect()
    }

    pub fn total_cases(&self) -> u64 {
        self.records.iter().map(|r| r.raw_cases).sum()
    }

    pub fn outbreak_weeks(&self) -> usize {
        self.records.iter().filter(|r| r.is_outbreak).count()
    }

    /// Maximal runs of consecutive outbreak weeks, as week-index ranges.
    pub fn outbreak_episodes(&self) -> Vec<Range<usize>> {
        let mut episodes = Vec::new();
        let mut start = None;
        for record in &self.records {
            match (record.is_outbreak, start) {
                (true, None) => start = Some(record.week_index),
                (false, Some(first)) => {
                    episodes.push(first..record.week_index);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(first) = start {
            episodes.push(first..self.records.len());
        }
        episodes
    }

    /// Rows matching `COLUMNS`.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        self.records.iter().map(WeekRecord::to_row).collect()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        pointsource_run::write_records(writer, &COLUMNS, &self.to_rows())?;
        Ok(())
    }
}
