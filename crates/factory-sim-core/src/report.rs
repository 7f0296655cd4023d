//! When to write a state report during a run.

use crate::error::{SimError, SimResult};
use crate::id::Ticks;

/// Decides which ticks produce a state report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSchedule {
    /// Every `n`th tick, counting from 0. An interval of 0 never reports.
    Interval(Ticks),
    /// Exactly the listed ticks, each at most once.
    At { times: Vec<Ticks>, cursor: usize },
}

impl ReportSchedule {
    pub fn interval(every: Ticks) -> Self {
        ReportSchedule::Interval(every)
    }

    /// Build a list schedule. The list is sorted and de-duplicated; an empty
    /// list is rejected.
    pub fn at(times: impl IntoIterator<Item = Ticks>) -> SimResult<Self> {
        let mut times: Vec<Ticks> = times.into_iter().collect();
        if times.is_empty() {
            return Err(SimError::EmptyReportSchedule);
        }
        times.sort_unstable();
        times.dedup();
        Ok(ReportSchedule::At { times, cursor: 0 })
    }

    /// Whether tick `time` should be reported. Ticks must be queried in
    /// ascending order.
    pub fn is_report_time(&mut self, time: Ticks) -> bool {
        match self {
            ReportSchedule::Interval(0) => false,
            ReportSchedule::Interval(every) => time % *every == 0,
            ReportSchedule::At { times, cursor } => {
                while *cursor < times.len() && times[*cursor] < time {
                    *cursor += 1;
                }
                if *cursor < times.len() && times[*cursor] == time {
                    *cursor += 1;
                    return true;
                }
                false
            }
        }
    }
}

impl Default for ReportSchedule {
    fn default() -> Self {
        ReportSchedule::Interval(20)
    }
}
