use chrono::{Months, NaiveDate};

use super::Recurrence;

/// Returns the ordered occurrence dates of a recurring item up to and
/// including `target`.
///
/// The first occurrence is the anchor itself. Monthly items advance one
/// month per step and yearly items twelve, with the day-of-month clamped to
/// the last valid day of shorter months. Each step is computed from the
/// original anchor, so a clamp never compounds: an anchor on the 31st yields
/// the 30th in April and the 31st again in May.
pub fn occurrences(anchor: NaiveDate, recurrence: Recurrence, target: NaiveDate) -> Occurrences {
    let step_months = match recurrence {
        Recurrence::Monthly => Some(1),
        Recurrence::Yearly => Some(12),
        Recurrence::Once => None,
    };
    Occurrences {
        anchor,
        target,
        step_months,
        index: 0,
        done: false,
    }
}

/// Iterator over occurrence dates. Pure and restartable: two iterators built
/// from the same inputs yield the same sequence.
#[derive(Debug, Clone)]
pub struct Occurrences {
    anchor: NaiveDate,
    target: NaiveDate,
    /// `None` marks a one-time item.
    step_months: Option<u32>,
    index: u32,
    done: bool,
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.done {
            return None;
        }
        let date = match self.step_months {
            None => {
                self.done = true;
                self.anchor
            }
            Some(step) => {
                let months = step.checked_mul(self.index)?;
                match self.anchor.checked_add_months(Months::new(months)) {
                    Some(date) => date,
                    None => {
                        self.done = true;
                        return None;
                    }
                }
            }
        };
        if date > self.target {
            self.done = true;
            return None;
        }
        self.index += 1;
        Some(date)
    }
}
