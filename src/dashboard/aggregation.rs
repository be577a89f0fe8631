//! Month bucketing for the dashboard charts.

use std::{collections::HashMap, iter};

use time::{Date, Month};

use crate::money::Pence;

/// The number of months shown on the monthly totals chart.
pub(super) const MONTHS_SHOWN: usize = 12;

/// The first day of the month `date` falls in.
pub(super) fn start_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// The first days of the last [MONTHS_SHOWN] months, oldest first, ending with `today`'s month.
pub(super) fn last_twelve_months(today: Date) -> Vec<Date> {
    let mut months: Vec<Date> = iter::successors(Some(start_of_month(today)), |month| {
        month.previous_day().map(start_of_month)
    })
    .take(MONTHS_SHOWN)
    .collect();
    months.reverse();
    months
}

/// Line up `totals` with `months`, using zero for months with no donations.
pub(super) fn fill_months(months: &[Date], totals: &HashMap<Date, Pence>) -> Vec<Pence> {
    months
        .iter()
        .map(|month| totals.get(month).copied().unwrap_or(0))
        .collect()
}

/// Formats a month as a short label, e.g. "Mar 2025".
pub(super) fn format_month_label(month: Date) -> String {
    let name = match month.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    format!("{name} {}", month.year())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use time::macros::date;

    use super::{fill_months, format_month_label, last_twelve_months, start_of_month};

    #[test]
    fn last_twelve_months_crosses_year_boundary() {
        let months = last_twelve_months(date!(2025 - 03 - 18));

        assert_eq!(months.len(), 12);
        assert_eq!(months[0], date!(2024 - 04 - 01));
        assert_eq!(months[11], date!(2025 - 03 - 01));
    }

    #[test]
    fn start_of_month_keeps_year_and_month() {
        assert_eq!(start_of_month(date!(2024 - 02 - 29)), date!(2024 - 02 - 01));
    }

    #[test]
    fn fill_months_uses_zero_for_gaps() {
        let months = [date!(2025 - 01 - 01), date!(2025 - 02 - 01), date!(2025 - 03 - 01)];
        let totals = HashMap::from([(date!(2025 - 02 - 01), 1_500)]);

        assert_eq!(fill_months(&months, &totals), vec![0, 1_500, 0]);
    }

    #[test]
    fn month_label_includes_year() {
        assert_eq!(format_month_label(date!(2025 - 03 - 01)), "Mar 2025");
    }
}
