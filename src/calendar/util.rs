use super::DateStyler;
use ratatui::{style::Style, text::Span};
use std::iter::successors;
use time::{Date, Month, Weekday, Weekday::*};

pub(crate) const DAYS_IN_WEEK: usize = 7;

pub(crate) trait WeekdayExt {
    /// Column of the weekday in a Monday-first week
    fn index0(&self) -> u16;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> u16 {
        self.number_days_from_monday().into()
    }
}

/// The Monday starting the week that contains `date`, or the earliest
/// representable date when that Monday does not exist
pub(crate) fn week_start(date: Date) -> Date {
    successors(Some(date), |&d| d.previous_day())
        .take(usize::from(date.weekday().index0()) + 1)
        .last()
        .unwrap_or(date)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct StyledDate {
    pub(crate) date: Date,
    pub(crate) style: Style,
}

impl StyledDate {
    pub(crate) fn month(&self) -> Month {
        self.date.month()
    }

    pub(crate) fn is_last_day_of_month(&self) -> bool {
        match self.date.next_day() {
            Some(tomorrow) => self.date.month() != tomorrow.month(),
            None => true,
        }
    }

    pub(crate) fn show(&self, is_today: bool) -> Span<'static> {
        let s = if is_today {
            format!("[{:2}]", self.date.day())
        } else {
            format!(" {:2} ", self.date.day())
        };
        Span::styled(s, self.style)
    }
}

/// One Monday-to-Sunday row of the calendar.  Days past either end of time
/// are `None`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Week([Option<StyledDate>; DAYS_IN_WEEK]);

impl Week {
    pub(crate) fn get(&self, wd: Weekday) -> Option<StyledDate> {
        self.0.get(usize::from(wd.index0())).copied().flatten()
    }

    pub(crate) fn days(&self) -> impl Iterator<Item = (Weekday, StyledDate)> + '_ {
        [Monday, Tuesday, Wednesday, Thursday, Friday, Saturday, Sunday]
            .into_iter()
            .filter_map(|wd| self.get(wd).map(|sd| (wd, sd)))
    }

    fn last(&self) -> Option<StyledDate> {
        self.0.iter().flatten().last().copied()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct WeekFactory<S>(S);

impl<S: DateStyler> WeekFactory<S> {
    pub(crate) fn new(styler: S) -> Self {
        WeekFactory(styler)
    }

    fn style_date(&self, date: Date) -> StyledDate {
        StyledDate {
            date,
            style: self.0.date_style(date),
        }
    }

    /// The week containing the given date, which can be any day of the week
    pub(crate) fn make(&self, date: Date) -> Week {
        let mut days = [None; DAYS_IN_WEEK];
        let start = week_start(date);
        for d in successors(Some(start), |&d| d.next_day()).take(DAYS_IN_WEEK) {
            days[usize::from(d.weekday().index0())] = Some(self.style_date(d));
        }
        Week(days)
    }

    /// Every week that has at least one day in the given month
    pub(crate) fn month_weeks(&self, year: i32, month: Month) -> Vec<Week> {
        let Ok(first) = Date::from_calendar_date(year, month, 1) else {
            return Vec::new();
        };
        successors(Some(self.make(first)), |w| {
            w.last()
                .filter(|sd| sd.month() == month)
                .and_then(|sd| sd.date.next_day())
                .filter(|d| d.month() == month)
                .map(|d| self.make(d))
        })
        .collect()
    }
}
