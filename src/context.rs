use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use time::{Date, Duration, Month};

/// Granularity of the calendar currently on screen
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum View {
    Day,
    Week,
    Month,
    Year,
    List,
}

impl View {
    pub(crate) const ALL: [View; 5] = [View::Day, View::Week, View::Month, View::Year, View::List];

    pub(crate) fn name(self) -> &'static str {
        match self {
            View::Day => "day",
            View::Week => "week",
            View::Month => "month",
            View::Year => "year",
            View::List => "list",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SidebarState {
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ColorScheme {
    Dark,
    Light,
    Contrast,
}

impl ColorScheme {
    /// Light goes to dark, dark to contrast, and contrast back to light
    pub(crate) fn next(self) -> ColorScheme {
        match self {
            ColorScheme::Light => ColorScheme::Dark,
            ColorScheme::Dark => ColorScheme::Contrast,
            ColorScheme::Contrast => ColorScheme::Light,
        }
    }
}

/// Where the calendar is looking and how it is showing it
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CalendarContext {
    today: Date,
    date: Date,
    date_selected: Date,
    view: View,
    sidebar: SidebarState,
    color_scheme: ColorScheme,
}

impl CalendarContext {
    pub(crate) fn new(today: Date, view: View) -> CalendarContext {
        CalendarContext {
            today,
            date: today,
            date_selected: today,
            view,
            sidebar: SidebarState::Closed,
            color_scheme: ColorScheme::Dark,
        }
    }

    pub(crate) fn today(&self) -> Date {
        self.today
    }

    pub(crate) fn date(&self) -> Date {
        self.date
    }

    pub(crate) fn date_selected(&self) -> Date {
        self.date_selected
    }

    pub(crate) fn view(&self) -> View {
        self.view
    }

    pub(crate) fn sidebar(&self) -> SidebarState {
        self.sidebar
    }

    pub(crate) fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    pub(crate) fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub(crate) fn set_date(&mut self, date: Date) {
        self.date = date;
    }

    pub(crate) fn set_date_selected(&mut self, date: Date) {
        self.date_selected = date;
    }

    pub(crate) fn toggle_sidebar(&mut self) {
        self.sidebar = match self.sidebar {
            SidebarState::Open => SidebarState::Closed,
            SidebarState::Closed => SidebarState::Open,
        };
    }

    pub(crate) fn cycle_color_scheme(&mut self) {
        self.color_scheme = self.color_scheme.next();
    }

    /// Title for the header, e.g. "October 2026"
    pub(crate) fn month_name(&self) -> String {
        format!("{} {}", self.date.month(), self.date.year())
    }

    pub(crate) fn set_prev_day(&mut self) -> Result<(), OutOfTimeError> {
        self.date = self.date.previous_day().ok_or(OutOfTimeError)?;
        Ok(())
    }

    pub(crate) fn set_next_day(&mut self) -> Result<(), OutOfTimeError> {
        self.date = self.date.next_day().ok_or(OutOfTimeError)?;
        Ok(())
    }

    pub(crate) fn set_prev_week(&mut self) -> Result<(), OutOfTimeError> {
        self.date = self
            .date
            .checked_sub(Duration::weeks(1))
            .ok_or(OutOfTimeError)?;
        Ok(())
    }

    pub(crate) fn set_next_week(&mut self) -> Result<(), OutOfTimeError> {
        self.date = self
            .date
            .checked_add(Duration::weeks(1))
            .ok_or(OutOfTimeError)?;
        Ok(())
    }

    pub(crate) fn set_prev_month(&mut self) -> Result<(), OutOfTimeError> {
        self.date = shift_months(self.date, -1)?;
        Ok(())
    }

    pub(crate) fn set_next_month(&mut self) -> Result<(), OutOfTimeError> {
        self.date = shift_months(self.date, 1)?;
        Ok(())
    }

    pub(crate) fn set_prev_year(&mut self) -> Result<(), OutOfTimeError> {
        self.date = shift_months(self.date, -12)?;
        Ok(())
    }

    pub(crate) fn set_next_year(&mut self) -> Result<(), OutOfTimeError> {
        self.date = shift_months(self.date, 12)?;
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;

/// Move `date` by `delta` months, clamping the day to the length of the
/// target month
fn shift_months(date: Date, delta: i32) -> Result<Date, OutOfTimeError> {
    let index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 + delta;
    let year = index.div_euclid(12);
    let month = u8::try_from(index.rem_euclid(12) + 1)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or(OutOfTimeError)?;
    (1..=date.day())
        .rev()
        .find_map(|day| Date::from_calendar_date(year, month, day).ok())
        .ok_or(OutOfTimeError)
}

/// Number of days in the given month
pub(crate) fn month_length(year: i32, month: Month) -> u8 {
    (28..=31)
        .rev()
        .find(|&day| Date::from_calendar_date(year, month, day).is_ok())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_month_clamps_day() {
        let mut ctx = CalendarContext::new(date!(2024 - 01 - 31), View::Month);
        ctx.set_next_month().unwrap();
        assert_eq!(ctx.date(), date!(2024 - 02 - 29));
        ctx.set_next_month().unwrap();
        assert_eq!(ctx.date(), date!(2024 - 03 - 29));
    }

    #[test]
    fn test_month_across_years() {
        let mut ctx = CalendarContext::new(date!(2025 - 01 - 15), View::Month);
        ctx.set_prev_month().unwrap();
        assert_eq!(ctx.date(), date!(2024 - 12 - 15));
        ctx.set_next_month().unwrap();
        ctx.set_next_month().unwrap();
        assert_eq!(ctx.date(), date!(2025 - 02 - 15));
    }

    #[test]
    fn test_year_from_leap_day() {
        let mut ctx = CalendarContext::new(date!(2024 - 02 - 29), View::Year);
        ctx.set_next_year().unwrap();
        assert_eq!(ctx.date(), date!(2025 - 02 - 28));
        ctx.set_prev_year().unwrap();
        assert_eq!(ctx.date(), date!(2024 - 02 - 28));
    }

    #[test]
    fn test_weeks_and_days() {
        let mut ctx = CalendarContext::new(date!(2026 - 10 - 18), View::Week);
        ctx.set_next_week().unwrap();
        assert_eq!(ctx.date(), date!(2026 - 10 - 25));
        ctx.set_prev_day().unwrap();
        assert_eq!(ctx.date(), date!(2026 - 10 - 24));
        ctx.set_prev_week().unwrap();
        ctx.set_next_day().unwrap();
        assert_eq!(ctx.date(), date!(2026 - 10 - 18));
        assert_eq!(ctx.today(), date!(2026 - 10 - 18));
    }

    #[test]
    fn test_end_of_time() {
        let mut ctx = CalendarContext::new(Date::MAX, View::Day);
        assert_eq!(ctx.set_next_day(), Err(OutOfTimeError));
        assert_eq!(ctx.date(), Date::MAX);
    }

    #[test]
    fn test_month_length() {
        assert_eq!(month_length(2024, Month::February), 29);
        assert_eq!(month_length(2023, Month::February), 28);
        assert_eq!(month_length(2023, Month::April), 30);
        assert_eq!(month_length(2023, Month::December), 31);
    }

    #[test]
    fn test_color_scheme_cycle() {
        let mut ctx = CalendarContext::new(date!(2026 - 10 - 18), View::Week);
        assert_eq!(ctx.color_scheme(), ColorScheme::Dark);
        ctx.cycle_color_scheme();
        assert_eq!(ctx.color_scheme(), ColorScheme::Contrast);
        ctx.cycle_color_scheme();
        assert_eq!(ctx.color_scheme(), ColorScheme::Light);
        ctx.cycle_color_scheme();
        assert_eq!(ctx.color_scheme(), ColorScheme::Dark);
    }

    #[test]
    fn test_toggle_sidebar() {
        let mut ctx = CalendarContext::new(date!(2026 - 10 - 18), View::Week);
        ctx.toggle_sidebar();
        assert_eq!(ctx.sidebar(), SidebarState::Open);
        ctx.toggle_sidebar();
        assert_eq!(ctx.sidebar(), SidebarState::Closed);
    }
}
