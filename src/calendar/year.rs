use super::util::{WeekFactory, WeekdayExt};
use super::DateStyler;
use crate::theme::Theme;
use ratatui::{prelude::*, widgets::*};
use time::{Date, Month};

const MINI_HEADER: &str = "Mo Tu We Th Fr Sa Su";

/// Columns taken up by a [`MiniMonth`]
pub(crate) const MINI_WIDTH: u16 = 20;

/// Lines taken up by a [`MiniMonth`]: its title, the weekday header, and up
/// to six weeks
pub(crate) const MINI_HEIGHT: u16 = 8;

const YEAR_COLUMNS: usize = 4;

/// A compact single month with two-character days, as used in the year view
/// and the sidebar's date picker
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MiniMonth<'a, S> {
    pub(crate) styler: S,
    pub(crate) theme: &'a Theme,
    pub(crate) year: i32,
    pub(crate) month: Month,
    pub(crate) today: Date,
    pub(crate) selected: Option<Date>,
    pub(crate) show_year: bool,
}

impl<S: DateStyler> Widget for MiniMonth<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.show_year {
            format!("{} {}", self.month, self.year)
        } else {
            self.month.to_string()
        };
        let mut lines = vec![
            Line::styled(title, self.theme.bold).alignment(Alignment::Center),
            Line::styled(MINI_HEADER, self.theme.muted),
        ];
        for week in WeekFactory::new(&self.styler).month_weeks(self.year, self.month) {
            let mut spans = Vec::new();
            let mut col = 0;
            for (wd, sd) in week.days().filter(|(_, sd)| sd.month() == self.month) {
                let pad = wd.index0() * 3 - col;
                if pad > 0 {
                    spans.push(Span::raw(" ".repeat(pad.into())));
                }
                let mut style = sd.style;
                if Some(sd.date) == self.selected {
                    style = style.patch(self.theme.selected);
                } else if sd.date == self.today {
                    style = style.patch(self.theme.today);
                }
                spans.push(Span::styled(format!("{:2}", sd.date.day()), style));
                col = wd.index0() * 3 + 2;
            }
            lines.push(Line::from(spans));
        }
        let width = MINI_WIDTH.min(area.width);
        let x = area.x + (area.width - width) / 2;
        Paragraph::new(lines)
            .style(self.theme.base)
            .render(Rect { x, width, ..area }, buf);
    }
}

/// All twelve months of one year in a four-by-three grid
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct YearView<'a, S> {
    pub(crate) styler: S,
    pub(crate) theme: &'a Theme,
    pub(crate) year: i32,
    pub(crate) today: Date,
    pub(crate) selected: Date,
}

impl<S: DateStyler> Widget for YearView<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.base);
        let [title, body] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);
        Paragraph::new(Span::styled(self.year.to_string(), self.theme.bold))
            .alignment(Alignment::Center)
            .render(title, buf);
        let rows = Layout::vertical([Constraint::Length(MINI_HEIGHT + 1); 3]).split(body);
        let mut month = Month::January;
        for row in rows.iter().copied() {
            let cells = Layout::horizontal([Constraint::Ratio(1, 4); YEAR_COLUMNS]).split(row);
            for cell in cells.iter().copied() {
                MiniMonth {
                    styler: &self.styler,
                    theme: self.theme,
                    year: self.year,
                    month,
                    today: self.today,
                    selected: Some(self.selected),
                    show_year: false,
                }
                .render(cell, buf);
                month = month.next();
            }
        }
    }
}
