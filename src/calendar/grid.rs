use super::util::{week_start, DAYS_IN_WEEK};
use super::{Agenda, BlockKind, TimeBlock};
use crate::theme::Theme;
use ratatui::{prelude::*, widgets::*};
use std::iter::successors;
use time::{Date, Time};

/// Columns reserved on the left for the hour labels
const GUTTER_WIDTH: u16 = 6;

/// Hour rows of one or more days side by side, with the agenda's blocks laid
/// over them
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TimeGrid<'a> {
    agenda: Agenda<'a>,
    theme: &'a Theme,
    days: Vec<Date>,
    today: Date,
    selected: Date,
    first_hour: u8,
    last_hour: u8,
}

impl<'a> TimeGrid<'a> {
    pub(crate) fn day(agenda: Agenda<'a>, theme: &'a Theme, date: Date) -> Self {
        TimeGrid {
            agenda,
            theme,
            days: vec![date],
            today: date,
            selected: date,
            first_hour: 0,
            last_hour: 23,
        }
    }

    /// Monday through Sunday of the week containing `date`
    pub(crate) fn week(agenda: Agenda<'a>, theme: &'a Theme, date: Date) -> Self {
        let days = successors(Some(week_start(date)), |d| d.next_day())
            .take(DAYS_IN_WEEK)
            .collect();
        TimeGrid {
            agenda,
            theme,
            days,
            today: date,
            selected: date,
            first_hour: 0,
            last_hour: 23,
        }
    }

    pub(crate) fn today(mut self, today: Date) -> Self {
        self.today = today;
        self
    }

    pub(crate) fn selected(mut self, selected: Date) -> Self {
        self.selected = selected;
        self
    }

    /// Limit the rows to the hours from `first` through `last`, inclusive
    pub(crate) fn hours(mut self, first: u8, last: u8) -> Self {
        self.last_hour = last.min(23);
        self.first_hour = first.min(self.last_hour);
        self
    }

    fn day_title(&self, date: Date) -> String {
        if self.days.len() == 1 {
            format!("{}, {} {}", date.weekday(), date.month(), date.day())
        } else {
            let name = date.weekday().to_string();
            format!("{} {}", name.get(..3).unwrap_or(&name), date.day())
        }
    }

    fn draw_block(&self, block: &TimeBlock, area: Rect, scale: &RowScale, buf: &mut Buffer) {
        let Some((top, bottom)) = scale.rows(block.from, block.until) else {
            return;
        };
        let rect = Rect {
            x: area.x,
            y: area.y + top,
            width: area.width,
            height: (bottom - top).min(area.height.saturating_sub(top)),
        };
        if rect.height == 0 || rect.width == 0 {
            return;
        }
        let style = match block.kind {
            BlockKind::Course => self.theme.course,
            BlockKind::Blocker => self.theme.blocker,
        };
        let mut lines = vec![Line::from(Span::styled(
            block.label.as_str(),
            style.add_modifier(Modifier::BOLD),
        ))];
        if !block.detail.is_empty() {
            lines.push(Line::from(block.detail.as_str()));
        }
        Paragraph::new(lines).style(style).render(rect, buf);
    }
}

impl Widget for TimeGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.base);
        let [head, body] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
        let [_, head] = Layout::horizontal([Constraint::Length(GUTTER_WIDTH), Constraint::Min(0)])
            .areas(head);
        let [gutter, body] =
            Layout::horizontal([Constraint::Length(GUTTER_WIDTH), Constraint::Min(0)])
                .areas(body);
        let scale = RowScale::new(self.first_hour, self.last_hour, body.height);
        for (hour, row) in scale.hour_rows() {
            if row < gutter.height {
                let label = Span::styled(format!("{:>5}", hour_label(hour)), self.theme.muted);
                label.render(Rect::new(gutter.x, gutter.y + row, gutter.width, 1), buf);
            }
        }
        let ndays = u32::try_from(self.days.len()).unwrap_or(1).max(1);
        let columns = Layout::horizontal(vec![Constraint::Ratio(1, ndays); self.days.len()])
            .split(body);
        let heads = Layout::horizontal(vec![Constraint::Ratio(1, ndays); self.days.len()])
            .split(head);
        let cells = columns.iter().zip(heads.iter());
        for (&date, (&column, &title_area)) in self.days.iter().zip(cells) {
            let mut style = self.theme.bold;
            if date == self.selected {
                style = style.patch(self.theme.selected);
            } else if date == self.today {
                style = style.patch(self.theme.today);
            }
            Paragraph::new(Span::styled(self.day_title(date), style))
                .alignment(Alignment::Center)
                .render(title_area, buf);
            // Leave a one-column gap between neighboring days
            let inner = Rect {
                width: column.width.saturating_sub(1).max(1),
                ..column
            };
            for block in self.agenda.blocks_on(date.weekday()) {
                self.draw_block(&block, inner, &scale, buf);
            }
        }
    }
}

/// Maps times of day to row offsets in the grid body
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct RowScale {
    first_hour: u8,
    last_hour: u8,
    rows_per_hour: u16,
}

impl RowScale {
    fn new(first_hour: u8, last_hour: u8, height: u16) -> RowScale {
        let hours = u16::from(last_hour - first_hour) + 1;
        RowScale {
            first_hour,
            last_hour,
            rows_per_hour: (height / hours).max(1),
        }
    }

    fn hour_rows(&self) -> impl Iterator<Item = (u8, u16)> + '_ {
        (self.first_hour..=self.last_hour)
            .map(|h| (h, u16::from(h - self.first_hour) * self.rows_per_hour))
    }

    fn start_minute(&self) -> u16 {
        u16::from(self.first_hour) * 60
    }

    fn end_minute(&self) -> u16 {
        (u16::from(self.last_hour) + 1) * 60
    }

    /// The top row and the row just past the bottom of a block running from
    /// `from` to `until`, or `None` if it lies outside the visible hours
    fn rows(&self, from: Time, until: Time) -> Option<(u16, u16)> {
        let from = minute_of_day(from).max(self.start_minute());
        let until = minute_of_day(until).min(self.end_minute());
        if from >= until {
            return None;
        }
        let top = (from - self.start_minute()) * self.rows_per_hour / 60;
        let bottom = ((until - self.start_minute()) * self.rows_per_hour).div_ceil(60);
        Some((top, bottom.max(top + 1)))
    }
}

fn minute_of_day(t: Time) -> u16 {
    u16::from(t.hour()) * 60 + u16::from(t.minute())
}

/// "5 AM", "12 PM", "10 PM"
pub(crate) fn hour_label(hour: u8) -> String {
    match hour {
        0 => String::from("12 AM"),
        1..=11 => format!("{hour} AM"),
        12 => String::from("12 PM"),
        _ => format!("{} PM", hour - 12),
    }
}
