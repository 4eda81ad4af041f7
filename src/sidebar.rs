use crate::calendar::{DateStyler, MiniMonth, MINI_HEIGHT};
use crate::configuration::{hour_minute, Configuration};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Widget, Wrap},
};
use time::Date;

pub(crate) const SIDEBAR_WIDTH: u16 = 26;

/// The collapsible left-hand panel: a date picker for the month last synced
/// by navigation, then a summary of the course configuration
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Sidebar<'a> {
    pub(crate) config: &'a Configuration,
    pub(crate) theme: &'a Theme,
    pub(crate) today: Date,
    pub(crate) selected: Date,
    /// Any date in the month the picker shows
    pub(crate) picker: Date,
}

impl Sidebar<'_> {
    fn summary(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let or_dash = |s: &str| {
            if s.is_empty() {
                String::from("—")
            } else {
                s.to_owned()
            }
        };
        let entry = |label: &'static str, value: String| {
            Line::from(vec![
                Span::styled(label, theme.muted),
                Span::styled(value, theme.base),
            ])
        };
        let mut lines = vec![
            entry("Semester   ", or_dash(self.config.semester())),
            entry("Curriculum ", or_dash(self.config.curriculum())),
            entry("Objective  ", self.config.objective().to_owned()),
            entry("Prefixes   ", or_dash(&self.config.selected_prefixes().join(", "))),
            entry("Excluded   ", or_dash(&self.config.excluded_courses().join(", "))),
        ];
        for (name, amount) in self.config.additional_constraints() {
            lines.push(entry("  at least ", format!("{amount} × {name}")));
        }
        lines.push(Line::default());
        lines.push(Line::styled("Blockers", theme.bold));
        if self.config.blockers().is_empty() {
            lines.push(Line::styled("  none (press f)", theme.muted));
        }
        for blocker in self.config.blockers().values() {
            lines.push(Line::styled(
                format!(
                    "  {:<3} {}–{}",
                    blocker
                        .weekday
                        .map_or("—", |wd| wd.name().get(..3).unwrap_or_default()),
                    hour_minute(blocker.from),
                    hour_minute(blocker.until)
                ),
                theme.base,
            ));
        }
        lines
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::new()
            .borders(Borders::RIGHT)
            .padding(Padding::horizontal(1))
            .style(self.theme.base);
        let inner = block.inner(area);
        block.render(area, buf);
        let [picker, _, summary] = Layout::vertical([
            Constraint::Length(MINI_HEIGHT),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(inner);
        MiniMonth {
            styler: NoStyle(self.theme.base),
            theme: self.theme,
            year: self.picker.year(),
            month: self.picker.month(),
            today: self.today,
            selected: Some(self.selected),
            show_year: true,
        }
        .render(picker, buf);
        Paragraph::new(self.summary())
            .wrap(Wrap { trim: false })
            .render(summary, buf);
    }
}

/// Styles every date of the picker alike
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct NoStyle(Style);

impl DateStyler for NoStyle {
    fn date_style(&self, _date: Date) -> Style {
        self.0
    }
}
