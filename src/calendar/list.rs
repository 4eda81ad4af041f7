use super::Agenda;
use crate::configuration::{hour_minute, Workday};
use crate::theme::Theme;
use ratatui::{prelude::*, widgets::*};

static EMPTY_HINT: &str = "No courses scheduled. Press o to optimize or a to configure.";

/// Every selected course with its weekly appointments, followed by the
/// blockers
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ListView<'a> {
    pub(crate) agenda: Agenda<'a>,
    pub(crate) theme: &'a Theme,
}

impl ListView<'_> {
    fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if self.agenda.courses.is_empty() {
            lines.push(Line::styled(EMPTY_HINT, self.theme.muted));
        }
        for course in self.agenda.courses {
            let mut head = vec![Span::styled(course.subject.clone(), self.theme.bold)];
            if let Some(name) = &course.name_en {
                head.push(Span::raw(format!("  {name}")));
            }
            lines.push(Line::from(head));
            for appt in &course.appointments {
                let mut text = format!(
                    "    {:<9} {}–{}",
                    appt.weekday,
                    hour_minute(appt.from),
                    hour_minute(appt.to)
                );
                if let Some(kind) = &appt.course_type {
                    text.push_str("  ");
                    text.push_str(kind);
                }
                lines.push(Line::styled(text, self.theme.base));
            }
        }
        if !self.agenda.blockers.is_empty() {
            lines.push(Line::default());
            lines.push(Line::styled("Blockers", self.theme.bold));
            for blocker in self.agenda.blockers.values() {
                let day = blocker.weekday.map_or("Any day", Workday::name);
                lines.push(Line::styled(
                    format!(
                        "    {:<9} {}–{}",
                        day,
                        hour_minute(blocker.from),
                        hour_minute(blocker.until)
                    ),
                    self.theme.muted,
                ));
            }
        }
        lines
    }
}

impl Widget for ListView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines())
            .style(self.theme.base)
            .block(Block::new().padding(Padding::horizontal(1)))
            .render(area, buf);
    }
}
