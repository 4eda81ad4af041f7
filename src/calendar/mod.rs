mod grid;
mod list;
mod month;
mod util;
mod year;
pub(crate) use self::grid::TimeGrid;
pub(crate) use self::list::ListView;
pub(crate) use self::month::MonthView;
pub(crate) use self::year::{MiniMonth, YearView, MINI_HEIGHT};
use crate::api::SelectedCourse;
use crate::configuration::{hour_minute, Blocker, BlockerId};
use indexmap::IndexMap;
use ratatui::style::Style;
use time::{Date, Time, Weekday};

pub(crate) trait DateStyler {
    fn date_style(&self, date: Date) -> Style;
}

impl<T: DateStyler + ?Sized> DateStyler for &T {
    fn date_style(&self, date: Date) -> Style {
        (**self).date_style(date)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BlockKind {
    Course,
    Blocker,
}

/// A timed box drawn in the day & week grids
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TimeBlock {
    pub(crate) label: String,
    pub(crate) detail: String,
    pub(crate) from: Time,
    pub(crate) until: Time,
    pub(crate) kind: BlockKind,
}

/// Everything recurring weekly that the calendar shows: the courses the
/// optimizer picked and the user's blockers
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Agenda<'a> {
    pub(crate) courses: &'a [SelectedCourse],
    pub(crate) blockers: &'a IndexMap<BlockerId, Blocker>,
}

impl Agenda<'_> {
    /// Blocks on the given weekday, earliest first
    pub(crate) fn blocks_on(&self, weekday: Weekday) -> Vec<TimeBlock> {
        let mut blocks = self
            .courses
            .iter()
            .flat_map(|course| {
                course
                    .appointments
                    .iter()
                    .filter(move |appt| appt.falls_on(weekday))
                    .map(move |appt| TimeBlock {
                        label: course.subject.clone(),
                        detail: appt.course_type.clone().unwrap_or_default(),
                        from: appt.from,
                        until: appt.to,
                        kind: BlockKind::Course,
                    })
            })
            .chain(
                self.blockers
                    .values()
                    .filter(|b| b.weekday.map(|wd| wd.weekday()) == Some(weekday))
                    .map(|b| TimeBlock {
                        label: String::from("Blocked"),
                        detail: format!("{}–{}", hour_minute(b.from), hour_minute(b.until)),
                        from: b.from,
                        until: b.until,
                        kind: BlockKind::Blocker,
                    }),
            )
            .collect::<Vec<_>>();
        blocks.sort_by_key(|b| (b.from, b.until));
        blocks
    }

    pub(crate) fn has_courses_on(&self, weekday: Weekday) -> bool {
        self.courses
            .iter()
            .flat_map(|c| &c.appointments)
            .any(|appt| appt.falls_on(weekday))
    }
}

/// Highlights dates whose weekday has a scheduled course
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct BusyDays<'a> {
    pub(crate) agenda: Agenda<'a>,
    pub(crate) busy: Style,
    pub(crate) free: Style,
}

impl DateStyler for BusyDays<'_> {
    fn date_style(&self, date: Date) -> Style {
        if self.agenda.has_courses_on(date.weekday()) {
            self.busy
        } else {
            self.free
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Appointment;
    use crate::configuration::Configuration;
    use time::macros::time;

    fn course(subject: &str, weekday: &str, from: Time, to: Time) -> SelectedCourse {
        SelectedCourse {
            subject: subject.to_owned(),
            name_en: None,
            appointments: vec![Appointment {
                weekday: weekday.to_owned(),
                from,
                to,
                course_type: Some(String::from("VO")),
            }],
        }
    }

    #[test]
    fn test_blocks_on() {
        let courses = [
            course("IN0002", "Monday", time!(14:00), time!(16:00)),
            course("IN0001", "Monday", time!(10:00), time!(12:00)),
            course("MA0001", "Tuesday", time!(8:00), time!(10:00)),
        ];
        let mut config = Configuration::new();
        config.add_blocker(0, time!(12:00), time!(13:00));
        config.add_blocker(1, time!(12:00), time!(13:00));
        let agenda = Agenda {
            courses: &courses,
            blockers: config.blockers(),
        };
        let blocks = agenda.blocks_on(Weekday::Monday);
        assert_eq!(
            blocks.iter().map(|b| b.label.as_str()).collect::<Vec<_>>(),
            ["IN0001", "Blocked", "IN0002"]
        );
        assert_eq!(blocks[1].kind, BlockKind::Blocker);
        assert_eq!(blocks[1].detail, "12:00–13:00");
        assert!(agenda.blocks_on(Weekday::Saturday).is_empty());
        assert!(agenda.has_courses_on(Weekday::Tuesday));
        assert!(!agenda.has_courses_on(Weekday::Wednesday));
    }
}
