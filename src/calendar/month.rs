use super::util::{WeekFactory, WeekdayExt};
use super::DateStyler;
use crate::theme::Theme;
use ratatui::{prelude::*, widgets::*};
use time::{Date, Month, Weekday};

static HEADER: &str = " Mo     Tu     We     Th     Fr     Sa     Su ";

/// Width of the calendar in columns, not counting the year and month in the
/// margins
const MAIN_WIDTH: u16 = 46;

/// Number of columns on the left side of the calendar, used as the margin in
/// which the year is written
const LEFT_MARGIN: u16 = 6;

const LONGEST_MONTH_NAME_LEN: u16 = 9; // September

/// Columns between the right edge of the calendar and the start of the month
/// name
const MONTH_GUTTER: u16 = 2;

const RIGHT_MARGIN: u16 = LONGEST_MONTH_NAME_LEN + MONTH_GUTTER;

const TOTAL_WIDTH: u16 = LEFT_MARGIN + MAIN_WIDTH + RIGHT_MARGIN;

/// Number of lines taken up by the header and its rule
const HEADER_LINES: u16 = 2;

/// Number of lines taken up by each week of the calendar
const WEEK_LINES: u16 = 2;

/// When inserting a vertical bar-like character between consecutive days in
/// the same week but different months, draw it this many columns to the right
/// of the left edge of the day on the left.
const VBAR_OFFSET: u16 = 5;

/// Number of columns per day of week
const DAY_WIDTH: u16 = 7;

const ACS_HLINE: char = '─';
const ACS_VLINE: char = '│';
const ACS_TTEE: char = '┬';
const ACS_ULCORNER: char = '┌';
const ACS_LRCORNER: char = '┘';

/// The weeks of one month, with the neighboring months' days dimmed and the
/// month boundaries ruled off
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthView<'a, S> {
    pub(crate) styler: S,
    pub(crate) theme: &'a Theme,
    pub(crate) today: Date,
    pub(crate) selected: Date,
    /// Any date in the month to show
    pub(crate) date: Date,
}

impl<S: DateStyler> Widget for MonthView<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.base);
        let left = (area.width.saturating_sub(MAIN_WIDTH) / 2).max(LEFT_MARGIN) - LEFT_MARGIN;
        let [_, area, _] = Layout::horizontal([
            Constraint::Length(left),
            Constraint::Length(TOTAL_WIDTH.min(area.width)),
            Constraint::Min(0),
        ])
        .areas(area);
        let month = self.date.month();
        let weeks = WeekFactory::new(&self.styler).month_weeks(self.date.year(), month);
        let mut canvas = BufferCanvas::new(area, buf, self.theme);
        canvas.draw_header();
        canvas.draw_year(0, self.date.year());
        canvas.draw_month(0, month);
        for (i, week) in std::iter::zip(0u16.., &weeks) {
            for (wd, date) in week.days() {
                let mut span = date.show(date.date == self.today);
                if date.month() != month {
                    span.style = self.theme.muted;
                } else if date.date == self.selected {
                    span.style = span.style.patch(self.theme.selected);
                } else if date.date == self.today {
                    span.style = span.style.patch(self.theme.today);
                }
                canvas.draw_day(i, wd, span);
                if date.is_last_day_of_month() && usize::from(i) + 1 < weeks.len() {
                    canvas.draw_month_border(i, wd);
                }
            }
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
    theme: &'a Theme,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer, theme: &'a Theme) -> Self {
        Self { area, buf, theme }
    }

    fn draw_header(&mut self) {
        self.mvprint(0, LEFT_MARGIN, HEADER, Some(self.theme.bold));
        self.hline(1, LEFT_MARGIN, ACS_HLINE, MAIN_WIDTH);
    }

    fn draw_year(&mut self, week_no: u16, year: i32) {
        self.mvprint(
            week_no * WEEK_LINES + HEADER_LINES,
            0,
            year.to_string(),
            Some(self.theme.bold),
        );
    }

    fn draw_month(&mut self, week_no: u16, month: Month) {
        self.mvprint(
            week_no * WEEK_LINES + HEADER_LINES,
            LEFT_MARGIN + MAIN_WIDTH + MONTH_GUTTER,
            month.to_string(),
            Some(self.theme.bold),
        );
    }

    fn draw_day(&mut self, week_no: u16, wd: Weekday, s: Span<'_>) {
        self.mvprint(
            week_no * WEEK_LINES + HEADER_LINES,
            LEFT_MARGIN + DAY_WIDTH * wd.index0(),
            s.content,
            Some(s.style),
        );
    }

    // `week_no` and `wd` specify the "coordinates" of the last day of the
    // month after which the border is drawn
    fn draw_month_border(&mut self, week_no: u16, wd: Weekday) {
        let y = week_no * WEEK_LINES + HEADER_LINES;
        let offset = DAY_WIDTH * wd.index0();
        let bar_col = LEFT_MARGIN + offset + VBAR_OFFSET;
        if wd != Weekday::Sunday {
            self.mvaddch(y, bar_col, ACS_VLINE);
            self.mvaddch(
                y - 1,
                bar_col,
                if week_no == 0 { ACS_TTEE } else { ACS_ULCORNER },
            );
            if week_no > 0 {
                if let Some(length) = MAIN_WIDTH.checked_sub(offset + VBAR_OFFSET + 1) {
                    self.hline(y - 1, bar_col + 1, ACS_HLINE, length);
                }
            }
            self.mvaddch(y + 1, bar_col, ACS_LRCORNER);
        }
        self.hline(y + 1, LEFT_MARGIN, ACS_HLINE, offset + VBAR_OFFSET);
    }

    fn mvaddch(&mut self, y: u16, x: u16, ch: char) {
        if y < self.area.height && x < self.area.width {
            if let Some(cell) = self.buf.cell_mut((x + self.area.x, y + self.area.y)) {
                cell.set_char(ch);
            }
        }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // A Paragraph truncates text running past the calendar's area; the
            // Rect handed to it must lie entirely within the frame.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::DARK;
    use time::macros::date;

    struct Plain;

    impl DateStyler for Plain {
        fn date_style(&self, _date: Date) -> Style {
            DARK.base
        }
    }

    fn render(date: Date) -> Buffer {
        let area = Rect::new(0, 0, 80, 14);
        let mut buf = Buffer::empty(area);
        MonthView {
            styler: Plain,
            theme: &DARK,
            today: date!(2026 - 10 - 18),
            selected: date!(2026 - 10 - 20),
            date,
        }
        .render(area, &mut buf);
        buf
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_owned()))
            .collect()
    }

    #[test]
    fn test_month_rows() {
        let buf = render(date!(2026 - 10 - 05));
        assert!(row_text(&buf, 0).contains(HEADER));
        let first = row_text(&buf, 2);
        assert!(first.contains("2026"), "{first:?}");
        assert!(first.contains("October"), "{first:?}");
        assert!(first.contains(" 28 "), "{first:?}");
        // Today is bracketed
        assert!(row_text(&buf, 6).contains("[18]"));
        // Last row holds the first of November
        let last = row_text(&buf, 10);
        assert!(last.contains(" 31 ") && last.contains("  1 "), "{last:?}");
    }

    #[test]
    fn test_neighbor_days_are_muted() {
        let buf = render(date!(2026 - 10 - 05));
        let first = row_text(&buf, 2);
        let col = u16::try_from(first.find("28").unwrap()).unwrap();
        assert_eq!(buf.cell((col, 2)).unwrap().fg, DARK.muted.fg.unwrap());
    }
}
