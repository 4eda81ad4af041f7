use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};
use time::{Date, Month};

const OUTER_WIDTH: u16 = 17;
const OUTER_HEIGHT: u16 = 8;
const ENTER_POS: usize = 8;

/// The "Go to date" dialog, opened from the header's title & search buttons
/// or with `g`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct GoTo<'a>(pub(crate) &'a Theme);

impl StatefulWidget for GoTo<'_> {
    type State = GoToState;

    /*
     * .................
     * .┌─ Go to… ────┐.
     * .│             │.
     * .│  YYYY-MM-DD │.
     * .│             │.
     * .│   [ENTER]   │.
     * .└─────────────┘.
     * .................
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let theme = self.0;
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(theme.base).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(" Go to… ")
            .title_alignment(Alignment::Center)
            .style(theme.base)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        state.to_text(theme).render(text_area, buf);
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct GoToState {
    year: [Option<u8>; 4],
    month: [Option<u8>; 2],
    day: [Option<u8>; 2],
    pos: usize,
}

impl GoToState {
    pub(crate) fn new() -> GoToState {
        GoToState::default()
    }

    fn to_text(self, theme: &Theme) -> Text<'static> {
        Text::from_iter([
            Line::styled("", theme.base),
            self.to_line(theme),
            Line::styled("", theme.base),
            // Only the "[ENTER]" text and not its centering padding gets the
            // ready style
            Line::from(Span::styled(
                "[ENTER]",
                if self.pos == ENTER_POS {
                    theme.selected
                } else {
                    theme.muted
                },
            )),
        ])
        .centered()
    }

    fn to_line(self, theme: &Theme) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, (fallback, digits)) in [
            ("Y", self.year.as_slice()),
            ("M", self.month.as_slice()),
            ("D", self.day.as_slice()),
        ]
        .into_iter()
        .enumerate()
        {
            if i > 0 {
                spans.push(Span::styled("-", theme.base));
            }
            for dg in digits {
                spans.push(match dg {
                    Some(d) => Span::styled(d.to_string(), theme.input),
                    None => Span::styled(fallback, theme.muted),
                });
            }
        }
        Line::from_iter(spans)
    }

    fn slot(&mut self, pos: usize) -> Option<&mut Option<u8>> {
        match pos {
            0..4 => self.year.get_mut(pos),
            4..6 => self.month.get_mut(pos - 4),
            6..8 => self.day.get_mut(pos - 6),
            _ => None,
        }
    }

    pub(crate) fn handle_input(&mut self, input: GoToInput) -> GoToOutput {
        match (input, self.pos) {
            (GoToInput::Digit(d), 0..ENTER_POS) => {
                if let Some(slot) = self.slot(self.pos) {
                    *slot = Some(d);
                }
                self.pos += 1;
                GoToOutput::Ok
            }
            (GoToInput::Backspace, 1..) => {
                self.pos -= 1;
                if let Some(slot) = self.slot(self.pos) {
                    *slot = None;
                }
                GoToOutput::Ok
            }
            (GoToInput::Enter, ENTER_POS) => {
                self.date().map_or(GoToOutput::Invalid, GoToOutput::Jump)
            }
            _ => GoToOutput::Invalid,
        }
    }

    fn date(&self) -> Option<Date> {
        let year = i32::try_from(number(&self.year)?).ok()?;
        let month = Month::try_from(u8::try_from(number(&self.month)?).ok()?).ok()?;
        let day = u8::try_from(number(&self.day)?).ok()?;
        Date::from_calendar_date(year, month, day).ok()
    }
}

/// The value of a run of decimal digits, or `None` if any is unset
fn number(digits: &[Option<u8>]) -> Option<u32> {
    digits
        .iter()
        .try_fold(0u32, |acc, d| Some(acc * 10 + u32::from((*d)?)))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum GoToInput {
    Digit(u8),
    Backspace,
    Enter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum GoToOutput {
    Ok,
    Invalid,
    Jump(Date),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::DARK;
    use time::macros::date;

    fn type_digits(state: &mut GoToState, s: &str) {
        for ch in s.chars() {
            let d = ch.to_digit(10).and_then(|d| u8::try_from(d).ok()).unwrap();
            assert_eq!(state.handle_input(GoToInput::Digit(d)), GoToOutput::Ok);
        }
    }

    #[test]
    fn test_jump() {
        let mut state = GoToState::new();
        type_digits(&mut state, "20261231");
        assert_eq!(
            state.handle_input(GoToInput::Enter),
            GoToOutput::Jump(date!(2026 - 12 - 31))
        );
    }

    #[test]
    fn test_incomplete_and_overlong() {
        let mut state = GoToState::new();
        type_digits(&mut state, "2026");
        assert_eq!(state.handle_input(GoToInput::Enter), GoToOutput::Invalid);
        type_digits(&mut state, "0229");
        assert_eq!(state.handle_input(GoToInput::Digit(1)), GoToOutput::Invalid);
        // 2026 is not a leap year
        assert_eq!(state.handle_input(GoToInput::Enter), GoToOutput::Invalid);
        assert_eq!(state.handle_input(GoToInput::Backspace), GoToOutput::Ok);
        assert_eq!(state.handle_input(GoToInput::Backspace), GoToOutput::Ok);
        type_digits(&mut state, "28");
        assert_eq!(
            state.handle_input(GoToInput::Enter),
            GoToOutput::Jump(date!(2026 - 02 - 28))
        );
    }

    #[test]
    fn test_backspace_at_start() {
        let mut state = GoToState::new();
        assert_eq!(state.handle_input(GoToInput::Backspace), GoToOutput::Invalid);
    }

    #[test]
    fn test_render() {
        let mut state = GoToState::new();
        type_digits(&mut state, "202610");
        let area = Rect::new(0, 0, 21, 10);
        let mut buf = Buffer::empty(area);
        GoTo(&DARK).render(area, &mut buf, &mut state);
        let line = (0..area.width)
            .filter_map(|x| buf.cell((x, 4)).map(|c| c.symbol().to_owned()))
            .collect::<String>();
        assert!(line.contains("2026-10-DD"), "{line:?}");
    }
}
