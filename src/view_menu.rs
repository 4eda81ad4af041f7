use crate::context::View;
use crate::theme::Theme;
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, StatefulWidget, Widget},
};

const MENU_WIDTH: u16 = 16;

/// Drop-down list of the calendar views, anchored under the header's title
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ViewMenu<'a> {
    pub(crate) theme: &'a Theme,
    /// The view styled as active
    pub(crate) active: View,
}

impl StatefulWidget for ViewMenu<'_> {
    type State = ViewMenuState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut ViewMenuState) {
        let height = u16::try_from(View::ALL.len()).unwrap_or(u16::MAX) + 2;
        let menu_area = Rect {
            width: MENU_WIDTH,
            height,
            ..area
        }
        .intersection(area);
        let lines = View::ALL
            .iter()
            .enumerate()
            .map(|(i, &view)| {
                let mut style = if view == self.active {
                    self.theme.bold
                } else {
                    self.theme.base
                };
                if i == state.cursor {
                    style = style.patch(self.theme.selected);
                }
                let mark = if view == self.active { '•' } else { ' ' };
                Line::from(Span::styled(format!("{mark} {} {view}", i + 1), style))
            })
            .collect::<Vec<_>>();
        Clear.render(menu_area, buf);
        Paragraph::new(lines)
            .block(Block::bordered().title(" View "))
            .style(self.theme.base)
            .render(menu_area, buf);
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct ViewMenuState {
    cursor: usize,
}

impl ViewMenuState {
    /// Open with the cursor on the active view
    pub(crate) fn new(active: View) -> ViewMenuState {
        ViewMenuState {
            cursor: View::ALL.iter().position(|&v| v == active).unwrap_or(0),
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyCode) -> ViewMenuOutput {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.checked_sub(1).unwrap_or(View::ALL.len() - 1);
                ViewMenuOutput::Ok
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = (self.cursor + 1) % View::ALL.len();
                ViewMenuOutput::Ok
            }
            KeyCode::Enter => View::ALL
                .get(self.cursor)
                .map_or(ViewMenuOutput::Invalid, |&v| ViewMenuOutput::Choose(v)),
            KeyCode::Char(c @ '1'..='5') => c
                .to_digit(10)
                .and_then(|d| usize::try_from(d).ok())
                .and_then(|d| View::ALL.get(d - 1))
                .map_or(ViewMenuOutput::Invalid, |&v| ViewMenuOutput::Choose(v)),
            KeyCode::Esc | KeyCode::Char('v' | 'q') => ViewMenuOutput::Close,
            _ => ViewMenuOutput::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ViewMenuOutput {
    Ok,
    Invalid,
    Close,
    Choose(View),
}
