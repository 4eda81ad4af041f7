use crate::api::parse_time;
use crate::configuration::{hour_minute, Blocker, BlockerId, Configuration, Workday};
use crate::theme::Theme;
use crossterm::event::KeyCode;
use indexmap::IndexMap;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, StatefulWidget, Widget},
};

const FORM_WIDTH: u16 = 40;
const TIME_INPUT_LEN: usize = 5;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Field {
    #[default]
    Weekday,
    From,
    Until,
    Add,
    List,
}

impl Field {
    fn next(self) -> Field {
        match self {
            Field::Weekday => Field::From,
            Field::From => Field::Until,
            Field::Until => Field::Add,
            Field::Add => Field::List,
            Field::List => Field::Weekday,
        }
    }

    fn prev(self) -> Field {
        match self {
            Field::Weekday => Field::List,
            Field::From => Field::Weekday,
            Field::Until => Field::From,
            Field::Add => Field::Until,
            Field::List => Field::Add,
        }
    }
}

/// Entry form for recurring time blockers, listing the blockers already set
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct BlockerForm<'a> {
    pub(crate) blockers: &'a IndexMap<BlockerId, Blocker>,
    pub(crate) theme: &'a Theme,
}

impl StatefulWidget for BlockerForm<'_> {
    type State = BlockerFormState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut BlockerFormState) {
        let theme = self.theme;
        let focus = |field: Field, span: Span<'static>| {
            if state.field == field {
                span.patch_style(theme.focused)
            } else {
                span
            }
        };
        let weekday = Workday::from_index(state.weekday).map_or("", Workday::name);
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Weekday  ", theme.muted),
                focus(Field::Weekday, Span::styled(format!("‹ {weekday:<9} ›"), theme.base)),
            ]),
            Line::from(vec![
                Span::styled("From     ", theme.muted),
                focus(Field::From, Span::styled(format!("{:<5}", state.from), theme.input)),
            ]),
            Line::from(vec![
                Span::styled("Until    ", theme.muted),
                focus(Field::Until, Span::styled(format!("{:<5}", state.until), theme.input)),
            ]),
            Line::from(focus(Field::Add, Span::styled("[ Add ]", theme.bold))),
        ];
        lines.push(match state.error {
            Some(msg) => Line::styled(msg, theme.error),
            None => Line::default(),
        });
        if self.blockers.is_empty() {
            lines.push(Line::styled("No blockers", theme.muted));
        }
        for (i, blocker) in self.blockers.values().enumerate() {
            let text = format!(
                "{:<9} {}–{}",
                blocker.weekday.map_or("Any day", Workday::name),
                hour_minute(blocker.from),
                hour_minute(blocker.until)
            );
            let style = if state.field == Field::List && i == state.cursor {
                theme.selected
            } else {
                theme.base
            };
            lines.push(Line::styled(text, style));
        }
        let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
        let [form_area] = Layout::horizontal([Constraint::Length(FORM_WIDTH)])
            .flex(Flex::Center)
            .areas(area);
        let [form_area] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(form_area);
        Clear.render(form_area, buf);
        Paragraph::new(lines)
            .block(Block::bordered().title(" Blockers "))
            .style(theme.base)
            .render(form_area, buf);
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct BlockerFormState {
    field: Field,
    weekday: usize,
    from: String,
    until: String,
    cursor: usize,
    error: Option<&'static str>,
}

impl BlockerFormState {
    pub(crate) fn new() -> BlockerFormState {
        BlockerFormState::default()
    }

    /// Apply a key press, adding or removing blockers in `config` as asked
    pub(crate) fn handle_key(&mut self, key: KeyCode, config: &mut Configuration) -> FormOutput {
        match (self.field, key) {
            (_, KeyCode::Esc) => FormOutput::Close,
            (_, KeyCode::Tab) => {
                self.field = self.field.next();
                FormOutput::Ok
            }
            (_, KeyCode::BackTab) => {
                self.field = self.field.prev();
                FormOutput::Ok
            }
            (Field::Weekday, KeyCode::Left) => {
                self.weekday = self.weekday.checked_sub(1).unwrap_or(Workday::ALL.len() - 1);
                FormOutput::Ok
            }
            (Field::Weekday, KeyCode::Right) => {
                self.weekday = (self.weekday + 1) % Workday::ALL.len();
                FormOutput::Ok
            }
            (Field::From | Field::Until, KeyCode::Char(c)) if c.is_ascii_digit() || c == ':' => {
                let input = self.input_mut();
                if input.len() < TIME_INPUT_LEN {
                    input.push(c);
                    FormOutput::Ok
                } else {
                    FormOutput::Invalid
                }
            }
            (Field::From | Field::Until, KeyCode::Backspace) => {
                if self.input_mut().pop().is_some() {
                    FormOutput::Ok
                } else {
                    FormOutput::Invalid
                }
            }
            (Field::Weekday | Field::From | Field::Until | Field::Add, KeyCode::Enter) => {
                self.submit(config)
            }
            (Field::List, KeyCode::Up) => {
                self.cursor = self.cursor.saturating_sub(1);
                FormOutput::Ok
            }
            (Field::List, KeyCode::Down) => {
                if self.cursor + 1 < config.blockers().len() {
                    self.cursor += 1;
                }
                FormOutput::Ok
            }
            (Field::List, KeyCode::Delete | KeyCode::Backspace | KeyCode::Char('x')) => {
                let Some(id) = config.blockers().get_index(self.cursor).map(|(id, _)| id.clone())
                else {
                    return FormOutput::Invalid;
                };
                config.remove_blocker(&id);
                tracing::info!(%id, "Removed blocker");
                self.cursor = self.cursor.min(config.blockers().len().saturating_sub(1));
                FormOutput::Ok
            }
            _ => FormOutput::Invalid,
        }
    }

    fn input_mut(&mut self) -> &mut String {
        if self.field == Field::Until {
            &mut self.until
        } else {
            &mut self.from
        }
    }

    fn submit(&mut self, config: &mut Configuration) -> FormOutput {
        let (Some(from), Some(until)) = (parse_time(&self.from), parse_time(&self.until)) else {
            self.error = Some("Times must look like HH:MM");
            return FormOutput::Invalid;
        };
        if from >= until {
            self.error = Some("The block must end after it starts");
            return FormOutput::Invalid;
        }
        let id = config.add_blocker(self.weekday, from, until);
        tracing::info!(%id, weekday = self.weekday, %from, %until, "Added blocker");
        self.from.clear();
        self.until.clear();
        self.error = None;
        self.field = Field::Weekday;
        FormOutput::Ok
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FormOutput {
    Ok,
    Invalid,
    Close,
}
