use ratatui::{
    buffer::Buffer,
    layout::Flex,
    layout::{Alignment, Layout, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

static TEXT: &[&str] = &[
    "d, 1        Day view\n",
    "w, 2        Week view\n",
    "m, 3        Month view\n",
    "y, 4        Year view\n",
    "l, 5        List view\n",
    "p           Previous period\n",
    "n           Next period\n",
    "t           Jump to today\n",
    "g           Go to a date\n",
    "v           View menu\n",
    "s           Toggle sidebar\n",
    "a           Configure courses\n",
    "f           Blockers\n",
    "o           Optimize schedule\n",
    "0           Cycle color scheme\n",
    "?, /        Show this help\n",
    "q, ESC      Quit\n",
    "\n",
    "Press the Any Key to dismiss.\n",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help(pub(crate) Style);

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = TEXT.iter().map(|&s| Line::raw(s)).collect::<Vec<_>>();
        let text = Text::from(lines);
        let height = u16::try_from(text.height())
            .unwrap_or(u16::MAX)
            .min(area.height)
            .saturating_add(2);
        let width = u16::try_from(text.width())
            .unwrap_or(u16::MAX)
            .min(area.width)
            .saturating_add(2);
        let para = Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(" Shortcuts ")
                    .title_alignment(Alignment::Center),
            )
            .style(self.0);
        let [help_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [help_area] = Layout::vertical([height])
            .flex(Flex::Center)
            .areas(help_area);
        let outer_area = Rect {
            x: help_area.x.saturating_sub(1),
            y: help_area.y,
            width: help_area.width.saturating_add(2),
            height: help_area.height,
        }
        .intersection(area);
        Clear.render(outer_area, buf);
        Block::new().style(self.0).render(outer_area, buf);
        para.render(help_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::DARK;

    #[test]
    fn test_help_lists_every_shortcut() {
        let area = Rect::new(0, 0, 60, 24);
        let mut buf = Buffer::empty(area);
        Help(DARK.base).render(area, &mut buf);
        let screen = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_owned()))
                    .collect::<String>()
            })
            .collect::<Vec<_>>();
        assert!(screen.iter().any(|row| row.contains("Shortcuts")));
        for key in ["d, 1", "l, 5", "0   ", "?, /", "q, ESC"] {
            assert!(screen.iter().any(|row| row.contains(key)), "{key:?}");
        }
        assert!(screen.iter().any(|row| row.contains("Any Key")));
    }
}
