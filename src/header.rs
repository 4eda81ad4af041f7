use crate::shortcuts::Intent;
use crate::theme::Theme;
use crate::transition::Direction;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    text::Span,
    widgets::Widget,
};

/// The clickable parts of the header row
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum HeaderTarget {
    Menu,
    Today,
    Prev,
    Next,
    DateTime,
    Search,
    Configure,
}

impl HeaderTarget {
    fn label(self) -> &'static str {
        match self {
            HeaderTarget::Menu => " ≡ ",
            HeaderTarget::Today => " Today ",
            HeaderTarget::Prev => " ‹ ",
            HeaderTarget::Next => " › ",
            // Drawn separately
            HeaderTarget::DateTime => "",
            HeaderTarget::Search => " Search ",
            HeaderTarget::Configure => " Configure ",
        }
    }

    pub(crate) fn intent(self) -> Intent {
        match self {
            HeaderTarget::Menu => Intent::ToggleSidebar,
            HeaderTarget::Today => Intent::Today,
            HeaderTarget::Prev => Intent::Previous,
            HeaderTarget::Next => Intent::Next,
            HeaderTarget::DateTime | HeaderTarget::Search => Intent::OpenGoTo,
            HeaderTarget::Configure => Intent::OpenConfigMenu,
        }
    }
}

/// Hit regions of the header laid out across `area`, left to right
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct HeaderRegions(Vec<(Rect, HeaderTarget)>);

impl HeaderRegions {
    pub(crate) fn layout(area: Rect, title_width: u16) -> HeaderRegions {
        let mut regions = Vec::new();
        let mut x = area.x;
        let right = area.right();
        let mut place = |x: &mut u16, width: u16, target: HeaderTarget| {
            let width = width.min(right.saturating_sub(*x));
            if width > 0 {
                regions.push((Rect::new(*x, area.y, width, 1), target));
            }
            *x = x.saturating_add(width);
        };
        for (target, gap) in [
            (HeaderTarget::Menu, 1),
            (HeaderTarget::Today, 1),
            (HeaderTarget::Prev, 0),
            (HeaderTarget::Next, 2),
        ] {
            place(&mut x, label_width(target), target);
            x = x.saturating_add(gap);
        }
        // Room for the transition marker on both sides of the title
        place(&mut x, title_width.saturating_add(4), HeaderTarget::DateTime);
        let left_end = x;
        let configure = label_width(HeaderTarget::Configure);
        let search = label_width(HeaderTarget::Search);
        let mut rx = right.saturating_sub(configure + search + 1);
        if rx > left_end {
            place(&mut rx, search, HeaderTarget::Search);
            rx = rx.saturating_add(1);
            place(&mut rx, configure, HeaderTarget::Configure);
        }
        HeaderRegions(regions)
    }

    /// The target under the given cell, if any
    pub(crate) fn target_at(&self, column: u16, row: u16) -> Option<HeaderTarget> {
        let pos = Position::new(column, row);
        self.0
            .iter()
            .find(|(rect, _)| rect.contains(pos))
            .map(|&(_, target)| target)
    }

    pub(crate) fn region_of(&self, target: HeaderTarget) -> Option<Rect> {
        self.0
            .iter()
            .find(|&&(_, t)| t == target)
            .map(|&(rect, _)| rect)
    }

    fn iter(&self) -> impl Iterator<Item = &(Rect, HeaderTarget)> {
        self.0.iter()
    }
}

fn label_width(target: HeaderTarget) -> u16 {
    u16::try_from(Span::raw(target.label()).width()).unwrap_or(u16::MAX)
}

/// The header row: navigation buttons, the period title, and the search &
/// configure buttons
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Header<'a> {
    pub(crate) title: &'a str,
    pub(crate) marker: Option<Direction>,
    pub(crate) theme: &'a Theme,
}

impl Header<'_> {
    pub(crate) fn title_width(&self) -> u16 {
        u16::try_from(Span::raw(self.title).width()).unwrap_or(u16::MAX)
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.base);
        let regions = HeaderRegions::layout(area, self.title_width());
        for &(rect, target) in regions.iter() {
            if target == HeaderTarget::DateTime {
                let (left, right, style) = match self.marker {
                    Some(Direction::Previous) => ("« ", "  ", self.theme.marker),
                    Some(Direction::Next) => ("  ", " »", self.theme.marker),
                    None => ("  ", "  ", self.theme.bold),
                };
                Span::styled(format!("{left}{}{right}", self.title), style).render(rect, buf);
            } else {
                Span::styled(target.label(), self.theme.selected).render(rect, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::DARK;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_owned()))
            .collect()
    }

    #[test]
    fn test_layout() {
        let regions = HeaderRegions::layout(Rect::new(0, 0, 80, 1), 12);
        assert_eq!(regions.target_at(0, 0), Some(HeaderTarget::Menu));
        assert_eq!(regions.target_at(3, 0), None);
        assert_eq!(regions.target_at(4, 0), Some(HeaderTarget::Today));
        assert_eq!(regions.target_at(12, 0), Some(HeaderTarget::Prev));
        assert_eq!(regions.target_at(15, 0), Some(HeaderTarget::Next));
        assert_eq!(regions.target_at(20, 0), Some(HeaderTarget::DateTime));
        assert_eq!(regions.target_at(35, 0), Some(HeaderTarget::DateTime));
        assert_eq!(regions.target_at(40, 0), None);
        assert_eq!(regions.target_at(60, 0), Some(HeaderTarget::Search));
        assert_eq!(regions.target_at(79, 0), Some(HeaderTarget::Configure));
        // Other rows are not part of the header
        assert_eq!(regions.target_at(0, 1), None);
    }

    #[test]
    fn test_narrow_header_drops_right_buttons() {
        let regions = HeaderRegions::layout(Rect::new(0, 0, 40, 1), 12);
        assert_eq!(regions.target_at(39, 0), None);
        assert_eq!(regions.target_at(0, 0), Some(HeaderTarget::Menu));
    }

    #[test]
    fn test_intents() {
        assert_eq!(HeaderTarget::Menu.intent(), Intent::ToggleSidebar);
        assert_eq!(HeaderTarget::Prev.intent(), Intent::Previous);
        assert_eq!(HeaderTarget::Search.intent(), Intent::OpenGoTo);
        assert_eq!(HeaderTarget::DateTime.intent(), Intent::OpenGoTo);
        assert_eq!(HeaderTarget::Configure.intent(), Intent::OpenConfigMenu);
    }

    #[test]
    fn test_render_marker() {
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        Header {
            title: "October 2026",
            marker: Some(Direction::Next),
            theme: &DARK,
        }
        .render(area, &mut buf);
        let text = row_text(&buf, 0);
        assert!(text.contains("Today"), "{text:?}");
        assert!(text.contains("October 2026 »"), "{text:?}");
        assert!(text.contains("Configure"), "{text:?}");
    }
}
