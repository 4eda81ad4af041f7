use crate::context::ColorScheme;
use ratatui::style::{Color, Modifier, Style};

/// The styles one color scheme draws with
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Theme {
    pub(crate) base: Style,
    pub(crate) bold: Style,
    pub(crate) muted: Style,
    pub(crate) today: Style,
    pub(crate) selected: Style,
    pub(crate) course: Style,
    pub(crate) blocker: Style,
    pub(crate) marker: Style,
    pub(crate) input: Style,
    pub(crate) focused: Style,
    pub(crate) error: Style,
}

const DARK_BASE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const DARK: Theme = Theme {
    base: DARK_BASE,
    bold: DARK_BASE.add_modifier(Modifier::BOLD),
    muted: DARK_BASE.fg(Color::DarkGray),
    today: DARK_BASE.fg(Color::LightYellow).add_modifier(Modifier::BOLD),
    selected: DARK_BASE.add_modifier(Modifier::REVERSED),
    course: Style::new().fg(Color::Black).bg(Color::LightBlue),
    blocker: Style::new().fg(Color::White).bg(Color::DarkGray),
    marker: DARK_BASE.fg(Color::LightCyan).add_modifier(Modifier::BOLD),
    input: DARK_BASE.add_modifier(Modifier::UNDERLINED),
    focused: DARK_BASE.fg(Color::LightCyan),
    error: DARK_BASE.fg(Color::LightRed),
};

const LIGHT_BASE: Style = Style::new().fg(Color::Black).bg(Color::White);

pub(crate) const LIGHT: Theme = Theme {
    base: LIGHT_BASE,
    bold: LIGHT_BASE.add_modifier(Modifier::BOLD),
    muted: LIGHT_BASE.fg(Color::Gray),
    today: LIGHT_BASE.fg(Color::Blue).add_modifier(Modifier::BOLD),
    selected: LIGHT_BASE.add_modifier(Modifier::REVERSED),
    course: Style::new().fg(Color::White).bg(Color::Blue),
    blocker: Style::new().fg(Color::Black).bg(Color::Gray),
    marker: LIGHT_BASE.fg(Color::Magenta).add_modifier(Modifier::BOLD),
    input: LIGHT_BASE.add_modifier(Modifier::UNDERLINED),
    focused: LIGHT_BASE.fg(Color::Blue),
    error: LIGHT_BASE.fg(Color::Red),
};

const CONTRAST_BASE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const CONTRAST: Theme = Theme {
    base: CONTRAST_BASE,
    bold: CONTRAST_BASE.add_modifier(Modifier::BOLD),
    muted: CONTRAST_BASE,
    today: CONTRAST_BASE
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD.union(Modifier::UNDERLINED)),
    selected: CONTRAST_BASE.add_modifier(Modifier::REVERSED),
    course: Style::new()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD),
    blocker: Style::new().fg(Color::Black).bg(Color::White),
    marker: CONTRAST_BASE.fg(Color::Yellow).add_modifier(Modifier::BOLD),
    input: CONTRAST_BASE.add_modifier(Modifier::UNDERLINED),
    focused: CONTRAST_BASE.fg(Color::Yellow),
    error: CONTRAST_BASE.fg(Color::Red).add_modifier(Modifier::BOLD),
};

pub(crate) fn for_scheme(scheme: ColorScheme) -> &'static Theme {
    match scheme {
        ColorScheme::Dark => &DARK,
        ColorScheme::Light => &LIGHT,
        ColorScheme::Contrast => &CONTRAST,
    }
}
