use crate::context::View;
use crate::throttle::{Throttle, INPUT_INTERVAL};
use crossterm::event::{KeyCode, KeyModifiers};
use std::time::Instant;

/// Something the user asked the calendar to do, independent of whether it
/// came from the keyboard or the header
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Intent {
    ShowView(View),
    ToggleSidebar,
    OpenForm,
    ToggleViewMenu,
    Previous,
    Next,
    Today,
    OpenConfigMenu,
    ShowShortcuts,
    CycleColorScheme,
    OpenGoTo,
    Optimize,
    Quit,
}

/// The global single-key shortcut table.  Letters are matched without
/// regard to case.
pub(crate) fn intent_for_key(code: KeyCode) -> Option<Intent> {
    let KeyCode::Char(c) = code else {
        return (code == KeyCode::Esc).then_some(Intent::Quit);
    };
    match c.to_ascii_lowercase() {
        'd' | '1' => Some(Intent::ShowView(View::Day)),
        'w' | '2' => Some(Intent::ShowView(View::Week)),
        'm' | '3' => Some(Intent::ShowView(View::Month)),
        'y' | '4' => Some(Intent::ShowView(View::Year)),
        'l' | '5' => Some(Intent::ShowView(View::List)),
        's' => Some(Intent::ToggleSidebar),
        'f' => Some(Intent::OpenForm),
        'v' => Some(Intent::ToggleViewMenu),
        'p' => Some(Intent::Previous),
        'n' => Some(Intent::Next),
        't' => Some(Intent::Today),
        'a' => Some(Intent::OpenConfigMenu),
        '?' | '/' => Some(Intent::ShowShortcuts),
        '0' => Some(Intent::CycleColorScheme),
        'g' => Some(Intent::OpenGoTo),
        'o' => Some(Intent::Optimize),
        'q' => Some(Intent::Quit),
        _ => None,
    }
}

/// Gatekeeper for global shortcuts.
///
/// A key is turned into an [`Intent`] only if shortcuts are enabled, no
/// overlay is open, Control is not held, and the throttle admits it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct KeyDispatcher {
    enabled: bool,
    throttle: Throttle,
}

impl KeyDispatcher {
    pub(crate) fn new(enabled: bool) -> KeyDispatcher {
        KeyDispatcher {
            enabled,
            throttle: Throttle::new(INPUT_INTERVAL),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        overlay_open: bool,
        now: Instant,
    ) -> Option<Intent> {
        if !self.enabled || overlay_open || modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        // Every key that gets this far uses up the window, mapped or not
        if !self.throttle.admit(now) {
            return None;
        }
        let intent = intent_for_key(code)?;
        tracing::trace!(?intent, "Dispatching shortcut");
        Some(intent)
    }
}
