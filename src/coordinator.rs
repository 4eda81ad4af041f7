use crate::context::{CalendarContext, OutOfTimeError, View};
use crate::transition::{Admission, Direction, TransitionGate};
use std::time::{Duration, Instant};
use time::Date;

/// State changes announced to whoever draws the calendar
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ViewEvent {
    /// A slide marker was set on the view for `window`
    Transition {
        view: View,
        direction: Direction,
        window: Duration,
    },
    /// The view menu should close
    OptionsClosed,
    /// The given view must be redrawn from the context
    Rendered(View),
    /// The view menu should highlight this view
    OptionStyled(View),
    /// The sidebar date picker should show this date
    DatepickerSynced(Date),
}

/// Turns navigation and view-switch intents into context changes, in the
/// fixed order advance → re-render → date picker sync
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Coordinator {
    context: CalendarContext,
    gate: TransitionGate,
    animations: bool,
    events: Vec<ViewEvent>,
}

impl Coordinator {
    pub(crate) fn new(context: CalendarContext, animations: bool) -> Coordinator {
        Coordinator {
            context,
            gate: TransitionGate::new(),
            animations,
            events: Vec::new(),
        }
    }

    pub(crate) fn context(&self) -> &CalendarContext {
        &self.context
    }

    pub(crate) fn context_mut(&mut self) -> &mut CalendarContext {
        &mut self.context
    }

    /// The direction whose slide marker is showing at `now`
    pub(crate) fn marker(&self, now: Instant) -> Option<Direction> {
        if self.animations {
            self.gate.active(now)
        } else {
            None
        }
    }

    /// Hand over everything that happened since the last call
    pub(crate) fn drain_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    /// Step one period backwards or forwards in the active view.  Does
    /// nothing in the list view.
    pub(crate) fn navigate(&mut self, direction: Direction, now: Instant) {
        let view = self.context.view();
        if view == View::List {
            return;
        }
        if self.animations {
            match self.gate.request(direction, now) {
                Admission::Animated(window) => self.events.push(ViewEvent::Transition {
                    view,
                    direction,
                    window,
                }),
                Admission::Coalesced => {
                    tracing::trace!(?direction, "Coalesced transition");
                }
            }
        }
        self.step(view, direction);
    }

    fn step(&mut self, view: View, direction: Direction) {
        let ctx = &mut self.context;
        let r = match (view, direction) {
            (View::Day, Direction::Previous) => ctx.set_prev_day(),
            (View::Day, Direction::Next) => ctx.set_next_day(),
            (View::Week, Direction::Previous) => ctx.set_prev_week(),
            (View::Week, Direction::Next) => ctx.set_next_week(),
            (View::Month, Direction::Previous) => ctx.set_prev_month(),
            (View::Month, Direction::Next) => ctx.set_next_month(),
            (View::Year, Direction::Previous) => ctx.set_prev_year(),
            (View::Year, Direction::Next) => ctx.set_next_year(),
            (View::List, _) => Ok(()),
        };
        if let Err(OutOfTimeError) = r {
            tracing::debug!(?view, ?direction, "Cannot move past the end of time");
            return;
        }
        self.full_render(view);
        if view == View::Day {
            let date = self.context.date();
            self.context.set_date_selected(date);
        }
        self.sync_datepicker();
    }

    /// Switch to `view`.  Asking for the view that is already active does
    /// nothing unless this is the initial render.  Returns whether anything
    /// happened.
    pub(crate) fn render_option(&mut self, view: View, initial_render: bool) -> bool {
        if view == self.context.view() && !initial_render {
            return false;
        }
        tracing::debug!(%view, "Switching view");
        self.events.push(ViewEvent::OptionsClosed);
        self.context.set_view(view);
        self.gate.clear();
        self.full_render(view);
        self.events.push(ViewEvent::OptionStyled(view));
        true
    }

    pub(crate) fn today(&mut self) {
        let today = self.context.today();
        self.jump_to(today);
    }

    pub(crate) fn jump_to(&mut self, date: Date) {
        self.context.set_date(date);
        self.context.set_date_selected(date);
        self.full_render(self.context.view());
        self.sync_datepicker();
    }

    fn full_render(&mut self, view: View) {
        self.events.push(ViewEvent::Rendered(view));
    }

    fn sync_datepicker(&mut self) {
        self.events
            .push(ViewEvent::DatepickerSynced(self.context.date()));
    }
}
