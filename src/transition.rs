use std::time::{Duration, Instant};

/// Length of a slide marker when nothing has been coalesced
pub(crate) const BASE_WINDOW: Duration = Duration::from_millis(250);

/// Added to the next window each time a request is coalesced
pub(crate) const WINDOW_STEP: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Direction {
    Previous,
    Next,
}

impl Direction {
    fn opposite(self) -> Direction {
        match self {
            Direction::Previous => Direction::Next,
            Direction::Next => Direction::Previous,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Slide {
    Idle,
    Cooling { until: Instant },
}

/// What became of a transition request
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Admission {
    /// A slide marker was set for this long
    Animated(Duration),
    /// A marker in the same direction was still showing; only the period
    /// change goes through
    Coalesced,
}

/// Rate-limits the slide effect shown when stepping between periods.
///
/// Holding down a navigation key keeps the marker of that direction alive:
/// every request arriving while it shows is coalesced and lengthens the
/// window of the next marker by [`WINDOW_STEP`].  The first request let
/// through sets a marker for the accumulated window and resets it to
/// [`BASE_WINDOW`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TransitionGate {
    previous: Slide,
    next: Slide,
    window: Duration,
}

impl TransitionGate {
    pub(crate) fn new() -> TransitionGate {
        TransitionGate {
            previous: Slide::Idle,
            next: Slide::Idle,
            window: BASE_WINDOW,
        }
    }

    pub(crate) fn request(&mut self, direction: Direction, now: Instant) -> Admission {
        *self.slide_mut(direction.opposite()) = Slide::Idle;
        if self.is_active(direction, now) {
            self.window += WINDOW_STEP;
            Admission::Coalesced
        } else {
            let window = self.window;
            *self.slide_mut(direction) = Slide::Cooling {
                until: now + window,
            };
            self.window = BASE_WINDOW;
            Admission::Animated(window)
        }
    }

    /// Whether the marker for `direction` is showing at `now`
    pub(crate) fn is_active(&self, direction: Direction, now: Instant) -> bool {
        match self.slide(direction) {
            Slide::Idle => false,
            Slide::Cooling { until } => now < until,
        }
    }

    /// The direction whose marker is showing, if any
    pub(crate) fn active(&self, now: Instant) -> Option<Direction> {
        [Direction::Previous, Direction::Next]
            .into_iter()
            .find(|&d| self.is_active(d, now))
    }

    /// Drop both markers, as happens when the view is replaced
    pub(crate) fn clear(&mut self) {
        self.previous = Slide::Idle;
        self.next = Slide::Idle;
    }

    fn slide(&self, direction: Direction) -> Slide {
        match direction {
            Direction::Previous => self.previous,
            Direction::Next => self.next,
        }
    }

    fn slide_mut(&mut self, direction: Direction) -> &mut Slide {
        match direction {
            Direction::Previous => &mut self.previous,
            Direction::Next => &mut self.next,
        }
    }
}

impl Default for TransitionGate {
    fn default() -> TransitionGate {
        TransitionGate::new()
    }
}
