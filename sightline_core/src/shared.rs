// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tracker that its own callbacks may call back into.
//!
//! [`SharedTracker`] keeps a [`Tracker`] behind interior mutability so that
//! item callbacks, trigger listeners and the frame callback can all reach it
//! through a shared handle (typically an `Rc`). A pass holds the tracker for
//! its whole length, so:
//!
//! - `add_item`, `update_item`, `remove_item`, `empty` and `dispose` made
//!   during a pass are queued and applied, in call order, when the pass ends;
//! - a [`request_pass`](SharedTracker::request_pass) made during a pass arms
//!   a fresh pass right after it.
//!
//! An item removed from a callback therefore finishes the running pass, and
//! an item added from a callback is first evaluated by the next one.
//!
//! ```rust,ignore
//! let tracker = Rc::new(SharedTracker::new(config, triggers, frames));
//! tracker.add_item(element, ItemOptionsPatch::default());
//! tracker.request_pass();
//!
//! // from the frame callback:
//! tracker.run_frame(now, &mut surface, &mut Tracer::none());
//! ```

use alloc::vec::Vec;
use core::cell::{Cell, Ref, RefCell};
use core::fmt;
use core::hash::Hash;

use crate::host::{FrameRequester, Surface, TriggerSource};
use crate::options::{ItemOptions, ItemOptionsPatch, TrackerConfigPatch};
use crate::pass::PassReport;
use crate::registry::TrackedItem;
use crate::schedule::ScheduleStats;
use crate::side::Side;
use crate::time::HostTime;
use crate::trace::Tracer;
use crate::tracker::{NoTriggers, Tracker};
use crate::visibility::Offset;

/// A copy of an item's visibility state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemState {
    /// Last published verdict.
    pub on_screen: bool,
    /// Last off-screen side.
    pub side: Side,
    /// Offsets from the latest pass.
    pub offset: Offset,
}

impl<E, D> From<&TrackedItem<E, D>> for ItemState {
    fn from(item: &TrackedItem<E, D>) -> Self {
        Self {
            on_screen: item.is_on_screen(),
            side: item.side(),
            offset: item.offset(),
        }
    }
}

enum Deferred<E, D> {
    Add(E, ItemOptionsPatch<E, D>),
    Update(E, ItemOptions<E, D>),
    Remove(E),
    Empty,
    Dispose,
}

/// A [`Tracker`] that owns its frame requester and trigger source and can be
/// called through a shared reference.
pub struct SharedTracker<E, D, F, T: TriggerSource = NoTriggers> {
    tracker: RefCell<Tracker<E, D, T>>,
    /// `None` once disposed.
    triggers: RefCell<Option<T>>,
    frames: RefCell<F>,
    deferred: RefCell<Vec<Deferred<E, D>>>,
    /// A pass was requested while one was running.
    rerun: Cell<bool>,
}

impl<E, D, F, T: TriggerSource> fmt::Debug for SharedTracker<E, D, F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedTracker")
            .field("tracker", &self.tracker)
            .field("disposed", &self.triggers.try_borrow().is_ok_and(|t| t.is_none()))
            .field("deferred", &self.deferred.borrow().len())
            .field("rerun", &self.rerun.get())
            .finish_non_exhaustive()
    }
}

impl<E: Clone + Eq + Hash, D, F: FrameRequester> SharedTracker<E, D, F, NoTriggers> {
    /// Creates a tracker with no trigger subscriptions.
    #[must_use]
    pub fn detached(frames: F) -> Self {
        Self::new(TrackerConfigPatch::default(), NoTriggers, frames)
    }
}

impl<E: Clone + Eq + Hash, D, F: FrameRequester, T: TriggerSource> SharedTracker<E, D, F, T> {
    /// Creates a tracker, subscribes the configured triggers, and takes
    /// ownership of `triggers` and `frames`.
    pub fn new(config: TrackerConfigPatch<T::Container>, mut triggers: T, frames: F) -> Self {
        let tracker = Tracker::new(config, &mut triggers);
        Self {
            tracker: RefCell::new(tracker),
            triggers: RefCell::new(Some(triggers)),
            frames: RefCell::new(frames),
            deferred: RefCell::new(Vec::new()),
            rerun: Cell::new(false),
        }
    }

    /// Starts tracking `element`.
    ///
    /// Returns its state, or `None` when called during a pass.
    pub fn add_item(&self, element: E, options: ItemOptionsPatch<E, D>) -> Option<ItemState> {
        let Ok(mut tracker) = self.tracker.try_borrow_mut() else {
            self.defer(Deferred::Add(element, options));
            return None;
        };
        Some(ItemState::from(tracker.add_item(element, options)))
    }

    /// Replaces the options of a tracked element.
    ///
    /// Returns `None` for unknown elements and during a pass.
    pub fn update_item(&self, element: &E, options: ItemOptions<E, D>) -> Option<ItemState> {
        let Ok(mut tracker) = self.tracker.try_borrow_mut() else {
            self.defer(Deferred::Update(element.clone(), options));
            return None;
        };
        tracker.update_item(element, options).map(ItemState::from)
    }

    /// Stops tracking `element`.
    pub fn remove_item(&self, element: &E) {
        match self.tracker.try_borrow_mut() {
            Ok(mut tracker) => tracker.remove_item(element),
            Err(_) => self.defer(Deferred::Remove(element.clone())),
        }
    }

    /// Stops tracking every element.
    pub fn empty(&self) {
        match self.tracker.try_borrow_mut() {
            Ok(mut tracker) => tracker.empty(),
            Err(_) => self.defer(Deferred::Empty),
        }
    }

    /// Stops tracking every element, unsubscribes every trigger, and drops
    /// the trigger source.
    pub fn dispose(&self) {
        let Ok(mut tracker) = self.tracker.try_borrow_mut() else {
            self.defer(Deferred::Dispose);
            return;
        };
        match self.triggers.borrow_mut().take() {
            Some(mut triggers) => tracker.dispose(&mut triggers),
            None => tracker.empty(),
        }
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.triggers.borrow().is_none()
    }

    /// Requests a pass on the next frame.
    ///
    /// Returns `true` if this call requested a frame. During a pass the
    /// request is remembered and a frame is requested once the pass ends.
    pub fn request_pass(&self) -> bool {
        match self.tracker.try_borrow_mut() {
            Ok(mut tracker) => tracker.request_pass(&mut *self.frames.borrow_mut()),
            Err(_) => {
                self.rerun.set(true);
                false
            }
        }
    }

    /// Runs a pass, then applies the calls queued during it.
    ///
    /// Returns `None` without running anything when called from inside a
    /// pass.
    pub fn run_frame<S>(&self, now: HostTime, surface: &mut S, tracer: &mut Tracer<'_>) -> Option<PassReport>
    where
        S: Surface<Element = E, Data = D> + ?Sized,
        D: Clone,
    {
        let mut tracker = self.tracker.try_borrow_mut().ok()?;
        let report = tracker.on_frame(now, surface, tracer);
        drop(tracker);

        let deferred = core::mem::take(&mut *self.deferred.borrow_mut());
        for op in deferred {
            self.apply(op);
        }
        if self.rerun.replace(false) {
            self.request_pass();
        }
        Some(report)
    }

    /// The state of `element`, if tracked and not mid-pass.
    #[must_use]
    pub fn item(&self, element: &E) -> Option<ItemState> {
        let tracker = self.tracker.try_borrow().ok()?;
        tracker.item(element).map(ItemState::from)
    }

    /// Number of tracked elements, if not mid-pass.
    #[must_use]
    pub fn tracked_count(&self) -> Option<usize> {
        self.tracker.try_borrow().ok().map(|t| t.len())
    }

    /// The report of the most recent pass, if not mid-pass.
    #[must_use]
    pub fn last_report(&self) -> Option<PassReport> {
        self.tracker.try_borrow().ok()?.last_report()
    }

    /// Batcher counters, if not mid-pass.
    #[must_use]
    pub fn stats(&self) -> Option<ScheduleStats> {
        self.tracker.try_borrow().ok().map(|t| t.stats())
    }

    /// The frame requester.
    #[must_use]
    pub fn frames(&self) -> Ref<'_, F> {
        self.frames.borrow()
    }

    fn defer(&self, op: Deferred<E, D>) {
        self.deferred.borrow_mut().push(op);
    }

    fn apply(&self, op: Deferred<E, D>) {
        match op {
            Deferred::Add(element, options) => {
                self.tracker.borrow_mut().add_item(element, options);
            }
            Deferred::Update(element, options) => {
                self.tracker.borrow_mut().update_item(&element, options);
            }
            Deferred::Remove(element) => self.tracker.borrow_mut().remove_item(&element),
            Deferred::Empty => self.tracker.borrow_mut().empty(),
            Deferred::Dispose => self.dispose(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ScreenEvent;
    use crate::options::{Propagation, callback};
    use crate::testing::{MockFrames, MockSurface, MockTriggers, Note};
    use alloc::rc::{Rc, Weak};
    use alloc::string::String;
    use alloc::vec;
    use kurbo::Rect;

    type Shared = SharedTracker<u32, &'static str, MockFrames, MockTriggers>;

    fn shared() -> Rc<Shared> {
        Rc::new(Shared::new(
            TrackerConfigPatch::default(),
            MockTriggers::default(),
            MockFrames::default(),
        ))
    }

    fn visible(surface: &mut MockSurface, element: u32) {
        surface.place(element, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    /// Options whose enter callback runs `f` against the tracker.
    fn on_enter(
        tracker: &Rc<Shared>,
        f: impl Fn(&Shared) + 'static,
    ) -> ItemOptionsPatch<u32, &'static str> {
        let weak: Weak<Shared> = Rc::downgrade(tracker);
        ItemOptionsPatch {
            disable_screen_move: Some(true),
            on_screen_enter: Some(callback(move |_: &u32, _| {
                if let Some(tracker) = weak.upgrade() {
                    f(&tracker);
                }
                Propagation::Continue
            })),
            ..ItemOptionsPatch::default()
        }
    }

    fn frame(tracker: &Shared, surface: &mut MockSurface) -> Option<PassReport> {
        tracker.run_frame(HostTime(0), surface, &mut Tracer::none())
    }

    #[test]
    fn calls_outside_a_pass_apply_at_once() {
        let tracker = shared();
        let state = tracker.add_item(1, ItemOptionsPatch::default());
        assert_eq!(state.map(|s| s.on_screen), Some(false));
        assert_eq!(tracker.tracked_count(), Some(1));
        assert!(tracker.request_pass());
        assert_eq!(tracker.frames().requested, 1);
    }

    #[test]
    fn removal_from_a_callback_waits_for_the_pass_to_end() {
        let mut surface = MockSurface::new(1000.0, 800.0);
        let tracker = shared();
        let first = on_enter(&tracker, |t| {
            assert_eq!(t.tracked_count(), None, "tracker is held by the pass");
            t.remove_item(&2);
        });
        tracker.add_item(1, first);
        tracker.add_item(2, ItemOptionsPatch::default());
        visible(&mut surface, 1);
        visible(&mut surface, 2);

        let report = frame(&tracker, &mut surface).unwrap();
        assert_eq!(report.evaluated, 2, "the removed item finishes this pass");
        assert_eq!(report.entered, 2);
        assert_eq!(tracker.tracked_count(), Some(1));
        assert!(tracker.item(&2).is_none());

        let report = frame(&tracker, &mut surface).unwrap();
        assert_eq!(report.evaluated, 1);
    }

    #[test]
    fn item_added_from_a_callback_joins_the_next_pass() {
        let mut surface = MockSurface::new(1000.0, 800.0);
        let tracker = shared();
        let first = on_enter(&tracker, |t| {
            assert!(t.add_item(5, ItemOptionsPatch::default()).is_none());
        });
        tracker.add_item(1, first);
        visible(&mut surface, 1);
        visible(&mut surface, 5);

        let report = frame(&tracker, &mut surface).unwrap();
        assert_eq!(report.evaluated, 1);
        assert_eq!(tracker.tracked_count(), Some(2));
        assert_eq!(tracker.item(&5).map(|s| s.on_screen), Some(false));

        let report = frame(&tracker, &mut surface).unwrap();
        assert_eq!(report.entered, 1);
        assert_eq!(
            surface.notes,
            vec![
                Note::new(1, ScreenEvent::Enter, Side::Bottom),
                Note::new(5, ScreenEvent::Enter, Side::Bottom),
            ]
        );
    }

    #[test]
    fn pass_request_from_a_callback_arms_another_frame() {
        let mut surface = MockSurface::new(1000.0, 800.0);
        let tracker = shared();
        let first = on_enter(&tracker, |t| {
            assert!(!t.request_pass());
        });
        tracker.add_item(1, first);
        visible(&mut surface, 1);

        assert!(tracker.request_pass());
        frame(&tracker, &mut surface);
        assert_eq!(tracker.frames().requested, 2);

        // Nothing enters this time, so no further request.
        frame(&tracker, &mut surface);
        assert_eq!(tracker.frames().requested, 2);
    }

    #[test]
    fn dispose_from_a_callback_runs_after_the_pass() {
        let mut surface = MockSurface::new(1000.0, 800.0);
        let tracker = shared();
        let first = on_enter(&tracker, Shared::dispose);
        tracker.add_item(1, first);
        tracker.add_item(2, ItemOptionsPatch::default());
        visible(&mut surface, 1);
        visible(&mut surface, 2);

        let report = frame(&tracker, &mut surface).unwrap();
        assert_eq!(report.entered, 2);
        assert!(tracker.is_disposed());
        assert_eq!(tracker.tracked_count(), Some(0));
        assert!(!tracker.request_pass(), "nothing left to evaluate");
    }

    #[test]
    fn queued_calls_apply_in_call_order() {
        let mut surface = MockSurface::new(1000.0, 800.0);
        let tracker = shared();
        let first = on_enter(&tracker, |t| {
            t.remove_item(&2);
            t.add_item(2, ItemOptionsPatch::default());
            t.update_item(
                &2,
                ItemOptions {
                    screen_enter_class: String::from("updated"),
                    ..ItemOptions::default()
                },
            );
        });
        tracker.add_item(1, first);
        tracker.add_item(2, ItemOptionsPatch::default());
        visible(&mut surface, 1);

        frame(&tracker, &mut surface);
        assert_eq!(tracker.tracked_count(), Some(2));
        assert_eq!(tracker.item(&2).map(|s| s.on_screen), Some(false));

        visible(&mut surface, 2);
        frame(&tracker, &mut surface);
        assert_eq!(surface.classes(2), vec!["updated", "updated--bottom"]);
    }
}
