// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The evaluation pass.
//!
//! [`run`] walks a snapshot of the registry's handles and, for each live
//! item:
//!
//! 1. remembers the side the item was last seen on;
//! 2. evaluates the modified target against the modified screen, storing the
//!    offset and (while off-screen) the new side;
//! 3. on a rising or falling edge, flips `on_screen`, dispatches the
//!    transition notification, then runs the matching callback;
//! 4. if neither was canceled or stopped, swaps the item's presentation
//!    classes;
//! 5. dispatches `screenmove` when enabled for the current state.
//!
//! A canceled notification, a [`Propagation::Stop`], or a callback error ends
//! the item's processing for this pass. Errors additionally reach the tracer
//! and [`Surface::callback_failed`]; the pass always moves on to the next
//! item.

use alloc::format;
use alloc::string::String;
use core::hash::Hash;

use kurbo::{Point, Rect};

use crate::host::{DispatchOutcome, ScreenDetail, ScreenEvent, Surface};
use crate::modifier::modify;
use crate::options::Propagation;
use crate::registry::{Registry, TrackedItem};
use crate::side::Side;
use crate::time::HostTime;
use crate::trace::{CallbackFailedEvent, NotificationEvent, PassBeginEvent, PassEndEvent, Tracer};
use crate::visibility::evaluate;

/// What a single pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PassReport {
    /// Items evaluated.
    pub evaluated: u32,
    /// `screenenter` notifications dispatched.
    pub entered: u32,
    /// `screenleave` notifications dispatched.
    pub left: u32,
    /// `screenmove` notifications dispatched.
    pub moved: u32,
    /// Notifications canceled by a listener.
    pub canceled: u32,
    /// Callbacks that returned [`Propagation::Stop`].
    pub stopped: u32,
    /// Callbacks that returned an error.
    pub failed: u32,
}

/// Runs one pass over every item currently in `registry`.
pub fn run<S>(
    registry: &mut Registry<S::Element, S::Data>,
    surface: &mut S,
    pass_index: u64,
    now: HostTime,
    tracer: &mut Tracer<'_>,
) -> PassReport
where
    S: Surface + ?Sized,
    S::Element: Clone + Eq + Hash,
    S::Data: Clone,
{
    let ids = registry.snapshot();
    let viewport = surface.viewport();
    let screen_base = Rect::from_origin_size(Point::ORIGIN, viewport);

    tracer.pass_begin(&PassBeginEvent {
        pass_index,
        timestamp: now,
        items: ids.len(),
        viewport,
    });

    let mut pass = Pass {
        surface,
        tracer,
        pass_index,
        report: PassReport::default(),
    };

    for id in ids {
        if let Some(item) = registry.get_mut(id) {
            pass.process(item, screen_base);
        }
    }

    let report = pass.report;
    pass.tracer.pass_end(&PassEndEvent {
        pass_index,
        timestamp: now,
        report,
    });
    report
}

struct Pass<'p, 't, S: ?Sized> {
    surface: &'p mut S,
    tracer: &'p mut Tracer<'t>,
    pass_index: u64,
    report: PassReport,
}

impl<S> Pass<'_, '_, S>
where
    S: Surface + ?Sized,
    S::Data: Clone,
{
    fn process(&mut self, item: &mut TrackedItem<S::Element, S::Data>, screen_base: Rect) {
        let side_before = item.side;
        let screen = modify(screen_base, &item.options.screen);
        let target = modify(self.surface.bounds(&item.element), &item.options.target);
        let verdict = evaluate(&screen, &target);
        self.report.evaluated += 1;

        #[cfg(feature = "trace-rich")]
        self.tracer.item_verdict(&crate::trace::ItemVerdictEvent {
            pass_index: self.pass_index,
            item: item.id,
            side: verdict.side,
            offset: verdict.offset,
        });

        item.offset = verdict.offset;
        if let Some(side) = verdict.side {
            item.side = side;
        }
        let on_screen = verdict.is_on_screen();
        let detail = ScreenDetail {
            side: if on_screen { side_before } else { item.side },
            offset: verdict.offset,
            data: item.options.data.clone(),
        };

        let transition = match (on_screen, item.on_screen) {
            (true, false) => Some(ScreenEvent::Enter),
            (false, true) => Some(ScreenEvent::Leave),
            _ => None,
        };

        if let Some(event) = transition {
            item.on_screen = on_screen;
            if !self.notify(item, event, &detail) {
                return;
            }
            let class = match event {
                ScreenEvent::Enter => item.options.screen_enter_class.clone(),
                _ => item.options.screen_leave_class.clone(),
            };
            self.swap_classes(item, class, detail.side);
        }

        let options = &item.options;
        if !options.disable_screen_move && (on_screen || options.fire_screen_move_off_screen) {
            self.notify(item, ScreenEvent::Move, &detail);
        }
    }

    /// Dispatches `event` and runs its callback. Returns `false` when the
    /// item's processing should stop.
    fn notify(
        &mut self,
        item: &TrackedItem<S::Element, S::Data>,
        event: ScreenEvent,
        detail: &ScreenDetail<S::Data>,
    ) -> bool {
        match event {
            ScreenEvent::Enter => self.report.entered += 1,
            ScreenEvent::Leave => self.report.left += 1,
            ScreenEvent::Move => self.report.moved += 1,
        }

        let outcome = self.surface.dispatch(&item.element, event, detail);
        self.tracer.notification(&NotificationEvent {
            pass_index: self.pass_index,
            item: item.id,
            event,
            side: detail.side,
            outcome,
        });
        if outcome == DispatchOutcome::Canceled {
            self.report.canceled += 1;
            return false;
        }

        let callback = match event {
            ScreenEvent::Enter => item.options.on_screen_enter.as_ref(),
            ScreenEvent::Leave => item.options.on_screen_leave.as_ref(),
            ScreenEvent::Move => item.options.on_screen_move.as_ref(),
        };
        let Some(callback) = callback else {
            return true;
        };

        match callback(&item.element, detail) {
            Ok(Propagation::Continue) => true,
            Ok(Propagation::Stop) => {
                self.report.stopped += 1;
                false
            }
            Err(err) => {
                self.report.failed += 1;
                self.tracer.callback_failed(&CallbackFailedEvent {
                    pass_index: self.pass_index,
                    item: item.id,
                    event,
                    message: err.message(),
                });
                self.surface.callback_failed(&item.element, event, &err);
                false
            }
        }
    }

    /// Replaces the classes this item applied last time with `class` and
    /// `class--side`.
    fn swap_classes(&mut self, item: &mut TrackedItem<S::Element, S::Data>, class: String, side: Side) {
        let TrackedItem {
            element,
            applied_classes,
            ..
        } = item;
        for old in applied_classes.drain(..) {
            self.surface.remove_class(element, &old);
        }
        let sided = format!("{class}--{side}");
        self.surface.add_class(element, &class);
        self.surface.add_class(element, &sided);
        applied_classes.push(class);
        applied_classes.push(sided);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CallbackError, ItemOptions, callback, try_callback};
    use crate::testing::{MockSurface, Note};
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    type Reg = Registry<u32, &'static str>;

    fn pass(reg: &mut Reg, surface: &mut MockSurface) -> PassReport {
        run(reg, surface, 0, HostTime(0), &mut Tracer::none())
    }

    fn below() -> Rect {
        Rect::new(0.0, 900.0, 100.0, 1000.0)
    }

    fn visible() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    fn above() -> Rect {
        Rect::new(0.0, -200.0, 100.0, -100.0)
    }

    #[test]
    fn entering_from_below_applies_bottom_classes() {
        let mut reg = Reg::new();
        reg.insert(1, ItemOptions::default());
        let mut surface = MockSurface::new(1000.0, 800.0);
        surface.place(1, below());

        let report = pass(&mut reg, &mut surface);
        assert_eq!(report.entered, 0);
        assert!(surface.notes.is_empty(), "off-screen items do not move by default");

        surface.place(1, visible());
        let report = pass(&mut reg, &mut surface);
        assert_eq!(report.entered, 1);
        assert_eq!(surface.notes[0], Note::new(1, ScreenEvent::Enter, Side::Bottom));
        assert_eq!(surface.classes(1), vec!["js-screenenter", "js-screenenter--bottom"]);
        let item = reg.find(&1).unwrap();
        assert!(item.is_on_screen());
        assert_eq!(item.side(), Side::Bottom);
    }

    #[test]
    fn leave_fires_once_and_swaps_to_leave_classes() {
        let mut reg = Reg::new();
        reg.insert(1, ItemOptions::default());
        let mut surface = MockSurface::new(1000.0, 800.0);
        surface.place(1, visible());
        pass(&mut reg, &mut surface);

        surface.place(1, above());
        let report = pass(&mut reg, &mut surface);
        assert_eq!(report.left, 1);
        assert_eq!(surface.classes(1), vec!["js-screenleave", "js-screenleave--top"]);

        surface.notes.clear();
        for _ in 0..3 {
            pass(&mut reg, &mut surface);
        }
        assert!(surface.notes.is_empty(), "no further enter or leave while away");
    }

    #[test]
    fn on_screen_items_move_every_pass() {
        let mut reg = Reg::new();
        reg.insert(1, ItemOptions::default());
        let mut surface = MockSurface::new(1000.0, 800.0);
        surface.place(1, visible());

        pass(&mut reg, &mut surface);
        pass(&mut reg, &mut surface);
        let events: Vec<_> = surface.notes.iter().map(|n| n.event).collect();
        assert_eq!(
            events,
            vec![ScreenEvent::Enter, ScreenEvent::Move, ScreenEvent::Move]
        );
    }

    #[test]
    fn disabled_move_stays_silent() {
        let mut reg = Reg::new();
        reg.insert(
            1,
            ItemOptions {
                disable_screen_move: true,
                ..ItemOptions::default()
            },
        );
        let mut surface = MockSurface::new(1000.0, 800.0);
        surface.place(1, visible());
        let mut moved = 0;
        for _ in 0..10 {
            moved += pass(&mut reg, &mut surface).moved;
        }
        assert_eq!(moved, 0);
        assert_eq!(surface.notes.len(), 1, "only the enter");
    }

    #[test]
    fn off_screen_move_is_opt_in() {
        let mut reg = Reg::new();
        reg.insert(
            1,
            ItemOptions {
                fire_screen_move_off_screen: true,
                ..ItemOptions::default()
            },
        );
        let mut surface = MockSurface::new(1000.0, 800.0);
        surface.place(1, Rect::new(-300.0, 100.0, -200.0, 200.0));
        pass(&mut reg, &mut surface);
        assert_eq!(surface.notes, vec![Note::new(1, ScreenEvent::Move, Side::Left)]);
    }

    #[test]
    fn canceled_enter_keeps_state_but_skips_classes() {
        let mut reg = Reg::new();
        let hits = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&hits);
        reg.insert(
            1,
            ItemOptions {
                on_screen_enter: Some(callback(move |_: &u32, _| {
                    *seen.borrow_mut() += 1;
                    Propagation::Continue
                })),
                ..ItemOptions::default()
            },
        );
        let mut surface = MockSurface::new(1000.0, 800.0);
        surface.place(1, visible());
        surface.cancel(ScreenEvent::Enter);

        let report = pass(&mut reg, &mut surface);
        assert_eq!(report.canceled, 1);
        assert_eq!(report.moved, 0, "cancel ends the item's pass");
        assert_eq!(*hits.borrow(), 0, "callback skipped after cancel");
        assert!(surface.classes(1).is_empty());
        assert!(reg.find(&1).unwrap().is_on_screen());
    }

    #[test]
    fn stop_from_callback_skips_classes_and_move() {
        let mut reg = Reg::new();
        reg.insert(
            1,
            ItemOptions {
                on_screen_enter: Some(callback(|_: &u32, _| Propagation::Stop)),
                ..ItemOptions::default()
            },
        );
        let mut surface = MockSurface::new(1000.0, 800.0);
        surface.place(1, visible());
        let report = pass(&mut reg, &mut surface);
        assert_eq!(report.stopped, 1);
        assert_eq!(report.moved, 0);
        assert!(surface.classes(1).is_empty());
    }

    #[test]
    fn failing_callback_is_isolated_to_its_item() {
        let mut reg = Reg::new();
        reg.insert(
            1,
            ItemOptions {
                on_screen_enter: Some(try_callback(|_: &u32, _| Err(CallbackError::new("boom")))),
                ..ItemOptions::default()
            },
        );
        reg.insert(2, ItemOptions::default());
        let mut surface = MockSurface::new(1000.0, 800.0);
        surface.place(1, visible());
        surface.place(2, visible());

        let report = pass(&mut reg, &mut surface);
        assert_eq!(report.failed, 1);
        assert_eq!(report.entered, 2);
        assert_eq!(surface.failures, vec![(1, String::from("boom"))]);
        assert!(surface.classes(1).is_empty());
        assert_eq!(surface.classes(2), vec!["js-screenenter", "js-screenenter--bottom"]);
    }

    #[test]
    fn callbacks_receive_element_and_data() {
        let mut reg = Reg::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        reg.insert(
            7,
            ItemOptions {
                data: Some("hero"),
                on_screen_move: Some(callback(move |el: &u32, d: &ScreenDetail<&'static str>| {
                    log.borrow_mut().push((*el, d.data));
                    Propagation::Continue
                })),
                ..ItemOptions::default()
            },
        );
        let mut surface = MockSurface::new(1000.0, 800.0);
        surface.place(7, visible());
        pass(&mut reg, &mut surface);
        assert_eq!(*seen.borrow(), vec![(7, Some("hero"))]);
    }

    #[test]
    fn custom_classes_replace_only_what_was_applied() {
        let mut reg = Reg::new();
        reg.insert(
            1,
            ItemOptions {
                screen_enter_class: String::from("in"),
                screen_leave_class: String::from("out"),
                ..ItemOptions::default()
            },
        );
        let mut surface = MockSurface::new(1000.0, 800.0);
        surface.add_class(&1, "keep-me");
        surface.place(1, visible());
        pass(&mut reg, &mut surface);
        surface.place(1, Rect::new(1200.0, 100.0, 1300.0, 200.0));
        pass(&mut reg, &mut surface);
        assert_eq!(surface.classes(1), vec!["keep-me", "out", "out--right"]);
        assert_eq!(
            reg.find(&1).unwrap().applied_classes(),
            ["out", "out--right"]
        );
    }

    #[test]
    fn screen_modifiers_shrink_the_comparison_area() {
        use crate::modifier::{EdgeModifiers, Modifier};
        let mut reg = Reg::new();
        reg.insert(
            1,
            ItemOptions {
                screen: EdgeModifiers {
                    bottom: Modifier::Percent(50.0),
                    ..EdgeModifiers::NONE
                },
                ..ItemOptions::default()
            },
        );
        let mut surface = MockSurface::new(1000.0, 800.0);
        surface.place(1, Rect::new(0.0, 500.0, 100.0, 600.0));
        let report = pass(&mut reg, &mut surface);
        assert_eq!(report.entered, 0);
        assert_eq!(reg.find(&1).unwrap().offset().top, 500.0 / 800.0);
    }
}
