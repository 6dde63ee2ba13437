// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The public tracker.
//!
//! [`Tracker`] ties the registry, the batcher and the pass driver together.
//! It holds no host objects: every operation that needs the host takes the
//! relevant capability as an argument.
//!
//! ```rust,ignore
//! let mut tracker = Tracker::new(TrackerConfigPatch::default(), &mut triggers);
//! tracker.add_item(element, ItemOptionsPatch::default());
//!
//! // from a scroll/resize/load listener:
//! tracker.request_pass(&mut frames);
//!
//! // from the frame callback:
//! tracker.on_frame(now, &mut surface, &mut Tracer::none());
//! ```

use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use crate::host::{FrameRequester, Surface, Trigger, TriggerSource};
use crate::options::{ItemOptions, ItemOptionsPatch, Merge, TrackerConfig, TrackerConfigPatch};
use crate::pass::{self, PassReport};
use crate::registry::{ItemId, Registry, TrackedItem};
use crate::schedule::{PassScheduler, ScheduleStats};
use crate::time::HostTime;
use crate::trace::Tracer;

/// A [`TriggerSource`] with nothing to subscribe to.
///
/// Used by trackers whose host calls
/// [`request_pass`](Tracker::request_pass) directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTriggers;

impl TriggerSource for NoTriggers {
    type Container = ();
    type Subscription = ();

    fn default_scroll_containers(&self) -> Vec<()> {
        Vec::new()
    }

    fn subscribe(&mut self, trigger: Trigger<()>) {
        _ = trigger;
    }

    fn unsubscribe(&mut self, subscription: ()) {
        _ = subscription;
    }
}

/// Tracks elements and reports when they enter and leave the screen.
pub struct Tracker<E, D, T: TriggerSource = NoTriggers> {
    registry: Registry<E, D>,
    scheduler: PassScheduler,
    config: TrackerConfig<T::Container>,
    subscriptions: Vec<T::Subscription>,
    last_report: Option<PassReport>,
}

impl<E, D, T: TriggerSource> fmt::Debug for Tracker<E, D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("registry", &self.registry)
            .field("scheduler", &self.scheduler)
            .field("subscriptions", &self.subscriptions.len())
            .field("last_report", &self.last_report)
            .finish_non_exhaustive()
    }
}

impl<E: Clone + Eq + Hash, D> Tracker<E, D, NoTriggers> {
    /// Creates a tracker with no trigger subscriptions.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(TrackerConfigPatch::default(), &mut NoTriggers)
    }
}

impl<E: Clone + Eq + Hash, D, T: TriggerSource> Tracker<E, D, T> {
    /// Creates a tracker and subscribes the configured triggers.
    ///
    /// `config` is merged over the defaults: every trigger enabled, scrolling
    /// observed on `triggers.default_scroll_containers()`.
    pub fn new(config: TrackerConfigPatch<T::Container>, triggers: &mut T) -> Self {
        let config = TrackerConfig::with_containers(triggers.default_scroll_containers()).merged(config);

        let mut subscriptions = Vec::new();
        if config.scroll {
            for container in &config.scroll_containers {
                subscriptions.push(triggers.subscribe(Trigger::Scroll(container.clone())));
            }
        }
        if config.resize {
            subscriptions.push(triggers.subscribe(Trigger::Resize));
        }
        if config.load {
            subscriptions.push(triggers.subscribe(Trigger::Load));
        }

        Self {
            registry: Registry::new(),
            scheduler: PassScheduler::new(),
            config,
            subscriptions,
            last_report: None,
        }
    }

    /// The effective configuration.
    #[must_use]
    pub fn config(&self) -> &TrackerConfig<T::Container> {
        &self.config
    }

    /// Starts tracking `element` with `options` merged over the defaults.
    ///
    /// An element that is already tracked is replaced by a fresh entry. The
    /// classes the old entry applied are removed on the first transition of
    /// the new one.
    pub fn add_item(&mut self, element: E, options: ItemOptionsPatch<E, D>) -> &TrackedItem<E, D> {
        self.registry
            .insert(element, ItemOptions::default().merged(options))
    }

    /// Replaces the options of a tracked element. Visibility state is kept.
    ///
    /// Returns `None` for elements that are not tracked.
    pub fn update_item(&mut self, element: &E, options: ItemOptions<E, D>) -> Option<&TrackedItem<E, D>> {
        self.registry.set_options(element, options)
    }

    /// Stops tracking `element`. Unknown elements are ignored.
    pub fn remove_item(&mut self, element: &E) {
        self.registry.remove(element);
    }

    /// Stops tracking every element. Trigger subscriptions stay active.
    pub fn empty(&mut self) {
        self.registry.clear();
    }

    /// Stops tracking every element and unsubscribes all triggers.
    ///
    /// A frame that is already requested still arrives; its pass finds no
    /// items.
    pub fn dispose(&mut self, triggers: &mut T) {
        self.empty();
        for subscription in self.subscriptions.drain(..) {
            triggers.unsubscribe(subscription);
        }
    }

    /// Whether [`dispose`](Self::dispose) left no live subscriptions.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Requests a pass on the next frame.
    ///
    /// Idempotent while a pass is pending; does nothing while no element is
    /// tracked. Returns `true` if this call requested a frame.
    pub fn request_pass(&mut self, frames: &mut (impl FrameRequester + ?Sized)) -> bool {
        self.scheduler.request(!self.registry.is_empty(), frames)
    }

    /// Whether a requested frame has not arrived yet.
    #[must_use]
    pub fn is_pass_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Runs a pass. Call from the frame callback.
    pub fn on_frame<S>(&mut self, now: HostTime, surface: &mut S, tracer: &mut Tracer<'_>) -> PassReport
    where
        S: Surface<Element = E, Data = D> + ?Sized,
        D: Clone,
    {
        let pass_index = self.scheduler.begin_pass();
        let report = pass::run(&mut self.registry, surface, pass_index, now, tracer);
        self.last_report = Some(report);
        report
    }

    /// The report of the most recent pass.
    #[must_use]
    pub fn last_report(&self) -> Option<PassReport> {
        self.last_report
    }

    /// Batcher counters.
    #[must_use]
    pub fn stats(&self) -> ScheduleStats {
        self.scheduler.stats()
    }

    /// Number of tracked elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` if no element is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// The entry tracking `element`.
    #[must_use]
    pub fn item(&self, element: &E) -> Option<&TrackedItem<E, D>> {
        self.registry.find(element)
    }

    /// The entry behind a handle, unless it went stale.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&TrackedItem<E, D>> {
        self.registry.get(id)
    }

    /// Tracked entries in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &TrackedItem<E, D>> + '_ {
        self.registry.iter()
    }
}
