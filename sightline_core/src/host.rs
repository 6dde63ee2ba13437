// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host capability contract.
//!
//! Sightline never touches a display surface directly. Each host (the web
//! backend, a test double, a native toolkit) provides three capabilities:
//!
//! - **Geometry and delivery** ([`Surface`]): reports the viewport size and
//!   element bounds, delivers cancelable notifications, and edits an element's
//!   presentation classes.
//!
//! - **Schedule-once** ([`FrameRequester`]): arranges for
//!   [`Tracker::on_frame`](crate::tracker::Tracker::on_frame) to be called on
//!   the next animation frame.
//!
//! - **Subscribe/unsubscribe** ([`TriggerSource`]): wires scroll, resize and
//!   load events to
//!   [`Tracker::request_pass`](crate::tracker::Tracker::request_pass).
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! // Any trigger (scroll, resize, load, or a manual call):
//! tracker.request_pass(&mut frames);
//!
//! // When the requested frame arrives:
//! tracker.on_frame(now(), &mut surface, &mut Tracer::none());
//! ```

use alloc::vec::Vec;

use kurbo::{Rect, Size};

use crate::options::CallbackError;
use crate::side::Side;
use crate::visibility::Offset;

/// The three notifications an item can receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScreenEvent {
    /// The item started intersecting the screen.
    Enter,
    /// The item stopped intersecting the screen.
    Leave,
    /// The item was evaluated again (on-screen, or off-screen when opted in).
    Move,
}

impl ScreenEvent {
    /// The notification name: `screenenter`, `screenleave` or `screenmove`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Enter => "screenenter",
            Self::Leave => "screenleave",
            Self::Move => "screenmove",
        }
    }
}

/// Payload carried by every notification and passed to callbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreenDetail<D> {
    /// On enter (and on-screen moves): the side the item was last seen on.
    /// On leave (and off-screen moves): the side it is now on.
    pub side: Side,
    /// Offsets from the evaluation that produced this notification.
    pub offset: Offset,
    /// The item's [`data`](crate::options::ItemOptions::data).
    pub data: Option<D>,
}

/// Whether a dispatched notification was canceled by a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// Delivered and not canceled.
    Delivered,
    /// A listener canceled the notification.
    Canceled,
}

/// Geometry queries, notification delivery, and class edits.
pub trait Surface {
    /// Handle of a tracked element.
    type Element;
    /// Notification payload type.
    type Data;

    /// Size of the viewport. The unmodified screen rectangle spans from the
    /// origin to this size.
    fn viewport(&self) -> Size;

    /// Current bounding box of `element` in viewport coordinates.
    fn bounds(&self, element: &Self::Element) -> Rect;

    /// Delivers a cancelable, bubbling notification to `element`.
    fn dispatch(
        &mut self,
        element: &Self::Element,
        event: ScreenEvent,
        detail: &ScreenDetail<Self::Data>,
    ) -> DispatchOutcome;

    /// Adds `class` to `element`.
    fn add_class(&mut self, element: &Self::Element, class: &str);

    /// Removes `class` from `element`.
    fn remove_class(&mut self, element: &Self::Element, class: &str);

    /// Called when a callback for `element` failed. The pass continues with
    /// the next item regardless.
    fn callback_failed(&mut self, element: &Self::Element, event: ScreenEvent, error: &CallbackError) {
        _ = (element, event, error);
    }
}

/// Schedules exactly one upcoming frame callback.
pub trait FrameRequester {
    /// Requests a single frame. The host later calls
    /// [`Tracker::on_frame`](crate::tracker::Tracker::on_frame).
    fn request_frame(&mut self);
}

/// An event source that requests a pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger<C> {
    /// Scrolling of the given container.
    Scroll(C),
    /// Viewport resizing.
    Resize,
    /// Load completion.
    Load,
}

/// Subscribes trigger events to pass requests.
pub trait TriggerSource {
    /// A scrollable surface handle.
    type Container: Clone;
    /// Token returned by [`subscribe`](Self::subscribe), handed back to
    /// [`unsubscribe`](Self::unsubscribe).
    type Subscription;

    /// Containers observed for scrolling when the configuration names none.
    fn default_scroll_containers(&self) -> Vec<Self::Container>;

    /// Starts forwarding `trigger` to the tracker's pass request.
    fn subscribe(&mut self, trigger: Trigger<Self::Container>) -> Self::Subscription;

    /// Stops forwarding a previously subscribed trigger.
    fn unsubscribe(&mut self, subscription: Self::Subscription);
}
