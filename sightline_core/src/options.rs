// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-item options, tracker configuration, and patch merging.
//!
//! Options come in two shapes: a complete value ([`ItemOptions`],
//! [`TrackerConfig`]) and a patch where every field is optional
//! ([`ItemOptionsPatch`], [`TrackerConfigPatch`]). [`Merge`] applies a patch
//! over a complete value:
//!
//! - a field set in the patch replaces the field in the value;
//! - nested modifier groups ([`EdgeModifiersPatch`]) merge edge by edge;
//! - lists (scroll containers) are replaced wholesale, never concatenated.
//!
//! [`Tracker::add_item`](crate::tracker::Tracker::add_item) merges its patch
//! over [`ItemOptions::default`].
//! [`Tracker::update_item`](crate::tracker::Tracker::update_item) takes a
//! complete [`ItemOptions`] and replaces the old one without merging.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::host::ScreenDetail;
use crate::modifier::{EdgeModifiers, EdgeModifiersPatch};

/// Default class applied while an item is on-screen.
pub const DEFAULT_ENTER_CLASS: &str = "js-screenenter";

/// Default class applied while an item is off-screen after having left.
pub const DEFAULT_LEAVE_CLASS: &str = "js-screenleave";

/// Applies a patch over a complete value.
pub trait Merge<Patch> {
    /// Overwrites every field that `patch` sets, recursing into nested
    /// groups.
    fn merge(&mut self, patch: Patch);

    /// By-value form of [`merge`](Self::merge).
    #[must_use]
    fn merged(mut self, patch: Patch) -> Self
    where
        Self: Sized,
    {
        self.merge(patch);
        self
    }
}

impl Merge<EdgeModifiersPatch> for EdgeModifiers {
    fn merge(&mut self, patch: EdgeModifiersPatch) {
        if let Some(top) = patch.top {
            self.top = top;
        }
        if let Some(right) = patch.right {
            self.right = right;
        }
        if let Some(bottom) = patch.bottom {
            self.bottom = bottom;
        }
        if let Some(left) = patch.left {
            self.left = left;
        }
    }
}

/// Whether processing of an item continues after a callback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Propagation {
    /// Carry on with class updates and later notifications.
    #[default]
    Continue,
    /// Skip the remaining effects for this item in this pass.
    Stop,
}

/// A failure reported by a notification callback.
///
/// Failures are isolated to the item whose callback failed; the pass carries
/// on with the next item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    /// Creates an error carrying `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen callback failed: {}", self.message)
    }
}

impl core::error::Error for CallbackError {}

/// A notification callback.
///
/// Invoked with the tracked element (the receiver) and the notification
/// detail. Shared so options stay cheap to clone.
pub type Callback<E, D> = Rc<dyn Fn(&E, &ScreenDetail<D>) -> Result<Propagation, CallbackError>>;

/// Wraps an infallible closure as a [`Callback`].
pub fn callback<E: 'static, D: 'static>(
    f: impl Fn(&E, &ScreenDetail<D>) -> Propagation + 'static,
) -> Callback<E, D> {
    Rc::new(move |element: &E, detail: &ScreenDetail<D>| Ok(f(element, detail)))
}

/// Wraps a fallible closure as a [`Callback`].
pub fn try_callback<E: 'static, D: 'static>(
    f: impl Fn(&E, &ScreenDetail<D>) -> Result<Propagation, CallbackError> + 'static,
) -> Callback<E, D> {
    Rc::new(f)
}

/// Complete options for one tracked item.
pub struct ItemOptions<E, D> {
    /// Modifiers applied to the screen rectangle for this item.
    pub screen: EdgeModifiers,
    /// Modifiers applied to the item's bounding box.
    pub target: EdgeModifiers,
    /// Class prefix applied on enter.
    pub screen_enter_class: String,
    /// Class prefix applied on leave.
    pub screen_leave_class: String,
    /// Called after a `screenenter` notification that was not canceled.
    pub on_screen_enter: Option<Callback<E, D>>,
    /// Called after a `screenleave` notification that was not canceled.
    pub on_screen_leave: Option<Callback<E, D>>,
    /// Called after a `screenmove` notification that was not canceled.
    pub on_screen_move: Option<Callback<E, D>>,
    /// Keep sending `screenmove` while the item is off-screen.
    pub fire_screen_move_off_screen: bool,
    /// Never send `screenmove`.
    pub disable_screen_move: bool,
    /// Payload forwarded in every notification.
    pub data: Option<D>,
}

impl<E, D> Default for ItemOptions<E, D> {
    fn default() -> Self {
        Self {
            screen: EdgeModifiers::NONE,
            target: EdgeModifiers::NONE,
            screen_enter_class: String::from(DEFAULT_ENTER_CLASS),
            screen_leave_class: String::from(DEFAULT_LEAVE_CLASS),
            on_screen_enter: None,
            on_screen_leave: None,
            on_screen_move: None,
            fire_screen_move_off_screen: false,
            disable_screen_move: false,
            data: None,
        }
    }
}

impl<E, D: Clone> Clone for ItemOptions<E, D> {
    fn clone(&self) -> Self {
        Self {
            screen: self.screen,
            target: self.target,
            screen_enter_class: self.screen_enter_class.clone(),
            screen_leave_class: self.screen_leave_class.clone(),
            on_screen_enter: self.on_screen_enter.clone(),
            on_screen_leave: self.on_screen_leave.clone(),
            on_screen_move: self.on_screen_move.clone(),
            fire_screen_move_off_screen: self.fire_screen_move_off_screen,
            disable_screen_move: self.disable_screen_move,
            data: self.data.clone(),
        }
    }
}

impl<E, D: fmt::Debug> fmt::Debug for ItemOptions<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemOptions")
            .field("screen", &self.screen)
            .field("target", &self.target)
            .field("screen_enter_class", &self.screen_enter_class)
            .field("screen_leave_class", &self.screen_leave_class)
            .field("on_screen_enter", &self.on_screen_enter.is_some())
            .field("on_screen_leave", &self.on_screen_leave.is_some())
            .field("on_screen_move", &self.on_screen_move.is_some())
            .field("fire_screen_move_off_screen", &self.fire_screen_move_off_screen)
            .field("disable_screen_move", &self.disable_screen_move)
            .field("data", &self.data)
            .finish()
    }
}

/// A partial [`ItemOptions`].
pub struct ItemOptionsPatch<E, D> {
    /// Per-edge screen modifier overrides.
    pub screen: EdgeModifiersPatch,
    /// Per-edge target modifier overrides.
    pub target: EdgeModifiersPatch,
    /// Replacement enter class.
    pub screen_enter_class: Option<String>,
    /// Replacement leave class.
    pub screen_leave_class: Option<String>,
    /// Enter callback.
    pub on_screen_enter: Option<Callback<E, D>>,
    /// Leave callback.
    pub on_screen_leave: Option<Callback<E, D>>,
    /// Move callback.
    pub on_screen_move: Option<Callback<E, D>>,
    /// Replacement for [`ItemOptions::fire_screen_move_off_screen`].
    pub fire_screen_move_off_screen: Option<bool>,
    /// Replacement for [`ItemOptions::disable_screen_move`].
    pub disable_screen_move: Option<bool>,
    /// Notification payload.
    pub data: Option<D>,
}

impl<E, D> Default for ItemOptionsPatch<E, D> {
    fn default() -> Self {
        Self {
            screen: EdgeModifiersPatch::default(),
            target: EdgeModifiersPatch::default(),
            screen_enter_class: None,
            screen_leave_class: None,
            on_screen_enter: None,
            on_screen_leave: None,
            on_screen_move: None,
            fire_screen_move_off_screen: None,
            disable_screen_move: None,
            data: None,
        }
    }
}

impl<E, D: fmt::Debug> fmt::Debug for ItemOptionsPatch<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemOptionsPatch")
            .field("screen", &self.screen)
            .field("target", &self.target)
            .field("screen_enter_class", &self.screen_enter_class)
            .field("screen_leave_class", &self.screen_leave_class)
            .field("on_screen_enter", &self.on_screen_enter.is_some())
            .field("on_screen_leave", &self.on_screen_leave.is_some())
            .field("on_screen_move", &self.on_screen_move.is_some())
            .field("fire_screen_move_off_screen", &self.fire_screen_move_off_screen)
            .field("disable_screen_move", &self.disable_screen_move)
            .field("data", &self.data)
            .finish()
    }
}

impl<E, D> Merge<ItemOptionsPatch<E, D>> for ItemOptions<E, D> {
    fn merge(&mut self, patch: ItemOptionsPatch<E, D>) {
        self.screen.merge(patch.screen);
        self.target.merge(patch.target);
        if let Some(class) = patch.screen_enter_class {
            self.screen_enter_class = class;
        }
        if let Some(class) = patch.screen_leave_class {
            self.screen_leave_class = class;
        }
        if let Some(cb) = patch.on_screen_enter {
            self.on_screen_enter = Some(cb);
        }
        if let Some(cb) = patch.on_screen_leave {
            self.on_screen_leave = Some(cb);
        }
        if let Some(cb) = patch.on_screen_move {
            self.on_screen_move = Some(cb);
        }
        if let Some(fire) = patch.fire_screen_move_off_screen {
            self.fire_screen_move_off_screen = fire;
        }
        if let Some(disable) = patch.disable_screen_move {
            self.disable_screen_move = disable;
        }
        if let Some(data) = patch.data {
            self.data = Some(data);
        }
    }
}

/// Engine-level configuration: which triggers request passes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerConfig<C> {
    /// Containers whose `scroll` requests a pass.
    pub scroll_containers: Vec<C>,
    /// Subscribe to scrolling on each of [`scroll_containers`](Self::scroll_containers).
    pub scroll: bool,
    /// Subscribe to viewport resizing.
    pub resize: bool,
    /// Subscribe to load completion.
    pub load: bool,
}

impl<C> TrackerConfig<C> {
    /// All triggers enabled, scrolling observed on `scroll_containers`.
    #[must_use]
    pub fn with_containers(scroll_containers: Vec<C>) -> Self {
        Self {
            scroll_containers,
            scroll: true,
            resize: true,
            load: true,
        }
    }
}

/// A partial [`TrackerConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerConfigPatch<C> {
    /// Replaces the default containers entirely.
    pub scroll_containers: Option<Vec<C>>,
    /// Replacement for [`TrackerConfig::scroll`].
    pub scroll: Option<bool>,
    /// Replacement for [`TrackerConfig::resize`].
    pub resize: Option<bool>,
    /// Replacement for [`TrackerConfig::load`].
    pub load: Option<bool>,
}

impl<C> Default for TrackerConfigPatch<C> {
    fn default() -> Self {
        Self {
            scroll_containers: None,
            scroll: None,
            resize: None,
            load: None,
        }
    }
}

impl<C> Merge<TrackerConfigPatch<C>> for TrackerConfig<C> {
    fn merge(&mut self, patch: TrackerConfigPatch<C>) {
        if let Some(containers) = patch.scroll_containers {
            self.scroll_containers = containers;
        }
        if let Some(scroll) = patch.scroll {
            self.scroll = scroll;
        }
        if let Some(resize) = patch.resize {
            self.resize = resize;
        }
        if let Some(load) = patch.load {
            self.load = load;
        }
    }
}
