// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Subscriptions to host notifications.
//!
//! The core does not ship an event bus. The host injects one through
//! [`EventSource`], and [`RenderLoop::bind`](crate::render_loop::RenderLoop::bind)
//! registers one [`Subscription`] per [`Topic`]. Each subscription owns a
//! handle to the render loop and forwards matching notifications to
//! [`RenderLoop::handle`](crate::render_loop::RenderLoop::handle).
//!
//! Delivery is synchronous. A subscriber that publishes back into the same
//! render loop while it is handling a notification panics on the `RefCell`
//! borrow; hosts that need chained updates must queue them.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use kurbo::Size;

use crate::layout::LayoutProfile;
use crate::render_loop::RenderLoop;

/// Kind of host change a subscription listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// The entity set (or marker configuration) changed.
    EntitiesChanged,
    /// The current time changed.
    TimeChanged,
    /// The viewport was resized.
    Resized,
}

impl Topic {
    /// All topics, in binding order.
    pub const ALL: [Self; 3] = [Self::EntitiesChanged, Self::TimeChanged, Self::Resized];
}

/// A host change delivered to subscribers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Notification {
    /// The entity set changed.
    EntitiesChanged,
    /// The current time changed.
    TimeChanged,
    /// The viewport was resized.
    Resized {
        /// New viewport size.
        viewport: Size,
        /// Layout profile for the new size.
        profile: LayoutProfile,
    },
}

impl Notification {
    /// Returns the topic this notification is published under.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::EntitiesChanged => Topic::EntitiesChanged,
            Self::TimeChanged => Topic::TimeChanged,
            Self::Resized { .. } => Topic::Resized,
        }
    }
}

/// Handle returned by [`EventSource::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Receives notifications from an [`EventSource`].
pub trait Subscriber {
    /// Delivers one notification.
    fn notify(&self, notification: &Notification);
}

/// Host publish/subscribe interface.
pub trait EventSource {
    /// Registers `subscriber` for `topic`.
    fn subscribe(&self, topic: Topic, subscriber: Box<dyn Subscriber>) -> SubscriptionId;

    /// Removes a subscription. Returns `false` if `id` was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// A render-loop subscription to one topic.
pub struct Subscription {
    topic: Topic,
    target: Rc<RefCell<RenderLoop>>,
}

impl Subscription {
    /// Creates a subscription forwarding `topic` to `target`.
    #[must_use]
    pub fn new(topic: Topic, target: Rc<RefCell<RenderLoop>>) -> Self {
        Self { topic, target }
    }

    /// Returns the subscribed topic.
    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

impl Subscriber for Subscription {
    fn notify(&self, notification: &Notification) {
        if notification.topic() == self.topic {
            self.target.borrow_mut().handle(notification);
        }
    }
}
