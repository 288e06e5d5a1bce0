//! Single-threaded current-value subjects.
//!
//! An [`Observable`] holds a value and a list of subscriber callbacks.
//! Delivery is synchronous and in subscription order. A new subscriber
//! immediately receives the current value. Dropping the returned
//! [`Subscription`] detaches the callback.
//!
//! A value sent from inside a callback of the same observable is queued and
//! delivered once the current round has reached every subscriber, so all
//! subscribers see values in the order they were sent.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
    delivering: bool,
    pending: VecDeque<T>,
}

/// Cloneable handle to a shared value that notifies subscribers on change.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                next_id: 0,
                subscribers: Vec::new(),
                delivering: false,
                pending: VecDeque::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Stores `value` and notifies every subscriber.
    ///
    /// Subscribers are snapshotted before each delivery round, so a callback
    /// may send on any observable or drop subscriptions without panicking.
    /// Sends made on this observable during delivery are queued behind the
    /// current round.
    pub fn send(
        &self,
        value: T,
    ) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.value = value.clone();
            if inner.delivering {
                inner.pending.push_back(value);
                return;
            }
            inner.delivering = true;
        }

        let mut next = Some(value);
        while let Some(value) = next {
            let subscribers: Vec<Callback<T>> = self
                .inner
                .borrow()
                .subscribers
                .iter()
                .map(|(_, callback)| Rc::clone(callback))
                .collect();

            for callback in subscribers {
                callback(&value);
            }

            let mut inner = self.inner.borrow_mut();
            next = inner.pending.pop_front();
            if next.is_none() {
                inner.delivering = false;
            }
        }
    }

    /// Registers `callback` and immediately delivers the current value to it.
    pub fn subscribe<F>(
        &self,
        callback: F,
    ) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let callback: Callback<T> = Rc::new(callback);
        let (id, current) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Rc::clone(&callback)));
            (id, inner.value.clone())
        };

        callback(&current);

        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .borrow_mut()
                    .subscribers
                    .retain(|(existing, _)| *existing != id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

/// Keeps a subscriber attached until dropped or cancelled.
#[must_use = "dropping a Subscription detaches the callback immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
