use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: u64,
    callbacks: Vec<(u64, Callback<T>)>,
}

/// Change listeners for a store. Cloning shares the registry.
pub struct Listeners<T> {
    inner: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                callbacks: Vec::new(),
            })),
        }
    }
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = {
            let mut registry = self.inner.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.callbacks.push((id, Rc::new(callback)));
            id
        };

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().callbacks.retain(|(cb_id, _)| *cb_id != id);
                }
            })),
        }
    }

    /// Calls every listener with `value`. Listeners registered or dropped
    /// while notifying take effect on the next call.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self
            .inner
            .borrow()
            .callbacks
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in snapshot {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unregisters its listener when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::Listeners;

    #[test]
    fn dropping_subscription_stops_notifications() {
        let listeners = Listeners::<u32>::new();
        let seen = Rc::new(Cell::new(0));

        let sub = {
            let seen = Rc::clone(&seen);
            listeners.subscribe(move |v| seen.set(seen.get() + v))
        };
        listeners.notify(&2);
        assert_eq!(seen.get(), 2);

        drop(sub);
        listeners.notify(&5);
        assert_eq!(seen.get(), 2);
        assert!(listeners.is_empty());
    }

    #[test]
    fn listener_may_subscribe_during_notify() {
        let listeners = Listeners::<()>::new();
        let nested = Rc::new(std::cell::RefCell::new(Vec::new()));

        let _outer = {
            let listeners = listeners.clone();
            let nested = Rc::clone(&nested);
            listeners.clone().subscribe(move |()| {
                nested.borrow_mut().push(listeners.subscribe(|()| {}));
            })
        };

        listeners.notify(&());
        assert_eq!(listeners.len(), 2);
    }
}
