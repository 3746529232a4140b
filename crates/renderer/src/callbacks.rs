/// Handle returned by [`Callbacks::on`]; pass it back to
/// [`Callbacks::off`] to detach the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Typed publish/subscribe registry for one event kind.
///
/// The viewport exposes one registry per named event (`resize`, `render`);
/// there are no dynamic event-name strings. Listeners fire in subscription
/// order. Detaching during teardown must happen before the resources the
/// listener touches are disposed.
pub struct Callbacks<E> {
    next_id: u64,
    entries: Vec<(u64, Box<dyn FnMut(&E)>)>,
}

impl<E> Callbacks<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Registers a listener and returns its detach handle.
    pub fn on(&mut self, listener: impl FnMut(&E) + 'static) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        Subscription(id)
    }

    /// Detaches a listener; returns false if it was already gone.
    pub fn off(&mut self, subscription: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _)| *id != subscription.0);
        self.entries.len() != before
    }

    /// Invokes every registered listener with the event.
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }

    /// Drops every listener at once.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for Callbacks<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_fire_in_subscription_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut callbacks = Callbacks::new();
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            callbacks.on(move |_: &u32| order.borrow_mut().push(tag));
        }
        callbacks.emit(&0);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn off_detaches_exactly_one_listener() {
        let hits = Rc::new(RefCell::new(0));
        let mut callbacks = Callbacks::new();
        let kept = {
            let hits = hits.clone();
            callbacks.on(move |_: &u32| *hits.borrow_mut() += 1)
        };
        let removed = {
            let hits = hits.clone();
            callbacks.on(move |_: &u32| *hits.borrow_mut() += 100)
        };

        assert!(callbacks.off(removed));
        assert!(!callbacks.off(removed), "second off is a no-op");
        callbacks.emit(&0);
        assert_eq!(*hits.borrow(), 1);

        assert!(callbacks.off(kept));
        assert!(callbacks.is_empty());
    }

    #[test]
    fn clear_silences_everyone() {
        let hits = Rc::new(RefCell::new(0));
        let mut callbacks = Callbacks::new();
        for _ in 0..3 {
            let hits = hits.clone();
            callbacks.on(move |_: &u32| *hits.borrow_mut() += 1);
        }
        callbacks.clear();
        callbacks.emit(&0);
        assert_eq!(*hits.borrow(), 0);
        assert_eq!(callbacks.len(), 0);
    }
}
