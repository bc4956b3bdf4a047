//! Change notification for store readers.
//!
//! Subscribers register for a set of slices and are called after every
//! action that changed at least one of them.

use std::collections::BTreeSet;

/// Independently observable parts of the application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slice {
    /// Layer sequence and the derived total thickness.
    Layers,
    Surfaces,
    Monitors,
    Project,
    Climate,
    Ui,
    Display,
    Simulation,
    /// Undo/redo availability.
    History,
}

impl Slice {
    pub const ALL: [Slice; 9] = [
        Slice::Layers,
        Slice::Surfaces,
        Slice::Monitors,
        Slice::Project,
        Slice::Climate,
        Slice::Ui,
        Slice::Display,
        Slice::Simulation,
        Slice::History,
    ];
}

/// Notification passed to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    /// Store revision after the action.
    pub revision: u64,
    /// Name of the action that produced the change.
    pub action: &'static str,
    pub slices: BTreeSet<Slice>,
}

impl StateChange {
    pub fn touches(&self, slice: Slice) -> bool {
        self.slices.contains(&slice)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback type for change notifications.
pub type ChangeCallback = Box<dyn FnMut(&StateChange)>;

struct Subscriber {
    id: SubscriptionId,
    slices: BTreeSet<Slice>,
    callback: ChangeCallback,
}

/// Registry of subscribers, owned by the store.
#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    entries: Vec<Subscriber>,
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Subscribers {
    /// Register a callback. An empty slice list subscribes to everything.
    pub fn add(&mut self, slices: &[Slice], callback: ChangeCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let slices = if slices.is_empty() {
            Slice::ALL.into_iter().collect()
        } else {
            slices.iter().copied().collect()
        };
        self.entries.push(Subscriber {
            id,
            slices,
            callback,
        });
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Call every subscriber interested in one of the changed slices.
    pub fn notify(&mut self, change: &StateChange) {
        for subscriber in &mut self.entries {
            if !subscriber.slices.is_disjoint(&change.slices) {
                (subscriber.callback)(change);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn change(slices: &[Slice]) -> StateChange {
        StateChange {
            revision: 1,
            action: "test",
            slices: slices.iter().copied().collect(),
        }
    }

    #[test]
    fn test_notify_filters_by_slice() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = Subscribers::default();

        let sink = Rc::clone(&seen);
        subscribers.add(
            &[Slice::Monitors],
            Box::new(move |c| sink.borrow_mut().push(c.action)),
        );

        subscribers.notify(&change(&[Slice::Layers]));
        assert!(seen.borrow().is_empty());

        subscribers.notify(&change(&[Slice::Layers, Slice::Monitors]));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_empty_slice_list_means_all() {
        let count = Rc::new(RefCell::new(0));
        let mut subscribers = Subscribers::default();
        let sink = Rc::clone(&count);
        subscribers.add(&[], Box::new(move |_| *sink.borrow_mut() += 1));
        subscribers.notify(&change(&[Slice::Simulation]));
        subscribers.notify(&change(&[Slice::Ui]));
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_remove() {
        let mut subscribers = Subscribers::default();
        let id = subscribers.add(&[Slice::Layers], Box::new(|_| {}));
        assert_eq!(subscribers.len(), 1);
        assert!(subscribers.remove(id));
        assert!(!subscribers.remove(id));
        assert!(subscribers.is_empty());
    }
}
