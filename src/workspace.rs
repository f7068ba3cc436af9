//! A tree together with the bookkeeping an interactive front end needs:
//! status feedback for every operation and change notifications for
//! whoever renders the tree.

use std::collections::BTreeMap;
use std::fmt;

use log::info;

use crate::tree::Tree;

/// Result of a workspace operation, displayable as a status message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<K> {
    Inserted(K),
    AlreadyExists(K),
    Deleted(K),
    Found(K),
    NotFound(K),
    BatchInserted { requested: usize, inserted: usize },
    Reset,
}

impl<K> Outcome<K> {
    /// Returns true for the outcomes a user should be warned about.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::AlreadyExists(_) | Outcome::NotFound(_))
    }
}

impl<K: fmt::Display> fmt::Display for Outcome<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Inserted(value) => write!(f, "Inserted {}", value),
            Outcome::AlreadyExists(value) => write!(f, "Value {} already exists!", value),
            Outcome::Deleted(value) => write!(f, "Deleted {}", value),
            Outcome::Found(value) => write!(f, "Value {} found!", value),
            Outcome::NotFound(value) => write!(f, "Value {} not found!", value),
            Outcome::BatchInserted { requested, .. } => write!(f, "Inserted {} elements", requested),
            Outcome::Reset => write!(f, "Tree reset"),
        }
    }
}

/// Notification sent to subscribers after the tree structure changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Values were inserted or removed.
    Changed { revision: u64 },
    /// The tree was replaced by an empty one.
    Reset { revision: u64 },
}

impl Event {
    pub fn revision(&self) -> u64 {
        match *self {
            Event::Changed { revision } | Event::Reset { revision } => revision,
        }
    }
}

/// Handle returned by [`Workspace::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Event)>;

/// Owns a tree and notifies subscribers whenever its structure changes.
///
/// ```
/// use avl_engine::{Outcome, Workspace};
/// let mut workspace = Workspace::new();
/// assert_eq!(workspace.insert(5), Outcome::Inserted(5));
/// assert_eq!(workspace.insert(5).to_string(), "Value 5 already exists!");
/// assert_eq!(workspace.revision(), 1);
/// ```
pub struct Workspace<K: Ord> {
    tree: Tree<K>,
    revision: u64,
    highlighted: Option<K>,
    subscribers: BTreeMap<SubscriptionId, Subscriber>,
    next_subscription: u64,
}

impl<K: Ord + Clone> Workspace<K> {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            revision: 0,
            highlighted: None,
            subscribers: BTreeMap::new(),
            next_subscription: 0,
        }
    }

    /// Returns the tree for read-only traversal.
    pub fn tree(&self) -> &Tree<K> {
        &self.tree
    }

    /// Returns the number of structural changes made so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the value most recently inserted or found, if any.
    pub fn highlighted(&self) -> Option<&K> {
        self.highlighted.as_ref()
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    /// Registers a callback run after every structural change.
    pub fn subscribe<F: FnMut(&Event) + 'static>(&mut self, subscriber: F) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.insert(id, Box::new(subscriber));
        id
    }

    /// Removes a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Inserts a value unless it is already present.
    pub fn insert(&mut self, value: K) -> Outcome<K> {
        if self.tree.contains(&value) {
            return Outcome::AlreadyExists(value);
        }
        self.tree.insert(value.clone());
        info!("inserted a value, {} values in tree", self.tree.len());
        self.highlighted = Some(value.clone());
        self.changed();
        Outcome::Inserted(value)
    }

    /// Removes a value if it is present.
    pub fn delete(&mut self, value: &K) -> Outcome<K> {
        if !self.tree.remove(value) {
            return Outcome::NotFound(value.clone());
        }
        info!("deleted a value, {} values in tree", self.tree.len());
        if self.highlighted.as_ref() == Some(value) {
            self.highlighted = None;
        }
        self.changed();
        Outcome::Deleted(value.clone())
    }

    /// Looks up a value, highlighting it if found. Never changes the tree.
    pub fn search(&mut self, value: &K) -> Outcome<K> {
        if self.tree.contains(value) {
            self.highlighted = Some(value.clone());
            Outcome::Found(value.clone())
        } else {
            self.highlighted = None;
            Outcome::NotFound(value.clone())
        }
    }

    /// Inserts all values in order, skipping the ones already present.
    pub fn insert_batch<I: IntoIterator<Item = K>>(&mut self, values: I) -> Outcome<K> {
        let mut requested = 0;
        let inserted = self.tree.insert_batch(values.into_iter().inspect(|_| requested += 1));
        info!("inserted {} of {} values in batch", inserted, requested);
        if inserted > 0 {
            self.changed();
        }
        Outcome::BatchInserted {
            requested,
            inserted,
        }
    }

    /// Replaces the tree by an empty one.
    pub fn reset(&mut self) -> Outcome<K> {
        self.tree = Tree::new();
        self.highlighted = None;
        self.revision += 1;
        info!("tree reset");
        self.notify(Event::Reset {
            revision: self.revision,
        });
        Outcome::Reset
    }

    fn changed(&mut self) {
        self.revision += 1;
        self.notify(Event::Changed {
            revision: self.revision,
        });
    }

    fn notify(&mut self, event: Event) {
        for subscriber in self.subscribers.values_mut() {
            subscriber(&event);
        }
    }
}

impl<K: Ord + Clone> Default for Workspace<K> {
    fn default() -> Self {
        Self::new()
    }
}
