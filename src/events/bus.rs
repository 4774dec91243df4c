//! Synchronous publish/subscribe registry.
//!
//! The bus maps an event name to the ordered list of subscriptions for it.
//! [`EventBus::notify`] walks a snapshot of that list taken when the call
//! starts, so handlers may subscribe, unsubscribe and notify again while a
//! dispatch is in flight:
//!
//! - subscriptions added during a dispatch are not called by that dispatch;
//! - subscriptions removed during a dispatch are skipped if not yet reached;
//! - a handler already running further up the stack is skipped for the
//!   nested call.
//!
//! The bus is generic over the context `C` handed to every callback. The
//! engine uses `EventBus<Engine>`; tests can use any plain struct.
//!
//! The handle is a cheap reference-counted clone. Scoped [`Subscription`]s
//! keep a weak reference back to the registry and unsubscribe on drop.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::warn;
use rustc_hash::FxHashMap;

use super::{Event, Sender};

type Callback<C> = Rc<RefCell<Box<dyn FnMut(&Event, Sender, &mut C)>>>;

/// Identifies one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionToken(u64);

struct Entry<C> {
    token: SubscriptionToken,
    filter: Option<Sender>,
    callback: Callback<C>,
}

impl<C> Entry<C> {
    fn accepts(&self, sender: Sender) -> bool {
        self.filter.is_none_or(|filter| filter == sender)
    }
}

struct Registry<C> {
    next_token: u64,
    entries: FxHashMap<Cow<'static, str>, Vec<Entry<C>>>,
}

impl<C> Registry<C> {
    fn is_live(&self, name: &str, token: SubscriptionToken) -> bool {
        self.entries
            .get(name)
            .is_some_and(|list| list.iter().any(|e| e.token == token))
    }

    fn take(&mut self, name: &str, token: SubscriptionToken) -> Option<Entry<C>> {
        let list = self.entries.get_mut(name)?;
        let index = list.iter().position(|e| e.token == token)?;
        let entry = list.remove(index);
        if list.is_empty() {
            self.entries.remove(name);
        }
        Some(entry)
    }
}

/// Handle to an event registry. Clones share the same registry.
pub struct EventBus<C: 'static> {
    registry: Rc<RefCell<Registry<C>>>,
}

impl<C: 'static> Clone for EventBus<C> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<C: 'static> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> fmt::Debug for EventBus<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        let count: usize = registry.entries.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("events", &registry.entries.len())
            .field("subscriptions", &count)
            .finish()
    }
}

impl<C: 'static> EventBus<C> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_token: 0,
                entries: FxHashMap::default(),
            })),
        }
    }

    /// Register `callback` for `event`, optionally only for one sender.
    ///
    /// The subscription is appended, so handlers run in registration order.
    /// It stays registered until [`EventBus::unobserve`] is called with the
    /// returned token.
    pub fn observe<F>(
        &self,
        callback: F,
        event: &Event,
        filter: Option<Sender>,
    ) -> SubscriptionToken
    where
        F: FnMut(&Event, Sender, &mut C) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let token = SubscriptionToken(registry.next_token);
        registry.next_token += 1;
        registry.entries.entry(event.key()).or_default().push(Entry {
            token,
            filter,
            callback: Rc::new(RefCell::new(Box::new(callback))),
        });
        token
    }

    /// Like [`EventBus::observe`], but the registration lives exactly as long
    /// as the returned handle.
    pub fn subscribe<F>(&self, callback: F, event: &Event, filter: Option<Sender>) -> Subscription
    where
        F: FnMut(&Event, Sender, &mut C) + 'static,
    {
        let token = self.observe(callback, event, filter);
        let registry = Rc::downgrade(&self.registry);
        let name = event.key();
        Subscription {
            token,
            release: Some(Box::new(move || release(&registry, &name, token))),
        }
    }

    /// Remove the subscription registered under `token` for `event` and
    /// `filter`. Returns `false` when nothing matched.
    ///
    /// Safe to call from inside a handler.
    pub fn unobserve(
        &self,
        token: SubscriptionToken,
        event: &Event,
        filter: Option<Sender>,
    ) -> bool {
        let removed = {
            let mut registry = self.registry.borrow_mut();
            let matches = registry
                .entries
                .get(event.name())
                .and_then(|list| list.iter().find(|e| e.token == token))
                .is_some_and(|e| e.filter == filter);
            if matches {
                registry.take(event.name(), token)
            } else {
                None
            }
        };
        // The entry (and possibly the closure with its captures) drops here,
        // after the registry borrow is released.
        removed.is_some()
    }

    /// Deliver `event` from `sender` to every matching subscription.
    pub fn notify(&self, ctx: &mut C, event: &Event, sender: Sender) {
        let snapshot: Vec<(SubscriptionToken, Callback<C>)> = {
            let registry = self.registry.borrow();
            match registry.entries.get(event.name()) {
                Some(list) => list
                    .iter()
                    .filter(|e| e.accepts(sender))
                    .map(|e| (e.token, Rc::clone(&e.callback)))
                    .collect(),
                None => return,
            }
        };

        for (token, callback) in snapshot {
            if !self.registry.borrow().is_live(event.name(), token) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(event, sender, ctx),
                Err(_) => warn!("skipping re-entrant delivery of {} to a running handler", event),
            }
        }
    }

    /// Number of subscriptions currently registered for `event`.
    pub fn subscriber_count(&self, event: &Event) -> usize {
        self.registry
            .borrow()
            .entries
            .get(event.name())
            .map_or(0, Vec::len)
    }

    /// Drop every subscription.
    pub fn clear(&self) {
        let drained: Vec<Entry<C>> = {
            let mut registry = self.registry.borrow_mut();
            registry.entries.drain().flat_map(|(_, list)| list).collect()
        };
        drop(drained);
    }
}

fn release<C: 'static>(
    registry: &Weak<RefCell<Registry<C>>>,
    name: &str,
    token: SubscriptionToken,
) {
    let Some(registry) = registry.upgrade() else {
        return;
    };
    let removed = match registry.try_borrow_mut() {
        Ok(mut registry) => registry.take(name, token),
        Err(_) => {
            warn!("subscription {:?} to {} dropped while the bus was borrowed", token, name);
            None
        }
    };
    drop(removed);
}

/// Scoped registration: unsubscribes when dropped.
///
/// Entities keep these next to their components (see
/// [`Entity::hold`](crate::scene::Entity::hold)), so destroying an entity
/// removes every handler registered on its behalf.
pub struct Subscription {
    token: SubscriptionToken,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn token(&self) -> SubscriptionToken {
        self.token
    }

    /// Give up the scope: the registration outlives this handle and must be
    /// removed with [`EventBus::unobserve`].
    pub fn detach(mut self) -> SubscriptionToken {
        self.release = None;
        self.token
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("token", &self.token)
            .field("scoped", &self.release.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}
