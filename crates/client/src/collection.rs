//! Optimistic list state for the CRUD views.
//!
//! A change is applied locally first, then the request is sent. Success is
//! followed by a refetch that replaces the list with the server copy.
//! Failure reverts only that change, so mutations that overlap and settle
//! in between are not undone with it.

use std::future::Future;
use std::sync::{Arc, Mutex};

use shared_types::{AppError, Assignment, Notice, Notifier, ResultRecord, User};

/// Anything with a stable identifier.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for User {
    fn key(&self) -> &str {
        self.id()
    }
}

impl Keyed for Assignment {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for ResultRecord {
    fn key(&self) -> &str {
        &self.id
    }
}

/// A local change to a list.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    Insert(T),
    Replace(T),
    Remove(String),
}

/// List contents plus load state.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticList<T> {
    items: Vec<T>,
    loaded: bool,
}

impl<T> Default for OptimisticList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loaded: false,
        }
    }
}

impl<T: Keyed + Clone> OptimisticList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            loaded: true,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.iter().any(|i| i.key() == key)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.iter().find(|i| i.key() == key)
    }

    /// Replace the contents with a server copy.
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.loaded = true;
    }

    /// Apply `change` and return what reverts it.
    pub fn apply(&mut self, change: Change<T>) -> Undo<T> {
        match change {
            Change::Insert(item) => {
                let key = item.key().to_string();
                self.items.push(item);
                Undo::Drop(key)
            }
            Change::Replace(item) => {
                match self.items.iter_mut().find(|i| i.key() == item.key()) {
                    Some(slot) => Undo::PutBack(std::mem::replace(slot, item)),
                    None => Undo::Nothing,
                }
            }
            Change::Remove(key) => match self.items.iter().position(|i| i.key() == key) {
                Some(index) => Undo::Reinsert(index, self.items.remove(index)),
                None => Undo::Nothing,
            },
        }
    }

    /// Revert one earlier [`apply`](Self::apply) against the current items.
    ///
    /// Rows touched by other changes since then are left as they are.
    pub fn revert(&mut self, undo: Undo<T>) {
        match undo {
            Undo::Nothing => {}
            Undo::Drop(key) => self.items.retain(|i| i.key() != key),
            Undo::PutBack(previous) => {
                if let Some(slot) = self.items.iter_mut().find(|i| i.key() == previous.key()) {
                    *slot = previous;
                }
            }
            Undo::Reinsert(index, item) => {
                if !self.contains(item.key()) {
                    let index = index.min(self.items.len());
                    self.items.insert(index, item);
                }
            }
        }
    }
}

/// The inverse of one applied [`Change`].
#[derive(Debug, Clone, PartialEq)]
pub enum Undo<T> {
    Nothing,
    Drop(String),
    PutBack(T),
    Reinsert(usize, T),
}

/// Somewhere an [`OptimisticList`] lives: a UI signal or a mutex in tests.
pub trait ListHandle<T> {
    fn with_mut<R>(&self, f: impl FnOnce(&mut OptimisticList<T>) -> R) -> R;
}

impl<T> ListHandle<T> for Arc<Mutex<OptimisticList<T>>> {
    fn with_mut<R>(&self, f: impl FnOnce(&mut OptimisticList<T>) -> R) -> R {
        match self.lock() {
            Ok(mut list) => f(&mut *list),
            Err(poisoned) => f(&mut *poisoned.into_inner()),
        }
    }
}

/// Run one optimistic mutation.
///
/// `mutation` and `refetch` are lazy futures, polled in that order.
/// A cancelled request stops here with no further list update or notice.
pub async fn run<T, H, N, M, R>(
    list: &H,
    change: Change<T>,
    mutation: M,
    refetch: R,
    notifier: &N,
    success: Notice,
) -> Result<(), AppError>
where
    T: Keyed + Clone,
    H: ListHandle<T>,
    N: Notifier + ?Sized,
    M: Future<Output = Result<(), AppError>>,
    R: Future<Output = Result<Vec<T>, AppError>>,
{
    let undo = list.with_mut(|l| l.apply(change));

    if let Err(err) = mutation.await {
        if err.is_cancelled() {
            return Err(err);
        }
        tracing::warn!(kind = %err.kind, "mutation failed, rolling back");
        list.with_mut(|l| l.revert(undo));
        notifier.report(&err);
        return Err(err);
    }

    notifier.notify(success);

    match refetch.await {
        Ok(fresh) => list.with_mut(|l| l.replace_all(fresh)),
        Err(err) if err.is_cancelled() => {}
        Err(err) => {
            tracing::warn!(kind = %err.kind, "refetch after mutation failed");
            notifier.notify(
                Notice::warning("Saved, but the list could not be refreshed")
                    .with_detail(err.friendly_message()),
            );
        }
    }
    Ok(())
}
