use std::future::Future;
use std::rc::Rc;

use client::cancel::ScopeGuard;
use client::{FetchScope, Keyed, ListHandle, OptimisticList};
use dioxus::prelude::*;
use shared_types::{AppError, Notifier};

use crate::notify::use_toasts;

/// A fetch scope tied to the calling component. It is cancelled when the
/// component unmounts, so late responses never write into dropped state.
pub fn use_fetch_scope() -> FetchScope {
    let guard = use_hook(|| Rc::new(ScopeGuard::new(FetchScope::new())));
    guard.scope().clone()
}

/// An [`OptimisticList`] held in a component signal.
pub struct ListSignal<T: 'static>(pub Signal<OptimisticList<T>>);

impl<T: 'static> Clone for ListSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for ListSignal<T> {}

impl<T: 'static> ListHandle<T> for ListSignal<T> {
    fn with_mut<R>(&self, f: impl FnOnce(&mut OptimisticList<T>) -> R) -> R {
        let mut signal = self.0;
        let mut list = signal.write();
        f(&mut *list)
    }
}

impl<T: Keyed + Clone + 'static> ListSignal<T> {
    /// Current items, cloned out of the signal.
    pub fn items(&self) -> Vec<T> {
        self.0.read().items().to_vec()
    }

    pub fn is_loaded(&self) -> bool {
        self.0.read().is_loaded()
    }
}

pub fn use_list<T: 'static>() -> ListSignal<T> {
    ListSignal(use_signal(OptimisticList::default))
}

/// Fill `list` from `fetch` once, when the component mounts.
pub fn use_initial_load<T, F, Fut>(list: ListSignal<T>, scope: FetchScope, fetch: F)
where
    T: Keyed + Clone + 'static,
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = Result<Vec<T>, AppError>> + 'static,
{
    let toasts = use_toasts();
    use_hook(move || {
        spawn(async move {
            match scope.guard(fetch()).await {
                Ok(items) => list.with_mut(|l| l.replace_all(items)),
                Err(err) if err.is_cancelled() => {}
                Err(err) => {
                    // Stop showing the loading row; the notice explains why.
                    list.with_mut(|l| l.replace_all(Vec::new()));
                    toasts.report(&err);
                }
            }
        })
    });
}
