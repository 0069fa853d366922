//! Toast notices raised by views and optimistic mutations.

use dioxus::prelude::*;
use dioxus_primitives::toast as prim;
use dioxus_primitives::toast::ToastOptions;
use shared_types::{Notice, NoticeLevel, Notifier};

/// Handle to the toast provider mounted in `App`. Toasts close on their
/// own after the provider's timeout.
#[derive(Clone, Copy)]
pub struct Toasts(prim::Toasts);

impl Notifier for Toasts {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!(title = %notice.title, "error notice"),
            _ => tracing::debug!(title = %notice.title, "notice"),
        }
        let text = toast_text(&notice);
        match notice.level {
            NoticeLevel::Success => self.0.success(text, ToastOptions::new()),
            NoticeLevel::Info => self.0.info(text, ToastOptions::new()),
            NoticeLevel::Warning => self.0.warning(text, ToastOptions::new()),
            NoticeLevel::Error => self.0.error(text, ToastOptions::new()),
        }
    }
}

/// One line of toast text: the title, then the detail if there is one.
pub fn toast_text(notice: &Notice) -> String {
    match &notice.detail {
        Some(detail) if !detail.is_empty() => format!("{}: {detail}", notice.title),
        _ => notice.title.clone(),
    }
}

pub fn use_toasts() -> Toasts {
    Toasts(prim::use_toast())
}

#[component]
pub fn ToastProvider(props: prim::ToastProviderProps) -> Element {
    rsx! {
        prim::ToastProvider { ..props }
    }
}
