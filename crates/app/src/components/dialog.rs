//! Modal dialogs over `dioxus-primitives`, styled by `main.css`.

use dioxus::prelude::*;
use dioxus_primitives::alert_dialog as alert;
use dioxus_primitives::dialog as prim;

#[component]
pub fn DialogRoot(mut props: prim::DialogRootProps) -> Element {
    props
        .attributes
        .push(Attribute::new("class", "dialog-backdrop", None, false));

    rsx! {
        prim::DialogRoot { ..props }
    }
}

#[component]
pub fn DialogContent(mut props: prim::DialogContentProps) -> Element {
    if props.class.is_none() {
        props.class = Some("dialog".to_string());
    }

    rsx! {
        prim::DialogContent { ..props }
    }
}

#[component]
pub fn DialogTitle(mut props: prim::DialogTitleProps) -> Element {
    props
        .attributes
        .push(Attribute::new("class", "dialog-title", None, false));

    rsx! {
        prim::DialogTitle { ..props }
    }
}

#[component]
pub fn DialogDescription(mut props: prim::DialogDescriptionProps) -> Element {
    props
        .attributes
        .push(Attribute::new("class", "dialog-description", None, false));

    rsx! {
        prim::DialogDescription { ..props }
    }
}

/// Confirmation for destructive actions.
#[component]
pub fn AlertDialogRoot(mut props: alert::AlertDialogRootProps) -> Element {
    props
        .attributes
        .push(Attribute::new("class", "dialog-backdrop", None, false));

    rsx! {
        alert::AlertDialogRoot { ..props }
    }
}

#[component]
pub fn AlertDialogContent(mut props: alert::AlertDialogContentProps) -> Element {
    if props.class.is_none() {
        props.class = Some("dialog".to_string());
    }

    rsx! {
        alert::AlertDialogContent { ..props }
    }
}

#[component]
pub fn AlertDialogTitle(mut props: alert::AlertDialogTitleProps) -> Element {
    props
        .attributes
        .push(Attribute::new("class", "dialog-title", None, false));

    rsx! {
        alert::AlertDialogTitle { ..props }
    }
}

#[component]
pub fn AlertDialogDescription(mut props: alert::AlertDialogDescriptionProps) -> Element {
    props
        .attributes
        .push(Attribute::new("class", "dialog-description", None, false));

    rsx! {
        alert::AlertDialogDescription { ..props }
    }
}

#[component]
pub fn AlertDialogActions(mut props: alert::AlertDialogActionsProps) -> Element {
    props
        .attributes
        .push(Attribute::new("class", "dialog-actions", None, false));

    rsx! {
        alert::AlertDialogActions { ..props }
    }
}

#[component]
pub fn AlertDialogAction(mut props: alert::AlertDialogActionProps) -> Element {
    props
        .attributes
        .push(Attribute::new("class", "button button-danger", None, false));

    rsx! {
        alert::AlertDialogAction { ..props }
    }
}

#[component]
pub fn AlertDialogCancel(mut props: alert::AlertDialogCancelProps) -> Element {
    props
        .attributes
        .push(Attribute::new("class", "button button-ghost", None, false));

    rsx! {
        alert::AlertDialogCancel { ..props }
    }
}
