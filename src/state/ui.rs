//! Toast queue and confirmation dialog state

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::debug;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmVariant {
    Danger,
    #[default]
    Primary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOptions {
    pub message: String,
    pub title: String,
    pub confirm_text: String,
    pub cancel_text: String,
    pub variant: ConfirmVariant,
}

impl ConfirmOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            title: "Konfirmasi".to_string(),
            confirm_text: "Ya".to_string(),
            cancel_text: "Batal".to_string(),
            variant: ConfirmVariant::Primary,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = text.into();
        self
    }

    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = text.into();
        self
    }

    pub fn variant(mut self, variant: ConfirmVariant) -> Self {
        self.variant = variant;
        self
    }
}

impl From<&str> for ConfirmOptions {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ConfirmOptions {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

struct PendingConfirm {
    options: ConfirmOptions,
    responder: oneshot::Sender<bool>,
}

#[derive(Default)]
struct UiState {
    toasts: Vec<Toast>,
    next_toast_id: u64,
    confirm: Option<PendingConfirm>,
}

/// Shared handle to the UI state
#[derive(Clone, Default)]
pub struct UiStore {
    state: Arc<Mutex<UiState>>,
}

impl UiStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, UiState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Show a toast that disappears after [`DEFAULT_TOAST_DURATION`]
    pub fn show_toast(&self, message: impl Into<String>, kind: ToastKind) -> u64 {
        self.show_toast_for(message, kind, DEFAULT_TOAST_DURATION)
    }

    /// Show a toast that disappears after `duration`
    ///
    /// Must be called inside a tokio runtime.
    pub fn show_toast_for(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) -> u64 {
        let id = {
            let mut state = self.state();
            state.next_toast_id += 1;
            let id = state.next_toast_id;
            state.toasts.push(Toast { id, message: message.into(), kind });
            id
        };

        let store = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            store.remove_toast(id);
        });

        id
    }

    /// Remove a toast; unknown ids are ignored
    pub fn remove_toast(&self, id: u64) {
        let mut state = self.state();
        if let Some(index) = state.toasts.iter().position(|t| t.id == id) {
            state.toasts.remove(index);
        }
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.state().toasts.clone()
    }

    /// Open the confirmation dialog and wait for the answer
    ///
    /// Opening a new dialog while one is pending answers the older one with `false`.
    pub async fn confirm(&self, options: impl Into<ConfirmOptions>) -> bool {
        let (responder, answer) = oneshot::channel();
        {
            let mut state = self.state();
            let pending = PendingConfirm { options: options.into(), responder };
            if let Some(previous) = state.confirm.replace(pending) {
                debug!("Superseding pending confirmation");
                let _ = previous.responder.send(false);
            }
        }

        answer.await.unwrap_or(false)
    }

    /// Answer the open dialog
    pub fn handle_confirm(&self, result: bool) {
        if let Some(pending) = self.state().confirm.take() {
            let _ = pending.responder.send(result);
        }
    }

    pub fn is_confirm_open(&self) -> bool {
        self.state().confirm.is_some()
    }

    pub fn confirm_options(&self) -> Option<ConfirmOptions> {
        self.state().confirm.as_ref().map(|p| p.options.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_toast_ids_start_at_one_and_expire() {
        let ui = UiStore::new();
        let first = ui.show_toast("Tersimpan", ToastKind::Success);
        let second = ui.show_toast_for("Gagal", ToastKind::Error, Duration::from_millis(10_000));
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(ui.toasts().len(), 2);

        tokio::time::sleep(Duration::from_millis(3001)).await;
        let remaining = ui.toasts();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, 2);

        tokio::time::sleep(Duration::from_millis(7000)).await;
        assert!(ui.toasts().is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_toast_is_ignored() {
        let ui = UiStore::new();
        ui.show_toast("Halo", ToastKind::default());
        ui.remove_toast(42);
        assert_eq!(ui.toasts().len(), 1);
        assert_eq!(ui.toasts()[0].kind, ToastKind::Info);
    }

    #[tokio::test]
    async fn test_confirm_defaults_and_answer() {
        let ui = UiStore::new();
        let waiter = {
            let ui = ui.clone();
            tokio::spawn(async move { ui.confirm("Hapus voting ini?").await })
        };

        while !ui.is_confirm_open() {
            tokio::task::yield_now().await;
        }
        let options = ui.confirm_options().unwrap();
        assert_eq!(options.title, "Konfirmasi");
        assert_eq!(options.confirm_text, "Ya");
        assert_eq!(options.cancel_text, "Batal");
        assert_eq!(options.variant, ConfirmVariant::Primary);

        ui.handle_confirm(true);
        assert!(waiter.await.unwrap());
        assert!(!ui.is_confirm_open());
    }

    #[tokio::test]
    async fn test_new_confirm_resolves_previous_as_false() {
        let ui = UiStore::new();
        let first = {
            let ui = ui.clone();
            tokio::spawn(async move { ui.confirm("Pertama").await })
        };
        while !ui.is_confirm_open() {
            tokio::task::yield_now().await;
        }

        let second = {
            let ui = ui.clone();
            tokio::spawn(async move {
                ui.confirm(ConfirmOptions::new("Kedua").variant(ConfirmVariant::Danger)).await
            })
        };

        assert!(!first.await.unwrap());
        while ui.confirm_options().map(|o| o.message) != Some("Kedua".to_string()) {
            tokio::task::yield_now().await;
        }
        ui.handle_confirm(true);
        assert!(second.await.unwrap());
    }
}
