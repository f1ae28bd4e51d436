//! # Editor State
//!
//! The sale-transaction editor and its navigation guard, behind one lock.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>` because:
//! 1. Many commands read or mutate the editor
//! 2. Only one command should mutate it at a time
//! 3. Commands can run concurrently
//!
//! The lock is never held across an `.await`: a command locks, reads or
//! mutates, releases, then talks to the backend, then locks again.
//!
//! ## Guard Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  with_session_mut(|s| ...)                              │
//! │                                                                         │
//! │   ┌──────────────┐   mutate    ┌──────────────┐                         │
//! │   │    Editor    │ ──────────► │ is_dirty()?  │                         │
//! │   └──────────────┘             └──────┬───────┘                         │
//! │                                       │ sync                            │
//! │                                       ▼                                 │
//! │                          ┌────────────────────────┐   watch<bool>       │
//! │                          │ NavigationGuard        │ ──────────────► host│
//! │                          │   <HostHooks>          │  (install/remove    │
//! │                          └────────────────────────┘   interceptors)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::watch;

use kho_core::draft::{Editor, EditorMode, Phase, SaleDraft};
use kho_core::form_data::Directory;
use kho_core::guard::{NavigationGuard, NavigationHooks};
use kho_core::{CoreError, CoreResult, FormField, Money};

/// Tells the host whether its leave interceptors should be active.
///
/// The host subscribes to the receiver returned by [`HostHooks::channel`] and
/// registers its history/unload/link handlers while the value is `true`.
#[derive(Debug)]
pub struct HostHooks {
    tx: watch::Sender<bool>,
}

impl HostHooks {
    pub fn channel() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (HostHooks { tx }, rx)
    }
}

impl NavigationHooks for HostHooks {
    fn install(&mut self) {
        self.tx.send_replace(true);
    }

    fn uninstall(&mut self) {
        self.tx.send_replace(false);
    }
}

/// Editor plus the guard that follows its dirty flag.
pub struct EditorSession {
    pub(crate) editor: Editor,
    pub(crate) navigation: NavigationGuard<HostHooks>,
}

impl EditorSession {
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn view(&self) -> EditorView {
        EditorView::of(self)
    }

    fn sync_guard(&mut self) {
        self.navigation.sync(self.editor.is_dirty());
    }
}

/// What the UI renders after every command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub mode: EditorMode,
    pub draft: SaleDraft,
    pub phase: Phase,
    pub total_amount: Money,
    pub dirty: bool,
    pub error: Option<String>,
    pub highlight: Option<FormField>,
    pub interceptors_installed: bool,
}

impl EditorView {
    fn of(session: &EditorSession) -> Self {
        let editor = &session.editor;
        EditorView {
            mode: editor.mode().clone(),
            draft: editor.draft().clone(),
            phase: editor.phase().clone(),
            total_amount: editor.draft().total_amount(),
            dirty: editor.is_dirty(),
            error: editor.error().map(str::to_string),
            highlight: editor.highlight(),
            interceptors_installed: session.navigation.is_installed(),
        }
    }
}

/// Shared editor state.
pub struct EditorState {
    session: Arc<Mutex<EditorSession>>,
    interceptors: watch::Receiver<bool>,
}

impl EditorState {
    /// A create-mode editor dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        let (hooks, interceptors) = HostHooks::channel();
        EditorState {
            session: Arc::new(Mutex::new(EditorSession {
                editor: Editor::new(today),
                navigation: NavigationGuard::new(hooks),
            })),
            interceptors,
        }
    }

    fn lock(&self) -> MutexGuard<'_, EditorSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Executes a function with read access to the session.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&EditorSession) -> R,
    {
        let session = self.lock();
        f(&session)
    }

    /// Executes a function with write access; the guard follows the
    /// editor's dirty flag afterwards, whatever `f` returned.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut EditorSession) -> R,
    {
        let mut session = self.lock();
        let out = f(&mut session);
        session.sync_guard();
        out
    }

    /// Mutates the editor and returns the resulting view.
    pub fn update<F, T, E>(&self, f: F) -> Result<(T, EditorView), E>
    where
        F: FnOnce(&mut Editor) -> Result<T, E>,
    {
        self.with_session_mut(|s| {
            let out = f(&mut s.editor);
            s.sync_guard();
            out.map(|value| (value, s.view()))
        })
    }

    /// Swaps in a new editor, e.g. one seeded from a stocktake.
    ///
    /// Refused while a save is in flight. The loaded customers and stores
    /// carry over to the new editor.
    pub fn replace(&self, mut editor: Editor) -> CoreResult<EditorView> {
        self.with_session_mut(|s| {
            if let phase @ Phase::Persisting(_) = s.editor.phase() {
                return Err(CoreError::InvalidTransition {
                    phase: phase.name().to_string(),
                    action: "mở phiếu khác".to_string(),
                });
            }
            editor.set_directory(s.editor.directory().clone());
            s.editor = editor;
            s.sync_guard();
            Ok(s.view())
        })
    }

    pub fn view(&self) -> EditorView {
        self.with_session(EditorSession::view)
    }

    /// Customers and stores the summary resolves against.
    pub fn set_directory(&self, directory: Directory) {
        self.with_session_mut(|s| s.editor.set_directory(directory));
    }

    /// Receiver the host watches to install or remove its interceptors.
    pub fn interceptors(&self) -> watch::Receiver<bool> {
        self.interceptors.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kho_core::draft::EditorAction;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn test_interceptors_follow_dirty_flag() {
        let state = EditorState::new(today());
        let rx = state.interceptors();
        assert!(!*rx.borrow());

        let (_, view) = state
            .update(|e| e.dispatch(EditorAction::SetNote("giao sáng".to_string())))
            .unwrap();
        assert!(view.dirty);
        assert!(view.interceptors_installed);
        assert!(*rx.borrow());

        let (_, view) = state
            .update(|e| e.dispatch(EditorAction::SetNote(String::new())))
            .unwrap();
        assert!(!view.dirty);
        assert!(!*rx.borrow());
    }

    #[test]
    fn test_rejected_action_leaves_view_unchanged() {
        let state = EditorState::new(today());
        let before = state.view();
        let result = state.update(|e| e.dispatch(EditorAction::ConfirmSummary));
        assert!(result.is_err());

        let after = state.view();
        assert_eq!(after.draft, before.draft);
        assert!(after.error.is_some());
    }
}
