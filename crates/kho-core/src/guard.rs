//! # Unsaved-Changes Guard
//!
//! Decides whether the editor holds edits worth protecting, and drives the
//! host's navigation interceptors from that decision.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  load / save ──► baseline = Snapshot::of(draft)                         │
//! │                                                                         │
//! │  every mutation ──► current = Snapshot::of(draft)                       │
//! │                     dirty   = current != baseline                       │
//! │                                                                         │
//! │  NavigationGuard::sync(dirty)                                           │
//! │     clean ─► dirty   hooks.install()                                    │
//! │     dirty ─► clean   hooks.uninstall()                                  │
//! │     drop             hooks.uninstall() if installed                     │
//! │                                                                         │
//! │  intercept(attempt) while dirty ─► Prompt                               │
//! │     Discard            leave, edits dropped                             │
//! │     Stay               nothing happens                                  │
//! │     SaveDraftThenLeave save as draft, then leave                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The snapshot keeps only what the user can change and what the backend
//! persists. Local line ids, `remain_quantity` and prompt state are left
//! out, so reverting an edit makes the form clean again.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::draft::SaleDraft;
use crate::money::Money;

// =============================================================================
// Snapshot
// =============================================================================

/// One line of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotLine {
    pub product_id: String,
    /// Item-equivalent quantity, so 30 quả and 1 khay compare equal.
    pub quantity: i64,
    pub unit_sale_price: Money,
    pub total: Money,
    pub batch_id: Option<String>,
}

/// Normalized, comparable view of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub customer_id: String,
    pub store_id: String,
    pub note: String,
    pub paid_amount: Money,
    pub detail: Vec<SnapshotLine>,
}

impl Snapshot {
    pub fn of(draft: &SaleDraft) -> Self {
        Snapshot {
            customer_id: draft.customer_id.clone().unwrap_or_default(),
            store_id: draft.store_id.clone().unwrap_or_default(),
            note: draft.note.trim().to_string(),
            paid_amount: draft.paid_amount,
            detail: draft
                .lines
                .iter()
                .map(|line| SnapshotLine {
                    product_id: line.product_id().to_string(),
                    quantity: line.items(),
                    unit_sale_price: line.price(),
                    total: line.total(),
                    batch_id: line.batch_id().map(str::to_string),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Dirty Tracking
// =============================================================================

/// Tracks the dirty flag against a baseline snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnsavedChangesGuard {
    baseline: Snapshot,
    dirty: bool,
}

impl UnsavedChangesGuard {
    pub fn new(baseline: Snapshot) -> Self {
        UnsavedChangesGuard {
            baseline,
            dirty: false,
        }
    }

    /// Recomputes the flag; equal snapshots always mean clean.
    pub fn reconcile(&mut self, current: &Snapshot) -> bool {
        self.dirty = *current != self.baseline;
        self.dirty
    }

    /// Replaces the baseline (after load or save) and clears the flag.
    pub fn rebase(&mut self, baseline: Snapshot) {
        self.baseline = baseline;
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }
}

// =============================================================================
// Navigation Guard
// =============================================================================

/// Host-side interceptors (history listener, `beforeunload`, link
/// click capture).
pub trait NavigationHooks {
    fn install(&mut self);
    fn uninstall(&mut self);
}

/// A way of leaving the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NavigationAttempt {
    Back,
    TabClose,
    LinkClick { href: String },
}

/// The three answers of the leave prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum LeaveChoice {
    Discard,
    Stay,
    SaveDraftThenLeave,
}

impl LeaveChoice {
    pub const ALL: [LeaveChoice; 3] = [
        LeaveChoice::Discard,
        LeaveChoice::Stay,
        LeaveChoice::SaveDraftThenLeave,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LeaveChoice::Discard => "Rời đi, không lưu",
            LeaveChoice::Stay => "Ở lại",
            LeaveChoice::SaveDraftThenLeave => "Lưu nháp rồi rời đi",
        }
    }
}

/// What the host should do with an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum GuardDecision {
    Proceed,
    Prompt { choices: Vec<LeaveChoice> },
}

/// Outcome of answering the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Drop edits and perform the attempt.
    Leave(NavigationAttempt),
    /// Stay on the form.
    Stay,
    /// Save as draft; perform the attempt once the save succeeds.
    SaveDraft(NavigationAttempt),
}

/// Installs the host's interceptors only while the form is dirty.
pub struct NavigationGuard<H: NavigationHooks> {
    hooks: H,
    installed: bool,
    pending: Option<NavigationAttempt>,
}

impl<H: NavigationHooks> NavigationGuard<H> {
    pub fn new(hooks: H) -> Self {
        NavigationGuard {
            hooks,
            installed: false,
            pending: None,
        }
    }

    /// Aligns the installed interceptors with the dirty flag.
    pub fn sync(&mut self, dirty: bool) {
        match (dirty, self.installed) {
            (true, false) => {
                debug!("Installing navigation interceptors");
                self.hooks.install();
                self.installed = true;
            }
            (false, true) => {
                debug!("Removing navigation interceptors");
                self.hooks.uninstall();
                self.installed = false;
                self.pending = None;
            }
            _ => {}
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn pending(&self) -> Option<&NavigationAttempt> {
        self.pending.as_ref()
    }

    /// Called by the host for every attempt to leave.
    pub fn intercept(&mut self, attempt: NavigationAttempt) -> GuardDecision {
        if !self.installed {
            return GuardDecision::Proceed;
        }
        self.pending = Some(attempt);
        GuardDecision::Prompt {
            choices: LeaveChoice::ALL.to_vec(),
        }
    }

    /// Answers the open prompt. `None` when nothing is pending.
    pub fn resolve(&mut self, choice: LeaveChoice) -> Option<Resolution> {
        let attempt = self.pending.take()?;
        Some(match choice {
            LeaveChoice::Discard => {
                self.sync(false);
                Resolution::Leave(attempt)
            }
            LeaveChoice::Stay => Resolution::Stay,
            LeaveChoice::SaveDraftThenLeave => Resolution::SaveDraft(attempt),
        })
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }
}

impl<H: NavigationHooks> Drop for NavigationGuard<H> {
    fn drop(&mut self) {
        if self.installed {
            self.hooks.uninstall();
            self.installed = false;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
