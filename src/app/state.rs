//! App state - pure data structure with no I/O logic

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::constants::NOTIFICATION_TTL_MS;
use crate::messages::ui_events::DialogKind;
use crate::messages::RenderState;
use crate::models::{BlogRecord, FormField, FormState};

/// Where the record list stands relative to the backend
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ListPhase {
    /// Nothing fetched yet, or the last fetch was cancelled
    #[default]
    Idle,
    /// A fetch is in flight; only a response with this id is applied
    Loading { request_id: u64 },
    Loaded,
    /// Last fetch failed; the previous records are still shown
    Failed { message: String },
}

impl ListPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, ListPhase::Loading { .. })
    }
}

/// Create vs. edit
#[derive(Clone, Debug, PartialEq)]
pub enum ComposeMode {
    Create,
    Edit { id: String },
}

impl ComposeMode {
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            ComposeMode::Create => None,
            ComposeMode::Edit { id } => Some(id),
        }
    }
}

/// The create/edit form overlay
#[derive(Clone, Debug, PartialEq)]
pub struct ComposeDialog {
    pub mode: ComposeMode,
    pub form: FormState,
    pub field: FormField,
    /// Byte offset into the focused field
    pub cursor: usize,
    /// Request id of the save sent from this form, if any
    pub submitted: Option<u64>,
}

/// The single overlay shown above the table
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Dialog {
    #[default]
    None,
    Compose(ComposeDialog),
    View(BlogRecord),
    ConfirmDelete { id: String, title: String },
    Help,
}

impl Dialog {
    pub fn kind(&self) -> DialogKind {
        match self {
            Dialog::None => DialogKind::None,
            Dialog::Compose(_) => DialogKind::Compose,
            Dialog::View(_) => DialogKind::View,
            Dialog::ConfirmDelete { .. } => DialogKind::ConfirmDelete,
            Dialog::Help => DialogKind::Help,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Transient toast
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub shown_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        (now - self.shown_at).num_milliseconds() >= NOTIFICATION_TTL_MS
    }
}

/// A create/update in flight
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSave {
    pub request_id: u64,
    pub editing: bool,
}

/// Main application state - pure data, no I/O
pub struct AppState {
    pub backend: String,

    // Mirror of the server collection as of the last completed fetch
    pub records: Vec<BlogRecord>,
    pub list: ListPhase,
    pub selected: usize,

    pub dialog: Dialog,

    // In-flight mutations
    pub pending_save: Option<PendingSave>,
    pub pending_deletes: HashSet<u64>,

    pub notification: Option<Notification>,

    pub next_request_id: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl AppState {
    pub fn new(backend: String) -> Self {
        AppState {
            backend,
            records: Vec::new(),
            list: ListPhase::Idle,
            selected: 0,
            dialog: Dialog::None,
            pending_save: None,
            pending_deletes: HashSet::new(),
            notification: None,
            next_request_id: 1,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn selected_record(&self) -> Option<&BlogRecord> {
        self.records.get(self.selected)
    }

    pub fn compose(&self) -> Option<&ComposeDialog> {
        match &self.dialog {
            Dialog::Compose(compose) => Some(compose),
            _ => None,
        }
    }

    pub fn compose_mut(&mut self) -> Option<&mut ComposeDialog> {
        match &mut self.dialog {
            Dialog::Compose(compose) => Some(compose),
            _ => None,
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            backend: self.backend.clone(),
            records: self.records.clone(),
            list: self.list.clone(),
            selected: self.selected,
            dialog: self.dialog.clone(),
            saving: self.pending_save.is_some(),
            deleting: !self.pending_deletes.is_empty(),
            notification: self.notification.clone(),
        }
    }
}
