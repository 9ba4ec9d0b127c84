//! Render state - data structure sent from App layer to UI for rendering

use crate::app::state::{Dialog, ListPhase, Notification};
use crate::messages::ui_events::DialogKind;
use crate::models::{BlogRecord, FormField};

/// Complete state needed by the UI to render
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub backend: String,

    // Table
    pub records: Vec<BlogRecord>,
    pub list: ListPhase,
    pub selected: usize,

    // Overlays
    pub dialog: Dialog,
    pub saving: bool,
    pub deleting: bool,

    pub notification: Option<Notification>,
}

impl RenderState {
    pub fn dialog_kind(&self) -> DialogKind {
        self.dialog.kind()
    }

    /// Focused compose field, for key mapping
    pub fn active_field(&self) -> FormField {
        match &self.dialog {
            Dialog::Compose(compose) => compose.field,
            _ => FormField::Title,
        }
    }
}
