//! Command handlers - state transitions for UI events and network responses
//!
//! Every method here is synchronous and I/O free. Methods that need the
//! backend return the `NetworkCommand`s for the App actor to forward.

use chrono::Utc;

use crate::app::state::{
    AppState, ComposeDialog, ComposeMode, Dialog, ListPhase, Notification, PendingSave, Severity,
};
use crate::constants::{
    MSG_CREATED, MSG_DELETED, MSG_DELETE_FAILED, MSG_LOAD_FAILED, MSG_SAVE_FALLBACK,
    MSG_TITLE_REQUIRED, MSG_UPDATED,
};
use crate::error::describe_failure;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{BlogRecord, FormState};

impl AppState {
    // ========================
    // Lifecycle
    // ========================

    /// Initial load when the app starts
    pub fn mount(&mut self) -> Vec<NetworkCommand> {
        self.fetch_list()
    }

    /// Request the full collection. A fetch already in flight is
    /// superseded: it gets cancelled and its response will be ignored.
    pub fn fetch_list(&mut self) -> Vec<NetworkCommand> {
        let mut commands = Vec::with_capacity(2);
        if let ListPhase::Loading { request_id } = self.list {
            commands.push(NetworkCommand::Cancel(request_id));
        }

        let id = self.next_id();
        self.list = ListPhase::Loading { request_id: id };
        commands.push(NetworkCommand::FetchList { id });
        commands
    }

    pub fn cancel_fetch(&mut self) -> Option<NetworkCommand> {
        match self.list {
            ListPhase::Loading { request_id } => Some(NetworkCommand::Cancel(request_id)),
            _ => None,
        }
    }

    // ========================
    // Notifications
    // ========================

    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.notification = Some(Notification {
            message: message.into(),
            severity,
            shown_at: Utc::now(),
        });
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Drop the notification once its time is up. Returns true if it changed.
    pub fn expire_notification(&mut self, now: chrono::DateTime<Utc>) -> bool {
        if self.notification.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notification = None;
            return true;
        }
        false
    }

    // ========================
    // Table selection
    // ========================

    pub fn select_next(&mut self) {
        if !self.records.is_empty() {
            self.selected = (self.selected + 1) % self.records.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.records.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.records.len() - 1);
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.records.len().saturating_sub(1));
    }

    // ========================
    // Compose dialog
    // ========================

    /// Open the form, seeded from `existing` (edit) or blank (create)
    pub fn open_compose(&mut self, existing: Option<&BlogRecord>) {
        let (mode, form) = match existing {
            Some(record) => (
                ComposeMode::Edit {
                    id: record.id.clone(),
                },
                FormState::from_record(record),
            ),
            None => (ComposeMode::Create, FormState::blank()),
        };
        let cursor = form.title.len();

        self.dialog = Dialog::Compose(ComposeDialog {
            mode,
            form,
            field: Default::default(),
            cursor,
            submitted: None,
        });
    }

    pub fn open_edit_selected(&mut self) {
        if let Some(record) = self.selected_record().cloned() {
            self.open_compose(Some(&record));
        }
    }

    /// Close the form and discard its contents
    pub fn close_compose(&mut self) {
        if matches!(self.dialog, Dialog::Compose(_)) {
            self.dialog = Dialog::None;
        }
    }

    /// Validate and send the form. Blank titles never reach the network.
    pub fn submit(&mut self) -> Option<NetworkCommand> {
        if self.pending_save.is_some() {
            return None;
        }
        let compose = self.compose()?;

        if !compose.form.has_title() {
            self.notify(MSG_TITLE_REQUIRED, Severity::Error);
            return None;
        }

        let form = compose.form.clone();
        let editing_id = compose.mode.editing_id().map(str::to_string);
        let id = self.next_id();
        self.pending_save = Some(PendingSave {
            request_id: id,
            editing: editing_id.is_some(),
        });

        if let Some(compose) = self.compose_mut() {
            compose.submitted = Some(id);
        }

        tracing::info!(id, editing = ?editing_id, "Submitting blog");
        Some(match editing_id {
            Some(record_id) => NetworkCommand::Update {
                id,
                record_id,
                form,
            },
            None => NetworkCommand::Create { id, form },
        })
    }

    // ---- form editing ----

    pub fn next_field(&mut self) {
        if let Some(compose) = self.compose_mut() {
            compose.field = compose.field.next();
            compose.cursor = compose.form.field(compose.field).len();
        }
    }

    pub fn prev_field(&mut self) {
        if let Some(compose) = self.compose_mut() {
            compose.field = compose.field.prev();
            compose.cursor = compose.form.field(compose.field).len();
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(compose) = self.compose_mut() {
            let input = compose.form.field(compose.field);
            compose.cursor = input[..compose.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(compose) = self.compose_mut() {
            let input = compose.form.field(compose.field);
            if compose.cursor < input.len() {
                compose.cursor = input[compose.cursor..]
                    .char_indices()
                    .nth(1)
                    .map(|(i, _)| compose.cursor + i)
                    .unwrap_or(input.len());
            }
        }
    }

    pub fn enter_char(&mut self, c: char) {
        if let Some(compose) = self.compose_mut() {
            let cursor = compose.cursor;
            let input = compose.form.field_mut(compose.field);
            if cursor <= input.len() {
                input.insert(cursor, c);
                compose.cursor = cursor + c.len_utf8();
            }
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(compose) = self.compose_mut() {
            if compose.cursor == 0 {
                return;
            }
            let cursor = compose.cursor;
            let input = compose.form.field_mut(compose.field);
            let prev = input[..cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            input.remove(prev);
            compose.cursor = prev;
        }
    }

    // ========================
    // View dialog
    // ========================

    pub fn open_view(&mut self, record: BlogRecord) {
        self.dialog = Dialog::View(record);
    }

    pub fn open_view_selected(&mut self) {
        if let Some(record) = self.selected_record().cloned() {
            self.open_view(record);
        }
    }

    pub fn close_view(&mut self) {
        if matches!(self.dialog, Dialog::View(_)) {
            self.dialog = Dialog::None;
        }
    }

    // ========================
    // Delete
    // ========================

    /// Ask for confirmation before removing `id`
    pub fn remove(&mut self, id: &str) {
        let title = self
            .records
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.title.clone())
            .unwrap_or_default();
        self.dialog = Dialog::ConfirmDelete {
            id: id.to_string(),
            title,
        };
    }

    pub fn remove_selected(&mut self) {
        if let Some(id) = self.selected_record().map(|r| r.id.clone()) {
            self.remove(&id);
        }
    }

    pub fn confirm_delete(&mut self) -> Option<NetworkCommand> {
        let record_id = match &self.dialog {
            Dialog::ConfirmDelete { id, .. } => id.clone(),
            _ => return None,
        };
        self.dialog = Dialog::None;

        let id = self.next_id();
        self.pending_deletes.insert(id);
        tracing::info!(id, record_id = %record_id, "Deleting blog");
        Some(NetworkCommand::Delete { id, record_id })
    }

    pub fn decline_delete(&mut self) {
        if matches!(self.dialog, Dialog::ConfirmDelete { .. }) {
            self.dialog = Dialog::None;
        }
    }

    // ========================
    // Help popup
    // ========================

    pub fn toggle_help(&mut self) {
        self.dialog = match self.dialog {
            Dialog::Help => Dialog::None,
            Dialog::None => Dialog::Help,
            _ => return,
        };
    }

    /// Close whatever overlay is open; the compose form is discarded
    pub fn close_dialog(&mut self) {
        self.dialog = Dialog::None;
    }

    // ========================
    // Response handling
    // ========================

    /// Apply a network response. Responses for calls that are no longer
    /// pending are ignored. May return follow-up commands (list refresh).
    pub fn handle_response(&mut self, response: NetworkResponse) -> Vec<NetworkCommand> {
        let id = response.id();

        if self.list == (ListPhase::Loading { request_id: id }) {
            self.apply_list_response(response);
            return Vec::new();
        }
        if self.pending_save.as_ref().is_some_and(|p| p.request_id == id) {
            return self.apply_save_response(response);
        }
        if self.pending_deletes.contains(&id) {
            return self.apply_delete_response(response);
        }

        tracing::debug!(id, "Ignoring stale response");
        Vec::new()
    }

    fn apply_list_response(&mut self, response: NetworkResponse) {
        match response {
            NetworkResponse::Listed {
                records, time_ms, ..
            } => {
                tracing::info!(count = records.len(), time_ms, "Blogs loaded");
                self.records = records;
                self.list = ListPhase::Loaded;
                self.clamp_selection();
            }
            NetworkResponse::Failed { error, .. } => {
                tracing::warn!(error = %error, "Loading blogs failed");
                self.list = ListPhase::Failed {
                    message: describe_failure(&error, MSG_LOAD_FAILED),
                };
                self.notify(MSG_LOAD_FAILED, Severity::Error);
            }
            NetworkResponse::Cancelled { .. } => {
                self.list = ListPhase::Idle;
            }
            other => tracing::warn!(?other, "Unexpected response to list fetch"),
        }
    }

    fn apply_save_response(&mut self, response: NetworkResponse) -> Vec<NetworkCommand> {
        let Some(pending) = self.pending_save.take() else {
            return Vec::new();
        };

        match response {
            NetworkResponse::Saved { .. } => {
                let message = if pending.editing { MSG_UPDATED } else { MSG_CREATED };
                self.notify(message, Severity::Success);
                // Only the form that sent this save goes away; a newer draft stays
                if self
                    .compose()
                    .is_some_and(|c| c.submitted == Some(pending.request_id))
                {
                    self.dialog = Dialog::None;
                }
                self.fetch_list()
            }
            NetworkResponse::Failed { error, .. } => {
                tracing::warn!(error = %error, "Saving blog failed");
                if let Some(compose) = self.compose_mut() {
                    compose.submitted = None;
                }
                self.notify(describe_failure(&error, MSG_SAVE_FALLBACK), Severity::Error);
                Vec::new()
            }
            NetworkResponse::Cancelled { .. } => Vec::new(),
            other => {
                tracing::warn!(?other, "Unexpected response to save");
                Vec::new()
            }
        }
    }

    fn apply_delete_response(&mut self, response: NetworkResponse) -> Vec<NetworkCommand> {
        self.pending_deletes.remove(&response.id());

        match response {
            NetworkResponse::Deleted { .. } => {
                self.notify(MSG_DELETED, Severity::Success);
                self.fetch_list()
            }
            NetworkResponse::Failed { error, .. } => {
                tracing::warn!(error = %error, "Deleting blog failed");
                self.notify(MSG_DELETE_FAILED, Severity::Error);
                Vec::new()
            }
            NetworkResponse::Cancelled { .. } => Vec::new(),
            other => {
                tracing::warn!(?other, "Unexpected response to delete");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorBody, GatewayError};
    use crate::models::FormField;

    fn record(id: &str, title: &str, kind: &str) -> BlogRecord {
        BlogRecord {
            id: id.into(),
            title: title.into(),
            content: format!("<p>{} body</p>", title),
            image: None,
            kind: kind.into(),
        }
    }

    /// State after a successful initial load
    fn loaded(records: Vec<BlogRecord>) -> AppState {
        let mut state = AppState::default();
        let cmds = state.mount();
        let NetworkCommand::FetchList { id } = cmds[0] else {
            panic!("expected fetch");
        };
        state.handle_response(NetworkResponse::Listed {
            id,
            records,
            time_ms: 1,
        });
        state
    }

    fn fetch_count(cmds: &[NetworkCommand]) -> usize {
        cmds.iter().filter(|c| c.is_fetch()).count()
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            state.enter_char(c);
        }
    }

    fn last_message(state: &AppState) -> (&str, Severity) {
        let n = state.notification.as_ref().expect("notification");
        (n.message.as_str(), n.severity)
    }

    #[test]
    fn test_mount_fetches_once_and_loads() {
        let mut state = AppState::default();
        let cmds = state.mount();
        assert_eq!(fetch_count(&cmds), 1);
        assert!(state.list.is_loading());

        let state = loaded(vec![record("1", "Hello", "tech")]);
        assert_eq!(state.list, ListPhase::Loaded);
        assert_eq!(state.records.len(), 1);
    }

    #[test]
    fn test_failed_fetch_keeps_previous_list() {
        let mut state = loaded(vec![record("1", "Hello", "tech")]);
        let cmds = state.fetch_list();
        let NetworkCommand::FetchList { id } = cmds[0] else {
            panic!("expected fetch");
        };

        state.handle_response(NetworkResponse::Failed {
            id,
            error: GatewayError::Transport("Connection failed".into()),
        });

        assert_eq!(state.records.len(), 1);
        assert!(matches!(state.list, ListPhase::Failed { .. }));
        assert_eq!(last_message(&state), (MSG_LOAD_FAILED, Severity::Error));
    }

    #[test]
    fn test_refetch_supersedes_pending_fetch() {
        let mut state = AppState::default();
        let first = state.mount();
        let NetworkCommand::FetchList { id: stale } = first[0] else {
            panic!("expected fetch");
        };

        let second = state.fetch_list();
        assert!(matches!(second[0], NetworkCommand::Cancel(id) if id == stale));
        assert_eq!(fetch_count(&second), 1);

        state.handle_response(NetworkResponse::Listed {
            id: stale,
            records: vec![record("9", "Old", "")],
            time_ms: 1,
        });
        assert!(state.records.is_empty());
        assert!(state.list.is_loading());
    }

    #[test]
    fn test_cancelled_fetch_returns_to_idle() {
        let mut state = AppState::default();
        state.mount();
        let Some(NetworkCommand::Cancel(id)) = state.cancel_fetch() else {
            panic!("expected cancel");
        };
        state.handle_response(NetworkResponse::Cancelled { id });
        assert_eq!(state.list, ListPhase::Idle);
        assert!(state.cancel_fetch().is_none());
    }

    #[test]
    fn test_blank_title_never_hits_network() {
        let mut state = loaded(vec![]);
        state.open_compose(None);
        assert!(state.submit().is_none());
        assert_eq!(last_message(&state), (MSG_TITLE_REQUIRED, Severity::Error));

        type_text(&mut state, "   ");
        assert!(state.submit().is_none());
        assert!(state.pending_save.is_none());
        assert!(matches!(state.dialog, Dialog::Compose(_)));
    }

    #[test]
    fn test_open_compose_seeds_from_record() {
        let mut state = AppState::default();
        let mut existing = record("7", "Seeded", "Food");
        existing.image = Some("https://img/x.png".into());
        state.open_compose(Some(&existing));

        let compose = state.compose().unwrap();
        assert_eq!(compose.mode, ComposeMode::Edit { id: "7".into() });
        assert_eq!(compose.form, FormState::from_record(&existing));
        assert_eq!(compose.form.image.as_deref(), Some("https://img/x.png"));

        state.open_compose(None);
        let compose = state.compose().unwrap();
        assert_eq!(compose.mode, ComposeMode::Create);
        assert_eq!(compose.form, FormState::blank());
    }

    #[test]
    fn test_create_success_closes_dialog_and_refetches_once() {
        let mut state = loaded(vec![]);
        state.open_compose(None);
        type_text(&mut state, "New post");
        state.next_field();
        type_text(&mut state, "tech");

        let cmd = state.submit().expect("create command");
        let NetworkCommand::Create { id, form } = cmd else {
            panic!("expected create");
        };
        assert_eq!(form.title, "New post");
        assert_eq!(form.kind, "tech");

        let follow_up = state.handle_response(NetworkResponse::Saved { id, record: None });
        assert_eq!(fetch_count(&follow_up), 1);
        assert_eq!(state.dialog, Dialog::None);
        assert!(state.compose().is_none());
        assert_eq!(last_message(&state), (MSG_CREATED, Severity::Success));

        // reopening starts blank
        state.open_compose(None);
        assert_eq!(state.compose().unwrap().form, FormState::blank());
    }

    #[test]
    fn test_update_uses_editing_id() {
        let mut state = loaded(vec![record("1", "Hello", "tech")]);
        state.open_edit_selected();
        type_text(&mut state, "!");

        let Some(NetworkCommand::Update { id, record_id, form }) = state.submit() else {
            panic!("expected update");
        };
        assert_eq!(record_id, "1");
        assert_eq!(form.title, "Hello!");

        let follow_up = state.handle_response(NetworkResponse::Saved { id, record: None });
        assert_eq!(fetch_count(&follow_up), 1);
        assert_eq!(last_message(&state), (MSG_UPDATED, Severity::Success));
        assert_eq!(state.dialog, Dialog::None);
    }

    #[test]
    fn test_save_failure_keeps_dialog_with_specific_message() {
        let mut state = loaded(vec![]);
        state.open_compose(None);
        type_text(&mut state, "Dup");
        let Some(NetworkCommand::Create { id, .. }) = state.submit() else {
            panic!("expected create");
        };
        // second submit while in flight is ignored
        assert!(state.submit().is_none());

        let follow_up = state.handle_response(NetworkResponse::Failed {
            id,
            error: GatewayError::Status {
                status: 409,
                body: ErrorBody {
                    message: None,
                    error: Some("Duplicate title".into()),
                },
            },
        });
        assert!(follow_up.is_empty());
        assert_eq!(last_message(&state), ("Duplicate title", Severity::Error));
        assert_eq!(state.compose().unwrap().form.title, "Dup");
        assert!(state.submit().is_some());
    }

    #[test]
    fn test_close_compose_resets_form() {
        let mut state = AppState::default();
        state.open_compose(None);
        type_text(&mut state, "draft");
        state.close_compose();
        assert_eq!(state.dialog, Dialog::None);
        state.open_compose(None);
        assert_eq!(state.compose().unwrap().form.title, "");
    }

    #[test]
    fn test_earlier_save_does_not_close_newer_draft() {
        let mut state = loaded(vec![]);
        state.open_compose(None);
        type_text(&mut state, "A");
        let Some(NetworkCommand::Create { id, .. }) = state.submit() else {
            panic!("expected create");
        };

        state.close_compose();
        state.open_compose(None);
        type_text(&mut state, "draft two");

        let follow_up = state.handle_response(NetworkResponse::Saved { id, record: None });
        assert_eq!(fetch_count(&follow_up), 1);
        assert_eq!(last_message(&state), (MSG_CREATED, Severity::Success));
        assert_eq!(state.compose().unwrap().form.title, "draft two");
        assert!(state.compose().unwrap().submitted.is_none());
        assert!(state.submit().is_some());
    }

    #[test]
    fn test_delete_confirmed_scenario() {
        let mut state = loaded(vec![record("1", "Hello", "tech"), record("2", "Other", "food")]);
        state.remove("1");
        assert_eq!(
            state.dialog,
            Dialog::ConfirmDelete {
                id: "1".into(),
                title: "Hello".into()
            }
        );

        let Some(NetworkCommand::Delete { id, record_id }) = state.confirm_delete() else {
            panic!("expected delete");
        };
        assert_eq!(record_id, "1");

        let follow_up = state.handle_response(NetworkResponse::Deleted { id });
        assert_eq!(fetch_count(&follow_up), 1);
        assert_eq!(last_message(&state), (MSG_DELETED, Severity::Success));

        let NetworkCommand::FetchList { id } = follow_up[0] else {
            panic!("expected fetch");
        };
        state.handle_response(NetworkResponse::Listed {
            id,
            records: vec![record("2", "Other", "food")],
            time_ms: 1,
        });
        assert!(state.records.iter().all(|r| r.id != "1"));
    }

    #[test]
    fn test_declined_delete_issues_nothing() {
        let mut state = loaded(vec![record("1", "Hello", "tech")]);
        state.remove_selected();
        state.decline_delete();
        assert_eq!(state.dialog, Dialog::None);
        assert!(state.confirm_delete().is_none());
        assert!(state.pending_deletes.is_empty());
    }

    #[test]
    fn test_delete_failure_is_generic() {
        let mut state = loaded(vec![record("1", "Hello", "tech")]);
        state.remove("1");
        let Some(NetworkCommand::Delete { id, .. }) = state.confirm_delete() else {
            panic!("expected delete");
        };
        let follow_up = state.handle_response(NetworkResponse::Failed {
            id,
            error: GatewayError::Status {
                status: 500,
                body: ErrorBody {
                    message: Some("db down".into()),
                    error: None,
                },
            },
        });
        assert!(follow_up.is_empty());
        assert_eq!(last_message(&state), (MSG_DELETE_FAILED, Severity::Error));
        assert_eq!(state.records.len(), 1);
    }

    #[test]
    fn test_overlapping_deletes_each_refresh() {
        let mut state = loaded(vec![record("1", "Hello", "tech"), record("2", "Other", "food")]);

        state.remove("1");
        let Some(NetworkCommand::Delete { id: first, .. }) = state.confirm_delete() else {
            panic!("expected delete");
        };
        state.remove("2");
        let Some(NetworkCommand::Delete { id: second, .. }) = state.confirm_delete() else {
            panic!("expected delete");
        };
        assert!(state.to_render_state().deleting);

        let follow_up = state.handle_response(NetworkResponse::Deleted { id: first });
        assert_eq!(fetch_count(&follow_up), 1);
        assert_eq!(last_message(&state), (MSG_DELETED, Severity::Success));
        assert!(state.to_render_state().deleting);

        let follow_up = state.handle_response(NetworkResponse::Failed {
            id: second,
            error: GatewayError::Transport("Connection failed: refused".into()),
        });
        assert!(follow_up.is_empty());
        assert_eq!(last_message(&state), (MSG_DELETE_FAILED, Severity::Error));
        assert!(state.pending_deletes.is_empty());
        assert!(!state.to_render_state().deleting);
    }

    #[test]
    fn test_selection_clamped_after_refresh() {
        let mut state = loaded(vec![record("1", "a", ""), record("2", "b", ""), record("3", "c", "")]);
        state.select_prev();
        assert_eq!(state.selected, 2);

        let cmds = state.fetch_list();
        let NetworkCommand::FetchList { id } = cmds[0] else {
            panic!("expected fetch");
        };
        state.handle_response(NetworkResponse::Listed {
            id,
            records: vec![record("1", "a", "")],
            time_ms: 1,
        });
        assert_eq!(state.selected, 0);
        state.select_next();
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_form_editing_handles_multibyte() {
        let mut state = AppState::default();
        state.open_compose(None);
        type_text(&mut state, "café");
        state.move_cursor_left();
        state.delete_char();
        assert_eq!(state.compose().unwrap().form.title, "caé");
        state.move_cursor_right();
        state.enter_char('!');
        assert_eq!(state.compose().unwrap().form.title, "caé!");

        state.prev_field();
        assert_eq!(state.compose().unwrap().field, FormField::Content);
        state.enter_char('\n');
        assert_eq!(state.compose().unwrap().form.content, "\n");
    }

    #[test]
    fn test_view_dialog() {
        let mut state = loaded(vec![record("1", "Hello", "tech")]);
        state.open_view_selected();
        assert!(matches!(state.dialog, Dialog::View(ref r) if r.id == "1"));
        state.close_view();
        assert_eq!(state.dialog, Dialog::None);
    }

    #[test]
    fn test_notification_expires() {
        let mut state = AppState::default();
        state.notify("hi", Severity::Success);
        let shown = state.notification.as_ref().unwrap().shown_at;
        assert!(!state.expire_notification(shown + chrono::Duration::milliseconds(3999)));
        assert!(state.expire_notification(shown + chrono::Duration::milliseconds(4000)));
        assert!(state.notification.is_none());
    }
}
