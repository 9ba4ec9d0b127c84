//! App actor - message loop processing UI events and network responses

use std::time::Duration;

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// How often notification expiry is checked
const TICK: Duration = Duration::from_millis(250);

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        backend: String,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state: AppState::new(backend),
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        let commands = self.state.mount();
        self.dispatch(commands);
        let _ = self.render_tx.send(self.state.to_render_state());

        let mut tick = tokio::time::interval(TICK);

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    let commands = self.state.handle_response(response);
                    self.dispatch(commands);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                _ = tick.tick() => {
                    if self.state.expire_notification(chrono::Utc::now()) {
                        let _ = self.render_tx.send(self.state.to_render_state());
                    }
                }
                else => break,
            }
        }

        tracing::info!("App actor stopped");
    }

    fn dispatch(&self, commands: impl IntoIterator<Item = NetworkCommand>) {
        for cmd in commands {
            let _ = self.network_tx.send(cmd);
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            // Table navigation
            UiEvent::SelectNext => self.state.select_next(),
            UiEvent::SelectPrev => self.state.select_prev(),

            // Record actions
            UiEvent::OpenCreate => self.state.open_compose(None),
            UiEvent::OpenEdit => self.state.open_edit_selected(),
            UiEvent::OpenView => self.state.open_view_selected(),
            UiEvent::RequestDelete => self.state.remove_selected(),
            UiEvent::ConfirmDelete => {
                let cmd = self.state.confirm_delete();
                self.dispatch(cmd);
            }
            UiEvent::DeclineDelete => self.state.decline_delete(),
            UiEvent::Refresh => {
                let commands = self.state.fetch_list();
                self.dispatch(commands);
            }
            UiEvent::CancelFetch => {
                let cmd = self.state.cancel_fetch();
                self.dispatch(cmd);
            }

            // Compose dialog
            UiEvent::NextField => self.state.next_field(),
            UiEvent::PrevField => self.state.prev_field(),
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Backspace => self.state.delete_char(),
            UiEvent::CursorLeft => self.state.move_cursor_left(),
            UiEvent::CursorRight => self.state.move_cursor_right(),
            UiEvent::Submit => {
                let cmd = self.state.submit();
                self.dispatch(cmd);
            }

            // Popups
            UiEvent::CloseDialog => self.state.close_dialog(),
            UiEvent::ToggleHelp => self.state.toggle_help(),
            UiEvent::DismissNotification => self.state.dismiss_notification(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}
