//! Network actor - runs gateway calls in the Tokio async runtime

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::error::GatewayError;
use crate::gateway::{image, BlogGateway};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{BlogPayload, FormState};

/// Network actor that executes gateway calls, one task per call.
///
/// Every task is owned by the actor's `JoinSet` and has a cancel handle, so
/// nothing outlives the actor: `Shutdown` (or a closed command channel)
/// cancels and aborts whatever is still in flight.
pub struct NetworkActor {
    gateway: Arc<dyn BlogGateway>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<u64>,
    cancel_handles: HashMap<u64, oneshot::Sender<()>>,
}

impl NetworkActor {
    pub fn new(
        gateway: Arc<dyn BlogGateway>,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            gateway,
            response_tx,
            active_requests: JoinSet::new(),
            cancel_handles: HashMap::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::FetchList { id }) => {
                            let gateway = self.gateway.clone();
                            self.spawn(id, async move {
                                let start = Instant::now();
                                tracing::info!(id, "Fetching blogs");
                                match gateway.list().await {
                                    Ok(records) => NetworkResponse::Listed {
                                        id,
                                        records,
                                        time_ms: start.elapsed().as_millis() as u64,
                                    },
                                    Err(error) => NetworkResponse::Failed { id, error },
                                }
                            });
                        }

                        Some(NetworkCommand::Create { id, form }) => {
                            let gateway = self.gateway.clone();
                            self.spawn(id, async move {
                                tracing::info!(id, title = %form.title, "Creating blog");
                                let result = match build_payload(form).await {
                                    Ok(payload) => gateway.create(payload).await,
                                    Err(e) => Err(e),
                                };
                                saved(id, result)
                            });
                        }

                        Some(NetworkCommand::Update { id, record_id, form }) => {
                            let gateway = self.gateway.clone();
                            self.spawn(id, async move {
                                tracing::info!(id, record_id = %record_id, "Updating blog");
                                let result = match build_payload(form).await {
                                    Ok(payload) => gateway.update(&record_id, payload).await,
                                    Err(e) => Err(e),
                                };
                                saved(id, result)
                            });
                        }

                        Some(NetworkCommand::Delete { id, record_id }) => {
                            let gateway = self.gateway.clone();
                            self.spawn(id, async move {
                                tracing::info!(id, record_id = %record_id, "Deleting blog");
                                match gateway.delete(&record_id).await {
                                    Ok(()) => NetworkResponse::Deleted { id },
                                    Err(error) => NetworkResponse::Failed { id, error },
                                }
                            });
                        }

                        Some(NetworkCommand::Cancel(id)) => {
                            if let Some(cancel_tx) = self.cancel_handles.remove(&id) {
                                tracing::info!(id, "Cancelling request");
                                let _ = cancel_tx.send(());
                                let _ = self.response_tx.send(NetworkResponse::Cancelled { id });
                            }
                        }

                        Some(NetworkCommand::Shutdown) | None => {
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                // Clean up completed tasks
                Some(result) = self.active_requests.join_next() => {
                    if let Ok(id) = result {
                        self.cancel_handles.remove(&id);
                    }
                }
            }
        }
    }

    /// Spawn a call that reports its own response unless cancelled first
    fn spawn<F>(&mut self, id: u64, call: F)
    where
        F: Future<Output = NetworkResponse> + Send + 'static,
    {
        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        self.cancel_handles.insert(id, cancel_tx);
        let response_tx = self.response_tx.clone();

        self.active_requests.spawn(async move {
            tokio::select! {
                biased;

                _ = &mut cancel_rx => {}
                response = call => {
                    if let NetworkResponse::Failed { error, .. } = &response {
                        tracing::warn!(id, error = %error, "Request failed");
                    }
                    let _ = response_tx.send(response);
                }
            }
            id
        });
    }

    async fn shutdown(&mut self) {
        let in_flight = self.cancel_handles.len();
        for (_, cancel_tx) in self.cancel_handles.drain() {
            let _ = cancel_tx.send(());
        }
        self.active_requests.abort_all();
        while self.active_requests.join_next().await.is_some() {}
        tracing::info!(in_flight, "Network actor stopped");
    }
}

async fn build_payload(form: FormState) -> Result<BlogPayload, GatewayError> {
    let mut payload = BlogPayload::from(form);
    payload.image = image::resolve(payload.image.take()).await?;
    Ok(payload)
}

fn saved(
    id: u64,
    result: Result<Option<crate::models::BlogRecord>, GatewayError>,
) -> NetworkResponse {
    match result {
        Ok(record) => NetworkResponse::Saved { id, record },
        Err(error) => NetworkResponse::Failed { id, error },
    }
}
