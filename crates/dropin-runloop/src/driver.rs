//! InspectorDriver - runs an [`Inspector`] against wall-clock time.
//!
//! The driver owns the inspector and multiplexes its inputs on one task:
//! panel commands, mutation batches, history pops, an explicit shutdown, and
//! a sleep until the next timer deadline. Each input is handled to
//! completion before the next is looked at.

use std::time::Duration;

use dropin_protocols::{HostDocument, MutationRecord};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult};
use crate::events::InspectorCommand;
use crate::inspector::Inspector;

/// Sending side of a running [`InspectorDriver`].
#[derive(Debug, Clone)]
pub struct InspectorHandle {
    commands: mpsc::UnboundedSender<InspectorCommand>,
    mutations: mpsc::UnboundedSender<Vec<MutationRecord>>,
    popstate: mpsc::UnboundedSender<()>,
    shutdown: mpsc::Sender<()>,
}

impl InspectorHandle {
    pub fn send(&self, command: InspectorCommand) -> SessionResult<()> {
        self.commands
            .send(command)
            .map_err(|_| SessionError::ChannelClosed)
    }

    pub fn notify_mutations(&self, records: Vec<MutationRecord>) -> SessionResult<()> {
        self.mutations
            .send(records)
            .map_err(|_| SessionError::ChannelClosed)
    }

    pub fn notify_popstate(&self) -> SessionResult<()> {
        self.popstate
            .send(())
            .map_err(|_| SessionError::ChannelClosed)
    }

    /// Ask the driver to stop after the input it is handling.
    pub async fn shutdown(&self) -> SessionResult<()> {
        self.shutdown
            .send(())
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }
}

/// Event loop for one inspector session.
pub struct InspectorDriver<D> {
    inspector: Inspector<D>,
    commands_rx: mpsc::UnboundedReceiver<InspectorCommand>,
    mutations_rx: mpsc::UnboundedReceiver<Vec<MutationRecord>>,
    popstate_rx: mpsc::UnboundedReceiver<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl<D: HostDocument> InspectorDriver<D> {
    pub fn new(inspector: Inspector<D>) -> (Self, InspectorHandle) {
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let (mutations, mutations_rx) = mpsc::unbounded_channel();
        let (popstate, popstate_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = mpsc::channel(1);

        let driver = Self {
            inspector,
            commands_rx,
            mutations_rx,
            popstate_rx,
            shutdown_rx,
        };
        let handle = InspectorHandle {
            commands,
            mutations,
            popstate,
            shutdown,
        };
        (driver, handle)
    }

    /// Run until shut down or every handle is dropped, then hand the
    /// inspector back.
    pub async fn run(mut self) -> Inspector<D> {
        let started = Instant::now();
        let base = self.inspector.now();
        let clock = move || base + started.elapsed();
        info!("Inspector driver started");

        loop {
            let wait = self
                .inspector
                .next_deadline()
                .map(|deadline| deadline.saturating_sub(clock()));

            tokio::select! {
                command = self.commands_rx.recv() => {
                    let Some(command) = command else {
                        debug!("All inspector handles dropped");
                        break;
                    };
                    self.inspector.advance_to(clock());
                    self.inspector.handle_command(command).await;
                }
                Some(records) = self.mutations_rx.recv() => {
                    self.inspector.advance_to(clock());
                    self.inspector.on_mutations(&records);
                }
                Some(()) = self.popstate_rx.recv() => {
                    self.inspector.advance_to(clock());
                    self.inspector.on_popstate();
                }
                Some(()) = self.shutdown_rx.recv() => {
                    debug!("Inspector driver received shutdown signal");
                    break;
                }
                _ = sleep_for(wait) => {
                    self.inspector.advance_to(clock());
                }
            }
        }

        info!("Inspector driver stopped");
        self.inspector
    }
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending::<()>().await,
    }
}
