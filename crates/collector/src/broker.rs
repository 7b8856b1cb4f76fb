// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker state: the started flag, the ready-set, the bounded frame buffer
//! and the drain choreography.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use kpture_wire::{PacketDescriptor, Pod};

/// Shared state behind both gRPC services.
///
/// The `started` mutex guards only that flag. The frame buffer is a bounded
/// multi-producer/single-consumer channel; the waitgroup counting in-flight
/// agent streams is the clone-per-handler sender whose receiver yields
/// `None` once every handler has returned.
#[derive(Clone)]
pub struct Broker {
    shared: Arc<Shared>,
}

struct Shared {
    started: Mutex<bool>,
    ready: Mutex<Vec<Pod>>,
    frames_tx: mpsc::Sender<PacketDescriptor>,
    frames_rx: Mutex<Option<mpsc::Receiver<PacketDescriptor>>>,
    overflow_logged: AtomicBool,
    /// Tells every open agent stream to send its shutdown Empty.
    shutdown: CancellationToken,
    /// Resolves once draining is complete; the server exits on it.
    terminated: CancellationToken,
    handlers_tx: Mutex<Option<mpsc::Sender<()>>>,
    handlers_rx: Mutex<Option<mpsc::Receiver<()>>>,
}

impl Broker {
    pub fn new(buffer_size: usize) -> Self {
        let (frames_tx, frames_rx) = mpsc::channel(buffer_size.max(1));
        let (handlers_tx, handlers_rx) = mpsc::channel(1);
        Self {
            shared: Arc::new(Shared {
                started: Mutex::new(false),
                ready: Mutex::new(Vec::new()),
                frames_tx,
                frames_rx: Mutex::new(Some(frames_rx)),
                overflow_logged: AtomicBool::new(false),
                shutdown: CancellationToken::new(),
                terminated: CancellationToken::new(),
                handlers_tx: Mutex::new(Some(handlers_tx)),
                handlers_rx: Mutex::new(Some(handlers_rx)),
            }),
        }
    }

    /// Append an agent's pod descriptor to the ready-set.
    pub fn mark_ready(&self, pod: Pod) {
        self.shared.ready.lock().push(pod);
    }

    pub fn ready_pods(&self) -> Vec<Pod> {
        self.shared.ready.lock().clone()
    }

    /// Offer one frame to the buffer.
    ///
    /// Before the client stream starts, frames are discarded at the buffer's
    /// entry. A full buffer drops the frame: liveness over completeness.
    pub fn offer(&self, frame: PacketDescriptor) {
        if !*self.shared.started.lock() {
            return;
        }
        if self.shared.frames_tx.try_send(frame).is_err()
            && !self.shared.overflow_logged.swap(true, Ordering::Relaxed)
        {
            tracing::warn!("frame buffer full, dropping frames");
        }
    }

    /// Flip the broker to streaming.
    pub fn start(&self) {
        *self.shared.started.lock() = true;
    }

    /// Claim the single consumer side of the frame buffer.
    pub fn take_frames(&self) -> Option<mpsc::Receiver<PacketDescriptor>> {
        self.shared.frames_rx.lock().take()
    }

    /// Register an agent stream with the waitgroup. `None` once draining
    /// has begun.
    pub(crate) fn handler_guard(&self) -> Option<mpsc::Sender<()>> {
        self.shared.handlers_tx.lock().clone()
    }

    pub(crate) fn shutdown_token(&self) -> CancellationToken {
        self.shared.shutdown.clone()
    }

    /// Resolves when draining is complete.
    pub fn terminated(&self) -> WaitForCancellationFutureOwned {
        self.shared.terminated.clone().cancelled_owned()
    }

    /// Client gone: signal every agent stream, join the waitgroup, then
    /// release the server.
    pub async fn drain(&self) {
        tracing::info!("client stream closed, draining agent streams");
        self.shared.shutdown.cancel();

        drop(self.shared.handlers_tx.lock().take());
        let handlers = self.shared.handlers_rx.lock().take();
        if let Some(mut handlers) = handlers {
            while handlers.recv().await.is_some() {}
        }

        self.shared.terminated.cancel();
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod broker_tests;
