// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! gRPC service implementations over the broker.

use std::pin::Pin;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tonic::{Request, Response, Status, Streaming};

use kpture_wire::agent_service_server::AgentService;
use kpture_wire::client_service_server::ClientService;
use kpture_wire::{Empty, PacketDescriptor, Pod};

use crate::broker::Broker;

type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send + 'static>>;

#[tonic::async_trait]
impl AgentService for Broker {
    async fn ready(&self, request: Request<Pod>) -> Result<Response<Empty>, Status> {
        self.mark_ready(request.into_inner());
        Ok(Response::new(Empty {}))
    }

    type AddPacketStream = ResponseStream<Empty>;

    async fn add_packet(
        &self,
        request: Request<Streaming<PacketDescriptor>>,
    ) -> Result<Response<Self::AddPacketStream>, Status> {
        let Some(guard) = self.handler_guard() else {
            return Err(Status::unavailable("collector is draining"));
        };
        tracing::info!("agent stream opened");

        let mut inbound = request.into_inner();
        let (tx, rx) = mpsc::channel::<Result<Empty, Status>>(1);

        // Shutdown notifier: one Empty down the agent's receive side tells
        // it to stop capturing.
        let shutdown = self.shutdown_token();
        let shutdown_tx = tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    let _ = shutdown_tx.send(Ok(Empty {})).await;
                }
                _ = shutdown_tx.closed() => {}
            }
        });

        let broker = self.clone();
        tokio::spawn(async move {
            let _guard = guard;
            loop {
                match inbound.message().await {
                    Ok(Some(frame)) => broker.offer(frame),
                    // End-of-stream from the agent is a clean finish.
                    Ok(None) => break,
                    Err(status) => {
                        let _ = tx.send(Err(Status::internal(status.to_string()))).await;
                        break;
                    }
                }
            }
            tracing::info!("agent stream closed");
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }
}

#[tonic::async_trait]
impl ClientService for Broker {
    type GetPacketsStream = ResponseStream<PacketDescriptor>;

    async fn get_packets(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<Self::GetPacketsStream>, Status> {
        let Some(mut frames) = self.take_frames() else {
            return Err(Status::failed_precondition("packet stream already claimed"));
        };
        self.start();
        tracing::info!("client stream opened");

        let (tx, rx) = mpsc::channel::<Result<PacketDescriptor, Status>>(1);
        let broker = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    frame = frames.recv() => match frame {
                        Some(frame) => {
                            if tx.send(Ok(frame)).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
            broker.drain().await;
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }
}
