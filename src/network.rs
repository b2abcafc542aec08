//! Seam between the frame loop and whatever carries packets to the server.
//!
//! The socket itself lives outside this crate. A bridge only has to accept
//! move requests and hand back inbound packets, oldest first, when polled.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use anyhow::{Context, Result, bail};

use crate::protocol::{MoveRequest, PositionUpdate};

pub trait NetworkBridge {
    fn send(&mut self, request: &MoveRequest) -> Result<()>;

    /// Next pending inbound packet, if any. Never blocks.
    fn poll(&mut self) -> Option<String>;
}

/// Stands in for the server: every move request comes straight back as a
/// confirmed position for slot 0.
#[derive(Default)]
pub struct LoopbackBridge {
    inbox: VecDeque<String>,
    sent: Vec<MoveRequest>,
}

impl LoopbackBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a raw packet as if it had arrived from the server.
    pub fn push_inbound(&mut self, packet: impl Into<String>) {
        self.inbox.push_back(packet.into());
    }

    pub fn sent(&self) -> &[MoveRequest] {
        &self.sent
    }

    pub fn pending(&self) -> usize {
        self.inbox.len()
    }
}

impl NetworkBridge for LoopbackBridge {
    fn send(&mut self, request: &MoveRequest) -> Result<()> {
        let echo = PositionUpdate::echo(request).context("failed to encode loopback echo")?;
        self.sent.push(*request);
        self.inbox.push_back(echo);
        Ok(())
    }

    fn poll(&mut self) -> Option<String> {
        self.inbox.pop_front()
    }
}

/// Bridge backed by channels, for a transport running on its own thread.
pub struct ChannelBridge {
    outbound: Sender<String>,
    inbound: Receiver<String>,
}

/// The transport's half of a [`ChannelBridge`].
pub struct TransportEnds {
    pub outbound: Receiver<String>,
    pub inbound: Sender<String>,
}

impl ChannelBridge {
    pub fn new() -> (Self, TransportEnds) {
        let (out_tx, out_rx) = mpsc::channel();
        let (in_tx, in_rx) = mpsc::channel();
        let bridge = Self {
            outbound: out_tx,
            inbound: in_rx,
        };
        let ends = TransportEnds {
            outbound: out_rx,
            inbound: in_tx,
        };
        (bridge, ends)
    }
}

impl NetworkBridge for ChannelBridge {
    fn send(&mut self, request: &MoveRequest) -> Result<()> {
        let packet = request.to_json().context("failed to encode move request")?;
        if self.outbound.send(packet).is_err() {
            bail!("transport hung up");
        }
        Ok(())
    }

    fn poll(&mut self) -> Option<String> {
        match self.inbound.try_recv() {
            Ok(packet) => Some(packet),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::debug!("Transport closed its inbound channel");
                None
            }
        }
    }
}
