//! Per-connection queue-and-flush unit.

use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, info, warn};
use wire::{decode_message, encode_message, peek_kind, ChannelMessage, Limits, MessageKind, NetGuid, Where};

use crate::config::{CallOptions, ReplicationConfig};
use crate::error::{ReplicationError, ReplicationResult};
use crate::peer::PeerId;
use crate::signatures::{InboundSignatures, OutboundSignatures};
use crate::throttle::Throttle;
use crate::transport::Transport;

/// Lifecycle of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Created; not ticked yet.
    Open,
    /// Ticked at least once.
    Ticking,
    /// Closed; queues discarded.
    Closed,
}

/// What an enqueue did with a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    Queued,
    /// Dropped by the rate limit.
    Throttled,
}

#[derive(Debug, Clone)]
struct Outgoing {
    reliable: bool,
    bytes: Vec<u8>,
}

/// A call received on a channel, with its signature resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCall<'a> {
    pub flags: Where,
    pub recipient: NetGuid,
    pub signature: String,
    pub payload: &'a [u8],
}

/// One connection's outbound queue, inbound buffer and signature tables.
///
/// Outbound messages leave in enqueue order and stay queued until the
/// transport has accepted them. Inbound messages are handed out once, in
/// receipt order.
pub struct Channel {
    peer: PeerId,
    state: ChannelState,
    transport: Box<dyn Transport>,
    outbound: VecDeque<Outgoing>,
    inbound: Vec<Vec<u8>>,
    sent_signatures: OutboundSignatures,
    received_signatures: InboundSignatures,
    throttle: Throttle,
    limits: Limits,
    backlog_warning: usize,
    backlog_warned: bool,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("peer", &self.peer)
            .field("state", &self.state)
            .field("outbound", &self.outbound.len())
            .field("inbound", &self.inbound.len())
            .finish_non_exhaustive()
    }
}

impl Channel {
    #[must_use]
    pub fn new(peer: PeerId, transport: Box<dyn Transport>, config: &ReplicationConfig) -> Self {
        Self {
            peer,
            state: ChannelState::Open,
            transport,
            outbound: VecDeque::new(),
            inbound: Vec::new(),
            sent_signatures: OutboundSignatures::new(config.max_signatures),
            received_signatures: InboundSignatures::new(config.max_signatures),
            throttle: Throttle::new(),
            limits: config.wire.clone(),
            backlog_warning: config.backlog_warning,
            backlog_warned: false,
        }
    }

    #[must_use]
    pub const fn peer(&self) -> PeerId {
        self.peer
    }

    #[must_use]
    pub const fn state(&self) -> ChannelState {
        self.state
    }

    /// Number of messages waiting for the transport.
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.outbound.len()
    }

    /// Queues the identity assignment for a newly connected client.
    pub fn enqueue_init(&mut self, channel_id: u32) -> ReplicationResult<()> {
        self.ensure_open()?;
        let bytes = encode_message(&ChannelMessage::Init { channel_id }, &self.limits)?;
        self.push(bytes, true);
        Ok(())
    }

    /// Queues a call, defining its signature first if the peer has not seen it.
    pub fn enqueue_call(
        &mut self,
        flags: Where,
        recipient: NetGuid,
        signature: &str,
        payload: &[u8],
        options: CallOptions,
        now: Duration,
    ) -> ReplicationResult<Enqueued> {
        self.ensure_open()?;

        let (signature_id, definition) = match self.sent_signatures.get(signature) {
            Some(id) => {
                if !self
                    .throttle
                    .allows((recipient, id), options.max_calls_per_sec, now)
                {
                    debug!("{}: throttled {signature} to {recipient}", self.peer);
                    return Ok(Enqueued::Throttled);
                }
                (id, None)
            }
            None => {
                let id = self.sent_signatures.next_id()?;
                let definition = encode_message(
                    &ChannelMessage::SignatureDef { id, signature },
                    &self.limits,
                )?;
                (id, Some(definition))
            }
        };

        let call = encode_message(
            &ChannelMessage::Call {
                flags,
                recipient,
                signature_id,
                payload,
            },
            &self.limits,
        )?;

        if let Some(definition) = definition {
            debug!("{}: defining signature {signature_id} = {signature}", self.peer);
            self.sent_signatures.insert(signature, signature_id);
            self.push(definition, true);
        }
        self.throttle
            .record((recipient, signature_id), options.max_calls_per_sec, now);
        debug!(
            "{}: queued {signature} to {recipient} with {flags} ({} bytes)",
            self.peer,
            payload.len()
        );
        self.push(call, options.reliable);
        Ok(Enqueued::Queued)
    }

    /// Sends queued messages in order until the transport pushes back.
    ///
    /// Returns the number of messages sent.
    pub fn flush(&mut self) -> usize {
        let mut sent = 0;
        while let Some(front) = self.outbound.front() {
            if !self.transport.is_ready() {
                break;
            }
            self.transport.send(&front.bytes, front.reliable);
            self.outbound.pop_front();
            sent += 1;
        }

        let backlog = self.outbound.len();
        if backlog >= self.backlog_warning {
            if !self.backlog_warned {
                warn!("{}: outbound backlog at {backlog} messages", self.peer);
                self.backlog_warned = true;
            }
        } else {
            self.backlog_warned = false;
        }
        sent
    }

    /// Pulls received messages into the inbound buffer.
    ///
    /// `Init` messages are not buffered; their channel ids are returned for
    /// immediate handling.
    pub fn poll(&mut self) -> Vec<u32> {
        let mut inits = Vec::new();
        if self.state == ChannelState::Closed {
            return inits;
        }
        self.state = ChannelState::Ticking;
        for bytes in self.transport.receive() {
            if peek_kind(&bytes) != Ok(MessageKind::Init) {
                self.inbound.push(bytes);
                continue;
            }
            match decode_message(&bytes, &self.limits) {
                Ok(ChannelMessage::Init { channel_id }) => inits.push(channel_id),
                Ok(_) => {}
                Err(err) => warn!("{}: dropping malformed init: {err}", self.peer),
            }
        }
        inits
    }

    /// Takes every buffered inbound message, oldest first.
    pub fn take_inbound(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.inbound)
    }

    /// Interprets one inbound message.
    ///
    /// Signature definitions update the inbound table and yield `None`.
    pub fn read<'b>(&mut self, bytes: &'b [u8]) -> ReplicationResult<Option<InboundCall<'b>>> {
        match decode_message(bytes, &self.limits)? {
            ChannelMessage::Init { .. } => Ok(None),
            ChannelMessage::SignatureDef { id, signature } => {
                debug!("{}: peer defined signature {id} = {signature}", self.peer);
                self.received_signatures.define(id, signature)?;
                Ok(None)
            }
            ChannelMessage::Call {
                flags,
                recipient,
                signature_id,
                payload,
            } => {
                let signature = self
                    .received_signatures
                    .get(signature_id)
                    .ok_or(ReplicationError::UnknownSignature { id: signature_id })?
                    .to_owned();
                Ok(Some(InboundCall {
                    flags,
                    recipient,
                    signature,
                    payload,
                }))
            }
        }
    }

    /// Closes the channel and discards anything not yet sent or dispatched.
    ///
    /// Returns the number of outbound messages dropped.
    pub fn close(&mut self) -> usize {
        let dropped = self.outbound.len();
        self.outbound.clear();
        self.inbound.clear();
        self.state = ChannelState::Closed;
        info!("{}: channel closed, {dropped} unsent messages dropped", self.peer);
        dropped
    }

    fn ensure_open(&self) -> ReplicationResult<()> {
        if self.state == ChannelState::Closed {
            warn!("{}: enqueue on closed channel", self.peer);
            return Err(ReplicationError::ChannelClosed { peer: self.peer });
        }
        Ok(())
    }

    fn push(&mut self, bytes: Vec<u8>, reliable: bool) {
        self.outbound.push_back(Outgoing { reliable, bytes });
    }
}
