//! Negotiation session driver
//!
//! A [`Roap`] owns one state machine inside a dedicated task. Every input
//! (offer requests, remote messages, connection results) goes through one
//! FIFO inbox and is processed to completion before the next one, so
//! transitions never interleave. Connection operations run as separate
//! tasks and report back through the same inbox; while they are pending
//! the session keeps accepting remote messages.

use super::events::EventBroadcaster;
use super::metrics;
use super::registry::{NegotiationStatus, SessionEntry, SessionRegistry};
use crate::config::Config;
use crate::domain::roap::{
    ErrorType, MediaConnection, NegotiationOptions, RoapAction, RoapInput, RoapMessage, RoapState,
    RoapStateMachine,
};
use crate::domain::shared::error::RoapError;
use crate::domain::shared::events::{NegotiationEvent, RoapEvent};
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::SessionId;
use futures::future::{BoxFuture, FutureExt};
use std::sync::{Arc, Once};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn, Instrument};

static DESCRIBE_METRICS: Once = Once::new();

enum Command {
    InitiateOffer(oneshot::Sender<Result<()>>),
    Message(RoapMessage),
    Completed(RoapInput),
    AttachOutgoing(mpsc::UnboundedSender<RoapMessage>),
}

/// Handle to one negotiation session.
///
/// Dropping the handle stops the session once queued work is drained and
/// removes it from the registry.
pub struct Roap {
    id: SessionId,
    commands: mpsc::UnboundedSender<Command>,
    events: EventBroadcaster,
    status: watch::Receiver<NegotiationStatus>,
}

impl Roap {
    /// Start a session configured from `config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(connection: Arc<dyn MediaConnection>, config: &Config) -> Self {
        Self::with_options(
            connection,
            config.negotiation_options(),
            config.roap.event_capacity,
        )
    }

    /// Start a session with explicit options
    pub fn with_options(
        connection: Arc<dyn MediaConnection>,
        options: NegotiationOptions,
        event_capacity: usize,
    ) -> Self {
        DESCRIBE_METRICS.call_once(metrics::describe_metrics);

        let id = SessionId::new();
        let machine = RoapStateMachine::new(options);
        let (status_tx, status_rx) = watch::channel(NegotiationStatus {
            state: machine.state(),
            seq: machine.seq(),
        });
        let (commands, inbox) = mpsc::unbounded_channel();
        let events = EventBroadcaster::new(event_capacity);

        let actor = NegotiationActor {
            id,
            machine,
            connection,
            pending_offers: Vec::new(),
            outgoing: Vec::new(),
            events: events.clone(),
            status: status_tx,
            inbox,
            handle: commands.downgrade(),
        };
        let span = tracing::info_span!("roap", session = %id);
        tokio::spawn(actor.run().instrument(span));

        SessionRegistry::global().register(SessionEntry::new(
            id,
            format!("roap-{}", id),
            status_rx.clone(),
        ));
        info!("Negotiation session {} created", id);

        Self {
            id,
            commands,
            events,
            status: status_rx,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Request a new local offer.
    ///
    /// Resolves once the offer has been created, munged and handed out as a
    /// message-to-send event; not when it is answered. Requests made while
    /// an offer is already in flight share the next created offer.
    pub async fn initiate_offer(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::InitiateOffer(tx))
            .map_err(|_| RoapError::SessionClosed)?;
        rx.await.map_err(|_| RoapError::SessionClosed)?
    }

    /// Feed one message received from the remote peer
    pub fn roap_message_received(&self, message: RoapMessage) -> Result<()> {
        self.commands
            .send(Command::Message(message))
            .map_err(|_| RoapError::SessionClosed)
    }

    /// Decode a JSON message from the signaling channel and feed it
    pub fn roap_json_received(&self, json: &str) -> Result<()> {
        self.roap_message_received(RoapMessage::from_json(json)?)
    }

    /// Subscribe to events published from now on.
    ///
    /// Delivery is lossy: a subscriber that falls more than
    /// `event_capacity` events behind gets `RecvError::Lagged` and misses
    /// those events, `MessageToSend` included. Use
    /// [`Roap::outgoing_messages`] to relay messages to the peer.
    pub fn subscribe(&self) -> broadcast::Receiver<RoapEvent> {
        self.events.subscribe()
    }

    /// Every message for the remote peer from now on, in order and without
    /// loss.
    ///
    /// The messages are also published as `MessageToSend` events.
    pub fn outgoing_messages(&self) -> Result<mpsc::UnboundedReceiver<RoapMessage>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.commands
            .send(Command::AttachOutgoing(tx))
            .map_err(|_| RoapError::SessionClosed)?;
        Ok(rx)
    }

    pub fn state(&self) -> RoapState {
        self.status.borrow().state
    }

    pub fn seq(&self) -> u32 {
        self.status.borrow().seq
    }

    /// Watch state and sequence number changes
    pub fn watch_status(&self) -> watch::Receiver<NegotiationStatus> {
        self.status.clone()
    }

    /// Rename this session in the registry
    pub fn set_label(&self, label: impl Into<String>) {
        SessionRegistry::global().set_label(&self.id, label);
    }
}

impl Drop for Roap {
    fn drop(&mut self) {
        SessionRegistry::global().unregister(&self.id);
    }
}

struct NegotiationActor {
    id: SessionId,
    machine: RoapStateMachine,
    connection: Arc<dyn MediaConnection>,
    pending_offers: Vec<oneshot::Sender<Result<()>>>,
    outgoing: Vec<mpsc::UnboundedSender<RoapMessage>>,
    events: EventBroadcaster,
    status: watch::Sender<NegotiationStatus>,
    inbox: mpsc::UnboundedReceiver<Command>,
    /// Lets connection tasks report back without keeping the session alive
    handle: mpsc::WeakUnboundedSender<Command>,
}

impl NegotiationActor {
    async fn run(mut self) {
        debug!("Negotiation task started");

        while let Some(command) = self.inbox.recv().await {
            let actions = match command {
                Command::InitiateOffer(reply) => {
                    self.pending_offers.push(reply);
                    self.machine.handle(RoapInput::InitiateOffer)
                }
                Command::Message(message) => {
                    debug!("Received {}", message);
                    let is_error = message.is_error();
                    let actions = self.machine.receive(message);
                    if is_error
                        && actions
                            .iter()
                            .any(|a| matches!(a, RoapAction::CreateLocalOffer))
                    {
                        metrics::record_offer_retry();
                    }
                    actions
                }
                Command::Completed(input) => self.machine.handle(input),
                Command::AttachOutgoing(tx) => {
                    self.outgoing.push(tx);
                    continue;
                }
            };

            self.publish_status();
            self.execute(actions);
        }

        for reply in self.pending_offers.drain(..) {
            let _ = reply.send(Err(RoapError::SessionClosed));
        }
        debug!("Negotiation task for {} stopped", self.id);
    }

    fn execute(&mut self, actions: Vec<RoapAction>) {
        for action in actions {
            match action {
                RoapAction::CreateLocalOffer => {
                    let connection = self.connection.clone();
                    self.spawn_operation(
                        async move {
                            match connection.create_local_offer().await {
                                Ok(sdp) => RoapInput::LocalOfferCreated(sdp),
                                Err(e) => RoapInput::LocalOfferFailed(format!("{:#}", e)),
                            }
                        }
                        .boxed(),
                    );
                }
                RoapAction::AcceptRemoteOffer(sdp) => {
                    let connection = self.connection.clone();
                    self.spawn_operation(
                        async move {
                            match connection.accept_remote_offer(sdp).await {
                                Ok(answer) => RoapInput::RemoteOfferAccepted(answer),
                                Err(e) => RoapInput::RemoteOfferFailed(format!("{:#}", e)),
                            }
                        }
                        .boxed(),
                    );
                }
                RoapAction::AcceptRemoteAnswer(sdp) => {
                    let connection = self.connection.clone();
                    self.spawn_operation(
                        async move {
                            match connection.accept_remote_answer(sdp).await {
                                Ok(()) => RoapInput::RemoteAnswerAccepted,
                                Err(e) => RoapInput::RemoteAnswerFailed(format!("{:#}", e)),
                            }
                        }
                        .boxed(),
                    );
                }
                RoapAction::Send(message) => {
                    if let Some(
                        error_type @ (ErrorType::Conflict | ErrorType::DoubleConflict),
                    ) = message.error_type
                    {
                        metrics::record_glare(error_type);
                    }
                    self.outgoing.retain(|tx| tx.send(message.clone()).is_ok());
                    self.events
                        .publish(RoapEvent::new(NegotiationEvent::MessageToSend(message)));
                }
                RoapAction::Emit(event) => {
                    match event {
                        NegotiationEvent::Started => metrics::record_negotiation_started(),
                        NegotiationEvent::Done => metrics::record_negotiation_completed(),
                        NegotiationEvent::Failed { .. } => {
                            metrics::record_negotiation_failed(self.machine.state())
                        }
                        NegotiationEvent::MessageToSend(_) => {}
                    }
                    self.events.publish(RoapEvent::new(event));
                }
                RoapAction::ResolvePendingOffers => {
                    for reply in self.pending_offers.drain(..) {
                        let _ = reply.send(Ok(()));
                    }
                }
                RoapAction::RejectPendingOffers(cause) => {
                    for reply in self.pending_offers.drain(..) {
                        let _ = reply.send(Err(cause.clone()));
                    }
                }
            }
        }
    }

    /// Run a connection operation and feed its result back as an input
    fn spawn_operation(&self, operation: BoxFuture<'static, RoapInput>) {
        let handle = self.handle.clone();
        tokio::spawn(
            async move {
                let input = operation.await;
                match handle.upgrade() {
                    Some(commands) => {
                        let _ = commands.send(Command::Completed(input));
                    }
                    None => warn!("Session closed before {} was processed", input.name()),
                }
            }
            .in_current_span(),
        );
    }

    fn publish_status(&self) {
        let status = NegotiationStatus {
            state: self.machine.state(),
            seq: self.machine.seq(),
        };
        self.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }
}
