//! ROAP negotiation state machine
//!
//! The machine is a pure transition function: it consumes one [`RoapInput`]
//! at a time and returns the [`RoapAction`]s the caller must carry out.
//! Connection operations are requested through actions and their outcomes
//! come back as inputs, so transitions never interleave.
//!
//! ```text
//! idle ──request-offer──▶ creatingLocalOffer ──offer sent──▶ waitingForAnswer
//!  │                                                             │ ANSWER
//!  │ OFFER                                                       ▼
//!  ▼                                                     settingRemoteAnswer ──OK sent──▶ idle
//! settingRemoteOffer ──ANSWER sent──▶ waitingForOK ──OK──▶ idle
//! ```

use super::message::{ErrorType, MessageType, RoapMessage, RESERVED_TIE_BREAKER};
use crate::domain::munging::{self, MungingOptions};
use crate::domain::shared::error::RoapError;
use crate::domain::shared::events::NegotiationEvent;
use crate::domain::validation::{self, ValidationOptions};
use rand::Rng;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Upper bound of the randomised `retryAfter` hint sent with glare errors
const MAX_RETRY_AFTER: u32 = 10;

/// Negotiation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoapState {
    Idle,
    CreatingLocalOffer,
    WaitingForAnswer,
    SettingRemoteAnswer,
    SettingRemoteOffer,
    WaitingForOk,
    RemoteError,
    BrowserError,
}

impl RoapState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoapState::Idle => "idle",
            RoapState::CreatingLocalOffer => "creatingLocalOffer",
            RoapState::WaitingForAnswer => "waitingForAnswer",
            RoapState::SettingRemoteAnswer => "settingRemoteAnswer",
            RoapState::SettingRemoteOffer => "settingRemoteOffer",
            RoapState::WaitingForOk => "waitingForOK",
            RoapState::RemoteError => "remoteError",
            RoapState::BrowserError => "browserError",
        }
    }

    /// Failed states are never left automatically
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoapState::RemoteError | RoapState::BrowserError)
    }
}

impl fmt::Display for RoapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events fed into the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoapInput {
    /// The application wants a new offer
    InitiateOffer,
    /// A message from the remote peer
    RemoteMessage(RoapMessage),
    /// Raw SDP returned by `create_local_offer`
    LocalOfferCreated(String),
    LocalOfferFailed(String),
    /// Raw answer SDP returned by `accept_remote_offer`
    RemoteOfferAccepted(String),
    RemoteOfferFailed(String),
    RemoteAnswerAccepted,
    RemoteAnswerFailed(String),
}

impl RoapInput {
    pub fn name(&self) -> &'static str {
        match self {
            RoapInput::InitiateOffer => "initiate-offer",
            RoapInput::RemoteMessage(_) => "remote-message",
            RoapInput::LocalOfferCreated(_) => "local-offer-created",
            RoapInput::LocalOfferFailed(_) => "local-offer-failed",
            RoapInput::RemoteOfferAccepted(_) => "remote-offer-accepted",
            RoapInput::RemoteOfferFailed(_) => "remote-offer-failed",
            RoapInput::RemoteAnswerAccepted => "remote-answer-accepted",
            RoapInput::RemoteAnswerFailed(_) => "remote-answer-failed",
        }
    }
}

/// Effects to execute after a transition, in order
#[derive(Debug, Clone)]
pub enum RoapAction {
    /// Call `create_local_offer` and report back with an input
    CreateLocalOffer,
    /// Call `accept_remote_offer` with already munged SDP
    AcceptRemoteOffer(String),
    /// Call `accept_remote_answer` with already munged SDP
    AcceptRemoteAnswer(String),
    /// Deliver a message to the remote peer
    Send(RoapMessage),
    /// Publish a lifecycle event
    Emit(NegotiationEvent),
    /// Complete every queued `initiate_offer` request successfully
    ResolvePendingOffers,
    /// Fail every queued `initiate_offer` request
    RejectPendingOffers(RoapError),
}

/// Tunables of one negotiation session
#[derive(Debug, Clone)]
pub struct NegotiationOptions {
    pub initial_seq: u32,
    pub max_retries: u32,
    pub tie_breaker: u32,
    pub munging: MungingOptions,
    /// Run validation on every munged local offer and answer
    pub validate_local_sdp: bool,
    pub validation: ValidationOptions,
}

impl Default for NegotiationOptions {
    fn default() -> Self {
        Self {
            initial_seq: 0,
            max_retries: 2,
            tie_breaker: RESERVED_TIE_BREAKER,
            munging: MungingOptions::default(),
            validate_local_sdp: false,
            validation: ValidationOptions::default(),
        }
    }
}

/// Mutable bookkeeping owned by one machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NegotiationContext {
    pub seq: u32,
    /// An offer was requested while another step was in progress
    pub pending_local_offer: bool,
    pub responding_to_offer_request: bool,
    pub retry_count: u32,
}

/// State machine for one peer connection
#[derive(Debug)]
pub struct RoapStateMachine {
    state: RoapState,
    context: NegotiationContext,
    options: NegotiationOptions,
}

impl RoapStateMachine {
    pub fn new(options: NegotiationOptions) -> Self {
        Self {
            state: RoapState::Idle,
            context: NegotiationContext {
                seq: options.initial_seq,
                ..Default::default()
            },
            options,
        }
    }

    pub fn state(&self) -> RoapState {
        self.state
    }

    pub fn seq(&self) -> u32 {
        self.context.seq
    }

    pub fn context(&self) -> &NegotiationContext {
        &self.context
    }

    pub fn options(&self) -> &NegotiationOptions {
        &self.options
    }

    /// Message intake.
    ///
    /// Messages older than the current sequence number never reach the
    /// transition function: they are answered with `OUT_OF_ORDER`, except
    /// stale errors, which are dropped to avoid error loops.
    pub fn receive(&mut self, message: RoapMessage) -> Vec<RoapAction> {
        if self.state.is_terminal() {
            debug!(
                "Ignoring {} in terminal state {}",
                message, self.state
            );
            return Vec::new();
        }

        if message.seq < self.context.seq {
            if message.is_error() {
                debug!(
                    "Dropping stale {} (current seq {})",
                    message, self.context.seq
                );
                return Vec::new();
            }
            warn!(
                "Rejecting out of order {} (current seq {})",
                message, self.context.seq
            );
            return vec![RoapAction::Send(RoapMessage::error(
                message.seq,
                ErrorType::OutOfOrder,
            ))];
        }

        self.handle(RoapInput::RemoteMessage(message))
    }

    /// Run one transition
    pub fn handle(&mut self, input: RoapInput) -> Vec<RoapAction> {
        let mut actions = Vec::new();
        let input_name = input.name();

        match (self.state, input) {
            (state, RoapInput::InitiateOffer) if state.is_terminal() => {
                warn!("Offer requested in failed state {}", state);
                actions.push(RoapAction::RejectPendingOffers(
                    RoapError::NegotiationFailed(format!("negotiation is in {} state", state)),
                ));
            }
            (RoapState::Idle, RoapInput::InitiateOffer) => self.start_local_offer(&mut actions),
            (state, RoapInput::InitiateOffer) => {
                debug!("Queueing offer request while in {}", state);
                self.context.pending_local_offer = true;
            }

            (_, RoapInput::RemoteMessage(message)) => self.handle_remote(message, &mut actions),

            (RoapState::CreatingLocalOffer, RoapInput::LocalOfferCreated(sdp)) => {
                self.on_local_offer_created(&sdp, &mut actions)
            }
            (RoapState::CreatingLocalOffer, RoapInput::LocalOfferFailed(reason)) => {
                self.enter_browser_error(RoapError::LocalOperation(reason), &mut actions)
            }

            (RoapState::SettingRemoteOffer, RoapInput::RemoteOfferAccepted(sdp)) => {
                self.on_remote_offer_accepted(&sdp, &mut actions)
            }
            (RoapState::SettingRemoteOffer, RoapInput::RemoteOfferFailed(reason)) => {
                self.send_failure(&reason, &mut actions);
                self.enter_browser_error(RoapError::LocalOperation(reason), &mut actions);
            }

            (RoapState::SettingRemoteAnswer, RoapInput::RemoteAnswerAccepted) => {
                actions.push(RoapAction::Send(RoapMessage::ok(self.context.seq)));
                self.context.responding_to_offer_request = false;
                info!("Negotiation done (seq {})", self.context.seq);
                actions.push(RoapAction::Emit(NegotiationEvent::Done));
                self.enter_idle(&mut actions);
            }
            (RoapState::SettingRemoteAnswer, RoapInput::RemoteAnswerFailed(reason)) => {
                self.send_failure(&reason, &mut actions);
                self.enter_browser_error(RoapError::LocalOperation(reason), &mut actions);
            }

            (state, _) => warn!("Ignoring {} in state {}", input_name, state),
        }

        actions
    }

    fn handle_remote(&mut self, message: RoapMessage, actions: &mut Vec<RoapAction>) {
        if self.state.is_terminal() {
            debug!("Ignoring {} in terminal state {}", message, self.state);
            return;
        }

        if message.message_type.requires_sdp() && message.sdp.is_none() {
            warn!("Received {} without SDP", message);
            actions.push(RoapAction::Send(
                RoapMessage::error(message.seq, ErrorType::Failed)
                    .with_error_cause(format!("{} without SDP", message.message_type)),
            ));
            return;
        }

        match (self.state, message.message_type) {
            (RoapState::Idle, MessageType::Offer | MessageType::OfferRequest) => {
                self.on_remote_offer(message, actions)
            }

            (
                RoapState::CreatingLocalOffer | RoapState::WaitingForAnswer,
                MessageType::Offer | MessageType::OfferRequest,
            ) => self.resolve_glare(&message, actions),

            (RoapState::WaitingForAnswer, MessageType::Answer) => {
                self.on_remote_answer(message, actions)
            }
            (RoapState::WaitingForAnswer, MessageType::Error) => {
                self.on_offer_error(&message, actions)
            }

            (RoapState::WaitingForOk, MessageType::Ok) => {
                if message.seq != self.context.seq {
                    self.send_out_of_order(&message, actions);
                    return;
                }
                info!("Negotiation done (seq {})", self.context.seq);
                actions.push(RoapAction::Emit(NegotiationEvent::Done));
                self.enter_idle(actions);
            }
            (RoapState::WaitingForOk, MessageType::Error) => {
                if message.seq == self.context.seq {
                    self.enter_remote_error(&message, actions);
                } else {
                    debug!("Ignoring {} (current seq {})", message, self.context.seq);
                }
            }

            (state, MessageType::Error) => {
                debug!("Dropping {} in state {}", message, state);
            }
            (state, _) => {
                warn!("Unexpected {} in state {}", message, state);
                actions.push(RoapAction::Send(RoapMessage::error(
                    message.seq,
                    ErrorType::InvalidState,
                )));
            }
        }
    }

    fn on_remote_offer(&mut self, message: RoapMessage, actions: &mut Vec<RoapAction>) {
        if message.seq == self.context.seq {
            self.send_out_of_order(&message, actions);
            return;
        }
        self.context.seq = message.seq;

        if message.message_type == MessageType::OfferRequest {
            info!("Remote requested an offer (seq {})", message.seq);
            self.context.responding_to_offer_request = true;
            actions.push(RoapAction::Emit(NegotiationEvent::Started));
            self.enter_creating_local_offer(actions);
            return;
        }

        let sdp = message.sdp.unwrap_or_default();
        match munging::munge_remote_sdp(&self.options.munging, &sdp) {
            Ok(sdp) => {
                info!("Received remote offer (seq {})", message.seq);
                actions.push(RoapAction::Emit(NegotiationEvent::Started));
                self.transition(RoapState::SettingRemoteOffer);
                actions.push(RoapAction::AcceptRemoteOffer(sdp));
            }
            Err(e) => {
                warn!("Rejecting remote offer: {}", e);
                self.send_failure(&e.to_string(), actions);
            }
        }
    }

    fn on_remote_answer(&mut self, message: RoapMessage, actions: &mut Vec<RoapAction>) {
        if message.seq != self.context.seq {
            self.send_out_of_order(&message, actions);
            return;
        }

        let sdp = message.sdp.unwrap_or_default();
        match munging::munge_remote_sdp(&self.options.munging, &sdp) {
            Ok(sdp) => {
                self.context.retry_count = 0;
                self.context.seq = message.seq;
                self.transition(RoapState::SettingRemoteAnswer);
                actions.push(RoapAction::AcceptRemoteAnswer(sdp));
            }
            Err(e) => {
                self.send_failure(&e.to_string(), actions);
                self.enter_browser_error(RoapError::Sdp(e), actions);
            }
        }
    }

    fn on_offer_error(&mut self, message: &RoapMessage, actions: &mut Vec<RoapAction>) {
        if message.seq != self.context.seq {
            debug!("Ignoring {} (current seq {})", message, self.context.seq);
            return;
        }

        // a retry needs a fresh sequence number; none left means give up
        let retry_seq = self.context.seq.checked_add(1);
        match (message.error_type, retry_seq) {
            (Some(error_type), Some(seq))
                if error_type.is_retryable()
                    && self.context.retry_count < self.options.max_retries =>
            {
                self.context.seq = seq;
                self.context.retry_count += 1;
                warn!(
                    "Remote answered {}; retrying offer (attempt {}/{}, seq {})",
                    error_type, self.context.retry_count, self.options.max_retries, self.context.seq
                );
                self.enter_creating_local_offer(actions);
            }
            _ => self.enter_remote_error(message, actions),
        }
    }

    fn on_local_offer_created(&mut self, raw_sdp: &str, actions: &mut Vec<RoapAction>) {
        if self.context.pending_local_offer {
            debug!("Offer requested while creating one; creating again");
            self.enter_creating_local_offer(actions);
            return;
        }

        let sdp = match self.prepare_local_sdp(raw_sdp) {
            Ok(sdp) => sdp,
            Err(e) => {
                self.enter_browser_error(e, actions);
                return;
            }
        };

        let message = if self.context.responding_to_offer_request {
            RoapMessage::offer_response(self.context.seq, sdp)
        } else {
            RoapMessage::offer(self.context.seq, sdp, self.options.tie_breaker)
        };
        info!("Sending {}", message);
        actions.push(RoapAction::Send(message));
        actions.push(RoapAction::ResolvePendingOffers);
        self.transition(RoapState::WaitingForAnswer);
    }

    fn on_remote_offer_accepted(&mut self, raw_sdp: &str, actions: &mut Vec<RoapAction>) {
        match self.prepare_local_sdp(raw_sdp) {
            Ok(sdp) => {
                let message = RoapMessage::answer(self.context.seq, sdp);
                info!("Sending {}", message);
                actions.push(RoapAction::Send(message));
                self.transition(RoapState::WaitingForOk);
            }
            Err(e) => {
                self.send_failure(&e.to_string(), actions);
                self.enter_browser_error(e, actions);
            }
        }
    }

    /// Munge SDP from the local connection and optionally validate it
    fn prepare_local_sdp(&self, raw_sdp: &str) -> Result<String, RoapError> {
        let sdp = munging::munge_local_sdp(&self.options.munging, raw_sdp)?;
        if self.options.validate_local_sdp {
            if let Some(reason) = validation::is_invalid(&self.options.validation, &sdp) {
                return Err(RoapError::InvalidSdp(reason.to_string()));
            }
        }
        Ok(sdp)
    }

    fn resolve_glare(&self, message: &RoapMessage, actions: &mut Vec<RoapAction>) {
        let error_type = if self.options.tie_breaker == RESERVED_TIE_BREAKER {
            ErrorType::DoubleConflict
        } else {
            ErrorType::Conflict
        };
        let retry_after = rand::thread_rng().gen_range(0..=MAX_RETRY_AFTER);

        warn!(
            "Glare: received {} while in {}, answering {}",
            message, self.state, error_type
        );
        actions.push(RoapAction::Send(
            RoapMessage::error(message.seq, error_type).with_retry_after(retry_after),
        ));
    }

    fn start_local_offer(&mut self, actions: &mut Vec<RoapAction>) {
        let Some(seq) = self.context.seq.checked_add(1) else {
            self.enter_browser_error(
                RoapError::NegotiationFailed(format!(
                    "no sequence number left after {}",
                    self.context.seq
                )),
                actions,
            );
            return;
        };
        self.context.seq = seq;
        info!("Starting local offer (seq {})", self.context.seq);
        actions.push(RoapAction::Emit(NegotiationEvent::Started));
        self.enter_creating_local_offer(actions);
    }

    fn enter_creating_local_offer(&mut self, actions: &mut Vec<RoapAction>) {
        self.transition(RoapState::CreatingLocalOffer);
        self.context.pending_local_offer = false;
        actions.push(RoapAction::CreateLocalOffer);
    }

    fn enter_idle(&mut self, actions: &mut Vec<RoapAction>) {
        self.transition(RoapState::Idle);
        if self.context.pending_local_offer {
            self.start_local_offer(actions);
        }
    }

    fn enter_browser_error(&mut self, cause: RoapError, actions: &mut Vec<RoapAction>) {
        error!("Local operation failed: {}", cause);
        self.transition(RoapState::BrowserError);
        self.fail(cause, actions);
    }

    fn enter_remote_error(&mut self, message: &RoapMessage, actions: &mut Vec<RoapAction>) {
        let error_type = message
            .error_type
            .map(|t| t.as_str())
            .unwrap_or("unknown");
        let mut reason = format!("remote error {}", error_type);
        if let Some(ref cause) = message.error_cause {
            reason = format!("{}: {}", reason, cause);
        }

        error!("Negotiation failed: {}", reason);
        self.transition(RoapState::RemoteError);
        self.fail(RoapError::NegotiationFailed(reason), actions);
    }

    fn fail(&mut self, cause: RoapError, actions: &mut Vec<RoapAction>) {
        self.context.pending_local_offer = false;
        actions.push(RoapAction::Emit(NegotiationEvent::Failed {
            reason: cause.to_string(),
        }));
        actions.push(RoapAction::RejectPendingOffers(cause));
    }

    fn send_out_of_order(&self, message: &RoapMessage, actions: &mut Vec<RoapAction>) {
        warn!(
            "Rejecting {} as out of order (current seq {})",
            message, self.context.seq
        );
        actions.push(RoapAction::Send(RoapMessage::error(
            message.seq,
            ErrorType::OutOfOrder,
        )));
    }

    /// Generic error telling the peer that handling its SDP failed
    fn send_failure(&self, cause: &str, actions: &mut Vec<RoapAction>) {
        actions.push(RoapAction::Send(
            RoapMessage::error(self.context.seq, ErrorType::Failed).with_error_cause(cause),
        ));
    }

    fn transition(&mut self, next: RoapState) {
        if self.state != next {
            debug!("ROAP state {} -> {}", self.state, next);
        }
        self.state = next;
    }
}
