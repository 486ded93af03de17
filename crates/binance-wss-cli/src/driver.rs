/*
[INPUT]:  A connected StreamSession, an interrupt future and an event sink
[OUTPUT]: Events forwarded to the sink until interrupt, error or stream end
[POS]:    Driver layer - interactive life of one subscription
[UPDATE]: When changing shutdown priority or session end conditions
*/

use std::future::Future;
use std::io;

use binance_wss_adapter::{StreamError, StreamSession};
use thiserror::Error;
use tracing::{debug, info};

use crate::output::EventSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Stopping,
    Closed,
}

/// Why a session ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The interrupt fired and shutdown was acknowledged
    Interrupted,
    /// Both flows closed without an error after a stop requested through a
    /// [`StopHandle`](binance_wss_adapter::StopHandle)
    StreamEnded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Events written to the sink
    pub events: u64,
    pub reason: StopReason,
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// The sink rejected an event; the session was stopped first
    #[error("failed to write event: {0}")]
    Output(#[from] io::Error),
}

impl DriverError {
    pub fn is_stream_error(&self) -> bool {
        matches!(self, DriverError::Stream(_))
    }
}

/// Drive one session to completion.
///
/// Waits on the interrupt, the message flow and the error flow, in that
/// priority. An interrupt issues a stop and waits for its acknowledgment;
/// from then on neither the interrupt nor the error flow is observed. A
/// session error ends the run immediately since the decode task has already
/// closed the connection. Both flows closing without an error ends the run
/// with [`StopReason::StreamEnded`].
pub async fn run_session<I, S>(
    session: StreamSession,
    interrupt: I,
    sink: &mut S,
) -> Result<SessionOutcome, DriverError>
where
    I: Future<Output = ()>,
    S: EventSink + ?Sized,
{
    let url = session.url().to_string();
    let (mut messages, mut errors, stop) = session.into_parts();
    let mut interrupt = Box::pin(interrupt);
    let mut state = DriverState::Running;
    let mut events: u64 = 0;
    let mut messages_open = true;

    debug!(url = %url, "session driver running");

    let reason = loop {
        if !messages_open && errors.is_terminated() {
            break StopReason::StreamEnded;
        }
        tokio::select! {
            biased;
            _ = &mut interrupt => {
                break StopReason::Interrupted;
            }
            event = messages.recv(), if messages_open => match event {
                Some(event) => {
                    if let Err(err) = sink.emit(&event) {
                        transition(&mut state, DriverState::Stopping);
                        stop.stop().await;
                        transition(&mut state, DriverState::Closed);
                        return Err(DriverError::Output(err));
                    }
                    events += 1;
                }
                None => {
                    debug!(url = %url, events, "message flow closed");
                    messages_open = false;
                }
            },
            err = errors.recv(), if !errors.is_terminated() => {
                if let Some(err) = err {
                    transition(&mut state, DriverState::Closed);
                    return Err(err.into());
                }
            }
        }
    };

    drop(interrupt);
    transition(&mut state, DriverState::Stopping);
    match reason {
        StopReason::Interrupted => stop.stop().await,
        StopReason::StreamEnded => stop.closed().await,
    }
    transition(&mut state, DriverState::Closed);

    info!(url = %url, events, ?reason, "kline session closed");
    Ok(SessionOutcome { events, reason })
}

fn transition(state: &mut DriverState, next: DriverState) {
    debug!(from = ?*state, to = ?next, "session driver transition");
    *state = next;
}
