use std::num::NonZeroUsize;
use std::sync::Arc;

use relay_parser::{LineParser, LineReader, RawLine};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::emitter::ResponseEmitter;
use crate::error::{error_chain, RelayError};
use crate::models::{Outcome, RelaySummary, RequestState};
use crate::reporter::ErrorReporter;

/// Reads lines, dispatches each parsed message as its own task and writes
/// outcomes in the order they complete.
///
/// Reading never waits on the network unless a `max_in_flight` limit is set
/// and reached. Once input ends, every request already dispatched is allowed
/// to finish before `run` returns.
pub struct Relay<P> {
    parser: P,
    dispatcher: Dispatcher,
    limiter: Option<Arc<Semaphore>>,
}

impl<P: LineParser> Relay<P> {
    pub fn new(parser: P, dispatcher: Dispatcher, max_in_flight: Option<NonZeroUsize>) -> Self {
        Self {
            parser,
            dispatcher,
            limiter: max_in_flight.map(|limit| Arc::new(Semaphore::new(limit.get()))),
        }
    }

    pub async fn run<R, O, E>(
        &self,
        input: R,
        output: O,
        errors: E,
    ) -> Result<RelaySummary, RelayError>
    where
        R: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
    {
        info!(
            "Relaying {} input to {} (limit: {:?})",
            self.parser.name(),
            self.dispatcher.url(),
            self.limiter.as_ref().map(|l| l.available_permits())
        );

        let mut lines = LineReader::new(input);
        let mut emitter = ResponseEmitter::new(output);
        let mut reporter = ErrorReporter::new(errors);
        let mut summary = RelaySummary::default();

        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<Outcome>();
        // Dropped at end of input; the channel then closes once the last
        // in-flight task has sent its outcome.
        let mut outcome_tx = Some(outcome_tx);

        loop {
            tokio::select! {
                line = lines.next_line(), if outcome_tx.is_some() => {
                    match line.map_err(RelayError::Input)? {
                        Some(line) => {
                            summary.lines_read += 1;
                            if let Some(tx) = &outcome_tx {
                                self.handle_line(line, tx, &mut reporter, &mut summary).await?;
                            }
                        }
                        None => {
                            debug!("Input ended with {} requests in flight", summary.in_flight());
                            outcome_tx = None;
                        }
                    }
                }
                Some(outcome) = outcome_rx.recv() => {
                    let state = outcome.state();
                    debug_assert!(state.is_terminal());
                    match outcome {
                        Outcome::Completed(body) => {
                            debug!("Request completed with {} byte body", body.len());
                            emitter.emit(&body).await.map_err(RelayError::Output)?;
                        }
                        Outcome::Failed(err) => {
                            debug!("Request failed: {}", error_chain(&err));
                            reporter.report_transport(&err).await;
                        }
                    }
                    summary.record(state);
                }
                else => break,
            }
        }

        info!(
            "Relay finished: {} lines, {} parse errors, {} completed, {} failed",
            summary.lines_read, summary.parse_errors, summary.completed, summary.failed
        );
        Ok(summary)
    }

    async fn handle_line<E: AsyncWrite + Unpin>(
        &self,
        line: RawLine,
        outcome_tx: &mpsc::UnboundedSender<Outcome>,
        reporter: &mut ErrorReporter<E>,
        summary: &mut RelaySummary,
    ) -> Result<(), RelayError> {
        let message = match self.parser.parse_line(&line.bytes) {
            Ok(message) => message,
            Err(err) => {
                debug!("Dropping line {}: {}", line.number, err);
                summary.parse_errors += 1;
                reporter.report_parse(line.number, &err).await;
                return Ok(());
            }
        };

        let permit = match &self.limiter {
            Some(limiter) => limiter.clone().acquire_owned().await.ok(),
            None => None,
        };

        debug!("Dispatching line {}", line.number);
        summary.record(RequestState::Pending);

        let dispatcher = self.dispatcher.clone();
        let outcome_tx = outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = Outcome::from(dispatcher.dispatch(message).await);
            drop(permit);
            if outcome_tx.send(outcome).is_err() {
                warn!("Relay stopped before a request outcome could be written");
            }
        });

        Ok(())
    }
}
