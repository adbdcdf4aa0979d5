use super::{Trigger, TriggerError};
use crate::context::FileEvent;
use log::debug;
use std::sync::{atomic::AtomicU8, mpsc::Sender};

/// A trigger that terminates the program on a signal.
///
/// The first signal stops the intake of new events and lets the event in progress
/// finish. A second signal exits right away.
pub struct SignalTrigger {
    trigger_count: AtomicU8,
}

impl SignalTrigger {
    pub fn new() -> SignalTrigger {
        SignalTrigger {
            trigger_count: AtomicU8::new(0),
        }
    }

    /// Handle the incoming signals, returns the signal that asked for an immediate exit.
    #[cfg(unix)]
    fn listen_inner<I>(
        &self,
        tx: Sender<Option<FileEvent>>,
        signals: I,
    ) -> Result<Option<i32>, TriggerError>
    where
        I: IntoIterator<Item = i32>,
    {
        use log::{error, info};
        use std::sync::atomic::Ordering;
        for signal in signals.into_iter() {
            let previous = self.trigger_count.fetch_add(1, Ordering::Acquire);
            if previous == 0 {
                info!("Quitting after the current file is handled...");
                debug!("Got signal {signal}.");
                if tx.send(None).is_err() {
                    error!("Failed terminating the application with signal {signal}.");
                }
            } else {
                debug!("Got signal {signal}, terminating right now.");
                return Ok(Some(signal));
            }
        }

        Ok(None)
    }
}

impl Default for SignalTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl Trigger for SignalTrigger {
    /// Iterates over the terminating signals and stops the main loop.
    #[cfg(unix)]
    fn listen(&self, tx: Sender<Option<FileEvent>>) -> Result<(), TriggerError> {
        use signal_hook::{
            consts::TERM_SIGNALS,
            iterator::{exfiltrator::SignalOnly, SignalsInfo},
        };
        let mut signals = SignalsInfo::<SignalOnly>::new(TERM_SIGNALS)
            .map_err(|err| TriggerError::Misconfigured(err.to_string()))?;
        if let Some(signal) = self.listen_inner(tx, &mut signals)? {
            use std::{process, thread::sleep, time::Duration};
            // Allow a little time for the clean shutdown to still happen.
            sleep(Duration::from_millis(100));
            process::exit(signal);
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn listen(&self, _tx: Sender<Option<FileEvent>>) -> Result<(), TriggerError> {
        debug!("Signal handlers are not supported on non-unix systems.");

        Ok(())
    }
}
