// Copyright (c) 2024 Mike Tsao

//! Traits used by services.

use crossbeam::channel::{Receiver, RecvError, SelectedOperation, Sender};

/// Service methods.
///
/// A service usually runs in its own thread and talks with clients over
/// crossbeam channels. It accepts Inputs and produces Events.
pub trait ProvidesService<I: core::fmt::Debug, E: core::fmt::Debug> {
    /// The sender side of the Input channel. Use this to send commands to the
    /// service.
    fn sender(&self) -> &Sender<I>;

    /// Sends an Input to the service, logging rather than failing if the
    /// service has gone away.
    fn send_input(&self, input: I) {
        if let Err(e) = self.sender().try_send(input) {
            log::warn!("while sending to service: {e:?}");
        }
    }

    /// The receiver side of the Event channel. Integrate this into a listener
    /// loop to respond to events.
    fn receiver(&self) -> &Receiver<E>;

    /// Completes a receive that was chosen by a crossbeam select loop.
    fn recv_operation<T>(oper: SelectedOperation, r: &Receiver<T>) -> Result<T, RecvError> {
        let result = oper.recv(r);
        if let Err(e) = &result {
            log::debug!("service channel {r:?} closed: {e}");
        }
        result
    }
}
