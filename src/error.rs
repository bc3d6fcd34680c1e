// Copyright (c) 2024 Mike Tsao

//! Errors reported by the drone and its tone backends.

use crate::types::{NodeUid, Seconds};
use thiserror::Error;

/// The ways that driving a drone can fail. Apart from
/// [DroneError::BackendUnavailable], every variant describes a caller
/// contract violation. None of them are worth retrying.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DroneError {
    /// The tone backend can't be constructed or used.
    #[error("tone backend is unavailable: {0}")]
    BackendUnavailable(String),

    /// The handle doesn't name a live node.
    #[error("node {0} doesn't exist")]
    UnknownNode(NodeUid),

    /// The node exists, but it's not the kind of node the operation needs.
    #[error("node {uid} is not a {expected}")]
    WrongNodeKind {
        /// The offending node.
        uid: NodeUid,
        /// What the operation needed.
        expected: &'static str,
    },

    /// The generator was deactivated and can never sound again.
    #[error("generator {0} has been stopped and can't be restarted or reprogrammed")]
    GeneratorStopped(NodeUid),

    /// The generator was asked to stop before it ever started.
    #[error("generator {0} was never activated")]
    GeneratorNotActivated(NodeUid),

    /// The connection would make the signal graph ill-formed.
    #[error("can't connect {from} to {to}: {reason}")]
    InvalidConnection {
        /// The upstream node.
        from: NodeUid,
        /// The downstream node.
        to: NodeUid,
        /// Why the connection was refused.
        reason: &'static str,
    },

    /// An automation point had a value the parameter can't take.
    #[error("can't automate to {value} at {when}: {reason}")]
    InvalidAutomation {
        /// The rejected value.
        value: f64,
        /// The requested time.
        when: Seconds,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// The drone profile's numbers can't produce a drone.
    #[error("invalid drone profile: {0}")]
    InvalidProfile(String),

    /// A voice slot beyond the pool's capacity was requested.
    #[error("voice slot {index} is out of range for a pool of {capacity}")]
    SlotOutOfRange {
        /// The requested slot.
        index: usize,
        /// The pool capacity.
        capacity: usize,
    },
}

/// Shorthand for results whose error is a [DroneError].
pub type Result<T> = core::result::Result<T, DroneError>;
