//! CQRS marker traits
//!
//! Every request type registered with the mediator is either a [`Command`]
//! (changes state) or a [`Query`] (reads state). Routes map commands to
//! POST/PUT/DELETE and queries to GET.

/// A request that modifies state
pub trait Command {}

/// A request that only reads state
pub trait Query {}
