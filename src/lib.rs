//! Demand-driven sources speaking the [callbag] protocol.
//!
//! A source built with [`from_array`] or [`from_slots`] only sends what its sink asked for. The sink
//! receives a talkback in [`Message::Handshake`] and uses it to send [`Message::Request`] with the
//! number of additional items it is willing to take, or [`Message::Terminate`] to cancel. The
//! source answers with [`Message::Data`] and finally exactly one of [`Message::Terminate`]
//! (completion) or [`Message::Error`] (an [`Error`]), unless the sink cancelled first.
//!
//! [callbag]: https://github.com/callbag/callbag

pub use crate::{
    core::{Callbag, CallbagFn, Message, Sink, Source},
    error::Error,
    for_each::for_each,
    from_array::{from_array, from_slots},
};

mod core;
mod error;
mod for_each;
mod from_array;
mod subscription;
mod utils;
