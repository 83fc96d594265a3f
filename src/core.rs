use never::Never;
use std::{
    error::Error,
    fmt::{self, Debug},
    ops::Deref,
    sync::Arc,
};

/// A message passed to a [`Callbag`].
///
/// Downwards (source to sink) a callbag sees `Handshake`, `Data`, `Error` and `Terminate`.
/// Upwards (sink to source talkback) it sees `Request`, `Error` and `Terminate`.
#[derive(Clone, Debug)]
pub enum Message<I, O> {
    /// Opens the conversation. Carries the callbag to talk back to.
    Handshake(Arc<Callbag<O, I>>),
    /// One item of the sequence.
    Data(I),
    /// Additional demand from the sink. Must be positive.
    Request(i64),
    /// Terminates the conversation with a failure.
    Error(Arc<dyn Error + Send + Sync + 'static>),
    /// Terminates the conversation: completion downwards, cancellation upwards.
    Terminate,
}

/// A `Callbag` dynamically receives input of type `I` and dynamically delivers output of type `O`.
pub struct Callbag<I, O>(CallbagFn<I, O>);

/// A source only delivers data.
pub type Source<T> = Callbag<Never, T>;

/// A sink only receives data.
pub type Sink<T> = Callbag<T, Never>;

/// The boxed handler inside a [`Callbag`].
pub type CallbagFn<I, O> = Box<dyn Fn(Message<I, O>) + Send + Sync>;

impl<I, O> Deref for Callbag<I, O> {
    type Target = CallbagFn<I, O>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<I, O> Debug for Callbag<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Callbag<{}, {}>",
            std::any::type_name::<I>(),
            std::any::type_name::<O>(),
        )
    }
}

impl<I, O, F: 'static> From<F> for Callbag<I, O>
where
    F: Fn(Message<I, O>) + Send + Sync,
{
    fn from(handler: F) -> Self {
        Callbag(Box::new(handler))
    }
}
