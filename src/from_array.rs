use std::{iter::IntoIterator, sync::Arc};

use crate::{
    subscription::Subscription,
    utils::{
        call,
        tracing::{instrument, trace},
    },
    Message, Source,
};

#[cfg(feature = "tracing")]
use {std::fmt, tracing::Span};

/// Converts an [iterable][`IntoIterator`] into a callbag source that only sends data on demand.
///
/// The items are collected once; every sink that handshakes gets its own subscription over the
/// same items. A sink asks for items with [`Message::Request`] and stops the source with
/// [`Message::Terminate`]. After the last item the source sends [`Message::Terminate`].
///
/// A sink may request more from inside its own `Data` handler. The extra demand is picked up by
/// the delivery loop that is already running, so arbitrarily long sequences never grow the stack.
///
/// # Examples
///
/// ```
/// use arc_swap::ArcSwapOption;
/// use crossbeam_queue::SegQueue;
/// use never::Never;
/// use std::sync::Arc;
///
/// use callbag_demand::{from_array, Message};
///
/// let actual = Arc::new(SegQueue::new());
///
/// let source = from_array([10, 20, 30, 40]);
///
/// let talkback = Arc::new(ArcSwapOption::from(None));
/// source(Message::Handshake(Arc::new(
///     {
///         let actual = Arc::clone(&actual);
///         let talkback = Arc::clone(&talkback);
///         move |message: Message<_, Never>| match message {
///             Message::Handshake(source) => {
///                 talkback.store(Some(source));
///             },
///             Message::Data(x) => {
///                 actual.push(format!("{x}"));
///             },
///             Message::Terminate => {
///                 actual.push("done".to_owned());
///             },
///             _ => {},
///         }
///     }
///     .into(),
/// )));
///
/// let request = |n| {
///     let talkback = talkback.load();
///     let talkback = talkback.as_ref().unwrap();
///     talkback(Message::Request(n));
/// };
/// request(1);
/// assert_eq!(actual.len(), 1);
/// request(10);
///
/// assert_eq!(
///     &{
///         let mut v = vec![];
///         while let Some(x) = actual.pop() {
///             v.push(x);
///         }
///         v
///     }[..],
///     ["10", "20", "30", "40", "done"]
/// );
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(items)))]
pub fn from_array<
    #[cfg(not(feature = "tracing"))] T: 'static,
    #[cfg(feature = "tracing")] T: fmt::Debug + 'static,
    I,
>(
    items: I,
) -> Source<T>
where
    T: Clone + Send + Sync,
    I: IntoIterator<Item = T>,
{
    from_slots(items.into_iter().map(Some))
}

/// Like [`from_array`], but the sequence may contain holes.
///
/// Reaching a `None` slot ends the subscription with [`Error::NullElement`](crate::Error) after
/// every item before it has been delivered.
///
/// # Examples
///
/// ```
/// use crossbeam_queue::SegQueue;
/// use never::Never;
/// use std::sync::Arc;
///
/// use callbag_demand::{from_slots, Error, Message};
///
/// let actual = Arc::new(SegQueue::new());
///
/// let source = from_slots([Some("a"), Some("b"), None, Some("d")]);
///
/// source(Message::Handshake(Arc::new(
///     {
///         let actual = Arc::clone(&actual);
///         move |message: Message<_, Never>| match message {
///             Message::Handshake(talkback) => {
///                 talkback(Message::Request(10));
///             },
///             Message::Data(x) => {
///                 actual.push(Ok(x));
///             },
///             Message::Error(error) => {
///                 actual.push(Err(*error.downcast_ref::<Error>().unwrap()));
///             },
///             _ => {},
///         }
///     }
///     .into(),
/// )));
///
/// assert_eq!(actual.pop(), Some(Ok("a")));
/// assert_eq!(actual.pop(), Some(Ok("b")));
/// assert_eq!(actual.pop(), Some(Err(Error::NullElement { index: 2 })));
/// assert_eq!(actual.pop(), None);
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(slots)))]
pub fn from_slots<
    #[cfg(not(feature = "tracing"))] T: 'static,
    #[cfg(feature = "tracing")] T: fmt::Debug + 'static,
    I,
>(
    slots: I,
) -> Source<T>
where
    T: Clone + Send + Sync,
    I: IntoIterator<Item = Option<T>>,
{
    #[cfg(feature = "tracing")]
    let from_slots_fn_span = Span::current();
    let items: Arc<[Option<T>]> = slots.into_iter().collect();
    (move |message| {
        instrument!(
            follows_from: &from_slots_fn_span,
            "from_slots",
            from_slots_span
        );
        trace!("from sink: {message:?}");
        if let Message::Handshake(sink) = message {
            let subscription = Arc::new(Subscription::new(Arc::clone(&items), Arc::clone(&sink)));
            trace!("subscribed: {subscription:?}");
            call!(
                sink,
                Message::Handshake(Arc::new(
                    {
                        #[cfg(feature = "tracing")]
                        let from_slots_span = from_slots_span.clone();
                        move |message| {
                            instrument!(parent: &from_slots_span, "sink_talkback");
                            trace!("from sink: {message:?}");
                            match message {
                                Message::Handshake(_) => {
                                    panic!("sink handshake has already occurred");
                                },
                                Message::Data(_) => {
                                    panic!("sink must not send data");
                                },
                                Message::Request(n) => {
                                    subscription.request(n);
                                },
                                Message::Error(_) | Message::Terminate => {
                                    subscription.cancel();
                                },
                            }
                        }
                    }
                    .into(),
                )),
                "to sink: {message:?}"
            );
        }
    })
    .into()
}
