use arc_swap::ArcSwapOption;
use never::Never;
use std::sync::Arc;

use crate::{
    utils::{
        call,
        tracing::{instrument, trace},
    },
    Message, Source,
};

#[cfg(feature = "tracing")]
use {std::fmt, tracing::Span};

/// Callbag sink that consumes a demand-driven source one item at a time.
///
/// It requests a single item on handshake and another one from inside its `Data` handler, after
/// `f` has returned. The source never sends more than the sink has asked for.
///
/// # Examples
///
/// ```
/// use crossbeam_queue::SegQueue;
/// use std::sync::Arc;
///
/// use callbag_demand::{for_each, from_array};
///
/// let actual = Arc::new(SegQueue::new());
///
/// let source = from_array([10, 20, 30, 40]);
///
/// for_each({
///     let actual = Arc::clone(&actual);
///     move |x| {
///         println!("{x}");
///         actual.push(x);
///     }
/// })(source);
///
/// assert_eq!(
///     &{
///         let mut v = vec![];
///         while let Some(x) = actual.pop() {
///             v.push(x);
///         }
///         v
///     }[..],
///     [10, 20, 30, 40]
/// );
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(f)))]
pub fn for_each<
    #[cfg(not(feature = "tracing"))] T: 'static,
    #[cfg(feature = "tracing")] T: fmt::Debug + 'static,
    F: 'static,
    S,
>(
    f: F,
) -> Box<dyn Fn(S)>
where
    F: Fn(T) + Send + Sync + Clone,
    S: Into<Arc<Source<T>>>,
{
    #[cfg(feature = "tracing")]
    let for_each_fn_span = Span::current();
    Box::new(move |source| {
        instrument!(follows_from: &for_each_fn_span, "for_each");
        let source: Arc<Source<T>> = source.into();
        let talkback: ArcSwapOption<Source<T>> = ArcSwapOption::from(None);
        call!(
            source,
            Message::Handshake(Arc::new(
                {
                    let f = f.clone();
                    move |message: Message<T, Never>| {
                        trace!("from source: {message:?}");
                        match message {
                            Message::Handshake(source) => {
                                talkback.store(Some(source));
                                let talkback = talkback.load();
                                let talkback = talkback.as_ref().expect("source talkback not set");
                                call!(talkback, Message::Request(1), "to source: {message:?}");
                            },
                            Message::Data(data) => {
                                f(data);
                                let talkback = talkback.load();
                                if let Some(talkback) = talkback.as_ref() {
                                    call!(talkback, Message::Request(1), "to source: {message:?}");
                                }
                            },
                            Message::Request(_) => {
                                panic!("source must not request");
                            },
                            Message::Error(_) | Message::Terminate => {
                                talkback.store(None);
                            },
                        }
                    }
                }
                .into(),
            )),
            "to source: {message:?}"
        );
    })
}
