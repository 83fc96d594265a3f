use arc_swap::ArcSwapOption;
use crossbeam_queue::SegQueue;
use never::Never;
use std::sync::Arc;

use callbag_demand::{Error, Message, Sink, Source};

pub trait VariantName {
    fn variant_name(&self) -> &'static str;
}

impl<I, O> VariantName for Message<I, O> {
    fn variant_name(&self) -> &'static str {
        match self {
            Message::Handshake(_) => "Handshake",
            Message::Data(_) => "Data",
            Message::Request(_) => "Request",
            Message::Error(_) => "Error",
            Message::Terminate => "Terminate",
        }
    }
}

#[allow(unused_macros)]
macro_rules! array_queue {
    ($($x:expr),* $(,)?) => {
        {
            let items = [$($x),*];
            let queue = ::crossbeam_queue::ArrayQueue::new(items.len().max(1));
            for item in items {
                queue.push(item).ok().unwrap();
            }
            queue
        }
    };
}
#[allow(unused_imports)]
pub(crate) use array_queue;

/// What a sink observed, with errors already downcast.
#[derive(Debug, PartialEq, Eq)]
pub enum Signal<T> {
    Handshake,
    Data(T),
    Error(Error),
    Terminate,
}

/// Sink state shared between the test body and the sink's handler.
pub struct Recorder<T> {
    signals: SegQueue<Signal<T>>,
    talkback: ArcSwapOption<Source<T>>,
}

#[allow(dead_code)]
impl<T> Recorder<T> {
    pub fn request(&self, n: i64) {
        let talkback = self.talkback.load();
        let talkback = talkback.as_ref().expect("source talkback not set");
        talkback(Message::Request(n));
    }

    pub fn cancel(&self) {
        let talkback = self.talkback.load();
        let talkback = talkback.as_ref().expect("source talkback not set");
        talkback(Message::Terminate);
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn take(&self) -> Vec<Signal<T>> {
        let mut v = vec![];
        while let Some(signal) = self.signals.pop() {
            v.push(signal);
        }
        v
    }
}

/// Builds a sink that records every signal and lets the test react to the handshake and to each
/// item from inside the handler.
#[allow(dead_code)]
pub fn make_recording_sink<T: 'static, H: 'static, D: 'static>(
    on_handshake: H,
    on_data: D,
) -> (Arc<Recorder<T>>, Arc<Sink<T>>)
where
    T: Clone + Send + Sync,
    H: Fn(&Recorder<T>) + Send + Sync,
    D: Fn(&Recorder<T>, &T) + Send + Sync,
{
    let recorder = Arc::new(Recorder {
        signals: SegQueue::new(),
        talkback: ArcSwapOption::from(None),
    });
    let sink = Arc::new(
        {
            let recorder = Arc::clone(&recorder);
            move |message: Message<T, Never>| match message {
                Message::Handshake(talkback) => {
                    recorder.talkback.store(Some(talkback));
                    recorder.signals.push(Signal::Handshake);
                    on_handshake(&*recorder);
                },
                Message::Data(data) => {
                    recorder.signals.push(Signal::Data(data.clone()));
                    on_data(&*recorder, &data);
                },
                Message::Request(_) => {
                    panic!("source must not request");
                },
                Message::Error(error) => {
                    let error = error
                        .downcast_ref::<Error>()
                        .expect("error should be a callbag_demand::Error");
                    recorder.signals.push(Signal::Error(*error));
                },
                Message::Terminate => {
                    recorder.signals.push(Signal::Terminate);
                },
            }
        }
        .into(),
    );
    (recorder, sink)
}

/// A sink that does nothing beyond recording.
#[allow(dead_code)]
pub fn make_passive_sink<T: 'static>() -> (Arc<Recorder<T>>, Arc<Sink<T>>)
where
    T: Clone + Send + Sync,
{
    make_recording_sink(|_| {}, |_, _| {})
}
