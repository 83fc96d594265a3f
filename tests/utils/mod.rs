pub mod tracing;

#[allow(unused_macros)]
macro_rules! call {
    ($callbag:expr, $message:expr, $str:literal) => {
        {
            let message = $message;
            ::tracing::info!($str, message = message);
            $callbag(message);
        }
    };
}
#[allow(unused_imports)]
pub(crate) use call;
