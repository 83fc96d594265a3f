#[allow(unused_macros)]
macro_rules! instrument {
    (parent: $parent:expr, $name:expr, $span:ident) => {
        ::paste::paste! {
            let $span = ::tracing::info_span!(parent: $parent, $name);
            let [<_ $name _entered>] = $span.enter();
        }
    };
    (parent: $parent:expr, $name:expr) => {
        ::paste::paste! {
            let [<_ $name _entered>] = ::tracing::info_span!(parent: $parent, $name).entered();
        }
    };
}
#[allow(unused_imports)]
pub(crate) use instrument;
