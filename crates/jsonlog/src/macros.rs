//! Emission macros with full call-site attribution
//!
//! The [`CategoryLogger`](crate::CategoryLogger) methods record file and line
//! through `#[track_caller]`; these macros also record the enclosing function.

/// Call site of the macro invocation, including the enclosing function name
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __marker() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        $crate::CallSite::new(file!(), line!())
            .with_function($crate::__function_name(__type_name_of(__marker)))
    }};
}

/// Emit a payload at a given level
///
/// ```rust,ignore
/// log_event!(loggers["http"], Level::Info, json!({ "data": "GET /" }));
/// ```
#[macro_export]
macro_rules! log_event {
    ($logger:expr, $level:expr, $payload:expr $(,)?) => {
        $logger.log($level, &$payload, ::core::option::Option::Some($crate::call_site!()))
    };
}

/// Emit a payload at TRACE
#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $payload:expr $(,)?) => {
        $crate::log_event!($logger, $crate::Level::Trace, $payload)
    };
}

/// Emit a payload at DEBUG
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $payload:expr $(,)?) => {
        $crate::log_event!($logger, $crate::Level::Debug, $payload)
    };
}

/// Emit a payload at INFO
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $payload:expr $(,)?) => {
        $crate::log_event!($logger, $crate::Level::Info, $payload)
    };
}

/// Emit a payload at WARN
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $payload:expr $(,)?) => {
        $crate::log_event!($logger, $crate::Level::Warn, $payload)
    };
}

/// Emit a payload at ERROR
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $payload:expr $(,)?) => {
        $crate::log_event!($logger, $crate::Level::Error, $payload)
    };
}
