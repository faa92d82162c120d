//! Trace logging for table construction and emission.
//!
//! Compiles to nothing unless the `debug-emit` feature is enabled.

/// Trace macro that compiles to nothing when `debug-emit` is disabled.
///
/// # Examples
///
/// ```ignore
/// debug_emit!("register {} -> {}", name, register);
/// debug_emit!("call site {}: {} -> {}", site, builtin, target_name);
/// ```
#[cfg(feature = "debug-emit")]
#[macro_export]
macro_rules! debug_emit {
    ($($arg:tt)*) => {
        {
            #[cfg(test)]
            {
                extern crate std;
                std::eprintln!("[EMIT] {}", core::format_args!($($arg)*));
            }
            #[cfg(not(test))]
            {
                let _ = core::format_args!($($arg)*);
            }
        }
    };
}

/// Trace macro that compiles to nothing when `debug-emit` is disabled.
#[cfg(not(feature = "debug-emit"))]
#[macro_export]
macro_rules! debug_emit {
    ($($arg:tt)*) => {};
}
