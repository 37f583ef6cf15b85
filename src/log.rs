//! Utilities for logging messages from the library.
//!
//! Set the `VGKERNEL_LOG` environment variable to see messages about dropped segments,
//! path data that could not be parsed, and other degraded-output conditions.

use once_cell::sync::Lazy;

#[macro_export]
macro_rules! vg_log {
    (
        $($arg:tt)+
    ) => {
        if $crate::log::log_enabled() {
            println!("{}", format_args!($($arg)+));
        }
    };
}

pub fn log_enabled() -> bool {
    static ENABLED: Lazy<bool> = Lazy::new(|| ::std::env::var_os("VGKERNEL_LOG").is_some());

    *ENABLED
}
