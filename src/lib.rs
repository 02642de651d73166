pub mod config;
pub mod error;
pub mod store;
pub mod rbac;
pub mod gateway;
pub mod identity;
pub mod notifications;

pub use error::{SessionError, SessionResult};
pub use identity::{SessionManager, SessionState, UserSnapshot};
pub use rbac::Rbac;

// Debug printing helper: expands to eprintln! in tests and debug builds.
// Usage: tprintln!("debug: {}", value);
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In non-test builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        // Preserve formatting checks in release without producing code
        if false { let _ = format!($($arg)*); }
    });
}
