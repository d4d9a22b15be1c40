//! Logging macros dispatching to `defmt` or `log` depending on enabled features
//!
//! With neither feature enabled the macros compile to nothing, so the core
//! carries no logging obligation on bare-metal targets.

macro_rules! info {
    ($($args:tt)*) => {
        #[cfg(feature = "defmt")]
        ::defmt::info!($($args)*);
        #[cfg(all(feature = "log", not(feature = "defmt")))]
        ::log::info!($($args)*);
    };
}

macro_rules! warn {
    ($($args:tt)*) => {
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($args)*);
        #[cfg(all(feature = "log", not(feature = "defmt")))]
        ::log::warn!($($args)*);
    };
}

#[allow(unused_macros)]
macro_rules! debug {
    ($($args:tt)*) => {
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($args)*);
        #[cfg(all(feature = "log", not(feature = "defmt")))]
        ::log::debug!($($args)*);
    };
}
