//! Unsigned integer type alias for permit counts and ticks.
//!
//! `Uint` is used for limits, permit counts and clock ticks. The blocking
//! limiters count ticks in nanoseconds since their epoch, so with the default
//! `u64` a single limiter can run for roughly 584 years.
//!
//! # Features
//! - `tick_u64` (default): uses [`u64`] as `Uint`
//! - `tick_u128`: uses [`u128`] as `Uint`
//!   (Both features cannot be enabled at the same time.)
//! - If neither feature is enabled, `u64` is used.

#[cfg(all(feature = "tick_u64", feature = "tick_u128"))]
compile_error!("You cannot enable both `tick_u64` and `tick_u128` features at the same time");

/// Alias for the unsigned integer type used for limits and ticks.
#[cfg(all(feature = "tick_u64", not(feature = "tick_u128")))]
pub type Uint = u64;

/// Alias for the unsigned integer type used for limits and ticks.
#[cfg(all(feature = "tick_u128", not(feature = "tick_u64")))]
pub type Uint = u128;

/// Alias for the unsigned integer type used for limits and ticks.
#[cfg(not(any(feature = "tick_u64", feature = "tick_u128")))]
pub type Uint = u64;

/// Converts a duration into nanosecond ticks, or `None` if it does not fit in [`Uint`].
pub(crate) fn duration_to_ticks(duration: std::time::Duration) -> Option<Uint> {
    Uint::try_from(duration.as_nanos()).ok()
}

/// Converts nanosecond ticks back into a duration, saturating at [`Duration::MAX`](std::time::Duration::MAX).
pub(crate) fn ticks_to_duration(ticks: Uint) -> std::time::Duration {
    let secs = ticks / 1_000_000_000;
    let nanos = (ticks % 1_000_000_000) as u32;
    match u64::try_from(secs) {
        Ok(secs) => std::time::Duration::new(secs, nanos),
        Err(_) => std::time::Duration::MAX,
    }
}
