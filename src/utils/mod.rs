//! Miscellaneous components used in the library.

mod countdown_timer;
pub use countdown_timer::CountdownTimer;

mod verbosity;
pub use verbosity::Verbosity;
