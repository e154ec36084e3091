//! Pure game rules: the winner relation and the timeout gate.

mod rpsls;
pub mod timeout;

pub use rpsls::{resolve, Move, Outcome, Payout};
pub use timeout::{is_timed_out, DEFAULT_TIMEOUT_SECS};
