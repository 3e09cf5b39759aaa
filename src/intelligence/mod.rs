pub mod detector;

pub use detector::{check_concentration, check_large_bet, check_rapid_accumulation};
