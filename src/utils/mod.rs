pub mod errors;
pub mod ratelimit;

pub use errors::ChartError;
pub use ratelimit::{check_cooldown, check_global_rate_limit, get_cooldown_seconds};
