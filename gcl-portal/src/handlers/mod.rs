mod health;
mod info;
mod metrics;
mod welcome;

pub use health::*;
pub use info::*;
pub use metrics::*;
pub use welcome::*;
