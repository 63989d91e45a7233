// SPDX-License-Identifier: MIT

//! Services module - client, aggregation, and pipeline logic.

pub mod enduro;
pub mod quota;
pub mod report;
pub mod strava;
pub mod sync;

pub use quota::{CallLog, QuotaLimits, QuotaTracker};
pub use strava::{Credentials, StravaClient};
pub use sync::ActivitySync;
