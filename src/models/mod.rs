// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod activity;
pub mod enduro;

pub use activity::{Activity, ActivitySummary, SegmentEffort, SegmentRef};
pub use enduro::{EnduroAttempt, EnduroCatalog, SegmentAttempt};
