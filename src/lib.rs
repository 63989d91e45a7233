// SPDX-License-Identifier: MIT

//! Enduro-Tracker: best composite times across fixed mountain-bike courses.
//!
//! Pulls ride activities from the Strava API through a rate-limited client
//! with a persisted call budget, caches them in a swappable storage backend,
//! and derives per-course "enduro attempt" records from segment efforts.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod time_utils;
