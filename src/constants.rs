//! # Constants and type definitions for satframe
//!
//! This module centralizes the **time constants**, **orbit heuristics defaults**, and
//! **common type aliases** shared by the loading engine and the orbit indexer.
//!
//! ## Overview
//!
//! - Calendar and time-unit constants
//! - Angular cycle lengths of the supported orbit index kinds
//! - Default values of the orbit break heuristics (see [`OrbitParams`](crate::orbits::params::OrbitParams))
//! - Core type aliases used across the crate

use std::collections::HashMap;

// -------------------------------------------------------------------------------------------------
// Time constants
// -------------------------------------------------------------------------------------------------

/// Default orbital period of a low Earth orbit satellite, in minutes
pub const DEFAULT_ORBIT_PERIOD_MINUTES: f64 = 97.0;

/// English month names, used to format dates in load messages
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// -------------------------------------------------------------------------------------------------
// Orbit index cycles
// -------------------------------------------------------------------------------------------------

/// Full cycle of a local time index, in hours
pub const LOCAL_TIME_CYCLE: f64 = 24.0;

/// Full cycle of a longitude index, in degrees
pub const LONGITUDE_CYCLE: f64 = 360.0;

// -------------------------------------------------------------------------------------------------
// Orbit break heuristics defaults
// -------------------------------------------------------------------------------------------------

/// A decrease of the orbit index larger than this (in index units) is a break candidate
pub const DEFAULT_DECREASE_THRESHOLD: f64 = -0.1;

/// Half width, in samples, of the window inspected around a break candidate
pub const DEFAULT_FALSE_POSITIVE_WINDOW: usize = 5;

/// Positive jump, as a multiple of the median index step, flagged inside the inspection window
pub const DEFAULT_FALSE_POSITIVE_JUMP: f64 = 10.0;

/// Share of a candidate's drop a too fast rise must undo for the candidate to be a glitch
pub const GLITCH_RECOVERY_FRACTION: f64 = 0.5;

/// Minimum ratio of (elapsed time / period) over (angle traversed / cycle) for a break
pub const DEFAULT_CONSISTENCY_RATIO: f64 = 0.97;

/// Fraction of an orbital period a time gap must exceed to force a break
pub const DEFAULT_GAP_FRACTION: f64 = 0.95;

/// Candidates at this distance (in samples) or closer are collapsed into one
pub const DEFAULT_MIN_BREAK_SEPARATION: usize = 1;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Hash map using the `ahash` hasher
pub type FastHashMap<K, V> = HashMap<K, V, ahash::RandomState>;
