//! Shared test harness modules for the vectext CLI.

use super::*;

mod helpers;
