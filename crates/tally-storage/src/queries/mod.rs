// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the invalidation queue and the site/segment catalogs.

pub mod invalidations;
pub mod segments;
pub mod sites;
