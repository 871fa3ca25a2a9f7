// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for user and deal records.

pub mod deals;
pub mod users;
