// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cascade;
pub mod locks;
pub mod month;

pub use cascade::{CascadeReport, recalculate_from};
pub use month::{PaidFilter, current_balance, month_end_delta};
