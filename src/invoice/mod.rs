// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cycle;
pub mod generator;
pub mod projection;

pub use generator::{InvoiceReport, regenerate_all, update_active_cycle};
pub use projection::{Projection, project};
