// ABOUTME: Re-exports application constants from commune-core
// ABOUTME: Limits, header names, ports, and defaults shared by the server modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use commune_core::constants::*;
