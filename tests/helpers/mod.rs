// ABOUTME: Shared test helpers for HTTP integration tests
// ABOUTME: Exports the oneshot request builder used against the axum router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
