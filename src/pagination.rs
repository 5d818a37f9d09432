// ABOUTME: Re-exports pagination types from commune-core for unified type identity
// ABOUTME: Ensures Cursor, CursorPage, and PaginationParams are shared across workspace crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use commune_core::pagination::*;
