// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod client;
pub mod details;
pub mod interval;

pub use client::*;
pub use details::*;
pub use interval::*;
