// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

pub mod api;
pub mod config;
pub mod digest;
pub mod error;
pub mod mailer;
pub mod models;
pub mod prices_csv;
pub mod ranking;
pub mod render;
pub mod report;
pub mod snapshot;
pub mod utils;
