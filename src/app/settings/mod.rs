// SPDX-License-Identifier: GPL-3.0-only

//! Settings UI module

pub mod view;
