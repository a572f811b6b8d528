// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Statistics configurations published by the ISP and the parsed outputs built from them.

pub mod config;
pub mod output;
