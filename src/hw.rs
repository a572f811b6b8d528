// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Hardware memory maps of the statistics buffers written by the ISP.

pub mod titan17x;
