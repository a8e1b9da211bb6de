// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical device model.
//!
//! Every upstream payload is normalized into these types by the
//! [`adapter`](crate::adapter). All fields are populated: values upstream
//! omitted carry the documented defaults of each type.

mod device;
mod mode;
mod snapshot;
mod tank;
mod zone;

pub use device::{Device, DeviceClass, StatusFlags};
pub use mode::{Feature, Preset, SystemMode, TankOperation};
pub use snapshot::Snapshot;
pub use tank::Tank;
pub use zone::{Zone, ZoneId};
