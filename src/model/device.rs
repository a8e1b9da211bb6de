// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The canonical device type.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::mode::{Preset, SystemMode, TankOperation};
use super::tank::Tank;
use super::zone::{Zone, ZoneId};

/// Hardware class of a device, used to group capability outcomes.
///
/// Devices of the same class are assumed to expose the same remote
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DeviceClass(String);

impl DeviceClass {
    /// Class used when the remote service does not report one.
    pub const DEFAULT: &'static str = "default";

    /// Creates a device class. Blank names map to [`DeviceClass::DEFAULT`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.trim().is_empty() {
            Self::default()
        } else {
            Self(name)
        }
    }

    /// Returns the class name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeviceClass {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceClass {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DeviceClass {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<DeviceClass> for String {
    fn from(class: DeviceClass) -> Self {
        class.0
    }
}

/// Device-wide switches and readings.
///
/// The [`Default`] values are the ones used when upstream omits a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct StatusFlags {
    /// Quiet mode.
    pub quiet: bool,
    /// Powerful mode.
    pub powerful: bool,
    /// Eco mode.
    pub eco: bool,
    /// Comfort mode.
    pub comfort: bool,
    /// Holiday mode.
    pub holiday: bool,
    /// Remaining holiday days, 0 when holiday mode is off.
    pub holiday_days: u16,
    /// Backup heater forced on.
    pub force_heater: bool,
    /// Hot-water production forced on.
    pub force_hot_water: bool,
    /// Hot water has priority over space heating.
    pub dhw_priority: bool,
    /// Weekly schedule active.
    pub schedule_enabled: bool,
    /// Defrost cycle running.
    pub defrost: bool,
    /// External heater running.
    pub external_heater: bool,
    /// Outdoor temperature in degrees Celsius.
    pub outdoor_temperature: f64,
    /// Water circuit pressure in bar.
    pub water_pressure: f64,
    /// Circulation pump duty level.
    pub pump_duty: u32,
}

impl StatusFlags {
    /// Default outdoor temperature.
    pub const DEFAULT_OUTDOOR_TEMPERATURE: f64 = 15.0;
    /// Default water pressure.
    pub const DEFAULT_WATER_PRESSURE: f64 = 2.08;
    /// Default pump duty.
    pub const DEFAULT_PUMP_DUTY: u32 = 1;
}

impl Default for StatusFlags {
    fn default() -> Self {
        Self {
            quiet: false,
            powerful: false,
            eco: false,
            comfort: false,
            holiday: false,
            holiday_days: 0,
            force_heater: false,
            force_hot_water: false,
            dhw_priority: false,
            schedule_enabled: true,
            defrost: false,
            external_heater: false,
            outdoor_temperature: Self::DEFAULT_OUTDOOR_TEMPERATURE,
            water_pressure: Self::DEFAULT_WATER_PRESSURE,
            pump_duty: Self::DEFAULT_PUMP_DUTY,
        }
    }
}

/// A heat pump with its zones and optional hot-water tank.
///
/// The id never changes after creation and zone ids are unique. A device
/// has a tank exactly when [`Device::has_tank`] returns `true`.
///
/// # Examples
///
/// ```
/// use heatlink::model::{Device, Preset, Tank, Zone, ZoneId};
///
/// let device = Device::new("hp-1", "Living room", "default")
///     .with_zone(Zone::with_defaults(ZoneId::FIRST))
///     .with_tank(Tank::default());
///
/// assert!(device.has_tank());
/// assert_eq!(device.zones().len(), 1);
/// assert_eq!(device.preset(), Preset::Normal);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    id: String,
    display_name: String,
    device_class: DeviceClass,
    zones: Vec<Zone>,
    tank: Option<Tank>,
    system_mode: SystemMode,
    flags: StatusFlags,
}

impl Device {
    /// Creates a device without zones or tank, in the default mode.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        device_class: impl Into<DeviceClass>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            device_class: device_class.into(),
            zones: Vec::new(),
            tank: None,
            system_mode: SystemMode::default(),
            flags: StatusFlags::default(),
        }
    }

    /// Adds a zone, replacing any zone with the same id.
    #[must_use]
    pub fn with_zone(mut self, zone: Zone) -> Self {
        if let Some(existing) = self.zones.iter_mut().find(|z| z.id == zone.id) {
            *existing = zone;
        } else {
            self.zones.push(zone);
        }
        self
    }

    /// Sets the hot-water tank.
    #[must_use]
    pub fn with_tank(mut self, tank: Tank) -> Self {
        self.tank = Some(tank);
        self
    }

    /// Sets the system mode.
    #[must_use]
    pub fn with_system_mode(mut self, mode: SystemMode) -> Self {
        self.system_mode = mode;
        self
    }

    /// Sets the status flags.
    #[must_use]
    pub fn with_flags(mut self, flags: StatusFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Returns the device id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the device class.
    #[must_use]
    pub fn device_class(&self) -> &DeviceClass {
        &self.device_class
    }

    /// Returns the zones in upstream order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Returns the zone with the given id.
    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Returns the tank, if the device has one.
    #[must_use]
    pub fn tank(&self) -> Option<&Tank> {
        self.tank.as_ref()
    }

    /// Returns `true` if the device has a hot-water tank.
    #[must_use]
    pub fn has_tank(&self) -> bool {
        self.tank.is_some()
    }

    /// Returns the system mode.
    #[must_use]
    pub fn system_mode(&self) -> SystemMode {
        self.system_mode
    }

    /// Returns the status flags.
    #[must_use]
    pub fn flags(&self) -> &StatusFlags {
        &self.flags
    }

    /// Returns the active climate preset.
    ///
    /// When several flags are set, holiday wins, then quiet, powerful,
    /// force heater, eco and comfort.
    #[must_use]
    pub fn preset(&self) -> Preset {
        let f = &self.flags;
        if f.holiday {
            Preset::Holiday
        } else if f.quiet {
            Preset::Quiet
        } else if f.powerful {
            Preset::Powerful
        } else if f.force_heater {
            Preset::ForceHeater
        } else if f.eco {
            Preset::Eco
        } else if f.comfort {
            Preset::Comfort
        } else {
            Preset::Normal
        }
    }

    /// Returns the active tank operation.
    #[must_use]
    pub fn tank_operation(&self) -> TankOperation {
        let f = &self.flags;
        if f.force_hot_water {
            TankOperation::ForceHotWater
        } else if f.eco {
            TankOperation::Eco
        } else if f.comfort {
            TankOperation::Comfort
        } else {
            TankOperation::Normal
        }
    }

    pub(crate) fn zone_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|z| z.id == id)
    }

    pub(crate) fn zones_mut(&mut self) -> impl Iterator<Item = &mut Zone> {
        self.zones.iter_mut()
    }

    pub(crate) fn tank_mut(&mut self) -> Option<&mut Tank> {
        self.tank.as_mut()
    }

    pub(crate) fn flags_mut(&mut self) -> &mut StatusFlags {
        &mut self.flags
    }

    pub(crate) fn set_system_mode(&mut self, mode: SystemMode) {
        self.system_mode = mode;
    }
}
