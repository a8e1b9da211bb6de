// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone and tank assembly.

use super::document::Fields;
use super::{DataQualityWarning, finite, units};
use crate::model::{Tank, Zone, ZoneId};
use crate::remote::{DeviceInfo, StructuredTank, StructuredZone};

/// One zone reported upstream, from either or both payload shapes.
struct Reported<'s, 'a> {
    id: ZoneId,
    structured: Option<&'s StructuredZone>,
    document: Option<Fields<'a>>,
}

/// Builds the zone list of a device.
///
/// With a non-empty manifest the result follows the manifest order: zones
/// upstream did not report are defaulted and zones outside the manifest
/// are dropped. An empty manifest keeps every reported zone.
pub(super) fn resolve_zones(
    info: &DeviceInfo,
    structured: Option<&[StructuredZone]>,
    status: &Fields<'_>,
    warnings: &mut Vec<DataQualityWarning>,
) -> Vec<Zone> {
    let reported = collect(structured, status, warnings);

    if info.zones.is_empty() {
        return reported
            .iter()
            .map(|r| build_zone(r.id, None, r.structured, r.document.as_ref(), warnings))
            .collect();
    }

    for r in &reported {
        if info.zone(r.id).is_none() {
            warnings.push(DataQualityWarning::UnknownZone(r.id));
        }
    }

    info.zones
        .iter()
        .map(|manifest| {
            let r = reported.iter().find(|r| r.id == manifest.id);
            build_zone(
                manifest.id,
                manifest.name.as_deref(),
                r.and_then(|r| r.structured),
                r.and_then(|r| r.document.as_ref()),
                warnings,
            )
        })
        .collect()
}

fn collect<'s, 'a>(
    structured: Option<&'s [StructuredZone]>,
    status: &Fields<'a>,
    warnings: &mut Vec<DataQualityWarning>,
) -> Vec<Reported<'s, 'a>> {
    let mut reported: Vec<Reported<'s, 'a>> = Vec::new();

    for (index, zone) in structured.unwrap_or_default().iter().enumerate() {
        let Some(id) = ZoneId::new(zone.id) else {
            warnings.push(DataQualityWarning::malformed(
                format!("zones[{index}].id"),
                "a zone id of at least 1",
            ));
            continue;
        };
        if reported.iter().any(|r| r.id == id) {
            warnings.push(DataQualityWarning::DuplicateZone(id));
            continue;
        }
        reported.push(Reported {
            id,
            structured: Some(zone),
            document: None,
        });
    }

    for zone in status.objects("zoneStatus", warnings) {
        let before = warnings.len();
        let Some(id) = zone
            .unsigned::<u8>(&["zoneId", "id"], warnings)
            .and_then(ZoneId::new)
        else {
            if warnings.len() == before {
                zone.malformed("zoneId", "a zone id of at least 1", warnings);
            }
            continue;
        };
        match reported.iter_mut().find(|r| r.id == id) {
            Some(existing) if existing.document.is_none() => existing.document = Some(zone),
            Some(_) => warnings.push(DataQualityWarning::DuplicateZone(id)),
            None => reported.push(Reported {
                id,
                structured: None,
                document: Some(zone),
            }),
        }
    }

    reported
}

fn build_zone(
    id: ZoneId,
    manifest_name: Option<&str>,
    structured: Option<&StructuredZone>,
    document: Option<&Fields<'_>>,
    warnings: &mut Vec<DataQualityWarning>,
) -> Zone {
    let name = structured
        .and_then(|z| z.name.as_deref())
        .filter(|n| !n.trim().is_empty())
        .or_else(|| document.and_then(|d| d.text(&["zoneName"], warnings)))
        .or(manifest_name)
        .map_or_else(|| Zone::default_name(id), str::to_string);

    let current = structured
        .and_then(|z| finite(z.current_temperature, "zone.current_temperature", warnings))
        .or_else(|| document.and_then(|d| d.temperature(units::ZONE_CURRENT, 0.0, warnings)))
        .unwrap_or(Zone::DEFAULT_CURRENT_TEMPERATURE);

    let target = structured
        .and_then(|z| finite(z.target_temperature, "zone.target_temperature", warnings))
        .or_else(|| document.and_then(|d| d.temperature(units::ZONE_TARGET, current, warnings)))
        .unwrap_or(current + Zone::DEFAULT_TARGET_OFFSET);

    let running = structured
        .and_then(|z| z.running)
        .or_else(|| document.and_then(|d| d.flag(&["operationStatus"], warnings)))
        .unwrap_or(true);

    let eco_offset = structured
        .and_then(|z| finite(z.eco_offset, "zone.eco_offset", warnings))
        .or_else(|| document.and_then(|d| d.temperature(units::ZONE_ECO_OFFSET, 0.0, warnings)))
        .unwrap_or(Zone::DEFAULT_ECO_OFFSET);

    let comfort_offset = structured
        .and_then(|z| finite(z.comfort_offset, "zone.comfort_offset", warnings))
        .or_else(|| {
            document.and_then(|d| d.temperature(units::ZONE_COMFORT_OFFSET, 0.0, warnings))
        })
        .unwrap_or(Zone::DEFAULT_COMFORT_OFFSET);

    Zone {
        id,
        name,
        current_temperature: current,
        target_temperature: target,
        running,
        eco_offset,
        comfort_offset,
    }
}

/// Builds the tank of a device that has one.
pub(super) fn build_tank(
    structured: Option<&StructuredTank>,
    document: Option<&Fields<'_>>,
    warnings: &mut Vec<DataQualityWarning>,
) -> Tank {
    let defaults = Tank::default();

    let current_temperature = structured
        .and_then(|t| finite(t.current_temperature, "tank.current_temperature", warnings))
        .or_else(|| document.and_then(|d| d.temperature(units::TANK_CURRENT, 0.0, warnings)))
        .unwrap_or(defaults.current_temperature);

    let target_temperature = structured
        .and_then(|t| finite(t.target_temperature, "tank.target_temperature", warnings))
        .or_else(|| document.and_then(|d| d.temperature(units::TANK_TARGET, 0.0, warnings)))
        .unwrap_or(defaults.target_temperature);

    let eco_target = structured
        .and_then(|t| finite(t.eco_target, "tank.eco_target", warnings))
        .or_else(|| document.and_then(|d| d.temperature(units::TANK_ECO, 0.0, warnings)))
        .unwrap_or(defaults.eco_target);

    let comfort_target = structured
        .and_then(|t| finite(t.comfort_target, "tank.comfort_target", warnings))
        .or_else(|| document.and_then(|d| d.temperature(units::TANK_COMFORT, 0.0, warnings)))
        .unwrap_or(defaults.comfort_target);

    let running = structured
        .and_then(|t| t.running)
        .or_else(|| document.and_then(|d| d.flag(&["operationStatus"], warnings)))
        .unwrap_or(defaults.running);

    let legionella = structured
        .and_then(|t| t.legionella)
        .or_else(|| document.and_then(|d| d.flag(&["legionellaMode"], warnings)))
        .unwrap_or(defaults.legionella);

    let reheat = structured
        .and_then(|t| t.reheat)
        .or_else(|| document.and_then(|d| d.flag(&["reheatMode"], warnings)))
        .unwrap_or(defaults.reheat);

    Tank {
        current_temperature,
        target_temperature,
        running,
        eco_target,
        comfort_target,
        legionella,
        reheat,
    }
}
