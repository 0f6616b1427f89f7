//! Maintenance scheduling calculator.
//!
//! `next_maintenance_date` and `status` are derived fields: they are computed
//! from the frequency and history on every read and never trusted from
//! storage.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::Equipment;

/// Calendar unit of a maintenance frequency.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrequencyUnit {
    Days,
    Weeks,
    Months,
    Years,
}

/// How often an equipment must be serviced.
///
/// A non-positive `value` or a missing `unit` means "no schedule".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceFrequency {
    pub value: i32,
    pub unit: Option<FrequencyUnit>,
}

impl MaintenanceFrequency {
    pub fn new(value: i32, unit: FrequencyUnit) -> Self {
        Self {
            value,
            unit: Some(unit),
        }
    }
}

/// Health of an equipment relative to its next due date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EquipmentStatus {
    #[default]
    #[serde(rename = "OK")]
    Ok,
    /// Due within the next month.
    Advertencia,
    /// Past due.
    Vencido,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Ok => "OK",
            EquipmentStatus::Advertencia => "Advertencia",
            EquipmentStatus::Vencido => "Vencido",
        }
    }
}

impl core::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Add one period to `base`, following calendar rules.
///
/// Month and year additions clamp to the last day of the target month
/// (Jan 31 + 1 month = Feb 28/29). Overflow past chrono's range yields `None`.
pub fn next_maintenance_date(base: NaiveDate, frequency: MaintenanceFrequency) -> Option<NaiveDate> {
    let unit = frequency.unit?;
    let value = u32::try_from(frequency.value).ok().filter(|v| *v > 0)?;

    match unit {
        FrequencyUnit::Days => base.checked_add_days(Days::new(u64::from(value))),
        FrequencyUnit::Weeks => base.checked_add_days(Days::new(u64::from(value) * 7)),
        FrequencyUnit::Months => base.checked_add_months(Months::new(value)),
        FrequencyUnit::Years => base.checked_add_months(Months::new(value.checked_mul(12)?)),
    }
}

/// Classify a due date against `today`.
///
/// `today` itself is a warning, not overdue; exactly one month ahead is OK.
pub fn status_on(next: Option<NaiveDate>, today: NaiveDate) -> EquipmentStatus {
    let Some(next) = next else {
        return EquipmentStatus::Ok;
    };
    if next < today {
        return EquipmentStatus::Vencido;
    }
    match today.checked_add_months(Months::new(1)) {
        Some(horizon) if next < horizon => EquipmentStatus::Advertencia,
        Some(_) => EquipmentStatus::Ok,
        // today is at the end of the calendar; anything not overdue is imminent
        None => EquipmentStatus::Advertencia,
    }
}

/// Recompute the derived fields of `equipment` as of `today`.
pub fn recompute(mut equipment: Equipment, today: NaiveDate) -> Equipment {
    let base = equipment.last_maintenance_date.or(equipment.created_date);
    let next = match (base, equipment.maintenance_frequency) {
        (Some(base), Some(frequency)) => next_maintenance_date(base, frequency),
        _ => None,
    };

    equipment.next_maintenance_date = next;
    equipment.status = status_on(next, today);
    equipment
}
