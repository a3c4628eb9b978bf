//! # Compatibility Checks
//!
//! Three independent advisory checks on a sized array:
//!
//! - **Inverter ratio** - DC array power over inverter nominal power
//! - **String sizing** - series string length against the MPPT window,
//!   cold open-circuit voltage and input current limits
//! - **Area fit** - gross area the array occupies on the chosen surface
//!
//! None of these checks change the design. [`suggestions`] turns failed
//! checks into textual advice.
//!
//! ## Example
//!
//! ```rust
//! use pv_core::calculations::compatibility::optimal_modules_per_string;
//! use pv_core::input::{InverterSpec, ModuleSpec};
//!
//! // MPPT 80-550 V, Vmp 41.7 V → round(315 / 41.7) = 8
//! let n = optimal_modules_per_string(&ModuleSpec::sample(), &InverterSpec::sample());
//! assert_eq!(n, Some(8));
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::derating;
use crate::input::{EquipmentSpec, InstallationSurface, InverterSpec, ModuleSpec, SiteData};

/// Lowest acceptable DC/AC ratio
pub const MIN_POWER_RATIO: f64 = 0.9;

/// Highest acceptable DC/AC ratio
pub const MAX_POWER_RATIO: f64 = 1.3;

/// DC/AC ratio above which clipping is likely
pub const CLIPPING_POWER_RATIO: f64 = 1.2;

/// DC/AC ratio targeted when suggesting a replacement inverter
pub const TARGET_POWER_RATIO: f64 = 1.1;

/// Voc multiplier covering the voltage rise at low cell temperature
pub const VOC_TEMPERATURE_MARGIN: f64 = 1.2;

// ============================================================================
// Inverter ratio
// ============================================================================

/// Where the DC/AC ratio falls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioStatus {
    /// Array too small for the inverter (ratio < 0.9)
    Undersized,
    /// 0.9 ≤ ratio ≤ 1.2
    Adequate,
    /// 1.2 < ratio ≤ 1.3
    Clipping,
    /// Array too large for the inverter (ratio > 1.3)
    Oversized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverterCheck {
    /// Total module power (W)
    pub array_power_w: f64,
    pub inverter_power_w: f64,
    /// array_power_w / inverter_power_w
    pub power_ratio: f64,
    pub status: RatioStatus,
    pub compatible: bool,
    pub notes: Vec<String>,
}

/// Compare total module power with the inverter's nominal power.
pub fn check_inverter(module_count: u32, module: &ModuleSpec, inverter: &InverterSpec) -> InverterCheck {
    let array_power_w = f64::from(module_count) * module.power_w;
    let power_ratio = array_power_w / inverter.nominal_power_w;
    let mut notes = Vec::new();

    let status = if power_ratio < MIN_POWER_RATIO {
        notes.push(format!(
            "DC/AC ratio {:.2} is below {:.2}: the array is undersized for the {:.1} kW inverter",
            power_ratio,
            MIN_POWER_RATIO,
            inverter.nominal_power_w / 1000.0
        ));
        RatioStatus::Undersized
    } else if power_ratio > MAX_POWER_RATIO {
        notes.push(format!(
            "DC/AC ratio {:.2} exceeds {:.2}: the array is oversized for the {:.1} kW inverter",
            power_ratio,
            MAX_POWER_RATIO,
            inverter.nominal_power_w / 1000.0
        ));
        RatioStatus::Oversized
    } else if power_ratio > CLIPPING_POWER_RATIO {
        notes.push(format!(
            "DC/AC ratio {:.2} is above {:.2}: expect some clipping at peak irradiance",
            power_ratio, CLIPPING_POWER_RATIO
        ));
        RatioStatus::Clipping
    } else {
        notes.push(format!("DC/AC ratio {:.2} is within the recommended range", power_ratio));
        RatioStatus::Adequate
    };

    InverterCheck {
        array_power_w,
        inverter_power_w: inverter.nominal_power_w,
        power_ratio,
        status,
        compatible: !matches!(status, RatioStatus::Undersized | RatioStatus::Oversized),
        notes,
    }
}

// ============================================================================
// String sizing
// ============================================================================

/// Range of string lengths whose operating voltage sits inside the MPPT window
pub fn string_length_bounds(module: &ModuleSpec, inverter: &InverterSpec) -> (u32, u32) {
    let min = (inverter.mppt_min_v / module.vmp_v).ceil().max(1.0);
    let max = (inverter.mppt_max_v / module.vmp_v).floor().max(0.0);
    (min as u32, max as u32)
}

/// String length that puts the operating voltage nearest the centre of the
/// MPPT window, or `None` when no length fits the window.
///
/// # Formula
/// n = round(((V_min + V_max) / 2) / Vmp), clamped to [⌈V_min/Vmp⌉, ⌊V_max/Vmp⌋]
pub fn optimal_modules_per_string(module: &ModuleSpec, inverter: &InverterSpec) -> Option<u32> {
    let (lo, hi) = string_length_bounds(module, inverter);
    if lo > hi {
        return None;
    }
    let midpoint = (inverter.mppt_min_v + inverter.mppt_max_v) / 2.0;
    let n = (midpoint / module.vmp_v).round().max(0.0) as u32;
    Some(n.clamp(lo, hi))
}

/// Longest string whose cold open-circuit voltage stays within the inverter limit
pub fn max_modules_for_voc(module: &ModuleSpec, inverter: &InverterSpec) -> u32 {
    (inverter.max_input_voltage_v / (module.voc_v * VOC_TEMPERATURE_MARGIN))
        .floor()
        .max(0.0) as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringCheck {
    /// Series modules per string (0 when no length fits the MPPT window)
    pub modules_per_string: u32,
    pub string_count: u32,
    /// Operating voltage of one string (V)
    pub string_voltage_v: f64,
    /// Open-circuit voltage with the cold-temperature margin (V)
    pub open_circuit_voltage_cold_v: f64,
    /// Operating current of one string (A)
    pub string_current_a: f64,
    /// Strings sharing each MPPT input
    pub strings_per_mppt: u32,
    pub compatible: bool,
    pub notes: Vec<String>,
}

/// Lay out `module_count` modules in series strings and check the
/// resulting voltages and currents against the inverter.
pub fn check_strings(module_count: u32, module: &ModuleSpec, inverter: &InverterSpec) -> StringCheck {
    let mut notes = Vec::new();

    let Some(optimal) = optimal_modules_per_string(module, inverter) else {
        notes.push(format!(
            "No string length places the operating voltage inside the {:.0}-{:.0} V MPPT window with Vmp {:.1} V",
            inverter.mppt_min_v, inverter.mppt_max_v, module.vmp_v
        ));
        return StringCheck {
            modules_per_string: 0,
            string_count: 0,
            string_voltage_v: 0.0,
            open_circuit_voltage_cold_v: 0.0,
            string_current_a: 0.0,
            strings_per_mppt: 0,
            compatible: false,
            notes,
        };
    };

    let modules_per_string = optimal.min(module_count.max(1));
    if modules_per_string < optimal {
        notes.push(format!(
            "Array has fewer modules than the optimal string of {}; all {} modules form one string",
            optimal, modules_per_string
        ));
    }

    let string_count = module_count.max(1).div_ceil(modules_per_string);
    let string_voltage_v = f64::from(modules_per_string) * module.vmp_v;
    let open_circuit_voltage_cold_v = f64::from(modules_per_string) * module.voc_v * VOC_TEMPERATURE_MARGIN;
    let channels = inverter.mppt_channels.max(1);
    let strings_per_mppt = string_count.div_ceil(channels);

    let mut compatible = true;

    if string_voltage_v < inverter.mppt_min_v || string_voltage_v > inverter.mppt_max_v {
        compatible = false;
        notes.push(format!(
            "String voltage {:.1} V is outside the {:.0}-{:.0} V MPPT window",
            string_voltage_v, inverter.mppt_min_v, inverter.mppt_max_v
        ));
    } else {
        notes.push(format!(
            "{} strings of {} modules at {:.1} V, inside the MPPT window",
            string_count, modules_per_string, string_voltage_v
        ));
    }

    if open_circuit_voltage_cold_v > inverter.max_input_voltage_v {
        compatible = false;
        notes.push(format!(
            "Cold open-circuit voltage {:.1} V exceeds the inverter maximum of {:.0} V",
            open_circuit_voltage_cold_v, inverter.max_input_voltage_v
        ));
    }

    if module.isc_a > inverter.max_input_current_a {
        compatible = false;
        notes.push(format!(
            "Module Isc {:.2} A exceeds the inverter input limit of {:.2} A",
            module.isc_a, inverter.max_input_current_a
        ));
    }

    let remainder = module_count % modules_per_string;
    if remainder != 0 && module_count > modules_per_string {
        notes.push(format!(
            "Last string holds {} modules ({:.1} V); balance string lengths per MPPT input",
            remainder,
            f64::from(remainder) * module.vmp_v
        ));
    }

    if string_count > channels {
        notes.push(format!(
            "{} strings on {} MPPT inputs: {} strings in parallel per input",
            string_count, channels, strings_per_mppt
        ));
    }

    StringCheck {
        modules_per_string,
        string_count,
        string_voltage_v,
        open_circuit_voltage_cold_v,
        string_current_a: module.imp_a,
        strings_per_mppt,
        compatible,
        notes,
    }
}

// ============================================================================
// Area fit
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaCheck {
    /// Sum of module areas (m²)
    pub module_area_m2: f64,
    /// Gross area including access and clearance (m²)
    pub occupied_area_m2: f64,
    pub compaction_factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usable_area_m2: Option<f64>,
    /// occupied / usable (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilization_pct: Option<f64>,
    /// Whether the array fits, when a usable area is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fits: Option<bool>,
    pub notes: Vec<String>,
}

impl AreaCheck {
    pub fn compatible(&self) -> bool {
        self.fits != Some(false)
    }
}

/// Gross area the array occupies on a surface.
///
/// # Formula
/// A_occupied = N × A_module / compaction_factor
pub fn check_area(
    module_count: u32,
    module: &ModuleSpec,
    surface: InstallationSurface,
    usable_area_m2: Option<f64>,
) -> AreaCheck {
    let compaction_factor = surface.compaction_factor();
    let module_area_m2 = f64::from(module_count) * module.area_m2;
    let occupied_area_m2 = module_area_m2 / compaction_factor;
    let mut notes = vec![format!(
        "{} mounting occupies {:.1} m² ({:.1} m² of modules, compaction {:.2})",
        surface, occupied_area_m2, module_area_m2, compaction_factor
    )];

    let (utilization_pct, fits) = match usable_area_m2 {
        Some(usable) => {
            let utilization = occupied_area_m2 / usable * 100.0;
            let fits = occupied_area_m2 <= usable;
            if fits {
                notes.push(format!("Uses {:.0}% of the {:.1} m² available", utilization, usable));
            } else {
                notes.push(format!(
                    "Insufficient area: needs {:.1} m² but only {:.1} m² is available",
                    occupied_area_m2, usable
                ));
            }
            (Some(utilization), Some(fits))
        }
        None => (None, None),
    };

    AreaCheck {
        module_area_m2,
        occupied_area_m2,
        compaction_factor,
        usable_area_m2,
        utilization_pct,
        fits,
        notes,
    }
}

/// Largest module count that fits a usable area on a surface
pub fn max_modules_for_area(module: &ModuleSpec, surface: InstallationSurface, usable_area_m2: f64) -> u32 {
    (usable_area_m2 * surface.compaction_factor() / module.area_m2)
        .floor()
        .max(0.0) as u32
}

// ============================================================================
// Combined report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub inverter: InverterCheck,
    pub strings: StringCheck,
    pub area: AreaCheck,
}

impl CompatibilityReport {
    /// Whether every sub-check passed
    pub fn is_compatible(&self) -> bool {
        self.inverter.compatible && self.strings.compatible && self.area.compatible()
    }

    /// All sub-check notes, inverter first
    pub fn notes(&self) -> impl Iterator<Item = &String> {
        self.inverter
            .notes
            .iter()
            .chain(self.strings.notes.iter())
            .chain(self.area.notes.iter())
    }

    /// Advisory messages for the pipeline's warning list
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.inverter.compatible {
            warnings.push(format!(
                "Inverter: DC/AC ratio {:.2} is outside {:.1}-{:.1}",
                self.inverter.power_ratio, MIN_POWER_RATIO, MAX_POWER_RATIO
            ));
        } else if self.inverter.status == RatioStatus::Clipping {
            warnings.push(format!("Inverter: DC/AC ratio {:.2} may cause clipping", self.inverter.power_ratio));
        }
        if !self.strings.compatible {
            warnings.push("Strings: electrical configuration is incompatible with the inverter".to_string());
        }
        if !self.area.compatible() {
            warnings.push(format!(
                "Area: array needs {:.1} m², more than is available",
                self.area.occupied_area_m2
            ));
        }
        warnings
    }
}

/// Run all three checks.
pub fn check_all(module_count: u32, site: &SiteData, equipment: &EquipmentSpec) -> CompatibilityReport {
    let report = CompatibilityReport {
        inverter: check_inverter(module_count, &equipment.module, &equipment.inverter),
        strings: check_strings(module_count, &equipment.module, &equipment.inverter),
        area: check_area(module_count, &equipment.module, site.surface, site.usable_area_m2),
    };
    debug!(
        modules = module_count,
        ratio = report.inverter.power_ratio,
        modules_per_string = report.strings.modules_per_string,
        strings = report.strings.string_count,
        occupied_m2 = report.area.occupied_area_m2,
        compatible = report.is_compatible(),
        "compatibility checked"
    );
    report
}

/// Inverter size (kW, rounded to 0.5) that would bring the DC/AC ratio to
/// [`TARGET_POWER_RATIO`]
fn suggested_inverter_kw(array_power_w: f64) -> f64 {
    (array_power_w / TARGET_POWER_RATIO / 1000.0 * 2.0).round() / 2.0
}

/// Targeted suggestions for each failed check. Empty when everything passes.
pub fn suggestions(report: &CompatibilityReport, site: &SiteData, equipment: &EquipmentSpec) -> Vec<String> {
    let mut out = Vec::new();
    let module = &equipment.module;
    let inverter = &equipment.inverter;

    match report.inverter.status {
        RatioStatus::Undersized => out.push(format!(
            "Select a smaller inverter (about {:.1} kW) or add modules to raise the DC/AC ratio",
            suggested_inverter_kw(report.inverter.array_power_w)
        )),
        RatioStatus::Oversized => out.push(format!(
            "Select a larger inverter (about {:.1} kW) or split the array across two inverters",
            suggested_inverter_kw(report.inverter.array_power_w)
        )),
        RatioStatus::Adequate | RatioStatus::Clipping => {}
    }

    let strings = &report.strings;
    if !strings.compatible {
        if strings.modules_per_string == 0 {
            out.push("Choose an inverter whose MPPT window suits this module's Vmp".to_string());
        }
        if strings.open_circuit_voltage_cold_v > inverter.max_input_voltage_v {
            out.push(format!(
                "Limit strings to {} modules or choose an inverter with a higher maximum input voltage",
                max_modules_for_voc(module, inverter)
            ));
        }
        if module.isc_a > inverter.max_input_current_a {
            out.push(format!(
                "Choose an inverter rated for at least {:.1} A per MPPT input",
                module.isc_a
            ));
        }
        if strings.modules_per_string > 0
            && (strings.string_voltage_v < inverter.mppt_min_v || strings.string_voltage_v > inverter.mppt_max_v)
        {
            out.push("Rearrange the string length so the operating voltage sits inside the MPPT window".to_string());
        }
    }
    // Parallel strings alone are acceptable
    if !report.is_compatible() && strings.string_count > inverter.mppt_channels.max(1) {
        out.push(format!(
            "Consider an inverter with {} MPPT inputs to avoid parallel strings",
            strings.string_count
        ));
    }

    if !report.area.compatible() {
        if let Some(usable) = report.area.usable_area_m2 {
            out.push(format!(
                "Reduce the array to {} modules, choose higher-power modules or another mounting surface",
                max_modules_for_area(module, site.surface, usable)
            ));
        }
        out.push("Reconsider the orientation and layout to use more of the available surface".to_string());
    } else if derating::azimuth_factor(site.azimuth_deg) < 1.0 && !report.is_compatible() {
        out.push(format!(
            "Reconsider the orientation: azimuth {:.0}° deviates {:.0}° from north",
            site.azimuth_deg,
            derating::azimuth_deviation_deg(site.azimuth_deg)
        ));
    }

    out
}
