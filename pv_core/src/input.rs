//! # Input Records
//!
//! The structured record the surrounding application hands to the engine:
//!
//! ```text
//! ProjectInput
//! ├── site: SiteData (location, surface, orientation, irradiance)
//! ├── customer: CustomerData (consumption, class, objective)
//! ├── equipment: EquipmentSpec (module, inverter, efficiency, losses)
//! ├── financial: FinancialParams (optional overrides)
//! └── optimization: OptimizationOptions (optional)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pv_core::input::{Objective, ProjectInput};
//!
//! let mut input = ProjectInput::sample();
//! input.customer.objective = Objective::SetPower { kwp: 5.5 };
//!
//! let json = serde_json::to_string_pretty(&input).unwrap();
//! assert!(json.contains("set_power"));
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::financial::FinancialParams;
use crate::derating::DeratingFactors;
use crate::irradiance;

// ============================================================================
// Site
// ============================================================================

/// Surface the array is mounted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstallationSurface {
    #[default]
    Roof,
    Ground,
    Carport,
}

impl InstallationSurface {
    pub const ALL: [InstallationSurface; 3] = [
        InstallationSurface::Roof,
        InstallationSurface::Ground,
        InstallationSurface::Carport,
    ];

    /// Fraction of gross area actually covered by modules once access paths
    /// and inter-row clearance are accounted for
    pub fn compaction_factor(&self) -> f64 {
        match self {
            InstallationSurface::Roof => 0.65,
            InstallationSurface::Ground => 0.70,
            InstallationSurface::Carport => 0.60,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            InstallationSurface::Roof => "Roof",
            InstallationSurface::Ground => "Ground",
            InstallationSurface::Carport => "Carport",
        }
    }
}

impl std::fmt::Display for InstallationSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Installation site.
///
/// ## JSON Example
///
/// ```json
/// {
///   "city": "Campinas",
///   "state": "SP",
///   "surface": "roof",
///   "tilt_deg": 20.0,
///   "azimuth_deg": 0.0,
///   "irradiance_kwh_m2_day": 4.8,
///   "usable_area_m2": 60.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteData {
    pub city: String,

    /// Two-letter federative unit code (e.g., "SP")
    pub state: String,

    pub surface: InstallationSurface,

    /// Array tilt from horizontal, 0-90 degrees
    pub tilt_deg: f64,

    /// Array azimuth clockwise from north, 0-360 degrees
    pub azimuth_deg: f64,

    /// Average daily irradiance (kWh/m²/day)
    pub irradiance_kwh_m2_day: f64,

    /// Gross area available for the array, if known (m²)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usable_area_m2: Option<f64>,

    /// Site loss factors
    #[serde(default)]
    pub derating: DeratingFactors,
}

/// Default tilt used when prepopulating a site (degrees)
pub const DEFAULT_TILT_DEG: f64 = 20.0;

impl SiteData {
    /// Prepopulate a site from the state's typical irradiance.
    ///
    /// Tilt defaults to [`DEFAULT_TILT_DEG`] and azimuth to north. An unknown
    /// state code leaves irradiance at 0.0, which validation rejects.
    pub fn for_state(city: impl Into<String>, state: impl Into<String>, surface: InstallationSurface) -> Self {
        let state = state.into();
        let irradiance_kwh_m2_day = irradiance::typical_irradiance(&state).unwrap_or(0.0);
        SiteData {
            city: city.into(),
            state,
            surface,
            tilt_deg: DEFAULT_TILT_DEG,
            azimuth_deg: 0.0,
            irradiance_kwh_m2_day,
            usable_area_m2: None,
            derating: DeratingFactors::default(),
        }
    }

    /// Override the prepopulated irradiance with a measured figure
    pub fn with_irradiance(mut self, irradiance_kwh_m2_day: f64) -> Self {
        self.irradiance_kwh_m2_day = irradiance_kwh_m2_day;
        self
    }

    pub fn with_usable_area(mut self, usable_area_m2: f64) -> Self {
        self.usable_area_m2 = Some(usable_area_m2);
        self
    }

    /// Sample residential rooftop in São Paulo state
    pub fn sample() -> Self {
        SiteData::for_state("Campinas", "SP", InstallationSurface::Roof).with_usable_area(60.0)
    }
}

// ============================================================================
// Customer
// ============================================================================

/// Tariff class of the consumer unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomerClass {
    #[default]
    Residential,
    Rural,
    Industrial,
    Commercial,
}

impl CustomerClass {
    pub fn display_name(&self) -> &'static str {
        match self {
            CustomerClass::Residential => "Residential",
            CustomerClass::Rural => "Rural",
            CustomerClass::Industrial => "Industrial",
            CustomerClass::Commercial => "Commercial",
        }
    }
}

impl std::fmt::Display for CustomerClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// What the customer asked the system to achieve.
///
/// Each variant carries only the target it needs.
///
/// ```json
/// { "type": "generate_kwh", "monthly_kwh": 600.0 }
/// { "type": "set_power", "kwp": 5.5 }
/// { "type": "use_module_count", "modules": 12 }
/// { "type": "zero_bill" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Objective {
    /// Generate a given monthly energy (kWh/month)
    GenerateKwh { monthly_kwh: f64 },
    /// Install a given DC power (kWp)
    SetPower { kwp: f64 },
    /// Install a literal number of modules
    UseModuleCount { modules: u32 },
    /// Offset the customer's compensation target share of consumption
    ZeroBill,
}

impl Objective {
    /// Short identifier matching the JSON tag
    pub fn code(&self) -> &'static str {
        match self {
            Objective::GenerateKwh { .. } => "generate_kwh",
            Objective::SetPower { .. } => "set_power",
            Objective::UseModuleCount { .. } => "use_module_count",
            Objective::ZeroBill => "zero_bill",
        }
    }
}

impl std::fmt::Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Objective::GenerateKwh { monthly_kwh } => write!(f, "generate {:.1} kWh/month", monthly_kwh),
            Objective::SetPower { kwp } => write!(f, "install {:.2} kWp", kwp),
            Objective::UseModuleCount { modules } => write!(f, "install {} modules", modules),
            Objective::ZeroBill => write!(f, "zero bill"),
        }
    }
}

/// Consumer unit and sizing objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerData {
    pub name: String,

    /// Average monthly consumption (kWh)
    pub monthly_consumption_kwh: f64,

    pub class: CustomerClass,

    /// Share of consumption the system should offset (%)
    pub compensation_target_pct: f64,

    pub objective: Objective,
}

impl CustomerData {
    /// Sample residential customer aiming for a zero bill
    pub fn sample() -> Self {
        CustomerData {
            name: "Sample Customer".to_string(),
            monthly_consumption_kwh: 500.0,
            class: CustomerClass::Residential,
            compensation_target_pct: 100.0,
            objective: Objective::ZeroBill,
        }
    }
}

// ============================================================================
// Equipment
// ============================================================================

/// PV module datasheet values at STC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub brand: String,
    pub model: String,
    /// Rated power (W)
    pub power_w: f64,
    /// Voltage at maximum power (V)
    pub vmp_v: f64,
    /// Open-circuit voltage (V)
    pub voc_v: f64,
    /// Current at maximum power (A)
    pub imp_a: f64,
    /// Short-circuit current (A)
    pub isc_a: f64,
    /// Physical module area (m²)
    pub area_m2: f64,
}

impl ModuleSpec {
    pub fn sample() -> Self {
        ModuleSpec {
            brand: "Helios".to_string(),
            model: "HM-550M".to_string(),
            power_w: 550.0,
            vmp_v: 41.7,
            voc_v: 49.6,
            imp_a: 13.19,
            isc_a: 14.0,
            area_m2: 2.58,
        }
    }

    /// "brand model" label
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

/// Grid-tie inverter datasheet values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverterSpec {
    pub brand: String,
    pub model: String,
    /// Nominal AC power (W)
    pub nominal_power_w: f64,
    /// Lower bound of the MPPT voltage window (V)
    pub mppt_min_v: f64,
    /// Upper bound of the MPPT voltage window (V)
    pub mppt_max_v: f64,
    /// Absolute maximum DC input voltage (V)
    pub max_input_voltage_v: f64,
    /// Maximum DC input current per MPPT (A)
    pub max_input_current_a: f64,
    /// Number of independent MPPT inputs
    pub mppt_channels: u32,
}

impl InverterSpec {
    pub fn sample() -> Self {
        InverterSpec {
            brand: "Voltara".to_string(),
            model: "VT-6K".to_string(),
            nominal_power_w: 6000.0,
            mppt_min_v: 80.0,
            mppt_max_v: 550.0,
            max_input_voltage_v: 600.0,
            max_input_current_a: 16.0,
            mppt_channels: 2,
        }
    }

    /// "brand model" label
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

/// Selected equipment plus system-level efficiency figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSpec {
    pub module: ModuleSpec,
    pub inverter: InverterSpec,
    /// System efficiency, (0, 1]
    pub system_efficiency: f64,
    /// Fraction retained after wiring/mismatch/availability losses, (0, 1]
    pub loss_factor: f64,
}

impl EquipmentSpec {
    /// Performance ratio used by the yield formula
    pub fn performance_ratio(&self) -> f64 {
        self.system_efficiency * self.loss_factor
    }

    pub fn sample() -> Self {
        EquipmentSpec {
            module: ModuleSpec::sample(),
            inverter: InverterSpec::sample(),
            system_efficiency: 0.80,
            loss_factor: 0.80,
        }
    }
}

// ============================================================================
// Project
// ============================================================================

/// Optional post-resolution adjustments to the module count
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationOptions {
    /// Round the module count up to whole optimal-length strings
    pub maximize_efficiency: bool,
    /// Ceiling on installed power (kWp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_power_kwp: Option<f64>,
}

impl OptimizationOptions {
    pub fn is_noop(&self) -> bool {
        !self.maximize_efficiency && self.max_power_kwp.is_none()
    }
}

/// Complete engine input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub site: SiteData,
    pub customer: CustomerData,
    pub equipment: EquipmentSpec,
    #[serde(default)]
    pub financial: FinancialParams,
    #[serde(default)]
    pub optimization: OptimizationOptions,
}

impl ProjectInput {
    /// A complete, valid sample record
    pub fn sample() -> Self {
        ProjectInput {
            site: SiteData::sample(),
            customer: CustomerData::sample(),
            equipment: EquipmentSpec::sample(),
            financial: FinancialParams::default(),
            optimization: OptimizationOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_state_prepopulates_irradiance() {
        let site = SiteData::for_state("Fortaleza", "CE", InstallationSurface::Ground);
        assert_eq!(site.irradiance_kwh_m2_day, 5.6);
        assert_eq!(site.tilt_deg, DEFAULT_TILT_DEG);
        assert_eq!(site.azimuth_deg, 0.0);
    }

    #[test]
    fn test_supplied_irradiance_is_kept() {
        let site = SiteData::for_state("Fortaleza", "CE", InstallationSurface::Ground).with_irradiance(6.1);
        assert_eq!(site.irradiance_kwh_m2_day, 6.1);
    }

    #[test]
    fn test_unknown_state_leaves_zero_irradiance() {
        let site = SiteData::for_state("Nowhere", "ZZ", InstallationSurface::Roof);
        assert_eq!(site.irradiance_kwh_m2_day, 0.0);
    }

    #[test]
    fn test_compaction_factors() {
        assert_eq!(InstallationSurface::Roof.compaction_factor(), 0.65);
        assert_eq!(InstallationSurface::Ground.compaction_factor(), 0.70);
        assert_eq!(InstallationSurface::Carport.compaction_factor(), 0.60);
    }

    #[test]
    fn test_performance_ratio() {
        let eq = EquipmentSpec::sample();
        assert!((eq.performance_ratio() - 0.64).abs() < 1e-12);
    }

    #[test]
    fn test_objective_json_tags() {
        let json = serde_json::to_string(&Objective::GenerateKwh { monthly_kwh: 600.0 }).unwrap();
        assert_eq!(json, r#"{"type":"generate_kwh","monthly_kwh":600.0}"#);

        let parsed: Objective = serde_json::from_str(r#"{"type":"use_module_count","modules":12}"#).unwrap();
        assert_eq!(parsed, Objective::UseModuleCount { modules: 12 });

        let zero: Objective = serde_json::from_str(r#"{"type":"zero_bill"}"#).unwrap();
        assert_eq!(zero.code(), "zero_bill");
    }

    #[test]
    fn test_project_input_roundtrip() {
        let input = ProjectInput::sample();
        let json = serde_json::to_string_pretty(&input).unwrap();
        let roundtrip: ProjectInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input, roundtrip);
    }

    #[test]
    fn test_financial_and_optimization_optional_in_json() {
        let mut value = serde_json::to_value(ProjectInput::sample()).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("financial");
        obj.remove("optimization");

        let parsed: ProjectInput = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.financial, FinancialParams::default());
        assert!(parsed.optimization.is_noop());
    }
}
