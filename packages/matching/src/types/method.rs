//! Impact methods and the output columns their scores are routed into.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifies one scoring method in the LCA engine.
///
/// An opaque `(package, category, indicator)` triple. Only substring checks on
/// the category and indicator are ever applied to it, to pick an output column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImpactMethod(String, String, String);

impl ImpactMethod {
    pub fn new(
        package: impl Into<String>,
        category: impl Into<String>,
        indicator: impl Into<String>,
    ) -> Self {
        Self(package.into(), category.into(), indicator.into())
    }

    pub fn package(&self) -> &str {
        &self.0
    }

    pub fn category(&self) -> &str {
        &self.1
    }

    pub fn indicator(&self) -> &str {
        &self.2
    }

    /// Flat string form, used to key stored scores.
    pub fn key(&self) -> String {
        format!("{} | {} | {}", self.0, self.1, self.2)
    }
}

impl std::fmt::Display for ImpactMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.0, self.1, self.2)
    }
}

/// EF v3.1 methods, one per impact column.
pub fn default_methods() -> Vec<ImpactMethod> {
    vec![
        ImpactMethod::new("EF v3.1", "climate change", "global warming potential (GWP100)"),
        ImpactMethod::new(
            "EF v3.1",
            "material resources: metals/minerals",
            "abiotic depletion potential (ADP): elements (ultimate reserves)",
        ),
        ImpactMethod::new(
            "EF v3.1",
            "water use",
            "user deprivation potential (deprivation-weighted water consumption)",
        ),
        ImpactMethod::new("EF v3.1", "acidification", "accumulated exceedance (AE)"),
        ImpactMethod::new(
            "EF v3.1",
            "ecotoxicity: freshwater",
            "comparative toxic unit for ecosystems (CTUe)",
        ),
        ImpactMethod::new(
            "EF v3.1",
            "human toxicity: carcinogenic",
            "comparative toxic unit for human (CTUh)",
        ),
        ImpactMethod::new("EF v3.1", "ozone depletion", "ozone depletion potential (ODP)"),
        ImpactMethod::new("EF v3.1", "particulate matter formation", "impact on human health"),
        ImpactMethod::new(
            "EF v3.1",
            "photochemical oxidant formation: human health",
            "tropospheric ozone concentration increase",
        ),
    ]
}

/// Output column an impact score is written to.
///
/// Declaration order is the routing priority and the column order of output
/// tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImpactCategory {
    #[serde(rename = "GWP")]
    Gwp,
    #[serde(rename = "ADP")]
    Adp,
    #[serde(rename = "Water use")]
    WaterUse,
    #[serde(rename = "AP")]
    Ap,
    #[serde(rename = "FETP")]
    Fetp,
    #[serde(rename = "HTP")]
    Htp,
    #[serde(rename = "ODP")]
    Odp,
    #[serde(rename = "PMFP")]
    Pmfp,
    #[serde(rename = "POFP")]
    Pofp,
}

impl ImpactCategory {
    pub const ALL: [ImpactCategory; 9] = [
        Self::Gwp,
        Self::Adp,
        Self::WaterUse,
        Self::Ap,
        Self::Fetp,
        Self::Htp,
        Self::Odp,
        Self::Pmfp,
        Self::Pofp,
    ];

    /// Column header in output tables.
    pub fn column(self) -> &'static str {
        match self {
            Self::Gwp => "GWP",
            Self::Adp => "ADP",
            Self::WaterUse => "Water use",
            Self::Ap => "AP",
            Self::Fetp => "FETP",
            Self::Htp => "HTP",
            Self::Odp => "ODP",
            Self::Pmfp => "PMFP",
            Self::Pofp => "POFP",
        }
    }

    /// Chart axis title with the EF v3.1 reference unit of the default method.
    pub fn axis_title(self) -> &'static str {
        match self {
            Self::Gwp => "GWP (kg CO₂-eq)",
            Self::Adp => "ADP (kg Sb-eq)",
            Self::WaterUse => "Water Use (m³ eq. deprived)",
            Self::Ap => "AP (mol H⁺-eq)",
            Self::Fetp => "FETP (CTUe)",
            Self::Htp => "HTP (CTUh)",
            Self::Odp => "ODP (kg CFC-11-eq)",
            Self::Pmfp => "PMFP (disease incidence)",
            Self::Pofp => "POFP (kg NMVOC-eq)",
        }
    }

    fn accepts(self, method: &ImpactMethod) -> bool {
        let indicator = method.indicator();
        match self {
            Self::Gwp => indicator.contains("global warming potential (GWP100)"),
            Self::Adp => indicator.contains("abiotic depletion potential (ADP)"),
            Self::WaterUse => indicator.contains("user deprivation potential"),
            Self::Ap => indicator.contains("accumulated exceedance (AE)"),
            Self::Fetp => indicator.contains("comparative toxic unit for ecosystems (CTUe)"),
            Self::Htp => indicator.contains("comparative toxic unit for human (CTUh)"),
            Self::Odp => indicator.contains("ozone depletion potential (ODP)"),
            Self::Pmfp => {
                indicator.contains("impact on human health")
                    && method.category().contains("particulate matter")
            }
            Self::Pofp => indicator.contains("tropospheric ozone concentration increase"),
        }
    }

    /// Column for a method; first match in priority order wins.
    pub fn route(method: &ImpactMethod) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.accepts(method))
    }
}

impl std::fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Impact values of one flow, at most one per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpactValues(BTreeMap<ImpactCategory, f64>);

impl ImpactValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: ImpactCategory, value: f64) {
        self.0.insert(category, value);
    }

    pub fn get(&self, category: ImpactCategory) -> Option<f64> {
        self.0.get(&category).copied()
    }

    /// True when every column is unset.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ImpactCategory, f64)> + '_ {
        self.0.iter().map(|(c, v)| (*c, *v))
    }
}
