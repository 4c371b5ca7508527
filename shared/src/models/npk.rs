//! NPK deficiency questionnaire models
//!
//! A crop selection picks a base nutrient target (kg/ha). Field observations
//! then trigger a fixed, ordered list of adjustment rules; each rule scales
//! one or two nutrients down to a floor and tags the deficiency it indicates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ClientError, ClientResult};

/// Generates a form-option enum with its display label and catalogue
macro_rules! form_options {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(format!("unknown {} option: {}", stringify!($name), other)),
                }
            }
        }
    };
}

form_options! {
    /// Crops with a known nutrient target
    Crop {
        Rice => "rice",
        Maize => "maize",
        Chickpea => "chickpea",
        KidneyBeans => "kidneybeans",
        PigeonPeas => "pigeonpeas",
        MothBeans => "mothbeans",
        MungBean => "mungbean",
        BlackGram => "blackgram",
        Lentil => "lentil",
        Pomegranate => "pomegranate",
        Banana => "banana",
        Mango => "mango",
        Grapes => "grapes",
        Watermelon => "watermelon",
        Muskmelon => "muskmelon",
        Apple => "apple",
        Orange => "orange",
        Papaya => "papaya",
        Coconut => "coconut",
        Cotton => "cotton",
        Jute => "jute",
        Coffee => "coffee",
    }
}

form_options! {
    /// What was grown last season
    PreviousCrop {
        NoneGrown => "None",
        Rice => "rice",
        Maize => "maize",
        Wheat => "wheat",
        Legumes => "legumes",
        Fallow => "fallow",
        Vegetables => "vegetables",
        Fruits => "fruits",
        Cotton => "cotton",
        Oilseeds => "oilseeds",
        Pulses => "pulses",
        Other => "other",
    }
}

form_options! {
    LeafColor {
        DarkGreen => "Dark Green",
        LightGreen => "Light Green",
        Yellowish => "Yellowish",
        Purple => "Purple",
        Brown => "Brown",
    }
}

form_options! {
    GrowthPattern {
        Healthy => "Healthy",
        Stunted => "Stunted",
        TallAndThin => "Tall & Thin",
        ShortAndBushy => "Short & Bushy",
    }
}

form_options! {
    SoilType {
        Sandy => "Sandy",
        Clay => "Clay",
        Loam => "Loam",
    }
}

form_options! {
    IrrigationFrequency {
        Daily => "Daily",
        SeveralTimesWeekly => "2-3 times/week",
        Weekly => "Weekly",
        Rarely => "Rarely",
    }
}

impl Crop {
    /// Recommended nutrient target in kg/ha
    pub fn base_npk(&self) -> NpkValues {
        let (n, p, k) = match self {
            Crop::Rice => (120, 60, 60),
            Crop::Maize => (150, 75, 75),
            Crop::Chickpea => (30, 70, 40),
            Crop::KidneyBeans => (20, 60, 40),
            Crop::PigeonPeas => (20, 50, 20),
            Crop::MothBeans => (15, 40, 20),
            Crop::MungBean => (20, 50, 20),
            Crop::BlackGram => (20, 50, 20),
            Crop::Lentil => (25, 60, 40),
            Crop::Pomegranate => (60, 30, 40),
            Crop::Banana => (150, 60, 200),
            Crop::Mango => (100, 40, 80),
            Crop::Grapes => (80, 50, 120),
            Crop::Watermelon => (100, 50, 100),
            Crop::Muskmelon => (100, 50, 100),
            Crop::Apple => (100, 50, 100),
            Crop::Orange => (120, 60, 100),
            Crop::Papaya => (200, 60, 200),
            Crop::Coconut => (140, 70, 140),
            Crop::Cotton => (120, 60, 60),
            Crop::Jute => (100, 50, 40),
            Crop::Coffee => (100, 40, 150),
        };
        NpkValues { n, p, k }
    }
}

/// Questionnaire answers; unanswered questions are `None`
///
/// Form payloads use empty strings for unanswered selects, which deserialize
/// to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpkAnswers {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub crop: Option<Crop>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub prev_crop: Option<PreviousCrop>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub leaf_color: Option<LeafColor>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub growth: Option<GrowthPattern>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub soil: Option<SoilType>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub irrigation: Option<IrrigationFrequency>,
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl NpkAnswers {
    pub fn for_crop(crop: Crop) -> Self {
        Self {
            crop: Some(crop),
            ..Self::default()
        }
    }
}

/// Nitrogen, phosphorus and potassium amounts in kg/ha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpkValues {
    #[serde(rename = "N")]
    pub n: u32,
    #[serde(rename = "P")]
    pub p: u32,
    #[serde(rename = "K")]
    pub k: u32,
}

impl NpkValues {
    pub fn get(&self, nutrient: Nutrient) -> u32 {
        match nutrient {
            Nutrient::Nitrogen => self.n,
            Nutrient::Phosphorus => self.p,
            Nutrient::Potassium => self.k,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

/// Deficiency flagged by an adjustment rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deficiency {
    Nitrogen,
    Phosphorus,
    Potassium,
    #[serde(rename = "Nitrogen & Potassium")]
    NitrogenAndPotassium,
    #[serde(rename = "None - Nutrients are sufficient")]
    Sufficient,
}

impl Deficiency {
    pub fn label(&self) -> &'static str {
        match self {
            Deficiency::Nitrogen => "Nitrogen",
            Deficiency::Phosphorus => "Phosphorus",
            Deficiency::Potassium => "Potassium",
            Deficiency::NitrogenAndPotassium => "Nitrogen & Potassium",
            Deficiency::Sufficient => "None - Nutrients are sufficient",
        }
    }
}

impl fmt::Display for Deficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one questionnaire evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpkResult {
    pub crop: Crop,
    #[serde(rename = "baseNPK")]
    pub base: NpkValues,
    #[serde(rename = "adjustedNPK")]
    pub adjusted: NpkValues,
    pub deficiencies: Vec<Deficiency>,
    pub recommendation: String,
}

impl NpkResult {
    /// Adjusted amount as a percentage of the base target
    pub fn level_percent(&self, nutrient: Nutrient) -> f64 {
        let base = self.base.get(nutrient);
        if base == 0 {
            return 0.0;
        }
        f64::from(self.adjusted.get(nutrient)) / f64::from(base) * 100.0
    }

    pub fn is_sufficient(&self) -> bool {
        self.deficiencies == [Deficiency::Sufficient]
    }
}

// ============================================================================
// Adjustment rules
// ============================================================================

struct Adjustment {
    nutrient: Nutrient,
    factor: f64,
    floor: f64,
}

struct Rule {
    applies: fn(&NpkAnswers) -> bool,
    adjustments: &'static [Adjustment],
    tag: Deficiency,
}

/// Applied in order; later rules compound earlier ones on the same nutrient.
const RULES: &[Rule] = &[
    Rule {
        applies: |a| a.leaf_color == Some(LeafColor::Yellowish),
        adjustments: &[Adjustment { nutrient: Nutrient::Nitrogen, factor: 0.7, floor: 20.0 }],
        tag: Deficiency::Nitrogen,
    },
    Rule {
        applies: |a| a.leaf_color == Some(LeafColor::Purple),
        adjustments: &[Adjustment { nutrient: Nutrient::Phosphorus, factor: 0.7, floor: 15.0 }],
        tag: Deficiency::Phosphorus,
    },
    Rule {
        applies: |a| a.growth == Some(GrowthPattern::Stunted),
        adjustments: &[Adjustment { nutrient: Nutrient::Phosphorus, factor: 0.8, floor: 15.0 }],
        tag: Deficiency::Phosphorus,
    },
    Rule {
        applies: |a| a.soil == Some(SoilType::Sandy),
        adjustments: &[Adjustment { nutrient: Nutrient::Potassium, factor: 0.6, floor: 20.0 }],
        tag: Deficiency::Potassium,
    },
    Rule {
        applies: |a| a.irrigation == Some(IrrigationFrequency::Rarely),
        adjustments: &[
            Adjustment { nutrient: Nutrient::Potassium, factor: 0.7, floor: 20.0 },
            Adjustment { nutrient: Nutrient::Nitrogen, factor: 0.8, floor: 20.0 },
        ],
        tag: Deficiency::NitrogenAndPotassium,
    },
];

/// Fertilizer advice per deficiency kind, in output order
const FERTILIZERS: &[(Deficiency, &str)] = &[
    (Deficiency::Nitrogen, "Apply Urea or Ammonium Nitrate. "),
    (Deficiency::Phosphorus, "Apply Superphosphate or DAP. "),
    (Deficiency::Potassium, "Apply Potassium Chloride or Potassium Sulphate. "),
];

pub const NO_FERTILIZER_NEEDED: &str =
    "No additional fertilizer needed. Maintain current NPK levels.";

/// Unrounded working values
#[derive(Debug, Clone, Copy)]
struct Levels {
    n: f64,
    p: f64,
    k: f64,
}

impl Levels {
    fn slot(&mut self, nutrient: Nutrient) -> &mut f64 {
        match nutrient {
            Nutrient::Nitrogen => &mut self.n,
            Nutrient::Phosphorus => &mut self.p,
            Nutrient::Potassium => &mut self.k,
        }
    }

    fn rounded(&self) -> NpkValues {
        NpkValues {
            n: self.n.round() as u32,
            p: self.p.round() as u32,
            k: self.k.round() as u32,
        }
    }
}

/// Evaluate the questionnaire
pub fn estimate(answers: &NpkAnswers) -> ClientResult<NpkResult> {
    let crop = answers.crop.ok_or(ClientError::CropNotSelected)?;
    let base = crop.base_npk();

    let mut levels = Levels {
        n: f64::from(base.n),
        p: f64::from(base.p),
        k: f64::from(base.k),
    };
    let mut deficiencies = Vec::new();

    for rule in RULES.iter().filter(|r| (r.applies)(answers)) {
        for adj in rule.adjustments {
            let value = levels.slot(adj.nutrient);
            *value = (*value * adj.factor).max(adj.floor);
        }
        deficiencies.push(rule.tag);
    }

    let recommendation = recommend(&deficiencies);
    if deficiencies.is_empty() {
        deficiencies.push(Deficiency::Sufficient);
    }

    tracing::debug!(crop = %crop, deficiencies = deficiencies.len(), "npk estimated");

    Ok(NpkResult {
        crop,
        base,
        adjusted: levels.rounded(),
        deficiencies,
        recommendation,
    })
}

/// Parse a crop name from the questionnaire
pub fn parse_crop(name: &str) -> ClientResult<Crop> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClientError::CropNotSelected);
    }
    name.parse()
        .map_err(|_| ClientError::UnknownCrop(name.to_string()))
}

fn recommend(deficiencies: &[Deficiency]) -> String {
    if deficiencies.is_empty() {
        return NO_FERTILIZER_NEEDED.to_string();
    }

    FERTILIZERS
        .iter()
        .filter(|(kind, _)| deficiencies.contains(kind))
        .map(|(_, advice)| *advice)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_table_has_every_crop() {
        assert_eq!(Crop::ALL.len(), 22);
        for crop in Crop::ALL {
            let npk = crop.base_npk();
            assert!(npk.n > 0 && npk.p > 0 && npk.k > 0, "{} has empty target", crop);
        }
    }

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for soil in SoilType::ALL {
            assert_eq!(soil.label().parse::<SoilType>().unwrap(), *soil);
        }
        assert_eq!(
            "2-3 times/week".parse::<IrrigationFrequency>().unwrap(),
            IrrigationFrequency::SeveralTimesWeekly
        );
    }

    #[test]
    fn test_floor_applies_to_small_targets() {
        // mothbeans N=15: 15 * 0.7 = 10.5, lifted to the floor of 20
        let answers = NpkAnswers {
            leaf_color: Some(LeafColor::Yellowish),
            ..NpkAnswers::for_crop(Crop::MothBeans)
        };
        let result = estimate(&answers).unwrap();
        assert_eq!(result.adjusted.n, 20);
    }

    #[test]
    fn test_combined_tag_alone_gives_no_fragment() {
        let answers = NpkAnswers {
            irrigation: Some(IrrigationFrequency::Rarely),
            ..NpkAnswers::for_crop(Crop::Rice)
        };
        let result = estimate(&answers).unwrap();
        assert_eq!(result.deficiencies, vec![Deficiency::NitrogenAndPotassium]);
        assert_eq!(result.recommendation, "");
    }

    #[test]
    fn test_parse_crop() {
        assert_eq!(parse_crop(" rice ").unwrap(), Crop::Rice);
        assert!(matches!(parse_crop(""), Err(ClientError::CropNotSelected)));
        assert!(matches!(parse_crop("wheat"), Err(ClientError::UnknownCrop(_))));
    }
}
