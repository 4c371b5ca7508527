//! Tests for the NPK questionnaire
//! Verifies the crop table, the adjustment rules and the recommendation text

use proptest::prelude::*;
use shared::{
    estimate, ClientError, Crop, Deficiency, GrowthPattern, IrrigationFrequency, LeafColor,
    NpkAnswers, NpkValues, Nutrient, SoilType, NO_FERTILIZER_NEEDED,
};

fn answers(crop: Crop) -> NpkAnswers {
    NpkAnswers::for_crop(crop)
}

mod rejection {
    use super::*;

    #[test]
    fn missing_crop_is_rejected() {
        let result = estimate(&NpkAnswers::default());
        assert!(matches!(result, Err(ClientError::CropNotSelected)));
    }

    #[test]
    fn blank_crop_from_form_is_rejected() {
        let form: NpkAnswers = serde_json::from_str(
            r#"{"crop": "", "prevCrop": "", "leafColor": "Yellowish", "growth": "", "soil": "", "irrigation": ""}"#,
        )
        .unwrap();
        assert_eq!(form.crop, None);
        let err = estimate(&form).unwrap_err();
        assert_eq!(err.to_string(), "Please select a crop");
    }

    #[test]
    fn unknown_option_fails_to_parse() {
        let form = serde_json::from_str::<NpkAnswers>(r#"{"crop": "wheat"}"#);
        assert!(form.is_err());
    }
}

mod rules {
    use super::*;

    #[test]
    fn rice_yellowish_sandy_rarely() {
        let answers = NpkAnswers {
            leaf_color: Some(LeafColor::Yellowish),
            soil: Some(SoilType::Sandy),
            irrigation: Some(IrrigationFrequency::Rarely),
            ..answers(Crop::Rice)
        };
        let result = estimate(&answers).unwrap();

        assert_eq!(result.base, NpkValues { n: 120, p: 60, k: 60 });
        // N: 120 * 0.7 * 0.8 = 67.2, K: 60 * 0.6 * 0.7 = 25.2
        assert_eq!(result.adjusted, NpkValues { n: 67, p: 60, k: 25 });
        assert_eq!(
            result.deficiencies,
            vec![
                Deficiency::Nitrogen,
                Deficiency::Potassium,
                Deficiency::NitrogenAndPotassium
            ]
        );
        assert_eq!(
            result.recommendation,
            "Apply Urea or Ammonium Nitrate. Apply Potassium Chloride or Potassium Sulphate. "
        );
    }

    #[test]
    fn no_observations_means_sufficient() {
        let result = estimate(&answers(Crop::Coffee)).unwrap();
        assert_eq!(result.base, result.adjusted);
        assert_eq!(result.deficiencies, vec![Deficiency::Sufficient]);
        assert!(result.is_sufficient());
        assert_eq!(result.recommendation, NO_FERTILIZER_NEEDED);
    }

    #[test]
    fn healthy_observations_trigger_nothing() {
        let answers = NpkAnswers {
            leaf_color: Some(LeafColor::DarkGreen),
            growth: Some(GrowthPattern::Healthy),
            soil: Some(SoilType::Loam),
            irrigation: Some(IrrigationFrequency::Daily),
            ..answers(Crop::Banana)
        };
        assert!(estimate(&answers).unwrap().is_sufficient());
    }

    #[test]
    fn stunted_growth_compounds_phosphorus_and_keeps_duplicate_tag() {
        let answers = NpkAnswers {
            leaf_color: Some(LeafColor::Purple),
            growth: Some(GrowthPattern::Stunted),
            ..answers(Crop::Maize)
        };
        let result = estimate(&answers).unwrap();

        // P: 75 * 0.7 = 52.5, * 0.8 = 42
        assert_eq!(result.adjusted.p, 42);
        assert_eq!(result.adjusted.n, 150);
        assert_eq!(
            result.deficiencies,
            vec![Deficiency::Phosphorus, Deficiency::Phosphorus]
        );
        assert_eq!(result.recommendation, "Apply Superphosphate or DAP. ");
    }

    #[test]
    fn floors_hold_for_low_targets() {
        // pigeonpeas K=20: sandy 12 -> 20, rarely 14 -> 20
        let answers = NpkAnswers {
            soil: Some(SoilType::Sandy),
            irrigation: Some(IrrigationFrequency::Rarely),
            growth: Some(GrowthPattern::Stunted),
            ..answers(Crop::PigeonPeas)
        };
        let result = estimate(&answers).unwrap();
        assert_eq!(result.adjusted.k, 20);
        assert_eq!(result.adjusted.n, 20);
        assert_eq!(result.adjusted.p, 40);
    }

    #[test]
    fn rounding_is_half_up() {
        // maize P: 75 * 0.7 = 52.5 -> 53
        let answers = NpkAnswers {
            leaf_color: Some(LeafColor::Purple),
            ..answers(Crop::Maize)
        };
        assert_eq!(estimate(&answers).unwrap().adjusted.p, 53);
    }

    #[test]
    fn level_percent_tracks_adjustment() {
        let answers = NpkAnswers {
            soil: Some(SoilType::Sandy),
            ..answers(Crop::Banana)
        };
        let result = estimate(&answers).unwrap();
        assert!((result.level_percent(Nutrient::Potassium) - 60.0).abs() < 1e-9);
        assert!((result.level_percent(Nutrient::Nitrogen) - 100.0).abs() < 1e-9);
    }
}

mod serialization {
    use super::*;

    #[test]
    fn result_uses_questionnaire_field_names() {
        let result = estimate(&answers(Crop::Rice)).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["crop"], "rice");
        assert_eq!(json["baseNPK"]["N"], 120);
        assert_eq!(json["adjustedNPK"]["K"], 60);
        assert_eq!(json["deficiencies"][0], "None - Nutrients are sufficient");
    }

    #[test]
    fn form_labels_parse() {
        let form: NpkAnswers = serde_json::from_str(
            r#"{"crop": "kidneybeans", "prevCrop": "None", "leafColor": "Light Green",
                "growth": "Tall & Thin", "soil": "Clay", "irrigation": "2-3 times/week"}"#,
        )
        .unwrap();
        assert_eq!(form.crop, Some(Crop::KidneyBeans));
        assert_eq!(form.growth, Some(GrowthPattern::TallAndThin));
        assert_eq!(form.irrigation, Some(IrrigationFrequency::SeveralTimesWeekly));
    }
}

// =============================================================================
// Property tests
// =============================================================================

fn answers_strategy() -> impl Strategy<Value = NpkAnswers> {
    (
        prop::sample::select(Crop::ALL),
        prop::option::of(prop::sample::select(LeafColor::ALL)),
        prop::option::of(prop::sample::select(GrowthPattern::ALL)),
        prop::option::of(prop::sample::select(SoilType::ALL)),
        prop::option::of(prop::sample::select(IrrigationFrequency::ALL)),
    )
        .prop_map(|(crop, leaf_color, growth, soil, irrigation)| NpkAnswers {
            crop: Some(crop),
            prev_crop: None,
            leaf_color,
            growth,
            soil,
            irrigation,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Same answers always give the same result
    #[test]
    fn prop_estimate_is_deterministic(answers in answers_strategy()) {
        let first = estimate(&answers).unwrap();
        let second = estimate(&answers).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Adjustments never raise a nutrient and the deficiency list is never empty
    #[test]
    fn prop_adjusted_within_base(answers in answers_strategy()) {
        let result = estimate(&answers).unwrap();
        prop_assert!(!result.deficiencies.is_empty());
        for nutrient in [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium] {
            let base = result.base.get(nutrient);
            let adjusted = result.adjusted.get(nutrient);
            prop_assert!(adjusted <= base.max(20));
        }
        prop_assert_eq!(result.base, answers.crop.unwrap().base_npk());
    }
}
