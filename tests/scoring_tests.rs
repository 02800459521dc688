/// Scoring tests against the bundled fixture artifact
use std::path::PathBuf;
use tourism_predictor::loader;
use tourism_predictor::pipeline::PipelineModel;
use tourism_predictor::predictor::PurchaseLabel;
use tourism_predictor::profile::*;
use tourism_predictor::{score, Predictor};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("tourism_model.json")
}

fn scenario_profile() -> CustomerProfile {
    CustomerProfile {
        age: Age::new(35).unwrap(),
        typeof_contact: TypeofContact::SelfInquiry,
        city_tier: CityTier::new(1).unwrap(),
        occupation: Occupation::Salaried,
        gender: Gender::Male,
        number_of_person_visiting: PersonsVisiting::new(2).unwrap(),
        preferred_property_star: PropertyStar::new(3).unwrap(),
        marital_status: MaritalStatus::Married,
        number_of_trips: TripsPerYear::new(2).unwrap(),
        passport: YesNo::Yes,
        own_car: YesNo::Yes,
        number_of_children_visiting: ChildrenVisiting::new(0).unwrap(),
        designation: Designation::Manager,
        monthly_income: MonthlyIncome::new(60_000).unwrap(),
        pitch_satisfaction_score: PitchSatisfaction::new(4).unwrap(),
        product_pitched: ProductPitched::Standard,
        number_of_followups: Followups::new(3).unwrap(),
        duration_of_pitch: PitchMinutes::new(20).unwrap(),
    }
}

#[test]
fn test_fixture_loads_without_drift() {
    let model = loader::load_from_path(&fixture_path()).unwrap();
    assert_eq!(model.width(), 33);
    assert!(model.schema_drift(&COLUMNS).is_empty());
    assert_eq!(model.model_id(), "tourism-package-logreg-v1");
}

#[test]
fn test_scenario_record_values() {
    let record = scenario_profile().to_record();

    assert_eq!(record.len(), 18);
    assert_eq!(record.get("Age"), Some(FeatureValue::Int(35)));
    assert_eq!(record.get("TypeofContact"), Some(FeatureValue::Text("Self Inquiry")));
    assert_eq!(record.get("Passport"), Some(FeatureValue::Int(1)));
    assert_eq!(record.get("OwnCar"), Some(FeatureValue::Int(1)));
    assert_eq!(record.get("Designation"), Some(FeatureValue::Text("Manager")));
    assert_eq!(record.get("MonthlyIncome"), Some(FeatureValue::Int(60_000)));
    assert_eq!(record.get("DurationOfPitch"), Some(FeatureValue::Int(20)));
}

#[test]
fn test_scenario_from_json_matches_typed_profile() {
    let json = serde_json::json!({
        "Age": 35,
        "TypeofContact": "Self Inquiry",
        "CityTier": 1,
        "Occupation": "Salaried",
        "Gender": "Male",
        "NumberOfPersonVisiting": 2,
        "PreferredPropertyStar": 3,
        "MaritalStatus": "Married",
        "NumberOfTrips": 2,
        "Passport": "Yes",
        "OwnCar": "Yes",
        "NumberOfChildrenVisiting": 0,
        "Designation": "Manager",
        "MonthlyIncome": 60000,
        "PitchSatisfactionScore": 4,
        "ProductPitched": "Standard",
        "NumberOfFollowups": 3,
        "DurationOfPitch": 20
    });
    let parsed: CustomerProfile = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, scenario_profile());
}

#[test]
fn test_missing_field_rejected() {
    let mut json = serde_json::to_value(scenario_profile()).unwrap();
    json.as_object_mut().unwrap().remove("OwnCar");
    assert!(serde_json::from_value::<CustomerProfile>(json).is_err());
}

#[test]
fn test_scenario_scores_consistently() {
    let model = PipelineModel::load_json(&fixture_path()).unwrap();
    let profile = scenario_profile();

    let first = score(&model, &profile).unwrap();
    let second = score(&model, &profile).unwrap();
    assert_eq!(first, second);

    let proba = model.predict_proba(&profile.to_record()).unwrap();
    assert_eq!(first.probability, proba[1]);
    assert_eq!(
        first.label == PurchaseLabel::Purchase,
        first.probability >= model.threshold
    );
    assert!(first.confidence().ends_with('%'));
}

#[test]
fn test_passport_raises_purchase_probability() {
    // The fixture's Passport coefficient is positive
    let model = PipelineModel::load_json(&fixture_path()).unwrap();
    let without = CustomerProfile {
        passport: YesNo::No,
        ..scenario_profile()
    };
    let with = CustomerProfile {
        passport: YesNo::Yes,
        ..scenario_profile()
    };

    let p_without = score(&model, &without).unwrap().probability;
    let p_with = score(&model, &with).unwrap().probability;
    assert!(p_with > p_without);
}
