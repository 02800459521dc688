//! Customer attributes collected by the prediction form.
//!
//! Every integer attribute is a [`Bounded`] value, so a [`CustomerProfile`] that exists
//! is always complete and inside its declared domain. Field names on the wire (form
//! fields, JSON keys) and in the [`FeatureRecord`] are the training-time column names.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Integer constrained to the inclusive range `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Bounded<const MIN: i64, const MAX: i64>(i64);

impl<const MIN: i64, const MAX: i64> Bounded<MIN, MAX> {
    pub fn new(value: i64) -> Result<Self, OutOfRange> {
        if (MIN..=MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(OutOfRange {
                value,
                min: MIN,
                max: MAX,
            })
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl<const MIN: i64, const MAX: i64> TryFrom<i64> for Bounded<MIN, MAX> {
    type Error = OutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<const MIN: i64, const MAX: i64> From<Bounded<MIN, MAX>> for i64 {
    fn from(value: Bounded<MIN, MAX>) -> Self {
        value.0
    }
}

impl<const MIN: i64, const MAX: i64> fmt::Display for Bounded<MIN, MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange {
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value {} is outside the allowed range {}..={}",
            self.value, self.min, self.max
        )
    }
}

impl std::error::Error for OutOfRange {}

pub type Age = Bounded<18, 100>;
pub type CityTier = Bounded<1, 3>;
pub type PersonsVisiting = Bounded<1, 10>;
pub type PropertyStar = Bounded<1, 5>;
pub type TripsPerYear = Bounded<0, 20>;
pub type ChildrenVisiting = Bounded<0, 5>;
pub type MonthlyIncome = Bounded<5000, 1_000_000>;
pub type PitchSatisfaction = Bounded<1, 5>;
pub type Followups = Bounded<0, 20>;
pub type PitchMinutes = Bounded<1, 120>;

/// Closed set of labels a categorical attribute can take.
pub trait Choice: Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    /// Training-time category string.
    fn label(self) -> &'static str;
}

macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

choice_enum!(TypeofContact {
    CompanyInvited => "Company Invited",
    SelfInquiry => "Self Inquiry",
});

choice_enum!(Occupation {
    Salaried => "Salaried",
    Freelancer => "Freelancer",
    BusinessOwner => "Business Owner",
    Student => "Student",
    Other => "Other",
});

choice_enum!(Gender {
    Male => "Male",
    Female => "Female",
});

choice_enum!(MaritalStatus {
    Single => "Single",
    Married => "Married",
    Divorced => "Divorced",
});

choice_enum!(Designation {
    Executive => "Executive",
    SeniorManager => "Senior Manager",
    Manager => "Manager",
    Trainee => "Trainee",
    Other => "Other",
});

choice_enum!(ProductPitched {
    Basic => "Basic",
    Standard => "Standard",
    Deluxe => "Deluxe",
    Premium => "Premium",
});

choice_enum!(
    /// Yes/No answer, encoded as 1/0 in the feature record.
    YesNo {
        No => "No",
        Yes => "Yes",
    }
);

impl YesNo {
    pub fn as_flag(self) -> i64 {
        match self {
            YesNo::Yes => 1,
            YesNo::No => 0,
        }
    }

    pub fn from_flag(flag: i64) -> Option<Self> {
        match flag {
            1 => Some(YesNo::Yes),
            0 => Some(YesNo::No),
            _ => None,
        }
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

/// The 18 customer attributes scored by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CustomerProfile {
    pub age: Age,
    pub typeof_contact: TypeofContact,
    pub city_tier: CityTier,
    pub occupation: Occupation,
    pub gender: Gender,
    pub number_of_person_visiting: PersonsVisiting,
    pub preferred_property_star: PropertyStar,
    pub marital_status: MaritalStatus,
    pub number_of_trips: TripsPerYear,
    pub passport: YesNo,
    pub own_car: YesNo,
    pub number_of_children_visiting: ChildrenVisiting,
    pub designation: Designation,
    pub monthly_income: MonthlyIncome,
    pub pitch_satisfaction_score: PitchSatisfaction,
    pub product_pitched: ProductPitched,
    pub number_of_followups: Followups,
    pub duration_of_pitch: PitchMinutes,
}

/// Training-time column names, in dataframe order.
pub const COLUMNS: [&str; 18] = [
    "Age",
    "TypeofContact",
    "CityTier",
    "Occupation",
    "Gender",
    "NumberOfPersonVisiting",
    "PreferredPropertyStar",
    "MaritalStatus",
    "NumberOfTrips",
    "Passport",
    "OwnCar",
    "NumberOfChildrenVisiting",
    "Designation",
    "MonthlyIncome",
    "PitchSatisfactionScore",
    "ProductPitched",
    "NumberOfFollowups",
    "DurationOfPitch",
];

impl Default for CustomerProfile {
    /// The values the form shows before the user changes anything.
    fn default() -> Self {
        Self {
            age: Bounded(30),
            typeof_contact: TypeofContact::CompanyInvited,
            city_tier: Bounded(1),
            occupation: Occupation::Salaried,
            gender: Gender::Male,
            number_of_person_visiting: Bounded(2),
            preferred_property_star: Bounded(1),
            marital_status: MaritalStatus::Single,
            number_of_trips: Bounded(1),
            passport: YesNo::No,
            own_car: YesNo::No,
            number_of_children_visiting: Bounded(0),
            designation: Designation::Executive,
            monthly_income: Bounded(50_000),
            pitch_satisfaction_score: Bounded(3),
            product_pitched: ProductPitched::Basic,
            number_of_followups: Bounded(2),
            duration_of_pitch: Bounded(15),
        }
    }
}

impl CustomerProfile {
    /// Builds the single-row record handed to the predictor.
    pub fn to_record(&self) -> FeatureRecord {
        use FeatureValue::{Int, Text};

        FeatureRecord {
            values: [
                Int(self.age.get()),
                Text(self.typeof_contact.label()),
                Int(self.city_tier.get()),
                Text(self.occupation.label()),
                Text(self.gender.label()),
                Int(self.number_of_person_visiting.get()),
                Int(self.preferred_property_star.get()),
                Text(self.marital_status.label()),
                Int(self.number_of_trips.get()),
                Int(self.passport.as_flag()),
                Int(self.own_car.as_flag()),
                Int(self.number_of_children_visiting.get()),
                Text(self.designation.label()),
                Int(self.monthly_income.get()),
                Int(self.pitch_satisfaction_score.get()),
                Text(self.product_pitched.label()),
                Int(self.number_of_followups.get()),
                Int(self.duration_of_pitch.get()),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureValue {
    Int(i64),
    Text(&'static str),
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Int(v) => serializer.serialize_i64(*v),
            FeatureValue::Text(v) => serializer.serialize_str(v),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Int(v) => write!(f, "{}", v),
            FeatureValue::Text(v) => f.write_str(v),
        }
    }
}

/// One row keyed by column name; serializes as a JSON object in [`COLUMNS`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRecord {
    values: [FeatureValue; 18],
}

impl FeatureRecord {
    pub fn get(&self, column: &str) -> Option<FeatureValue> {
        COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|idx| self.values[idx])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FeatureValue)> + '_ {
        COLUMNS.iter().copied().zip(self.values.iter().copied())
    }
}

impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}
