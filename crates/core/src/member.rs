#![forbid(unsafe_code)]

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::Date;
use time::format_description::well_known::Iso8601;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Unknown => "",
        }
    }

    /// Record-system wire values are "M"/"F"; anything else is unknown.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "M" | "m" => Sex::Male,
            "F" | "f" => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
            Sex::Unknown => Sex::Unknown,
        }
    }
}

impl Serialize for Sex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Sex::parse(&value))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitalStatus {
    Alive,
    Deceased,
}

/// A person node. Base-originated individuals come from the record system;
/// draft-originated ones are synthesized by the overlay and only exist in the
/// persisted draft blob until promoted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Individual {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub sex: Sex,
    /// ISO `YYYY-MM-DD`, kept in the record system's string form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vital_status: Option<VitalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_override: Option<String>,
    /// Weak back-reference to another individual's id. Relation only, not
    /// ownership; cleared when the referenced individual is removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Individual {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, sex: Sex) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            sex,
            birth_date: None,
            role_label: None,
            vital_status: None,
            symbol_override: None,
            partner_of: None,
            initials: None,
            family_id: None,
            metadata: None,
        }
    }

    /// Age in completed years on `today`, if the birth date is present and
    /// parseable. Unparseable dates count as unknown, never as an error.
    pub fn age_on(&self, today: Date) -> Option<i32> {
        let birth = parse_iso_date(self.birth_date.as_deref()?)?;
        let mut age = today.year() - birth.year();
        if (u8::from(today.month()), today.day()) < (u8::from(birth.month()), birth.day()) {
            age -= 1;
        }
        Some(age)
    }
}

pub fn parse_iso_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), &Iso8601::DEFAULT).ok()
}
