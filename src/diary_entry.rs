use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used by the backend for the `date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Skill categories an apprentice can tick on a diary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    #[serde(rename = "First Fix")]
    FirstFix,
    #[serde(rename = "Second Fix")]
    SecondFix,
    #[serde(rename = "Testing & Inspection")]
    TestingInspection,
    #[serde(rename = "Fault Finding")]
    FaultFinding,
    #[serde(rename = "Containment")]
    Containment,
    #[serde(rename = "Cable Termination")]
    CableTermination,
    #[serde(rename = "Health & Safety")]
    HealthSafety,
    #[serde(rename = "Drawings & Planning")]
    DrawingsPlanning,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 8] = [
        SkillCategory::FirstFix,
        SkillCategory::SecondFix,
        SkillCategory::TestingInspection,
        SkillCategory::FaultFinding,
        SkillCategory::Containment,
        SkillCategory::CableTermination,
        SkillCategory::HealthSafety,
        SkillCategory::DrawingsPlanning,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SkillCategory::FirstFix => "First Fix",
            SkillCategory::SecondFix => "Second Fix",
            SkillCategory::TestingInspection => "Testing & Inspection",
            SkillCategory::FaultFinding => "Fault Finding",
            SkillCategory::Containment => "Containment",
            SkillCategory::CableTermination => "Cable Termination",
            SkillCategory::HealthSafety => "Health & Safety",
            SkillCategory::DrawingsPlanning => "Drawings & Planning",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A site diary record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub date: String,
    pub site_name: String,
    #[serde(default)]
    pub supervisor: Option<String>,
    #[serde(default)]
    pub tasks_completed: Vec<String>,
    #[serde(default)]
    pub skills_practised: Vec<SkillCategory>,
    #[serde(default)]
    pub what_i_learned: Option<String>,
    #[serde(default)]
    pub issues_or_questions: Option<String>,
    #[serde(default)]
    pub mood_rating: Option<u8>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub linked_portfolio_id: Option<String>,
}

impl DiaryEntry {
    pub fn new(date: NaiveDate, site_name: impl Into<String>) -> Self {
        DiaryEntry {
            id: None,
            date: date.format(DATE_FORMAT).to_string(),
            site_name: site_name.into(),
            supervisor: None,
            tasks_completed: Vec::new(),
            skills_practised: Vec::new(),
            what_i_learned: None,
            issues_or_questions: None,
            mood_rating: None,
            photos: Vec::new(),
            linked_portfolio_id: None,
        }
    }

    /// The calendar day this entry represents, or `None` if the stored
    /// string is not a valid `YYYY-MM-DD` date.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.date)
    }
}

pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_optional_text_serialises_as_null() {
        let entry = DiaryEntry::new(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), "Depot");
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value["supervisor"].is_null());
        assert!(value["what_i_learned"].is_null());
        assert!(value.get("id").is_none());
        assert_eq!(value["date"], "2024-06-03");
    }

    #[test]
    fn skills_use_display_labels_on_the_wire() {
        let json = serde_json::to_string(&SkillCategory::TestingInspection).unwrap();
        assert_eq!(json, "\"Testing & Inspection\"");
        assert_eq!(
            SkillCategory::from_label("Fault Finding"),
            Some(SkillCategory::FaultFinding)
        );
        assert_eq!(SkillCategory::from_label("Plastering"), None);
    }

    #[test]
    fn bad_dates_do_not_parse() {
        let mut entry = DiaryEntry::new(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), "Depot");
        entry.date = "03/06/2024".into();
        assert_eq!(entry.calendar_date(), None);
        entry.date = "2024-02-30".into();
        assert_eq!(entry.calendar_date(), None);
    }

    #[test]
    fn backend_row_with_missing_columns_deserialises() {
        let row = r#"{"id":"abc","date":"2024-06-01","site_name":"School refit","supervisor":null}"#;
        let entry: DiaryEntry = serde_json::from_str(row).unwrap();
        assert_eq!(entry.id.as_deref(), Some("abc"));
        assert!(entry.tasks_completed.is_empty());
        assert_eq!(entry.mood_rating, None);
    }
}
