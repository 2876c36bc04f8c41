//! Course records and their flattening into stored documents

use crate::store::StoredDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder rendered for any missing field
pub const UNKNOWN: &str = "unknown";

/// Scalar or list value of a course field as it appears in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    List(Vec<String>),
}

impl FieldValue {
    fn is_empty_list(&self) -> bool {
        matches!(self, FieldValue::List(items) if items.is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Flag(b) => write!(f, "{}", b),
            FieldValue::List(items) => f.write_str(&items.join("\n")),
        }
    }
}

/// One course as read from the dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(default)]
    pub name: Option<FieldValue>,
    #[serde(default)]
    pub rmit_code: Option<FieldValue>,
    #[serde(default)]
    pub campus: Option<FieldValue>,
    #[serde(default)]
    pub atar: Option<FieldValue>,
    #[serde(default)]
    pub duration: Option<FieldValue>,
    #[serde(default)]
    pub prerequisites: Option<FieldValue>,
    #[serde(default)]
    pub pathways: Option<FieldValue>,
    #[serde(default)]
    pub raw_text: Option<String>,
}

/// A record with every field rendered to text
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCourse {
    pub name: String,
    pub rmit_code: String,
    pub campus: String,
    pub atar: String,
    pub duration: String,
    pub prerequisites: String,
    pub pathways: String,
    pub raw_text: String,
}

fn render(value: &Option<FieldValue>) -> String {
    match value {
        Some(v) if !v.is_empty_list() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

impl CourseRecord {
    /// Replace missing fields with the placeholder and render the rest
    pub fn normalize(&self) -> NormalizedCourse {
        NormalizedCourse {
            name: render(&self.name),
            rmit_code: render(&self.rmit_code),
            campus: render(&self.campus),
            atar: render(&self.atar),
            duration: render(&self.duration),
            prerequisites: render(&self.prerequisites),
            pathways: render(&self.pathways),
            raw_text: self
                .raw_text
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    /// Flatten into the document stored under `course-<index>`
    pub fn to_document(&self, index: usize) -> StoredDocument {
        let course = self.normalize();
        let document = format!(
            "{}\nRMIT Code: {}\nCampus: {}\nATAR: {}\nDuration: {}\nPrerequisites: {}\nPathways: {}\n\n{}",
            course.name,
            course.rmit_code,
            course.campus,
            course.atar,
            course.duration,
            course.prerequisites,
            course.pathways,
            course.raw_text
        )
        .trim()
        .to_string();

        let metadata: BTreeMap<String, String> = [
            ("name", course.name),
            ("rmit_code", course.rmit_code),
            ("campus", course.campus),
            ("ATAR", course.atar),
            ("Duration", course.duration),
            ("prerequisites", course.prerequisites),
            ("pathways", course.pathways),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        StoredDocument {
            id: format!("course-{}", index),
            document,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> CourseRecord {
        serde_json::from_str(
            r#"{
                "name": "Bachelor of Science (Biology)",
                "rmit_code": "BP229",
                "campus": "City",
                "atar": 70.05,
                "duration": "3 years full-time",
                "prerequisites": "English, Maths Methods",
                "pathways": ["Diploma of Science", "Associate Degree in Science"],
                "raw_text": "Study cells, genetics and ecology."
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_document_layout() {
        let doc = full_record().to_document(3);
        assert_eq!(doc.id, "course-3");
        assert_eq!(
            doc.document,
            "Bachelor of Science (Biology)\n\
             RMIT Code: BP229\n\
             Campus: City\n\
             ATAR: 70.05\n\
             Duration: 3 years full-time\n\
             Prerequisites: English, Maths Methods\n\
             Pathways: Diploma of Science\nAssociate Degree in Science\n\
             \n\
             Study cells, genetics and ecology."
        );
        assert_eq!(doc.metadata["ATAR"], "70.05");
        assert_eq!(doc.metadata["Duration"], "3 years full-time");
        assert_eq!(doc.metadata.len(), 7);
    }

    #[test]
    fn test_missing_fields_render_unknown() {
        let record: CourseRecord =
            serde_json::from_str(r#"{"name": "Diploma of Art", "atar": null}"#).unwrap();
        let doc = record.to_document(0);

        assert!(doc.document.contains("ATAR: unknown"));
        assert!(doc.document.contains("Campus: unknown"));
        assert!(doc.document.contains("Pathways: unknown"));
        assert!(doc.document.ends_with(UNKNOWN));
        assert_eq!(doc.metadata["rmit_code"], UNKNOWN);
        assert_eq!(doc.metadata["name"], "Diploma of Art");
    }

    #[test]
    fn test_empty_pathways_list_is_unknown() {
        let record: CourseRecord = serde_json::from_str(r#"{"pathways": []}"#).unwrap();
        assert_eq!(record.normalize().pathways, UNKNOWN);
    }

    #[test]
    fn test_pathways_as_plain_text() {
        let record: CourseRecord =
            serde_json::from_str(r#"{"pathways": "Articulates into BP229"}"#).unwrap();
        assert_eq!(record.normalize().pathways, "Articulates into BP229");
    }
}
