use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_COURSE_ICON: &str = "dumpling";

/// An uploaded syllabus and what has been learned about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    /// Raw extracted text, already truncated for storage.
    pub outline_text: String,
    /// Markdown produced by the refiner, when it succeeded.
    pub refined_text: Option<String>,
    pub extracted_concepts: Vec<String>,
    pub owner_id: Uuid,
    pub created_at: NaiveDateTime,
}

impl Course {
    /// Text handed to structure extraction: refined when available.
    pub fn analysis_source(&self) -> &str {
        match self.refined_text.as_deref() {
            Some(refined) if !refined.trim().is_empty() => refined,
            _ => &self.outline_text,
        }
    }
}

/// Course name derived from an uploaded file name: everything before the first `.`.
pub fn course_name_from_file(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = base.split('.').next().unwrap_or_default().trim();
    if stem.is_empty() {
        "Untitled course".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(outline: &str, refined: Option<&str>) -> Course {
        Course {
            id: Uuid::new_v4(),
            name: "Algebra".into(),
            icon: DEFAULT_COURSE_ICON.into(),
            outline_text: outline.into(),
            refined_text: refined.map(String::from),
            extracted_concepts: vec![],
            owner_id: Uuid::new_v4(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn analysis_prefers_refined_text() {
        assert_eq!(course("raw", Some("# Refined")).analysis_source(), "# Refined");
    }

    #[test]
    fn analysis_falls_back_to_raw_text() {
        assert_eq!(course("raw", None).analysis_source(), "raw");
        assert_eq!(course("raw", Some("  ")).analysis_source(), "raw");
    }

    #[test]
    fn name_stops_at_first_dot() {
        assert_eq!(course_name_from_file("notes.pdf"), "notes");
        assert_eq!(course_name_from_file("linear.algebra.v2.docx"), "linear");
        assert_eq!(course_name_from_file("uploads/Physics 101.pptx"), "Physics 101");
    }

    #[test]
    fn name_never_empty() {
        assert_eq!(course_name_from_file(".hidden"), "Untitled course");
        assert_eq!(course_name_from_file(""), "Untitled course");
    }
}
