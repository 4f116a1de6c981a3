use std::sync::Arc;

use serde_json::Value;

use super::prompt::{
    build_cross_link_prompt, build_refine_prompt, build_structure_prompt, build_tasks_prompt,
    structure_system_prompt, CROSS_LINK_SYSTEM_PROMPT, JSON_ONLY_SUFFIX, REFINE_SYSTEM_PROMPT,
    TASKS_SYSTEM_PROMPT,
};
use super::sanitize::coerce_json;
use super::types::{strings, CourseConcepts, CourseStructure, CrossLink, LlmClient};
use crate::models::enums::ThinkingType;
use crate::models::GraphRecord;

/// Course-level generation on top of two chat-completion providers.
///
/// None of these operations fail: provider and parse errors are logged and
/// turn into `None` or an empty list, and callers fall back to placeholders.
#[derive(Clone)]
pub struct CourseAi {
    structuring: Arc<dyn LlmClient>,
    refining: Arc<dyn LlmClient>,
}

impl CourseAi {
    pub fn new(structuring: Arc<dyn LlmClient>, refining: Arc<dyn LlmClient>) -> Self {
        Self {
            structuring,
            refining,
        }
    }

    /// Clean raw syllabus text into Markdown.
    pub fn refine_syllabus(&self, raw_text: &str) -> Option<String> {
        if raw_text.trim().is_empty() {
            return None;
        }
        match self
            .refining
            .complete(REFINE_SYSTEM_PROMPT, &build_refine_prompt(raw_text))
        {
            Ok(reply) => {
                let markdown = strip_outer_fence(&reply);
                if markdown.is_empty() {
                    tracing::warn!(provider = self.refining.provider(), "Refiner returned empty text");
                    return None;
                }
                tracing::info!(
                    provider = self.refining.provider(),
                    chars = markdown.chars().count(),
                    "Syllabus refined"
                );
                Some(markdown.to_string())
            }
            Err(e) => {
                tracing::warn!(provider = self.refining.provider(), error = %e, "Refinement failed");
                None
            }
        }
    }

    pub fn extract_course_structure(
        &self,
        syllabus_text: &str,
        thinking_type: ThinkingType,
    ) -> Option<CourseStructure> {
        let value = self.request_json(
            "structure",
            structure_system_prompt(thinking_type),
            &build_structure_prompt(syllabus_text),
        )?;
        let structure = CourseStructure::from_value(&value);
        tracing::info!(
            %thinking_type,
            nodes = structure.nodes.len(),
            edges = structure.edges.len(),
            concepts = structure.concepts.len(),
            "Course structure extracted"
        );
        Some(structure)
    }

    /// Empty without a provider call when there are no other courses.
    pub fn find_cross_connections(
        &self,
        course_name: &str,
        concepts: &[String],
        others: &[CourseConcepts],
    ) -> Vec<CrossLink> {
        if others.is_empty() {
            return Vec::new();
        }
        let Some(value) = self.request_json(
            "cross_link",
            CROSS_LINK_SYSTEM_PROMPT,
            &build_cross_link_prompt(course_name, concepts, others),
        ) else {
            return Vec::new();
        };

        let links: Vec<CrossLink> = value
            .get("cross_links")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        tracing::info!(links = links.len(), others = others.len(), "Cross-course links found");
        links
    }

    pub fn generate_smart_tasks(
        &self,
        course_name: &str,
        nodes: &[GraphRecord],
        count: usize,
    ) -> Option<Vec<String>> {
        let value = self.request_json(
            "tasks",
            TASKS_SYSTEM_PROMPT,
            &build_tasks_prompt(course_name, nodes, count),
        )?;
        let tasks = value.get("tasks")?;
        Some(strings(Some(tasks)))
    }

    fn request_json(&self, purpose: &'static str, system: &str, user: &str) -> Option<Value> {
        let system = format!("{system}{JSON_ONLY_SUFFIX}");
        let provider = self.structuring.provider();

        let reply = match self.structuring.complete(&system, user) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(purpose, provider, error = %e, "LLM request failed");
                return None;
            }
        };
        tracing::debug!(purpose, provider, reply_chars = reply.len(), "LLM reply received");

        match coerce_json(&reply) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(purpose, provider, error = %e, "LLM reply is not valid JSON");
                None
            }
        }
    }
}

/// Drop a Markdown fence wrapping the entire reply.
fn strip_outer_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return trimmed;
    };
    match inner.split_once('\n') {
        Some((info, body)) if !info.contains(' ') => body.trim(),
        _ => inner.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::{LlmError, MockLlmClient};

    fn ai(structuring: MockLlmClient, refining: MockLlmClient) -> (CourseAi, Arc<MockLlmClient>, Arc<MockLlmClient>) {
        let s = Arc::new(structuring);
        let r = Arc::new(refining);
        (CourseAi::new(s.clone(), r.clone()), s, r)
    }

    #[test]
    fn structure_request_appends_json_instruction() {
        let (ai, s, _) = ai(
            MockLlmClient::new().with_reply(r#"```json
{"nodes": [{"id": 1, "label": "Root"}], "edges": [], "concepts": ["Root"],}
```"#),
            MockLlmClient::new(),
        );
        let structure = ai
            .extract_course_structure("Week 1: Root", ThinkingType::Convergent)
            .unwrap();
        assert_eq!(structure.concepts, vec!["Root"]);

        let calls = s.calls();
        assert!(calls[0].0.ends_with("IMPORTANT: Return ONLY valid JSON."));
        assert!(calls[0].0.contains("logic tree"));
        assert!(calls[0].1.ends_with("Week 1: Root"));
    }

    #[test]
    fn failures_degrade_to_nothing() {
        let (ai, _, _) = ai(
            MockLlmClient::new()
                .with_error(LlmError::ProviderError { status: 500, body: "boom".into() })
                .with_reply("I cannot help with that."),
            MockLlmClient::new(),
        );
        assert!(ai.extract_course_structure("x", ThinkingType::Divergent).is_none());
        assert!(ai.generate_smart_tasks("Course", &[], 3).is_none());
        assert!(ai.refine_syllabus("raw").is_none());
    }

    #[test]
    fn missing_credentials_never_raise() {
        let (ai, _, _) = ai(MockLlmClient::new(), MockLlmClient::new());
        let others = vec![CourseConcepts { name: "Bio".into(), concepts: vec!["Cell".into()] }];
        assert!(ai.refine_syllabus("raw").is_none());
        assert!(ai.extract_course_structure("x", ThinkingType::Divergent).is_none());
        assert!(ai.find_cross_connections("Chem", &[], &others).is_empty());
        assert!(ai.generate_smart_tasks("Chem", &[], 3).is_none());
    }

    #[test]
    fn cross_links_skip_provider_without_other_courses() {
        let (ai, s, _) = ai(MockLlmClient::new().with_reply("{}"), MockLlmClient::new());
        assert!(ai.find_cross_connections("Chem", &["Bond".into()], &[]).is_empty());
        assert_eq!(s.call_count(), 0);
    }

    #[test]
    fn cross_links_drop_incomplete_entries() {
        let reply = r#"{"cross_links": [
            {"from_concept": "Bond", "to_course": "Physics", "to_concept": "Force", "reason": "both attract"},
            {"from_concept": "Orphan"}
        ]}"#;
        let (ai, _, _) = ai(MockLlmClient::new().with_reply(reply), MockLlmClient::new());
        let others = vec![CourseConcepts { name: "Physics".into(), concepts: vec!["Force".into()] }];
        let links = ai.find_cross_connections("Chem", &["Bond".into()], &others);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].reason.as_deref(), Some("both attract"));
    }

    #[test]
    fn tasks_require_tasks_key() {
        let (ai, _, _) = ai(
            MockLlmClient::new()
                .with_reply(r#"{"tasks": ["Read chapter 1", "Solve set A"]}"#)
                .with_reply(r#"{"todo": ["x"]}"#),
            MockLlmClient::new(),
        );
        assert_eq!(
            ai.generate_smart_tasks("Chem", &[], 2).unwrap(),
            vec!["Read chapter 1", "Solve set A"]
        );
        assert!(ai.generate_smart_tasks("Chem", &[], 2).is_none());
    }

    #[test]
    fn refiner_uses_its_own_provider() {
        let (ai, s, r) = ai(
            MockLlmClient::new(),
            MockLlmClient::new().with_reply("```markdown\n# Week 1\n- Atoms\n```"),
        );
        assert_eq!(ai.refine_syllabus("week 1 atoms").unwrap(), "# Week 1\n- Atoms");
        assert_eq!(r.call_count(), 1);
        assert_eq!(s.call_count(), 0);
        assert!(!r.calls()[0].0.contains("Return ONLY valid JSON"));
    }

    #[test]
    fn blank_text_is_not_refined() {
        let (ai, _, r) = ai(MockLlmClient::new(), MockLlmClient::new().with_reply("x"));
        assert!(ai.refine_syllabus("  \n").is_none());
        assert_eq!(r.call_count(), 0);
    }

    #[test]
    fn outer_fence_stripping() {
        assert_eq!(strip_outer_fence("  # Title  "), "# Title");
        assert_eq!(strip_outer_fence("```\n# T\n```"), "# T");
        assert_eq!(strip_outer_fence("```md\n# T\n```"), "# T");
        assert_eq!(strip_outer_fence("```md # T```"), "md # T");
    }
}
