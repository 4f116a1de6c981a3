use crate::models::enums::ThinkingType;
use crate::models::GraphRecord;
use crate::pipeline::extraction::truncate_chars;

use super::types::CourseConcepts;

/// Appended to the system prompt of every JSON-producing request.
pub const JSON_ONLY_SUFFIX: &str = "\n\nIMPORTANT: Return ONLY valid JSON.";

/// Character cap on syllabus text sent for structure extraction.
pub const EXTRACTION_MAX_CHARS: usize = 20_000;
/// Character cap on raw text sent to the refiner.
pub const REFINE_MAX_CHARS: usize = 20_000;
/// Number of node labels given to the task generator.
pub const TASK_CONTEXT_NODES: usize = 10;

pub const REFINE_SYSTEM_PROMPT: &str = r#"
You are an academic editor. The text below was extracted automatically from a
course syllabus file (PDF, Word or PowerPoint) and may contain broken lines,
page headers, repeated footers and stray symbols.

Rewrite it as a clean, well-structured Markdown document:
- Keep every topic, chapter, week, assignment and reading that appears in the text.
- Use headings for modules or weeks and bullet lists for the topics inside them.
- Remove page numbers, headers, footers and extraction noise.
- Do not invent content that is not in the text.

Return only the Markdown document.
"#;

pub const TREE_SYSTEM_PROMPT: &str = r##"
You are a senior curriculum designer and logic analysis expert. Build a deep
pedagogical logic tree from the provided course syllabus.

## Core Objective
Construct a "Linear Decomposition, Hierarchical Progression, Causal Connection"
course logic system that makes the prerequisite dependencies of knowledge clear.

## Output Format (JSON)
{
    "nodes": [
        {
            "id": 1,
            "label": "Node Name (Knowledge Point)",
            "shape": "box" (Main Branch) or "ellipse" (Sub-node),
            "color": "#HEXCODE",
            "level": 0 (Root), 1 (Main Branch), 2 (Sub-node)...,
            "title": "Tooltip: Prerequisite -> Application logic, and weight"
        }
    ],
    "edges": [
        {
            "from": 1,
            "to": 2,
            "arrows": "to",
            "color": {"color": "#HEXCODE"},
            "label": "Relation Type (Strong/Weak)"
        }
    ],
    "concepts": ["List of core concepts"]
}

## Detailed Requirements
1. Root Node: the overall course objective (level 0, colour #FFD54F).
2. Main Branches: core modules by week or chapter (level 1, colour #FFCC80).
3. Sub-nodes: specific knowledge points ordered Basic -> Advanced -> Application (level 2+, colour #FFE0B2).
4. Connection logic:
   - Edges always go from parent to child (level N -> level N+1).
   - Strong connection (red edge #EF5350): must master, directly supports later content.
   - Weak connection (blue edge #42A5F5): auxiliary knowledge.
5. Coverage: every core knowledge point of the syllabus appears.
6. Tooltip: state the weight of the knowledge point for later learning (e.g. Weight 90%).
"##;

pub const GRAPH_SYSTEM_PROMPT: &str = r##"
You are an interdisciplinary knowledge integration expert. Build a full-domain
course knowledge graph from the provided course syllabus.

## Core Objective
Construct a "Mesh Association, Multi-dimensional Radiation, Scenario Landing"
knowledge network that crosses module boundaries and stresses application.

## Output Format (JSON)
{
    "nodes": [
        {
            "id": 1,
            "label": "Node Name",
            "shape": "circle" (Basic) / "box" (Method) / "diamond" (Application) / "star" (Extension),
            "color": "#HEXCODE",
            "title": "Tooltip: connection strength, role and application scenario"
        }
    ],
    "edges": [
        {
            "from": 1,
            "to": 2,
            "label": "★★★★★ (Strength)",
            "color": {"color": "#HEXCODE"},
            "dashes": false
        }
    ],
    "concepts": ["List of core concepts"]
}

## Detailed Requirements
1. Core anchor: the course's core literacy goal (centre, colour #FFD54F).
2. Node classes:
   - Basic concept (circle, #FFF176)
   - Method or technique (box, #81D4FA)
   - Application practice (diamond, #A5D6A7)
   - Extension (star, #CE93D8)
3. Link logic:
   - Direct application (red edge #EF5350): A directly solves B's problem.
   - Similar transfer (blue edge #29B6F6): A and B share transferable logic.
   - Cross-module intersection (green edge #66BB6A): module 1 combined with module 2.
   - Scenario landing (yellow edge #FBC02D): knowledge point -> concrete case.
4. Coverage: every knowledge point of the syllabus appears.
5. Structure: non-hierarchical mesh; any two nodes may be connected.
"##;

pub const TASKS_SYSTEM_PROMPT: &str = r#"
You are a study planner. Generate specific, actionable study tasks based on the
provided course concepts.

Output Format: JSON
{
    "tasks": [
        "Task description 1",
        "Task description 2"
    ]
}
"#;

pub const CROSS_LINK_SYSTEM_PROMPT: &str = r#"
You are a knowledge integration expert. Find semantic connections between the
current course and previous courses.

Output Format: JSON
{
    "cross_links": [
        {"from_concept": "Concept in Current Course", "to_course": "Previous Course Name", "to_concept": "Concept in Previous Course", "reason": "Explanation"}
    ]
}
"#;

pub fn structure_system_prompt(thinking_type: ThinkingType) -> &'static str {
    match thinking_type {
        ThinkingType::Convergent => TREE_SYSTEM_PROMPT,
        ThinkingType::Divergent => GRAPH_SYSTEM_PROMPT,
    }
}

pub fn build_refine_prompt(raw_text: &str) -> String {
    format!(
        "Clean up the following syllabus text:\n\n{}",
        truncate_chars(raw_text, REFINE_MAX_CHARS)
    )
}

pub fn build_structure_prompt(syllabus_text: &str) -> String {
    format!(
        "Please analyze the following syllabus content and strictly generate structured data \
         according to the above model requirements:\n\n{}",
        truncate_chars(syllabus_text, EXTRACTION_MAX_CHARS)
    )
}

pub fn build_tasks_prompt(course_name: &str, nodes: &[GraphRecord], count: usize) -> String {
    let labels: Vec<&str> = nodes
        .iter()
        .take(TASK_CONTEXT_NODES)
        .map(|node| node.get("label").and_then(|l| l.as_str()).unwrap_or_default())
        .collect();
    format!(
        "Course: {course_name}. Key Concepts: {}. Generate {count} tasks that guide the student \
         through these concepts logically.",
        labels.join(", ")
    )
}

pub fn build_cross_link_prompt(
    course_name: &str,
    concepts: &[String],
    others: &[CourseConcepts],
) -> String {
    let concepts_json = serde_json::to_string(concepts).unwrap_or_else(|_| "[]".into());
    let others_json = serde_json::to_string(others).unwrap_or_else(|_| "[]".into());
    format!(
        "Current Course: {course_name}. Concepts: {concepts_json}. Previous Courses: {others_json}. \
         Find relevant cross-course connections."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn thinking_type_selects_template() {
        assert!(structure_system_prompt(ThinkingType::Convergent).contains("logic tree"));
        assert!(structure_system_prompt(ThinkingType::Divergent).contains("knowledge graph"));
    }

    #[test]
    fn structure_prompt_truncates_syllabus() {
        let long = "x".repeat(EXTRACTION_MAX_CHARS + 500);
        let prompt = build_structure_prompt(&long);
        assert_eq!(prompt.matches('x').count(), EXTRACTION_MAX_CHARS);
    }

    #[test]
    fn tasks_prompt_uses_first_ten_labels() {
        let nodes: Vec<GraphRecord> = (1..=12)
            .map(|i| {
                json!({"id": i, "label": format!("Topic{i}")})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect();
        let prompt = build_tasks_prompt("Calculus", &nodes, 4);
        assert!(prompt.contains("Course: Calculus."));
        assert!(prompt.contains("Topic1, Topic2"));
        assert!(prompt.contains("Topic10."));
        assert!(!prompt.contains("Topic11"));
        assert!(prompt.contains("Generate 4 tasks"));
    }

    #[test]
    fn cross_link_prompt_lists_other_courses() {
        let others = vec![CourseConcepts {
            name: "Biology".into(),
            concepts: vec!["Cell".into()],
        }];
        let prompt = build_cross_link_prompt("Chemistry", &["Bond".into()], &others);
        assert!(prompt.contains(r#"Concepts: ["Bond"]"#));
        assert!(prompt.contains(r#"{"name":"Biology","concepts":["Cell"]}"#));
    }
}
