use super::ooxml::{open_package, paragraphs, read_entry};
use super::ExtractionError;

/// Text of a PowerPoint deck: slides in order, one line per text paragraph.
pub fn extract_pptx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut package = open_package(bytes)?;

    let mut slides: Vec<(u32, String)> = package
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    slides.sort_by_key(|(n, _)| *n);

    let mut text = String::new();
    for (_, name) in slides {
        let xml = read_entry(&mut package, &name)?;
        for paragraph in paragraphs(&xml)? {
            text.push_str(&paragraph);
            text.push('\n');
        }
    }
    Ok(text)
}

/// `ppt/slides/slide12.xml` -> 12. Layouts, masters and rels do not match.
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::make_test_package;

    fn slide(lines: &[&str]) -> String {
        let paras: String = lines
            .iter()
            .map(|l| format!("<a:p><a:r><a:t>{l}</a:t></a:r></a:p>"))
            .collect();
        format!(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody>{paras}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
        )
    }

    #[test]
    fn slides_follow_numeric_order() {
        let s1 = slide(&["Intro"]);
        let s2 = slide(&["Kinematics", "Vectors"]);
        let s10 = slide(&["Review"]);
        let layout = slide(&["Layout"]);
        let bytes = make_test_package(&[
            ("ppt/slides/slide10.xml", s10.as_str()),
            ("ppt/slides/slide2.xml", s2.as_str()),
            ("ppt/slides/slide1.xml", s1.as_str()),
            ("ppt/slideLayouts/slideLayout1.xml", layout.as_str()),
        ]);
        assert_eq!(
            extract_pptx_text(&bytes).unwrap(),
            "Intro\nKinematics\nVectors\nReview\n"
        );
    }

    #[test]
    fn slide_number_parsing() {
        assert_eq!(slide_number("ppt/slides/slide3.xml"), Some(3));
        assert_eq!(slide_number("ppt/slides/_rels/slide3.xml.rels"), None);
        assert_eq!(slide_number("ppt/slideLayouts/slideLayout1.xml"), None);
    }

    #[test]
    fn deck_without_slides_is_empty() {
        let bytes = make_test_package(&[("ppt/presentation.xml", "<p:presentation/>")]);
        assert_eq!(extract_pptx_text(&bytes).unwrap(), "");
    }
}
