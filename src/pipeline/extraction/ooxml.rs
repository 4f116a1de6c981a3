//! Shared reader for Office Open XML packages (DOCX, PPTX).

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::ExtractionError;

pub(crate) type Package = ZipArchive<Cursor<Vec<u8>>>;

pub(crate) fn open_package(bytes: &[u8]) -> Result<Package, ExtractionError> {
    Ok(ZipArchive::new(Cursor::new(bytes.to_vec()))?)
}

pub(crate) fn read_entry(package: &mut Package, name: &str) -> Result<String, ExtractionError> {
    let mut entry = package
        .by_name(name)
        .map_err(|_| ExtractionError::MissingEntry(name.to_string()))?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Collect the text of every `paragraph` element (local name, e.g. `p`),
/// one string per paragraph. Text outside paragraphs is ignored.
/// `<tab/>` becomes a tab and `<br/>` a newline.
pub(crate) fn paragraphs(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => current = Some(String::new()),
                b"t" => in_text = true,
                b"br" => push_break(current.as_mut(), '\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" => push_break(current.as_mut(), '\t'),
                b"br" => push_break(current.as_mut(), '\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_break(current: Option<&mut String>, ch: char) {
    if let Some(text) = current {
        text.push(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_runs_within_paragraph() {
        let xml = r#"<doc><p><r><t>Week 1: </t></r><r><t>Vectors</t></r></p><p><r><t>Week 2</t></r></p></doc>"#;
        assert_eq!(paragraphs(xml).unwrap(), vec!["Week 1: Vectors", "Week 2"]);
    }

    #[test]
    fn keeps_empty_paragraphs_and_unescapes() {
        let xml = r#"<doc><p/><p></p><p><t>Q&amp;A</t><tab/><t>x</t><br/><t>y</t></p></doc>"#;
        assert_eq!(paragraphs(xml).unwrap(), vec!["", "", "Q&A\tx\ny"]);
    }

    #[test]
    fn ignores_text_outside_t_elements() {
        let xml = r#"<doc><p><instr>PAGE</instr><t>Body</t></p></doc>"#;
        assert_eq!(paragraphs(xml).unwrap(), vec!["Body"]);
    }
}
