use quick_xml::NsReader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};

use super::ubl_ns;
use crate::core::ExtractError;

/// Namespace classification for the two URIs the lookups use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UblNs {
    Cac,
    Cbc,
    Other,
}

/// A namespace-qualified element name used in lookup paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Name {
    pub ns: UblNs,
    pub local: &'static str,
}

impl Name {
    pub const fn cac(local: &'static str) -> Self {
        Name {
            ns: UblNs::Cac,
            local,
        }
    }

    pub const fn cbc(local: &'static str) -> Self {
        Name {
            ns: UblNs::Cbc,
            local,
        }
    }
}

/// What a slot captures from its first matching element.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Capture {
    /// The character data between the start tag and the first child
    /// element or closing tag, with CDATA sections and character
    /// references merged in (empty string for elements without text).
    Text,
    /// The named attribute's value (empty string when absent).
    Attr(&'static str),
}

/// One lookup: a relative path tail plus what to capture there.
///
/// The path matches any element whose innermost ancestors spell out the
/// tail, at any depth inside the scope — the streaming equivalent of a
/// relative `.//a/b` lookup. Only the first matching element per scope
/// ever writes the slot.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot {
    pub path: &'static [Name],
    pub capture: Capture,
}

impl Slot {
    pub const fn text(path: &'static [Name]) -> Self {
        Slot {
            path,
            capture: Capture::Text,
        }
    }

    pub const fn attr(path: &'static [Name], name: &'static str) -> Self {
        Slot {
            path,
            capture: Capture::Attr(name),
        }
    }
}

/// A scan configuration: which element opens a capture scope, and the
/// slots filled within each scope.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScanSpec {
    /// `Some(name)`: every such element (except the root) opens a scope.
    /// `None`: the whole document is a single scope.
    pub frame: Option<Name>,
    pub slots: &'static [Slot],
}

/// Captured slot values for one scope, indexed like `ScanSpec::slots`.
/// `None` means no element matched; `Some("")` means one matched without
/// usable content.
pub(crate) type Captures = Vec<Option<String>>;

/// First captured non-empty value in `precedence` order, or the empty
/// string when every candidate is unset or empty.
pub(crate) fn resolve(captures: &Captures, precedence: &[usize]) -> String {
    precedence
        .iter()
        .filter_map(|&i| captures[i].as_deref())
        .find(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Stream the document once and return the captures of every scope, in
/// start-tag document order.
pub(crate) fn scan(xml: &str, spec: &ScanSpec) -> Result<Vec<Captures>, ExtractError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = NsReader::from_str(xml);
    let mut scanner = Scanner::new(spec);

    loop {
        match reader.read_resolved_event() {
            Ok((res, Event::Start(ref e))) => {
                scanner.disarm();
                scanner.element_started(classify(res)?, e, false)?;
            }
            Ok((res, Event::Empty(ref e))) => {
                scanner.disarm();
                scanner.element_started(classify(res)?, e, true)?;
            }
            Ok((_, Event::End(_))) => {
                scanner.disarm();
                scanner.element_ended()?;
            }
            Ok((_, Event::Text(ref e))) => {
                let text = std::str::from_utf8(e.as_ref())
                    .map_err(|err| ExtractError::MalformedXml(err.to_string()))?;
                scanner.append_text(text);
            }
            Ok((_, Event::CData(ref e))) => {
                let text = std::str::from_utf8(e.as_ref())
                    .map_err(|err| ExtractError::MalformedXml(err.to_string()))?;
                scanner.append_text(text);
            }
            Ok((_, Event::GeneralRef(ref e))) => {
                let name = std::str::from_utf8(e.as_ref())
                    .map_err(|err| ExtractError::MalformedXml(err.to_string()))?;
                let resolved = resolve_reference(name).ok_or_else(|| {
                    ExtractError::MalformedXml(format!("undefined entity &{name};"))
                })?;
                scanner.append_text(&resolved);
            }
            Ok((_, Event::Eof)) => break,
            // Comments and processing instructions do not interrupt a
            // text run.
            Ok(_) => {}
            Err(err) => return Err(ExtractError::MalformedXml(err.to_string())),
        }
    }

    scanner.finish()
}

fn classify(res: ResolveResult<'_>) -> Result<UblNs, ExtractError> {
    match res {
        ResolveResult::Bound(Namespace(uri)) => {
            if uri == ubl_ns::CAC.as_bytes() {
                Ok(UblNs::Cac)
            } else if uri == ubl_ns::CBC.as_bytes() {
                Ok(UblNs::Cbc)
            } else {
                Ok(UblNs::Other)
            }
        }
        ResolveResult::Unbound => Ok(UblNs::Other),
        ResolveResult::Unknown(prefix) => Err(ExtractError::MalformedXml(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

/// Resolve a predefined or numeric character reference. The documents
/// carry no DTD, so any other name is undefined.
fn resolve_reference(name: &str) -> Option<String> {
    match name {
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        _ => {}
    }

    if let Some(hex) = name.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = name.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}

/// One resolved element on the open-element stack.
#[derive(Debug)]
struct PathSeg {
    ns: UblNs,
    local: String,
}

struct Scanner<'s> {
    spec: &'s ScanSpec,
    path: Vec<PathSeg>,
    /// Captures per scope, in start-tag order.
    frames: Vec<Captures>,
    /// Open scopes as (frame index, depth of the scope element).
    open: Vec<(usize, usize)>,
    /// Text slots primed by the previous start tag; text, CDATA and
    /// resolved references append to them until the next tag event.
    armed: Vec<(usize, usize)>,
    saw_root: bool,
}

impl<'s> Scanner<'s> {
    fn new(spec: &'s ScanSpec) -> Self {
        let mut scanner = Scanner {
            spec,
            path: Vec::new(),
            frames: Vec::new(),
            open: Vec::new(),
            armed: Vec::new(),
            saw_root: false,
        };
        if spec.frame.is_none() {
            // Whole-document scope, relative to the root element.
            scanner.frames.push(vec![None; spec.slots.len()]);
            scanner.open.push((0, 1));
        }
        scanner
    }

    fn disarm(&mut self) {
        self.armed.clear();
    }

    fn element_started(
        &mut self,
        ns: UblNs,
        e: &BytesStart<'_>,
        is_empty: bool,
    ) -> Result<(), ExtractError> {
        let local = std::str::from_utf8(e.local_name().as_ref())
            .map_err(|err| ExtractError::MalformedXml(err.to_string()))?
            .to_string();

        if self.path.is_empty() {
            if self.saw_root {
                return Err(ExtractError::MalformedXml(
                    "junk after document element".into(),
                ));
            }
            self.saw_root = true;
        }
        self.path.push(PathSeg { ns, local });

        // A matching element opens a new scope; the root never does
        // (lookups are relative to proper descendants).
        if let Some(frame) = self.spec.frame {
            let seg = &self.path[self.path.len() - 1];
            if self.path.len() > 1 && seg.ns == frame.ns && seg.local == frame.local {
                self.frames.push(vec![None; self.spec.slots.len()]);
                if !is_empty {
                    self.open.push((self.frames.len() - 1, self.path.len()));
                }
            }
        }

        for &(fi, depth) in &self.open {
            for (si, slot) in self.spec.slots.iter().enumerate() {
                if self.frames[fi][si].is_some() || !tail_matches(&self.path, slot.path, depth) {
                    continue;
                }
                match slot.capture {
                    Capture::Text => {
                        self.frames[fi][si] = Some(String::new());
                        if !is_empty {
                            self.armed.push((fi, si));
                        }
                    }
                    Capture::Attr(name) => {
                        let mut value = String::new();
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == name.as_bytes() {
                                let raw = std::str::from_utf8(&attr.value)
                                    .map_err(|err| ExtractError::MalformedXml(err.to_string()))?;
                                value = unescape(raw)
                                    .map_err(|err| ExtractError::MalformedXml(err.to_string()))?
                                    .into_owned();
                                break;
                            }
                        }
                        self.frames[fi][si] = Some(value);
                    }
                }
            }
        }

        if is_empty {
            self.element_ended()?;
        }
        Ok(())
    }

    fn element_ended(&mut self) -> Result<(), ExtractError> {
        if let Some(&(_, depth)) = self.open.last() {
            if depth == self.path.len() {
                self.open.pop();
            }
        }
        if self.path.pop().is_none() {
            return Err(ExtractError::MalformedXml("unexpected closing tag".into()));
        }
        Ok(())
    }

    fn append_text(&mut self, value: &str) {
        for &(fi, si) in &self.armed {
            if let Some(captured) = self.frames[fi][si].as_mut() {
                captured.push_str(value);
            }
        }
    }

    fn finish(self) -> Result<Vec<Captures>, ExtractError> {
        if !self.saw_root {
            return Err(ExtractError::MalformedXml("no element found".into()));
        }
        if !self.path.is_empty() {
            return Err(ExtractError::MalformedXml(format!(
                "unexpected end of file: {} unclosed element(s)",
                self.path.len()
            )));
        }
        Ok(self.frames)
    }
}

/// True when the innermost elements of `path` spell out `tail` and the
/// first tail element lies strictly below the scope element.
fn tail_matches(path: &[PathSeg], tail: &[Name], scope_depth: usize) -> bool {
    if path.len() < tail.len() + scope_depth {
        return false;
    }
    path[path.len() - tail.len()..]
        .iter()
        .zip(tail)
        .all(|(seg, name)| seg.ns == name.ns && seg.local == name.local)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(ns: UblNs, local: &str) -> PathSeg {
        PathSeg {
            ns,
            local: local.to_string(),
        }
    }

    #[test]
    fn tail_matching_respects_namespace_and_depth() {
        let tail = [Name::cac("Item"), Name::cbc("Description")];
        let path = [
            seg(UblNs::Other, "Invoice"),
            seg(UblNs::Cac, "InvoiceLine"),
            seg(UblNs::Cac, "Item"),
            seg(UblNs::Cbc, "Description"),
        ];
        assert!(tail_matches(&path, &tail, 2));

        // Same local names in the wrong namespace never match.
        let wrong_ns = [
            seg(UblNs::Other, "Invoice"),
            seg(UblNs::Cac, "InvoiceLine"),
            seg(UblNs::Other, "Item"),
            seg(UblNs::Cbc, "Description"),
        ];
        assert!(!tail_matches(&wrong_ns, &tail, 2));

        // The scope element itself is not part of its own scope.
        let shallow = [seg(UblNs::Cac, "Item"), seg(UblNs::Cbc, "Description")];
        assert!(!tail_matches(&shallow, &tail, 2));
    }

    #[test]
    fn resolve_takes_first_non_empty_in_precedence_order() {
        let captures = vec![Some(String::new()), None, Some("12.5".into()), Some("9".into())];
        assert_eq!(resolve(&captures, &[0, 1, 2, 3]), "12.5");
        assert_eq!(resolve(&captures, &[3, 2]), "9");
        assert_eq!(resolve(&captures, &[0, 1]), "");
    }

    #[test]
    fn whitespace_counts_as_content() {
        // Resolution follows element text truthiness, not trimmed text.
        let captures = vec![Some(" ".to_string()), Some("42".to_string())];
        assert_eq!(resolve(&captures, &[0, 1]), " ");
    }

    #[test]
    fn first_matching_element_wins_even_when_empty() {
        const SLOTS: [Slot; 1] = [Slot::text(&[Name::cbc("Amount")])];
        const SPEC: ScanSpec = ScanSpec {
            frame: None,
            slots: &SLOTS,
        };
        let xml = r#"<r xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
            <cbc:Amount></cbc:Amount>
            <cbc:Amount>99</cbc:Amount>
        </r>"#;
        let frames = scan(xml, &SPEC).unwrap();
        assert_eq!(frames[0][0], Some(String::new()));
    }

    const NOTE_SLOTS: [Slot; 1] = [Slot::text(&[Name::cbc("Note")])];
    const NOTE_SPEC: ScanSpec = ScanSpec {
        frame: None,
        slots: &NOTE_SLOTS,
    };

    fn note_doc(body: &str) -> String {
        format!(
            r#"<r xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2"><cbc:Note>{body}</cbc:Note></r>"#
        )
    }

    #[test]
    fn references_and_cdata_join_the_surrounding_text() {
        let xml = note_doc("Don&apos;t stop &#8211; A <![CDATA[& B]]> &amp; C");
        let frames = scan(&xml, &NOTE_SPEC).unwrap();
        assert_eq!(
            frames[0][0].as_deref(),
            Some("Don't stop \u{2013} A & B & C")
        );
    }

    #[test]
    fn comments_do_not_interrupt_a_text_run() {
        let xml = note_doc("12<!-- kg -->.5");
        let frames = scan(&xml, &NOTE_SPEC).unwrap();
        assert_eq!(frames[0][0].as_deref(), Some("12.5"));
    }

    #[test]
    fn capture_stops_at_the_first_child_element() {
        let xml = note_doc("lead<cbc:Sub>inner</cbc:Sub>tail");
        let frames = scan(&xml, &NOTE_SPEC).unwrap();
        assert_eq!(frames[0][0].as_deref(), Some("lead"));
    }

    #[test]
    fn undefined_references_fail_the_parse() {
        let xml = note_doc("a&nbsp;b");
        let err = scan(&xml, &NOTE_SPEC).unwrap_err();
        assert!(err.to_string().contains("undefined entity"));
    }

    #[test]
    fn numeric_reference_forms() {
        assert_eq!(resolve_reference("#65").as_deref(), Some("A"));
        assert_eq!(resolve_reference("#x41").as_deref(), Some("A"));
        assert_eq!(resolve_reference("#x110000"), None);
        assert_eq!(resolve_reference("nbsp"), None);
    }
}
