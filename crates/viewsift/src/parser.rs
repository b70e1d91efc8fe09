/*!
Hierarchy dump parsing.

Every markup element becomes one [`Element`], regardless of tag name. String
attributes are kept verbatim; booleans compare case-insensitively against
`"true"`; a malformed `bounds` value degrades to [`Bounds::ZERO`]. Only a
document that is not a single well-formed tree is an error.

```ignore
let hierarchy = viewsift::parse_hierarchy(&std::fs::read_to_string("dump.xml")?)?;
println!("{} elements on a {:?} screen", hierarchy.len(), hierarchy.screen());
```
*/

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::hierarchy::{Hierarchy, HierarchyBuilder};
use crate::types::{Bounds, Element, ElementId, ViewsiftError, ViewsiftResult};

/// Attribute names used by hierarchy dumps.
mod attr {
  pub(super) const NODE_ID: &[u8] = b"source-node-id";
  pub(super) const CLASS: &[u8] = b"class";
  pub(super) const TEXT: &[u8] = b"text";
  pub(super) const CONTENT_DESC: &[u8] = b"content-desc";
  pub(super) const RESOURCE_ID: &[u8] = b"resource-id";
  pub(super) const BOUNDS: &[u8] = b"bounds";
  pub(super) const VISIBLE_TO_USER: &[u8] = b"visible-to-user";
  pub(super) const IMPORTANT: &[u8] = b"important";
  pub(super) const CLICKABLE: &[u8] = b"clickable";
}

/// Parse a hierarchy dump into an element arena.
///
/// A leading `<?xml ...?>` declaration is skipped.
pub fn parse_hierarchy(markup: &str) -> ViewsiftResult<Hierarchy> {
  let mut reader = Reader::from_str(markup);
  reader.trim_text(true);

  let mut builder = HierarchyBuilder::new();
  // Elements currently open, innermost last
  let mut open: Vec<ElementId> = Vec::new();
  let mut seen_root = false;

  loop {
    let position = reader.buffer_position();
    let event = reader.read_event().map_err(|e| malformed(position, &e))?;
    match event {
      Event::Start(ref start) | Event::Empty(ref start) => {
        if open.is_empty() {
          if seen_root {
            return Err(ViewsiftError::MultipleRoots { position });
          }
          seen_root = true;
        }
        let element = element_from_tag(start).map_err(|reason| ViewsiftError::MalformedDocument {
          position,
          reason,
        })?;
        let id = builder.push(element, open.last().copied());
        if matches!(event, Event::Start(_)) {
          open.push(id);
        }
      }
      Event::End(_) => {
        if open.pop().is_none() {
          return Err(ViewsiftError::MalformedDocument {
            position,
            reason: "closing tag without a matching opening tag".to_string(),
          });
        }
      }
      Event::Text(ref text) if open.is_empty() && !is_blank(text) => {
        return Err(stray_content(position, seen_root));
      }
      Event::CData(ref data) if open.is_empty() && !is_blank(data) => {
        return Err(stray_content(position, seen_root));
      }
      Event::Eof => break,
      // Declarations, comments, element text and processing instructions carry no elements
      Event::Text(_)
      | Event::CData(_)
      | Event::Comment(_)
      | Event::Decl(_)
      | Event::PI(_)
      | Event::DocType(_) => {}
    }
  }

  if !open.is_empty() {
    return Err(ViewsiftError::MalformedDocument {
      position: reader.buffer_position(),
      reason: format!("{} element(s) left unclosed", open.len()),
    });
  }
  if !seen_root {
    return Err(ViewsiftError::EmptyDocument);
  }

  let hierarchy = builder.finish();
  log::debug!(
    "Parsed hierarchy: {} elements, screen {}x{}",
    hierarchy.len(),
    hierarchy.screen().width,
    hierarchy.screen().height
  );
  Ok(hierarchy)
}

fn malformed(position: usize, error: &quick_xml::Error) -> ViewsiftError {
  ViewsiftError::MalformedDocument {
    position,
    reason: error.to_string(),
  }
}

fn is_blank(content: &[u8]) -> bool {
  content.iter().all(u8::is_ascii_whitespace)
}

fn stray_content(position: usize, after_root: bool) -> ViewsiftError {
  let place = if after_root { "after" } else { "before" };
  ViewsiftError::MalformedDocument {
    position,
    reason: format!("text {place} the root element"),
  }
}

fn element_from_tag(tag: &BytesStart<'_>) -> Result<Element, String> {
  let mut element = Element::default();
  for attribute in tag.attributes() {
    let attribute = attribute.map_err(|e| format!("attribute error: {e}"))?;
    let value = attribute
      .unescape_value()
      .map_err(|e| format!("attribute value error: {e}"))?;
    match attribute.key.as_ref() {
      attr::NODE_ID => element.node_id = value.into_owned(),
      attr::CLASS => element.class_name = value.into_owned(),
      attr::TEXT => element.text = value.into_owned(),
      attr::CONTENT_DESC => element.content_description = value.into_owned(),
      attr::RESOURCE_ID => element.resource_id = value.into_owned(),
      attr::BOUNDS => element.bounds = parse_bounds(&value),
      attr::VISIBLE_TO_USER => element.visible_to_user = parse_flag(&value),
      attr::IMPORTANT => element.important = parse_flag(&value),
      attr::CLICKABLE => element.clickable = parse_flag(&value),
      _ => {}
    }
  }
  Ok(element)
}

/// Parse a `"left top right bottom"` bounds value.
///
/// Surrounding quotes are tolerated. Anything other than exactly four integer
/// tokens yields [`Bounds::ZERO`].
pub fn parse_bounds(raw: &str) -> Bounds {
  let cleaned = raw.trim_matches(|c| c == '"' || c == '\'');
  let parsed: Result<Vec<i32>, _> = cleaned.split_whitespace().map(str::parse).collect();
  match parsed.as_deref() {
    Ok(&[left, top, right, bottom]) => Bounds::new(left, top, right, bottom),
    _ => {
      if !raw.is_empty() {
        log::trace!("Unparseable bounds {raw:?}, using zero rectangle");
      }
      Bounds::ZERO
    }
  }
}

/// `"true"` in any letter case is true; everything else is false.
pub fn parse_flag(raw: &str) -> bool {
  raw.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
  use super::*;

  const DUMP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<node source-node-id="1" class="android.widget.FrameLayout" bounds="0 0 720 1612" visible-to-user="true">
  <node source-node-id="2" class="android.widget.LinearLayout" bounds="0 36 720 200" visible-to-user="true">
    <node source-node-id="3" class="android.widget.TextView" text="确定" bounds="10 50 110 100" visible-to-user="TRUE" clickable="true"/>
  </node>
  <node source-node-id="4" class="android.widget.ImageView" content-desc="返回" resource-id="com.app:id/back" bounds="bad" important="true"/>
</node>"#;

  mod parse_hierarchy_tests {
    use super::*;

    #[test]
    fn parses_all_nodes_in_document_order() {
      let h = parse_hierarchy(DUMP).unwrap();
      let ids: Vec<_> = h.iter().map(|e| e.node_id.as_str()).collect();
      assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn keeps_attributes_verbatim() {
      let h = parse_hierarchy(DUMP).unwrap();
      let label = h.find_by_node_id("3").unwrap();
      assert_eq!(label.class_name, "android.widget.TextView");
      assert_eq!(label.text, "确定");
      assert_eq!(label.bounds, Bounds::new(10, 50, 110, 100));
      assert!(label.visible_to_user, "flag comparison is case-insensitive");
      assert!(label.clickable);
      assert!(!label.important, "absent flag defaults to false");
    }

    #[test]
    fn bad_bounds_degrade_to_zero() {
      let h = parse_hierarchy(DUMP).unwrap();
      let image = h.find_by_node_id("4").unwrap();
      assert_eq!(image.bounds, Bounds::ZERO);
      assert_eq!(image.resource_id, "com.app:id/back");
    }

    #[test]
    fn resolves_structure() {
      let h = parse_hierarchy(DUMP).unwrap();
      let label = h.find_by_node_id("3").unwrap();
      assert_eq!(label.parent_node_id.as_deref(), Some("2"));
      assert_eq!(h.parent(label.id).map(|p| p.node_id.as_str()), Some("2"));
      assert_eq!(h.roots().count(), 1);
      assert_eq!(h.screen().width, 720);
      assert_eq!(h.screen().height, 1612);
    }

    #[test]
    fn unescapes_entities() {
      let h = parse_hierarchy(r#"<node text="a &amp; b" bounds="0 0 1 1"/>"#).unwrap();
      assert_eq!(h.elements()[0].text, "a & b");
    }
  }

  mod error_tests {
    use super::*;

    #[test]
    fn empty_input_is_empty_document() {
      assert!(matches!(parse_hierarchy(""), Err(ViewsiftError::EmptyDocument)));
      assert!(matches!(
        parse_hierarchy(r#"<?xml version="1.0"?>"#),
        Err(ViewsiftError::EmptyDocument)
      ));
    }

    #[test]
    fn unclosed_tag_is_malformed() {
      let result = parse_hierarchy(r#"<node bounds="0 0 1 1"><node/>"#);
      assert!(matches!(result, Err(ViewsiftError::MalformedDocument { .. })));
    }

    #[test]
    fn mismatched_tag_is_malformed() {
      let result = parse_hierarchy("<node><child></node></child>");
      assert!(matches!(result, Err(ViewsiftError::MalformedDocument { .. })));
    }

    #[test]
    fn text_outside_the_root_is_malformed() {
      let after = parse_hierarchy(r#"<node class="a" bounds="0 0 10 10"/>this is not xml"#);
      assert!(
        matches!(&after, Err(ViewsiftError::MalformedDocument { reason, .. }) if reason.contains("after")),
        "{after:?}"
      );
      let before = parse_hierarchy(r#"garbage before<node class="a" bounds="0 0 10 10"/>"#);
      assert!(
        matches!(&before, Err(ViewsiftError::MalformedDocument { reason, .. }) if reason.contains("before")),
        "{before:?}"
      );
      let cdata = parse_hierarchy(r#"<node bounds="0 0 10 10"/><![CDATA[x]]>"#);
      assert!(matches!(cdata, Err(ViewsiftError::MalformedDocument { .. })));
    }

    #[test]
    fn whitespace_around_the_root_is_fine() {
      let h = parse_hierarchy("\n  <node bounds=\"0 0 10 10\"/>\n\n").unwrap();
      assert_eq!(h.len(), 1);
    }

    #[test]
    fn two_roots_are_rejected() {
      let result = parse_hierarchy("<node/><node/>");
      assert!(matches!(result, Err(ViewsiftError::MultipleRoots { .. })));
    }
  }

  mod parse_bounds_tests {
    use super::*;

    #[test]
    fn four_integers() {
      assert_eq!(parse_bounds("0 36 720 200"), Bounds::new(0, 36, 720, 200));
      assert_eq!(parse_bounds("-5 0 10 10"), Bounds::new(-5, 0, 10, 10));
    }

    #[test]
    fn quoted_and_inverted() {
      assert_eq!(parse_bounds("'100 100 0 0'"), Bounds::new(0, 0, 100, 100));
    }

    #[test]
    fn wrong_shape_is_zero() {
      assert_eq!(parse_bounds(""), Bounds::ZERO);
      assert_eq!(parse_bounds("1 2 3"), Bounds::ZERO);
      assert_eq!(parse_bounds("1 2 3 4 5"), Bounds::ZERO);
      assert_eq!(parse_bounds("1 2 3 x"), Bounds::ZERO);
      assert_eq!(parse_bounds("[0,0][10,10]"), Bounds::ZERO);
    }
  }

  #[test]
  fn flags() {
    assert!(parse_flag("true"));
    assert!(parse_flag("True"));
    assert!(!parse_flag("1"));
    assert!(!parse_flag(""));
  }
}
