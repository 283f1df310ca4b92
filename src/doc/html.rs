//! Inline HTML reader and writer for the in-memory host.
//!
//! Only what inline content needs is understood: elements with attributes,
//! text, the void `br` element and the four basic entities. `class` and
//! `style` attributes are lifted into [`ElementData`]; other attributes are
//! kept verbatim.

use crate::core::{ElementData, InlineStyle, NodeData, NodeId, RangeError, Tree};

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "wbr"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed tag at byte {0}")]
    MalformedTag(usize),
    #[error("unexpected closing tag </{found}> at byte {offset}")]
    UnexpectedClose { found: String, offset: usize },
    #[error("unclosed element <{0}>")]
    Unclosed(String),
    #[error("tree error: {0}")]
    Tree(#[from] RangeError),
}

/// Parses `html` and appends the resulting nodes to `parent`.
pub fn parse_into(tree: &mut Tree, parent: NodeId, html: &str) -> Result<(), ParseError> {
    let mut stack = vec![parent];
    let mut pos = 0;
    let bytes = html.as_bytes();

    while pos < html.len() {
        let current = stack.last().copied().unwrap_or(parent);
        if html[pos..].starts_with("</") {
            let close = html[pos..]
                .find('>')
                .ok_or(ParseError::MalformedTag(pos))?;
            let name = html[pos + 2..pos + close].trim().to_ascii_lowercase();
            let open_matches = stack.len() > 1
                && tree
                    .element(current)
                    .is_some_and(|element| element.is_tag(&name));
            if !open_matches {
                return Err(ParseError::UnexpectedClose {
                    found: name,
                    offset: pos,
                });
            }
            stack.pop();
            pos += close + 1;
        } else if bytes[pos] == b'<' {
            let (element, self_closing, consumed) = parse_open_tag(&html[pos..], pos)?;
            let is_void = self_closing || VOID_ELEMENTS.contains(&element.tag.as_str());
            let node = tree.create_element(element);
            tree.append_child(current, node)?;
            if !is_void {
                stack.push(node);
            }
            pos += consumed;
        } else {
            let end = html[pos..].find('<').map_or(html.len(), |i| pos + i);
            let text = tree.create_text(decode_entities(&html[pos..end]));
            tree.append_child(current, text)?;
            pos = end;
        }
    }

    if stack.len() > 1 {
        let tag = stack
            .last()
            .and_then(|node| tree.element(*node))
            .map(|element| element.tag.clone())
            .unwrap_or_default();
        return Err(ParseError::Unclosed(tag));
    }
    Ok(())
}

fn parse_open_tag(input: &str, offset: usize) -> Result<(ElementData, bool, usize), ParseError> {
    let malformed = || ParseError::MalformedTag(offset);
    let mut chars = input.char_indices().skip(1).peekable();

    let mut name = String::new();
    while let Some((_, c)) = chars.peek().copied() {
        if c.is_ascii_alphanumeric() || c == '-' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if name.is_empty() {
        return Err(malformed());
    }
    let mut element = ElementData::new(&name);

    loop {
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        let Some((index, c)) = chars.next() else {
            return Err(malformed());
        };
        match c {
            '>' => return Ok((element, false, index + 1)),
            '/' => {
                return match chars.next() {
                    Some((index, '>')) => Ok((element, true, index + 1)),
                    _ => Err(malformed()),
                };
            }
            _ => {
                let mut attr = String::from(c);
                while let Some((_, c)) =
                    chars.next_if(|(_, c)| !c.is_whitespace() && !matches!(*c, '=' | '>' | '/'))
                {
                    attr.push(c);
                }
                while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
                let mut value = String::new();
                if chars.next_if(|(_, c)| *c == '=').is_some() {
                    while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
                    match chars.peek().copied() {
                        Some((_, quote @ ('"' | '\''))) => {
                            chars.next();
                            loop {
                                match chars.next() {
                                    Some((_, c)) if c == quote => break,
                                    Some((_, c)) => value.push(c),
                                    None => return Err(malformed()),
                                }
                            }
                        }
                        _ => {
                            while let Some((_, c)) =
                                chars.next_if(|(_, c)| !c.is_whitespace() && *c != '>')
                            {
                                value.push(c);
                            }
                        }
                    }
                }
                set_attribute(&mut element, &attr.to_ascii_lowercase(), &decode_entities(&value));
            }
        }
    }
}

fn set_attribute(element: &mut ElementData, name: &str, value: &str) {
    match name {
        "class" => {
            for class in value.split_whitespace() {
                element.add_class(class);
            }
        }
        "style" => element.style = InlineStyle::parse_css(value),
        _ => {
            element
                .attributes
                .insert(name.to_string(), value.to_string());
        }
    }
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Serializes the children of `node` (the node's inner HTML).
pub fn serialize_children(tree: &Tree, node: NodeId) -> String {
    let mut out = String::new();
    for child in tree.children(node) {
        serialize_node(tree, *child, &mut out);
    }
    out
}

pub fn serialize_node(tree: &Tree, node: NodeId, out: &mut String) {
    match tree.data(node) {
        NodeData::Text(text) => escape_text(text, out),
        NodeData::Fragment => {
            for child in tree.children(node) {
                serialize_node(tree, *child, out);
            }
        }
        NodeData::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            if !element.classes.is_empty() {
                out.push_str(" class=\"");
                escape_attribute(&element.classes.join(" "), out);
                out.push('"');
            }
            if !element.style.is_empty() {
                out.push_str(" style=\"");
                escape_attribute(&element.style.to_css(), out);
                out.push('"');
            }
            for (name, value) in &element.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attribute(value, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                return;
            }
            for child in tree.children(node) {
                serialize_node(tree, *child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(html: &str) -> String {
        let mut tree = Tree::new();
        let root = tree.create_fragment();
        parse_into(&mut tree, root, html).unwrap();
        serialize_children(&tree, root)
    }

    #[test]
    fn test_round_trip_keeps_tokens_and_breaks() {
        let html = "a<span class=\"ce-inline-tool--color__token\" style=\"color: red;\">b<br>c</span>";
        assert_eq!(round_trip(html), html);
    }

    #[test]
    fn test_entities_and_unquoted_attributes() {
        assert_eq!(
            round_trip("<b id=x title='a &quot;q&quot;'>1 &lt; 2 &amp;&amp; 3</b>"),
            "<b id=\"x\" title=\"a &quot;q&quot;\">1 &lt; 2 &amp;&amp; 3</b>"
        );
    }

    #[test]
    fn test_mismatched_close_is_rejected() {
        let mut tree = Tree::new();
        let root = tree.create_fragment();
        assert_eq!(
            parse_into(&mut tree, root, "<b>x</i>"),
            Err(ParseError::UnexpectedClose {
                found: "i".to_string(),
                offset: 4,
            })
        );
        let root = tree.create_fragment();
        assert_eq!(
            parse_into(&mut tree, root, "<b>x"),
            Err(ParseError::Unclosed("b".to_string()))
        );
    }
}
