use inline_palette::core::range::{Boundary, Range, compare_points};
use inline_palette::core::{ElementData, NodeId, Tree};
use inline_palette::doc::html::{parse_into, serialize_children};
use std::cmp::Ordering;

fn parse(html: &str) -> (Tree, NodeId) {
    let mut tree = Tree::new();
    let root = tree.create_element(ElementData::new("p"));
    parse_into(&mut tree, root, html).unwrap();
    (tree, root)
}

fn text_node(tree: &Tree, root: NodeId, text: &str) -> NodeId {
    tree.text_nodes(root)
        .into_iter()
        .find(|node| tree.text(*node) == Some(text))
        .unwrap()
}

#[test]
fn test_extract_nested_partial_elements() {
    let (mut tree, p) = parse("ab<i>cd<b>ef</b></i>gh");
    let ab = text_node(&tree, p, "ab");
    let ef = text_node(&tree, p, "ef");
    let mut range = Range::new(Boundary::new(ab, 1), Boundary::new(ef, 1));

    let fragment = range.extract_contents(&mut tree).unwrap();

    assert_eq!(serialize_children(&tree, fragment), "b<i>cd<b>e</b></i>");
    assert_eq!(serialize_children(&tree, p), "a<i><b>f</b></i>gh");
    assert_eq!(range, Range::collapsed(Boundary::new(p, 1)));
}

#[test]
fn test_surround_text_run() {
    let mut tree = Tree::new();
    let p = tree.create_element(ElementData::new("p"));
    let ab = tree.create_text("ab");
    let cd = tree.create_text("cd");
    tree.append_child(p, ab).unwrap();
    tree.append_child(p, cd).unwrap();
    let span = tree.create_element(ElementData::new("span"));
    let mut range = Range::new(Boundary::new(ab, 1), Boundary::new(cd, 1));

    range.surround_contents(&mut tree, span).unwrap();

    assert_eq!(serialize_children(&tree, p), "a<span>bc</span>d");
    assert_eq!(
        range,
        Range::new(Boundary::new(p, 1), Boundary::new(p, 2))
    );
    assert_eq!(range.text(&tree), "bc");
}

#[test]
fn test_insert_fragment_grows_collapsed_range() {
    let (mut tree, p) = parse("abcd");
    let text = text_node(&tree, p, "abcd");
    let fragment = tree.create_fragment();
    parse_into(&mut tree, fragment, "<i>x</i>y").unwrap();
    let mut range = Range::collapsed(Boundary::new(text, 2));

    range.insert_node(&mut tree, fragment).unwrap();

    assert_eq!(serialize_children(&tree, p), "ab<i>x</i>ycd");
    assert_eq!(range.start, Boundary::new(text, 2));
    assert_eq!(range.end, Boundary::new(p, 3));
    assert!(!tree.has_child_nodes(fragment));
}

#[test]
fn test_selected_text_nodes_spans() {
    let (tree, p) = parse("a<b>bc</b>d");
    let a = text_node(&tree, p, "a");
    let bc = text_node(&tree, p, "bc");
    let range = Range::new(Boundary::new(a, 0), Boundary::new(bc, 1));

    assert_eq!(range.selected_text_nodes(&tree), vec![(a, 0, 1), (bc, 0, 1)]);
    assert_eq!(range.text(&tree), "ab");
    assert_eq!(range.common_ancestor(&tree), p);
}

#[test]
fn test_boundary_ordering_across_levels() {
    let (tree, p) = parse("a<b>bc</b>d");
    let bc = text_node(&tree, p, "bc");
    let d = text_node(&tree, p, "d");
    let bold = tree.parent(bc).unwrap();

    assert_eq!(
        compare_points(&tree, Boundary::new(p, 1), Boundary::new(bc, 0)),
        Ordering::Less
    );
    assert_eq!(
        compare_points(&tree, Boundary::new(bold, 1), Boundary::new(d, 0)),
        Ordering::Less
    );

    let outer = Range::select_node(&tree, bold).unwrap();
    let inner = Range::select_node_contents(&tree, bold);
    assert_eq!(inner.compare_start_to_start(&tree, &outer), Ordering::Greater);
    assert_eq!(inner.compare_end_to_end(&tree, &outer), Ordering::Less);
}

#[test]
fn test_grapheme_offsets_keep_clusters_whole() {
    let (tree, p) = parse("e\u{301}x");
    let text = tree.first_child(p).unwrap();

    let range = Range::from_grapheme_offsets(&tree, p, 0, 1).unwrap();
    assert_eq!(range.start, Boundary::new(text, 0));
    assert_eq!(range.end, Boundary::new(text, 3));
    assert_eq!(range.text(&tree), "e\u{301}");

    let collapsed = Range::from_grapheme_offsets(&tree, p, 1, 1).unwrap();
    assert!(collapsed.is_collapsed());
    assert!(collapsed.is_valid(&tree));
}

#[test]
fn test_range_validity() {
    let (mut tree, p) = parse("abc");
    let text = tree.first_child(p).unwrap();
    let detached = tree.create_text("zz");

    assert!(Range::new(Boundary::new(text, 0), Boundary::new(text, 3)).is_valid(&tree));
    assert!(!Range::new(Boundary::new(text, 2), Boundary::new(text, 1)).is_valid(&tree));
    assert!(!Range::new(Boundary::new(text, 0), Boundary::new(text, 4)).is_valid(&tree));
    assert!(!Range::new(Boundary::new(text, 0), Boundary::new(detached, 1)).is_valid(&tree));
}
