//! Colour operations over a selection.
//!
//! [`apply_style`] and [`reset_style`] mutate the host tree so that exactly
//! the selected characters gain (or lose) one colour channel. Styling outside
//! the selection is preserved, and wrappers left empty by the edit are
//! removed.
//!
//! Both operations decide their branch before touching the tree and run the
//! destructive part inside a transaction: if any step fails, the tree and the
//! range are restored to their state before the call.

use super::predicates::{
    SPLIT_MARKER, TOKEN_MARKER, clear_style, create_token, farthest_matching, is_blank_text,
    is_block_boundary, is_empty, is_style_token, set_style, style_of,
};
use super::walker::{WalkMode, prune_empty, walk};
use super::{EditError, StyleHost, StyleOutcome};
use crate::core::range::{Boundary, Range};
use crate::core::{Channel, ElementData, Marker, NodeId, Tree};
use std::cmp::Ordering;

/// Sets `channel` to `color` on the selected content.
///
/// On success the range covers the styled content, so a further change in
/// the same interaction targets the same token.
pub fn apply_style<H: StyleHost + ?Sized>(
    host: &mut H,
    range: &mut Range,
    channel: Channel,
    color: &str,
) -> Result<StyleOutcome, EditError> {
    if !is_editable(&*host, range) {
        tracing::debug!(%channel, "apply skipped: nothing selected");
        return Ok(StyleOutcome::Unchanged);
    }

    transactional(host, range, "apply", |host, range| {
        select_covered_token(host.tree(), range);
        match text_run_len(host.tree(), range) {
            Some(run_len) => apply_to_text_run(host, range, channel, color, run_len),
            None => apply_to_fragment(host, range, channel, color),
        }
    })
}

/// Removes `channel` from the selected content, splitting the farthest
/// enclosing token when only part of it is selected.
pub fn reset_style<H: StyleHost + ?Sized>(
    host: &mut H,
    range: &mut Range,
    channel: Channel,
) -> Result<StyleOutcome, EditError> {
    if !is_editable(&*host, range) {
        tracing::debug!(%channel, "reset skipped: nothing selected");
        return Ok(StyleOutcome::Unchanged);
    }

    let block = host.block_marker().clone();
    let tree = host.tree();
    let common = range.common_ancestor(tree);
    let farthest = farthest_matching(tree, common, &TOKEN_MARKER, &block);
    let top = farthest.unwrap_or(common);
    if !selection_carries(tree, range, top, channel, &block) {
        tracing::debug!(%channel, "reset skipped: no token over the selection carries the channel");
        return Ok(StyleOutcome::Unchanged);
    }

    match farthest {
        None => transactional(host, range, "reset", |host, range| {
            reset_outside_tokens(host.tree_mut(), range, channel)
        }),
        Some(far) if tree.text_content(far) == range.text(tree) => {
            tracing::debug!(?far, %channel, "clearing whole token");
            transactional(host, range, "reset", |host, range| {
                let tree = host.tree_mut();
                walk(tree, far, channel, WalkMode::Clear);
                clear_style(tree, far, channel);
                *range = Range::select_node_contents(tree, far);
                Ok(StyleOutcome::Cleared { token: Some(far) })
            })
        }
        Some(far) => transactional(host, range, "reset", |host, range| {
            split_token(host.tree_mut(), range, far, channel, &block)
        }),
    }
}

fn is_editable<H: StyleHost + ?Sized>(host: &H, range: &Range) -> bool {
    let tree = host.tree();
    host.is_attached(range.start.node)
        && host.is_attached(range.end.node)
        && range.is_valid(tree)
        && !range.is_collapsed()
        && !range.text(tree).is_empty()
}

fn transactional<H, F>(
    host: &mut H,
    range: &mut Range,
    op: &'static str,
    edit: F,
) -> Result<StyleOutcome, EditError>
where
    H: StyleHost + ?Sized,
    F: FnOnce(&mut H, &mut Range) -> Result<StyleOutcome, EditError>,
{
    let root = host.tree().root(range.start.node);
    let snapshot = host.tree().snapshot(root);
    let saved = *range;
    let result = edit(host, range);
    if let Err(err) = &result {
        tracing::warn!(op, %err, "colour edit failed, restoring tree");
        host.tree_mut().restore(snapshot);
        *range = saved;
    }
    result
}

/// Re-targets a range covering exactly one child at the contents of the
/// token that child is, or wraps through single-child elements.
fn select_covered_token(tree: &Tree, range: &mut Range) {
    let Range { start, end } = *range;
    if start.node != end.node || tree.is_text(start.node) || end.offset != start.offset + 1 {
        return;
    }
    let mut current = tree.child(start.node, start.offset);
    while let Some(node) = current {
        if is_style_token(tree, node) {
            tracing::debug!(token = ?node, "range covers a token, selecting its contents");
            *range = Range::select_node_contents(tree, node);
            return;
        }
        let mut children = tree
            .children(node)
            .iter()
            .copied()
            .filter(|child| !is_blank_text(tree, *child));
        current = match (children.next(), children.next()) {
            (Some(only), None) if tree.is_element(only) => Some(only),
            _ => None,
        };
    }
}

/// Number of non-blank sibling text nodes the selection runs over, or
/// `None` when the selection crosses an element boundary.
fn text_run_len(tree: &Tree, range: &Range) -> Option<usize> {
    let (start, end) = (range.start.node, range.end.node);
    if !tree.is_text(start) || !tree.is_text(end) {
        return None;
    }
    if start == end {
        return Some(1);
    }
    let parent = tree.parent(start)?;
    if tree.parent(end) != Some(parent) {
        return None;
    }
    let from = tree.index_of(start)?;
    let to = tree.index_of(end)?;
    let run = tree.children(parent).get(from..=to)?;
    run.iter()
        .all(|node| tree.is_text(*node))
        .then(|| run.iter().filter(|node| !is_blank_text(tree, **node)).count())
}

fn apply_to_text_run<H: StyleHost + ?Sized>(
    host: &mut H,
    range: &mut Range,
    channel: Channel,
    color: &str,
    run_len: usize,
) -> Result<StyleOutcome, EditError> {
    let common = range.common_ancestor(host.tree());
    if let Some(token) = host.find_nearest_ancestor(common, &TOKEN_MARKER) {
        let tree = host.tree();
        let children = tree
            .children(token)
            .iter()
            .filter(|child| !is_blank_text(tree, **child))
            .count();
        if children == run_len && tree.text_content(token) == range.text(tree) {
            tracing::debug!(?token, %channel, color, "selection matches token, restyling in place");
            set_style(host.tree_mut(), token, channel, color);
            return Ok(StyleOutcome::Restyled { token });
        }
    }

    let tree = host.tree_mut();
    let token = create_token(tree);
    set_style(tree, token, channel, color);
    range.surround_contents(tree, token)?;
    drop_empty_neighbours(tree, token, token);
    *range = Range::select_node_contents(tree, token);
    tracing::debug!(?token, %channel, color, "wrapped text selection");
    Ok(StyleOutcome::Wrapped { token })
}

fn apply_to_fragment<H: StyleHost + ?Sized>(
    host: &mut H,
    range: &mut Range,
    channel: Channel,
    color: &str,
) -> Result<StyleOutcome, EditError> {
    let surrounding = surrounding_token(&*host, range);
    let tree = host.tree_mut();
    let (token, reused) = match surrounding {
        Some(token) => (token, true),
        None => (create_token(tree), false),
    };
    set_style(tree, token, channel, color);

    let fragment = range.extract_contents(tree)?;
    walk(tree, fragment, channel, WalkMode::Set(color));
    tree.append_child(token, fragment)?;
    if !reused {
        range.insert_node(tree, token)?;
    }

    drop_empty_neighbours(tree, token, token);
    for child in tree.children(token).to_vec() {
        if is_empty(tree, child, true) {
            tree.detach(child);
        }
    }
    *range = Range::select_node_contents(tree, token);
    tracing::debug!(?token, reused, %channel, color, "moved selection into token");
    Ok(StyleOutcome::Merged { token, reused })
}

/// Nearest token whose whole text is selected by a range starting and ending
/// strictly inside it.
fn surrounding_token<H: StyleHost + ?Sized>(host: &H, range: &Range) -> Option<NodeId> {
    let tree = host.tree();
    let common = range.common_ancestor(tree);
    let token = host.find_nearest_ancestor(common, &TOKEN_MARKER)?;
    let around = Range::select_node(tree, token).ok()?;
    let inside = range.compare_start_to_start(tree, &around) == Ordering::Greater
        && range.compare_end_to_end(tree, &around) == Ordering::Less;
    (inside && around.text(tree) == range.text(tree)).then_some(token)
}

/// Whether a token between any selected text node and `top` (inclusive)
/// carries `channel`.
fn selection_carries(
    tree: &Tree,
    range: &Range,
    top: NodeId,
    channel: Channel,
    block: &Marker,
) -> bool {
    range
        .selected_text_nodes(tree)
        .into_iter()
        .any(|(node, _, _)| {
            for ancestor in tree.ancestors(node) {
                if is_block_boundary(tree, ancestor, block) {
                    break;
                }
                if is_style_token(tree, ancestor) && style_of(tree, ancestor, channel).is_some() {
                    return true;
                }
                if ancestor == top {
                    break;
                }
            }
            false
        })
}

fn reset_outside_tokens(
    tree: &mut Tree,
    range: &mut Range,
    channel: Channel,
) -> Result<StyleOutcome, EditError> {
    let fragment = range.extract_contents(tree)?;
    walk(tree, fragment, channel, WalkMode::Clear);
    let inserted = tree.children(fragment).to_vec();
    range.insert_node(tree, fragment)?;

    if let (Some(first), Some(last)) = (inserted.first().copied(), inserted.last().copied()) {
        drop_empty_neighbours(tree, first, last);
        let parent = tree
            .parent(first)
            .ok_or(EditError::StructuralInconsistency("reinserted content is detached"))?;
        let start = tree.index_of(first).ok_or(EditError::NodeNotFound)?;
        let end = tree.index_of(last).ok_or(EditError::NodeNotFound)?;
        *range = Range::new(Boundary::new(parent, start), Boundary::new(parent, end + 1));
    }
    tracing::debug!(%channel, nodes = inserted.len(), "cleared channel outside any token");
    Ok(StyleOutcome::Cleared { token: None })
}

/// Splits `far` into the part before the selection, the selected part with
/// `channel` cleared, and the part after it.
fn split_token(
    tree: &mut Tree,
    range: &mut Range,
    far: NodeId,
    channel: Channel,
    block: &Marker,
) -> Result<StyleOutcome, EditError> {
    let parent = tree
        .parent(far)
        .ok_or(EditError::StructuralInconsistency("farthest token is detached"))?;

    let selected = tree.clone_node(far, false);
    let fragment = range.extract_contents(tree)?;
    let marker = tree.create_element(
        ElementData::new(&SPLIT_MARKER.tag).with_class(SPLIT_MARKER.class.to_string()),
    );
    range.insert_node(tree, marker)?;

    // Elements between the split point and the token wrap the selected part
    // again so it keeps their structure.
    let mut container = fragment;
    let mut current = tree.parent(marker);
    loop {
        match current {
            Some(node) if node == far => break,
            Some(node) if !is_block_boundary(tree, node, block) => {
                let clone = tree.clone_node(node, false);
                tree.append_child(clone, container)?;
                container = clone;
                current = tree.parent(node);
            }
            _ => {
                return Err(EditError::StructuralInconsistency(
                    "split point is outside the farthest token",
                ));
            }
        }
    }
    tree.append_child(selected, container)?;
    clear_style(tree, selected, channel);
    walk(tree, selected, channel, WalkMode::Clear);

    let marker_parent = tree
        .parent(marker)
        .ok_or(EditError::StructuralInconsistency("split marker is detached"))?;
    let marker_index = tree.index_of(marker).ok_or(EditError::NodeNotFound)?;
    let mut prefix = Range::new(
        Boundary::new(far, 0),
        Boundary::new(marker_parent, marker_index),
    );
    let prefix_content = prefix.extract_contents(tree)?;
    let before = tree.clone_node(far, false);
    tree.append_child(before, prefix_content)?;
    prune_empty(tree, before);
    let before = if is_empty(tree, before, true) {
        None
    } else {
        tree.insert_before(parent, before, Some(far))?;
        Some(before)
    };
    tree.insert_before(parent, selected, Some(far))?;

    let mut from = Some(marker);
    while let Some(node) = from {
        let next = tree.parent(node);
        if is_empty(tree, node, true) {
            tree.detach(node);
        }
        if node == far {
            break;
        }
        from = next;
    }
    if tree.parent(marker).is_some() {
        return Err(EditError::StructuralInconsistency("split marker was not removed"));
    }

    let after = if tree.parent(far) == Some(parent) {
        prune_empty(tree, far);
        Some(far)
    } else {
        None
    };
    *range = Range::select_node_contents(tree, selected);
    tracing::debug!(?far, ?before, ?selected, ?after, %channel, "split token around selection");
    Ok(StyleOutcome::Split {
        before,
        selected,
        after,
    })
}

/// Removes empty siblings directly before `first` and after `last`; the
/// first non-empty neighbour on each side is pruned of empty descendants.
fn drop_empty_neighbours(tree: &mut Tree, first: NodeId, last: NodeId) {
    while let Some(prev) = tree.previous_sibling(first) {
        if !is_empty(tree, prev, true) {
            prune_empty(tree, prev);
            break;
        }
        tree.detach(prev);
    }
    while let Some(next) = tree.next_sibling(last) {
        if !is_empty(tree, next, true) {
            prune_empty(tree, next);
            break;
        }
        tree.detach(next);
    }
}
