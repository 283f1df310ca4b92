//! Property-based tests for the colour operations.
//!
//! Random apply/reset sequences run against both the tree and the naive
//! per-character oracle, which must always agree on the colours shown.

use inline_palette::{Channel, Document, StyleHost};
use inline_palette_naive_oracle::{StyledText, effective_styles};
use proptest::collection::vec;
use proptest::prelude::*;
mod proptest_config;

#[derive(Clone, Debug)]
enum Op {
    Apply {
        channel: Channel,
        color: &'static str,
        a: usize,
        b: usize,
    },
    Reset {
        channel: Channel,
        a: usize,
        b: usize,
    },
}

fn channel_strategy() -> impl Strategy<Value = Channel> {
    prop_oneof![Just(Channel::Text), Just(Channel::Background)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (
            channel_strategy(),
            prop::sample::select(vec!["red", "green", "blue"]),
            0usize..16,
            0usize..16,
        )
            .prop_map(|(channel, color, a, b)| Op::Apply {
                channel,
                color,
                a,
                b,
            }),
        2 => (channel_strategy(), 0usize..16, 0usize..16)
            .prop_map(|(channel, a, b)| Op::Reset { channel, a, b }),
    ]
}

/// Maps two raw positions onto an ordered grapheme span of `len`.
fn span(a: usize, b: usize, len: usize) -> (usize, usize) {
    let (a, b) = (a % (len + 1), b % (len + 1));
    (a.min(b), a.max(b))
}

fn run_op(doc: &mut Document, oracle: &mut StyledText, op: &Op) {
    match *op {
        Op::Apply {
            channel,
            color,
            a,
            b,
        } => {
            let (start, end) = span(a, b, oracle.len());
            let mut range = doc.range(start, end).unwrap();
            doc.apply_style(&mut range, channel, color).unwrap();
            oracle.apply(start, end, channel, color);
        }
        Op::Reset { channel, a, b } => {
            let (start, end) = span(a, b, oracle.len());
            let mut range = doc.range(start, end).unwrap();
            doc.reset_style(&mut range, channel).unwrap();
            oracle.reset(start, end, channel);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_config::cases()))]

    /// Property: every grapheme shows the colours the oracle predicts
    #[test]
    fn prop_matches_naive_oracle(text in "[a-z]{1,12}", ops in vec(op_strategy(), 0..12)) {
        let mut doc = Document::from_html(&text).unwrap();
        let mut oracle = StyledText::from_plain(&text);

        for op in &ops {
            run_op(&mut doc, &mut oracle, op);
            prop_assert_eq!(doc.text(), text.clone());
            prop_assert_eq!(effective_styles(&doc), oracle.styles(), "after {:?}: {}", op, doc.to_html());
        }
    }

    /// Property: no element or text node without content survives any sequence
    #[test]
    fn prop_no_empty_elements(text in "[a-z]{1,12}", ops in vec(op_strategy(), 0..12)) {
        let mut doc = Document::from_html(&text).unwrap();
        let mut oracle = StyledText::from_plain(&text);

        for op in &ops {
            run_op(&mut doc, &mut oracle, op);
            prop_assert!(doc.empty_elements().is_empty(), "after {:?}: {}", op, doc.to_html());
            let tree = doc.tree();
            prop_assert!(
                tree.text_nodes(doc.block()).into_iter().all(|node| tree.text(node) != Some("")),
                "blank text after {:?}: {}",
                op,
                doc.to_html()
            );
        }
    }

    /// Property: applying the same colour over the same span twice is a no-op
    #[test]
    fn prop_apply_is_idempotent(
        text in "[a-z]{1,12}",
        ops in vec(op_strategy(), 0..8),
        channel in channel_strategy(),
        a in 0usize..16,
        b in 0usize..16,
    ) {
        let mut doc = Document::from_html(&text).unwrap();
        let mut oracle = StyledText::from_plain(&text);
        for op in &ops {
            run_op(&mut doc, &mut oracle, op);
        }

        let (start, end) = span(a, b, oracle.len());
        let mut range = doc.range(start, end).unwrap();
        doc.apply_style(&mut range, channel, "#038766").unwrap();
        let once = doc.to_html();

        let mut range = doc.range(start, end).unwrap();
        doc.apply_style(&mut range, channel, "#038766").unwrap();
        prop_assert_eq!(doc.to_html(), once);
    }

    /// Property: a channel change never disturbs the other channel
    #[test]
    fn prop_channels_are_independent(
        text in "[a-z]{1,12}",
        ops in vec(op_strategy(), 0..8),
        a in 0usize..16,
        b in 0usize..16,
        clear in any::<bool>(),
    ) {
        let mut doc = Document::from_html(&text).unwrap();
        let mut oracle = StyledText::from_plain(&text);
        for op in &ops {
            run_op(&mut doc, &mut oracle, op);
        }
        let backgrounds = |doc: &Document| -> Vec<Option<String>> {
            effective_styles(doc)
                .into_iter()
                .map(|style| style.background_color)
                .collect()
        };
        let before = backgrounds(&doc);

        let (start, end) = span(a, b, oracle.len());
        let mut range = doc.range(start, end).unwrap();
        if clear {
            doc.reset_style(&mut range, Channel::Text).unwrap();
        } else {
            doc.apply_style(&mut range, Channel::Text, "#a3431f").unwrap();
        }

        prop_assert_eq!(backgrounds(&doc), before);
    }
}
