use inline_palette::{
    Channel, ColorChoice, ColorSource, ColorTool, Document, StyleHost, StyleOutcome, ToolConfig,
};

fn tok(style: &str, inner: &str) -> String {
    if style.is_empty() {
        format!("<span class=\"ce-inline-tool--color__token\">{inner}</span>")
    } else {
        format!("<span class=\"ce-inline-tool--color__token\" style=\"{style}\">{inner}</span>")
    }
}

#[test]
fn test_render_actions_default_palette() {
    let mut tool = ColorTool::default();
    let panel = tool.render_actions();

    assert!(panel.hidden);
    assert_eq!(panel.sections.len(), 2);

    let text = panel.section(Channel::Text).unwrap();
    assert_eq!(text.label, "front color");
    assert_eq!(text.items.len(), 12);
    assert_eq!(text.items[0].choice, ColorChoice::Clear);
    assert_eq!(text.items[0].label.as_deref(), Some("clear"));
    assert_eq!(text.items[1].choice, ColorChoice::Color("#8c8c8c".to_string()));
    assert_eq!(text.items[1].label.as_deref(), Some("A"));

    let background = panel.section(Channel::Background).unwrap();
    assert_eq!(background.label, "background color");
    assert_eq!(background.items[1].label, None);
    assert!(background.items.iter().all(|item| !item.active));
}

#[test]
fn test_disabled_channel_has_no_section() {
    let config = ToolConfig {
        background_colors: ColorSource::Disabled,
        default_item_label: Some("reset".to_string()),
        ..ToolConfig::default()
    };
    let mut tool = ColorTool::new(&config);
    let panel = tool.render_actions();

    assert_eq!(panel.sections.len(), 1);
    assert!(panel.section(Channel::Background).is_none());
    assert_eq!(panel.sections[0].items[0].label.as_deref(), Some("reset"));
}

#[test]
fn test_surround_toggles_panel() {
    let doc = Document::from_html("abc").unwrap();
    let mut tool = ColorTool::default();
    tool.render_actions();
    assert!(!tool.shows_actions());

    tool.surround(doc.range(0, 2).unwrap());
    assert!(tool.shows_actions());
    assert!(!tool.panel().unwrap().hidden);
    assert!(tool.pending().range.is_some());

    tool.toggle_actions(Some(false));
    assert!(tool.panel().unwrap().hidden);
    tool.toggle_actions(None);
    assert!(tool.shows_actions());
}

#[test]
fn test_one_interaction_styles_a_single_token() {
    let mut doc = Document::from_html("abcdef").unwrap();
    let mut tool = ColorTool::default();
    tool.surround(doc.range(1, 4).unwrap());

    let outcome = tool.handle_color_change(&mut doc, Channel::Text, 3);
    let StyleOutcome::Wrapped { token } = outcome else {
        panic!("expected a new token, got {outcome:?}");
    };
    assert_eq!(tool.pending().token, Some(token));
    assert_eq!(
        doc.to_html(),
        format!("a{}ef", tok("color: #a3431f;", "bcd"))
    );
    let text = tool.panel().unwrap().section(Channel::Text).unwrap();
    let active: Vec<usize> = text
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.active)
        .map(|(index, _)| index)
        .collect();
    assert_eq!(active, vec![3]);

    let outcome = tool.handle_color_change(&mut doc, Channel::Background, 5);
    assert_eq!(outcome, StyleOutcome::Restyled { token });
    assert_eq!(
        doc.to_html(),
        format!(
            "a{}ef",
            tok("color: #a3431f; background-color: #fcf4cc;", "bcd")
        )
    );

    let outcome = tool.handle_color_change(&mut doc, Channel::Text, 0);
    assert_eq!(outcome, StyleOutcome::Cleared { token: Some(token) });
    assert_eq!(
        doc.to_html(),
        format!("a{}ef", tok("background-color: #fcf4cc;", "bcd"))
    );
}

#[test]
fn test_clear_forgets_the_interaction() {
    let mut doc = Document::from_html("abcdef").unwrap();
    let mut tool = ColorTool::default();
    tool.surround(doc.range(0, 3).unwrap());
    tool.handle_range_styling(&mut doc, &ColorChoice::Color("red".to_string()), Channel::Text);
    assert!(tool.pending().token.is_some());

    tool.clear();
    assert_eq!(tool.pending().range, None);
    assert_eq!(tool.pending().token, None);
    assert!(tool.panel().is_none());

    let before = doc.to_html();
    let outcome =
        tool.handle_range_styling(&mut doc, &ColorChoice::Color("blue".to_string()), Channel::Text);
    assert_eq!(outcome, StyleOutcome::Unchanged);
    assert_eq!(doc.to_html(), before);
}

#[test]
fn test_detached_pending_token_falls_back_to_apply() {
    let mut doc = Document::from_html("abcdef").unwrap();
    let mut tool = ColorTool::default();
    tool.surround(doc.range(2, 4).unwrap());
    let outcome =
        tool.handle_range_styling(&mut doc, &ColorChoice::Color("red".to_string()), Channel::Text);
    let token = outcome.created_token().unwrap();

    doc.tree_mut().detach(token);
    tool.surround(doc.range(0, 2).unwrap());
    let outcome =
        tool.handle_range_styling(&mut doc, &ColorChoice::Color("blue".to_string()), Channel::Text);

    assert!(matches!(outcome, StyleOutcome::Wrapped { .. }));
    assert_eq!(doc.to_html(), format!("{}ef", tok("color: blue;", "ab")));
}

#[test]
fn test_out_of_range_item_is_ignored() {
    let mut doc = Document::from_html("abc").unwrap();
    let mut tool = ColorTool::default();
    tool.surround(doc.range(0, 3).unwrap());

    assert_eq!(
        tool.handle_color_change(&mut doc, Channel::Text, 99),
        StyleOutcome::Unchanged
    );
    assert_eq!(doc.to_html(), "abc");
}

#[test]
fn test_tool_metadata() {
    let tool = ColorTool::default();

    assert!(ColorTool::is_inline());
    assert!(tool.check_state(true));
    assert!(!tool.check_state(false));
    assert_eq!(tool.title(), "pallette");
    assert_eq!(tool.shortcut(), "Ctrl+J");
    assert_eq!(
        ColorTool::sanitize_rules().into_iter().collect::<Vec<_>>(),
        vec![("span".to_string(), true)]
    );
}

#[test]
fn test_new_selection_does_not_restyle_previous_token() {
    let mut doc = Document::from_html("abcdef").unwrap();
    let mut tool = ColorTool::default();
    tool.surround(doc.range(0, 2).unwrap());
    tool.handle_range_styling(&mut doc, &ColorChoice::Color("red".to_string()), Channel::Text);

    tool.surround(doc.range(4, 6).unwrap());
    assert_eq!(tool.pending().token, None);
    let outcome = tool.handle_range_styling(
        &mut doc,
        &ColorChoice::Color("blue".to_string()),
        Channel::Background,
    );

    assert!(matches!(outcome, StyleOutcome::Wrapped { .. }));
    assert_eq!(
        doc.to_html(),
        format!(
            "{}cd{}",
            tok("color: red;", "ab"),
            tok("background-color: blue;", "ef")
        )
    );
}

#[test]
fn test_closing_panel_ends_interaction() {
    let mut doc = Document::from_html("abcdef").unwrap();
    let mut tool = ColorTool::default();
    tool.surround(doc.range(0, 2).unwrap());
    tool.handle_color_change(&mut doc, Channel::Text, 1);
    assert!(tool.pending().token.is_some());

    tool.toggle_actions(Some(false));

    assert_eq!(tool.pending().range, None);
    assert_eq!(tool.pending().token, None);
    let before = doc.to_html();
    assert_eq!(
        tool.handle_color_change(&mut doc, Channel::Background, 1),
        StyleOutcome::Unchanged
    );
    assert_eq!(doc.to_html(), before);
}
