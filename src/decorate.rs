//! Turns entity ranges into styled terminal text.
//!
//! A [`Decorator`] pairs a strategy (which ranges of a block to decorate)
//! with an [`EntityComponent`] (how to wrap the text of one range). The
//! [`CompositeDecorator`] runs several of them over a block; a range is only
//! decorated if no earlier decorator already claimed any of its characters.

use std::collections::HashMap;

use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

use crate::document::{Block, BlockKey, Document, EntityKey, Selection};
use crate::entities::{COLOR, LINK, TextRange, entity_strategy, selected_slices};
use crate::theme::Theme;

/// Reports decorable `(start, end)` ranges of a block.
pub type Strategy = Box<dyn Fn(&Block, &mut dyn FnMut(usize, usize), &Document)>;

/// Wraps the rendered text of one entity range.
pub trait EntityComponent {
    fn wrap(
        &self,
        document: &Document,
        entity_key: EntityKey,
        children: Vec<Span<'static>>,
        theme: &Theme,
    ) -> Vec<Span<'static>>;
}

/// Strategy for `LINK` entities.
pub fn link_strategy() -> impl Fn(&Block, &mut dyn FnMut(usize, usize), &Document) {
    entity_strategy(LINK)
}

/// Strategy for `COLOR` entities.
pub fn color_strategy() -> impl Fn(&Block, &mut dyn FnMut(usize, usize), &Document) {
    entity_strategy(COLOR)
}

/// Hyperlink: styled text, a new-window marker for `target="_blank"` and an
/// optional `<url>` hint.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinkComponent;

impl EntityComponent for LinkComponent {
    fn wrap(
        &self,
        document: &Document,
        entity_key: EntityKey,
        children: Vec<Span<'static>>,
        theme: &Theme,
    ) -> Vec<Span<'static>> {
        let Some(entity) = document.entity(entity_key) else {
            return children;
        };
        let url = entity.get_str("url").unwrap_or_default();
        let target = entity.get_str("target").unwrap_or_default();

        let mut spans: Vec<Span<'static>> = children
            .into_iter()
            .map(|span| span.patch_style(theme.link_style()))
            .collect();
        if target == "_blank" {
            spans.push(Span::styled(theme.new_window_marker, theme.link_style()));
        }
        if theme.show_link_hints && !url.is_empty() {
            spans.push(Span::styled(format!(" <{url}>"), theme.link_hint_style()));
        }
        spans
    }
}

/// Colored span; `color` accepts color names, indexed colors and `#rrggbb`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColorComponent;

impl EntityComponent for ColorComponent {
    fn wrap(
        &self,
        document: &Document,
        entity_key: EntityKey,
        children: Vec<Span<'static>>,
        theme: &Theme,
    ) -> Vec<Span<'static>> {
        let Some(entity) = document.entity(entity_key) else {
            return children;
        };
        let color = entity
            .get_str("color")
            .and_then(|value| value.parse::<Color>().ok())
            .unwrap_or(theme.fallback_color);
        children
            .into_iter()
            .map(|span| span.patch_style(Style::default().fg(color)))
            .collect()
    }
}

pub struct Decorator {
    strategy: Strategy,
    component: Box<dyn EntityComponent>,
}

impl Decorator {
    pub fn new<S, C>(strategy: S, component: C) -> Self
    where
        S: Fn(&Block, &mut dyn FnMut(usize, usize), &Document) + 'static,
        C: EntityComponent + 'static,
    {
        Self {
            strategy: Box::new(strategy),
            component: Box::new(component),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecorationId {
    pub decorator: usize,
    pub occurrence: usize,
}

#[derive(Default)]
pub struct CompositeDecorator {
    decorators: Vec<Decorator>,
}

impl CompositeDecorator {
    pub fn new(decorators: Vec<Decorator>) -> Self {
        Self { decorators }
    }

    /// Links first, then colors.
    pub fn entities() -> Self {
        Self::new(vec![
            Decorator::new(link_strategy(), LinkComponent),
            Decorator::new(color_strategy(), ColorComponent),
        ])
    }

    /// Which decoration, if any, owns each character of `block`.
    pub fn decorations(&self, block: &Block, document: &Document) -> Vec<Option<DecorationId>> {
        let mut owners: Vec<Option<DecorationId>> = vec![None; block.len()];
        for (decorator, entry) in self.decorators.iter().enumerate() {
            let mut occurrence = 0;
            (entry.strategy)(
                block,
                &mut |start, end| {
                    let end = end.min(owners.len());
                    if start >= end || owners[start..end].iter().any(Option::is_some) {
                        return;
                    }
                    let id = DecorationId {
                        decorator,
                        occurrence,
                    };
                    owners[start..end].fill(Some(id));
                    occurrence += 1;
                },
                document,
            );
        }
        owners
    }

    /// Renders one block, highlighting `selected` if given.
    pub fn render_block(
        &self,
        block: &Block,
        document: &Document,
        theme: &Theme,
        selected: Option<TextRange>,
    ) -> Line<'static> {
        let owners = self.decorations(block, document);
        let mut spans = Vec::new();
        let mut idx = 0;
        while idx < owners.len() {
            let owner = owners[idx];
            let start = idx;
            while idx < owners.len() && owners[idx] == owner {
                idx += 1;
            }
            let children = styled_runs(block, start, idx, selected, theme);
            let wrapped = owner.and_then(|id| {
                let key = block.entity_at(start)?;
                let decorator = self.decorators.get(id.decorator)?;
                Some(decorator.component.wrap(document, key, children.clone(), theme))
            });
            spans.extend(wrapped.unwrap_or(children));
        }
        Line::from(spans)
    }

    /// Renders every block of `document`, one line per block.
    pub fn render_document(
        &self,
        document: &Document,
        theme: &Theme,
        selection: Option<&Selection>,
    ) -> Vec<Line<'static>> {
        let selected: HashMap<BlockKey, TextRange> = selection
            .map(|selection| {
                selected_slices(document, selection)
                    .into_iter()
                    .map(|(block, range)| (block.key().clone(), range))
                    .collect()
            })
            .unwrap_or_default();
        document
            .blocks()
            .map(|block| {
                let range = selected.get(block.key()).copied();
                self.render_block(block, document, theme, range)
            })
            .collect()
    }
}

/// Splits `[start, end)` into spans at the selection boundaries.
fn styled_runs(
    block: &Block,
    start: usize,
    end: usize,
    selected: Option<TextRange>,
    theme: &Theme,
) -> Vec<Span<'static>> {
    let characters = block.characters();
    let is_selected = |offset: usize| selected.is_some_and(|range| range.contains(offset));
    let mut runs = Vec::new();
    let mut idx = start;
    while idx < end {
        let run_start = idx;
        let selected_run = is_selected(idx);
        while idx < end && is_selected(idx) == selected_run {
            idx += 1;
        }
        let text: String = characters[run_start..idx].iter().map(|c| c.ch).collect();
        let style = if selected_run {
            theme.text_style().patch(theme.selection_style())
        } else {
            theme.text_style()
        };
        runs.push(Span::styled(text, style));
    }
    runs
}

#[cfg(test)]
mod tests {
    use ratatui::style::Modifier;
    use serde_json::json;

    use super::*;
    use crate::builder::DocumentBuilder;
    use crate::document::EntityData;
    use crate::entities::EntityDescriptor;

    const TEXT: &str = "text with entity here";

    fn data(value: serde_json::Value) -> EntityData {
        value.as_object().cloned().unwrap_or_default()
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn link_ranges_are_styled_and_hinted() {
        let state = DocumentBuilder::new()
            .add_block(TEXT)
            .add_entity_with_data(
                &EntityDescriptor::link(),
                data(json!({"url": "hello-world.com", "target": "_blank"})),
                17,
                21,
            )
            .build();
        let theme = Theme::default();
        let line = CompositeDecorator::entities().render_block(
            state.content().first_block().unwrap(),
            state.content(),
            &theme,
            None,
        );

        assert_eq!(line_text(&line), "text with entity here↗ <hello-world.com>");
        let link_span = line
            .spans
            .iter()
            .find(|span| span.content == "here")
            .unwrap();
        assert_eq!(link_span.style.fg, Some(theme.link_color));
        assert!(link_span.style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn plain_theme_omits_link_hints() {
        let state = DocumentBuilder::new()
            .add_block(TEXT)
            .add_entity_with_data(
                &EntityDescriptor::link(),
                data(json!({"url": "hello-world.com"})),
                17,
                21,
            )
            .build();
        let line = CompositeDecorator::entities().render_block(
            state.content().first_block().unwrap(),
            state.content(),
            &Theme::plain(),
            None,
        );
        assert_eq!(line_text(&line), TEXT);
    }

    #[test]
    fn color_entities_set_foreground() {
        let state = DocumentBuilder::new()
            .add_block(TEXT)
            .add_entity_with_data(
                &EntityDescriptor::color(),
                data(json!({"color": "#ff0000"})),
                0,
                4,
            )
            .build();
        let line = CompositeDecorator::entities().render_block(
            state.content().first_block().unwrap(),
            state.content(),
            &Theme::default(),
            None,
        );
        assert_eq!(line.spans[0].content, "text");
        assert_eq!(line.spans[0].style.fg, Some(Color::Rgb(255, 0, 0)));
        assert_eq!(line.spans[1].style.fg, Some(Color::Reset));
    }

    #[test]
    fn earlier_decorators_win_overlapping_ranges() {
        let state = DocumentBuilder::new()
            .add_block(TEXT)
            .add_entity(&EntityDescriptor::link(), 5, 9)
            .build();
        let block = state.content().first_block().unwrap();
        let decorator = CompositeDecorator::new(vec![
            Decorator::new(link_strategy(), LinkComponent),
            Decorator::new(entity_strategy(LINK), ColorComponent),
        ]);
        let owners = decorator.decorations(block, state.content());
        assert!(owners[5..9].iter().all(|owner| {
            *owner
                == Some(DecorationId {
                    decorator: 0,
                    occurrence: 0,
                })
        }));
        assert!(owners[..5].iter().all(Option::is_none));
    }

    #[test]
    fn selection_is_highlighted_per_block() {
        let state = DocumentBuilder::new()
            .add_block("abc")
            .anchor(1)
            .add_block("def")
            .focus(1)
            .build();
        let theme = Theme::default();
        let lines = CompositeDecorator::entities().render_document(
            state.content(),
            &theme,
            Some(state.selection()),
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[1].content, "bc");
        assert_eq!(lines[0].spans[1].style.bg, Some(theme.selection_bg));
        assert_eq!(lines[1].spans[0].content, "d");
        assert_eq!(lines[1].spans[0].style.bg, Some(theme.selection_bg));
        assert_eq!(lines[1].spans[1].style.bg, None);
    }
}
