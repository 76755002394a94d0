//! Colour theme compilation and theme switching.

use adeck_cache::CacheBucketExt;
use adeck_config::ThemeSwitchingMode;
use adeck_dom::{Dom, InsertPosition};

use super::Stage;
use crate::css;
use crate::deck::Deck;
use crate::error::BuildError;
use crate::services::BuildContext;
use crate::style::ThemeRequest;

/// Applies the colour theme.
///
/// Requires: [`Deck::graph_types`] filled by the graph stage. Guarantees:
/// the palette stylesheet (from the `themes` cache or the style compiler),
/// the stylesheet of every recorded diagram type for the shipped variants,
/// and in manual mode the `theme-<starting>` class on `<body>` plus the
/// toggle script.
pub struct Theme;

impl Stage for Theme {
    fn name(&self) -> &'static str {
        "theme"
    }

    fn run(
        &self,
        deck: &mut Deck,
        dom: &mut dyn Dom,
        context: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        let configuration = &deck.configuration;
        let request = ThemeRequest::from_configuration(configuration);
        let bucket = context.cache.bucket("themes");
        let (palette, cached) = bucket.get_or_insert_string(&request.cache_key(), || {
            context.services.style_compiler.compile(&request)
        })?;
        if cached {
            tracing::debug!(key = %request.cache_key(), "Theme cache hit");
        }
        dom.insert_inline_style(&palette, InsertPosition::BeforeEnd)?;

        let mut diagrams = String::new();
        for kind in &deck.graph_types {
            let css = css::for_variants(configuration, |variant| {
                Ok::<_, BuildError>(
                    adeck_assets::diagram_css(kind, variant.as_str()).map(|css| css.into_owned()),
                )
            })?;
            diagrams.push_str(&css);
        }
        if !diagrams.is_empty() {
            dom.insert_inline_style(&diagrams, InsertPosition::BeforeEnd)?;
        }

        if configuration.theme_switching_mode == ThemeSwitchingMode::Manual {
            let body = dom.require("body")?;
            dom.add_class(body, &format!("theme-{}", configuration.starting_theme));
            dom.insert_inline_script(&adeck_assets::theme_toggle_js(), InsertPosition::BeforeEnd)?;
        }
        Ok(())
    }
}
