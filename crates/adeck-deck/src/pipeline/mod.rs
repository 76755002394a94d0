//! The deck transformation pipeline.
//!
//! An explicit, ordered list of named [`Stage`]s. Each stage takes the DOM
//! left by the previous one; stages never run concurrently.
//!
//! | # | Stage | Adds |
//! |---|-------|------|
//! | 1 | `svg-icons` | hidden sprite sheet of the icons folder |
//! | 2 | `graphs` | rendered diagrams and their animations |
//! | 3 | `highlight` | highlighted listings and highlighter CSS |
//! | 4 | `layouts` | CSS of the layout classes in use |
//! | 5 | `theme` | palette, diagram CSS, theme toggle |
//! | 6 | `custom-files` | the deck's own CSS and JS |
//! | 7 | `live-reload` | live reload client |
//! | 8 | `fragments` | fragment classes and indices |
//! | 9 | `runtime` | presentation runtime CSS and JS |

mod custom;
mod fragments;
mod graphs;
mod highlight;
mod icons;
mod layouts;
mod live_reload;
mod runtime;
mod theme;

use adeck_dom::Dom;

use crate::deck::Deck;
use crate::error::BuildError;
use crate::services::BuildContext;

pub use custom::CustomFiles;
pub use fragments::Fragments;
pub use graphs::Graphs;
pub use highlight::Highlight;
pub use icons::SvgIcons;
pub use layouts::Layouts;
pub use live_reload::LiveReload;
pub use runtime::Runtime;
pub use theme::Theme;

/// One step of the pipeline.
pub trait Stage {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    fn run(
        &self,
        deck: &mut Deck,
        dom: &mut dyn Dom,
        context: &BuildContext<'_>,
    ) -> Result<(), BuildError>;
}

/// Every stage, in execution order.
pub fn stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(SvgIcons),
        Box::new(Graphs),
        Box::new(Highlight),
        Box::new(Layouts),
        Box::new(Theme),
        Box::new(CustomFiles),
        Box::new(LiveReload),
        Box::new(Fragments),
        Box::new(Runtime),
    ]
}

/// Run every stage in order, stopping at the first error.
pub fn run(deck: &mut Deck, dom: &mut dyn Dom, context: &BuildContext<'_>) -> Result<(), BuildError> {
    for stage in stages() {
        tracing::debug!(stage = stage.name(), "Running stage");
        stage.run(deck, dom, context)?;
    }
    Ok(())
}
