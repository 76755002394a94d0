//! Stylesheet scoping by theme variant.

use adeck_config::{DeckConfiguration, ThemeSwitchingMode, ThemeVariant};

/// Media query matching the audience's preferred `variant`.
pub fn prefers(variant: ThemeVariant) -> String {
    format!("(prefers-color-scheme: {variant})")
}

/// `<body>` selector active while `variant` is displayed in manual mode.
pub fn body_scope(variant: ThemeVariant) -> String {
    format!("body.theme-{variant}")
}

/// Wrap a stylesheet in a media query.
pub fn media(css: &str, query: &str) -> String {
    format!("@media {query}{{{css}}}")
}

/// Prefix every selector of `css` with `scope`.
///
/// `:root` and `html` become the scope itself, a leading `body` is replaced
/// by it. At-rules are copied unchanged. Comments are dropped.
pub fn scope(css: &str, scope: &str) -> String {
    let css = strip_comments(css);
    let mut out = String::with_capacity(css.len() + 64);
    let mut rest = css.as_str();

    while let Some(open) = rest.find('{') {
        let prelude = rest[..open].trim();
        let Some(close) = matching_brace(rest, open) else {
            break;
        };
        let block = &rest[open..=close];
        if prelude.starts_with('@') {
            out.push_str(prelude);
            out.push_str(block);
        } else {
            let selectors = prelude
                .split(',')
                .map(|selector| scope_selector(selector.trim(), scope))
                .collect::<Vec<_>>()
                .join(",");
            out.push_str(&selectors);
            out.push_str(block);
        }
        rest = &rest[close + 1..];
    }
    out
}

fn scope_selector(selector: &str, scope: &str) -> String {
    if matches!(selector, ":root" | "html" | "body") {
        return scope.to_owned();
    }
    if let Some(rest) = selector.strip_prefix("body")
        && rest.starts_with([' ', '>', '.', '#', ':', '['])
    {
        return format!("{scope}{rest}");
    }
    format!("{scope} {selector}")
}

fn matching_brace(css: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in css[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => rest = "",
        }
    }
    out.push_str(rest);
    out
}

/// Combine per-variant stylesheets the way the deck's switching mode needs.
///
/// - `None`: the starting variant only, unscoped
/// - `Manual`: each variant scoped to its `body.theme-*` class
/// - `Auto`: the starting variant unscoped, the other one behind
///   `prefers-color-scheme`
///
/// Variants for which `css_for` returns `None` are left out.
pub fn for_variants<E>(
    configuration: &DeckConfiguration,
    mut css_for: impl FnMut(ThemeVariant) -> Result<Option<String>, E>,
) -> Result<String, E> {
    let starting = configuration.starting_theme;
    let other = configuration.non_starting_theme;
    let mut out = String::new();

    match configuration.theme_switching_mode {
        ThemeSwitchingMode::None => {
            if let Some(css) = css_for(starting)? {
                out.push_str(&css);
            }
        }
        ThemeSwitchingMode::Manual => {
            for variant in [starting, other] {
                if let Some(css) = css_for(variant)? {
                    out.push_str(&scope(&css, &body_scope(variant)));
                }
            }
        }
        ThemeSwitchingMode::Auto => {
            if let Some(css) = css_for(starting)? {
                out.push_str(&css);
            }
            if let Some(css) = css_for(other)? {
                out.push_str(&media(&css, &prefers(other)));
            }
        }
    }
    Ok(out)
}
