use std::collections::HashSet;

use log::debug;
use scraper::{ElementRef, Html, Node, Selector};

use crate::text::normalize_whitespace;

const NOISE_TAGS: &[&str] = &[
    "script", "style", "iframe", "noscript", "svg", "nav", "header", "footer", "aside",
];
const NOISE_CLASSES: &[&str] = &["ad", "ads", "advertisement", "social-share"];
const NOISE_CLASS_HINTS: &[&str] = &[
    "sidebar", "nav", "menu", "comment", "footer", "header", "popup", "modal", "overlay",
];
const NOISE_ID_HINTS: &[&str] = &["sidebar", "nav", "menu"];

const MAIN_CONTENT: &str =
    r#"main, article, [role="main"], .recipe, [class*="recipe"], [itemtype*="Recipe"]"#;
const HEADINGS: &str = "h1, h2, h3, h4, h5, h6";
const INGREDIENT_SECTIONS: &str = r#"[class*="ingredient"], [id*="ingredient"], [class*="Ingredient"], [id*="Ingredient"]"#;
const INGREDIENT_ITEMS: &str = "li, p, div";
const INSTRUCTIONS: &str = r#"[class*="instruction"], [id*="instruction"], [class*="direction"], [id*="direction"], [class*="step"], [id*="step"], [class*="method"], [id*="method"], ol li"#;
const RECIPE_INFO: &str = r#"[class*="time"], [class*="Time"], [class*="yield"], [class*="Yield"], [class*="serving"], [class*="Serving"]"#;
const MAX_RECIPE_INFO: usize = 10;

/// Reduces a full page to a compact text digest for generative extraction.
///
/// Noise (scripts, navigation, ads, sidebars, popups, hidden elements) is
/// ignored. The digest lists headings, an ingredients block, numbered
/// instructions and a short recipe-info block; when none of those are found it
/// falls back to the visible text of the main content region.
pub struct ContentReducer;

impl ContentReducer {
    pub fn reduce(&self, document: &Html) -> String {
        let main = main_content(document);
        let mut parts = Vec::new();

        for heading in select_visible(&main, HEADINGS) {
            let text = element_text(&heading);
            if !text.is_empty() {
                parts.push(format!("\n## {text}\n"));
            }
        }

        let sections = select_visible(&main, INGREDIENT_SECTIONS);
        if !sections.is_empty() {
            parts.push("\n## Ingredients\n".to_string());
            let mut seen_nodes = HashSet::new();
            let mut seen_texts = HashSet::new();
            for section in &sections {
                for item in select_visible(section, INGREDIENT_ITEMS) {
                    if !seen_nodes.insert(item.id()) {
                        continue;
                    }
                    let text = element_text(&item);
                    if within(&text, 2, 200) && seen_texts.insert(text.clone()) {
                        parts.push(format!("- {text}"));
                    }
                }
            }
        }

        let steps = select_visible(&main, INSTRUCTIONS);
        if !steps.is_empty() {
            parts.push("\n## Instructions\n".to_string());
            let numbered = steps
                .iter()
                .map(element_text)
                .filter(|text| within(text, 5, 500));
            for (index, text) in numbered.enumerate() {
                parts.push(format!("{}. {text}", index + 1));
            }
        }

        let info: Vec<_> = select_visible(&main, RECIPE_INFO)
            .into_iter()
            .take(MAX_RECIPE_INFO)
            .collect();
        if !info.is_empty() {
            parts.push("\n## Recipe Info\n".to_string());
            parts.extend(
                info.iter()
                    .map(element_text)
                    .filter(|text| within(text, 2, 100)),
            );
        }

        let digest = if parts.is_empty() {
            debug!("ContentReducer: No recipe sections found, using visible text");
            let mut text = String::new();
            collect_text(&main, &mut text);
            tidy_whitespace(&text)
        } else {
            tidy_whitespace(&parts.join("\n"))
        };

        debug!(
            "ContentReducer: Digest of {} characters (~{} tokens)",
            digest.chars().count(),
            estimate_tokens(&digest)
        );
        digest
    }
}

/// Rough token count: about four characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

fn main_content(document: &Html) -> ElementRef<'_> {
    let root = document.root_element();
    if let Some(main) = select_visible(&root, MAIN_CONTENT).into_iter().next() {
        return main;
    }
    let body = Selector::parse("body").expect("Invalid selector");
    document.select(&body).next().unwrap_or(root)
}

/// Matching descendants in document order, without noise or hidden elements.
fn select_visible<'a>(scope: &ElementRef<'a>, selectors: &str) -> Vec<ElementRef<'a>> {
    let selector = Selector::parse(selectors).expect("Invalid selector");
    let mut seen = HashSet::new();
    scope
        .select(&selector)
        .filter(|element| element.id() != scope.id() && !is_removed(element))
        .filter(|element| seen.insert(element.id()))
        .collect()
}

fn within(text: &str, min_exclusive: usize, max_exclusive: usize) -> bool {
    let length = text.chars().count();
    length > min_exclusive && length < max_exclusive
}

/// Whether the element or one of its ancestors is noise or hidden.
fn is_removed(element: &ElementRef) -> bool {
    std::iter::once(*element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .any(|el| is_noise(&el) || is_hidden(&el))
}

fn is_noise(element: &ElementRef) -> bool {
    let value = element.value();
    let tag = value.name();
    if tag == "html" || tag == "body" {
        return false;
    }
    if NOISE_TAGS.contains(&tag) {
        return true;
    }

    if value.classes().any(|class| NOISE_CLASSES.contains(&class)) {
        return true;
    }
    let class_attr = value.attr("class").unwrap_or("");
    if NOISE_CLASS_HINTS.iter().any(|hint| class_attr.contains(hint)) {
        return true;
    }
    let id = value.attr("id").unwrap_or("");
    NOISE_ID_HINTS.iter().any(|hint| id.contains(hint))
}

fn is_hidden(element: &ElementRef) -> bool {
    element.value().attr("hidden").is_some()
        || element
            .value()
            .attr("style")
            .map(|s| s.contains("display: none") || s.contains("visibility: hidden"))
            .unwrap_or(false)
}

/// Single-line visible text of an element.
fn element_text(element: &ElementRef) -> String {
    let mut text = String::new();
    collect_text(element, &mut text);
    normalize_whitespace(&text)
}

/// Append visible text, breaking lines after block elements.
fn collect_text(element: &ElementRef, out: &mut String) {
    if is_noise(element) || is_hidden(element) {
        return;
    }

    let tag_name = element.value().name();
    if tag_name == "br" {
        out.push('\n');
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let normalized = normalize_whitespace(text);
                if !normalized.is_empty() {
                    out.push(' ');
                    out.push_str(&normalized);
                }
            }
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, out);
                }
            }
            _ => {}
        }
    }

    if is_block_element(tag_name) {
        out.push('\n');
    }
}

fn is_block_element(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "blockquote"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "figcaption"
            | "figure"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "hr"
            | "li"
            | "main"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "tr"
            | "ul"
    )
}

/// Collapse whitespace within each line and keep at most one blank line in a row.
fn tidy_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines().map(normalize_whitespace) {
        if line.is_empty() && lines.last().map_or(true, |last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
