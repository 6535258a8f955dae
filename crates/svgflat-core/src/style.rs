//! Inline `style` declarations and class rules from `<style>` elements.

use tracing::debug;

/// `name: value` pairs of a declaration block, in source order. Empty entries are skipped.
pub fn style_declarations(block: &str) -> impl Iterator<Item = (&str, &str)> {
    block.split(';').filter_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        let (name, value) = (name.trim(), value.trim());
        (!name.is_empty() && !value.is_empty()).then_some((name, value))
    })
}

pub fn is_display_none(style: &str) -> bool {
    style_declarations(style).any(|(name, value)| name == "display" && value == "none")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ClassRule {
    tag: Option<String>,
    class: String,
    declarations: String,
}

/// Class selectors (`.name` and `tag.name`) collected across every `<style>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    rules: Vec<ClassRule>,
}

impl Stylesheet {
    pub fn parse(css: &str) -> Self {
        let mut sheet = Self::default();
        sheet.extend(css);
        sheet
    }

    pub fn extend(&mut self, css: &str) {
        for block in css.split('}') {
            let Some((selectors, declarations)) = block.split_once('{') else {
                continue;
            };
            let declarations = declarations.trim();
            if declarations.is_empty() {
                continue;
            }
            for selector in selectors.split(',') {
                let selector = selector.trim();
                match parse_class_selector(selector) {
                    Some((tag, class)) => self.rules.push(ClassRule {
                        tag: tag.map(str::to_string),
                        class: class.to_string(),
                        declarations: declarations.to_string(),
                    }),
                    None => debug!(selector, "skipping unsupported selector"),
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Declarations that apply to an element, in rule order.
    pub fn declarations_for<'s>(
        &'s self,
        tag: &'s str,
        class_attr: &'s str,
    ) -> impl Iterator<Item = (&'s str, &'s str)> + 's {
        self.rules
            .iter()
            .filter(move |rule| {
                rule.tag.as_deref().is_none_or(|t| t == tag)
                    && class_attr.split_whitespace().any(|c| c == rule.class)
            })
            .flat_map(|rule| style_declarations(&rule.declarations))
    }
}

fn parse_class_selector(selector: &str) -> Option<(Option<&str>, &str)> {
    let (tag, class) = selector.split_once('.')?;
    let valid = |s: &str| {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    };
    if !valid(class) || !(tag.is_empty() || valid(tag)) {
        return None;
    }
    Some(((!tag.is_empty()).then_some(tag), class))
}
