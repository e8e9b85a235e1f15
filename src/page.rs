use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use anyhow::Context as _;
use kuchiki::traits::TendrilSink as _;
use maud::Markup;

use crate::templates;
use crate::theme::{Theme, ThemeSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Untouched,
    Loading(String),
    Ready(String),
    Failed(String),
}

impl ContainerState {
    fn fragment(&self) -> Option<String> {
        match self {
            ContainerState::Untouched => None,
            ContainerState::Loading(msg) => Some(templates::loading(msg).into_string()),
            ContainerState::Ready(html) => Some(html.clone()),
            ContainerState::Failed(msg) => Some(templates::failure(msg).into_string()),
        }
    }
}

/// An element of the page that exactly one section writes into.
pub struct Container {
    state: Mutex<ContainerState>,
}

impl Container {
    fn new() -> Self {
        Self {
            state: Mutex::new(ContainerState::Untouched),
        }
    }

    pub fn state(&self) -> ContainerState {
        self.lock().clone()
    }

    /// Current contents as an HTML fragment; `None` while untouched.
    pub fn html(&self) -> Option<String> {
        self.lock().fragment()
    }

    pub fn show_loading(&self, message: &str) {
        *self.lock() = ContainerState::Loading(message.to_string());
    }

    pub fn show(&self, markup: Markup) {
        *self.lock() = ContainerState::Ready(markup.into_string());
    }

    pub fn show_error(&self, message: &str) {
        *self.lock() = ContainerState::Failed(message.to_string());
    }

    fn lock(&self) -> MutexGuard<'_, ContainerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Page markup plus the containers found in it.
pub struct Page {
    template: String,
    containers: BTreeMap<String, Container>,
    values: BTreeMap<String, String>,
}

impl Page {
    pub fn parse(template: impl Into<String>) -> Self {
        let template = template.into();
        let document = kuchiki::parse_html().one(template.as_str());

        let mut containers = BTreeMap::new();
        if let Ok(nodes) = document.select("[id]") {
            for node in nodes {
                let attrs = node.attributes.borrow();
                if let Some(id) = attrs.get("id").map(str::trim).filter(|id| !id.is_empty()) {
                    containers
                        .entry(id.to_string())
                        .or_insert_with(Container::new);
                }
            }
        }

        Self {
            template,
            containers,
            values: BTreeMap::new(),
        }
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.get(id)
    }

    /// Sets the `value` attribute of the element with `id` on render.
    /// Ids missing from the template are ignored.
    pub fn prefill(&mut self, id: &str, value: &str) {
        self.values.insert(id.to_string(), value.to_string());
    }

    /// Serializes the template with every touched container filled in and
    /// `data-theme` set on the document element. A theme that only came from
    /// the system color scheme is marked `data-theme-source="system"` so the
    /// viewer's own scheme can replace it.
    pub fn render(&self, theme: Option<(Theme, ThemeSource)>) -> anyhow::Result<String> {
        let document = kuchiki::parse_html().one(self.template.as_str());

        if let Some((theme, source)) = theme {
            if let Ok(root) = document.select_first("html") {
                let mut attrs = root.attributes.borrow_mut();
                attrs.insert("data-theme", theme.as_str().to_string());
                match source {
                    ThemeSource::System => {
                        attrs.insert("data-theme-source", "system".to_string());
                    }
                    ThemeSource::Stored => {
                        attrs.remove("data-theme-source");
                    }
                }
            }
        }

        let targets: Vec<_> = document
            .select("[id]")
            .map(|nodes| nodes.collect())
            .unwrap_or_default();

        let mut filled = HashSet::new();
        for target in targets {
            let id = match target.attributes.borrow().get("id") {
                Some(id) => id.trim().to_string(),
                None => continue,
            };
            if let Some(value) = self.values.get(&id) {
                target
                    .attributes
                    .borrow_mut()
                    .insert("value", value.clone());
            }
            let Some(container) = self.containers.get(&id) else {
                continue;
            };
            let Some(fragment) = container.html() else {
                continue;
            };
            if !filled.insert(id) {
                continue;
            }

            let node = target.as_node();
            for child in node.children().collect::<Vec<_>>() {
                child.detach();
            }
            for child in parse_fragment(&fragment) {
                node.append(child);
            }
        }

        let mut out = Vec::new();
        document.serialize(&mut out).context("serialize page")?;
        String::from_utf8(out).context("page html not utf-8")
    }
}

fn parse_fragment(fragment: &str) -> Vec<kuchiki::NodeRef> {
    let doc = kuchiki::parse_html()
        .one(format!("<!DOCTYPE html><html><body>{fragment}</body></html>"));
    match doc.select_first("body") {
        Ok(body) => body.as_node().children().collect(),
        Err(()) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maud::html;

    const TEMPLATE: &str = r#"<!DOCTYPE html>
<html><head><title>t</title></head>
<body>
  <div id="regiones-grid"><p>static</p></div>
  <div id="untouched">keep me</div>
</body></html>"#;

    #[test]
    fn discovers_containers_by_id() {
        let page = Page::parse(TEMPLATE);
        assert!(page.container("regiones-grid").is_some());
        assert!(page.container("untouched").is_some());
        assert!(page.container("departamentos-grid").is_none());
    }

    #[test]
    fn render_replaces_only_touched_containers() {
        let page = Page::parse(TEMPLATE);
        page.container("regiones-grid")
            .unwrap()
            .show(html! { article class="region-card" { "Caribe" } });

        let out = page.render(None).unwrap();
        assert!(out.contains(
            r#"<div id="regiones-grid"><article class="region-card">Caribe</article></div>"#
        ));
        assert!(!out.contains("static"));
        assert!(out.contains("keep me"));
    }

    #[test]
    fn loading_and_failure_states_render_messages() {
        let page = Page::parse(TEMPLATE);
        let regions = page.container("regiones-grid").unwrap();
        regions.show_loading("Cargando regiones...");
        assert!(page.render(None).unwrap().contains("Cargando regiones..."));

        regions.show_error("Error al cargar las regiones.");
        assert_eq!(
            regions.state(),
            ContainerState::Failed("Error al cargar las regiones.".into())
        );
        let out = page.render(None).unwrap();
        assert!(out.contains(r#"<p class="section-error">Error al cargar las regiones.</p>"#));
        assert!(!out.contains("Cargando regiones..."));
    }

    #[test]
    fn render_applies_theme_attribute() {
        let page = Page::parse(TEMPLATE);
        let out = page.render(Some((Theme::Dark, ThemeSource::Stored))).unwrap();
        assert!(out.contains(r#"data-theme="dark""#));
        assert!(!out.contains("data-theme-source"));
    }

    #[test]
    fn system_theme_is_marked_overridable() {
        let page = Page::parse(TEMPLATE);
        let out = page.render(Some((Theme::Light, ThemeSource::System))).unwrap();
        assert!(out.contains(r#"data-theme="light""#));
        assert!(out.contains(r#"data-theme-source="system""#));

        let marked = Page::parse(out);
        let out = marked.render(Some((Theme::Dark, ThemeSource::Stored))).unwrap();
        assert!(!out.contains("data-theme-source"));
    }

    #[test]
    fn prefill_sets_value_attribute() {
        let mut page = Page::parse(
            r#"<html><body><input id="busqueda-departamento"><div id="x"></div></body></html>"#,
        );
        page.prefill("busqueda-departamento", "antio");
        page.prefill("missing", "ignored");
        let out = page.render(None).unwrap();
        assert!(out.contains(r#"<input id="busqueda-departamento" value="antio">"#));
        assert!(!out.contains("ignored"));
    }
}
