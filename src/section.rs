use maud::Markup;
use serde::de::DeserializeOwned;

use crate::fetcher::Fetcher;
use crate::model::Records;
use crate::page::Page;
use crate::progress::Progress;

/// One independently loaded content area and the container it owns.
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub label: &'static str,
    pub container_id: &'static str,
    pub endpoint: &'static str,
    pub loading: &'static str,
    pub failure: &'static str,
}

pub const COUNTRY: Section = Section {
    label: "información general",
    container_id: "info-general",
    endpoint: "Country/Colombia",
    loading: "Cargando descripción...",
    failure: "Error al cargar la información. Por favor, intenta recargar la página.",
};

pub const DEPARTMENTS: Section = Section {
    label: "departamentos",
    container_id: "departamentos-grid",
    endpoint: "Department",
    loading: "Cargando departamentos...",
    failure: "Error al cargar los departamentos. Por favor, intenta recargar la página.",
};

pub const REGIONS: Section = Section {
    label: "regiones",
    container_id: "regiones-grid",
    endpoint: "Region",
    loading: "Cargando regiones...",
    failure: "Error al cargar las regiones. Por favor, intenta recargar la página.",
};

pub const ATTRACTIONS: Section = Section {
    label: "sitios turísticos",
    container_id: "sitios-turisticos-list",
    endpoint: "TouristicAttraction",
    loading: "Cargando sitios turísticos...",
    failure: "Error al cargar los sitios turísticos. Por favor, intenta recargar la página.",
};

pub const DISHES: Section = Section {
    label: "platos típicos",
    container_id: "platos-tipicos-list",
    endpoint: "TypicalDish",
    loading: "Cargando platos típicos...",
    failure: "Error al cargar los platos típicos. Por favor, intenta recargar la página.",
};

pub const ALL: [Section; 5] = [COUNTRY, DEPARTMENTS, REGIONS, ATTRACTIONS, DISHES];

/// Fetches `section.endpoint` into its container.
///
/// Returns `None` without any request when the page has no such container.
/// Failures never escape: they are logged and the container shows
/// `section.failure`.
pub async fn load<T, F>(
    fetcher: &Fetcher,
    page: &Page,
    section: &Section,
    progress: &Progress,
    render: F,
) -> Option<T>
where
    T: DeserializeOwned + Records,
    F: FnOnce(&T) -> Markup,
{
    let Some(container) = page.container(section.container_id) else {
        tracing::debug!(
            section = section.label,
            container = section.container_id,
            "container not on page; skipping"
        );
        return None;
    };

    progress.add_section(section.label);
    container.show_loading(section.loading);

    match fetcher.get_json::<T>(section.endpoint).await {
        Ok(data) => {
            container.show(render(&data));
            tracing::info!(
                section = section.label,
                records = data.record_count(),
                "section loaded"
            );
            progress.section_done(section.label, true);
            Some(data)
        }
        Err(err) => {
            let err = anyhow::Error::new(err);
            tracing::error!(
                section = section.label,
                error = %format!("{err:#}"),
                "section failed to load"
            );
            container.show_error(section.failure);
            progress.section_done(section.label, false);
            None
        }
    }
}
