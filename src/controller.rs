use std::sync::Arc;

use crate::departments::{DepartmentDirectory, snapshot_grid};
use crate::fetcher::Fetcher;
use crate::model::{CountryInfo, Department, Region, TouristAttraction, TypicalDish};
use crate::page::{ContainerState, Page};
use crate::progress::Progress;
use crate::section;
use crate::templates;
use crate::theme::{Theme, ThemeSource};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<&'static str>,
    pub failed: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

/// Owns the page for one render and the department snapshot taken during it.
pub struct PageController {
    fetcher: Fetcher,
    page: Page,
    progress: Arc<Progress>,
    departments: Option<DepartmentDirectory>,
}

impl PageController {
    pub fn new(fetcher: Fetcher, page: Page, progress: Arc<Progress>) -> Self {
        Self {
            fetcher,
            page,
            progress,
            departments: None,
        }
    }

    /// Loads every section the page has a container for. The requests run
    /// concurrently and finish in any order; a failed section only touches
    /// its own container.
    pub async fn load_all(&mut self, initial_query: &str) -> LoadReport {
        let fetcher = &self.fetcher;
        let page = &self.page;
        let progress = self.progress.as_ref();

        let (_country, departments, _regions, _attractions, _dishes) = tokio::join!(
            section::load::<CountryInfo, _>(
                fetcher,
                page,
                &section::COUNTRY,
                progress,
                templates::country
            ),
            section::load(
                fetcher,
                page,
                &section::DEPARTMENTS,
                progress,
                |all: &Vec<Department>| snapshot_grid(all, initial_query),
            ),
            section::load(
                fetcher,
                page,
                &section::REGIONS,
                progress,
                |all: &Vec<Region>| templates::region_list(all),
            ),
            section::load(
                fetcher,
                page,
                &section::ATTRACTIONS,
                progress,
                |all: &Vec<TouristAttraction>| templates::attraction_list(all),
            ),
            section::load(
                fetcher,
                page,
                &section::DISHES,
                progress,
                |all: &Vec<TypicalDish>| templates::dish_list(all),
            ),
        );

        self.departments = departments.map(DepartmentDirectory::new);
        let query = initial_query.trim();
        if !query.is_empty() {
            self.page.prefill(templates::SEARCH_INPUT_ID, query);
        }
        self.report()
    }

    /// Re-renders the departments container from the snapshot, without a
    /// request. Returns `false` when there is no snapshot or no container.
    pub fn filter_departments(&self, query: &str) -> bool {
        let (Some(directory), Some(container)) = (
            self.departments.as_ref(),
            self.page.container(section::DEPARTMENTS.container_id),
        ) else {
            return false;
        };
        let matches = directory.filter(query);
        tracing::debug!(query, matches = matches.len(), "departments filtered");
        container.show(templates::department_list(matches));
        true
    }

    pub fn departments(&self) -> Option<&DepartmentDirectory> {
        self.departments.as_ref()
    }

    pub fn container_html(&self, id: &str) -> Option<String> {
        self.page.container(id).and_then(|c| c.html())
    }

    pub fn report(&self) -> LoadReport {
        let mut report = LoadReport::default();
        for s in section::ALL {
            match self.page.container(s.container_id).map(|c| c.state()) {
                None | Some(ContainerState::Untouched) => report.skipped.push(s.label),
                Some(ContainerState::Failed(_)) => report.failed.push(s.label),
                Some(ContainerState::Ready(_)) | Some(ContainerState::Loading(_)) => {
                    report.loaded.push(s.label)
                }
            }
        }
        report
    }

    pub fn render(&self, theme: Theme, source: ThemeSource) -> anyhow::Result<String> {
        self.page.render(Some((theme, source)))
    }
}
