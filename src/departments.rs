use maud::Markup;

use crate::model::Department;
use crate::templates;

/// Every department, fetched once and filtered locally afterwards.
#[derive(Debug, Default)]
pub struct DepartmentDirectory {
    all: Vec<Department>,
}

impl DepartmentDirectory {
    pub fn new(all: Vec<Department>) -> Self {
        Self { all }
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Case-insensitive substring match on `name`, original order kept.
    /// A blank query matches everything.
    pub fn filter(&self, query: &str) -> Vec<&Department> {
        filter_by_name(&self.all, query)
    }
}

pub fn filter_by_name<'a>(departments: &'a [Department], query: &str) -> Vec<&'a Department> {
    let needle = normalize(query);
    departments
        .iter()
        .filter(|d| name_matches(d, &needle))
        .collect()
}

/// The grid written into the page: all cards present, non-matches hidden.
pub fn snapshot_grid(departments: &[Department], query: &str) -> Markup {
    let needle = normalize(query);
    templates::department_grid(departments.iter().map(|d| (d, name_matches(d, &needle))))
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

fn name_matches(dept: &Department, needle: &str) -> bool {
    needle.is_empty() || dept.name.to_lowercase().contains(needle)
}
