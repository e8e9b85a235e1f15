use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::builtin;
use crate::format::{
    NO_COORDINATE, NO_DESCRIPTION, NOT_AVAILABLE, NOT_AVAILABLE_SHORT, es_co_number,
    image_or_default, join_or, nonzero, present,
};
use crate::model::{
    CountryInfo, Department, NamedRef, Region, Scalar, TouristAttraction, TypicalDish,
};
use crate::section;
use crate::theme::{Theme, ThemeSource};

pub const SEARCH_FORM_ID: &str = "form-buscar-depto";
pub const SEARCH_INPUT_ID: &str = "busqueda-departamento";

pub const NO_DEPARTMENTS: &str = "No se encontraron departamentos con ese nombre.";
pub const NO_REGIONS: &str = "No se encontraron regiones.";
pub const NO_ATTRACTIONS: &str = "No se encontraron sitios turísticos.";
pub const NO_DISHES: &str = "No se encontraron platos típicos.";

const REGION_IMAGES: &[(&str, &str)] = &[
    ("Caribe", "region-caribe.jpg"),
    ("Pacífico", "region-pacifico.jpg"),
    ("Orinoquía", "region-orinoquia.jpg"),
    ("Amazonía", "region-amazonia.jpg"),
    ("Andina", "region-andina.jpg"),
    ("Insular", "region-insular.jpg"),
];
const REGION_PLACEHOLDER: &str = "placeholder.jpg";

pub fn loading(message: &str) -> Markup {
    html! { p class="loading" { (message) } }
}

pub fn failure(message: &str) -> Markup {
    html! { p class="section-error" { (message) } }
}

fn empty_message(message: &str) -> Markup {
    html! { p class="no-results" { (message) } }
}

fn ref_name(r: &Option<NamedRef>) -> Option<&str> {
    present(r.as_ref().and_then(|r| r.name.as_deref()))
}

fn coordinate(value: &Option<Scalar>) -> String {
    match value {
        Some(v) if !v.is_blank() => v.to_string(),
        _ => NO_COORDINATE.to_string(),
    }
}

pub struct CountryFields {
    pub summary: String,
    pub population: String,
    pub capital: String,
    pub surface: String,
    pub currency: String,
    pub languages: String,
    pub time_zone: String,
    pub phone_prefix: String,
    pub internet_domain: String,
    pub region: String,
    pub borders: String,
}

impl CountryFields {
    pub fn from_info(c: &CountryInfo) -> Self {
        let or_na = |v: Option<&str>| present(v).unwrap_or(NOT_AVAILABLE).to_string();

        let currency = match (
            present(c.currency.as_deref()),
            present(c.currency_symbol.as_deref()),
        ) {
            (Some(cur), Some(sym)) => format!("{cur} ({sym})"),
            (Some(cur), None) => cur.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        };
        let region = match (present(c.region.as_deref()), present(c.sub_region.as_deref())) {
            (Some(r), Some(sub)) => format!("{r} - {sub}"),
            (Some(r), None) => r.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        };

        Self {
            summary: or_na(c.description.as_deref()),
            population: nonzero(c.population)
                .map(|n| format!("{} habitantes", es_co_number(n)))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            capital: or_na(c.state_capital.as_deref()),
            surface: nonzero(c.surface)
                .map(|n| format!("{} km²", es_co_number(n)))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            currency,
            languages: join_or(&c.languages, NOT_AVAILABLE),
            time_zone: or_na(c.time_zone.as_deref()),
            phone_prefix: or_na(c.phone_prefix.as_deref()),
            internet_domain: or_na(c.internet_domain.as_deref()),
            region,
            borders: join_or(&c.borders, NOT_AVAILABLE),
        }
    }
}

pub fn country(info: &CountryInfo) -> Markup {
    let f = CountryFields::from_info(info);
    let rows: [(&str, &str, &str); 10] = [
        ("poblacion", "Población", &f.population),
        ("capital", "Capital", &f.capital),
        ("superficie", "Superficie", &f.surface),
        ("moneda", "Moneda", &f.currency),
        ("idiomas", "Idiomas", &f.languages),
        ("zona-horaria", "Zona horaria", &f.time_zone),
        ("prefijo-telefonico", "Prefijo telefónico", &f.phone_prefix),
        ("dominio-internet", "Dominio de internet", &f.internet_domain),
        ("region", "Región", &f.region),
        ("fronteras", "Fronteras", &f.borders),
    ];

    html! {
        p id="resumen-pais" class="resumen" { (f.summary) }
        dl class="datos-pais" {
            @for (id, label, value) in rows {
                div {
                    dt { (label) }
                    dd id=(id) { (value) }
                }
            }
        }
    }
}

pub fn department_card(dept: &Department, hidden: bool) -> Markup {
    let description = present(dept.description.as_deref()).unwrap_or(NO_DESCRIPTION);
    let capital = ref_name(&dept.city_capital).unwrap_or(NOT_AVAILABLE_SHORT);
    let population = nonzero(dept.population)
        .map(es_co_number)
        .unwrap_or_else(|| NOT_AVAILABLE_SHORT.to_string());
    let municipalities = dept
        .municipalities
        .filter(|m| *m > 0)
        .map(|m| m.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE_SHORT.to_string());
    let surface = nonzero(dept.surface)
        .map(|n| format!("{} km²", es_co_number(n)))
        .unwrap_or_else(|| NOT_AVAILABLE_SHORT.to_string());

    html! {
        article class="depto-card" data-name=(dept.name) hidden[hidden] {
            header class="depto-header" {
                h3 { (dept.name) }
                p class="depto-descripcion" { (description) }
            }
            div class="depto-stats" {
                (stat("Capital", capital))
                (stat("Población", &population))
                (stat("Municipios", &municipalities))
                (stat("Superficie", &surface))
            }
        }
    }
}

fn stat(label: &str, value: &str) -> Markup {
    html! {
        div class="depto-stat" {
            span class="stat-label-small" { (label) }
            span class="stat-value-small" { (value) }
        }
    }
}

pub fn department_list<'a>(depts: impl IntoIterator<Item = &'a Department>) -> Markup {
    let cards: Vec<Markup> = depts.into_iter().map(|d| department_card(d, false)).collect();
    if cards.is_empty() {
        return empty_message(NO_DEPARTMENTS);
    }
    html! { @for card in cards { (card) } }
}

/// Every card, with the ones that do not match marked `hidden`, so the
/// in-page filter can still reach the whole set.
pub fn department_grid<'a>(depts: impl IntoIterator<Item = (&'a Department, bool)>) -> Markup {
    let mut shown = 0;
    let cards: Vec<Markup> = depts
        .into_iter()
        .map(|(d, matched)| {
            if matched {
                shown += 1;
            }
            department_card(d, !matched)
        })
        .collect();
    html! {
        @for card in cards { (card) }
        @if shown == 0 { (empty_message(NO_DEPARTMENTS)) }
    }
}

pub fn region_image(name: &str) -> String {
    let file = REGION_IMAGES
        .iter()
        .find(|(region, _)| *region == name.trim())
        .map(|(_, file)| *file)
        .unwrap_or(REGION_PLACEHOLDER);
    format!("assets/{file}")
}

pub fn region_card(region: &Region) -> Markup {
    let description = present(region.description.as_deref()).unwrap_or(NO_DESCRIPTION);
    html! {
        article class="region-card" {
            img src=(region_image(&region.name))
                alt=(format!("Imagen de la región {}", region.name))
                class="region-img" loading="lazy";
            div class="region-content" {
                h3 { (region.name) }
                p { (description) }
            }
        }
    }
}

pub fn region_list(regions: &[Region]) -> Markup {
    if regions.is_empty() {
        return empty_message(NO_REGIONS);
    }
    html! { @for r in regions { (region_card(r)) } }
}

fn fallback_img_onerror() -> String {
    format!("this.src='{}'", crate::format::DEFAULT_IMAGE)
}

pub fn attraction_card(site: &TouristAttraction) -> Markup {
    let image = image_or_default(site.images.first().map(String::as_str));
    let city = ref_name(&site.city).unwrap_or(NOT_AVAILABLE);
    let description = present(site.description.as_deref()).unwrap_or(NO_DESCRIPTION);

    html! {
        article class="sitio-card" {
            div class="sitio-image" {
                img src=(image) alt=(site.name) onerror=(fallback_img_onerror());
            }
            div class="sitio-content" {
                h3 { (site.name) }
                p class="sitio-descripcion" { (description) }
                div class="sitio-datos" {
                    (dato("Ciudad", city, false))
                    (dato("Latitud", &coordinate(&site.latitude), false))
                    (dato("Longitud", &coordinate(&site.longitude), false))
                }
            }
        }
    }
}

pub fn attraction_list(sites: &[TouristAttraction]) -> Markup {
    if sites.is_empty() {
        return empty_message(NO_ATTRACTIONS);
    }
    html! { @for s in sites { (attraction_card(s)) } }
}

pub fn dish_card(dish: &TypicalDish) -> Markup {
    let image = image_or_default(dish.image_url.as_deref());
    let department = ref_name(&dish.department).unwrap_or(NOT_AVAILABLE);
    let ingredients = present(dish.ingredients.as_deref()).unwrap_or(NOT_AVAILABLE);
    let description = present(dish.description.as_deref()).unwrap_or(NO_DESCRIPTION);

    html! {
        article class="plato-card" {
            div class="plato-image" {
                img src=(image) alt=(dish.name) onerror=(fallback_img_onerror());
            }
            div class="plato-content" {
                h3 { (dish.name) }
                p class="plato-descripcion" { (description) }
                div class="plato-datos" {
                    (dato("Ingredientes", ingredients, true))
                    (dato("Departamento", department, false))
                }
            }
        }
    }
}

pub fn dish_list(dishes: &[TypicalDish]) -> Markup {
    if dishes.is_empty() {
        return empty_message(NO_DISHES);
    }
    html! { @for d in dishes { (dish_card(d)) } }
}

fn dato(label: &str, value: &str, full_width: bool) -> Markup {
    html! {
        div class=(if full_width { "dato full-width" } else { "dato" }) {
            span class="dato-label" { (label) }
            span class="dato-value" { (value) }
        }
    }
}

/// Page markup with every section container present but empty.
pub fn default_page(theme: Theme, source: ThemeSource) -> String {
    let markup: Markup = html! {
        (DOCTYPE)
        html lang="es" data-theme=(theme.as_str())
            data-theme-source=[(source == ThemeSource::System).then_some("system")] {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="color-scheme" content="light dark";
                title { "Colombia" }
                style { (PreEscaped(builtin::BUILTIN_CSS)) }
            }
            body {
                header class="site-header" {
                    h1 { "Colombia" }
                    button type="button" id="toggle-tema" class="theme-toggle"
                        aria-label="Cambiar tema" { "Tema" }
                }
                main {
                    section id="informacion-general" {
                        h2 { "Información general" }
                        div id=(section::COUNTRY.container_id) {}
                    }
                    section id="departamentos" {
                        h2 { "Departamentos" }
                        form id=(SEARCH_FORM_ID) class="search-form" role="search" {
                            input type="search" id=(SEARCH_INPUT_ID)
                                placeholder="Buscar departamento..." autocomplete="off";
                            button type="submit" { "Buscar" }
                        }
                        div id=(section::DEPARTMENTS.container_id) class="grid" {}
                    }
                    section id="regiones" {
                        h2 { "Regiones" }
                        div id=(section::REGIONS.container_id) class="grid" {}
                    }
                    section id="sitios-turisticos" {
                        h2 { "Sitios turísticos" }
                        div id=(section::ATTRACTIONS.container_id) class="grid" {}
                    }
                    section id="platos-tipicos" {
                        h2 { "Platos típicos" }
                        div id=(section::DISHES.container_id) class="grid" {}
                    }
                }
                script { (PreEscaped(builtin::THEME_TOGGLE_JS)) }
                script { (PreEscaped(builtin::DEPARTMENT_SEARCH_JS)) }
            }
        }
    };
    markup.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_country() -> CountryInfo {
        serde_json::from_str(
            r#"{
  "description": "Colombia es un país de América del Sur.",
  "stateCapital": "Bogotá",
  "surface": 1141748,
  "population": 50882884,
  "languages": ["Español", "Inglés"],
  "timeZone": "UTC-5",
  "currency": "Peso colombiano",
  "currencySymbol": "$",
  "internetDomain": ".co",
  "phonePrefix": "+57",
  "region": "América",
  "subRegion": "América del Sur",
  "borders": ["Brasil", "Ecuador", "Panamá", "Perú", "Venezuela"]
}"#,
        )
        .unwrap()
    }

    #[test]
    fn country_fields_are_formatted() {
        let f = CountryFields::from_info(&full_country());
        assert_eq!(f.population, "50.882.884 habitantes");
        assert_eq!(f.surface, "1.141.748 km²");
        assert_eq!(f.capital, "Bogotá");
        assert_eq!(f.currency, "Peso colombiano ($)");
        assert_eq!(f.languages, "Español, Inglés");
        assert_eq!(f.region, "América - América del Sur");
        assert_eq!(f.borders, "Brasil, Ecuador, Panamá, Perú, Venezuela");
        assert_eq!(f.phone_prefix, "+57");
    }

    #[test]
    fn missing_country_fields_show_fallback() {
        let f = CountryFields::from_info(&CountryInfo {
            currency: Some("Peso colombiano".into()),
            region: Some("América".into()),
            population: Some(0.0),
            ..CountryInfo::default()
        });
        assert_eq!(f.population, NOT_AVAILABLE);
        assert_eq!(f.surface, NOT_AVAILABLE);
        assert_eq!(f.capital, NOT_AVAILABLE);
        assert_eq!(f.languages, NOT_AVAILABLE);
        assert_eq!(f.borders, NOT_AVAILABLE);
        assert_eq!(f.currency, "Peso colombiano");
        assert_eq!(f.region, "América");
    }

    #[test]
    fn country_markup_carries_field_ids() {
        let html = country(&full_country()).into_string();
        assert!(html.contains(r#"<dd id="poblacion">50.882.884 habitantes</dd>"#));
        assert!(html.contains(r#"<dd id="zona-horaria">UTC-5</dd>"#));
        assert!(html.contains(r#"id="resumen-pais""#));
    }

    #[test]
    fn attraction_image_falls_back() {
        let mut site = TouristAttraction {
            name: "Caño Cristales".into(),
            ..TouristAttraction::default()
        };
        let html = attraction_card(&site).into_string();
        assert!(html.contains(r#"src="assets/img_header_1.jpg""#));
        assert!(html.contains("No disponible"));
        assert!(html.contains("N/A"));

        site.images = vec!["images/local.jpg".into(), "https://x.test/b.jpg".into()];
        let html = attraction_card(&site).into_string();
        assert!(html.contains(r#"src="assets/img_header_1.jpg""#));

        site.images = vec!["https://x.test/a.jpg".into()];
        let html = attraction_card(&site).into_string();
        assert!(html.contains(r#"src="https://x.test/a.jpg""#));
    }

    #[test]
    fn dish_image_and_department() {
        let dish: TypicalDish = serde_json::from_str(
            r#"{"name":"Bandeja paisa","ingredients":"Frijoles, arroz",
                "imageUrl":"https://x.test/b.jpg","department":{"name":"Antioquia"}}"#,
        )
        .unwrap();
        let html = dish_card(&dish).into_string();
        assert!(html.contains(r#"src="https://x.test/b.jpg""#));
        assert!(html.contains("Antioquia"));
        assert!(html.contains("Frijoles, arroz"));
        assert!(html.contains(r#"class="dato full-width""#));
    }

    #[test]
    fn region_images_use_lookup_table() {
        assert_eq!(region_image("Caribe"), "assets/region-caribe.jpg");
        assert_eq!(region_image("Pacífico"), "assets/region-pacifico.jpg");
        assert_eq!(region_image("Desconocida"), "assets/placeholder.jpg");
        assert!(region_list(&[]).into_string().contains(NO_REGIONS));
    }

    #[test]
    fn api_text_is_escaped() {
        let dept = Department {
            name: "<script>x</script>".into(),
            ..Department::default()
        };
        let html = department_card(&dept, false).into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn department_card_fallbacks() {
        let dept = Department {
            name: "Vaupés".into(),
            ..Department::default()
        };
        let html = department_card(&dept, false).into_string();
        assert!(html.contains(r#"data-name="Vaupés""#));
        assert!(!html.contains("hidden"));
        assert!(html.contains(NO_DESCRIPTION));
        assert!(html.contains("N/D"));
    }
}
