mod builtin;
mod cli;
mod controller;
mod departments;
mod fetcher;
mod format;
mod model;
mod page;
mod progress;
mod section;
mod templates;
mod theme;

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Context as _;
use cli::{Args, RenderArgs, SearchArgs, StateArgs, ThemeArgs};
use controller::PageController;
use fetcher::Fetcher;
use page::Page;
use theme::{ColorSchemeSignal, EnvColorScheme, FileStore, FixedColorScheme, ThemeController};

pub use cli::{ApiArgs, ColorScheme, Command, ProgressMode, ThemeAction};
pub use cli::{Args as CliArgs, RenderArgs as RenderOptions, SearchArgs as SearchOptions};
pub use cli::{StateArgs as StateOptions, ThemeArgs as ThemeOptions};
pub use fetcher::{DEFAULT_API_BASE_URL, FetchError};
pub use theme::{PREFERENCES_FILE, Theme};

pub async fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        cli::Command::Render(render) => render_page(render).await,
        cli::Command::Search(search) => {
            search_departments(search, std::io::stdin().lock(), std::io::stdout().lock()).await
        }
        cli::Command::Theme(theme) => theme_command(theme),
    }
}

async fn render_page(args: RenderArgs) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = progress::Progress::new(progress_enabled);

    progress.set_stage("Leyendo preferencia de tema");
    let theme_controller = load_theme(&args.state);
    let (theme, source) = (theme_controller.current(), theme_controller.source());

    progress.set_stage("Leyendo plantilla");
    let template = match &args.template {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read template {}", path.display()))?,
        None => templates::default_page(theme, source),
    };
    let page = Page::parse(template);

    let fetcher = Fetcher::new(
        &args.api.api_base_url,
        &args.api.user_agent,
        args.max_concurrency,
        Some(progress.clone()),
    )?;
    tracing::debug!(api = %fetcher.base_url(), "loading sections");
    let mut controller = PageController::new(fetcher, page, progress.clone());

    progress.set_stage("Cargando secciones");
    let report = controller
        .load_all(args.search.as_deref().unwrap_or(""))
        .await;

    progress.set_stage("Generando HTML");
    let html = controller.render(theme, source)?;

    progress.set_stage("Escribiendo salida");
    write_output(&args.out, &html)?;
    progress.finish();

    tracing::info!(
        out = %args.out.display(),
        %theme,
        requested = progress.sections_done(),
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "page written"
    );
    Ok(())
}

/// Fetches the departments once, then writes the filtered grid for each
/// query on its own line. Queries come from `args.queries`, or one per line
/// of `input` when none are given.
pub async fn search_departments(
    args: SearchArgs,
    input: impl BufRead,
    mut out: impl Write,
) -> anyhow::Result<()> {
    let progress = progress::Progress::new(false);
    let fetcher = Fetcher::new(&args.api.api_base_url, &args.api.user_agent, 1, None)?;
    let page = Page::parse(format!(
        r#"<div id="{}"></div>"#,
        section::DEPARTMENTS.container_id
    ));
    let mut controller = PageController::new(fetcher, page, progress);
    controller.load_all("").await;

    let Some(directory) = controller.departments() else {
        anyhow::bail!("{}", section::DEPARTMENTS.failure);
    };
    if directory.is_empty() {
        tracing::warn!("API returned no departments");
    } else {
        tracing::info!(departments = directory.len(), "departments loaded");
    }

    let mut emit = |query: &str| -> anyhow::Result<()> {
        controller.filter_departments(query);
        let html = controller.container_html(section::DEPARTMENTS.container_id);
        writeln!(out, "{}", html.unwrap_or_default()).context("write results")?;
        out.flush().context("flush results")
    };

    if args.queries.is_empty() {
        for line in input.lines() {
            let line = line.context("read queries")?;
            emit(line.trim())?;
        }
    } else {
        for query in &args.queries {
            emit(query.trim())?;
        }
    }
    Ok(())
}

fn theme_command(args: ThemeArgs) -> anyhow::Result<()> {
    let mut controller = load_theme(&args.state);
    match args.action {
        ThemeAction::Show => {
            println!("{} ({})", controller.current(), controller.source());
        }
        ThemeAction::Toggle => {
            let theme = controller.toggle();
            tracing::info!(%theme, "theme preference stored");
            println!("{theme}");
        }
    }
    Ok(())
}

fn load_theme(state: &StateArgs) -> ThemeController<FileStore> {
    let signal: Box<dyn ColorSchemeSignal> = match state.prefers_color_scheme {
        Some(scheme) => Box::new(FixedColorScheme(scheme.into())),
        None => Box::new(EnvColorScheme),
    };
    ThemeController::load(FileStore::in_dir(&state.state_dir), signal.as_ref())
}

fn write_output(out_path: &Path, html: &str) -> anyhow::Result<()> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    std::fs::write(out_path, html).with_context(|| format!("write {}", out_path.display()))
}
