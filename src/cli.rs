use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use url::Url;

use crate::fetcher::DEFAULT_API_BASE_URL;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorScheme {
    Light,
    Dark,
}

impl From<ColorScheme> for Theme {
    fn from(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => Theme::Light,
            ColorScheme::Dark => Theme::Dark,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every section and write the Colombia page.
    Render(RenderArgs),
    /// Fetch the departments once and filter them by name.
    Search(SearchArgs),
    /// Show or toggle the stored light/dark preference.
    Theme(ThemeArgs),
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ApiArgs {
    /// Base URL of the API-Colombia service.
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: Url,

    /// HTTP User-Agent sent with every request.
    #[arg(long, default_value = "colombia-render/0.1")]
    pub user_agent: String,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct StateArgs {
    /// Directory holding `preferences.json`.
    #[arg(long, default_value = ".colombia-render")]
    pub state_dir: PathBuf,

    /// Color scheme to assume when no preference is stored.
    ///
    /// Defaults to the terminal's `COLORFGBG` background.
    #[arg(long, value_enum)]
    pub prefers_color_scheme: Option<ColorScheme>,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct RenderArgs {
    /// Output HTML file.
    #[arg(long, default_value = "colombia.html")]
    pub out: PathBuf,

    /// Page markup to fill instead of the built-in page.
    ///
    /// Sections whose container id is missing from it are skipped.
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Initial department filter.
    #[arg(long)]
    pub search: Option<String>,

    #[command(flatten)]
    pub api: ApiArgs,

    #[command(flatten)]
    pub state: StateArgs,

    /// Max concurrent requests.
    #[arg(long, default_value_t = 5)]
    pub max_concurrency: usize,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct SearchArgs {
    /// Queries to run against the department list. Reads one query per
    /// stdin line when none are given.
    pub queries: Vec<String>,

    #[command(flatten)]
    pub api: ApiArgs,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ThemeArgs {
    #[arg(value_enum)]
    pub action: ThemeAction,

    #[command(flatten)]
    pub state: StateArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    /// Print the theme that would be applied and where it comes from.
    Show,
    /// Invert the theme and store it.
    Toggle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_defaults() {
        let args = Args::parse_from(["colombia-render", "render"]);
        let Command::Render(render) = args.command else {
            panic!("expected render");
        };
        assert_eq!(render.api.api_base_url.as_str(), DEFAULT_API_BASE_URL);
        assert_eq!(render.out, PathBuf::from("colombia.html"));
        assert_eq!(render.max_concurrency, 5);
        assert!(render.state.prefers_color_scheme.is_none());
    }

    #[test]
    fn theme_toggle_with_scheme() {
        let args = Args::parse_from([
            "colombia-render",
            "theme",
            "toggle",
            "--prefers-color-scheme",
            "dark",
        ]);
        let Command::Theme(theme) = args.command else {
            panic!("expected theme");
        };
        assert_eq!(theme.action, ThemeAction::Toggle);
        assert_eq!(theme.state.prefers_color_scheme, Some(ColorScheme::Dark));
    }

    #[test]
    fn args_are_consistent() {
        use clap::CommandFactory as _;
        Args::command().debug_assert();
    }
}
