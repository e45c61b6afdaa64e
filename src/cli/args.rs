use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "critterdex",
    version,
    about = "terminal catalog browser for creature-data APIs",
    long_about = "Critterdex browses a paginated creature-data API from the terminal: it loads records page by page, caches every response for the session, and filters everything fetched so far by name or category.\n\nExamples:\n  critterdex\n  critterdex -p 20 -t 250\n  critterdex --lookup pikachu\n  critterdex --config ~/.critterdex/config.yml\n\nTip: Use --config to persist settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'u',
        long = "base-url",
        value_name = "URL",
        help_heading = "Input",
        help = "Base URL of the record collection endpoint."
    )]
    pub base_url: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.critterdex/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'l',
        long = "lookup",
        value_name = "NAME",
        help_heading = "Input",
        help = "Fetch a single record by id or name, print its detail view, and exit."
    )]
    pub lookup: Option<String>,

    #[arg(
        short = 'p',
        long = "page-size",
        value_name = "N",
        help_heading = "Paging",
        help = "Records fetched per page load."
    )]
    pub page_size: Option<u32>,

    #[arg(
        short = 't',
        long = "total-cap",
        value_name = "N",
        help_heading = "Paging",
        help = "Stop loading once this many records have been fetched."
    )]
    pub total_cap: Option<u32>,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        long = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,
}
