use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(url) = args.base_url.as_deref() {
        if reqwest::Url::parse(url).is_err() {
            return Err(format!("invalid --base-url '{url}'"));
        }
    }
    if args.page_size == Some(0) {
        return Err("invalid --page-size, expected positive integer".to_string());
    }
    if args.total_cap == Some(0) {
        return Err("invalid --total-cap, expected positive integer".to_string());
    }
    if args.timeout == Some(0) {
        return Err("invalid --timeout, expected positive integer".to_string());
    }
    Ok(())
}
