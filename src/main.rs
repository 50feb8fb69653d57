use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = folder_ops::cli::parse();
    let code = app::run(args)?;
    std::process::exit(code)
}
