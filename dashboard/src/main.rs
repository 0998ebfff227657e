use anyhow::Result;
use loadtest_dashboard::cli;

fn main() -> Result<()> {
    cli::handle_calls()
}
