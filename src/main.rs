use anyhow::Result;
use bookstore::cli::process_cli;

pub fn main() -> Result<()> {
    process_cli()
}
