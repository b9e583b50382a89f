// ABOUTME: Init command implementation.
// ABOUTME: Writes a starter kubeship.yml into the working directory.

use kubeship::config;
use kubeship::error::Result;
use kubeship::output::Output;
use kubeship::report::Verdict;
use std::env;

pub fn init(force: bool, output: &Output) -> Result<Verdict> {
    let cwd = env::current_dir()?;
    let path = config::init_config(&cwd, force)?;
    output.success(&format!("Created {}", path.display()));
    Ok(Verdict::Healthy)
}
