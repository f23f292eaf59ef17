// shotlist-cli/src/commands/profiles.rs
//
// Prints every known profile with its engine and parameters.

use crate::cli::ProfilesArgs;
use crate::commands::load_profiles;
use crate::error::CliResult;
use crate::output;
use shotlist_core::config::profiles::DEFAULT_PROFILE;

pub fn run_profiles(args: ProfilesArgs) -> CliResult<()> {
    let registry = load_profiles(args.profiles_file.as_deref())?;
    log::debug!("{} profile(s) available", registry.len());
    print!("{}", output::profile_lines(registry.iter(), DEFAULT_PROFILE));
    Ok(())
}
