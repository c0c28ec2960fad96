use lazy_static::lazy_static;
use structopt::clap::AppSettings;
use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "SecondChance, the backend for the second-hand items marketplace.",
    setting = AppSettings::DeriveDisplayOrder,
    setting = AppSettings::UnifiedHelpMessage,
    version = VERSION.as_str(),
)]
pub struct CliOptions {
    /// Port to listen to.
    #[structopt(short, long, default_value = "3060", env = "SECONDCHANCE_PORT")]
    pub port: u16,
}

lazy_static! {
    pub static ref VERSION: String = crate::internal_api::get_project_version();
}

lazy_static! {
    pub static ref PARSED: CliOptions = CliOptions::from_args();
}

#[cfg(test)]
pub mod tests {
    use super::CliOptions;

    /// Example test CLI. Purely for convenience,
    /// you can instantiate your own / unrelated ones as well.
    pub fn test_cli() -> CliOptions {
        CliOptions { port: 3060 }
    }

    #[test]
    fn test_cli_matches_default_port() {
        assert_eq!(test_cli().port, 3060);
    }
}
