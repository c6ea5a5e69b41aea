use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "adhan", version, author, about = "Prayer-time countdown with a full-screen adhan alert")]
pub struct Cli {
    #[command(flatten)]
    pub location: LocationArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Default)]
pub struct LocationArgs {
    /// City to fetch prayer times for (skips IP detection)
    #[arg(long, global = true)]
    pub city: Option<String>,
    /// Country of --city
    #[arg(long, global = true)]
    pub country: Option<String>,
    /// Calculation method id understood by the timetable API
    #[arg(long, global = true)]
    pub method: Option<u8>,
    /// Do not look up the location from the public IP
    #[arg(long, global = true)]
    pub no_detect: bool,
}

impl LocationArgs {
    /// Layer command-line flags over the loaded config. An explicit city or
    /// country means the user knows where they are: no detection, no
    /// configured coordinates.
    pub fn apply(&self, config: &mut AppConfig) {
        let loc = &mut config.location;
        if self.city.is_some() || self.country.is_some() {
            if let Some(city) = &self.city {
                loc.city = city.clone();
            }
            if let Some(country) = &self.country {
                loc.country = country.clone();
            }
            loc.latitude = None;
            loc.longitude = None;
            loc.detect = false;
        }
        if let Some(method) = self.method {
            loc.method = method;
        }
        if self.no_detect {
            loc.detect = false;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch today's prayer times once and print them with a countdown
    Times,
    /// Detect the location from the public IP and print it
    Locate,
    /// List the alert backgrounds and sounds that were found
    Assets,
}
