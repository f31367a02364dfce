use clap::{Parser, ValueEnum};

use crate::version::VersionPart;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Default)]
pub enum BumpPart {
    Major,
    Minor,
    Patch,
    #[default]
    Revision,
}

impl From<BumpPart> for VersionPart {
    fn from(part: BumpPart) -> Self {
        match part {
            BumpPart::Major => VersionPart::Major,
            BumpPart::Minor => VersionPart::Minor,
            BumpPart::Patch => VersionPart::Build,
            BumpPart::Revision => VersionPart::Fix,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about, bin_name = "dotnet-bump")]
pub struct Arguments {
    #[arg(value_enum, ignore_case = true, default_value_t = BumpPart::Revision)]
    pub part: BumpPart,
    /// Project file, solution file, or directory containing one
    #[arg(long, short, default_value = "./")]
    pub path: String,
    /// Replace the pre-release suffix, an empty value removes it
    #[arg(long, short)]
    pub suffix: Option<String>,
    #[arg(long, short, env = "CONFIGURATION")]
    pub configuration: Option<String>,
    /// Only bump when the configuration equals this value
    #[arg(long, short)]
    pub target_configuration: Option<String>,
    #[arg(long, short)]
    pub verbose: bool,
}

impl Arguments {
    /// False when a target configuration is set and the current one differs
    pub fn should_run(&self) -> bool {
        match self.target_configuration.as_deref() {
            None | Some("") => true,
            Some(target) => self.configuration.as_deref() == Some(target),
        }
    }
}
