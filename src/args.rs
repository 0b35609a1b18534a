use argh::FromArgs;
use std::path::PathBuf;

#[derive(FromArgs, Debug)]
/// Optional command line arguments
pub struct TopLevelCmd {
    /// specify config file path, creates file if it doesn't exist
    #[argh(option, short = 'c')]
    pub config_override: Option<PathBuf>,
    /// config file must exist, including "config_override" files
    #[argh(switch, short = 'r')]
    pub config_required: bool,
    /// use config file as-is (don't save over it)
    #[argh(switch, short = 'n')]
    pub no_save: bool,
    #[argh(subcommand)]
    pub subcommands: Option<SubCommands>,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
pub enum SubCommands {
    Export(ExportCmd),
}

/// write the plain-text report of all sessions and exit
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "export")]
pub struct ExportCmd {
    /// directory to write the report into, otherwise uses config's export dir
    #[argh(option, short = 'o')]
    pub out_dir: Option<PathBuf>,
}
