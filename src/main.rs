use cuff_log::args::TopLevelCmd;
use cuff_log::AppResult;

fn main() -> AppResult<()> {
    let arg_config: TopLevelCmd = argh::from_env();
    cuff_log::run(arg_config)
}
