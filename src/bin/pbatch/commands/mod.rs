mod run;

use anyhow::Result;

use ped_batch::RunMode;

use crate::cli::Command;
use crate::config::build_pipeline_config;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Analyze(args) => {
            let config = build_pipeline_config(&args.source, &args.bins, None, None, false)?;
            run::execute(&config, RunMode::Analyze, ctx)
        }
        Command::Batch(args) => {
            let config = build_pipeline_config(
                &args.source,
                &args.bins,
                Some(&args.partition),
                Some(&args.relocation),
                args.rescan,
            )?;
            run::execute(&config, RunMode::Batch, ctx)
        }
        Command::Run(args) => {
            let config = build_pipeline_config(
                &args.source,
                &args.bins,
                Some(&args.partition),
                Some(&args.relocation),
                false,
            )?;
            run::execute(&config, RunMode::Full, ctx)
        }
    }
}
