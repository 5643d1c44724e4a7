mod generate;
mod train;

use generate::run_gen;
use train::run_train;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Gen(args) => run_gen(args, ctx),
        Command::Train(args) => run_train(args, ctx),
    }
}
