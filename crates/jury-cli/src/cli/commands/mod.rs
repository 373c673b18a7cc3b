use super::args::{Cli, Command};

pub(crate) mod matrix;
pub(crate) mod reports;
pub(crate) mod run;
pub(crate) mod status;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run::run(args).await,
        Command::Matrix(args) => matrix::run(args),
        Command::Status(args) => status::run(args),
    }
}
