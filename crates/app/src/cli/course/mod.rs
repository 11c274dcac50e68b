use clap::{Args, Subcommand};

mod create;

#[derive(Debug, Args)]
pub(crate) struct CourseCommand {
    #[command(subcommand)]
    command: CourseSubcommand,
}

#[derive(Debug, Subcommand)]
enum CourseSubcommand {
    Create(create::CreateCourseArgs),
}

pub(crate) async fn run(command: CourseCommand) -> Result<(), String> {
    match command.command {
        CourseSubcommand::Create(args) => create::run(args).await,
    }
}
