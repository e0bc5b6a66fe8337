use clap::Command;

mod context;
mod deployment;
mod name;

use context::Context;

fn cli() -> Command {
    Command::new("houston")
        .about("airflow deployment control plane")
        .version("0.1.1")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(deployment::args())
        .subcommand(name::args())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let matches = cli().get_matches();

    let context = Context::from_env();

    match matches.subcommand() {
        Some(("deployment", submatches)) => Ok(deployment::handlers(submatches, &context).await?),
        Some(("name", submatches)) => Ok(name::handlers(submatches, &context)?),
        _ => unreachable!(), // If all subcommands are defined above, anything else is unreachable
    }
}
