use ascii_table::{Align, AsciiTable};
use clap::{arg, value_parser, Arg, ArgAction, Command};
use houston_core::{
    naming::{generate_release_name, DEFAULT_TOKEN_LENGTH},
    NamespaceStrategy, ReleaseName, Service,
};

use crate::context::Context;

pub fn args() -> Command {
    Command::new("name")
        .about("generate and derive release names")
        .subcommand_required(true)
        .subcommand(
            Command::new("generate").about("generate a release name").arg(
                Arg::new("token-length")
                    .long("token-length")
                    .help("digits appended to the name")
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(usize)),
            ),
        )
        .subcommand(
            Command::new("derive")
                .about("show every identifier derived from a release name")
                .arg(arg!(<RELEASE> "release name"))
                .arg_required_else_help(true),
        )
}

pub fn derived_identifiers(
    release_name: &ReleaseName,
    strategy: &NamespaceStrategy,
) -> Vec<Vec<String>> {
    vec![
        vec!["release".to_string(), release_name.to_string()],
        vec!["namespace".to_string(), release_name.namespace(strategy)],
        vec!["secret".to_string(), release_name.secret_name()],
        vec!["database".to_string(), release_name.database_name()],
        vec![
            "airflow user".to_string(),
            release_name.username(Service::Airflow),
        ],
        vec![
            "celery user".to_string(),
            release_name.username(Service::Celery),
        ],
        vec!["image repository".to_string(), release_name.image_repository()],
    ]
}

pub fn handlers(model_match: &clap::ArgMatches, context: &Context) -> anyhow::Result<()> {
    match model_match.subcommand() {
        Some(("generate", generate_match)) => {
            let token_length = generate_match
                .get_one::<usize>("token-length")
                .copied()
                .unwrap_or(DEFAULT_TOKEN_LENGTH);

            println!("{}", generate_release_name(token_length));

            Ok(())
        }
        Some(("derive", derive_match)) => {
            let release_name = derive_match
                .get_one::<String>("RELEASE")
                .ok_or_else(|| anyhow::anyhow!("release name expected"))?;

            let table_data =
                derived_identifiers(&ReleaseName::new(release_name), &context.namespace_strategy);

            let mut ascii_table = AsciiTable::default();

            ascii_table
                .column(0)
                .set_header("IDENTIFIER")
                .set_align(Align::Left);

            ascii_table
                .column(1)
                .set_header("VALUE")
                .set_align(Align::Left);

            ascii_table.print(table_data);

            Ok(())
        }
        _ => unreachable!(), // If all subcommands are defined above, anything else is unreachable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_identifiers() {
        let rows = derived_identifiers(
            &ReleaseName::new("cosmic-dust-1234"),
            &NamespaceStrategy::default(),
        );

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[1][1], "houston-cosmic-dust-1234");
        assert_eq!(rows[3][1], rows[4][1]);
        assert_eq!(rows[5][1], "cosmic_dust_1234_celery");
    }
}
