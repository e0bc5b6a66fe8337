use ascii_table::{Align, AsciiTable};
use clap::{arg, Arg, ArgAction, ArgMatches, Command};
use houston::{
    http::USER_HEADER,
    services::{ConfigInput, DeploymentPayload, UpdateRequest},
};
use houston_core::{ConfigEntry, Deployment, EnvironmentVariable};

use crate::context::Context;

pub fn args() -> Command {
    Command::new("deployment")
        .long_flag("deployment")
        .about("manage deployments")
        .subcommand_required(true)
        .subcommand(
            Command::new("update")
                .about("update a deployment and optionally sync it to the cluster")
                .arg(arg!(<ID> "deployment id"))
                .arg(
                    Arg::new("label")
                        .long("label")
                        .help("new label")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .help("new description, empty to clear")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("version")
                        .long("version")
                        .help("airflow chart version")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .help("KEY=VALUE, replaces the whole configuration")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("config-json")
                        .long("config-json")
                        .help("KEY=JSON, like --config but the value keeps its JSON type")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("env")
                        .long("env")
                        .help("NAME=VALUE, replaces every environment variable")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("sync")
                        .long("sync")
                        .help("push the result to the cluster")
                        .action(ArgAction::SetTrue),
                )
                .arg_required_else_help(true),
        )
}

fn split_pair(pair: &str) -> anyhow::Result<(&str, &str)> {
    pair.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| anyhow::anyhow!("expected KEY=VALUE, got '{pair}'"))
}

fn collect_pairs<'a>(
    matches: &'a ArgMatches,
    id: &str,
) -> anyhow::Result<Option<Vec<(&'a str, &'a str)>>> {
    match matches.get_many::<String>(id) {
        Some(values) => Ok(Some(
            values
                .map(|value| split_pair(value))
                .collect::<anyhow::Result<Vec<_>>>()?,
        )),
        None => Ok(None),
    }
}

pub fn update_request(update_match: &ArgMatches) -> anyhow::Result<UpdateRequest> {
    let deployment_id = update_match
        .get_one::<String>("ID")
        .ok_or_else(|| anyhow::anyhow!("deployment id expected"))?;

    let strings = collect_pairs(update_match, "config")?;
    let typed = collect_pairs(update_match, "config-json")?;

    let config = if strings.is_none() && typed.is_none() {
        None
    } else {
        let mut entries: Vec<ConfigEntry> = strings
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| ConfigEntry::new(key, value))
            .collect();

        for (key, raw) in typed.unwrap_or_default() {
            let value: serde_json::Value = serde_json::from_str(raw)
                .map_err(|err| anyhow::anyhow!("config '{key}' is not valid JSON: {err}"))?;
            entries.push(ConfigEntry::new(key, value));
        }

        Some(ConfigInput::Entries(entries))
    };

    let env = collect_pairs(update_match, "env")?.map(|pairs| {
        pairs
            .into_iter()
            .map(|(name, value)| EnvironmentVariable::new(name, value))
            .collect()
    });

    Ok(UpdateRequest {
        deployment_id: deployment_id.clone(),
        payload: DeploymentPayload {
            label: update_match.get_one::<String>("label").cloned(),
            description: update_match.get_one::<String>("description").cloned(),
            version: update_match.get_one::<String>("version").cloned(),
        },
        config,
        env,
        sync: update_match.get_flag("sync"),
    })
}

pub async fn handlers(model_match: &ArgMatches, context: &Context) -> anyhow::Result<()> {
    match model_match.subcommand() {
        Some(("update", update_match)) => {
            let request = update_request(update_match)?;
            let url = format!(
                "{}/v1/deployments/{}",
                context.endpoint, request.deployment_id
            );

            let response = reqwest::Client::new()
                .post(&url)
                .header(USER_HEADER, &context.user)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(anyhow::anyhow!("update failed with {status}: {body}"));
            }

            let deployment: Deployment = response.json().await?;

            tracing::info!("deployment '{}' updated", deployment.id);

            let table_data = vec![vec![
                deployment.id,
                deployment.release_name,
                deployment.label,
                deployment.version,
                deployment.config.len().to_string(),
            ]];

            let mut ascii_table = AsciiTable::default();

            ascii_table
                .column(0)
                .set_header("ID")
                .set_align(Align::Left);

            ascii_table
                .column(1)
                .set_header("RELEASE NAME")
                .set_align(Align::Left);

            ascii_table
                .column(2)
                .set_header("LABEL")
                .set_align(Align::Left);

            ascii_table
                .column(3)
                .set_header("VERSION")
                .set_align(Align::Left);

            ascii_table
                .column(4)
                .set_header("CONFIG ENTRIES")
                .set_align(Align::Left);

            ascii_table.print(table_data);

            Ok(())
        }
        _ => unreachable!(), // If all subcommands are defined above, anything else is unreachable
    }
}
