use std::collections::VecDeque;
use std::io::Write;

use event_registration::server::{connect_registration_store, Config};

fn print_help() {
    eprintln!(
        "\
registration-admin

USAGE:
  registration-admin <command> [options]

COMMANDS:
  migrate                         Run database migrations
  export                          Export registrations to JSON/NDJSON

COMMON OPTIONS:
  --database-url <url>            (defaults to env DATABASE_URL)

export OPTIONS:
  --output <path>                 (optional) Output file path (default: stdout)
  --format <json|ndjson>          (default: ndjson)
"
    );
}

/// Server configuration with the database URL optionally overridden from the
/// command line.
fn admin_config(database_url: Option<String>, migrate: bool) -> anyhow::Result<Config> {
    let mut config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => database_url
            .clone()
            .or_else(|| std::env::var(key).ok()),
        _ => std::env::var(key).ok(),
    })?;
    config.max_connections = config.max_connections.min(5);
    config.migrate_on_startup = migrate;
    Ok(config)
}

fn next_value(args: &mut VecDeque<String>, flag: &str) -> anyhow::Result<String> {
    args.pop_front()
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let mut args: VecDeque<String> = std::env::args().skip(1).collect();
    let Some(command) = args.pop_front() else {
        print_help();
        return Ok(());
    };

    if matches!(command.as_str(), "-h" | "--help" | "help") {
        print_help();
        return Ok(());
    }

    match command.as_str() {
        "migrate" => {
            let mut database_url: Option<String> = None;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--database-url" => {
                        database_url = Some(next_value(&mut args, "--database-url")?);
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let config = admin_config(database_url, true)?;
            connect_registration_store(&config).await?;
            println!("ok: migrations applied ({:?})", config.database_backend);
            Ok(())
        }
        "export" => {
            let mut database_url: Option<String> = None;
            let mut output_path: Option<String> = None;
            let mut format = "ndjson".to_string();

            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--database-url" => {
                        database_url = Some(next_value(&mut args, "--database-url")?);
                    }
                    "--output" => {
                        output_path = Some(next_value(&mut args, "--output")?);
                    }
                    "--format" => {
                        format = next_value(&mut args, "--format")?;
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            if !matches!(format.as_str(), "json" | "ndjson") {
                anyhow::bail!("--format must be 'json' or 'ndjson'");
            }

            let config = admin_config(database_url, false)?;
            let store = connect_registration_store(&config).await?;
            let registrations = store.list().await?;

            let mut output: Box<dyn Write> = match output_path {
                Some(path) => Box::new(std::fs::File::create(&path)?),
                None => Box::new(std::io::stdout()),
            };

            if format == "json" {
                serde_json::to_writer_pretty(&mut output, &registrations)?;
                writeln!(output)?;
            } else {
                for registration in &registrations {
                    serde_json::to_writer(&mut output, registration)?;
                    writeln!(output)?;
                }
            }
            output.flush()?;

            eprintln!("ok: exported {} registrations", registrations.len());
            Ok(())
        }
        other => {
            print_help();
            anyhow::bail!("unknown command: {other}")
        }
    }
}
