// ABOUTME: CLI entrypoint for the siyuan command
// ABOUTME: Handles error exit codes and command dispatch

use clap::Parser;
use siyuan_api::{
    api::ApiClient,
    auth::resolve_token,
    cli::{BlockCommand, Cli, Commands, DocCommand, NotebookCommand},
    Result,
};
use std::io::Write;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("siyuan: [E{}] {}", e.exit_code(), e);
        std::process::exit(e.exit_code());
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let token = resolve_token(cli.token.clone())?;
    let mut client = ApiClient::new(token, Some(cli.api_base.clone()))?;
    if let Some(ms) = cli.push_timeout_ms {
        client = client.with_push_timeout(Duration::from_millis(ms));
    }

    match cli.command() {
        Commands::Version => println!("{}", client.version()?),
        Commands::Notebooks => print_json(&client.list_notebooks()?)?,
        Commands::Notebook { action } => match action {
            NotebookCommand::Create { name } => print_json(&client.create_notebook(&name)?)?,
            NotebookCommand::Open { id } => client.open_notebook(&id)?,
            NotebookCommand::Close { id } => client.close_notebook(&id)?,
            NotebookCommand::Rename { id, name } => client.rename_notebook(&id, &name)?,
            NotebookCommand::Remove { id } => client.remove_notebook(&id)?,
            NotebookCommand::Conf { id } => print_json(&client.get_notebook_conf(&id)?)?,
        },
        Commands::Doc { action } => match action {
            DocCommand::Create {
                notebook,
                path,
                markdown,
            } => println!("{}", client.create_doc_with_md(&notebook, &path, &markdown)?),
        },
        Commands::Upload { file } => println!("{}", client.upload_asset(&file)?),
        Commands::Block { action } => match action {
            BlockCommand::Insert {
                previous_id,
                data,
                data_type,
            } => print_json(&client.insert_block(data_type, &data, &previous_id)?)?,
            BlockCommand::Prepend {
                parent_id,
                data,
                data_type,
            } => print_json(&client.prepend_block(data_type, &data, &parent_id)?)?,
            BlockCommand::Append {
                parent_id,
                data,
                data_type,
            } => print_json(&client.append_block(data_type, &data, &parent_id)?)?,
            BlockCommand::Kramdown { id } => println!("{}", client.get_block_kramdown(&id)?),
        },
        Commands::File { path } => {
            let body = client.get_file(&path)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&body)?;
            stdout.flush()?;
        }
        Commands::Push { msg, error } => {
            let id = if error {
                client.push_err_msg(&msg)?
            } else {
                client.push_msg(&msg)?
            };
            println!("{}", id);
        }
        Commands::Sql { stmt } => print_json(&client.sql(&stmt)?)?,
    }

    Ok(())
}
