//! Interactive DDL session.

use std::path::Path;

use dialoguer::{Confirm, Input, Password, Select};
use sqlserver_scripts::export::{
    render_console, timestamped_file_name, write_ddl, INTERACTIVE_OUTPUT_DIR,
};
use sqlserver_scripts::{
    ConnectionConfig, DdlEngine, MssqlCatalog, Result, ScriptError, ScriptOptions, TableIdentity,
};

fn prompt_error(e: dialoguer::Error) -> ScriptError {
    ScriptError::Prompt(e.to_string())
}

/// Output choice for a generated script.
#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputAction {
    Display,
    Save,
}

/// Run the interactive session.
///
/// Connection failures end the session. Per-table failures are printed and
/// the session moves on to the next prompt.
pub async fn run_session(defaults: ConnectionConfig, options: ScriptOptions) -> Result<()> {
    println!();
    println!("SQL Server Scripts - DDL Generator");
    println!("==================================");
    println!();

    let conn = prompt_connection(&defaults)?;
    conn.validate()?;

    println!();
    println!("Connecting to {} ...", conn.server_display());
    println!("  Database: {}", conn.database);
    println!("  Schema: {}", conn.schema);

    let catalog = MssqlCatalog::connect(&conn).await?;
    println!("✓ Connected to SQL Server");

    let mut engine = DdlEngine::new(catalog);

    loop {
        println!();
        println!("{}", "=".repeat(50));
        script_table(&mut engine, &conn.schema, &options).await?;

        let again = Confirm::new()
            .with_prompt("Script another table?")
            .default(true)
            .interact()
            .map_err(prompt_error)?;
        if !again {
            break;
        }
    }

    engine.into_inner().close().await?;
    println!();
    println!("✓ Session completed");
    Ok(())
}

fn prompt_connection(defaults: &ConnectionConfig) -> Result<ConnectionConfig> {
    println!("Enter SQL Server connection details:");

    let host: String = Input::new()
        .with_prompt("  Server hostname/IP")
        .default(defaults.host.clone())
        .interact_text()
        .map_err(prompt_error)?;

    let port: u16 = Input::new()
        .with_prompt("  Port")
        .default(defaults.port)
        .interact_text()
        .map_err(prompt_error)?;

    let instance: String = Input::new()
        .with_prompt("  Instance name (optional)")
        .default(defaults.instance_name.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)?;

    let database: String = Input::new()
        .with_prompt("  Database")
        .default(defaults.database.clone())
        .validate_with(required)
        .interact_text()
        .map_err(prompt_error)?;

    let user: String = Input::new()
        .with_prompt("  Username")
        .default(defaults.user.clone())
        .validate_with(required)
        .interact_text()
        .map_err(prompt_error)?;

    let password = if defaults.password.is_empty() {
        Password::new()
            .with_prompt("  Password")
            .interact()
            .map_err(prompt_error)?
    } else {
        let entered = Password::new()
            .with_prompt("  Password (press Enter to keep current)")
            .allow_empty_password(true)
            .interact()
            .map_err(prompt_error)?;
        if entered.is_empty() {
            defaults.password.clone()
        } else {
            entered
        }
    };

    let schema: String = Input::new()
        .with_prompt("  Schema")
        .default(defaults.schema.clone())
        .interact_text()
        .map_err(prompt_error)?;

    let instance = instance.trim();
    Ok(ConnectionConfig {
        host: host.trim().to_string(),
        port,
        instance_name: (!instance.is_empty()).then(|| instance.to_string()),
        database: database.trim().to_string(),
        user: user.trim().to_string(),
        password,
        schema: schema.trim().to_string(),
        ..defaults.clone()
    })
}

#[allow(clippy::ptr_arg)]
fn required(input: &String) -> std::result::Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("a value is required")
    } else {
        Ok(())
    }
}

async fn script_table(
    engine: &mut DdlEngine<MssqlCatalog>,
    schema: &str,
    options: &ScriptOptions,
) -> Result<()> {
    let name: String = Input::new()
        .with_prompt("Table name")
        .validate_with(required)
        .interact_text()
        .map_err(prompt_error)?;

    let table = match TableIdentity::new(schema, name.trim()) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("✗ {}", e);
            return Ok(());
        }
    };

    let actions = &["Display DDL in console", "Save DDL to file"];
    let action = match Select::new()
        .with_prompt("Output")
        .items(actions)
        .default(0)
        .interact()
        .map_err(prompt_error)?
    {
        0 => OutputAction::Display,
        _ => OutputAction::Save,
    };

    let ddl = match engine.generate(&table, options).await {
        Ok(ddl) => ddl,
        Err(e) => {
            eprintln!("✗ {}", e);
            return Ok(());
        }
    };

    match action {
        OutputAction::Display => {
            println!();
            print!("{}", render_console(&ddl));
        }
        OutputAction::Save => {
            let sql = ddl.to_sql();
            let file_name = timestamped_file_name(&table.name, ddl.generated_at);
            match write_ddl(Path::new(INTERACTIVE_OUTPUT_DIR), &file_name, &sql) {
                Ok(path) => {
                    let shown = std::fs::canonicalize(&path).unwrap_or(path);
                    println!("✓ DDL saved to: {}", shown.display());
                    println!("  File size: {} bytes", sql.len());
                }
                Err(e) => eprintln!("✗ {}", e),
            }
        }
    }

    Ok(())
}
