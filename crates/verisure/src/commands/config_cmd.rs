//! Config subcommand handlers.

use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = global
                .config
                .clone()
                .unwrap_or_else(verisure_config::config_path);
            println!("{}", path.display());
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = verisure_config::load_config(global.config.as_deref())?;
            let email = verisure_config::require_email(&cfg)?;

            let password = rpassword::prompt_password(format!("Verisure password for {email}: "))?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            verisure_config::store_password(email, &SecretString::from(password))?;
            eprintln!("Password stored in the system keyring for {email}");
            Ok(())
        }
    }
}
