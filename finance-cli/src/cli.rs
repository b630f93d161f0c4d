use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "finance-cli")]
#[command(about = "Record income and expenses against a finance API")]
pub struct Cli {
    /// Run against local in-memory data instead of the API
    #[arg(long, global = true)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List, create, edit or delete entries
    #[command(subcommand)]
    Entries(EntryCommand),
    /// List, create or edit categories
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Print config path and create default file if missing
    ConfigPath,
}

#[derive(Debug, Subcommand)]
pub enum EntryCommand {
    List,
    New(EntryArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        fields: EntryArgs,
    },
    Delete {
        id: i64,
    },
}

/// Values typed into the entry form. Unset flags keep the form's current value.
#[derive(Debug, Clone, Default, Args)]
pub struct EntryArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// expense or income
    #[arg(long = "type")]
    pub entry_type: Option<String>,
    /// In the configured locale, e.g. 1.234,56
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
    /// yes/no
    #[arg(long)]
    pub paid: Option<String>,
    #[arg(long)]
    pub category_id: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    List,
    New(CategoryArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        fields: CategoryArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct CategoryArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entry_creation_flags() {
        let cli = Cli::parse_from([
            "finance-cli",
            "--dev",
            "entries",
            "new",
            "--name",
            "Rt",
            "--amount",
            "1.500,00",
            "--type",
            "income",
            "--category-id",
            "2",
        ]);

        assert!(cli.dev);
        match cli.command {
            Commands::Entries(EntryCommand::New(args)) => {
                assert_eq!(args.name.as_deref(), Some("Rt"));
                assert_eq!(args.entry_type.as_deref(), Some("income"));
                assert_eq!(args.category_id.as_deref(), Some("2"));
                assert_eq!(args.date, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn dev_flag_is_global() {
        let cli = Cli::parse_from(["finance-cli", "categories", "edit", "3", "--dev", "--name", "Hl"]);
        assert!(cli.dev);
        assert!(matches!(
            cli.command,
            Commands::Categories(CategoryCommand::Edit { id: 3, .. })
        ));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
