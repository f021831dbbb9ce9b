use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum Commands {
    /// Print the SQL and parameters of the plan's query
    Compile {
        #[command(flatten)]
        doc: DocumentArgs,
    },
    /// Print (or run) the query counting the plan's root features
    Count {
        #[command(flatten)]
        doc: DocumentArgs,

        #[arg(long, help = "Connection string; when set the count is executed")]
        conn_str: Option<String>,
    },
    /// Run the plan's query and print the rows as JSON
    Run {
        #[command(flatten)]
        doc: DocumentArgs,

        #[arg(long, help = "Connection string")]
        conn_str: String,

        #[arg(long, help = "If specified, writes the rows to this file instead of stdout")]
        output: Option<String>,
    },
}

#[derive(Args)]
pub struct DocumentArgs {
    #[arg(long, help = "Query document path")]
    pub config: String,

    /// Dialect override: "postgres", "mysql" or "sqlite"
    #[arg(long)]
    pub dialect: Option<String>,
}
