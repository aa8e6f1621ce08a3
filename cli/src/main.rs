mod client;
mod render;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use client::{AppendVersionBody, CreateDealBody, DealsClient, VersionBody};

#[derive(Parser, Debug)]
#[command(name = "deal-tracker", version, about = "TA Deal Tracker client")]
struct Cli {
    /// Base URL of the deal tracker server.
    #[arg(long, env = "DEAL_TRACKER_URL", default_value = "http://localhost:8080")]
    url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all deals, newest first.
    List,
    /// Show one deal with its full version history.
    Show {
        /// Business deal id, e.g. D-1.
        deal_id: String,
    },
    /// Create a deal with its first version.
    Create(CreateArgs),
    /// Append a version to an existing deal.
    Append(AppendArgs),
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    deal_id: String,
    #[arg(long)]
    customer: String,
    #[arg(long, default_value = "Discovery")]
    stage: String,
    #[arg(long)]
    owner: String,
    #[command(flatten)]
    version: VersionArgs,
}

#[derive(Args, Debug)]
struct AppendArgs {
    /// Business deal id, e.g. D-1.
    deal_id: String,
    /// New pipeline stage; omit to leave the stage unchanged.
    #[arg(long)]
    stage: Option<String>,
    #[command(flatten)]
    version: VersionArgs,
}

#[derive(Args, Debug)]
struct VersionArgs {
    #[arg(long)]
    use_cases: String,
    #[arg(long)]
    roadblocks: String,
    #[arg(long)]
    solutions: String,
    #[arg(long)]
    comments: Option<String>,
    #[arg(long)]
    edited_by: String,
}

impl From<VersionArgs> for VersionBody {
    fn from(args: VersionArgs) -> Self {
        VersionBody {
            use_cases: args.use_cases,
            roadblocks: args.roadblocks,
            solution_recommendations: args.solutions,
            additional_comments: args.comments,
            edited_by: args.edited_by,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = DealsClient::new(&cli.url);

    match cli.command {
        Command::List => {
            let deals = client.list().await?;
            print!("{}", render::deal_cards(&deals));
        }
        Command::Show { deal_id } => {
            let deal = client.find(&deal_id).await?;
            print!("{}", render::deal_detail(&deal));
        }
        Command::Create(args) => {
            let body = CreateDealBody {
                deal_id: args.deal_id.clone(),
                customer_name: args.customer,
                current_stage: args.stage,
                ta_owner: args.owner,
                version: args.version.into(),
            };
            client.create(&body).await?;
            println!("Created deal {}.", args.deal_id);
        }
        Command::Append(args) => {
            let deal = client.find(&args.deal_id).await?;
            let body = AppendVersionBody {
                version: args.version.into(),
                current_stage: args.stage,
            };
            client.append(deal.id, &body).await?;
            let refreshed = client.find(&args.deal_id).await?;
            print!("{}", render::append_confirmation(&refreshed));
        }
    }
    Ok(())
}
