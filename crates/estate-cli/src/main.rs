//! `estate` — command-line client for gate and admin operators.
//!
//! # Usage
//!
//! ```text
//! estate pending
//! estate preapprove --resident 7 --name "Jane Doe" --date 2024-05-01
//! estate approve 12
//! estate check-in 12
//! estate register-group --name "Book Club" --purpose Meeting \
//!   --date 2024-05-01 --host 42 --members "Alice,Bob"
//! ```

mod client;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client::ApiClient;
use estate_core::{
  group::{GroupForm, GroupRegistration},
  visitor::{GateEvent, NewVisitor, ResidentId, Visitor, VisitorId, VisitorStatus},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "estate", about = "Command-line client for the estate visitor server")]
struct Args {
  /// Base URL of the estate server.
  #[arg(long, env = "ESTATE_URL", default_value = "http://localhost:8080")]
  url: String,

  /// Print raw JSON instead of a table.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Visitors awaiting a decision.
  Pending,
  /// All visitors, optionally filtered.
  List {
    /// Exact status: Pending, Approved or Rejected.
    #[arg(long, value_parser = parse_status)]
    status:   Option<VisitorStatus>,
    #[arg(long)]
    resident: Option<i64>,
  },
  /// One visitor by id.
  Show { id: i64 },
  /// Register a visitor; it always starts Pending.
  Preapprove {
    #[arg(long)]
    resident: i64,
    #[arg(long)]
    name:     String,
    /// Visit date, YYYY-MM-DD.
    #[arg(long)]
    date:     NaiveDate,
    #[arg(long)]
    contact:  Option<String>,
    #[arg(long)]
    purpose:  Option<String>,
  },
  Approve { id: i64 },
  Reject { id: i64 },
  /// Record an approved visitor arriving at the gate.
  CheckIn { id: i64 },
  /// Record a checked-in visitor leaving.
  CheckOut { id: i64 },
  /// Register a visiting group.
  RegisterGroup {
    #[arg(long)]
    name:    String,
    #[arg(long)]
    purpose: String,
    #[arg(long)]
    date:    String,
    #[arg(long)]
    host:    String,
    /// Comma-separated member names.
    #[arg(long)]
    members: String,
  },
  /// Registered groups, newest first.
  Groups,
}

fn parse_status(s: &str) -> Result<VisitorStatus, String> {
  VisitorStatus::parse(s).map_err(|e| e.to_string())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let client = ApiClient::new(&args.url)?;
  tracing::debug!(url = %args.url, "using estate server");

  match args.command {
    Command::Pending => print_visitors(&client.pending().await?, args.json)?,
    Command::List { status, resident } => {
      let visitors = client.list_visitors(status, resident.map(ResidentId)).await?;
      print_visitors(&visitors, args.json)?;
    }
    Command::Show { id } => {
      let visitor = client.visitor(VisitorId(id)).await?;
      print_visitors(std::slice::from_ref(&visitor), args.json)?;
    }
    Command::Preapprove { resident, name, date, contact, purpose } => {
      let mut input = NewVisitor::new(ResidentId(resident), name, date);
      input.contact = contact;
      input.purpose = purpose;
      let visitor = client.preapprove(&input).await?;
      print_visitors(&[visitor], args.json)?;
    }
    Command::Approve { id } => {
      let visitor = client.decide(VisitorId(id), VisitorStatus::Approved).await?;
      print_visitors(&[visitor], args.json)?;
    }
    Command::Reject { id } => {
      let visitor = client.decide(VisitorId(id), VisitorStatus::Rejected).await?;
      print_visitors(&[visitor], args.json)?;
    }
    Command::CheckIn { id } => {
      let visitor = client.gate(VisitorId(id), GateEvent::CheckIn).await?;
      print_visitors(&[visitor], args.json)?;
    }
    Command::CheckOut { id } => {
      let visitor = client.gate(VisitorId(id), GateEvent::CheckOut).await?;
      print_visitors(&[visitor], args.json)?;
    }
    Command::RegisterGroup { name, purpose, date, host, members } => {
      let form = GroupForm {
        group_name: Some(name),
        purpose:    Some(purpose),
        visit_date: Some(date),
        host_id:    Some(host),
        members:    Some(members),
      };
      println!("{}", client.register_group(&form).await?.trim_end());
    }
    Command::Groups => print_groups(&client.groups().await?, args.json)?,
  }

  Ok(())
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_visitors(visitors: &[Visitor], json: bool) -> Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(visitors).context("encoding visitors")?);
    return Ok(());
  }
  if visitors.is_empty() {
    println!("no visitors");
    return Ok(());
  }
  println!(
    "{:>6}  {:<9} {:>8}  {:<10}  {:<5} {:<5}  NAME",
    "ID", "STATUS", "RESIDENT", "DATE", "IN", "OUT"
  );
  let clock = |t: Option<chrono::DateTime<chrono::Utc>>| {
    t.map_or_else(|| "-".to_owned(), |t| t.format("%H:%M").to_string())
  };
  for v in visitors {
    println!(
      "{:>6}  {:<9} {:>8}  {:<10}  {:<5} {:<5}  {}",
      v.visitor_id,
      v.status.as_str(),
      v.resident_id,
      v.visit_date,
      clock(v.check_in_time),
      clock(v.check_out_time),
      v.full_name
    );
  }
  Ok(())
}

fn print_groups(groups: &[GroupRegistration], json: bool) -> Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(groups).context("encoding groups")?);
    return Ok(());
  }
  if groups.is_empty() {
    println!("no groups");
    return Ok(());
  }
  for g in groups {
    println!(
      "#{} {}: {} on {} (host {}), members {}",
      g.group_id, g.group_name, g.purpose, g.visit_date, g.host_id, g.members
    );
  }
  Ok(())
}
