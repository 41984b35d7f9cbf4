//! Builds a small packet-filter model and prints it, its paths and an evaluation.
//!
//! Run with:
//! ```bash
//! cargo run --example format -- --rules 4
//! ```

use clap::Parser;
use zen_rs::context::{Context, Settings};
use zen_rs::eval::{evaluate, Assignment, Val};
use zen_rs::format::format;
use zen_rs::node::Expr;
use zen_rs::reuse::find_reused;
use zen_rs::types::{ObjectType, Type};

#[derive(Debug, Parser)]
#[command(author, version, about = "Pretty-print a symbolic packet filter")]
struct Cli {
    /// Number of filter rules
    #[arg(long, default_value = "3")]
    rules: u16,

    /// Keep explicit conditionals
    #[arg(long)]
    preserve_branches: bool,

    /// Print path constraints
    #[arg(long)]
    paths: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log: simplelog::LevelFilter,
}

fn packet_type() -> Type {
    Type::object(ObjectType::new(
        "Packet",
        [("DstPort", Type::uint16()), ("Protocol", Type::uint8())],
    ))
}

/// Rule `i` permits TCP traffic to port `80 + i`, in order of priority.
fn filter(ctx: &Context, packet: &Expr, rules: u16) -> Expr {
    let port = ctx.get_field(packet, "DstPort");
    let protocol = ctx.get_field(packet, "Protocol");
    let is_tcp = ctx.eq(&protocol, &ctx.uint8(6));
    (0..rules).rev().fold(ctx.bool(false), |rest, i| {
        let matches = ctx.and(&is_tcp, &ctx.eq(&port, &ctx.uint16(80 + i)));
        ctx.ite(&matches, &ctx.bool(i % 2 == 0), &rest)
    })
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    simplelog::TermLogger::init(
        cli.log,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let ctx = Context::with_settings(Settings {
        preserve_branches: cli.preserve_branches,
    });
    println!("ctx = {:?}", ctx);

    let packet = ctx.symbolic("p", packet_type());
    let f = filter(&ctx, &packet, cli.rules);
    println!("{}", format(&f));
    println!("reused subterms: {}", find_reused(&f).len());

    if cli.paths {
        for (i, path) in ctx.paths(&f).enumerate() {
            println!("path #{}: {} => {}", i, path.constraint.to_expr(&ctx), path.leaf);
        }
    }

    let mut assignment = Assignment::new();
    let web = Val::Object {
        name: "Packet".to_string(),
        fields: vec![("DstPort".into(), Val::from(80u16)), ("Protocol".into(), Val::from(6u8))],
    };
    assignment.set(&packet, web);
    println!("filter(tcp:80) = {:?}", evaluate(&f, &assignment)?);

    for stats in ctx.stats().iter().filter(|s| s.len > 0) {
        println!(
            "{:>16}: {} entries, {} hits, {} misses",
            stats.name, stats.len, stats.hits, stats.misses
        );
    }
    println!("ctx = {:?}", ctx);

    Ok(())
}
