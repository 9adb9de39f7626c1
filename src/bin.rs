//! CLI front-end for the GDB RSP bridge.
//!
//! Wires command-line configuration into [`gdb_bridge::Config`] and a
//! [`gdb_bridge::riscv::translator::RiscvTranslator`] reached over a
//! [`gdb_bridge::riscv::dtm::TcpDmiTransport`] connection to an external
//! probe-multiplexer process: this binary never talks to a physical
//! debug probe directly (see the crate's top-level docs).

use std::net::SocketAddr;
use std::sync::mpsc;

use clap::Parser;
use gdb_bridge::riscv::dtm::TcpDmiTransport;
use gdb_bridge::riscv::RiscvTranslator;
use gdb_bridge::{Config, GdbServer};

#[derive(Parser, Debug)]
#[command(name = "gdb-bridge", about = "GDB Remote Serial Protocol bridge for embedded debug probes")]
struct Args {
    /// Address the GDB RSP server listens on.
    #[arg(long, default_value = "127.0.0.1")]
    listen_ip: std::net::IpAddr,

    /// Port the GDB RSP server listens on.
    #[arg(long, default_value_t = 1442)]
    listen_port: u16,

    /// Address of the probe-multiplexer process speaking the DMI
    /// transport protocol.
    #[arg(long)]
    probe_multiplexer: SocketAddr,

    /// Disables `vCont;r` range-stepping support.
    #[arg(long)]
    no_range_stepping: bool,

    /// Disables `+`/`-` packet acknowledgement by default (a client can
    /// still request it be dropped with `QStartNoAckMode`).
    #[arg(long)]
    no_ack: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = Config {
        listening_ip: args.listen_ip,
        listening_port: args.listen_port,
        range_stepping_enabled: !args.no_range_stepping,
        packet_acknowledgement_enabled: !args.no_ack,
    };

    tracing::info!(multiplexer = %args.probe_multiplexer, "connecting to probe multiplexer");
    let dtm = TcpDmiTransport::connect(args.probe_multiplexer)?;
    let mut translator = RiscvTranslator::new(dtm);
    translator.activate()?;

    let (_state_tx, state_rx) = mpsc::channel();
    let mut server = GdbServer::new(
        config,
        gdb_bridge::regmap::Architecture::RiscV32,
        Box::new(translator),
        state_rx,
    )?;

    tracing::info!("gdb-bridge listening");
    server.run()?;
    Ok(())
}
