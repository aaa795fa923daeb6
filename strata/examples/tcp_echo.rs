use std::net::TcpListener;
use std::thread;

use portpicker::{pick_unused_port, Port};

use strata::sync::prelude::*;

const HOST: &str = "127.0.0.1";
const N_CLIENTS: usize = 5;
const N_ITER: usize = 10;

fn port() -> Port {
    pick_unused_port().unwrap()
}

fn addr(port: Port) -> String {
    format!("{HOST}:{}", port)
}

fn serve(listener: TcpListener) -> Result<()> {
    for _ in 0..N_CLIENTS {
        let (stream, _) = listener.accept()?;

        thread::spawn(move || -> Result<()> {
            let mut channel = TextChannel::new(TcpChannel::from_stream(stream)?);
            log::warn!("[server] new client: {}", channel.info());

            while let Some(line) = channel.read_line()? {
                channel.write_line(&line.to_uppercase())?;
            }

            log::warn!("[server] client disconnected: {}", channel.info());
            channel.close()
        });
    }
    Ok(())
}

fn run_client(addr: &str, id: usize) -> Result<()> {
    let whoami = format!("client #{id}");
    let mut channel = TextChannel::new(TcpChannel::connect(addr)?);

    for i in 0..N_ITER {
        channel.write_line(&format!("ping {i} from {whoami}"))?;
        let reply = channel.read_line()?;
        log::info!("[{whoami}] {reply:?}");
        assert_eq!(reply, Some(format!("PING {i} FROM {}", whoami.to_uppercase())));
    }

    channel.close()
}

fn run(addr: &str) {
    let listener = TcpListener::bind(addr).unwrap();
    let server = thread::spawn(move || serve(listener));

    let clients: Vec<_> = (0..N_CLIENTS)
        .map(|id| {
            let addr = addr.to_string();
            thread::spawn(move || run_client(addr.as_str(), id))
        })
        .collect();

    for client in clients {
        client.join().unwrap().unwrap();
    }
    server.join().unwrap().unwrap();
}

fn main() {
    // Setup logger
    env_logger::builder()
        .filter_level(log::LevelFilter::Info) // Suppress everything below `info` for third-party modules.
        .filter_module(env!("CARGO_PKG_NAME"), log::LevelFilter::Info) // Allow everything from current package
        .init();

    let addr = addr(port());
    run(addr.as_str());
}

#[cfg(test)]
#[test]
fn tcp_echo() {
    let addr = addr(port());
    run(addr.as_str());
}
