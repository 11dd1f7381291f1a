/************************************************************
 ***********tcpft: one file, one connection, no fuss*********
 ***********************************************************
 * wire: [size u64 BE]['\n'][name]['\n'][size bytes of data]
 **********************************************************/

use std::env;
use std::path::Path;
use std::process::exit;

use log::{error, info};

mod cmd;
mod error;
mod files;
mod network;
mod protocol;
mod recv;
mod send;

use crate::cmd::{parse_args, Command};
use crate::files::open_source;
use crate::network::{listen, serve};
use crate::send::send_file;

fn run_send(addr: &str, path: &Path) {
    info!("TCP file transfer client (sender)");
    let (name, size, file) = match open_source(path) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    };

    info!("sending file {:?} to server {:?}", name, addr);
    match send_file(&name, size, file, addr) {
        Ok(sent) => info!("done, {} bytes sent", sent),
        Err(e) => {
            error!("send file: {}", e);
            exit(2);
        }
    }
}

fn run_recv(listen_addr: &str, dir: &Path) {
    info!("TCP file transfer server (receiver)");
    info!("listening on {:?}, storing files in {:?}", listen_addr, dir);
    let listener = match listen(listen_addr) {
        Ok(l) => l,
        Err(e) => {
            error!("{}", e);
            exit(2);
        }
    };
    if let Err(e) = serve(listener, dir) {
        error!("{}", e);
        exit(2);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let argv: Vec<String> = env::args().collect();
    let command = match parse_args(argv) {
        Ok(c) => c,
        Err(m) => {
            eprintln!("Error while parsing input arguments:\n  {}", m);
            exit(1);
        }
    };

    match command {
        Command::Help(text) => println!("{}", text),
        Command::Send { addr, path } => run_send(&addr, &path),
        Command::Recv { dir, listen: addr } => run_recv(&addr, &dir),
    }
}
